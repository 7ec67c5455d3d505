//! Engine configuration.

use std::collections::HashSet;

use serde::Deserialize;

use omp_core::constants::MAX_COMMAND_TEXT;

/// Configuration for a protocol session.
///
/// An embedding daemon builds one of these at startup (possibly from a
/// config file via serde) and hands a clone to each connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Command names (lower case) refused with "Service unavailable".
    pub disabled_commands: HashSet<String>,
    /// Upper bound on accumulated text per command.
    pub max_command_text: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            disabled_commands: HashSet::new(),
            max_command_text: MAX_COMMAND_TEXT,
        }
    }
}

impl EngineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a command by name.
    pub fn with_disabled_command(mut self, name: &str) -> Self {
        self.disabled_commands.insert(name.to_ascii_lowercase());
        self
    }

    /// Set the per-command text limit.
    pub fn with_max_command_text(mut self, limit: usize) -> Self {
        self.max_command_text = limit;
        self
    }

    /// True if the named command is administratively disabled.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_commands.contains(name)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(config.disabled_commands.is_empty());
        assert_eq!(config.max_command_text, MAX_COMMAND_TEXT);
    }

    #[test]
    fn disabled_commands_are_case_normalized() {
        let config = EngineConfig::new().with_disabled_command("START_TASK");
        assert!(config.is_disabled("start_task"));
        assert!(!config.is_disabled("stop_task"));
    }

    #[test]
    fn deserializes_from_toml_shaped_input() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"disabled_commands": ["run_wizard"], "max_command_text": 1024}"#,
        )
        .unwrap();
        assert!(config.is_disabled("run_wizard"));
        assert_eq!(config.max_command_text, 1024);
    }
}
