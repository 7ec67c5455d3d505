//! Protocol and configuration constants.

// =============================================================================
// Protocol Constants
// =============================================================================

/// Protocol version reported by GET_VERSION.
pub const PROTOCOL_VERSION: &str = "4.0";

/// Maximum accumulated text for a single command (16 MiB).
///
/// Command payloads (including imported resources and base64 installers)
/// are held fully in memory before dispatch; this bounds a single
/// command's accumulation.
pub const MAX_COMMAND_TEXT: usize = 16 * 1024 * 1024;

/// Default capacity of a bounded response sink (4 MiB).
pub const DEFAULT_SINK_CAPACITY: usize = 4 * 1024 * 1024;

// =============================================================================
// Pagination Defaults
// =============================================================================

/// Default first row of a listing (rows are 1-based).
pub const DEFAULT_FIRST: i64 = 1;

/// Default maximum rows of a listing; -1 means unlimited.
pub const DEFAULT_MAX: i64 = -1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_wire_literal() {
        assert_eq!(PROTOCOL_VERSION, "4.0");
    }

    #[test]
    fn defaults_are_sane() {
        assert_eq!(DEFAULT_FIRST, 1);
        assert!(MAX_COMMAND_TEXT > DEFAULT_SINK_CAPACITY);
    }
}
