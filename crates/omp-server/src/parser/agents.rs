//! CREATE_AGENT and MODIFY_AGENT.
//!
//! ```text
//! <create_agent>
//!   <name>…</name><comment>…</comment>
//!   <installer>BASE64<signature>BASE64</signature></installer>
//!   <howto_install>BASE64</howto_install>
//!   <howto_use>BASE64</howto_use>
//! </create_agent>
//! ```

use omp_core::event::Attrs;

use crate::command::{Command, CreateAgent, ModifyAgent};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateState {
    Root,
    Name,
    Comment,
    Installer,
    InstallerSignature,
    HowtoInstall,
    HowtoUse,
}

pub struct CreateAgentParser {
    state: CreateState,
    data: CreateAgent,
}

impl CreateAgentParser {
    pub fn new() -> Self {
        CreateAgentParser {
            state: CreateState::Root,
            data: CreateAgent::default(),
        }
    }
}

impl ElementParser for CreateAgentParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (CreateState::Root, "name") => CreateState::Name,
            (CreateState::Root, "comment") => CreateState::Comment,
            (CreateState::Root, "installer") => CreateState::Installer,
            (CreateState::Installer, "signature") => CreateState::InstallerSignature,
            (CreateState::Root, "howto_install") => CreateState::HowtoInstall,
            (CreateState::Root, "howto_use") => CreateState::HowtoUse,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            CreateState::Name => append(&mut self.data.name, text),
            CreateState::Comment => append(&mut self.data.comment, text),
            CreateState::Installer => append(&mut self.data.installer, text),
            CreateState::InstallerSignature => append(&mut self.data.installer_signature, text),
            CreateState::HowtoInstall => append(&mut self.data.howto_install, text),
            CreateState::HowtoUse => append(&mut self.data.howto_use, text),
            CreateState::Root => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            CreateState::InstallerSignature => CreateState::Installer,
            CreateState::Root => {
                return EndResult::Complete(Command::CreateAgent(std::mem::take(&mut self.data)))
            }
            _ => CreateState::Root,
        };
        EndResult::Open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifyState {
    Root,
    Name,
    Comment,
}

pub struct ModifyAgentParser {
    state: ModifyState,
    data: ModifyAgent,
}

impl ModifyAgentParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyAgentParser {
            state: ModifyState::Root,
            data: ModifyAgent {
                agent_id: attrs.get_owned("agent_id"),
                ..ModifyAgent::default()
            },
        }
    }
}

impl ElementParser for ModifyAgentParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (ModifyState::Root, "name") => ModifyState::Name,
            (ModifyState::Root, "comment") => ModifyState::Comment,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            ModifyState::Name => append(&mut self.data.name, text),
            ModifyState::Comment => append(&mut self.data.comment, text),
            ModifyState::Root => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            ModifyState::Root => {
                EndResult::Complete(Command::ModifyAgent(std::mem::take(&mut self.data)))
            }
            _ => {
                self.state = ModifyState::Root;
                EndResult::Open
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
