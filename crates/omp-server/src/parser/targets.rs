//! CREATE_TARGET and MODIFY_TARGET.
//!
//! Credential and port list references are attributes; the SSH
//! credential additionally carries a nested `<port>`. A target may be
//! populated from a target locator instead of a literal host list.

use omp_core::event::Attrs;

use crate::command::{Command, CreateTarget, ModifyTarget, TargetLocator};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Name,
    Comment,
    Hosts,
    PortList,
    PortRange,
    SshCredential,
    SshCredentialPort,
    SmbCredential,
    TargetLocator,
    LocatorUsername,
    LocatorPassword,
}

pub struct CreateTargetParser {
    state: State,
    data: CreateTarget,
}

impl CreateTargetParser {
    pub fn new() -> Self {
        CreateTargetParser {
            state: State::Root,
            data: CreateTarget::default(),
        }
    }
}

impl ElementParser for CreateTargetParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "name") => State::Name,
            (State::Root, "comment") => State::Comment,
            (State::Root, "hosts") => State::Hosts,
            (State::Root, "port_list") => {
                self.data.port_list_id = attrs.get_owned("id");
                State::PortList
            }
            (State::Root, "port_range") => State::PortRange,
            (State::Root, "ssh_lsc_credential") => {
                self.data.ssh_lsc_credential_id = attrs.get_owned("id");
                State::SshCredential
            }
            (State::SshCredential, "port") => State::SshCredentialPort,
            (State::Root, "smb_lsc_credential") => {
                self.data.smb_lsc_credential_id = attrs.get_owned("id");
                State::SmbCredential
            }
            (State::Root, "target_locator") => {
                self.data.target_locator = Some(TargetLocator::default());
                State::TargetLocator
            }
            (State::TargetLocator, "username") => State::LocatorUsername,
            (State::TargetLocator, "password") => State::LocatorPassword,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Name => append(&mut self.data.name, text),
            State::Comment => append(&mut self.data.comment, text),
            State::Hosts => append(&mut self.data.hosts, text),
            State::PortRange => append(&mut self.data.port_range, text),
            State::SshCredentialPort => append(&mut self.data.ssh_port, text),
            State::TargetLocator => {
                if let Some(locator) = self.data.target_locator.as_mut() {
                    locator.name.push_str(text);
                }
            }
            State::LocatorUsername => {
                if let Some(locator) = self.data.target_locator.as_mut() {
                    append(&mut locator.username, text);
                }
            }
            State::LocatorPassword => {
                if let Some(locator) = self.data.target_locator.as_mut() {
                    append(&mut locator.password, text);
                }
            }
            State::Root | State::PortList | State::SshCredential | State::SmbCredential => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            State::Root => {
                return EndResult::Complete(Command::CreateTarget(std::mem::take(&mut self.data)))
            }
            State::SshCredentialPort => State::SshCredential,
            State::LocatorUsername | State::LocatorPassword => State::TargetLocator,
            _ => State::Root,
        };
        EndResult::Open
    }
}

pub struct ModifyTargetParser {
    state: State,
    data: ModifyTarget,
}

impl ModifyTargetParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyTargetParser {
            state: State::Root,
            data: ModifyTarget {
                target_id: attrs.get_owned("target_id"),
                ..ModifyTarget::default()
            },
        }
    }
}

impl ElementParser for ModifyTargetParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "name") => State::Name,
            (State::Root, "comment") => State::Comment,
            (State::Root, "hosts") => State::Hosts,
            (State::Root, "port_list") => {
                self.data.port_list_id = attrs.get_owned("id");
                State::PortList
            }
            (State::Root, "ssh_lsc_credential") => {
                self.data.ssh_lsc_credential_id = attrs.get_owned("id");
                State::SshCredential
            }
            (State::SshCredential, "port") => State::SshCredentialPort,
            (State::Root, "smb_lsc_credential") => {
                self.data.smb_lsc_credential_id = attrs.get_owned("id");
                State::SmbCredential
            }
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Name => append(&mut self.data.name, text),
            State::Comment => append(&mut self.data.comment, text),
            State::Hosts => append(&mut self.data.hosts, text),
            State::SshCredentialPort => append(&mut self.data.ssh_port, text),
            _ => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            State::Root => {
                return EndResult::Complete(Command::ModifyTarget(std::mem::take(&mut self.data)))
            }
            State::SshCredentialPort => State::SshCredential,
            _ => State::Root,
        };
        EndResult::Open
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_references_and_ssh_port() {
        let mut parser = CreateTargetParser::new();
        parser.start_element("hosts", &Attrs::default());
        parser.text("192.168.0.0/24");
        parser.end_element("hosts");
        let ssh = Attrs::new(vec![("id".into(), "cred-1".into())]);
        parser.start_element("ssh_lsc_credential", &ssh);
        parser.start_element("port", &Attrs::default());
        parser.text("2222");
        parser.end_element("port");
        parser.end_element("ssh_lsc_credential");
        match parser.end_element("create_target") {
            EndResult::Complete(Command::CreateTarget(data)) => {
                assert_eq!(data.hosts.as_deref(), Some("192.168.0.0/24"));
                assert_eq!(data.ssh_lsc_credential_id.as_deref(), Some("cred-1"));
                assert_eq!(data.ssh_port.as_deref(), Some("2222"));
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn target_locator_with_credentials() {
        let mut parser = CreateTargetParser::new();
        parser.start_element("target_locator", &Attrs::default());
        parser.text("ldap");
        parser.start_element("username", &Attrs::default());
        parser.text("svc");
        parser.end_element("username");
        parser.start_element("password", &Attrs::default());
        parser.text("pw");
        parser.end_element("password");
        parser.end_element("target_locator");
        match parser.end_element("create_target") {
            EndResult::Complete(Command::CreateTarget(data)) => {
                let locator = data.target_locator.expect("locator");
                assert_eq!(locator.name, "ldap");
                assert_eq!(locator.username.as_deref(), Some("svc"));
                assert_eq!(locator.password.as_deref(), Some("pw"));
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn modify_target_has_no_locator() {
        let mut parser = ModifyTargetParser::new(&Attrs::default());
        assert_eq!(
            parser.start_element("target_locator", &Attrs::default()),
            StartResult::Unknown
        );
    }
}
