//! AUTHENTICATE.
//!
//! ```text
//! <authenticate>
//!   <credentials>
//!     <username>alice</username>
//!     <password>secret</password>
//!   </credentials>
//! </authenticate>
//! ```

use omp_core::event::Attrs;

use crate::command::{Command, Credentials};

use super::{append_str, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Credentials,
    Username,
    Password,
}

/// Element parser for AUTHENTICATE.
#[derive(Debug)]
pub struct AuthenticateParser {
    state: State,
    credentials: Credentials,
}

impl AuthenticateParser {
    pub fn new() -> Self {
        AuthenticateParser {
            state: State::Root,
            credentials: Credentials::default(),
        }
    }
}

impl Default for AuthenticateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementParser for AuthenticateParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "credentials") => State::Credentials,
            (State::Credentials, "username") => State::Username,
            (State::Credentials, "password") => State::Password,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Username => append_str(&mut self.credentials.username, text),
            State::Password => append_str(&mut self.credentials.password, text),
            State::Root | State::Credentials => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            State::Username | State::Password => {
                self.state = State::Credentials;
                EndResult::Open
            }
            State::Credentials => {
                self.state = State::Root;
                EndResult::Open
            }
            State::Root => EndResult::Complete(Command::Authenticate(std::mem::take(
                &mut self.credentials,
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(parser: &mut AuthenticateParser, xml_steps: &[(&str, &str)]) -> Option<Command> {
        // (kind, payload): "s" start, "t" text, "e" end.
        for (kind, payload) in xml_steps {
            match *kind {
                "s" => {
                    assert_eq!(
                        parser.start_element(payload, &Attrs::default()),
                        StartResult::Consumed
                    );
                }
                "t" => parser.text(payload),
                "e" => {
                    if let EndResult::Complete(command) = parser.end_element(payload) {
                        return Some(command);
                    }
                }
                _ => unreachable!(),
            }
        }
        None
    }

    #[test]
    fn accumulates_credentials() {
        let mut parser = AuthenticateParser::new();
        let command = drive(
            &mut parser,
            &[
                ("s", "credentials"),
                ("s", "username"),
                ("t", "ali"),
                ("t", "ce"),
                ("e", "username"),
                ("s", "password"),
                ("t", "secret"),
                ("e", "password"),
                ("e", "credentials"),
                ("e", "authenticate"),
            ],
        )
        .expect("command completes");
        match command {
            Command::Authenticate(credentials) => {
                // Chunked text concatenates, never overwrites.
                assert_eq!(credentials.username, "alice");
                assert_eq!(credentials.password, "secret");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_stray_elements() {
        let mut parser = AuthenticateParser::new();
        assert_eq!(
            parser.start_element("username", &Attrs::default()),
            StartResult::Unknown
        );
        parser.start_element("credentials", &Attrs::default());
        assert_eq!(
            parser.start_element("credentials", &Attrs::default()),
            StartResult::Unknown
        );
    }
}
