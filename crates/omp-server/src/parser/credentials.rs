//! CREATE_LSC_CREDENTIAL and MODIFY_LSC_CREDENTIAL.
//!
//! A credential is either password-based (login + password) or
//! key-based (login + key phrase/private/public).

use omp_core::event::Attrs;

use crate::command::{Command, CreateLscCredential, ModifyLscCredential};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateState {
    Root,
    Name,
    Comment,
    Login,
    Password,
    Key,
    KeyPhrase,
    KeyPrivate,
    KeyPublic,
}

pub struct CreateLscCredentialParser {
    state: CreateState,
    data: CreateLscCredential,
}

impl CreateLscCredentialParser {
    pub fn new() -> Self {
        CreateLscCredentialParser {
            state: CreateState::Root,
            data: CreateLscCredential::default(),
        }
    }
}

impl ElementParser for CreateLscCredentialParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (CreateState::Root, "name") => CreateState::Name,
            (CreateState::Root, "comment") => CreateState::Comment,
            (CreateState::Root, "login") => CreateState::Login,
            (CreateState::Root, "password") => CreateState::Password,
            (CreateState::Root, "key") => CreateState::Key,
            (CreateState::Key, "phrase") => CreateState::KeyPhrase,
            (CreateState::Key, "private") => CreateState::KeyPrivate,
            (CreateState::Key, "public") => CreateState::KeyPublic,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            CreateState::Name => append(&mut self.data.name, text),
            CreateState::Comment => append(&mut self.data.comment, text),
            CreateState::Login => append(&mut self.data.login, text),
            CreateState::Password => append(&mut self.data.password, text),
            CreateState::KeyPhrase => append(&mut self.data.key_phrase, text),
            CreateState::KeyPrivate => append(&mut self.data.key_private, text),
            CreateState::KeyPublic => append(&mut self.data.key_public, text),
            CreateState::Root | CreateState::Key => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            CreateState::Root => {
                return EndResult::Complete(Command::CreateLscCredential(std::mem::take(
                    &mut self.data,
                )))
            }
            CreateState::KeyPhrase | CreateState::KeyPrivate | CreateState::KeyPublic => {
                CreateState::Key
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
    Login,
    Password,
}

pub struct ModifyLscCredentialParser {
    state: ModifyState,
    data: ModifyLscCredential,
}

impl ModifyLscCredentialParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyLscCredentialParser {
            state: ModifyState::Root,
            data: ModifyLscCredential {
                lsc_credential_id: attrs.get_owned("lsc_credential_id"),
                ..ModifyLscCredential::default()
            },
        }
    }
}

impl ElementParser for ModifyLscCredentialParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (ModifyState::Root, "name") => ModifyState::Name,
            (ModifyState::Root, "comment") => ModifyState::Comment,
            (ModifyState::Root, "login") => ModifyState::Login,
            (ModifyState::Root, "password") => ModifyState::Password,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            ModifyState::Name => append(&mut self.data.name, text),
            ModifyState::Comment => append(&mut self.data.comment, text),
            ModifyState::Login => append(&mut self.data.login, text),
            ModifyState::Password => append(&mut self.data.password, text),
            ModifyState::Root => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            ModifyState::Root => EndResult::Complete(Command::ModifyLscCredential(
                std::mem::take(&mut self.data),
            )),
            _ => {
                self.state = ModifyState::Root;
                EndResult::Open
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_subtree_collects_parts() {
        let mut parser = CreateLscCredentialParser::new();
        parser.start_element("login", &Attrs::default());
        parser.text("sa");
        parser.end_element("login");
        parser.start_element("key", &Attrs::default());
        for (tag, value) in [("phrase", "pp"), ("private", "PRIV"), ("public", "PUB")] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        parser.end_element("key");
        match parser.end_element("create_lsc_credential") {
            EndResult::Complete(Command::CreateLscCredential(data)) => {
                assert_eq!(data.login.as_deref(), Some("sa"));
                assert_eq!(data.key_phrase.as_deref(), Some("pp"));
                assert_eq!(data.key_private.as_deref(), Some("PRIV"));
                assert_eq!(data.key_public.as_deref(), Some("PUB"));
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn phrase_outside_key_is_unknown() {
        let mut parser = CreateLscCredentialParser::new();
        assert_eq!(
            parser.start_element("phrase", &Attrs::default()),
            StartResult::Unknown
        );
    }
}
