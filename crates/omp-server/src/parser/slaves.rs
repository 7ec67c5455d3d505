//! CREATE_SLAVE and MODIFY_SLAVE.

use omp_core::event::Attrs;

use crate::command::{Command, CreateSlave, ModifySlave};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Name,
    Comment,
    Host,
    Port,
    Login,
    Password,
}

fn transition(state: State, name: &str) -> Option<State> {
    match (state, name) {
        (State::Root, "name") => Some(State::Name),
        (State::Root, "comment") => Some(State::Comment),
        (State::Root, "host") => Some(State::Host),
        (State::Root, "port") => Some(State::Port),
        (State::Root, "login") => Some(State::Login),
        (State::Root, "password") => Some(State::Password),
        _ => None,
    }
}

pub struct CreateSlaveParser {
    state: State,
    data: CreateSlave,
}

impl CreateSlaveParser {
    pub fn new() -> Self {
        CreateSlaveParser {
            state: State::Root,
            data: CreateSlave::default(),
        }
    }
}

impl ElementParser for CreateSlaveParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        match transition(self.state, name) {
            Some(next) => {
                self.state = next;
                StartResult::Consumed
            }
            None => StartResult::Unknown,
        }
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Name => append(&mut self.data.name, text),
            State::Comment => append(&mut self.data.comment, text),
            State::Host => append(&mut self.data.host, text),
            State::Port => append(&mut self.data.port, text),
            State::Login => append(&mut self.data.login, text),
            State::Password => append(&mut self.data.password, text),
            State::Root => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            State::Root => {
                EndResult::Complete(Command::CreateSlave(std::mem::take(&mut self.data)))
            }
            _ => {
                self.state = State::Root;
                EndResult::Open
            }
        }
    }
}

pub struct ModifySlaveParser {
    state: State,
    data: ModifySlave,
}

impl ModifySlaveParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifySlaveParser {
            state: State::Root,
            data: ModifySlave {
                slave_id: attrs.get_owned("slave_id"),
                ..ModifySlave::default()
            },
        }
    }
}

impl ElementParser for ModifySlaveParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        match transition(self.state, name) {
            Some(next) => {
                self.state = next;
                StartResult::Consumed
            }
            None => StartResult::Unknown,
        }
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Name => append(&mut self.data.name, text),
            State::Comment => append(&mut self.data.comment, text),
            State::Host => append(&mut self.data.host, text),
            State::Port => append(&mut self.data.port, text),
            State::Login => append(&mut self.data.login, text),
            State::Password => append(&mut self.data.password, text),
            State::Root => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            State::Root => {
                EndResult::Complete(Command::ModifySlave(std::mem::take(&mut self.data)))
            }
            _ => {
                self.state = State::Root;
                EndResult::Open
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slave_fields_accumulate() {
        let mut parser = CreateSlaveParser::new();
        for (tag, value) in [("name", "lab"), ("host", "10.0.0.5"), ("port", "9390")] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        match parser.end_element("create_slave") {
            EndResult::Complete(Command::CreateSlave(data)) => {
                assert_eq!(data.name.as_deref(), Some("lab"));
                assert_eq!(data.host.as_deref(), Some("10.0.0.5"));
                assert_eq!(data.port.as_deref(), Some("9390"));
            }
            _ => panic!("expected completion"),
        }
    }
}
