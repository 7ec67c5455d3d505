//! CREATE_FILTER and MODIFY_FILTER.

use omp_core::event::Attrs;

use crate::command::{Command, CreateFilter, ModifyFilter};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Name,
    Comment,
    Term,
    Type,
}

pub struct CreateFilterParser {
    state: State,
    data: CreateFilter,
}

impl CreateFilterParser {
    pub fn new() -> Self {
        CreateFilterParser {
            state: State::Root,
            data: CreateFilter::default(),
        }
    }
}

impl ElementParser for CreateFilterParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "name") => State::Name,
            (State::Root, "comment") => State::Comment,
            (State::Root, "term") => State::Term,
            (State::Root, "type") => State::Type,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Name => append(&mut self.data.name, text),
            State::Comment => append(&mut self.data.comment, text),
            State::Term => append(&mut self.data.term, text),
            State::Type => append(&mut self.data.filter_type, text),
            State::Root => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            State::Root => {
                EndResult::Complete(Command::CreateFilter(std::mem::take(&mut self.data)))
            }
            _ => {
                self.state = State::Root;
                EndResult::Open
            }
        }
    }
}

pub struct ModifyFilterParser {
    state: State,
    data: ModifyFilter,
}

impl ModifyFilterParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyFilterParser {
            state: State::Root,
            data: ModifyFilter {
                filter_id: attrs.get_owned("filter_id"),
                ..ModifyFilter::default()
            },
        }
    }
}

impl ElementParser for ModifyFilterParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "name") => State::Name,
            (State::Root, "comment") => State::Comment,
            (State::Root, "term") => State::Term,
            (State::Root, "type") => State::Type,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Name => append(&mut self.data.name, text),
            State::Comment => append(&mut self.data.comment, text),
            State::Term => append(&mut self.data.term, text),
            State::Type => append(&mut self.data.filter_type, text),
            State::Root => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            State::Root => {
                EndResult::Complete(Command::ModifyFilter(std::mem::take(&mut self.data)))
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
    fn create_filter_fields() {
        let mut parser = CreateFilterParser::new();
        for (tag, value) in [("name", "web hosts"), ("term", "name~web first=1")] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        match parser.end_element("create_filter") {
            EndResult::Complete(Command::CreateFilter(data)) => {
                assert_eq!(data.name.as_deref(), Some("web hosts"));
                assert_eq!(data.term.as_deref(), Some("name~web first=1"));
                assert!(data.filter_type.is_none());
            }
            _ => panic!("expected completion"),
        }
    }
}
