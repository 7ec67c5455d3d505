//! CREATE_PORT_LIST, MODIFY_PORT_LIST and CREATE_PORT_RANGE.
//!
//! CREATE_PORT_LIST accepts either a range specification string or a
//! GET_PORT_LISTS_RESPONSE payload (the exporter's grammar, read over
//! for unknown elements).

use omp_core::event::Attrs;

use crate::command::{
    Command, CreatePortList, CreatePortRange, ImportPortList, ImportPortRange, ModifyPortList,
};

use super::{append, ElementParser, EndResult, StartResult};

// =============================================================================
// CREATE_PORT_LIST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListState {
    Root,
    Name,
    Comment,
    RangeSpec,
    /// Inside <get_port_lists_response>.
    Import,
    IPortList,
    IName,
    IComment,
    IRanges,
    IRange,
    IRangeStart,
    IRangeEnd,
    IRangeType,
    IRangeComment,
}

impl ListState {
    fn in_import(self) -> bool {
        !matches!(
            self,
            ListState::Root | ListState::Name | ListState::Comment | ListState::RangeSpec
        )
    }
}

pub struct CreatePortListParser {
    state: ListState,
    data: CreatePortList,
}

impl CreatePortListParser {
    pub fn new() -> Self {
        CreatePortListParser {
            state: ListState::Root,
            data: CreatePortList::default(),
        }
    }

    fn import_mut(&mut self) -> &mut ImportPortList {
        self.data.import.get_or_insert_with(ImportPortList::default)
    }

    fn current_range_mut(&mut self) -> Option<&mut ImportPortRange> {
        self.import_mut().ranges.last_mut()
    }
}

impl ElementParser for CreatePortListParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (ListState::Root, "name") => ListState::Name,
            (ListState::Root, "comment") => ListState::Comment,
            (ListState::Root, "port_range") => ListState::RangeSpec,
            (ListState::Root, "get_port_lists_response") => {
                self.data.import = Some(ImportPortList::default());
                ListState::Import
            }
            (ListState::Import, "port_list") => ListState::IPortList,
            (ListState::IPortList, "name") => ListState::IName,
            (ListState::IPortList, "comment") => ListState::IComment,
            (ListState::IPortList, "port_ranges") => ListState::IRanges,
            (ListState::IRanges, "port_range") => {
                self.import_mut().ranges.push(ImportPortRange::default());
                ListState::IRange
            }
            (ListState::IRange, "start") => ListState::IRangeStart,
            (ListState::IRange, "end") => ListState::IRangeEnd,
            (ListState::IRange, "type") => ListState::IRangeType,
            (ListState::IRange, "comment") => ListState::IRangeComment,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            ListState::Name => append(&mut self.data.name, text),
            ListState::Comment => append(&mut self.data.comment, text),
            ListState::RangeSpec => append(&mut self.data.port_range, text),
            ListState::IName => append(&mut self.import_mut().name, text),
            ListState::IComment => append(&mut self.import_mut().comment, text),
            ListState::IRangeStart => {
                let text = text.to_owned();
                if let Some(range) = self.current_range_mut() {
                    append(&mut range.start, &text);
                }
            }
            ListState::IRangeEnd => {
                let text = text.to_owned();
                if let Some(range) = self.current_range_mut() {
                    append(&mut range.end, &text);
                }
            }
            ListState::IRangeType => {
                let text = text.to_owned();
                if let Some(range) = self.current_range_mut() {
                    append(&mut range.range_type, &text);
                }
            }
            ListState::IRangeComment => {
                let text = text.to_owned();
                if let Some(range) = self.current_range_mut() {
                    append(&mut range.comment, &text);
                }
            }
            _ => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            ListState::Root => {
                return EndResult::Complete(Command::CreatePortList(std::mem::take(
                    &mut self.data,
                )))
            }
            ListState::Name | ListState::Comment | ListState::RangeSpec | ListState::Import => {
                ListState::Root
            }
            ListState::IPortList => ListState::Import,
            ListState::IName | ListState::IComment | ListState::IRanges => ListState::IPortList,
            ListState::IRange => ListState::IRanges,
            ListState::IRangeStart
            | ListState::IRangeEnd
            | ListState::IRangeType
            | ListState::IRangeComment => ListState::IRange,
        };
        EndResult::Open
    }

    fn importing(&self) -> bool {
        self.state.in_import()
    }
}

// =============================================================================
// MODIFY_PORT_LIST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifyState {
    Root,
    Name,
    Comment,
}

pub struct ModifyPortListParser {
    state: ModifyState,
    data: ModifyPortList,
}

impl ModifyPortListParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyPortListParser {
            state: ModifyState::Root,
            data: ModifyPortList {
                port_list_id: attrs.get_owned("port_list_id"),
                ..ModifyPortList::default()
            },
        }
    }
}

impl ElementParser for ModifyPortListParser {
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
                EndResult::Complete(Command::ModifyPortList(std::mem::take(&mut self.data)))
            }
            _ => {
                self.state = ModifyState::Root;
                EndResult::Open
            }
        }
    }
}

// =============================================================================
// CREATE_PORT_RANGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeState {
    Root,
    PortList,
    Start,
    End,
    Type,
    Comment,
}

pub struct CreatePortRangeParser {
    state: RangeState,
    data: CreatePortRange,
}

impl CreatePortRangeParser {
    pub fn new() -> Self {
        CreatePortRangeParser {
            state: RangeState::Root,
            data: CreatePortRange::default(),
        }
    }
}

impl ElementParser for CreatePortRangeParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (RangeState::Root, "port_list") => {
                self.data.port_list_id = attrs.get_owned("id");
                RangeState::PortList
            }
            (RangeState::Root, "start") => RangeState::Start,
            (RangeState::Root, "end") => RangeState::End,
            (RangeState::Root, "type") => RangeState::Type,
            (RangeState::Root, "comment") => RangeState::Comment,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            RangeState::Start => append(&mut self.data.start, text),
            RangeState::End => append(&mut self.data.end, text),
            RangeState::Type => append(&mut self.data.range_type, text),
            RangeState::Comment => append(&mut self.data.comment, text),
            RangeState::Root | RangeState::PortList => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            RangeState::Root => {
                EndResult::Complete(Command::CreatePortRange(std::mem::take(&mut self.data)))
            }
            _ => {
                self.state = RangeState::Root;
                EndResult::Open
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_string_form() {
        let mut parser = CreatePortListParser::new();
        parser.start_element("name", &Attrs::default());
        parser.text("All TCP");
        parser.end_element("name");
        parser.start_element("port_range", &Attrs::default());
        parser.text("T:1-65535");
        parser.end_element("port_range");
        assert!(!parser.importing());
        match parser.end_element("create_port_list") {
            EndResult::Complete(Command::CreatePortList(data)) => {
                assert_eq!(data.port_range.as_deref(), Some("T:1-65535"));
                assert!(data.import.is_none());
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn import_form_collects_ranges() {
        let mut parser = CreatePortListParser::new();
        parser.start_element("get_port_lists_response", &Attrs::default());
        assert!(parser.importing());
        parser.start_element("port_list", &Attrs::default());
        parser.start_element("port_ranges", &Attrs::default());
        parser.start_element("port_range", &Attrs::default());
        for (tag, value) in [("start", "1"), ("end", "1024"), ("type", "tcp")] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        parser.end_element("port_range");
        parser.end_element("port_ranges");
        parser.end_element("port_list");
        parser.end_element("get_port_lists_response");
        match parser.end_element("create_port_list") {
            EndResult::Complete(Command::CreatePortList(data)) => {
                let import = data.import.expect("import payload");
                assert_eq!(import.ranges.len(), 1);
                assert_eq!(import.ranges[0].start.as_deref(), Some("1"));
                assert_eq!(import.ranges[0].end.as_deref(), Some("1024"));
                assert_eq!(import.ranges[0].range_type.as_deref(), Some("tcp"));
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn port_range_fields() {
        let mut parser = CreatePortRangeParser::new();
        let list = Attrs::new(vec![("id".into(), "pl1".into())]);
        parser.start_element("port_list", &list);
        parser.end_element("port_list");
        for (tag, value) in [("start", "8000"), ("end", "8080"), ("type", "tcp")] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        match parser.end_element("create_port_range") {
            EndResult::Complete(Command::CreatePortRange(data)) => {
                assert_eq!(data.port_list_id.as_deref(), Some("pl1"));
                assert_eq!(data.start.as_deref(), Some("8000"));
                assert_eq!(data.end.as_deref(), Some("8080"));
            }
            _ => panic!("expected completion"),
        }
    }
}
