//! CREATE_NOTE, MODIFY_NOTE, CREATE_OVERRIDE and MODIFY_OVERRIDE.
//!
//! Notes and overrides share one grammar; overrides additionally accept
//! `<new_threat>`. References to the task, the result and the NVT are
//! attributes on their elements.

use omp_core::event::Attrs;

use crate::command::{Command, CreateNote, CreateOverride, ModifyNote, ModifyOverride};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Text,
    Hosts,
    Port,
    Threat,
    NewThreat,
    Task,
    Result,
    Nvt,
    Active,
}

/// Shared accumulator for the four note/override grammars.
#[derive(Debug, Default)]
struct NoteFields {
    text: Option<String>,
    hosts: Option<String>,
    port: Option<String>,
    threat: Option<String>,
    new_threat: Option<String>,
    task_id: Option<String>,
    result_id: Option<String>,
    nvt_oid: Option<String>,
    active: Option<String>,
}

#[derive(Debug)]
struct NoteGrammar {
    state: State,
    fields: NoteFields,
    /// Overrides accept <new_threat>; notes do not.
    with_new_threat: bool,
}

impl NoteGrammar {
    fn new(with_new_threat: bool) -> Self {
        NoteGrammar {
            state: State::Root,
            fields: NoteFields::default(),
            with_new_threat,
        }
    }

    fn start(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "text") => State::Text,
            (State::Root, "hosts") => State::Hosts,
            (State::Root, "port") => State::Port,
            (State::Root, "threat") => State::Threat,
            (State::Root, "new_threat") if self.with_new_threat => State::NewThreat,
            (State::Root, "task") => {
                self.fields.task_id = attrs.get_owned("id");
                State::Task
            }
            (State::Root, "result") => {
                self.fields.result_id = attrs.get_owned("id");
                State::Result
            }
            (State::Root, "nvt") => {
                self.fields.nvt_oid = attrs.get_owned("oid");
                State::Nvt
            }
            (State::Root, "active") => State::Active,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Text => append(&mut self.fields.text, text),
            State::Hosts => append(&mut self.fields.hosts, text),
            State::Port => append(&mut self.fields.port, text),
            State::Threat => append(&mut self.fields.threat, text),
            State::NewThreat => append(&mut self.fields.new_threat, text),
            State::Active => append(&mut self.fields.active, text),
            State::Root | State::Task | State::Result | State::Nvt => {}
        }
    }

    /// Returns true when the root element closed.
    fn end(&mut self) -> bool {
        match self.state {
            State::Root => true,
            _ => {
                self.state = State::Root;
                false
            }
        }
    }
}

pub struct CreateNoteParser {
    grammar: NoteGrammar,
}

impl CreateNoteParser {
    pub fn new(_attrs: &Attrs) -> Self {
        CreateNoteParser {
            grammar: NoteGrammar::new(false),
        }
    }
}

impl ElementParser for CreateNoteParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        self.grammar.start(name, attrs)
    }

    fn text(&mut self, text: &str) {
        self.grammar.text(text);
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        if !self.grammar.end() {
            return EndResult::Open;
        }
        let fields = std::mem::take(&mut self.grammar.fields);
        EndResult::Complete(Command::CreateNote(CreateNote {
            text: fields.text,
            hosts: fields.hosts,
            port: fields.port,
            threat: fields.threat,
            task_id: fields.task_id,
            result_id: fields.result_id,
            nvt_oid: fields.nvt_oid,
            active: fields.active,
        }))
    }
}

pub struct ModifyNoteParser {
    grammar: NoteGrammar,
    note_id: Option<String>,
}

impl ModifyNoteParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyNoteParser {
            grammar: NoteGrammar::new(false),
            note_id: attrs.get_owned("note_id"),
        }
    }
}

impl ElementParser for ModifyNoteParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        self.grammar.start(name, attrs)
    }

    fn text(&mut self, text: &str) {
        self.grammar.text(text);
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        if !self.grammar.end() {
            return EndResult::Open;
        }
        let fields = std::mem::take(&mut self.grammar.fields);
        EndResult::Complete(Command::ModifyNote(ModifyNote {
            note_id: self.note_id.take(),
            text: fields.text,
            hosts: fields.hosts,
            port: fields.port,
            threat: fields.threat,
            task_id: fields.task_id,
            result_id: fields.result_id,
            active: fields.active,
        }))
    }
}

pub struct CreateOverrideParser {
    grammar: NoteGrammar,
}

impl CreateOverrideParser {
    pub fn new(_attrs: &Attrs) -> Self {
        CreateOverrideParser {
            grammar: NoteGrammar::new(true),
        }
    }
}

impl ElementParser for CreateOverrideParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        self.grammar.start(name, attrs)
    }

    fn text(&mut self, text: &str) {
        self.grammar.text(text);
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        if !self.grammar.end() {
            return EndResult::Open;
        }
        let fields = std::mem::take(&mut self.grammar.fields);
        EndResult::Complete(Command::CreateOverride(CreateOverride {
            text: fields.text,
            hosts: fields.hosts,
            port: fields.port,
            threat: fields.threat,
            new_threat: fields.new_threat,
            task_id: fields.task_id,
            result_id: fields.result_id,
            nvt_oid: fields.nvt_oid,
            active: fields.active,
        }))
    }
}

pub struct ModifyOverrideParser {
    grammar: NoteGrammar,
    override_id: Option<String>,
}

impl ModifyOverrideParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyOverrideParser {
            grammar: NoteGrammar::new(true),
            override_id: attrs.get_owned("override_id"),
        }
    }
}

impl ElementParser for ModifyOverrideParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        self.grammar.start(name, attrs)
    }

    fn text(&mut self, text: &str) {
        self.grammar.text(text);
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        if !self.grammar.end() {
            return EndResult::Open;
        }
        let fields = std::mem::take(&mut self.grammar.fields);
        EndResult::Complete(Command::ModifyOverride(ModifyOverride {
            override_id: self.override_id.take(),
            text: fields.text,
            hosts: fields.hosts,
            port: fields.port,
            threat: fields.threat,
            new_threat: fields.new_threat,
            task_id: fields.task_id,
            result_id: fields.result_id,
            active: fields.active,
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_rejects_new_threat() {
        let mut parser = CreateNoteParser::new(&Attrs::default());
        assert_eq!(
            parser.start_element("new_threat", &Attrs::default()),
            StartResult::Unknown
        );
    }

    #[test]
    fn override_accepts_new_threat() {
        let mut parser = CreateOverrideParser::new(&Attrs::default());
        assert_eq!(
            parser.start_element("new_threat", &Attrs::default()),
            StartResult::Consumed
        );
        parser.text("Low");
        parser.end_element("new_threat");
        match parser.end_element("create_override") {
            EndResult::Complete(Command::CreateOverride(data)) => {
                assert_eq!(data.new_threat.as_deref(), Some("Low"));
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn references_come_from_attributes() {
        let mut parser = CreateNoteParser::new(&Attrs::default());
        let task = Attrs::new(vec![("id".into(), "t1".into())]);
        parser.start_element("task", &task);
        parser.end_element("task");
        let nvt = Attrs::new(vec![("oid".into(), "1.2.3".into())]);
        parser.start_element("nvt", &nvt);
        parser.end_element("nvt");
        match parser.end_element("create_note") {
            EndResult::Complete(Command::CreateNote(data)) => {
                assert_eq!(data.task_id.as_deref(), Some("t1"));
                assert_eq!(data.nvt_oid.as_deref(), Some("1.2.3"));
            }
            _ => panic!("expected completion"),
        }
    }
}
