//! CREATE_ALERT and MODIFY_ALERT.
//!
//! The three aspects (condition, event, method) share one shape: the
//! aspect name as text, plus any number of named data pairs:
//!
//! ```text
//! <condition>Threat level at least
//!   <data>High<name>level</name></data>
//! </condition>
//! ```

use omp_core::event::Attrs;

use crate::command::{AlertAspect, AlertData, Command, CreateAlert, ModifyAlert};

use super::{append, append_str, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Aspect {
    Condition,
    Event,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateState {
    Root,
    Name,
    Comment,
    Filter,
    /// Inside one of the three aspects.
    In(Aspect),
    /// Inside a <data> of an aspect.
    Data(Aspect),
    /// Inside the <name> of a <data>.
    DataName(Aspect),
}

pub struct CreateAlertParser {
    state: CreateState,
    data: CreateAlert,
}

impl CreateAlertParser {
    pub fn new() -> Self {
        CreateAlertParser {
            state: CreateState::Root,
            data: CreateAlert::default(),
        }
    }

    fn aspect_mut(&mut self, aspect: Aspect) -> &mut AlertAspect {
        match aspect {
            Aspect::Condition => &mut self.data.condition,
            Aspect::Event => &mut self.data.event,
            Aspect::Method => &mut self.data.method,
        }
    }

    fn current_data_mut(&mut self, aspect: Aspect) -> Option<&mut AlertData> {
        self.aspect_mut(aspect).data.last_mut()
    }
}

impl ElementParser for CreateAlertParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (CreateState::Root, "name") => CreateState::Name,
            (CreateState::Root, "comment") => CreateState::Comment,
            (CreateState::Root, "filter") => {
                // The filter reference is an attribute, not text.
                self.data.filter_id = attrs.get_owned("id");
                CreateState::Filter
            }
            (CreateState::Root, "condition") => CreateState::In(Aspect::Condition),
            (CreateState::Root, "event") => CreateState::In(Aspect::Event),
            (CreateState::Root, "method") => CreateState::In(Aspect::Method),
            (CreateState::In(aspect), "data") => {
                self.aspect_mut(aspect).data.push(AlertData::default());
                CreateState::Data(aspect)
            }
            (CreateState::Data(aspect), "name") => CreateState::DataName(aspect),
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            CreateState::Name => append(&mut self.data.name, text),
            CreateState::Comment => append(&mut self.data.comment, text),
            CreateState::In(aspect) => append_str(&mut self.aspect_mut(aspect).name, text),
            CreateState::Data(aspect) => {
                if let Some(data) = self.current_data_mut(aspect) {
                    data.content.push_str(text);
                }
            }
            CreateState::DataName(aspect) => {
                if let Some(data) = self.current_data_mut(aspect) {
                    data.name.push_str(text);
                }
            }
            CreateState::Root | CreateState::Filter => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            CreateState::DataName(aspect) => CreateState::Data(aspect),
            CreateState::Data(aspect) => CreateState::In(aspect),
            CreateState::In(_) | CreateState::Name | CreateState::Comment | CreateState::Filter => {
                CreateState::Root
            }
            CreateState::Root => {
                return EndResult::Complete(Command::CreateAlert(std::mem::take(&mut self.data)))
            }
        };
        EndResult::Open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifyState {
    Root,
    Name,
    Comment,
    Filter,
}

pub struct ModifyAlertParser {
    state: ModifyState,
    data: ModifyAlert,
}

impl ModifyAlertParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyAlertParser {
            state: ModifyState::Root,
            data: ModifyAlert {
                alert_id: attrs.get_owned("alert_id"),
                ..ModifyAlert::default()
            },
        }
    }
}

impl ElementParser for ModifyAlertParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (ModifyState::Root, "name") => ModifyState::Name,
            (ModifyState::Root, "comment") => ModifyState::Comment,
            (ModifyState::Root, "filter") => {
                self.data.filter_id = attrs.get_owned("id");
                ModifyState::Filter
            }
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            ModifyState::Name => append(&mut self.data.name, text),
            ModifyState::Comment => append(&mut self.data.comment, text),
            ModifyState::Root | ModifyState::Filter => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            ModifyState::Root => {
                EndResult::Complete(Command::ModifyAlert(std::mem::take(&mut self.data)))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspects_collect_named_data() {
        let mut parser = CreateAlertParser::new();
        parser.start_element("condition", &Attrs::default());
        parser.text("Threat level at least");
        parser.start_element("data", &Attrs::default());
        parser.text("High");
        parser.start_element("name", &Attrs::default());
        parser.text("level");
        parser.end_element("name");
        parser.end_element("data");
        parser.end_element("condition");
        match parser.end_element("create_alert") {
            EndResult::Complete(Command::CreateAlert(data)) => {
                assert_eq!(data.condition.name, "Threat level at least");
                assert_eq!(data.condition.data.len(), 1);
                assert_eq!(data.condition.data[0].name, "level");
                assert_eq!(data.condition.data[0].content, "High");
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn data_under_root_is_unknown() {
        let mut parser = CreateAlertParser::new();
        assert_eq!(
            parser.start_element("data", &Attrs::default()),
            StartResult::Unknown
        );
    }

    #[test]
    fn each_aspect_keeps_its_own_data() {
        let mut parser = CreateAlertParser::new();
        for (aspect, value) in [("condition", "Always"), ("event", "Task run status changed")] {
            parser.start_element(aspect, &Attrs::default());
            parser.text(value);
            parser.end_element(aspect);
        }
        match parser.end_element("create_alert") {
            EndResult::Complete(Command::CreateAlert(data)) => {
                assert_eq!(data.condition.name, "Always");
                assert_eq!(data.event.name, "Task run status changed");
                assert_eq!(data.method.name, "");
            }
            _ => panic!("expected completion"),
        }
    }
}
