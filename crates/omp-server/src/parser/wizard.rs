//! RUN_WIZARD.
//!
//! ```text
//! <run_wizard>
//!   <name>quick_first_scan</name>
//!   <params><param><name>hosts</name><value>10.0.0.1</value></param></params>
//! </run_wizard>
//! ```

use omp_core::event::Attrs;

use crate::command::{Command, RunWizard};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Name,
    Params,
    Param,
    ParamName,
    ParamValue,
}

pub struct RunWizardParser {
    state: State,
    data: RunWizard,
    param_name: String,
    param_value: String,
}

impl RunWizardParser {
    pub fn new() -> Self {
        RunWizardParser {
            state: State::Root,
            data: RunWizard::default(),
            param_name: String::new(),
            param_value: String::new(),
        }
    }
}

impl ElementParser for RunWizardParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "name") => State::Name,
            (State::Root, "params") => State::Params,
            (State::Params, "param") => {
                self.param_name.clear();
                self.param_value.clear();
                State::Param
            }
            (State::Param, "name") => State::ParamName,
            (State::Param, "value") => State::ParamValue,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Name => append(&mut self.data.name, text),
            State::ParamName => self.param_name.push_str(text),
            State::ParamValue => self.param_value.push_str(text),
            State::Root | State::Params | State::Param => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            State::Root => {
                return EndResult::Complete(Command::RunWizard(std::mem::take(&mut self.data)))
            }
            State::Name | State::Params => State::Root,
            State::Param => {
                self.data.params.push((
                    std::mem::take(&mut self.param_name),
                    std::mem::take(&mut self.param_value),
                ));
                State::Params
            }
            State::ParamName | State::ParamValue => State::Param,
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
    fn params_collect_in_order() {
        let mut parser = RunWizardParser::new();
        parser.start_element("name", &Attrs::default());
        parser.text("quick_first_scan");
        parser.end_element("name");
        parser.start_element("params", &Attrs::default());
        for (name, value) in [("hosts", "10.0.0.1"), ("port", "443")] {
            parser.start_element("param", &Attrs::default());
            parser.start_element("name", &Attrs::default());
            parser.text(name);
            parser.end_element("name");
            parser.start_element("value", &Attrs::default());
            parser.text(value);
            parser.end_element("value");
            parser.end_element("param");
        }
        parser.end_element("params");
        match parser.end_element("run_wizard") {
            EndResult::Complete(Command::RunWizard(data)) => {
                assert_eq!(data.name.as_deref(), Some("quick_first_scan"));
                assert_eq!(
                    data.params,
                    vec![
                        ("hosts".to_string(), "10.0.0.1".to_string()),
                        ("port".to_string(), "443".to_string())
                    ]
                );
            }
            _ => panic!("expected completion"),
        }
    }
}
