//! CREATE_TASK and MODIFY_TASK.
//!
//! Resource references (config, target, schedule, slave, alerts) are id
//! attributes. Alerts repeat. Preferences nest two levels. MODIFY_TASK
//! additionally accepts a file attachment with an action.

use omp_core::event::Attrs;

use crate::command::{Command, CreateTask, ModifyTask, TaskFile, TaskPreference};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Rcfile,
    Name,
    Comment,
    Config,
    Target,
    Schedule,
    Slave,
    Alert,
    Preferences,
    Preference,
    PrefName,
    PrefScannerName,
    PrefValue,
    File,
}

pub struct CreateTaskParser {
    state: State,
    data: CreateTask,
}

impl CreateTaskParser {
    pub fn new() -> Self {
        CreateTaskParser {
            state: State::Root,
            data: CreateTask::default(),
        }
    }

    fn current_preference_mut(&mut self) -> Option<&mut TaskPreference> {
        self.data.preferences.last_mut()
    }
}

impl ElementParser for CreateTaskParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "rcfile") => State::Rcfile,
            (State::Root, "name") => State::Name,
            (State::Root, "comment") => State::Comment,
            (State::Root, "config") => {
                self.data.config_id = attrs.get_owned("id");
                State::Config
            }
            (State::Root, "target") => {
                self.data.target_id = attrs.get_owned("id");
                State::Target
            }
            (State::Root, "schedule") => {
                self.data.schedule_id = attrs.get_owned("id");
                State::Schedule
            }
            (State::Root, "slave") => {
                self.data.slave_id = attrs.get_owned("id");
                State::Slave
            }
            (State::Root, "alert") => {
                if let Some(id) = attrs.get_owned("id") {
                    self.data.alert_ids.push(id);
                }
                State::Alert
            }
            (State::Root, "preferences") => State::Preferences,
            (State::Preferences, "preference") => {
                self.data.preferences.push(TaskPreference::default());
                State::Preference
            }
            (State::Preference, "name") => State::PrefName,
            (State::Preference, "scanner_name") => State::PrefScannerName,
            (State::Preference, "value") => State::PrefValue,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Rcfile => append(&mut self.data.rcfile, text),
            State::Name => append(&mut self.data.name, text),
            State::Comment => append(&mut self.data.comment, text),
            State::PrefName => {
                let text = text.to_owned();
                if let Some(preference) = self.current_preference_mut() {
                    append(&mut preference.name, &text);
                }
            }
            State::PrefScannerName => {
                let text = text.to_owned();
                if let Some(preference) = self.current_preference_mut() {
                    append(&mut preference.scanner_name, &text);
                }
            }
            State::PrefValue => {
                let text = text.to_owned();
                if let Some(preference) = self.current_preference_mut() {
                    append(&mut preference.value, &text);
                }
            }
            _ => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            State::Root => {
                return EndResult::Complete(Command::CreateTask(std::mem::take(&mut self.data)))
            }
            State::Preference => State::Preferences,
            State::PrefName | State::PrefScannerName | State::PrefValue => State::Preference,
            _ => State::Root,
        };
        EndResult::Open
    }
}

pub struct ModifyTaskParser {
    state: State,
    data: ModifyTask,
}

impl ModifyTaskParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyTaskParser {
            state: State::Root,
            data: ModifyTask {
                task_id: attrs.get_owned("task_id"),
                ..ModifyTask::default()
            },
        }
    }

    fn current_preference_mut(&mut self) -> Option<&mut TaskPreference> {
        self.data.preferences.as_mut().and_then(|p| p.last_mut())
    }
}

impl ElementParser for ModifyTaskParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "name") => State::Name,
            (State::Root, "comment") => State::Comment,
            (State::Root, "config") => {
                self.data.config_id = attrs.get_owned("id");
                State::Config
            }
            (State::Root, "target") => {
                self.data.target_id = attrs.get_owned("id");
                State::Target
            }
            (State::Root, "schedule") => {
                self.data.schedule_id = attrs.get_owned("id");
                State::Schedule
            }
            (State::Root, "slave") => {
                self.data.slave_id = attrs.get_owned("id");
                State::Slave
            }
            (State::Root, "alert") => {
                // The first alert element replaces the task's alert set;
                // an empty set clears it.
                let alerts = self.data.alert_ids.get_or_insert_with(Vec::new);
                if let Some(id) = attrs.get_owned("id") {
                    alerts.push(id);
                }
                State::Alert
            }
            (State::Root, "preferences") => {
                self.data.preferences.get_or_insert_with(Vec::new);
                State::Preferences
            }
            (State::Preferences, "preference") => {
                if let Some(preferences) = self.data.preferences.as_mut() {
                    preferences.push(TaskPreference::default());
                }
                State::Preference
            }
            (State::Preference, "name") => State::PrefName,
            (State::Preference, "scanner_name") => State::PrefScannerName,
            (State::Preference, "value") => State::PrefValue,
            (State::Root, "file") => {
                self.data.file = Some(TaskFile {
                    name: attrs.get_owned("name"),
                    action: attrs.get_owned("action"),
                    content: String::new(),
                });
                State::File
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
            State::PrefName => {
                let text = text.to_owned();
                if let Some(preference) = self.current_preference_mut() {
                    append(&mut preference.name, &text);
                }
            }
            State::PrefScannerName => {
                let text = text.to_owned();
                if let Some(preference) = self.current_preference_mut() {
                    append(&mut preference.scanner_name, &text);
                }
            }
            State::PrefValue => {
                let text = text.to_owned();
                if let Some(preference) = self.current_preference_mut() {
                    append(&mut preference.value, &text);
                }
            }
            State::File => {
                if let Some(file) = self.data.file.as_mut() {
                    file.content.push_str(text);
                }
            }
            _ => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            State::Root => {
                return EndResult::Complete(Command::ModifyTask(std::mem::take(&mut self.data)))
            }
            State::Preference => State::Preferences,
            State::PrefName | State::PrefScannerName | State::PrefValue => State::Preference,
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

    fn id_attrs(id: &str) -> Attrs {
        Attrs::new(vec![("id".into(), id.into())])
    }

    #[test]
    fn references_and_repeating_alerts() {
        let mut parser = CreateTaskParser::new();
        parser.start_element("name", &Attrs::default());
        parser.text("Nightly");
        parser.end_element("name");
        parser.start_element("config", &id_attrs("c1"));
        parser.end_element("config");
        parser.start_element("target", &id_attrs("t1"));
        parser.end_element("target");
        for alert in ["a1", "a2"] {
            parser.start_element("alert", &id_attrs(alert));
            parser.end_element("alert");
        }
        match parser.end_element("create_task") {
            EndResult::Complete(Command::CreateTask(data)) => {
                assert_eq!(data.name.as_deref(), Some("Nightly"));
                assert_eq!(data.config_id.as_deref(), Some("c1"));
                assert_eq!(data.target_id.as_deref(), Some("t1"));
                assert_eq!(data.alert_ids, vec!["a1".to_string(), "a2".to_string()]);
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn preferences_nest_two_levels() {
        let mut parser = CreateTaskParser::new();
        parser.start_element("preferences", &Attrs::default());
        parser.start_element("preference", &Attrs::default());
        for (tag, value) in [("scanner_name", "max_checks"), ("value", "4")] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        parser.end_element("preference");
        parser.end_element("preferences");
        match parser.end_element("create_task") {
            EndResult::Complete(Command::CreateTask(data)) => {
                assert_eq!(data.preferences.len(), 1);
                assert_eq!(
                    data.preferences[0].scanner_name.as_deref(),
                    Some("max_checks")
                );
                assert_eq!(data.preferences[0].value.as_deref(), Some("4"));
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn modify_file_attachment() {
        let attrs = Attrs::new(vec![("task_id".into(), "t9".into())]);
        let mut parser = ModifyTaskParser::new(&attrs);
        let file_attrs = Attrs::new(vec![
            ("name".into(), "auth.rc".into()),
            ("action".into(), "update".into()),
        ]);
        parser.start_element("file", &file_attrs);
        parser.text("QUJD");
        parser.end_element("file");
        match parser.end_element("modify_task") {
            EndResult::Complete(Command::ModifyTask(data)) => {
                assert_eq!(data.task_id.as_deref(), Some("t9"));
                let file = data.file.expect("file");
                assert_eq!(file.name.as_deref(), Some("auth.rc"));
                assert_eq!(file.action.as_deref(), Some("update"));
                assert_eq!(file.content, "QUJD");
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn empty_alert_set_clears() {
        let mut parser = ModifyTaskParser::new(&Attrs::default());
        parser.start_element("alert", &Attrs::default());
        parser.end_element("alert");
        match parser.end_element("modify_task") {
            EndResult::Complete(Command::ModifyTask(data)) => {
                assert_eq!(data.alert_ids, Some(vec![]));
            }
            _ => panic!("expected completion"),
        }
    }
}
