//! CREATE_REPORT and MODIFY_REPORT.
//!
//! CREATE_REPORT imports a report for a container task: either an
//! existing task by reference or a task created on the fly. The report
//! payload is the exporter's grammar (read over for unknown elements,
//! which in practice skips scan metadata the import does not keep).

use omp_core::event::Attrs;

use crate::command::{Command, CreateReport, ImportResult, ModifyReport};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateState {
    Root,
    Task,
    TaskName,
    TaskComment,
    /// Inside <report>.
    Report,
    Results,
    Result,
    ResultHost,
    ResultPort,
    ResultNvt,
    ResultThreat,
    ResultDescription,
}

impl CreateState {
    fn in_import(self) -> bool {
        matches!(
            self,
            CreateState::Report
                | CreateState::Results
                | CreateState::Result
                | CreateState::ResultHost
                | CreateState::ResultPort
                | CreateState::ResultNvt
                | CreateState::ResultThreat
                | CreateState::ResultDescription
        )
    }
}

pub struct CreateReportParser {
    state: CreateState,
    data: CreateReport,
}

impl CreateReportParser {
    pub fn new() -> Self {
        CreateReportParser {
            state: CreateState::Root,
            data: CreateReport::default(),
        }
    }

    fn current_result_mut(&mut self) -> Option<&mut ImportResult> {
        self.data.results.last_mut()
    }
}

impl ElementParser for CreateReportParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (CreateState::Root, "task") => {
                self.data.task_id = attrs.get_owned("id");
                CreateState::Task
            }
            (CreateState::Task, "name") => CreateState::TaskName,
            (CreateState::Task, "comment") => CreateState::TaskComment,
            (CreateState::Root, "report") => CreateState::Report,
            (CreateState::Report, "results") => CreateState::Results,
            (CreateState::Results, "result") => {
                self.data.results.push(ImportResult::default());
                CreateState::Result
            }
            (CreateState::Result, "host") => CreateState::ResultHost,
            (CreateState::Result, "port") => CreateState::ResultPort,
            (CreateState::Result, "nvt") => {
                let oid = attrs.get_owned("oid");
                if let Some(result) = self.current_result_mut() {
                    result.nvt_oid = oid;
                }
                CreateState::ResultNvt
            }
            (CreateState::Result, "threat") => CreateState::ResultThreat,
            (CreateState::Result, "description") => CreateState::ResultDescription,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            CreateState::TaskName => append(&mut self.data.task_name, text),
            CreateState::TaskComment => append(&mut self.data.task_comment, text),
            CreateState::ResultHost => {
                let text = text.to_owned();
                if let Some(result) = self.current_result_mut() {
                    append(&mut result.host, &text);
                }
            }
            CreateState::ResultPort => {
                let text = text.to_owned();
                if let Some(result) = self.current_result_mut() {
                    append(&mut result.port, &text);
                }
            }
            CreateState::ResultThreat => {
                let text = text.to_owned();
                if let Some(result) = self.current_result_mut() {
                    append(&mut result.threat, &text);
                }
            }
            CreateState::ResultDescription => {
                let text = text.to_owned();
                if let Some(result) = self.current_result_mut() {
                    append(&mut result.description, &text);
                }
            }
            _ => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            CreateState::Root => {
                return EndResult::Complete(Command::CreateReport(std::mem::take(&mut self.data)))
            }
            CreateState::Task | CreateState::Report => CreateState::Root,
            CreateState::TaskName | CreateState::TaskComment => CreateState::Task,
            CreateState::Results => CreateState::Report,
            CreateState::Result => CreateState::Results,
            CreateState::ResultHost
            | CreateState::ResultPort
            | CreateState::ResultNvt
            | CreateState::ResultThreat
            | CreateState::ResultDescription => CreateState::Result,
        };
        EndResult::Open
    }

    fn importing(&self) -> bool {
        self.state.in_import()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifyState {
    Root,
    Comment,
}

pub struct ModifyReportParser {
    state: ModifyState,
    data: ModifyReport,
}

impl ModifyReportParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyReportParser {
            state: ModifyState::Root,
            data: ModifyReport {
                report_id: attrs.get_owned("report_id"),
                ..ModifyReport::default()
            },
        }
    }
}

impl ElementParser for ModifyReportParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        match (self.state, name) {
            (ModifyState::Root, "comment") => {
                self.state = ModifyState::Comment;
                StartResult::Consumed
            }
            _ => StartResult::Unknown,
        }
    }

    fn text(&mut self, text: &str) {
        if self.state == ModifyState::Comment {
            append(&mut self.data.comment, text);
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            ModifyState::Root => {
                EndResult::Complete(Command::ModifyReport(std::mem::take(&mut self.data)))
            }
            ModifyState::Comment => {
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
    fn container_task_created_on_the_fly() {
        let mut parser = CreateReportParser::new();
        parser.start_element("task", &Attrs::default());
        parser.start_element("name", &Attrs::default());
        parser.text("Imported results");
        parser.end_element("name");
        parser.end_element("task");
        parser.start_element("report", &Attrs::default());
        parser.start_element("results", &Attrs::default());
        parser.start_element("result", &Attrs::default());
        for (tag, value) in [("host", "10.0.0.1"), ("port", "443/tcp"), ("threat", "High")] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        parser.end_element("result");
        parser.end_element("results");
        parser.end_element("report");
        match parser.end_element("create_report") {
            EndResult::Complete(Command::CreateReport(data)) => {
                assert_eq!(data.task_name.as_deref(), Some("Imported results"));
                assert_eq!(data.results.len(), 1);
                assert_eq!(data.results[0].host.as_deref(), Some("10.0.0.1"));
                assert_eq!(data.results[0].threat.as_deref(), Some("High"));
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn report_subtree_is_importing() {
        let mut parser = CreateReportParser::new();
        assert!(!parser.importing());
        parser.start_element("report", &Attrs::default());
        assert!(parser.importing());
    }

    #[test]
    fn modify_report_comment_only() {
        let attrs = Attrs::new(vec![("report_id".into(), "r1".into())]);
        let mut parser = ModifyReportParser::new(&attrs);
        assert_eq!(
            parser.start_element("name", &Attrs::default()),
            StartResult::Unknown
        );
        parser.start_element("comment", &Attrs::default());
        parser.text("reviewed");
        parser.end_element("comment");
        match parser.end_element("modify_report") {
            EndResult::Complete(Command::ModifyReport(data)) => {
                assert_eq!(data.report_id.as_deref(), Some("r1"));
                assert_eq!(data.comment.as_deref(), Some("reviewed"));
            }
            _ => panic!("expected completion"),
        }
    }
}
