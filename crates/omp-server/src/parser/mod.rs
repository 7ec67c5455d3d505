//! The state machine core.
//!
//! Every top-level command is parsed by a small, self-contained element
//! parser that tracks its own nesting position and owns its command
//! record while the command is open. [`ActiveCommand`] is the sum over
//! all families, so the set of grammars is closed at compile time.
//!
//! A parser reports `Unknown` for a start element it has no transition
//! for; the session then either errors out (normal mode) or begins a
//! read-over (import grammars), leaving the parser object untouched
//! until the unknown subtree has been swallowed.

mod agents;
mod alerts;
mod authenticate;
mod configs;
mod credentials;
mod filters;
mod get;
mod misc;
mod notes;
mod port_lists;
mod report_formats;
mod reports;
mod schedules;
mod slaves;
mod targets;
mod tasks;
mod wizard;

pub use authenticate::AuthenticateParser;

use omp_core::event::Attrs;

use crate::backend::ResourceKind;
use crate::command::Command;

/// Outcome of offering a start element to a parser.
#[derive(Debug, PartialEq, Eq)]
pub enum StartResult {
    /// The element was a legal transition.
    Consumed,
    /// No transition exists from the current position.
    Unknown,
}

/// Outcome of offering an end element to a parser.
pub enum EndResult {
    /// Still inside the command.
    Open,
    /// The command's own closing tag was consumed; dispatch this.
    Complete(Command),
}

/// One family's element parser.
pub trait ElementParser {
    /// Handle a child element opening at the current position.
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult;

    /// Append character data to the field the current position
    /// designates; most positions designate none and drop the text.
    fn text(&mut self, text: &str);

    /// Handle an element closing; interior closes pop to the parent
    /// position, the root close completes the command.
    fn end_element(&mut self, name: &str) -> EndResult;

    /// True while positioned inside an import grammar, where unknown
    /// elements are read over instead of rejected.
    fn importing(&self) -> bool {
        false
    }
}

/// Append a text chunk to an optional field, concatenating with chunks
/// already delivered for the same element.
pub(crate) fn append(dst: &mut Option<String>, text: &str) {
    dst.get_or_insert_with(String::new).push_str(text);
}

/// Append a text chunk to a required (String) field.
pub(crate) fn append_str(dst: &mut String, text: &str) {
    dst.push_str(text);
}

// =============================================================================
// Leaf Commands
// =============================================================================

/// Parser for commands whose whole payload is attributes on the opening
/// tag (the GET family, DELETE_*, task lifecycle verbs, and the other
/// one-shot verbs). Any child element is unknown; the close completes.
#[derive(Debug)]
pub struct LeafCommand {
    command: Option<Command>,
}

impl LeafCommand {
    /// Wrap an already-built command.
    pub fn new(command: Command) -> Self {
        LeafCommand {
            command: Some(command),
        }
    }
}

impl ElementParser for LeafCommand {
    fn start_element(&mut self, _name: &str, _attrs: &Attrs) -> StartResult {
        StartResult::Unknown
    }

    fn text(&mut self, _text: &str) {}

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.command.take() {
            Some(command) => EndResult::Complete(command),
            // A second close can only mean the session routed events to
            // a finished parser; that is an engine bug.
            None => EndResult::Open,
        }
    }
}

// =============================================================================
// The Family Sum
// =============================================================================

/// The sum over all command-family parsers.
///
/// Exactly one of these is live per open command; dropping it is the
/// command-data reset.
pub enum ActiveCommand {
    Leaf(LeafCommand),
    Authenticate(authenticate::AuthenticateParser),
    CreateAgent(agents::CreateAgentParser),
    ModifyAgent(agents::ModifyAgentParser),
    CreateAlert(alerts::CreateAlertParser),
    ModifyAlert(alerts::ModifyAlertParser),
    CreateConfig(configs::CreateConfigParser),
    ModifyConfig(configs::ModifyConfigParser),
    CreateFilter(filters::CreateFilterParser),
    ModifyFilter(filters::ModifyFilterParser),
    CreateLscCredential(credentials::CreateLscCredentialParser),
    ModifyLscCredential(credentials::ModifyLscCredentialParser),
    CreateNote(notes::CreateNoteParser),
    ModifyNote(notes::ModifyNoteParser),
    CreateOverride(notes::CreateOverrideParser),
    ModifyOverride(notes::ModifyOverrideParser),
    CreatePortList(port_lists::CreatePortListParser),
    ModifyPortList(port_lists::ModifyPortListParser),
    CreatePortRange(port_lists::CreatePortRangeParser),
    CreateReport(reports::CreateReportParser),
    ModifyReport(reports::ModifyReportParser),
    CreateReportFormat(report_formats::CreateReportFormatParser),
    ModifyReportFormat(report_formats::ModifyReportFormatParser),
    CreateSchedule(schedules::CreateScheduleParser),
    ModifySchedule(schedules::ModifyScheduleParser),
    CreateSlave(slaves::CreateSlaveParser),
    ModifySlave(slaves::ModifySlaveParser),
    CreateTarget(targets::CreateTargetParser),
    ModifyTarget(targets::ModifyTargetParser),
    CreateTask(tasks::CreateTaskParser),
    ModifyTask(tasks::ModifyTaskParser),
    RunWizard(wizard::RunWizardParser),
}

impl ActiveCommand {
    /// Wire name of the open command, for error envelopes.
    pub fn command_name(&self) -> &str {
        self.name_ref()
    }

    fn name_ref(&self) -> &str {
        match self {
            ActiveCommand::Leaf(leaf) => leaf
                .command
                .as_ref()
                .map(Command::name)
                .unwrap_or("omp"),
            ActiveCommand::Authenticate(_) => "authenticate",
            ActiveCommand::CreateAgent(_) => "create_agent",
            ActiveCommand::ModifyAgent(_) => "modify_agent",
            ActiveCommand::CreateAlert(_) => "create_alert",
            ActiveCommand::ModifyAlert(_) => "modify_alert",
            ActiveCommand::CreateConfig(_) => "create_config",
            ActiveCommand::ModifyConfig(_) => "modify_config",
            ActiveCommand::CreateFilter(_) => "create_filter",
            ActiveCommand::ModifyFilter(_) => "modify_filter",
            ActiveCommand::CreateLscCredential(_) => "create_lsc_credential",
            ActiveCommand::ModifyLscCredential(_) => "modify_lsc_credential",
            ActiveCommand::CreateNote(_) => "create_note",
            ActiveCommand::ModifyNote(_) => "modify_note",
            ActiveCommand::CreateOverride(_) => "create_override",
            ActiveCommand::ModifyOverride(_) => "modify_override",
            ActiveCommand::CreatePortList(_) => "create_port_list",
            ActiveCommand::ModifyPortList(_) => "modify_port_list",
            ActiveCommand::CreatePortRange(_) => "create_port_range",
            ActiveCommand::CreateReport(_) => "create_report",
            ActiveCommand::ModifyReport(_) => "modify_report",
            ActiveCommand::CreateReportFormat(_) => "create_report_format",
            ActiveCommand::ModifyReportFormat(_) => "modify_report_format",
            ActiveCommand::CreateSchedule(_) => "create_schedule",
            ActiveCommand::ModifySchedule(_) => "modify_schedule",
            ActiveCommand::CreateSlave(_) => "create_slave",
            ActiveCommand::ModifySlave(_) => "modify_slave",
            ActiveCommand::CreateTarget(_) => "create_target",
            ActiveCommand::ModifyTarget(_) => "modify_target",
            ActiveCommand::CreateTask(_) => "create_task",
            ActiveCommand::ModifyTask(_) => "modify_task",
            ActiveCommand::RunWizard(_) => "run_wizard",
        }
    }
}

impl ElementParser for ActiveCommand {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        match self {
            ActiveCommand::Leaf(p) => p.start_element(name, attrs),
            ActiveCommand::Authenticate(p) => p.start_element(name, attrs),
            ActiveCommand::CreateAgent(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyAgent(p) => p.start_element(name, attrs),
            ActiveCommand::CreateAlert(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyAlert(p) => p.start_element(name, attrs),
            ActiveCommand::CreateConfig(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyConfig(p) => p.start_element(name, attrs),
            ActiveCommand::CreateFilter(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyFilter(p) => p.start_element(name, attrs),
            ActiveCommand::CreateLscCredential(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyLscCredential(p) => p.start_element(name, attrs),
            ActiveCommand::CreateNote(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyNote(p) => p.start_element(name, attrs),
            ActiveCommand::CreateOverride(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyOverride(p) => p.start_element(name, attrs),
            ActiveCommand::CreatePortList(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyPortList(p) => p.start_element(name, attrs),
            ActiveCommand::CreatePortRange(p) => p.start_element(name, attrs),
            ActiveCommand::CreateReport(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyReport(p) => p.start_element(name, attrs),
            ActiveCommand::CreateReportFormat(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyReportFormat(p) => p.start_element(name, attrs),
            ActiveCommand::CreateSchedule(p) => p.start_element(name, attrs),
            ActiveCommand::ModifySchedule(p) => p.start_element(name, attrs),
            ActiveCommand::CreateSlave(p) => p.start_element(name, attrs),
            ActiveCommand::ModifySlave(p) => p.start_element(name, attrs),
            ActiveCommand::CreateTarget(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyTarget(p) => p.start_element(name, attrs),
            ActiveCommand::CreateTask(p) => p.start_element(name, attrs),
            ActiveCommand::ModifyTask(p) => p.start_element(name, attrs),
            ActiveCommand::RunWizard(p) => p.start_element(name, attrs),
        }
    }

    fn text(&mut self, text: &str) {
        match self {
            ActiveCommand::Leaf(p) => p.text(text),
            ActiveCommand::Authenticate(p) => p.text(text),
            ActiveCommand::CreateAgent(p) => p.text(text),
            ActiveCommand::ModifyAgent(p) => p.text(text),
            ActiveCommand::CreateAlert(p) => p.text(text),
            ActiveCommand::ModifyAlert(p) => p.text(text),
            ActiveCommand::CreateConfig(p) => p.text(text),
            ActiveCommand::ModifyConfig(p) => p.text(text),
            ActiveCommand::CreateFilter(p) => p.text(text),
            ActiveCommand::ModifyFilter(p) => p.text(text),
            ActiveCommand::CreateLscCredential(p) => p.text(text),
            ActiveCommand::ModifyLscCredential(p) => p.text(text),
            ActiveCommand::CreateNote(p) => p.text(text),
            ActiveCommand::ModifyNote(p) => p.text(text),
            ActiveCommand::CreateOverride(p) => p.text(text),
            ActiveCommand::ModifyOverride(p) => p.text(text),
            ActiveCommand::CreatePortList(p) => p.text(text),
            ActiveCommand::ModifyPortList(p) => p.text(text),
            ActiveCommand::CreatePortRange(p) => p.text(text),
            ActiveCommand::CreateReport(p) => p.text(text),
            ActiveCommand::ModifyReport(p) => p.text(text),
            ActiveCommand::CreateReportFormat(p) => p.text(text),
            ActiveCommand::ModifyReportFormat(p) => p.text(text),
            ActiveCommand::CreateSchedule(p) => p.text(text),
            ActiveCommand::ModifySchedule(p) => p.text(text),
            ActiveCommand::CreateSlave(p) => p.text(text),
            ActiveCommand::ModifySlave(p) => p.text(text),
            ActiveCommand::CreateTarget(p) => p.text(text),
            ActiveCommand::ModifyTarget(p) => p.text(text),
            ActiveCommand::CreateTask(p) => p.text(text),
            ActiveCommand::ModifyTask(p) => p.text(text),
            ActiveCommand::RunWizard(p) => p.text(text),
        }
    }

    fn end_element(&mut self, name: &str) -> EndResult {
        match self {
            ActiveCommand::Leaf(p) => p.end_element(name),
            ActiveCommand::Authenticate(p) => p.end_element(name),
            ActiveCommand::CreateAgent(p) => p.end_element(name),
            ActiveCommand::ModifyAgent(p) => p.end_element(name),
            ActiveCommand::CreateAlert(p) => p.end_element(name),
            ActiveCommand::ModifyAlert(p) => p.end_element(name),
            ActiveCommand::CreateConfig(p) => p.end_element(name),
            ActiveCommand::ModifyConfig(p) => p.end_element(name),
            ActiveCommand::CreateFilter(p) => p.end_element(name),
            ActiveCommand::ModifyFilter(p) => p.end_element(name),
            ActiveCommand::CreateLscCredential(p) => p.end_element(name),
            ActiveCommand::ModifyLscCredential(p) => p.end_element(name),
            ActiveCommand::CreateNote(p) => p.end_element(name),
            ActiveCommand::ModifyNote(p) => p.end_element(name),
            ActiveCommand::CreateOverride(p) => p.end_element(name),
            ActiveCommand::ModifyOverride(p) => p.end_element(name),
            ActiveCommand::CreatePortList(p) => p.end_element(name),
            ActiveCommand::ModifyPortList(p) => p.end_element(name),
            ActiveCommand::CreatePortRange(p) => p.end_element(name),
            ActiveCommand::CreateReport(p) => p.end_element(name),
            ActiveCommand::ModifyReport(p) => p.end_element(name),
            ActiveCommand::CreateReportFormat(p) => p.end_element(name),
            ActiveCommand::ModifyReportFormat(p) => p.end_element(name),
            ActiveCommand::CreateSchedule(p) => p.end_element(name),
            ActiveCommand::ModifySchedule(p) => p.end_element(name),
            ActiveCommand::CreateSlave(p) => p.end_element(name),
            ActiveCommand::ModifySlave(p) => p.end_element(name),
            ActiveCommand::CreateTarget(p) => p.end_element(name),
            ActiveCommand::ModifyTarget(p) => p.end_element(name),
            ActiveCommand::CreateTask(p) => p.end_element(name),
            ActiveCommand::ModifyTask(p) => p.end_element(name),
            ActiveCommand::RunWizard(p) => p.end_element(name),
        }
    }

    fn importing(&self) -> bool {
        match self {
            ActiveCommand::CreateConfig(p) => p.importing(),
            ActiveCommand::CreatePortList(p) => p.importing(),
            ActiveCommand::CreateReport(p) => p.importing(),
            ActiveCommand::CreateReportFormat(p) => p.importing(),
            _ => false,
        }
    }
}

// =============================================================================
// Top-level Routing
// =============================================================================

/// Open a top-level command: the transition out of the baseline state.
///
/// Returns `None` for an element that is not a command — the caller
/// treats that as a protocol syntax error.
pub fn open_command(name: &str, attrs: &Attrs) -> Option<ActiveCommand> {
    use crate::command::GetCommand;

    // GET family: payload is entirely attributes.
    if let Some(what) = get::get_what(name) {
        let data = get::get_data(name, &what, attrs);
        return Some(ActiveCommand::Leaf(LeafCommand::new(Command::Get(
            GetCommand { what, data },
        ))));
    }

    // Other one-shot verbs.
    if let Some(command) = misc::leaf_command(name, attrs) {
        return Some(ActiveCommand::Leaf(LeafCommand::new(command)));
    }

    // Structured grammars.
    let parser = match name {
        "authenticate" => ActiveCommand::Authenticate(AuthenticateParser::new()),
        "create_agent" => ActiveCommand::CreateAgent(agents::CreateAgentParser::new()),
        "modify_agent" => ActiveCommand::ModifyAgent(agents::ModifyAgentParser::new(attrs)),
        "create_alert" => ActiveCommand::CreateAlert(alerts::CreateAlertParser::new()),
        "modify_alert" => ActiveCommand::ModifyAlert(alerts::ModifyAlertParser::new(attrs)),
        "create_config" => ActiveCommand::CreateConfig(configs::CreateConfigParser::new()),
        "modify_config" => ActiveCommand::ModifyConfig(configs::ModifyConfigParser::new(attrs)),
        "create_filter" => ActiveCommand::CreateFilter(filters::CreateFilterParser::new()),
        "modify_filter" => ActiveCommand::ModifyFilter(filters::ModifyFilterParser::new(attrs)),
        "create_lsc_credential" => {
            ActiveCommand::CreateLscCredential(credentials::CreateLscCredentialParser::new())
        }
        "modify_lsc_credential" => {
            ActiveCommand::ModifyLscCredential(credentials::ModifyLscCredentialParser::new(attrs))
        }
        "create_note" => ActiveCommand::CreateNote(notes::CreateNoteParser::new(attrs)),
        "modify_note" => ActiveCommand::ModifyNote(notes::ModifyNoteParser::new(attrs)),
        "create_override" => ActiveCommand::CreateOverride(notes::CreateOverrideParser::new(attrs)),
        "modify_override" => ActiveCommand::ModifyOverride(notes::ModifyOverrideParser::new(attrs)),
        "create_port_list" => {
            ActiveCommand::CreatePortList(port_lists::CreatePortListParser::new())
        }
        "modify_port_list" => {
            ActiveCommand::ModifyPortList(port_lists::ModifyPortListParser::new(attrs))
        }
        "create_port_range" => {
            ActiveCommand::CreatePortRange(port_lists::CreatePortRangeParser::new())
        }
        "create_report" => ActiveCommand::CreateReport(reports::CreateReportParser::new()),
        "modify_report" => ActiveCommand::ModifyReport(reports::ModifyReportParser::new(attrs)),
        "create_report_format" => {
            ActiveCommand::CreateReportFormat(report_formats::CreateReportFormatParser::new())
        }
        "modify_report_format" => ActiveCommand::ModifyReportFormat(
            report_formats::ModifyReportFormatParser::new(attrs),
        ),
        "create_schedule" => ActiveCommand::CreateSchedule(schedules::CreateScheduleParser::new()),
        "modify_schedule" => {
            ActiveCommand::ModifySchedule(schedules::ModifyScheduleParser::new(attrs))
        }
        "create_slave" => ActiveCommand::CreateSlave(slaves::CreateSlaveParser::new()),
        "modify_slave" => ActiveCommand::ModifySlave(slaves::ModifySlaveParser::new(attrs)),
        "create_target" => ActiveCommand::CreateTarget(targets::CreateTargetParser::new()),
        "modify_target" => ActiveCommand::ModifyTarget(targets::ModifyTargetParser::new(attrs)),
        "create_task" => ActiveCommand::CreateTask(tasks::CreateTaskParser::new()),
        "modify_task" => ActiveCommand::ModifyTask(tasks::ModifyTaskParser::new(attrs)),
        "run_wizard" => ActiveCommand::RunWizard(wizard::RunWizardParser::new()),
        _ => return None,
    };
    Some(parser)
}

/// The resource kind a DELETE_* verb addresses, if the name is one.
pub(crate) fn delete_kind(name: &str) -> Option<ResourceKind> {
    match name {
        "delete_agent" => Some(ResourceKind::Agent),
        "delete_alert" => Some(ResourceKind::Alert),
        "delete_config" => Some(ResourceKind::Config),
        "delete_filter" => Some(ResourceKind::Filter),
        "delete_lsc_credential" => Some(ResourceKind::LscCredential),
        "delete_note" => Some(ResourceKind::Note),
        "delete_override" => Some(ResourceKind::Override),
        "delete_port_list" => Some(ResourceKind::PortList),
        "delete_port_range" => Some(ResourceKind::PortRange),
        "delete_report" => Some(ResourceKind::Report),
        "delete_report_format" => Some(ResourceKind::ReportFormat),
        "delete_schedule" => Some(ResourceKind::Schedule),
        "delete_slave" => Some(ResourceKind::Slave),
        "delete_target" => Some(ResourceKind::Target),
        "delete_task" => Some(ResourceKind::Task),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use omp_core::event::Attrs;

    fn no_attrs() -> Attrs {
        Attrs::default()
    }

    #[test]
    fn unknown_top_level_name_is_rejected() {
        assert!(open_command("frobnicate", &no_attrs()).is_none());
        assert!(open_command("", &no_attrs()).is_none());
    }

    #[test]
    fn every_family_opens() {
        for name in [
            "authenticate",
            "create_agent",
            "modify_agent",
            "create_alert",
            "modify_alert",
            "create_config",
            "modify_config",
            "create_filter",
            "modify_filter",
            "create_lsc_credential",
            "modify_lsc_credential",
            "create_note",
            "modify_note",
            "create_override",
            "modify_override",
            "create_port_list",
            "modify_port_list",
            "create_port_range",
            "create_report",
            "modify_report",
            "create_report_format",
            "modify_report_format",
            "create_schedule",
            "modify_schedule",
            "create_slave",
            "modify_slave",
            "create_target",
            "modify_target",
            "create_task",
            "modify_task",
            "run_wizard",
        ] {
            assert!(open_command(name, &no_attrs()).is_some(), "{}", name);
        }
    }

    #[test]
    fn leaf_commands_reject_children() {
        let mut parser = open_command("get_version", &no_attrs()).unwrap();
        assert_eq!(
            parser.start_element("bogus", &no_attrs()),
            StartResult::Unknown
        );
        match parser.end_element("get_version") {
            EndResult::Complete(Command::GetVersion) => {}
            _ => panic!("expected completed get_version"),
        }
    }

    #[test]
    fn command_name_matches_open_element() {
        let parser = open_command("create_task", &no_attrs()).unwrap();
        assert_eq!(parser.command_name(), "create_task");
        let parser = open_command("delete_task", &no_attrs()).unwrap();
        assert_eq!(parser.command_name(), "delete_task");
    }
}
