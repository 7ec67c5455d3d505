//! Command dispatch.
//!
//! A finished command record passes through, in order: the
//! authentication gate, required-field validation, role authorization,
//! the disabled-command check, resource resolution, and finally the
//! backend call whose result is mapped onto the protocol statuses.
//! Every path writes exactly one response envelope.

pub(crate) mod get;
mod resources;
mod tasks;

use tracing::debug;

use omp_core::constants::PROTOCOL_VERSION;
use omp_core::error::Result;
use omp_core::sink::OutputSink;
use omp_core::status::StatusCode;
use omp_core::xml::XmlWriter;

use crate::backend::{Backend, BackendError};
use crate::command::Command;
use crate::response;
use crate::session::{Flow, Phase, Role, Session, SessionUser};
use crate::wizard;

/// Commands the protocol accepts before AUTHENTICATE.
fn pre_auth_allowed(name: &str) -> bool {
    matches!(name, "authenticate" | "get_version" | "help")
}

/// Map a bare backend failure onto a status.
pub(crate) fn backend_status(error: &BackendError) -> StatusCode {
    match error {
        BackendError::Failure(_) => StatusCode::Internal,
        BackendError::Down => StatusCode::Down,
    }
}

/// Dispatch one command and write its response.
pub(crate) fn dispatch<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: Command,
) -> Result<Flow> {
    let name = command.name();

    if !session.authenticated() && !pre_auth_allowed(name) {
        response::simple(&mut session.sink, name, StatusCode::AuthRequired)?;
        return Ok(Flow::Continue);
    }

    if let Some(message) = validate(&command) {
        response::with_text(&mut session.sink, name, StatusCode::Syntax, &message)?;
        return Ok(Flow::Continue);
    }

    if command.is_mutating() && session.user().map(|u| u.role) == Some(Role::Observer) {
        response::simple(&mut session.sink, name, StatusCode::Forbidden)?;
        return Ok(Flow::Continue);
    }

    if session.config.is_disabled(name) {
        response::simple(&mut session.sink, name, StatusCode::Unavailable)?;
        return Ok(Flow::Continue);
    }

    match command {
        Command::Authenticate(credentials) => {
            let outcome = backend.authenticate(&credentials);
            match outcome {
                Ok(Some(info)) => {
                    let user = SessionUser {
                        username: credentials.username.clone(),
                        role: Role::parse(&info.role),
                        timezone: info.timezone.clone(),
                    };
                    debug!(username = %user.username, "authenticated");
                    session.phase = Phase::Authenticated(user.clone());
                    response::open(&mut session.sink, "authenticate", StatusCode::Ok)?;
                    let mut writer = XmlWriter::new(&mut session.sink);
                    writer.text_element("role", user.role.as_str())?;
                    writer.text_element("timezone", &user.timezone)?;
                    response::close(&mut session.sink, "authenticate")?;
                }
                Ok(None) => {
                    debug!(username = %credentials.username, "authentication failed");
                    response::simple(&mut session.sink, "authenticate", StatusCode::AuthFailed)?;
                }
                Err(error) => {
                    response::simple(&mut session.sink, "authenticate", backend_status(&error))?;
                }
            }
            Ok(Flow::Continue)
        }

        Command::Help => {
            response::open(&mut session.sink, "help", StatusCode::Ok)?;
            XmlWriter::new(&mut session.sink).text(HELP_TEXT)?;
            response::close(&mut session.sink, "help")?;
            Ok(Flow::Continue)
        }

        Command::GetVersion => {
            response::open(&mut session.sink, "get_version", StatusCode::Ok)?;
            XmlWriter::new(&mut session.sink).text_element("version", PROTOCOL_VERSION)?;
            response::close(&mut session.sink, "get_version")?;
            Ok(Flow::Continue)
        }

        Command::Get(get_command) => get::send_get(session, backend, &get_command),
        Command::GetNvtFamilies => get::send_nvt_families(session, backend),
        Command::GetNvtFeedChecksum { algorithm } => {
            get::send_feed_checksum(session, backend, algorithm.as_deref().unwrap_or(""))
        }
        Command::GetPreferences {
            nvt_oid,
            config_id,
            preference,
        } => get::send_preferences(
            session,
            backend,
            nvt_oid.as_deref(),
            config_id.as_deref(),
            preference.as_deref(),
        ),
        Command::GetDependencies => get::send_dependencies(session, backend),
        Command::GetSystemReports {
            name,
            duration,
            brief,
        } => get::send_system_reports(session, backend, name.as_deref(), duration, brief),
        Command::GetTargetLocators => get::send_target_locators(session, backend),

        Command::CreateAgent(_)
        | Command::CreateAlert(_)
        | Command::CreateConfig(_)
        | Command::CreateFilter(_)
        | Command::CreateLscCredential(_)
        | Command::CreateNote(_)
        | Command::CreateOverride(_)
        | Command::CreatePortList(_)
        | Command::CreatePortRange(_)
        | Command::CreateReport(_)
        | Command::CreateReportFormat(_)
        | Command::CreateSchedule(_)
        | Command::CreateSlave(_)
        | Command::CreateTarget(_)
        | Command::CreateTask(_) => resources::create(session, backend, command),

        Command::ModifyAgent(_)
        | Command::ModifyAlert(_)
        | Command::ModifyConfig(_)
        | Command::ModifyFilter(_)
        | Command::ModifyLscCredential(_)
        | Command::ModifyNote(_)
        | Command::ModifyOverride(_)
        | Command::ModifyPortList(_)
        | Command::ModifyReport(_)
        | Command::ModifyReportFormat(_)
        | Command::ModifySchedule(_)
        | Command::ModifySlave(_)
        | Command::ModifyTarget(_)
        | Command::ModifyTask(_) => resources::modify(session, backend, command),

        Command::Delete { kind, id, ultimate } => {
            resources::delete(session, backend, kind, id.as_deref().unwrap_or(""), ultimate)
        }
        Command::EmptyTrashcan => resources::empty_trashcan(session, backend),
        Command::Restore { id } => {
            resources::restore(session, backend, id.as_deref().unwrap_or(""))
        }

        Command::StartTask { task_id }
        | Command::StopTask { task_id }
        | Command::PauseTask { task_id }
        | Command::ResumePausedTask { task_id }
        | Command::ResumeStoppedTask { task_id }
        | Command::ResumeOrStartTask { task_id } => {
            tasks::lifecycle(session, backend, name, task_id.as_deref().unwrap_or(""))
        }

        Command::RunWizard(data) => wizard::run(session, backend, &data),
        Command::TestAlert { alert_id } => {
            tasks::test_alert(session, backend, alert_id.as_deref().unwrap_or(""))
        }
        Command::VerifyAgent { agent_id } => {
            tasks::verify_agent(session, backend, agent_id.as_deref().unwrap_or(""))
        }
        Command::VerifyReportFormat { report_format_id } => tasks::verify_report_format(
            session,
            backend,
            report_format_id.as_deref().unwrap_or(""),
        ),
    }
}

// =============================================================================
// Required-field Validation
// =============================================================================

fn missing(what: &str) -> Option<String> {
    Some(what.to_owned())
}

fn empty(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Check the command's mandatory sub-elements and attributes.
///
/// Returns the command-specific syntax-error message for the first
/// missing requirement, `None` when the command is complete.
fn validate(command: &Command) -> Option<String> {
    match command {
        Command::Authenticate(credentials) => {
            if credentials.username.is_empty() {
                missing("AUTHENTICATE requires a username")
            } else {
                None
            }
        }
        Command::CreateAgent(data) if empty(&data.name) => {
            missing("CREATE_AGENT requires a name")
        }
        Command::CreateAlert(data) => {
            if empty(&data.name) {
                missing("CREATE_ALERT requires a name")
            } else if data.condition.name.is_empty() {
                missing("CREATE_ALERT requires a condition")
            } else if data.event.name.is_empty() {
                missing("CREATE_ALERT requires an event")
            } else if data.method.name.is_empty() {
                missing("CREATE_ALERT requires a method")
            } else {
                None
            }
        }
        Command::CreateConfig(data) => {
            let import_named = data
                .import
                .as_ref()
                .is_some_and(|import| !empty(&import.name));
            if empty(&data.name) && !import_named {
                missing("CREATE_CONFIG requires a name")
            } else {
                None
            }
        }
        Command::CreateFilter(data) if empty(&data.name) => {
            missing("CREATE_FILTER requires a name")
        }
        Command::CreateLscCredential(data) => {
            if empty(&data.name) {
                missing("CREATE_LSC_CREDENTIAL requires a name")
            } else if empty(&data.login) {
                missing("CREATE_LSC_CREDENTIAL requires a login")
            } else {
                None
            }
        }
        Command::CreateNote(data) => {
            if empty(&data.text) {
                missing("CREATE_NOTE requires a text")
            } else if empty(&data.nvt_oid) {
                missing("CREATE_NOTE requires an NVT")
            } else {
                None
            }
        }
        Command::CreateOverride(data) => {
            if empty(&data.text) {
                missing("CREATE_OVERRIDE requires a text")
            } else if empty(&data.nvt_oid) {
                missing("CREATE_OVERRIDE requires an NVT")
            } else {
                None
            }
        }
        Command::CreatePortList(data) => {
            let import_named = data
                .import
                .as_ref()
                .is_some_and(|import| !empty(&import.name));
            if empty(&data.name) && !import_named {
                missing("CREATE_PORT_LIST requires a name")
            } else if empty(&data.port_range) && data.import.is_none() {
                missing("CREATE_PORT_LIST requires a port_range")
            } else {
                None
            }
        }
        Command::CreatePortRange(data) => {
            if empty(&data.port_list_id) {
                missing("CREATE_PORT_RANGE requires a port_list")
            } else if empty(&data.start) || empty(&data.end) {
                missing("CREATE_PORT_RANGE requires a start and an end")
            } else if empty(&data.range_type) {
                missing("CREATE_PORT_RANGE requires a type")
            } else {
                None
            }
        }
        Command::CreateReport(data) => {
            if empty(&data.task_id) && empty(&data.task_name) {
                missing("CREATE_REPORT requires a task")
            } else {
                None
            }
        }
        Command::CreateReportFormat(data) => {
            let named = data
                .import
                .as_ref()
                .is_some_and(|import| !empty(&import.name));
            if named {
                None
            } else {
                missing("CREATE_REPORT_FORMAT requires a GET_REPORT_FORMATS_RESPONSE")
            }
        }
        Command::CreateSchedule(data) if empty(&data.name) => {
            missing("CREATE_SCHEDULE requires a name")
        }
        Command::CreateSlave(data) => {
            if empty(&data.name) {
                missing("CREATE_SLAVE requires a name")
            } else if empty(&data.host) {
                missing("CREATE_SLAVE requires a host")
            } else if empty(&data.port) {
                missing("CREATE_SLAVE requires a port")
            } else if empty(&data.login) {
                missing("CREATE_SLAVE requires a login")
            } else {
                None
            }
        }
        Command::CreateTarget(data) => {
            if empty(&data.name) {
                missing("CREATE_TARGET requires a name")
            } else if empty(&data.hosts) && data.target_locator.is_none() {
                missing("CREATE_TARGET requires a host list or a target locator")
            } else {
                None
            }
        }
        Command::CreateTask(data) => {
            if empty(&data.name) {
                missing("CREATE_TASK requires a name")
            } else if empty(&data.config_id) {
                missing("CREATE_TASK requires a config")
            } else if empty(&data.target_id) {
                missing("CREATE_TASK requires a target")
            } else {
                None
            }
        }
        Command::ModifyAgent(data) if empty(&data.agent_id) => {
            missing("MODIFY_AGENT requires an agent_id attribute")
        }
        Command::ModifyAlert(data) if empty(&data.alert_id) => {
            missing("MODIFY_ALERT requires an alert_id attribute")
        }
        Command::ModifyConfig(data) if empty(&data.config_id) => {
            missing("MODIFY_CONFIG requires a config_id attribute")
        }
        Command::ModifyFilter(data) if empty(&data.filter_id) => {
            missing("MODIFY_FILTER requires a filter_id attribute")
        }
        Command::ModifyLscCredential(data) if empty(&data.lsc_credential_id) => {
            missing("MODIFY_LSC_CREDENTIAL requires an lsc_credential_id attribute")
        }
        Command::ModifyNote(data) => {
            if empty(&data.note_id) {
                missing("MODIFY_NOTE requires a note_id attribute")
            } else if empty(&data.text) {
                missing("MODIFY_NOTE requires a text")
            } else {
                None
            }
        }
        Command::ModifyOverride(data) => {
            if empty(&data.override_id) {
                missing("MODIFY_OVERRIDE requires an override_id attribute")
            } else if empty(&data.text) {
                missing("MODIFY_OVERRIDE requires a text")
            } else {
                None
            }
        }
        Command::ModifyPortList(data) if empty(&data.port_list_id) => {
            missing("MODIFY_PORT_LIST requires a port_list_id attribute")
        }
        Command::ModifyReport(data) if empty(&data.report_id) => {
            missing("MODIFY_REPORT requires a report_id attribute")
        }
        Command::ModifyReportFormat(data) if empty(&data.report_format_id) => {
            missing("MODIFY_REPORT_FORMAT requires a report_format_id attribute")
        }
        Command::ModifySchedule(data) if empty(&data.schedule_id) => {
            missing("MODIFY_SCHEDULE requires a schedule_id attribute")
        }
        Command::ModifySlave(data) if empty(&data.slave_id) => {
            missing("MODIFY_SLAVE requires a slave_id attribute")
        }
        Command::ModifyTarget(data) if empty(&data.target_id) => {
            missing("MODIFY_TARGET requires a target_id attribute")
        }
        Command::ModifyTask(data) if empty(&data.task_id) => {
            missing("MODIFY_TASK requires a task_id attribute")
        }
        Command::Delete { kind, id, .. } => {
            if id.as_deref().map_or(true, str::is_empty) {
                Some(format!(
                    "DELETE_{} requires a {}_id attribute",
                    kind.tag().to_ascii_uppercase(),
                    kind.tag()
                ))
            } else {
                None
            }
        }
        Command::Restore { id } if id.as_deref().map_or(true, str::is_empty) => {
            missing("RESTORE requires an id attribute")
        }
        Command::StartTask { task_id }
        | Command::StopTask { task_id }
        | Command::PauseTask { task_id }
        | Command::ResumePausedTask { task_id }
        | Command::ResumeStoppedTask { task_id }
        | Command::ResumeOrStartTask { task_id }
            if task_id.as_deref().map_or(true, str::is_empty) =>
        {
            missing("Task lifecycle commands require a task_id attribute")
        }
        Command::RunWizard(data) if empty(&data.name) => {
            missing("RUN_WIZARD requires a name")
        }
        Command::TestAlert { alert_id } if alert_id.as_deref().map_or(true, str::is_empty) => {
            missing("TEST_ALERT requires an alert_id attribute")
        }
        Command::VerifyAgent { agent_id } if agent_id.as_deref().map_or(true, str::is_empty) => {
            missing("VERIFY_AGENT requires an agent_id attribute")
        }
        Command::VerifyReportFormat { report_format_id }
            if report_format_id.as_deref().map_or(true, str::is_empty) =>
        {
            missing("VERIFY_REPORT_FORMAT requires a report_format_id attribute")
        }
        Command::GetNvtFeedChecksum { algorithm }
            if algorithm.as_deref().map_or(true, str::is_empty) =>
        {
            missing("GET_NVT_FEED_CHECKSUM requires an algorithm attribute")
        }
        _ => None,
    }
}

/// Body of the HELP response.
const HELP_TEXT: &str = "\n\
    AUTHENTICATE           Authenticate with the manager.\n\
    COMMANDS               Run a list of commands.\n\
    CREATE_AGENT           Create an agent.\n\
    CREATE_ALERT           Create an alert.\n\
    CREATE_CONFIG          Create a config.\n\
    CREATE_FILTER          Create a filter.\n\
    CREATE_LSC_CREDENTIAL  Create a local security check credential.\n\
    CREATE_NOTE            Create a note.\n\
    CREATE_OVERRIDE        Create an override.\n\
    CREATE_PORT_LIST       Create a port list.\n\
    CREATE_PORT_RANGE      Create a port range.\n\
    CREATE_REPORT          Create a report.\n\
    CREATE_REPORT_FORMAT   Create a report format.\n\
    CREATE_SCHEDULE        Create a schedule.\n\
    CREATE_SLAVE           Create a slave.\n\
    CREATE_TARGET          Create a target.\n\
    CREATE_TASK            Create a task.\n\
    DELETE_AGENT           Delete an agent.\n\
    DELETE_ALERT           Delete an alert.\n\
    DELETE_CONFIG          Delete a config.\n\
    DELETE_FILTER          Delete a filter.\n\
    DELETE_LSC_CREDENTIAL  Delete a local security check credential.\n\
    DELETE_NOTE            Delete a note.\n\
    DELETE_OVERRIDE        Delete an override.\n\
    DELETE_PORT_LIST       Delete a port list.\n\
    DELETE_PORT_RANGE      Delete a port range.\n\
    DELETE_REPORT          Delete a report.\n\
    DELETE_REPORT_FORMAT   Delete a report format.\n\
    DELETE_SCHEDULE        Delete a schedule.\n\
    DELETE_SLAVE           Delete a slave.\n\
    DELETE_TARGET          Delete a target.\n\
    DELETE_TASK            Delete a task.\n\
    EMPTY_TRASHCAN         Empty the trashcan.\n\
    GET_AGENTS             Get all agents.\n\
    GET_ALERTS             Get all alerts.\n\
    GET_CONFIGS            Get all configs.\n\
    GET_DEPENDENCIES       Get dependencies for all available NVTs.\n\
    GET_FILTERS            Get all filters.\n\
    GET_INFO               Get raw information for a given item.\n\
    GET_LSC_CREDENTIALS    Get all local security check credentials.\n\
    GET_NOTES              Get all notes.\n\
    GET_NVTS               Get one or all available NVTs.\n\
    GET_NVT_FAMILIES       Get a list of all NVT families.\n\
    GET_NVT_FEED_CHECKSUM  Get checksum for entire NVT collection.\n\
    GET_OVERRIDES          Get all overrides.\n\
    GET_PORT_LISTS         Get all port lists.\n\
    GET_PREFERENCES        Get preferences for all available NVTs.\n\
    GET_REPORTS            Get all reports.\n\
    GET_REPORT_FORMATS     Get all report formats.\n\
    GET_SCHEDULES          Get all schedules.\n\
    GET_SETTINGS           Get all settings.\n\
    GET_SLAVES             Get all slaves.\n\
    GET_SYSTEM_REPORTS     Get all system reports.\n\
    GET_TARGET_LOCATORS    Get configured target locators.\n\
    GET_TARGETS            Get all targets.\n\
    GET_TASKS              Get all tasks.\n\
    GET_VERSION            Get the OMP version.\n\
    HELP                   Get this help text.\n\
    MODIFY_AGENT           Modify an existing agent.\n\
    MODIFY_ALERT           Modify an existing alert.\n\
    MODIFY_CONFIG          Update an existing config.\n\
    MODIFY_FILTER          Modify an existing filter.\n\
    MODIFY_LSC_CREDENTIAL  Modify an existing LSC credential.\n\
    MODIFY_NOTE            Modify an existing note.\n\
    MODIFY_OVERRIDE        Modify an existing override.\n\
    MODIFY_PORT_LIST       Modify an existing port list.\n\
    MODIFY_REPORT          Modify an existing report.\n\
    MODIFY_REPORT_FORMAT   Modify an existing report format.\n\
    MODIFY_SCHEDULE        Modify an existing schedule.\n\
    MODIFY_SLAVE           Modify an existing slave.\n\
    MODIFY_TARGET          Modify an existing target.\n\
    MODIFY_TASK            Update an existing task.\n\
    PAUSE_TASK             Pause a running task.\n\
    RESTORE                Restore a resource.\n\
    RESUME_OR_START_TASK   Resume task if stopped, else start task.\n\
    RESUME_PAUSED_TASK     Resume a paused task.\n\
    RESUME_STOPPED_TASK    Resume a stopped task.\n\
    RUN_WIZARD             Run a wizard.\n\
    START_TASK             Manually start an existing task.\n\
    STOP_TASK              Stop a running task.\n\
    TEST_ALERT             Run an alert.\n\
    VERIFY_AGENT           Verify an agent.\n\
    VERIFY_REPORT_FORMAT   Verify a report format.\n";

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CreateTask, Credentials, RunWizard};

    #[test]
    fn create_task_requires_name_config_target() {
        let mut data = CreateTask::default();
        assert!(validate(&Command::CreateTask(data.clone()))
            .unwrap()
            .contains("name"));
        data.name = Some("scan".into());
        assert!(validate(&Command::CreateTask(data.clone()))
            .unwrap()
            .contains("config"));
        data.config_id = Some("c1".into());
        assert!(validate(&Command::CreateTask(data.clone()))
            .unwrap()
            .contains("target"));
        data.target_id = Some("t1".into());
        assert!(validate(&Command::CreateTask(data)).is_none());
    }

    #[test]
    fn authenticate_requires_username() {
        let command = Command::Authenticate(Credentials::default());
        assert!(validate(&command).is_some());
        let command = Command::Authenticate(Credentials {
            username: "alice".into(),
            password: String::new(),
        });
        assert!(validate(&command).is_none());
    }

    #[test]
    fn wizard_requires_name() {
        assert!(validate(&Command::RunWizard(RunWizard::default())).is_some());
    }

    #[test]
    fn pre_auth_set_is_closed() {
        assert!(pre_auth_allowed("authenticate"));
        assert!(pre_auth_allowed("get_version"));
        assert!(pre_auth_allowed("help"));
        assert!(!pre_auth_allowed("get_tasks"));
        assert!(!pre_auth_allowed("start_task"));
    }
}
