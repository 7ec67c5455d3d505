//! Finished command records.
//!
//! Each record mirrors exactly the XML sub-elements and attributes the
//! command accepts. A record exists only while its command is open on the
//! wire; the per-family parser owns it during accumulation and hands it
//! to the dispatcher at the closing tag. Dropping the record is the
//! reset — no field survives into the next command.

use crate::backend::ResourceKind;

// =============================================================================
// Shared Sub-records
// =============================================================================

/// Login credentials accumulated inside AUTHENTICATE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Listing controls shared by the GET family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetData {
    /// Restrict to a single resource id.
    pub id: Option<String>,
    /// Filter term supplied inline.
    pub filter: Option<String>,
    /// Id of a stored filter whose term applies.
    pub filt_id: Option<String>,
    /// Sub-type selector (used by GET_INFO).
    pub subtype: Option<String>,
    /// List the trashcan instead of live resources.
    pub trash: bool,
    /// Include full details in each row.
    pub details: bool,
    /// Include permitted-action hints.
    pub actions: Option<String>,
}

// =============================================================================
// GET Commands
// =============================================================================

/// What a GET command lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetWhat {
    /// A stored resource type.
    Resource(ResourceKind),
    /// The NVT collection.
    Nvts,
    /// SecInfo entries ("info" — the irregular singular listing).
    Info,
    /// User settings.
    Settings,
}

/// A paginated, filterable listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCommand {
    pub what: GetWhat,
    pub data: GetData,
}

// =============================================================================
// Create Commands
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct CreateAgent {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub installer: Option<String>,
    pub installer_signature: Option<String>,
    pub howto_install: Option<String>,
    pub howto_use: Option<String>,
}

/// One aspect (condition, event or method) of an alert, with its
/// named data pairs.
#[derive(Debug, Clone, Default)]
pub struct AlertAspect {
    pub name: String,
    pub data: Vec<AlertData>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertData {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct CreateAlert {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub filter_id: Option<String>,
    pub condition: AlertAspect,
    pub event: AlertAspect,
    pub method: AlertAspect,
}

/// Preference carried inside an imported config.
#[derive(Debug, Clone, Default)]
pub struct ImportPreference {
    pub name: String,
    pub nvt_oid: Option<String>,
    pub nvt_name: Option<String>,
    pub value: String,
}

/// NVT selector carried inside an imported config.
#[derive(Debug, Clone, Default)]
pub struct ImportNvtSelector {
    pub name: String,
    pub include: bool,
    pub selector_type: i64,
    pub family_or_nvt: String,
}

/// Payload of a GET_CONFIGS_RESPONSE import.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub preferences: Vec<ImportPreference>,
    pub nvt_selectors: Vec<ImportNvtSelector>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateConfig {
    pub name: Option<String>,
    pub comment: Option<String>,
    /// Id of a config to clone.
    pub copy: Option<String>,
    /// Imported exporter payload, when present.
    pub import: Option<ImportConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateFilter {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub term: Option<String>,
    pub filter_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateLscCredential {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub key_phrase: Option<String>,
    pub key_private: Option<String>,
    pub key_public: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateNote {
    pub text: Option<String>,
    pub hosts: Option<String>,
    pub port: Option<String>,
    pub threat: Option<String>,
    pub task_id: Option<String>,
    pub result_id: Option<String>,
    pub nvt_oid: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOverride {
    pub text: Option<String>,
    pub hosts: Option<String>,
    pub port: Option<String>,
    pub threat: Option<String>,
    pub new_threat: Option<String>,
    pub task_id: Option<String>,
    pub result_id: Option<String>,
    pub nvt_oid: Option<String>,
    pub active: Option<String>,
}

/// Port range carried inside an imported port list.
#[derive(Debug, Clone, Default)]
pub struct ImportPortRange {
    pub start: Option<String>,
    pub end: Option<String>,
    pub range_type: Option<String>,
    pub comment: Option<String>,
}

/// Payload of a GET_PORT_LISTS_RESPONSE import.
#[derive(Debug, Clone, Default)]
pub struct ImportPortList {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub ranges: Vec<ImportPortRange>,
}

#[derive(Debug, Clone, Default)]
pub struct CreatePortList {
    pub name: Option<String>,
    pub comment: Option<String>,
    /// Range specification string, e.g. "T:1-1024,U:53".
    pub port_range: Option<String>,
    /// Imported exporter payload, when present.
    pub import: Option<ImportPortList>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyPortList {
    pub port_list_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreatePortRange {
    pub port_list_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub range_type: Option<String>,
    pub comment: Option<String>,
}

/// Result carried inside an imported report.
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub host: Option<String>,
    pub port: Option<String>,
    pub nvt_oid: Option<String>,
    pub threat: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateReport {
    /// Existing container task to attach the report to.
    pub task_id: Option<String>,
    /// Name for a container task created on the fly.
    pub task_name: Option<String>,
    pub task_comment: Option<String>,
    pub results: Vec<ImportResult>,
}

/// File carried inside an imported report format.
#[derive(Debug, Clone, Default)]
pub struct ImportFormatFile {
    pub name: String,
    pub content: String,
}

/// Parameter carried inside an imported report format.
#[derive(Debug, Clone, Default)]
pub struct ImportFormatParam {
    pub name: String,
    pub value: String,
}

/// Payload of a GET_REPORT_FORMATS_RESPONSE import.
#[derive(Debug, Clone, Default)]
pub struct ImportReportFormat {
    pub name: Option<String>,
    pub extension: Option<String>,
    pub content_type: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub global: bool,
    pub signature: Option<String>,
    pub files: Vec<ImportFormatFile>,
    pub params: Vec<ImportFormatParam>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateReportFormat {
    pub import: Option<ImportReportFormat>,
}

/// Calendar position of a schedule's first run.
#[derive(Debug, Clone, Default)]
pub struct ScheduleTime {
    pub minute: Option<String>,
    pub hour: Option<String>,
    pub day_of_month: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
}

/// A value/unit pair (schedule durations and periods).
#[derive(Debug, Clone, Default)]
pub struct TimedValue {
    pub value: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateSchedule {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub first_time: ScheduleTime,
    pub duration: Option<TimedValue>,
    pub period: Option<TimedValue>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateSlave {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
}

/// Target-locator sub-record of a target.
#[derive(Debug, Clone, Default)]
pub struct TargetLocator {
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateTarget {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub hosts: Option<String>,
    pub port_list_id: Option<String>,
    pub port_range: Option<String>,
    pub ssh_lsc_credential_id: Option<String>,
    pub ssh_port: Option<String>,
    pub smb_lsc_credential_id: Option<String>,
    pub target_locator: Option<TargetLocator>,
}

/// Per-task scanner preference.
#[derive(Debug, Clone, Default)]
pub struct TaskPreference {
    pub name: Option<String>,
    pub scanner_name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub rcfile: Option<String>,
    pub config_id: Option<String>,
    pub target_id: Option<String>,
    pub schedule_id: Option<String>,
    pub slave_id: Option<String>,
    pub alert_ids: Vec<String>,
    pub preferences: Vec<TaskPreference>,
}

// =============================================================================
// Modify Commands
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct ModifyAgent {
    pub agent_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyAlert {
    pub alert_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub filter_id: Option<String>,
}

/// A single preference change inside MODIFY_CONFIG.
#[derive(Debug, Clone, Default)]
pub struct ConfigPreferenceChange {
    pub name: Option<String>,
    pub nvt_oid: Option<String>,
    pub value: Option<String>,
}

/// NVT selection change inside MODIFY_CONFIG.
#[derive(Debug, Clone, Default)]
pub struct NvtSelectionChange {
    pub family: Option<String>,
    pub nvt_oids: Vec<String>,
}

/// One family entry of a family selection change.
#[derive(Debug, Clone, Default)]
pub struct FamilyChoice {
    pub name: Option<String>,
    pub all: bool,
    pub growing: bool,
}

/// Family selection change inside MODIFY_CONFIG.
#[derive(Debug, Clone, Default)]
pub struct FamilySelectionChange {
    pub growing: bool,
    pub families: Vec<FamilyChoice>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyConfig {
    pub config_id: Option<String>,
    pub preference: Option<ConfigPreferenceChange>,
    pub nvt_selection: Option<NvtSelectionChange>,
    pub family_selection: Option<FamilySelectionChange>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyFilter {
    pub filter_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub term: Option<String>,
    pub filter_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyLscCredential {
    pub lsc_credential_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyNote {
    pub note_id: Option<String>,
    pub text: Option<String>,
    pub hosts: Option<String>,
    pub port: Option<String>,
    pub threat: Option<String>,
    pub task_id: Option<String>,
    pub result_id: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyOverride {
    pub override_id: Option<String>,
    pub text: Option<String>,
    pub hosts: Option<String>,
    pub port: Option<String>,
    pub threat: Option<String>,
    pub new_threat: Option<String>,
    pub task_id: Option<String>,
    pub result_id: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyReport {
    pub report_id: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyReportFormat {
    pub report_format_id: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifySchedule {
    pub schedule_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub first_time: ScheduleTime,
    pub duration: Option<TimedValue>,
    pub period: Option<TimedValue>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifySlave {
    pub slave_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyTarget {
    pub target_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub hosts: Option<String>,
    pub port_list_id: Option<String>,
    pub ssh_lsc_credential_id: Option<String>,
    pub ssh_port: Option<String>,
    pub smb_lsc_credential_id: Option<String>,
}

/// File attachment change inside MODIFY_TASK.
#[derive(Debug, Clone, Default)]
pub struct TaskFile {
    pub name: Option<String>,
    pub action: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct ModifyTask {
    pub task_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub config_id: Option<String>,
    pub target_id: Option<String>,
    pub schedule_id: Option<String>,
    pub slave_id: Option<String>,
    pub alert_ids: Option<Vec<String>>,
    pub preferences: Option<Vec<TaskPreference>>,
    pub file: Option<TaskFile>,
}

// =============================================================================
// Wizard
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct RunWizard {
    pub name: Option<String>,
    pub params: Vec<(String, String)>,
}

// =============================================================================
// The Command Union
// =============================================================================

/// One fully-accumulated top-level command, ready for dispatch.
#[derive(Debug, Clone)]
pub enum Command {
    Authenticate(Credentials),
    Help,
    GetVersion,

    Get(GetCommand),
    GetNvtFamilies,
    GetNvtFeedChecksum { algorithm: Option<String> },
    GetPreferences {
        nvt_oid: Option<String>,
        config_id: Option<String>,
        preference: Option<String>,
    },
    GetDependencies,
    GetSystemReports {
        name: Option<String>,
        duration: Option<u64>,
        brief: bool,
    },
    GetTargetLocators,

    CreateAgent(CreateAgent),
    CreateAlert(CreateAlert),
    CreateConfig(CreateConfig),
    CreateFilter(CreateFilter),
    CreateLscCredential(CreateLscCredential),
    CreateNote(CreateNote),
    CreateOverride(CreateOverride),
    CreatePortList(CreatePortList),
    CreatePortRange(CreatePortRange),
    CreateReport(CreateReport),
    CreateReportFormat(CreateReportFormat),
    CreateSchedule(CreateSchedule),
    CreateSlave(CreateSlave),
    CreateTarget(CreateTarget),
    CreateTask(CreateTask),

    ModifyAgent(ModifyAgent),
    ModifyAlert(ModifyAlert),
    ModifyConfig(ModifyConfig),
    ModifyFilter(ModifyFilter),
    ModifyLscCredential(ModifyLscCredential),
    ModifyNote(ModifyNote),
    ModifyOverride(ModifyOverride),
    ModifyPortList(ModifyPortList),
    ModifyReport(ModifyReport),
    ModifyReportFormat(ModifyReportFormat),
    ModifySchedule(ModifySchedule),
    ModifySlave(ModifySlave),
    ModifyTarget(ModifyTarget),
    ModifyTask(ModifyTask),

    /// DELETE_* — the shape is identical for every resource type.
    Delete {
        kind: ResourceKind,
        id: Option<String>,
        ultimate: bool,
    },
    EmptyTrashcan,
    Restore { id: Option<String> },

    StartTask { task_id: Option<String> },
    StopTask { task_id: Option<String> },
    PauseTask { task_id: Option<String> },
    ResumePausedTask { task_id: Option<String> },
    ResumeStoppedTask { task_id: Option<String> },
    ResumeOrStartTask { task_id: Option<String> },

    RunWizard(RunWizard),
    TestAlert { alert_id: Option<String> },
    VerifyAgent { agent_id: Option<String> },
    VerifyReportFormat { report_format_id: Option<String> },
}

impl Command {
    /// Wire name of the command, used for the response envelope tag.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Authenticate(_) => "authenticate",
            Command::Help => "help",
            Command::GetVersion => "get_version",
            Command::Get(get) => match &get.what {
                GetWhat::Resource(kind) => match kind {
                    ResourceKind::Agent => "get_agents",
                    ResourceKind::Alert => "get_alerts",
                    ResourceKind::Config => "get_configs",
                    ResourceKind::Filter => "get_filters",
                    ResourceKind::LscCredential => "get_lsc_credentials",
                    ResourceKind::Note => "get_notes",
                    ResourceKind::Override => "get_overrides",
                    ResourceKind::PortList => "get_port_lists",
                    ResourceKind::PortRange => "get_port_ranges",
                    ResourceKind::Report => "get_reports",
                    ResourceKind::ReportFormat => "get_report_formats",
                    ResourceKind::Schedule => "get_schedules",
                    ResourceKind::Slave => "get_slaves",
                    ResourceKind::Target => "get_targets",
                    ResourceKind::Task => "get_tasks",
                },
                GetWhat::Nvts => "get_nvts",
                GetWhat::Info => "get_info",
                GetWhat::Settings => "get_settings",
            },
            Command::GetNvtFamilies => "get_nvt_families",
            Command::GetNvtFeedChecksum { .. } => "get_nvt_feed_checksum",
            Command::GetPreferences { .. } => "get_preferences",
            Command::GetDependencies => "get_dependencies",
            Command::GetSystemReports { .. } => "get_system_reports",
            Command::GetTargetLocators => "get_target_locators",
            Command::CreateAgent(_) => "create_agent",
            Command::CreateAlert(_) => "create_alert",
            Command::CreateConfig(_) => "create_config",
            Command::CreateFilter(_) => "create_filter",
            Command::CreateLscCredential(_) => "create_lsc_credential",
            Command::CreateNote(_) => "create_note",
            Command::CreateOverride(_) => "create_override",
            Command::CreatePortList(_) => "create_port_list",
            Command::CreatePortRange(_) => "create_port_range",
            Command::CreateReport(_) => "create_report",
            Command::CreateReportFormat(_) => "create_report_format",
            Command::CreateSchedule(_) => "create_schedule",
            Command::CreateSlave(_) => "create_slave",
            Command::CreateTarget(_) => "create_target",
            Command::CreateTask(_) => "create_task",
            Command::ModifyAgent(_) => "modify_agent",
            Command::ModifyAlert(_) => "modify_alert",
            Command::ModifyConfig(_) => "modify_config",
            Command::ModifyFilter(_) => "modify_filter",
            Command::ModifyLscCredential(_) => "modify_lsc_credential",
            Command::ModifyNote(_) => "modify_note",
            Command::ModifyOverride(_) => "modify_override",
            Command::ModifyPortList(_) => "modify_port_list",
            Command::ModifyReport(_) => "modify_report",
            Command::ModifyReportFormat(_) => "modify_report_format",
            Command::ModifySchedule(_) => "modify_schedule",
            Command::ModifySlave(_) => "modify_slave",
            Command::ModifyTarget(_) => "modify_target",
            Command::ModifyTask(_) => "modify_task",
            Command::Delete { kind, .. } => match kind {
                ResourceKind::Agent => "delete_agent",
                ResourceKind::Alert => "delete_alert",
                ResourceKind::Config => "delete_config",
                ResourceKind::Filter => "delete_filter",
                ResourceKind::LscCredential => "delete_lsc_credential",
                ResourceKind::Note => "delete_note",
                ResourceKind::Override => "delete_override",
                ResourceKind::PortList => "delete_port_list",
                ResourceKind::PortRange => "delete_port_range",
                ResourceKind::Report => "delete_report",
                ResourceKind::ReportFormat => "delete_report_format",
                ResourceKind::Schedule => "delete_schedule",
                ResourceKind::Slave => "delete_slave",
                ResourceKind::Target => "delete_target",
                ResourceKind::Task => "delete_task",
            },
            Command::EmptyTrashcan => "empty_trashcan",
            Command::Restore { .. } => "restore",
            Command::StartTask { .. } => "start_task",
            Command::StopTask { .. } => "stop_task",
            Command::PauseTask { .. } => "pause_task",
            Command::ResumePausedTask { .. } => "resume_paused_task",
            Command::ResumeStoppedTask { .. } => "resume_stopped_task",
            Command::ResumeOrStartTask { .. } => "resume_or_start_task",
            Command::RunWizard(_) => "run_wizard",
            Command::TestAlert { .. } => "test_alert",
            Command::VerifyAgent { .. } => "verify_agent",
            Command::VerifyReportFormat { .. } => "verify_report_format",
        }
    }

    /// True for commands that change backend state.
    ///
    /// An observer-role session is refused these before the backend is
    /// touched.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
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
                | Command::CreateTask(_)
                | Command::ModifyAgent(_)
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
                | Command::ModifyTask(_)
                | Command::Delete { .. }
                | Command::EmptyTrashcan
                | Command::Restore { .. }
                | Command::StartTask { .. }
                | Command::StopTask { .. }
                | Command::PauseTask { .. }
                | Command::ResumePausedTask { .. }
                | Command::ResumeStoppedTask { .. }
                | Command::ResumeOrStartTask { .. }
                | Command::RunWizard(_)
                | Command::TestAlert { .. }
                | Command::VerifyAgent { .. }
                | Command::VerifyReportFormat { .. }
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_names_are_lowercase_verbs() {
        assert_eq!(Command::GetVersion.name(), "get_version");
        assert_eq!(
            Command::Delete {
                kind: ResourceKind::Task,
                id: None,
                ultimate: false
            }
            .name(),
            "delete_task"
        );
        assert_eq!(
            Command::Get(GetCommand {
                what: GetWhat::Resource(ResourceKind::LscCredential),
                data: GetData::default()
            })
            .name(),
            "get_lsc_credentials"
        );
        assert_eq!(
            Command::Get(GetCommand {
                what: GetWhat::Info,
                data: GetData::default()
            })
            .name(),
            "get_info"
        );
    }

    #[test]
    fn reads_are_not_mutating() {
        assert!(!Command::Help.is_mutating());
        assert!(!Command::GetVersion.is_mutating());
        assert!(!Command::GetNvtFamilies.is_mutating());
        assert!(!Command::Get(GetCommand {
            what: GetWhat::Resource(ResourceKind::Task),
            data: GetData::default()
        })
        .is_mutating());
    }

    #[test]
    fn lifecycle_and_wizard_are_mutating() {
        assert!(Command::StartTask { task_id: None }.is_mutating());
        assert!(Command::EmptyTrashcan.is_mutating());
        assert!(Command::RunWizard(RunWizard::default()).is_mutating());
        assert!(Command::TestAlert { alert_id: None }.is_mutating());
    }

    #[test]
    fn dropping_a_record_is_the_reset() {
        // No field survives a drop; a fresh record is all defaults.
        let mut task = CreateTask::default();
        task.name = Some("scan".into());
        drop(task);
        let fresh = CreateTask::default();
        assert!(fresh.name.is_none());
        assert!(fresh.alert_ids.is_empty());
    }
}
