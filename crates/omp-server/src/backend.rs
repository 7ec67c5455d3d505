//! The backend collaborator contract.
//!
//! The engine never touches the resource store or the scanner directly;
//! every lookup, mutation and listing goes through the [`Backend`] trait.
//! Operation results are expressed as sum types; the dispatcher maps them
//! to protocol statuses.

use thiserror::Error;

use omp_core::filter::Filter;

use crate::command::{
    Credentials, CreateAgent, CreateAlert, CreateConfig, CreateFilter, CreateLscCredential,
    CreateNote, CreateOverride, CreatePortList, CreatePortRange, CreateReport,
    CreateReportFormat, CreateSchedule, CreateSlave, CreateTarget, CreateTask, ModifyAgent,
    ModifyAlert, ModifyConfig, ModifyFilter, ModifyLscCredential, ModifyNote, ModifyOverride,
    ModifyPortList, ModifyReport, ModifyReportFormat, ModifySchedule, ModifySlave, ModifyTarget,
    ModifyTask,
};

// =============================================================================
// Resource Kinds
// =============================================================================

/// Every stored resource type the protocol can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Agent,
    Alert,
    Config,
    Filter,
    LscCredential,
    Note,
    Override,
    PortList,
    PortRange,
    Report,
    ReportFormat,
    Schedule,
    Slave,
    Target,
    Task,
}

impl ResourceKind {
    /// Wire element name of a single resource.
    pub fn tag(&self) -> &'static str {
        match self {
            ResourceKind::Agent => "agent",
            ResourceKind::Alert => "alert",
            ResourceKind::Config => "config",
            ResourceKind::Filter => "filter",
            ResourceKind::LscCredential => "lsc_credential",
            ResourceKind::Note => "note",
            ResourceKind::Override => "override",
            ResourceKind::PortList => "port_list",
            ResourceKind::PortRange => "port_range",
            ResourceKind::Report => "report",
            ResourceKind::ReportFormat => "report_format",
            ResourceKind::Schedule => "schedule",
            ResourceKind::Slave => "slave",
            ResourceKind::Target => "target",
            ResourceKind::Task => "task",
        }
    }

    /// Wire element name of a listing of this type.
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Agent => "agents",
            ResourceKind::Alert => "alerts",
            ResourceKind::Config => "configs",
            ResourceKind::Filter => "filters",
            ResourceKind::LscCredential => "lsc_credentials",
            ResourceKind::Note => "notes",
            ResourceKind::Override => "overrides",
            ResourceKind::PortList => "port_lists",
            ResourceKind::PortRange => "port_ranges",
            ResourceKind::Report => "reports",
            ResourceKind::ReportFormat => "report_formats",
            ResourceKind::Schedule => "schedules",
            ResourceKind::Slave => "slaves",
            ResourceKind::Target => "targets",
            ResourceKind::Task => "tasks",
        }
    }

    /// Human-readable name used in status texts.
    pub fn display(&self) -> &'static str {
        match self {
            ResourceKind::Agent => "Agent",
            ResourceKind::Alert => "Alert",
            ResourceKind::Config => "Config",
            ResourceKind::Filter => "Filter",
            ResourceKind::LscCredential => "LSC credential",
            ResourceKind::Note => "Note",
            ResourceKind::Override => "Override",
            ResourceKind::PortList => "Port list",
            ResourceKind::PortRange => "Port range",
            ResourceKind::Report => "Report",
            ResourceKind::ReportFormat => "Report format",
            ResourceKind::Schedule => "Schedule",
            ResourceKind::Slave => "Slave",
            ResourceKind::Target => "Target",
            ResourceKind::Task => "Task",
        }
    }

    /// Default sort field for listings of this type.
    pub fn default_sort(&self) -> &'static str {
        "name"
    }
}

// =============================================================================
// Queries and Rows
// =============================================================================

/// A listing query derived from a GET command.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Restrict the listing to a single resource id.
    pub id: Option<String>,
    /// Pagination and ordering controls.
    pub filter: Filter,
    /// List the trashcan instead of live resources.
    pub trash: bool,
    /// Include full details in the rows.
    pub details: bool,
}

impl Query {
    /// Rebuild this query with the page offset reset to row one.
    pub fn with_first_reset(&self) -> Self {
        let mut query = self.clone();
        query.filter = self.filter.with_first_reset();
        query
    }
}

/// Reference to another resource (id plus display name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefRow {
    pub id: String,
    pub name: String,
}

/// Common block shared by every listed resource.
#[derive(Debug, Clone, Default)]
pub struct ResourceRow {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub creation_time: String,
    pub modification_time: String,
    pub writable: bool,
    pub in_use: bool,
    /// Type-specific fields.
    pub details: Details,
}

/// Type-specific detail fields of a listed resource.
#[derive(Debug, Clone, Default)]
pub enum Details {
    #[default]
    None,
    Agent(AgentDetails),
    Alert(AlertDetails),
    Config(ConfigDetails),
    Filter(FilterDetails),
    LscCredential(LscCredentialDetails),
    Note(NoteDetails),
    Override(OverrideDetails),
    PortList(PortListDetails),
    Report(ReportDetails),
    ReportFormat(ReportFormatDetails),
    Schedule(ScheduleDetails),
    Slave(SlaveDetails),
    Target(TargetDetails),
    Task(TaskDetails),
}

#[derive(Debug, Clone, Default)]
pub struct AgentDetails {
    pub installer_trust: String,
    pub howto_install: String,
    pub howto_use: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlertDetails {
    pub condition: String,
    pub condition_data: Vec<(String, String)>,
    pub event: String,
    pub event_data: Vec<(String, String)>,
    pub method: String,
    pub method_data: Vec<(String, String)>,
    pub filter: Option<RefRow>,
    pub tasks: Vec<RefRow>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigDetails {
    pub family_count: i64,
    pub family_growing: bool,
    pub nvt_count: i64,
    pub nvt_growing: bool,
    /// Present only when details were requested.
    pub preferences: Vec<ConfigPreference>,
    pub tasks: Vec<RefRow>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigPreference {
    pub nvt_oid: String,
    pub nvt_name: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct FilterDetails {
    pub term: String,
    pub filter_type: String,
    pub alerts: Vec<RefRow>,
}

#[derive(Debug, Clone, Default)]
pub struct LscCredentialDetails {
    pub login: String,
    /// "gen" for generated keys, "pass" for password-only.
    pub key_type: String,
    pub targets: Vec<RefRow>,
}

#[derive(Debug, Clone, Default)]
pub struct NoteDetails {
    pub nvt_oid: String,
    pub nvt_name: String,
    pub text: String,
    pub hosts: String,
    pub port: String,
    pub threat: String,
    pub task: Option<RefRow>,
    pub result_id: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverrideDetails {
    pub nvt_oid: String,
    pub nvt_name: String,
    pub text: String,
    pub hosts: String,
    pub port: String,
    pub threat: String,
    pub new_threat: String,
    pub task: Option<RefRow>,
    pub result_id: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PortListDetails {
    pub port_count: i64,
    /// Present only when details were requested.
    pub ranges: Vec<PortRangeRow>,
    pub targets: Vec<RefRow>,
}

#[derive(Debug, Clone, Default)]
pub struct PortRangeRow {
    pub id: String,
    pub start: i64,
    pub end: i64,
    pub range_type: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReportDetails {
    pub task: RefRow,
    pub scan_run_status: String,
    pub scan_start: String,
    pub scan_end: String,
    pub result_count: i64,
    /// Present only when details were requested.
    pub results: Vec<ResultRow>,
}

#[derive(Debug, Clone, Default)]
pub struct ResultRow {
    pub id: String,
    pub host: String,
    pub port: String,
    pub nvt_oid: String,
    pub nvt_name: String,
    pub threat: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReportFormatDetails {
    pub extension: String,
    pub content_type: String,
    pub summary: String,
    pub description: String,
    pub global: bool,
    pub active: bool,
    pub trust: String,
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleDetails {
    pub first_time: String,
    pub next_time: String,
    pub period: i64,
    pub period_months: i64,
    pub duration: i64,
    pub timezone: String,
    pub tasks: Vec<RefRow>,
}

#[derive(Debug, Clone, Default)]
pub struct SlaveDetails {
    pub host: String,
    pub port: String,
    pub login: String,
    pub tasks: Vec<RefRow>,
}

#[derive(Debug, Clone, Default)]
pub struct TargetDetails {
    pub hosts: String,
    pub max_hosts: i64,
    pub port_list: Option<RefRow>,
    pub ssh_lsc_credential: Option<RefRow>,
    pub ssh_port: String,
    pub smb_lsc_credential: Option<RefRow>,
    pub tasks: Vec<RefRow>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskDetails {
    pub status: String,
    pub progress: i64,
    pub config: Option<RefRow>,
    pub target: Option<RefRow>,
    pub schedule: Option<RefRow>,
    pub slave: Option<RefRow>,
    pub report_count: i64,
    pub finished_report_count: i64,
    pub trend: String,
    pub last_report: Option<LastReport>,
}

#[derive(Debug, Clone, Default)]
pub struct LastReport {
    pub id: String,
    pub scan_end: String,
}

// =============================================================================
// Non-resource Listings
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct NvtRow {
    pub oid: String,
    pub name: String,
    pub family: String,
    pub cvss_base: String,
    pub risk_factor: String,
    pub summary: String,
    pub preference_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct FamilyRow {
    pub name: String,
    pub max_nvt_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PreferenceRow {
    pub nvt_oid: String,
    pub nvt_name: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyRow {
    pub name: String,
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SettingRow {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct SystemReportRow {
    pub name: String,
    pub title: String,
    /// Base64 report content; absent in brief listings.
    pub report: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InfoRow {
    pub id: String,
    pub name: String,
    pub info_type: String,
    pub summary: String,
}

// =============================================================================
// Operation Results
// =============================================================================

/// Unrecoverable backend conditions.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The store or scanner failed internally.
    #[error("{0}")]
    Failure(String),
    /// The scanner or store is unreachable.
    #[error("service temporarily down")]
    Down,
}

/// Result of a create operation.
#[derive(Debug, Error)]
pub enum CreateError {
    /// A resource with the same name exists already.
    #[error("resource exists already")]
    Duplicate,
    /// Command-specific invalid input, with the message for the client.
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result of a modify operation.
#[derive(Debug, Error)]
pub enum ModifyError {
    /// The new name collides with an existing resource.
    #[error("resource exists already")]
    Duplicate,
    /// The resource is in use and the change is not permitted.
    #[error("resource is in use")]
    InUse,
    /// Command-specific invalid input.
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result of a delete operation.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The resource is referenced by another and cannot go away.
    #[error("resource is in use")]
    InUse,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result of restoring a resource from the trashcan.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// No trashed resource has the given id.
    #[error("resource missing")]
    NotFound,
    /// A live resource already carries the trashed resource's name.
    #[error("resource exists already")]
    NameConflict,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Outcome of starting (or resuming into a start of) a task.
///
/// `Requested` means the backend forked a worker and the parent keeps
/// serving this connection; the engine must record that fork. The two
/// `Child*` variants are reported inside a forked worker and terminate
/// protocol service for that process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The scan started synchronously.
    Started { report_id: String },
    /// The scan was handed to a forked worker; acknowledgment pending.
    Requested { report_id: String },
    /// Running inside the forked worker, scan finished cleanly.
    ChildSuccess,
    /// Running inside the forked worker, scan failed.
    ChildError,
}

impl StartOutcome {
    /// True for the outcomes that imply this process forked a worker.
    pub fn is_forked(&self) -> bool {
        matches!(
            self,
            StartOutcome::Requested { .. } | StartOutcome::ChildSuccess | StartOutcome::ChildError
        )
    }
}

/// Failure of a task lifecycle action.
#[derive(Debug, Error)]
pub enum TaskActionError {
    /// The task is not in a state that allows the action.
    #[error("task is not in the right state: {0}")]
    WrongState(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// User identity established by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub role: String,
    pub timezone: String,
}

// =============================================================================
// The Backend Trait
// =============================================================================

/// Operations the engine requires from the scan management backend.
///
/// Identifiers are client-supplied UUID strings; `find` resolves them to
/// existence, never to cached handles. Listing methods return fully
/// materialized rows; iteration over the store is the backend's concern.
pub trait Backend {
    // --- session ---

    /// Check credentials; `None` means rejected.
    fn authenticate(&self, credentials: &Credentials) -> Result<Option<UserInfo>, BackendError>;

    // --- lookups ---

    /// Resolve a resource id. `Ok(false)` means not found.
    fn find(&self, kind: ResourceKind, id: &str, trash: bool) -> Result<bool, BackendError>;

    /// Term of a stored filter, for `filt_id` resolution.
    fn filter_term(&self, filt_id: &str) -> Result<Option<String>, BackendError>;

    // --- listings ---

    fn list(&self, kind: ResourceKind, query: &Query) -> Result<Vec<ResourceRow>, BackendError>;

    /// Count of rows matching the query ignoring pagination.
    fn count(&self, kind: ResourceKind, query: &Query) -> Result<i64, BackendError>;

    fn nvts(&self, query: &Query) -> Result<Vec<NvtRow>, BackendError>;
    fn nvt_families(&self) -> Result<Vec<FamilyRow>, BackendError>;
    fn nvt_feed_checksum(&self, algorithm: &str) -> Result<Option<String>, BackendError>;
    fn preferences(
        &self,
        nvt_oid: Option<&str>,
        config_id: Option<&str>,
        preference: Option<&str>,
    ) -> Result<Vec<PreferenceRow>, BackendError>;
    fn dependencies(&self) -> Result<Vec<DependencyRow>, BackendError>;
    fn settings(&self, query: &Query) -> Result<Vec<SettingRow>, BackendError>;
    fn system_reports(
        &self,
        name: Option<&str>,
        duration: Option<u64>,
    ) -> Result<Vec<SystemReportRow>, BackendError>;
    fn target_locators(&self) -> Result<Vec<String>, BackendError>;
    fn info(&self, query: &Query, info_type: Option<&str>) -> Result<Vec<InfoRow>, BackendError>;

    // --- creation ---

    fn create_agent(&mut self, fields: &CreateAgent) -> Result<String, CreateError>;
    fn create_alert(&mut self, fields: &CreateAlert) -> Result<String, CreateError>;
    fn create_config(&mut self, fields: &CreateConfig) -> Result<String, CreateError>;
    fn create_filter(&mut self, fields: &CreateFilter) -> Result<String, CreateError>;
    fn create_lsc_credential(&mut self, fields: &CreateLscCredential)
        -> Result<String, CreateError>;
    fn create_note(&mut self, fields: &CreateNote) -> Result<String, CreateError>;
    fn create_override(&mut self, fields: &CreateOverride) -> Result<String, CreateError>;
    fn create_port_list(&mut self, fields: &CreatePortList) -> Result<String, CreateError>;
    fn create_port_range(&mut self, fields: &CreatePortRange) -> Result<String, CreateError>;
    fn create_report(&mut self, fields: &CreateReport) -> Result<String, CreateError>;
    fn create_report_format(&mut self, fields: &CreateReportFormat)
        -> Result<String, CreateError>;
    fn create_schedule(&mut self, fields: &CreateSchedule) -> Result<String, CreateError>;
    fn create_slave(&mut self, fields: &CreateSlave) -> Result<String, CreateError>;
    fn create_target(&mut self, fields: &CreateTarget) -> Result<String, CreateError>;
    fn create_task(&mut self, fields: &CreateTask) -> Result<String, CreateError>;

    // --- modification ---

    fn modify_agent(&mut self, fields: &ModifyAgent) -> Result<(), ModifyError>;
    fn modify_alert(&mut self, fields: &ModifyAlert) -> Result<(), ModifyError>;
    fn modify_config(&mut self, fields: &ModifyConfig) -> Result<(), ModifyError>;
    fn modify_filter(&mut self, fields: &ModifyFilter) -> Result<(), ModifyError>;
    fn modify_lsc_credential(&mut self, fields: &ModifyLscCredential) -> Result<(), ModifyError>;
    fn modify_note(&mut self, fields: &ModifyNote) -> Result<(), ModifyError>;
    fn modify_override(&mut self, fields: &ModifyOverride) -> Result<(), ModifyError>;
    fn modify_port_list(&mut self, fields: &ModifyPortList) -> Result<(), ModifyError>;
    fn modify_report(&mut self, fields: &ModifyReport) -> Result<(), ModifyError>;
    fn modify_report_format(&mut self, fields: &ModifyReportFormat) -> Result<(), ModifyError>;
    fn modify_schedule(&mut self, fields: &ModifySchedule) -> Result<(), ModifyError>;
    fn modify_slave(&mut self, fields: &ModifySlave) -> Result<(), ModifyError>;
    fn modify_target(&mut self, fields: &ModifyTarget) -> Result<(), ModifyError>;
    fn modify_task(&mut self, fields: &ModifyTask) -> Result<(), ModifyError>;

    // --- deletion and trashcan ---

    /// Delete a resource. `ultimate` skips the trashcan.
    fn delete(&mut self, kind: ResourceKind, id: &str, ultimate: bool)
        -> Result<(), DeleteError>;
    fn empty_trashcan(&mut self) -> Result<(), BackendError>;
    fn restore(&mut self, id: &str) -> Result<(), RestoreError>;

    // --- task lifecycle ---

    fn start_task(&mut self, task_id: &str) -> Result<StartOutcome, TaskActionError>;
    fn stop_task(&mut self, task_id: &str) -> Result<(), TaskActionError>;
    fn pause_task(&mut self, task_id: &str) -> Result<(), TaskActionError>;
    fn resume_paused_task(&mut self, task_id: &str) -> Result<(), TaskActionError>;
    fn resume_stopped_task(&mut self, task_id: &str) -> Result<StartOutcome, TaskActionError>;
    fn resume_or_start_task(&mut self, task_id: &str) -> Result<StartOutcome, TaskActionError>;

    // --- verification and alert tests ---

    fn test_alert(&mut self, alert_id: &str) -> Result<(), BackendError>;
    /// Verify a signature; `Ok(false)` means verification failed.
    fn verify_agent(&self, agent_id: &str) -> Result<bool, BackendError>;
    fn verify_report_format(&self, report_format_id: &str) -> Result<bool, BackendError>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_listing_tags() {
        assert_eq!(ResourceKind::Task.plural(), "tasks");
        assert_eq!(ResourceKind::LscCredential.plural(), "lsc_credentials");
        assert_eq!(ResourceKind::PortList.plural(), "port_lists");
    }

    #[test]
    fn display_names_for_messages() {
        assert_eq!(ResourceKind::Task.display(), "Task");
        assert_eq!(ResourceKind::PortList.display(), "Port list");
        assert_eq!(ResourceKind::LscCredential.display(), "LSC credential");
    }

    #[test]
    fn fork_shaped_outcomes() {
        assert!(StartOutcome::Requested {
            report_id: "r".into()
        }
        .is_forked());
        assert!(StartOutcome::ChildSuccess.is_forked());
        assert!(!StartOutcome::Started {
            report_id: "r".into()
        }
        .is_forked());
    }

    #[test]
    fn query_reset_keeps_everything_but_first() {
        let mut query = Query::default();
        query.filter = omp_core::filter::Filter::parse("first=7 max=3", "name");
        query.trash = true;
        let retry = query.with_first_reset();
        assert_eq!(retry.filter.first, 1);
        assert_eq!(retry.filter.max, 3);
        assert!(retry.trash);
    }
}
