//! In-memory backend for testing the protocol engine.
//!
//! [`MemoryBackend`] implements the full `Backend` contract over plain
//! hash maps, with hooks for the failure modes the engine must handle:
//! simulated concurrent deletion (for the pagination retry), in-use
//! resources, invalid signatures, and configurable task-start outcomes.
//! It also counts mutations so tests can assert the backend was never
//! touched.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use omp_server::backend::{
    Backend, BackendError, CreateError, DeleteError, DependencyRow, Details, FamilyRow,
    FilterDetails, InfoRow, ModifyError, NvtRow, PreferenceRow, Query, ResourceKind, ResourceRow,
    RestoreError, SettingRow, StartOutcome, SystemReportRow, TaskActionError, TaskDetails,
    UserInfo,
};
use omp_server::command::{
    Credentials, CreateAgent, CreateAlert, CreateConfig, CreateFilter, CreateLscCredential,
    CreateNote, CreateOverride, CreatePortList, CreatePortRange, CreateReport,
    CreateReportFormat, CreateSchedule, CreateSlave, CreateTarget, CreateTask, ModifyAgent,
    ModifyAlert, ModifyConfig, ModifyFilter, ModifyLscCredential, ModifyNote, ModifyOverride,
    ModifyPortList, ModifyReport, ModifyReportFormat, ModifySchedule, ModifySlave, ModifyTarget,
    ModifyTask,
};

/// Fixed timestamp used for every stored row.
const STAMP: &str = "2011-05-10T12:00:00Z";

/// The scan config every install ships; wizards reference it by id.
pub const FULL_AND_FAST_CONFIG: &str = "daba56c8-73ec-11df-a475-002264764cea";

/// What `start_task` should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBehavior {
    /// Scan runs synchronously.
    Synchronous,
    /// Scan is handed to a forked worker.
    Forked,
    /// The task is already running.
    AlreadyActive,
}

/// In-memory implementation of the backend contract.
pub struct MemoryBackend {
    users: HashMap<String, (String, UserInfo)>,
    live: HashMap<ResourceKind, Vec<ResourceRow>>,
    trash: HashMap<ResourceKind, Vec<ResourceRow>>,
    in_use: HashSet<String>,
    invalid_signatures: HashSet<String>,
    saved_filters: HashMap<String, String>,

    pub nvt_rows: Vec<NvtRow>,
    pub family_rows: Vec<FamilyRow>,
    pub preference_rows: Vec<PreferenceRow>,
    pub dependency_rows: Vec<DependencyRow>,
    pub setting_rows: Vec<SettingRow>,
    pub system_report_rows: Vec<SystemReportRow>,
    pub locator_names: Vec<String>,
    pub info_rows: Vec<InfoRow>,
    pub feed_checksum: Option<String>,

    /// How task starts behave.
    pub start_behavior: StartBehavior,
    /// Number of mutating calls made.
    pub mutations: usize,
    /// When set, the next `list` call returns an empty page once.
    empty_page_once: RefCell<bool>,
    /// Every `list` call as (kind, first), for retry assertions.
    list_calls: RefCell<Vec<(ResourceKind, i64)>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let mut backend = Self::empty();
        let row = backend.make_row(
            ResourceKind::Config,
            FULL_AND_FAST_CONFIG,
            "Full and fast",
            "Most NVT's; optimized by using previously collected information.",
        );
        backend
            .live
            .entry(ResourceKind::Config)
            .or_default()
            .push(row);
        backend
    }

    fn empty() -> Self {
        MemoryBackend {
            users: HashMap::new(),
            live: HashMap::new(),
            trash: HashMap::new(),
            in_use: HashSet::new(),
            invalid_signatures: HashSet::new(),
            saved_filters: HashMap::new(),
            nvt_rows: Vec::new(),
            family_rows: Vec::new(),
            preference_rows: Vec::new(),
            dependency_rows: Vec::new(),
            setting_rows: Vec::new(),
            system_report_rows: Vec::new(),
            locator_names: Vec::new(),
            info_rows: Vec::new(),
            feed_checksum: Some("7c5e1a2b".to_owned()),
            start_behavior: StartBehavior::Synchronous,
            mutations: 0,
            empty_page_once: RefCell::new(false),
            list_calls: RefCell::new(Vec::new()),
        }
    }

    /// A backend with one regular user "alice"/"secret" (UTC).
    pub fn with_alice() -> Self {
        let mut backend = Self::new();
        backend.add_user("alice", "secret", "User", "UTC");
        backend
    }

    pub fn add_user(&mut self, username: &str, password: &str, role: &str, timezone: &str) {
        self.users.insert(
            username.to_owned(),
            (
                password.to_owned(),
                UserInfo {
                    role: role.to_owned(),
                    timezone: timezone.to_owned(),
                },
            ),
        );
    }

    /// Insert a resource row directly, returning its id.
    pub fn seed(&mut self, kind: ResourceKind, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let row = self.make_row(kind, &id, name, "");
        self.live.entry(kind).or_default().push(row);
        id
    }

    /// Insert a resource row into the trashcan.
    pub fn seed_trash(&mut self, kind: ResourceKind, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let row = self.make_row(kind, &id, name, "");
        self.trash.entry(kind).or_default().push(row);
        id
    }

    /// Mark a resource as referenced by another.
    pub fn mark_in_use(&mut self, id: &str) {
        self.in_use.insert(id.to_owned());
        for rows in self.live.values_mut() {
            for row in rows.iter_mut() {
                if row.id == id {
                    row.in_use = true;
                }
            }
        }
    }

    /// Make signature verification fail for a resource.
    pub fn mark_invalid_signature(&mut self, id: &str) {
        self.invalid_signatures.insert(id.to_owned());
    }

    /// Store a filter term addressable by `filt_id`.
    pub fn save_filter_term(&mut self, filt_id: &str, term: &str) {
        self.saved_filters
            .insert(filt_id.to_owned(), term.to_owned());
    }

    /// Make the next listing return an empty page once, as if the page's
    /// resources were deleted between count and fetch.
    pub fn vanish_next_page(&self) {
        *self.empty_page_once.borrow_mut() = true;
    }

    /// The (kind, first) pairs of every `list` call so far.
    pub fn list_calls(&self) -> Vec<(ResourceKind, i64)> {
        self.list_calls.borrow().clone()
    }

    fn make_row(&self, kind: ResourceKind, id: &str, name: &str, comment: &str) -> ResourceRow {
        let details = match kind {
            ResourceKind::Task => Details::Task(TaskDetails {
                status: "New".to_owned(),
                trend: "same".to_owned(),
                ..TaskDetails::default()
            }),
            ResourceKind::Filter => Details::Filter(FilterDetails::default()),
            _ => Details::None,
        };
        ResourceRow {
            id: id.to_owned(),
            name: name.to_owned(),
            comment: comment.to_owned(),
            creation_time: STAMP.to_owned(),
            modification_time: STAMP.to_owned(),
            writable: true,
            in_use: self.in_use.contains(id),
            details,
        }
    }

    fn rows(&self, kind: ResourceKind, trash: bool) -> &[ResourceRow] {
        let map = if trash { &self.trash } else { &self.live };
        map.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn name_taken(&self, kind: ResourceKind, name: &str) -> bool {
        self.rows(kind, false).iter().any(|row| row.name == name)
    }

    fn insert(
        &mut self,
        kind: ResourceKind,
        name: &str,
        comment: &str,
    ) -> Result<String, CreateError> {
        if name.is_empty() {
            return Err(CreateError::Invalid("name must not be empty".to_owned()));
        }
        if self.name_taken(kind, name) {
            return Err(CreateError::Duplicate);
        }
        self.mutations += 1;
        let id = Uuid::new_v4().to_string();
        let row = self.make_row(kind, &id, name, comment);
        self.live.entry(kind).or_default().push(row);
        Ok(id)
    }

    fn touch(
        &mut self,
        kind: ResourceKind,
        id: &Option<String>,
        name: &Option<String>,
        comment: &Option<String>,
    ) -> Result<(), ModifyError> {
        let id = id.clone().unwrap_or_default();
        if let Some(new_name) = name {
            let clash = self
                .rows(kind, false)
                .iter()
                .any(|row| row.name == *new_name && row.id != id);
            if clash {
                return Err(ModifyError::Duplicate);
            }
        }
        self.mutations += 1;
        let rows = self.live.entry(kind).or_default();
        let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
            return Err(ModifyError::Invalid("resource disappeared".to_owned()));
        };
        if let Some(name) = name {
            row.name = name.clone();
        }
        if let Some(comment) = comment {
            row.comment = comment.clone();
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn authenticate(&self, credentials: &Credentials) -> Result<Option<UserInfo>, BackendError> {
        Ok(self.users.get(&credentials.username).and_then(|(password, info)| {
            (password == &credentials.password).then(|| info.clone())
        }))
    }

    fn find(&self, kind: ResourceKind, id: &str, trash: bool) -> Result<bool, BackendError> {
        Ok(self.rows(kind, trash).iter().any(|row| row.id == id))
    }

    fn filter_term(&self, filt_id: &str) -> Result<Option<String>, BackendError> {
        if let Some(term) = self.saved_filters.get(filt_id) {
            return Ok(Some(term.clone()));
        }
        // A created filter is addressable by its id too.
        Ok(self
            .rows(ResourceKind::Filter, false)
            .iter()
            .find(|row| row.id == filt_id)
            .map(|row| match &row.details {
                Details::Filter(details) => details.term.clone(),
                _ => String::new(),
            }))
    }

    fn list(&self, kind: ResourceKind, query: &Query) -> Result<Vec<ResourceRow>, BackendError> {
        self.list_calls
            .borrow_mut()
            .push((kind, query.filter.first));
        let vanish = {
            let mut flag = self.empty_page_once.borrow_mut();
            std::mem::replace(&mut *flag, false)
        };
        if vanish {
            return Ok(Vec::new());
        }

        let mut rows: Vec<ResourceRow> = self
            .rows(kind, query.trash)
            .iter()
            .filter(|row| query.id.as_deref().map_or(true, |id| row.id == id))
            .filter(|row| {
                query.filter.rest.is_empty() || row.name.contains(&query.filter.rest)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        if query.filter.sort_desc {
            rows.reverse();
        }

        let skip = (query.filter.first - 1).max(0) as usize;
        let rows = rows.into_iter().skip(skip);
        Ok(if query.filter.max >= 0 {
            rows.take(query.filter.max as usize).collect()
        } else {
            rows.collect()
        })
    }

    fn count(&self, kind: ResourceKind, query: &Query) -> Result<i64, BackendError> {
        let count = self
            .rows(kind, query.trash)
            .iter()
            .filter(|row| query.id.as_deref().map_or(true, |id| row.id == id))
            .filter(|row| {
                query.filter.rest.is_empty() || row.name.contains(&query.filter.rest)
            })
            .count();
        Ok(count as i64)
    }

    fn nvts(&self, query: &Query) -> Result<Vec<NvtRow>, BackendError> {
        Ok(self
            .nvt_rows
            .iter()
            .filter(|nvt| query.id.as_deref().map_or(true, |oid| nvt.oid == oid))
            .cloned()
            .collect())
    }

    fn nvt_families(&self) -> Result<Vec<FamilyRow>, BackendError> {
        Ok(self.family_rows.clone())
    }

    fn nvt_feed_checksum(&self, algorithm: &str) -> Result<Option<String>, BackendError> {
        if algorithm == "md5" {
            Ok(self.feed_checksum.clone())
        } else {
            Ok(None)
        }
    }

    fn preferences(
        &self,
        nvt_oid: Option<&str>,
        _config_id: Option<&str>,
        preference: Option<&str>,
    ) -> Result<Vec<PreferenceRow>, BackendError> {
        Ok(self
            .preference_rows
            .iter()
            .filter(|row| nvt_oid.map_or(true, |oid| row.nvt_oid == oid))
            .filter(|row| preference.map_or(true, |name| row.name == name))
            .cloned()
            .collect())
    }

    fn dependencies(&self) -> Result<Vec<DependencyRow>, BackendError> {
        Ok(self.dependency_rows.clone())
    }

    fn settings(&self, query: &Query) -> Result<Vec<SettingRow>, BackendError> {
        Ok(self
            .setting_rows
            .iter()
            .filter(|row| query.id.as_deref().map_or(true, |id| row.id == id))
            .cloned()
            .collect())
    }

    fn system_reports(
        &self,
        name: Option<&str>,
        _duration: Option<u64>,
    ) -> Result<Vec<SystemReportRow>, BackendError> {
        Ok(self
            .system_report_rows
            .iter()
            .filter(|row| name.map_or(true, |name| row.name == name))
            .cloned()
            .collect())
    }

    fn target_locators(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.locator_names.clone())
    }

    fn info(&self, query: &Query, info_type: Option<&str>) -> Result<Vec<InfoRow>, BackendError> {
        Ok(self
            .info_rows
            .iter()
            .filter(|row| info_type.map_or(true, |t| row.info_type == t))
            .filter(|row| query.id.as_deref().map_or(true, |id| row.id == id || row.name == id))
            .cloned()
            .collect())
    }

    fn create_agent(&mut self, fields: &CreateAgent) -> Result<String, CreateError> {
        self.insert(
            ResourceKind::Agent,
            fields.name.as_deref().unwrap_or(""),
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn create_alert(&mut self, fields: &CreateAlert) -> Result<String, CreateError> {
        self.insert(
            ResourceKind::Alert,
            fields.name.as_deref().unwrap_or(""),
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn create_config(&mut self, fields: &CreateConfig) -> Result<String, CreateError> {
        let name = fields
            .name
            .clone()
            .or_else(|| fields.import.as_ref().and_then(|import| import.name.clone()))
            .unwrap_or_default();
        self.insert(
            ResourceKind::Config,
            &name,
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn create_filter(&mut self, fields: &CreateFilter) -> Result<String, CreateError> {
        let id = self.insert(
            ResourceKind::Filter,
            fields.name.as_deref().unwrap_or(""),
            fields.comment.as_deref().unwrap_or(""),
        )?;
        let term = fields.term.clone().unwrap_or_default();
        let filter_type = fields.filter_type.clone().unwrap_or_default();
        if let Some(row) = self
            .live
            .entry(ResourceKind::Filter)
            .or_default()
            .iter_mut()
            .find(|row| row.id == id)
        {
            row.details = Details::Filter(FilterDetails {
                term,
                filter_type,
                alerts: Vec::new(),
            });
        }
        Ok(id)
    }

    fn create_lsc_credential(
        &mut self,
        fields: &CreateLscCredential,
    ) -> Result<String, CreateError> {
        self.insert(
            ResourceKind::LscCredential,
            fields.name.as_deref().unwrap_or(""),
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn create_note(&mut self, fields: &CreateNote) -> Result<String, CreateError> {
        let text = fields.text.clone().unwrap_or_default();
        // Notes have no names; the text stands in for one.
        self.mutations += 1;
        let id = Uuid::new_v4().to_string();
        let row = self.make_row(ResourceKind::Note, &id, "", &text);
        self.live.entry(ResourceKind::Note).or_default().push(row);
        Ok(id)
    }

    fn create_override(&mut self, fields: &CreateOverride) -> Result<String, CreateError> {
        let text = fields.text.clone().unwrap_or_default();
        self.mutations += 1;
        let id = Uuid::new_v4().to_string();
        let row = self.make_row(ResourceKind::Override, &id, "", &text);
        self.live
            .entry(ResourceKind::Override)
            .or_default()
            .push(row);
        Ok(id)
    }

    fn create_port_list(&mut self, fields: &CreatePortList) -> Result<String, CreateError> {
        let name = fields
            .name
            .clone()
            .or_else(|| fields.import.as_ref().and_then(|import| import.name.clone()))
            .unwrap_or_default();
        self.insert(
            ResourceKind::PortList,
            &name,
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn create_port_range(&mut self, fields: &CreatePortRange) -> Result<String, CreateError> {
        let start: i64 = fields
            .start
            .as_deref()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CreateError::Invalid("start must be a port number".to_owned()))?;
        let end: i64 = fields
            .end
            .as_deref()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CreateError::Invalid("end must be a port number".to_owned()))?;
        if start < 1 || end > 65535 || start > end {
            return Err(CreateError::Invalid(
                "port range must lie within 1-65535".to_owned(),
            ));
        }
        self.mutations += 1;
        let id = Uuid::new_v4().to_string();
        let row = self.make_row(ResourceKind::PortRange, &id, "", "");
        self.live
            .entry(ResourceKind::PortRange)
            .or_default()
            .push(row);
        Ok(id)
    }

    fn create_report(&mut self, fields: &CreateReport) -> Result<String, CreateError> {
        if let Some(task_name) = &fields.task_name {
            self.insert(ResourceKind::Task, task_name, "container task")?;
        }
        self.mutations += 1;
        let id = Uuid::new_v4().to_string();
        let row = self.make_row(ResourceKind::Report, &id, "", "");
        self.live.entry(ResourceKind::Report).or_default().push(row);
        Ok(id)
    }

    fn create_report_format(
        &mut self,
        fields: &CreateReportFormat,
    ) -> Result<String, CreateError> {
        let name = fields
            .import
            .as_ref()
            .and_then(|import| import.name.clone())
            .unwrap_or_default();
        self.insert(ResourceKind::ReportFormat, &name, "")
    }

    fn create_schedule(&mut self, fields: &CreateSchedule) -> Result<String, CreateError> {
        self.insert(
            ResourceKind::Schedule,
            fields.name.as_deref().unwrap_or(""),
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn create_slave(&mut self, fields: &CreateSlave) -> Result<String, CreateError> {
        self.insert(
            ResourceKind::Slave,
            fields.name.as_deref().unwrap_or(""),
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn create_target(&mut self, fields: &CreateTarget) -> Result<String, CreateError> {
        self.insert(
            ResourceKind::Target,
            fields.name.as_deref().unwrap_or(""),
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn create_task(&mut self, fields: &CreateTask) -> Result<String, CreateError> {
        self.insert(
            ResourceKind::Task,
            fields.name.as_deref().unwrap_or(""),
            fields.comment.as_deref().unwrap_or(""),
        )
    }

    fn modify_agent(&mut self, fields: &ModifyAgent) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::Agent,
            &fields.agent_id,
            &fields.name,
            &fields.comment,
        )
    }

    fn modify_alert(&mut self, fields: &ModifyAlert) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::Alert,
            &fields.alert_id,
            &fields.name,
            &fields.comment,
        )
    }

    fn modify_config(&mut self, fields: &ModifyConfig) -> Result<(), ModifyError> {
        self.touch(ResourceKind::Config, &fields.config_id, &None, &None)
    }

    fn modify_filter(&mut self, fields: &ModifyFilter) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::Filter,
            &fields.filter_id,
            &fields.name,
            &fields.comment,
        )?;
        if let Some(term) = &fields.term {
            let id = fields.filter_id.clone().unwrap_or_default();
            if let Some(row) = self
                .live
                .entry(ResourceKind::Filter)
                .or_default()
                .iter_mut()
                .find(|row| row.id == id)
            {
                if let Details::Filter(details) = &mut row.details {
                    details.term = term.clone();
                }
            }
        }
        Ok(())
    }

    fn modify_lsc_credential(&mut self, fields: &ModifyLscCredential) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::LscCredential,
            &fields.lsc_credential_id,
            &fields.name,
            &fields.comment,
        )
    }

    fn modify_note(&mut self, fields: &ModifyNote) -> Result<(), ModifyError> {
        self.touch(ResourceKind::Note, &fields.note_id, &None, &fields.text)
    }

    fn modify_override(&mut self, fields: &ModifyOverride) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::Override,
            &fields.override_id,
            &None,
            &fields.text,
        )
    }

    fn modify_port_list(&mut self, fields: &ModifyPortList) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::PortList,
            &fields.port_list_id,
            &fields.name,
            &fields.comment,
        )
    }

    fn modify_report(&mut self, fields: &ModifyReport) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::Report,
            &fields.report_id,
            &None,
            &fields.comment,
        )
    }

    fn modify_report_format(&mut self, fields: &ModifyReportFormat) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::ReportFormat,
            &fields.report_format_id,
            &fields.name,
            &None,
        )
    }

    fn modify_schedule(&mut self, fields: &ModifySchedule) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::Schedule,
            &fields.schedule_id,
            &fields.name,
            &fields.comment,
        )
    }

    fn modify_slave(&mut self, fields: &ModifySlave) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::Slave,
            &fields.slave_id,
            &fields.name,
            &fields.comment,
        )
    }

    fn modify_target(&mut self, fields: &ModifyTarget) -> Result<(), ModifyError> {
        if self.in_use.contains(&fields.target_id.clone().unwrap_or_default()) {
            return Err(ModifyError::InUse);
        }
        self.touch(
            ResourceKind::Target,
            &fields.target_id,
            &fields.name,
            &fields.comment,
        )
    }

    fn modify_task(&mut self, fields: &ModifyTask) -> Result<(), ModifyError> {
        self.touch(
            ResourceKind::Task,
            &fields.task_id,
            &fields.name,
            &fields.comment,
        )
    }

    fn delete(
        &mut self,
        kind: ResourceKind,
        id: &str,
        ultimate: bool,
    ) -> Result<(), DeleteError> {
        if self.in_use.contains(id) {
            return Err(DeleteError::InUse);
        }
        self.mutations += 1;
        let rows = self.live.entry(kind).or_default();
        if let Some(index) = rows.iter().position(|row| row.id == id) {
            let row = rows.remove(index);
            if !ultimate {
                self.trash.entry(kind).or_default().push(row);
            }
            return Ok(());
        }
        if ultimate {
            let trash = self.trash.entry(kind).or_default();
            if let Some(index) = trash.iter().position(|row| row.id == id) {
                trash.remove(index);
            }
        }
        Ok(())
    }

    fn empty_trashcan(&mut self) -> Result<(), BackendError> {
        self.mutations += 1;
        self.trash.clear();
        Ok(())
    }

    fn restore(&mut self, id: &str) -> Result<(), RestoreError> {
        self.mutations += 1;
        for (kind, rows) in self.trash.iter_mut() {
            if let Some(index) = rows.iter().position(|row| row.id == id) {
                let row = rows[index].clone();
                let clash = self
                    .live
                    .get(kind)
                    .is_some_and(|live| live.iter().any(|l| l.name == row.name));
                if clash {
                    return Err(RestoreError::NameConflict);
                }
                rows.remove(index);
                self.live.entry(*kind).or_default().push(row);
                return Ok(());
            }
        }
        Err(RestoreError::NotFound)
    }

    fn start_task(&mut self, _task_id: &str) -> Result<StartOutcome, TaskActionError> {
        self.mutations += 1;
        let report_id = Uuid::new_v4().to_string();
        match self.start_behavior {
            StartBehavior::Synchronous => Ok(StartOutcome::Started { report_id }),
            StartBehavior::Forked => Ok(StartOutcome::Requested { report_id }),
            StartBehavior::AlreadyActive => Err(TaskActionError::WrongState(
                "Task is active already".to_owned(),
            )),
        }
    }

    fn stop_task(&mut self, _task_id: &str) -> Result<(), TaskActionError> {
        self.mutations += 1;
        Ok(())
    }

    fn pause_task(&mut self, _task_id: &str) -> Result<(), TaskActionError> {
        self.mutations += 1;
        Ok(())
    }

    fn resume_paused_task(&mut self, _task_id: &str) -> Result<(), TaskActionError> {
        self.mutations += 1;
        Ok(())
    }

    fn resume_stopped_task(&mut self, task_id: &str) -> Result<StartOutcome, TaskActionError> {
        self.start_task(task_id)
    }

    fn resume_or_start_task(&mut self, task_id: &str) -> Result<StartOutcome, TaskActionError> {
        self.start_task(task_id)
    }

    fn test_alert(&mut self, _alert_id: &str) -> Result<(), BackendError> {
        self.mutations += 1;
        Ok(())
    }

    fn verify_agent(&self, agent_id: &str) -> Result<bool, BackendError> {
        Ok(!self.invalid_signatures.contains(agent_id))
    }

    fn verify_report_format(&self, report_format_id: &str) -> Result<bool, BackendError> {
        Ok(!self.invalid_signatures.contains(report_format_id))
    }
}
