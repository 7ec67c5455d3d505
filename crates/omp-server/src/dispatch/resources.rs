//! CREATE_*, MODIFY_*, DELETE_* and the trashcan pair.
//!
//! Reference resolution happens here, at dispatch time: every `*_id`
//! the command carries is looked up through the backend before the
//! operation runs, and a dangling reference is a 404 — never a silent
//! no-op.

use tracing::info;

use omp_core::error::Result;
use omp_core::sink::OutputSink;
use omp_core::status::StatusCode;

use crate::backend::{Backend, CreateError, DeleteError, ModifyError, ResourceKind, RestoreError};
use crate::command::Command;
use crate::response;
use crate::session::{Flow, Session};

use super::backend_status;

/// Outcome of a reference lookup.
enum Resolved {
    /// The resource exists; carry on.
    Found,
    /// A response was already written (404 or backend failure).
    Responded,
}

/// Look up a referenced resource, writing the 404 on a miss.
fn require<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: &str,
    kind: ResourceKind,
    id: &str,
    trash: bool,
) -> Result<Resolved> {
    match backend.find(kind, id, trash) {
        Ok(true) => Ok(Resolved::Found),
        Ok(false) => {
            response::with_text(
                &mut session.sink,
                command,
                StatusCode::Missing,
                &response::missing_text(kind.tag(), id),
            )?;
            Ok(Resolved::Responded)
        }
        Err(error) => {
            response::simple(&mut session.sink, command, backend_status(&error))?;
            Ok(Resolved::Responded)
        }
    }
}

/// Resolve an optional reference; `Found` when absent.
fn require_opt<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: &str,
    kind: ResourceKind,
    id: &Option<String>,
) -> Result<Resolved> {
    match id.as_deref() {
        Some(id) if !id.is_empty() => require(session, backend, command, kind, id, false),
        _ => Ok(Resolved::Found),
    }
}

fn create_failed<S: OutputSink>(
    session: &mut Session<S>,
    command: &str,
    kind: ResourceKind,
    error: &CreateError,
) -> Result<()> {
    match error {
        CreateError::Duplicate => response::with_text(
            &mut session.sink,
            command,
            StatusCode::Syntax,
            &format!("{} exists already", kind.display()),
        ),
        CreateError::Invalid(message) => {
            response::with_text(&mut session.sink, command, StatusCode::Syntax, message)
        }
        CreateError::Backend(error) => {
            response::simple(&mut session.sink, command, backend_status(error))
        }
    }
}

fn modify_failed<S: OutputSink>(
    session: &mut Session<S>,
    command: &str,
    kind: ResourceKind,
    error: &ModifyError,
) -> Result<()> {
    match error {
        ModifyError::Duplicate => response::with_text(
            &mut session.sink,
            command,
            StatusCode::Syntax,
            &format!("{} exists already", kind.display()),
        ),
        ModifyError::InUse => response::simple(&mut session.sink, command, StatusCode::Busy),
        ModifyError::Invalid(message) => {
            response::with_text(&mut session.sink, command, StatusCode::Syntax, message)
        }
        ModifyError::Backend(error) => {
            response::simple(&mut session.sink, command, backend_status(error))
        }
    }
}

/// Macro-free plumbing shared by every create arm: run the backend
/// call, then write either the 201 or the mapped failure.
fn finish_create<S: OutputSink>(
    session: &mut Session<S>,
    command: &str,
    kind: ResourceKind,
    outcome: std::result::Result<String, CreateError>,
) -> Result<Flow> {
    match outcome {
        Ok(id) => {
            info!(resource = kind.tag(), id = %id, "created");
            response::created(&mut session.sink, command, &id)?;
        }
        Err(error) => create_failed(session, command, kind, &error)?,
    }
    Ok(Flow::Continue)
}

fn finish_modify<S: OutputSink>(
    session: &mut Session<S>,
    command: &str,
    kind: ResourceKind,
    id: &str,
    outcome: std::result::Result<(), ModifyError>,
) -> Result<Flow> {
    match outcome {
        Ok(()) => {
            info!(resource = kind.tag(), id = %id, "modified");
            response::simple(&mut session.sink, command, StatusCode::Ok)?;
        }
        Err(error) => modify_failed(session, command, kind, &error)?,
    }
    Ok(Flow::Continue)
}

// =============================================================================
// Create
// =============================================================================

pub(super) fn create<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: Command,
) -> Result<Flow> {
    let name = command.name();
    match command {
        Command::CreateAgent(data) => {
            let outcome = backend.create_agent(&data);
            finish_create(session, name, ResourceKind::Agent, outcome)
        }
        Command::CreateAlert(data) => {
            if let Resolved::Responded =
                require_opt(session, backend, name, ResourceKind::Filter, &data.filter_id)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.create_alert(&data);
            finish_create(session, name, ResourceKind::Alert, outcome)
        }
        Command::CreateConfig(data) => {
            if let Resolved::Responded =
                require_opt(session, backend, name, ResourceKind::Config, &data.copy)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.create_config(&data);
            finish_create(session, name, ResourceKind::Config, outcome)
        }
        Command::CreateFilter(data) => {
            let outcome = backend.create_filter(&data);
            finish_create(session, name, ResourceKind::Filter, outcome)
        }
        Command::CreateLscCredential(data) => {
            let outcome = backend.create_lsc_credential(&data);
            finish_create(session, name, ResourceKind::LscCredential, outcome)
        }
        Command::CreateNote(data) => {
            if let Resolved::Responded =
                require_opt(session, backend, name, ResourceKind::Task, &data.task_id)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.create_note(&data);
            finish_create(session, name, ResourceKind::Note, outcome)
        }
        Command::CreateOverride(data) => {
            if let Resolved::Responded =
                require_opt(session, backend, name, ResourceKind::Task, &data.task_id)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.create_override(&data);
            finish_create(session, name, ResourceKind::Override, outcome)
        }
        Command::CreatePortList(data) => {
            let outcome = backend.create_port_list(&data);
            finish_create(session, name, ResourceKind::PortList, outcome)
        }
        Command::CreatePortRange(data) => {
            if let Resolved::Responded = require_opt(
                session,
                backend,
                name,
                ResourceKind::PortList,
                &data.port_list_id,
            )? {
                return Ok(Flow::Continue);
            }
            let outcome = backend.create_port_range(&data);
            finish_create(session, name, ResourceKind::PortRange, outcome)
        }
        Command::CreateReport(data) => {
            if let Resolved::Responded =
                require_opt(session, backend, name, ResourceKind::Task, &data.task_id)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.create_report(&data);
            finish_create(session, name, ResourceKind::Report, outcome)
        }
        Command::CreateReportFormat(data) => {
            let outcome = backend.create_report_format(&data);
            finish_create(session, name, ResourceKind::ReportFormat, outcome)
        }
        Command::CreateSchedule(data) => {
            let outcome = backend.create_schedule(&data);
            finish_create(session, name, ResourceKind::Schedule, outcome)
        }
        Command::CreateSlave(data) => {
            let outcome = backend.create_slave(&data);
            finish_create(session, name, ResourceKind::Slave, outcome)
        }
        Command::CreateTarget(data) => {
            for (kind, id) in [
                (ResourceKind::PortList, &data.port_list_id),
                (ResourceKind::LscCredential, &data.ssh_lsc_credential_id),
                (ResourceKind::LscCredential, &data.smb_lsc_credential_id),
            ] {
                if let Resolved::Responded = require_opt(session, backend, name, kind, id)? {
                    return Ok(Flow::Continue);
                }
            }
            let outcome = backend.create_target(&data);
            finish_create(session, name, ResourceKind::Target, outcome)
        }
        Command::CreateTask(data) => {
            for (kind, id) in [
                (ResourceKind::Config, &data.config_id),
                (ResourceKind::Target, &data.target_id),
                (ResourceKind::Schedule, &data.schedule_id),
                (ResourceKind::Slave, &data.slave_id),
            ] {
                if let Resolved::Responded = require_opt(session, backend, name, kind, id)? {
                    return Ok(Flow::Continue);
                }
            }
            for alert_id in &data.alert_ids {
                if let Resolved::Responded =
                    require(session, backend, name, ResourceKind::Alert, alert_id, false)?
                {
                    return Ok(Flow::Continue);
                }
            }
            let outcome = backend.create_task(&data);
            finish_create(session, name, ResourceKind::Task, outcome)
        }
        // dispatch() only routes create commands here.
        _ => unreachable!("create dispatch with non-create command"),
    }
}

// =============================================================================
// Modify
// =============================================================================

pub(super) fn modify<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: Command,
) -> Result<Flow> {
    let name = command.name();
    match command {
        Command::ModifyAgent(data) => {
            let id = data.agent_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Agent, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_agent(&data);
            finish_modify(session, name, ResourceKind::Agent, &id, outcome)
        }
        Command::ModifyAlert(data) => {
            let id = data.alert_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Alert, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            if let Resolved::Responded =
                require_opt(session, backend, name, ResourceKind::Filter, &data.filter_id)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_alert(&data);
            finish_modify(session, name, ResourceKind::Alert, &id, outcome)
        }
        Command::ModifyConfig(data) => {
            let id = data.config_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Config, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_config(&data);
            finish_modify(session, name, ResourceKind::Config, &id, outcome)
        }
        Command::ModifyFilter(data) => {
            let id = data.filter_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Filter, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_filter(&data);
            finish_modify(session, name, ResourceKind::Filter, &id, outcome)
        }
        Command::ModifyLscCredential(data) => {
            let id = data.lsc_credential_id.clone().unwrap_or_default();
            if let Resolved::Responded = require(
                session,
                backend,
                name,
                ResourceKind::LscCredential,
                &id,
                false,
            )? {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_lsc_credential(&data);
            finish_modify(session, name, ResourceKind::LscCredential, &id, outcome)
        }
        Command::ModifyNote(data) => {
            let id = data.note_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Note, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            if let Resolved::Responded =
                require_opt(session, backend, name, ResourceKind::Task, &data.task_id)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_note(&data);
            finish_modify(session, name, ResourceKind::Note, &id, outcome)
        }
        Command::ModifyOverride(data) => {
            let id = data.override_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Override, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            if let Resolved::Responded =
                require_opt(session, backend, name, ResourceKind::Task, &data.task_id)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_override(&data);
            finish_modify(session, name, ResourceKind::Override, &id, outcome)
        }
        Command::ModifyPortList(data) => {
            let id = data.port_list_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::PortList, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_port_list(&data);
            finish_modify(session, name, ResourceKind::PortList, &id, outcome)
        }
        Command::ModifyReport(data) => {
            let id = data.report_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Report, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_report(&data);
            finish_modify(session, name, ResourceKind::Report, &id, outcome)
        }
        Command::ModifyReportFormat(data) => {
            let id = data.report_format_id.clone().unwrap_or_default();
            if let Resolved::Responded = require(
                session,
                backend,
                name,
                ResourceKind::ReportFormat,
                &id,
                false,
            )? {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_report_format(&data);
            finish_modify(session, name, ResourceKind::ReportFormat, &id, outcome)
        }
        Command::ModifySchedule(data) => {
            let id = data.schedule_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Schedule, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_schedule(&data);
            finish_modify(session, name, ResourceKind::Schedule, &id, outcome)
        }
        Command::ModifySlave(data) => {
            let id = data.slave_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Slave, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            let outcome = backend.modify_slave(&data);
            finish_modify(session, name, ResourceKind::Slave, &id, outcome)
        }
        Command::ModifyTarget(data) => {
            let id = data.target_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Target, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            for (kind, reference) in [
                (ResourceKind::PortList, &data.port_list_id),
                (ResourceKind::LscCredential, &data.ssh_lsc_credential_id),
                (ResourceKind::LscCredential, &data.smb_lsc_credential_id),
            ] {
                if let Resolved::Responded = require_opt(session, backend, name, kind, reference)? {
                    return Ok(Flow::Continue);
                }
            }
            let outcome = backend.modify_target(&data);
            finish_modify(session, name, ResourceKind::Target, &id, outcome)
        }
        Command::ModifyTask(data) => {
            let id = data.task_id.clone().unwrap_or_default();
            if let Resolved::Responded =
                require(session, backend, name, ResourceKind::Task, &id, false)?
            {
                return Ok(Flow::Continue);
            }
            for (kind, reference) in [
                (ResourceKind::Config, &data.config_id),
                (ResourceKind::Target, &data.target_id),
                (ResourceKind::Schedule, &data.schedule_id),
                (ResourceKind::Slave, &data.slave_id),
            ] {
                if let Resolved::Responded = require_opt(session, backend, name, kind, reference)? {
                    return Ok(Flow::Continue);
                }
            }
            if let Some(alert_ids) = &data.alert_ids {
                for alert_id in alert_ids {
                    if let Resolved::Responded =
                        require(session, backend, name, ResourceKind::Alert, alert_id, false)?
                    {
                        return Ok(Flow::Continue);
                    }
                }
            }
            let outcome = backend.modify_task(&data);
            finish_modify(session, name, ResourceKind::Task, &id, outcome)
        }
        _ => unreachable!("modify dispatch with non-modify command"),
    }
}

// =============================================================================
// Delete, Trashcan, Restore
// =============================================================================

pub(super) fn delete<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    kind: ResourceKind,
    id: &str,
    ultimate: bool,
) -> Result<Flow> {
    let name = format!("delete_{}", kind.tag());

    // An ultimate delete may address a resource already in the trash.
    let found = match backend.find(kind, id, false) {
        Ok(true) => true,
        Ok(false) if ultimate => match backend.find(kind, id, true) {
            Ok(found) => found,
            Err(error) => {
                response::simple(&mut session.sink, &name, backend_status(&error))?;
                return Ok(Flow::Continue);
            }
        },
        Ok(false) => false,
        Err(error) => {
            response::simple(&mut session.sink, &name, backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };
    if !found {
        response::with_text(
            &mut session.sink,
            &name,
            StatusCode::Missing,
            &response::missing_text(kind.tag(), id),
        )?;
        return Ok(Flow::Continue);
    }

    match backend.delete(kind, id, ultimate) {
        Ok(()) => {
            info!(resource = kind.tag(), id = %id, ultimate, "deleted");
            response::simple(&mut session.sink, &name, StatusCode::Ok)?;
        }
        Err(DeleteError::InUse) => {
            response::simple(&mut session.sink, &name, StatusCode::Busy)?;
        }
        Err(DeleteError::Backend(error)) => {
            response::simple(&mut session.sink, &name, backend_status(&error))?;
        }
    }
    Ok(Flow::Continue)
}

pub(super) fn empty_trashcan<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
) -> Result<Flow> {
    match backend.empty_trashcan() {
        Ok(()) => {
            info!("trashcan emptied");
            response::simple(&mut session.sink, "empty_trashcan", StatusCode::Ok)?;
        }
        Err(error) => {
            response::simple(&mut session.sink, "empty_trashcan", backend_status(&error))?;
        }
    }
    Ok(Flow::Continue)
}

pub(super) fn restore<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    id: &str,
) -> Result<Flow> {
    match backend.restore(id) {
        Ok(()) => {
            info!(id = %id, "restored from trashcan");
            response::simple(&mut session.sink, "restore", StatusCode::Ok)?;
        }
        Err(RestoreError::NotFound) => {
            response::with_text(
                &mut session.sink,
                "restore",
                StatusCode::Missing,
                &response::missing_text("resource", id),
            )?;
        }
        Err(RestoreError::NameConflict) => {
            response::with_text(
                &mut session.sink,
                "restore",
                StatusCode::Syntax,
                "A resource with this name exists already",
            )?;
        }
        Err(RestoreError::Backend(error)) => {
            response::simple(&mut session.sink, "restore", backend_status(&error))?;
        }
    }
    Ok(Flow::Continue)
}
