//! Task lifecycle, alert tests and signature verification.
//!
//! Starting (or resuming into a start of) a scan may fork a worker in
//! the backend. The session records the first fork; any further
//! start-shaped command in the same process is a fatal condition — a
//! forked child must never itself fork.

use tracing::info;

use omp_core::error::{Error, Result};
use omp_core::sink::OutputSink;
use omp_core::status::StatusCode;
use omp_core::xml::XmlWriter;

use crate::backend::{Backend, ResourceKind, StartOutcome, TaskActionError};
use crate::response;
use crate::session::{Flow, Session};

use super::backend_status;

fn task_missing<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: &str,
    task_id: &str,
) -> Result<bool> {
    match backend.find(ResourceKind::Task, task_id, false) {
        Ok(true) => Ok(false),
        Ok(false) => {
            response::with_text(
                &mut session.sink,
                command,
                StatusCode::Missing,
                &response::missing_text("task", task_id),
            )?;
            Ok(true)
        }
        Err(error) => {
            response::simple(&mut session.sink, command, backend_status(&error))?;
            Ok(true)
        }
    }
}

fn action_failed<S: OutputSink>(
    session: &mut Session<S>,
    command: &str,
    error: &TaskActionError,
) -> Result<()> {
    match error {
        TaskActionError::WrongState(message) => {
            response::with_text(&mut session.sink, command, StatusCode::Syntax, message)
        }
        TaskActionError::Backend(error) => {
            response::simple(&mut session.sink, command, backend_status(error))
        }
    }
}

/// Write the 202 for an accepted start, carrying the new report id.
fn started<S: OutputSink>(
    session: &mut Session<S>,
    command: &str,
    report_id: &str,
) -> Result<()> {
    response::open(&mut session.sink, command, StatusCode::Requested)?;
    XmlWriter::new(&mut session.sink).text_element("report_id", report_id)?;
    response::close(&mut session.sink, command)
}

pub(super) fn lifecycle<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: &str,
    task_id: &str,
) -> Result<Flow> {
    if task_missing(session, backend, command, task_id)? {
        return Ok(Flow::Continue);
    }

    match command {
        "start_task" | "resume_stopped_task" | "resume_or_start_task" => {
            // A forked worker serves out its single scan and nothing
            // more; a second fork attempt must fail fast.
            if session.forked {
                return Err(Error::AlreadyForked);
            }
            let outcome = match command {
                "start_task" => backend.start_task(task_id),
                "resume_stopped_task" => backend.resume_stopped_task(task_id),
                _ => backend.resume_or_start_task(task_id),
            };
            match outcome {
                Ok(StartOutcome::Started { report_id }) => {
                    info!(task = %task_id, report = %report_id, "scan started");
                    started(session, command, &report_id)?;
                    Ok(Flow::Continue)
                }
                Ok(StartOutcome::Requested { report_id }) => {
                    info!(task = %task_id, report = %report_id, "scan handed to worker");
                    session.forked = true;
                    started(session, command, &report_id)?;
                    Ok(Flow::Continue)
                }
                // Inside the forked worker the scan already ran; the
                // parent owns the connection from here on.
                Ok(StartOutcome::ChildSuccess) => Ok(Flow::Quit),
                Ok(StartOutcome::ChildError) => {
                    response::simple(&mut session.sink, command, StatusCode::Internal)?;
                    Ok(Flow::Quit)
                }
                Err(error) => {
                    action_failed(session, command, &error)?;
                    Ok(Flow::Continue)
                }
            }
        }
        "stop_task" => finish_control(session, command, task_id, backend.stop_task(task_id)),
        "pause_task" => finish_control(session, command, task_id, backend.pause_task(task_id)),
        "resume_paused_task" => {
            finish_control(session, command, task_id, backend.resume_paused_task(task_id))
        }
        other => Err(Error::Internal {
            message: format!("lifecycle dispatch for {}", other),
        }),
    }
}

fn finish_control<S: OutputSink>(
    session: &mut Session<S>,
    command: &str,
    task_id: &str,
    outcome: std::result::Result<(), TaskActionError>,
) -> Result<Flow> {
    match outcome {
        Ok(()) => {
            info!(task = %task_id, command, "task control accepted");
            response::simple(&mut session.sink, command, StatusCode::Requested)?;
        }
        Err(error) => action_failed(session, command, &error)?,
    }
    Ok(Flow::Continue)
}

pub(super) fn test_alert<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    alert_id: &str,
) -> Result<Flow> {
    match backend.find(ResourceKind::Alert, alert_id, false) {
        Ok(true) => {}
        Ok(false) => {
            response::with_text(
                &mut session.sink,
                "test_alert",
                StatusCode::Missing,
                &response::missing_text("alert", alert_id),
            )?;
            return Ok(Flow::Continue);
        }
        Err(error) => {
            response::simple(&mut session.sink, "test_alert", backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    }

    match backend.test_alert(alert_id) {
        Ok(()) => {
            info!(alert = %alert_id, "alert tested");
            response::simple(&mut session.sink, "test_alert", StatusCode::Ok)?;
        }
        Err(error) => {
            response::simple(&mut session.sink, "test_alert", backend_status(&error))?;
        }
    }
    Ok(Flow::Continue)
}

pub(super) fn verify_agent<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    agent_id: &str,
) -> Result<Flow> {
    verify(
        session,
        backend,
        "verify_agent",
        ResourceKind::Agent,
        agent_id,
    )
}

pub(super) fn verify_report_format<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    report_format_id: &str,
) -> Result<Flow> {
    verify(
        session,
        backend,
        "verify_report_format",
        ResourceKind::ReportFormat,
        report_format_id,
    )
}

fn verify<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: &str,
    kind: ResourceKind,
    id: &str,
) -> Result<Flow> {
    match backend.find(kind, id, false) {
        Ok(true) => {}
        Ok(false) => {
            response::with_text(
                &mut session.sink,
                command,
                StatusCode::Missing,
                &response::missing_text(kind.tag(), id),
            )?;
            return Ok(Flow::Continue);
        }
        Err(error) => {
            response::simple(&mut session.sink, command, backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    }

    let valid = match kind {
        ResourceKind::Agent => backend.verify_agent(id),
        _ => backend.verify_report_format(id),
    };
    match valid {
        Ok(true) => {
            info!(resource = kind.tag(), id = %id, "verified");
            response::simple(&mut session.sink, command, StatusCode::Ok)?;
        }
        Ok(false) => {
            response::with_text(
                &mut session.sink,
                command,
                StatusCode::Internal,
                &format!("{} failed verification", kind.display()),
            )?;
        }
        Err(error) => {
            response::simple(&mut session.sink, command, backend_status(&error))?;
        }
    }
    Ok(Flow::Continue)
}
