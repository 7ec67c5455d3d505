//! RUN_WIZARD execution.
//!
//! A wizard synthesizes a sequence of ordinary commands and feeds them
//! through a transient session over the same backend — the outer
//! session stays exactly where it was, and the inner responses are
//! returned to the client inside the wizard envelope. Data flows
//! between steps by reading the `id` attribute off each inner response.

use tracing::info;

use omp_core::error::Result;
use omp_core::sink::OutputSink;
use omp_core::status::StatusCode;
use omp_core::xml::{escape_text, XmlWriter};

use crate::backend::Backend;
use crate::command::RunWizard;
use crate::response;
use crate::session::{Flow, Session};

/// The scan config the quick wizard schedules, a fixture every install
/// carries.
const FULL_AND_FAST_CONFIG: &str = "daba56c8-73ec-11df-a475-002264764cea";

/// Run a wizard by name.
pub(crate) fn run<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    data: &RunWizard,
) -> Result<Flow> {
    match data.name.as_deref() {
        Some("quick_first_scan") => quick_first_scan(session, backend, data),
        Some(name) => {
            response::with_text(
                &mut session.sink,
                "run_wizard",
                StatusCode::Missing,
                &response::missing_text("wizard", name),
            )?;
            Ok(Flow::Continue)
        }
        // Required-field validation already refused a missing name.
        None => Ok(Flow::Continue),
    }
}

/// Create a target for the given hosts, create a task over the default
/// config, and start it.
fn quick_first_scan<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    data: &RunWizard,
) -> Result<Flow> {
    let Some(hosts) = data
        .params
        .iter()
        .find(|(name, _)| name == "hosts")
        .map(|(_, value)| value.clone())
    else {
        response::with_text(
            &mut session.sink,
            "run_wizard",
            StatusCode::Syntax,
            "RUN_WIZARD quick_first_scan requires a hosts parameter",
        )?;
        return Ok(Flow::Continue);
    };

    let mut inner = String::new();

    let target_xml = format!(
        "<create_target><name>Target for immediate scan of IP {hosts}</name>\
         <hosts>{hosts}</hosts></create_target>",
        hosts = escape_text(&hosts)
    );
    let target_response = session.run_nested(backend, &target_xml)?;
    let target_id = extract_id(&target_response);
    inner.push_str(&target_response);

    let task_id = if let Some(target_id) = &target_id {
        let task_xml = format!(
            "<create_task><name>Immediate scan of IP {hosts}</name>\
             <config id=\"{config}\"/><target id=\"{target}\"/></create_task>",
            hosts = escape_text(&hosts),
            config = FULL_AND_FAST_CONFIG,
            target = target_id
        );
        let task_response = session.run_nested(backend, &task_xml)?;
        let task_id = extract_id(&task_response);
        inner.push_str(&task_response);
        task_id
    } else {
        None
    };

    let mut started = false;
    if let Some(task_id) = &task_id {
        let start_xml = format!("<start_task task_id=\"{}\"/>", task_id);
        let start_response = session.run_nested(backend, &start_xml)?;
        started = response_succeeded(&start_response);
        inner.push_str(&start_response);
    }

    let status = if started {
        info!(wizard = "quick_first_scan", "wizard completed");
        StatusCode::Requested
    } else {
        StatusCode::Internal
    };
    response::open(&mut session.sink, "run_wizard", status)?;
    XmlWriter::new(&mut session.sink).raw(&inner)?;
    response::close(&mut session.sink, "run_wizard")?;
    Ok(Flow::Continue)
}

/// Pull the `id` attribute off a create response.
fn extract_id(response: &str) -> Option<String> {
    if !response_succeeded(response) {
        return None;
    }
    let start = response.find(" id=\"")? + 5;
    let rest = &response[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_owned())
}

/// True when the (single) response in the buffer carries a 2xx status.
fn response_succeeded(response: &str) -> bool {
    response.contains("status=\"200\"")
        || response.contains("status=\"201\"")
        || response.contains("status=\"202\"")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_extraction_from_create_response() {
        let response =
            r#"<create_target_response status="201" status_text="OK, resource created" id="t-42"/>"#;
        assert_eq!(extract_id(response).as_deref(), Some("t-42"));
    }

    #[test]
    fn no_id_from_error_response() {
        let response = r#"<create_target_response status="400" status_text="Target exists already"/>"#;
        assert_eq!(extract_id(response), None);
    }

    #[test]
    fn success_detection() {
        assert!(response_succeeded(r#"<x status="202" status_text="OK, request submitted"/>"#));
        assert!(!response_succeeded(r#"<x status="404" status_text="Resource missing"/>"#));
    }
}
