//! Response envelopes.
//!
//! Every command yields exactly one top-level envelope,
//! `<COMMAND_response status="CODE" status_text="TEXT">…</COMMAND_response>`,
//! written straight to the output sink. The helpers here own the
//! envelope shapes; listing internals live with the GET dispatcher.

use omp_core::error::Result;
use omp_core::sink::OutputSink;
use omp_core::status::StatusCode;
use omp_core::xml::XmlWriter;

/// Self-closed envelope with the status's default text.
pub fn simple<S: OutputSink>(sink: &mut S, command: &str, status: StatusCode) -> Result<()> {
    with_text(sink, command, status, status.default_text())
}

/// Self-closed envelope with a specific status text.
pub fn with_text<S: OutputSink>(
    sink: &mut S,
    command: &str,
    status: StatusCode,
    text: &str,
) -> Result<()> {
    let tag = envelope_tag(command);
    XmlWriter::new(sink).empty(
        &tag,
        &[("status", status.code()), ("status_text", text)],
    )
}

/// Self-closed 201 envelope carrying the new resource id.
pub fn created<S: OutputSink>(sink: &mut S, command: &str, id: &str) -> Result<()> {
    let tag = envelope_tag(command);
    XmlWriter::new(sink).empty(
        &tag,
        &[
            ("status", StatusCode::Created.code()),
            ("status_text", StatusCode::Created.default_text()),
            ("id", id),
        ],
    )
}

/// Open an envelope that will carry child elements.
pub fn open<S: OutputSink>(sink: &mut S, command: &str, status: StatusCode) -> Result<()> {
    open_with_text(sink, command, status, status.default_text())
}

/// Open an envelope with a specific status text.
pub fn open_with_text<S: OutputSink>(
    sink: &mut S,
    command: &str,
    status: StatusCode,
    text: &str,
) -> Result<()> {
    let tag = envelope_tag(command);
    XmlWriter::new(sink).start(
        &tag,
        &[("status", status.code()), ("status_text", text)],
    )
}

/// Close an envelope opened with [`open`].
pub fn close<S: OutputSink>(sink: &mut S, command: &str) -> Result<()> {
    XmlWriter::new(sink).end(&envelope_tag(command))
}

/// The 404 text for a missing resource reference.
pub fn missing_text(kind_tag: &str, id: &str) -> String {
    format!("Failed to find {} '{}'", kind_tag, id)
}

fn envelope_tag(command: &str) -> String {
    format!("{}_response", command)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use omp_core::sink::BufferSink;

    #[test]
    fn simple_envelope_shape() {
        let mut sink = BufferSink::new();
        simple(&mut sink, "delete_task", StatusCode::Ok).unwrap();
        assert_eq!(
            sink.as_str(),
            r#"<delete_task_response status="200" status_text="OK"/>"#
        );
    }

    #[test]
    fn created_carries_id() {
        let mut sink = BufferSink::new();
        created(&mut sink, "create_target", "t-1").unwrap();
        assert_eq!(
            sink.as_str(),
            r#"<create_target_response status="201" status_text="OK, resource created" id="t-1"/>"#
        );
    }

    #[test]
    fn missing_text_matches_wire_format() {
        assert_eq!(
            missing_text("task", "nonexistent-uuid"),
            "Failed to find task 'nonexistent-uuid'"
        );
    }

    #[test]
    fn open_close_pair() {
        let mut sink = BufferSink::new();
        open(&mut sink, "get_version", StatusCode::Ok).unwrap();
        XmlWriter::new(&mut sink)
            .text_element("version", "4.0")
            .unwrap();
        close(&mut sink, "get_version").unwrap();
        assert_eq!(
            sink.as_str(),
            r#"<get_version_response status="200" status_text="OK"><version>4.0</version></get_version_response>"#
        );
    }

    #[test]
    fn status_text_escapes() {
        let mut sink = BufferSink::new();
        with_text(&mut sink, "create_task", StatusCode::Syntax, "a<b").unwrap();
        assert!(sink.as_str().contains(r#"status_text="a&lt;b""#));
    }
}
