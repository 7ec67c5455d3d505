//! The GET family.
//!
//! Every listing uses the same envelope: the common block per item,
//! type-specific details, then the filter/sort/pagination footer. The
//! "info" type is the one irregular name — its listing tag has no
//! trailing "s".
//!
//! Pagination retry: when a page comes back empty and the requested
//! offset was past row one (resources vanished between count and
//! fetch), the query is rebuilt once with `first=1`. One retry, never a
//! loop.

use omp_core::error::Result;
use omp_core::filter::Filter;
use omp_core::sink::OutputSink;
use omp_core::status::StatusCode;
use omp_core::xml::XmlWriter;

use crate::backend::{
    Backend, Details, Query, RefRow, ResourceKind, ResourceRow,
};
use crate::command::{GetCommand, GetData, GetWhat};
use crate::response;
use crate::session::{Flow, Session};

use super::backend_status;

fn bool_str(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Filter Resolution
// =============================================================================

/// Resolve the effective filter for a listing.
///
/// A saved-filter reference (`filt_id`) overrides an inline term; a
/// dangling reference is a 404. Returns the filter plus the id echoed
/// in the footer ("0" when no saved filter applies).
fn resolve_filter<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    command: &str,
    data: &GetData,
    default_sort: &str,
) -> Result<Option<(Filter, String)>> {
    match data.filt_id.as_deref() {
        Some(filt_id) if !filt_id.is_empty() && filt_id != "0" => {
            match backend.filter_term(filt_id) {
                Ok(Some(term)) => Ok(Some((
                    Filter::parse(&term, default_sort),
                    filt_id.to_owned(),
                ))),
                Ok(None) => {
                    response::with_text(
                        &mut session.sink,
                        command,
                        StatusCode::Missing,
                        &response::missing_text("filter", filt_id),
                    )?;
                    Ok(None)
                }
                Err(error) => {
                    response::simple(&mut session.sink, command, backend_status(&error))?;
                    Ok(None)
                }
            }
        }
        _ => {
            let term = data.filter.as_deref().unwrap_or("");
            Ok(Some((Filter::parse(term, default_sort), "0".to_owned())))
        }
    }
}

// =============================================================================
// Envelope Pieces
// =============================================================================

/// The filters/sort/pagination footer shared by all listings.
fn footer<S: OutputSink>(
    sink: &mut S,
    plural: &str,
    count_tag: &str,
    filt_id: &str,
    filter: &Filter,
    page: usize,
    filtered: i64,
) -> Result<()> {
    let mut writer = XmlWriter::new(sink);
    writer.start("filters", &[("id", filt_id)])?;
    writer.text_element("term", &filter.term)?;
    writer.end("filters")?;

    writer.start("sort", &[])?;
    writer.start("field", &[])?;
    writer.text(&filter.sort_field)?;
    writer.text_element("order", filter.sort_order())?;
    writer.end("field")?;
    writer.end("sort")?;

    writer.empty(
        plural,
        &[
            ("start", &filter.first.to_string()),
            ("max", &filter.max.to_string()),
        ],
    )?;

    let page_text = page.to_string();
    writer.start(count_tag, &[])?;
    writer.text(&page_text)?;
    writer.text_element("filtered", &filtered.to_string())?;
    writer.text_element("page", &page_text)?;
    writer.end(count_tag)
}

/// An id/name reference element, e.g. `<config id="…"><name>…</name></config>`.
fn ref_element<S: OutputSink>(sink: &mut S, tag: &str, reference: &RefRow) -> Result<()> {
    let mut writer = XmlWriter::new(sink);
    writer.start(tag, &[("id", &reference.id)])?;
    writer.text_element("name", &reference.name)?;
    writer.end(tag)
}

/// A wrapped list of references, omitted entirely when empty.
fn ref_list<S: OutputSink>(
    sink: &mut S,
    wrapper: &str,
    item: &str,
    refs: &[RefRow],
) -> Result<()> {
    if refs.is_empty() {
        return Ok(());
    }
    XmlWriter::new(sink).start(wrapper, &[])?;
    for reference in refs {
        ref_element(sink, item, reference)?;
    }
    XmlWriter::new(sink).end(wrapper)
}

/// One resource item: common block plus type-specific details.
fn emit_row<S: OutputSink>(sink: &mut S, kind: ResourceKind, row: &ResourceRow) -> Result<()> {
    {
        let mut writer = XmlWriter::new(sink);
        writer.start(kind.tag(), &[("id", &row.id)])?;
        writer.text_element("name", &row.name)?;
        writer.text_element("comment", &row.comment)?;
        writer.text_element("creation_time", &row.creation_time)?;
        writer.text_element("modification_time", &row.modification_time)?;
        writer.text_element("writable", bool_str(row.writable))?;
        writer.text_element("in_use", bool_str(row.in_use))?;
    }
    emit_details(sink, &row.details)?;
    XmlWriter::new(sink).end(kind.tag())
}

fn emit_details<S: OutputSink>(sink: &mut S, details: &Details) -> Result<()> {
    match details {
        Details::None => Ok(()),
        Details::Agent(agent) => {
            let mut writer = XmlWriter::new(sink);
            writer.start("installer", &[])?;
            writer.text_element("trust", &agent.installer_trust)?;
            writer.end("installer")?;
            writer.text_element("howto_install", &agent.howto_install)?;
            writer.text_element("howto_use", &agent.howto_use)
        }
        Details::Alert(alert) => {
            for (tag, name, data) in [
                ("condition", &alert.condition, &alert.condition_data),
                ("event", &alert.event, &alert.event_data),
                ("method", &alert.method, &alert.method_data),
            ] {
                let mut writer = XmlWriter::new(sink);
                writer.start(tag, &[])?;
                writer.text(name)?;
                for (data_name, data_value) in data {
                    writer.start("data", &[])?;
                    writer.text(data_value)?;
                    writer.text_element("name", data_name)?;
                    writer.end("data")?;
                }
                writer.end(tag)?;
            }
            if let Some(filter) = &alert.filter {
                ref_element(sink, "filter", filter)?;
            }
            ref_list(sink, "tasks", "task", &alert.tasks)
        }
        Details::Config(config) => {
            {
                let mut writer = XmlWriter::new(sink);
                writer.start("family_count", &[])?;
                writer.text(&config.family_count.to_string())?;
                writer.text_element("growing", bool_str(config.family_growing))?;
                writer.end("family_count")?;
                writer.start("nvt_count", &[])?;
                writer.text(&config.nvt_count.to_string())?;
                writer.text_element("growing", bool_str(config.nvt_growing))?;
                writer.end("nvt_count")?;
            }
            if !config.preferences.is_empty() {
                let mut writer = XmlWriter::new(sink);
                writer.start("preferences", &[])?;
                for preference in &config.preferences {
                    writer.start("preference", &[])?;
                    writer.start("nvt", &[("oid", &preference.nvt_oid)])?;
                    writer.text_element("name", &preference.nvt_name)?;
                    writer.end("nvt")?;
                    writer.text_element("name", &preference.name)?;
                    writer.text_element("value", &preference.value)?;
                    writer.end("preference")?;
                }
                writer.end("preferences")?;
            }
            ref_list(sink, "tasks", "task", &config.tasks)
        }
        Details::Filter(filter) => {
            let mut writer = XmlWriter::new(sink);
            writer.text_element("term", &filter.term)?;
            writer.text_element("type", &filter.filter_type)?;
            drop(writer);
            ref_list(sink, "alerts", "alert", &filter.alerts)
        }
        Details::LscCredential(credential) => {
            let mut writer = XmlWriter::new(sink);
            writer.text_element("login", &credential.login)?;
            writer.text_element("type", &credential.key_type)?;
            drop(writer);
            ref_list(sink, "targets", "target", &credential.targets)
        }
        Details::Note(note) => {
            {
                let mut writer = XmlWriter::new(sink);
                writer.start("nvt", &[("oid", &note.nvt_oid)])?;
                writer.text_element("name", &note.nvt_name)?;
                writer.end("nvt")?;
                writer.text_element("text", &note.text)?;
                writer.text_element("hosts", &note.hosts)?;
                writer.text_element("port", &note.port)?;
                writer.text_element("threat", &note.threat)?;
                writer.text_element("active", bool_str(note.active))?;
            }
            if let Some(task) = &note.task {
                ref_element(sink, "task", task)?;
            }
            if let Some(result_id) = &note.result_id {
                XmlWriter::new(sink).empty("result", &[("id", result_id)])?;
            }
            Ok(())
        }
        Details::Override(override_details) => {
            {
                let mut writer = XmlWriter::new(sink);
                writer.start("nvt", &[("oid", &override_details.nvt_oid)])?;
                writer.text_element("name", &override_details.nvt_name)?;
                writer.end("nvt")?;
                writer.text_element("text", &override_details.text)?;
                writer.text_element("hosts", &override_details.hosts)?;
                writer.text_element("port", &override_details.port)?;
                writer.text_element("threat", &override_details.threat)?;
                writer.text_element("new_threat", &override_details.new_threat)?;
                writer.text_element("active", bool_str(override_details.active))?;
            }
            if let Some(task) = &override_details.task {
                ref_element(sink, "task", task)?;
            }
            if let Some(result_id) = &override_details.result_id {
                XmlWriter::new(sink).empty("result", &[("id", result_id)])?;
            }
            Ok(())
        }
        Details::PortList(port_list) => {
            XmlWriter::new(sink)
                .text_element("port_count", &port_list.port_count.to_string())?;
            if !port_list.ranges.is_empty() {
                let mut writer = XmlWriter::new(sink);
                writer.start("port_ranges", &[])?;
                for range in &port_list.ranges {
                    writer.start("port_range", &[("id", &range.id)])?;
                    writer.text_element("start", &range.start.to_string())?;
                    writer.text_element("end", &range.end.to_string())?;
                    writer.text_element("type", &range.range_type)?;
                    writer.text_element("comment", &range.comment)?;
                    writer.end("port_range")?;
                }
                writer.end("port_ranges")?;
            }
            ref_list(sink, "targets", "target", &port_list.targets)
        }
        Details::Report(report) => {
            ref_element(sink, "task", &report.task)?;
            let mut writer = XmlWriter::new(sink);
            writer.text_element("scan_run_status", &report.scan_run_status)?;
            writer.text_element("scan_start", &report.scan_start)?;
            writer.text_element("scan_end", &report.scan_end)?;
            writer.text_element("result_count", &report.result_count.to_string())?;
            if !report.results.is_empty() {
                writer.start("results", &[])?;
                for result in &report.results {
                    writer.start("result", &[("id", &result.id)])?;
                    writer.text_element("host", &result.host)?;
                    writer.text_element("port", &result.port)?;
                    writer.start("nvt", &[("oid", &result.nvt_oid)])?;
                    writer.text_element("name", &result.nvt_name)?;
                    writer.end("nvt")?;
                    writer.text_element("threat", &result.threat)?;
                    writer.text_element("description", &result.description)?;
                    writer.end("result")?;
                }
                writer.end("results")?;
            }
            Ok(())
        }
        Details::ReportFormat(format) => {
            let mut writer = XmlWriter::new(sink);
            writer.text_element("extension", &format.extension)?;
            writer.text_element("content_type", &format.content_type)?;
            writer.text_element("summary", &format.summary)?;
            writer.text_element("description", &format.description)?;
            writer.text_element("global", bool_str(format.global))?;
            writer.text_element("active", bool_str(format.active))?;
            writer.text_element("trust", &format.trust)?;
            for (param_name, param_value) in &format.params {
                writer.start("param", &[])?;
                writer.text_element("name", param_name)?;
                writer.text_element("value", param_value)?;
                writer.end("param")?;
            }
            Ok(())
        }
        Details::Schedule(schedule) => {
            let mut writer = XmlWriter::new(sink);
            writer.text_element("first_time", &schedule.first_time)?;
            writer.text_element("next_time", &schedule.next_time)?;
            writer.text_element("period", &schedule.period.to_string())?;
            writer.text_element("period_months", &schedule.period_months.to_string())?;
            writer.text_element("duration", &schedule.duration.to_string())?;
            writer.text_element("timezone", &schedule.timezone)?;
            drop(writer);
            ref_list(sink, "tasks", "task", &schedule.tasks)
        }
        Details::Slave(slave) => {
            let mut writer = XmlWriter::new(sink);
            writer.text_element("host", &slave.host)?;
            writer.text_element("port", &slave.port)?;
            writer.text_element("login", &slave.login)?;
            drop(writer);
            ref_list(sink, "tasks", "task", &slave.tasks)
        }
        Details::Target(target) => {
            {
                let mut writer = XmlWriter::new(sink);
                writer.text_element("hosts", &target.hosts)?;
                writer.text_element("max_hosts", &target.max_hosts.to_string())?;
            }
            if let Some(port_list) = &target.port_list {
                ref_element(sink, "port_list", port_list)?;
            }
            if let Some(credential) = &target.ssh_lsc_credential {
                let mut writer = XmlWriter::new(sink);
                writer.start("ssh_lsc_credential", &[("id", &credential.id)])?;
                writer.text_element("name", &credential.name)?;
                writer.text_element("port", &target.ssh_port)?;
                writer.end("ssh_lsc_credential")?;
            }
            if let Some(credential) = &target.smb_lsc_credential {
                ref_element(sink, "smb_lsc_credential", credential)?;
            }
            ref_list(sink, "tasks", "task", &target.tasks)
        }
        Details::Task(task) => {
            {
                let mut writer = XmlWriter::new(sink);
                writer.text_element("status", &task.status)?;
                writer.text_element("progress", &task.progress.to_string())?;
            }
            if let Some(config) = &task.config {
                ref_element(sink, "config", config)?;
            }
            if let Some(target) = &task.target {
                ref_element(sink, "target", target)?;
            }
            if let Some(schedule) = &task.schedule {
                ref_element(sink, "schedule", schedule)?;
            }
            if let Some(slave) = &task.slave {
                ref_element(sink, "slave", slave)?;
            }
            let mut writer = XmlWriter::new(sink);
            writer.start("report_count", &[])?;
            writer.text(&task.report_count.to_string())?;
            writer.text_element("finished", &task.finished_report_count.to_string())?;
            writer.end("report_count")?;
            writer.text_element("trend", &task.trend)?;
            if let Some(last_report) = &task.last_report {
                writer.start("last_report", &[])?;
                writer.start("report", &[("id", &last_report.id)])?;
                writer.text_element("scan_end", &last_report.scan_end)?;
                writer.end("report")?;
                writer.end("last_report")?;
            }
            Ok(())
        }
    }
}

// =============================================================================
// Resource Listings
// =============================================================================

pub(crate) fn send_get<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    get: &GetCommand,
) -> Result<Flow> {
    match get.what {
        GetWhat::Resource(kind) => send_resources(session, backend, kind, &get.data),
        GetWhat::Nvts => send_nvts(session, backend, &get.data),
        GetWhat::Info => send_info(session, backend, &get.data),
        GetWhat::Settings => send_settings(session, backend, &get.data),
    }
}

fn send_resources<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    kind: ResourceKind,
    data: &GetData,
) -> Result<Flow> {
    let command = format!("get_{}", kind.plural());

    let Some((filter, filt_id)) =
        resolve_filter(session, backend, &command, data, kind.default_sort())?
    else {
        return Ok(Flow::Continue);
    };

    let mut query = Query {
        id: data.id.clone(),
        filter,
        trash: data.trash,
        details: data.details,
    };

    // A single-resource get must report a dangling id, never an empty
    // listing.
    if let Some(id) = query.id.as_deref() {
        match backend.find(kind, id, data.trash) {
            Ok(true) => {}
            Ok(false) => {
                response::with_text(
                    &mut session.sink,
                    &command,
                    StatusCode::Missing,
                    &response::missing_text(kind.tag(), id),
                )?;
                return Ok(Flow::Continue);
            }
            Err(error) => {
                response::simple(&mut session.sink, &command, backend_status(&error))?;
                return Ok(Flow::Continue);
            }
        }
    }

    let mut rows = match backend.list(kind, &query) {
        Ok(rows) => rows,
        Err(error) => {
            response::simple(&mut session.sink, &command, backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };

    // Resources may have been deleted between the client's count and
    // this fetch; retry once from row one, then accept whatever is
    // there.
    if rows.is_empty() && query.filter.first > 1 {
        query = query.with_first_reset();
        rows = match backend.list(kind, &query) {
            Ok(rows) => rows,
            Err(error) => {
                response::simple(&mut session.sink, &command, backend_status(&error))?;
                return Ok(Flow::Continue);
            }
        };
    }

    let filtered = match backend.count(kind, &query) {
        Ok(count) => count,
        Err(error) => {
            response::simple(&mut session.sink, &command, backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };

    response::open(&mut session.sink, &command, StatusCode::Ok)?;
    if kind == ResourceKind::Task {
        XmlWriter::new(&mut session.sink)
            .text_element("apply_overrides", bool_str(query.filter.apply_overrides))?;
    }
    for row in &rows {
        emit_row(&mut session.sink, kind, row)?;
    }
    footer(
        &mut session.sink,
        kind.plural(),
        &format!("{}_count", kind.tag()),
        &filt_id,
        &query.filter,
        rows.len(),
        filtered,
    )?;
    response::close(&mut session.sink, &command)?;
    Ok(Flow::Continue)
}

// =============================================================================
// NVTs, Info, Settings
// =============================================================================

fn send_nvts<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    data: &GetData,
) -> Result<Flow> {
    let Some((filter, filt_id)) = resolve_filter(session, backend, "get_nvts", data, "name")?
    else {
        return Ok(Flow::Continue);
    };
    let query = Query {
        id: data.id.clone(),
        filter,
        trash: false,
        details: data.details,
    };

    let rows = match backend.nvts(&query) {
        Ok(rows) => rows,
        Err(error) => {
            response::simple(&mut session.sink, "get_nvts", backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };

    if let Some(oid) = query.id.as_deref() {
        if rows.is_empty() {
            response::with_text(
                &mut session.sink,
                "get_nvts",
                StatusCode::Missing,
                &response::missing_text("nvt", oid),
            )?;
            return Ok(Flow::Continue);
        }
    }

    let filtered = rows.len();
    response::open(&mut session.sink, "get_nvts", StatusCode::Ok)?;
    for nvt in &rows {
        let mut writer = XmlWriter::new(&mut session.sink);
        writer.start("nvt", &[("oid", &nvt.oid)])?;
        writer.text_element("name", &nvt.name)?;
        writer.text_element("family", &nvt.family)?;
        writer.text_element("cvss_base", &nvt.cvss_base)?;
        writer.text_element("risk_factor", &nvt.risk_factor)?;
        if query.details {
            writer.text_element("summary", &nvt.summary)?;
            writer.text_element("preference_count", &nvt.preference_count.to_string())?;
        }
        writer.end("nvt")?;
    }
    footer(
        &mut session.sink,
        "nvts",
        "nvt_count",
        &filt_id,
        &query.filter,
        rows.len(),
        filtered as i64,
    )?;
    response::close(&mut session.sink, "get_nvts")?;
    Ok(Flow::Continue)
}

fn send_info<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    data: &GetData,
) -> Result<Flow> {
    let Some((filter, filt_id)) = resolve_filter(session, backend, "get_info", data, "name")?
    else {
        return Ok(Flow::Continue);
    };
    let query = Query {
        id: data.id.clone(),
        filter,
        trash: false,
        details: data.details,
    };

    let rows = match backend.info(&query, data.subtype.as_deref()) {
        Ok(rows) => rows,
        Err(error) => {
            response::simple(&mut session.sink, "get_info", backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };

    let filtered = rows.len();
    response::open(&mut session.sink, "get_info", StatusCode::Ok)?;
    for info in &rows {
        let mut writer = XmlWriter::new(&mut session.sink);
        writer.start("info", &[("id", &info.id)])?;
        writer.text_element("name", &info.name)?;
        writer.text_element("type", &info.info_type)?;
        writer.text_element("summary", &info.summary)?;
        writer.end("info")?;
    }
    // The irregular one: "info" in both the listing and count tags.
    footer(
        &mut session.sink,
        "info",
        "info_count",
        &filt_id,
        &query.filter,
        rows.len(),
        filtered as i64,
    )?;
    response::close(&mut session.sink, "get_info")?;
    Ok(Flow::Continue)
}

fn send_settings<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    data: &GetData,
) -> Result<Flow> {
    let Some((filter, filt_id)) = resolve_filter(session, backend, "get_settings", data, "name")?
    else {
        return Ok(Flow::Continue);
    };
    let query = Query {
        id: data.id.clone(),
        filter,
        trash: false,
        details: data.details,
    };

    let rows = match backend.settings(&query) {
        Ok(rows) => rows,
        Err(error) => {
            response::simple(&mut session.sink, "get_settings", backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };

    let filtered = rows.len();
    response::open(&mut session.sink, "get_settings", StatusCode::Ok)?;
    for setting in &rows {
        let mut writer = XmlWriter::new(&mut session.sink);
        writer.start("setting", &[("id", &setting.id)])?;
        writer.text_element("name", &setting.name)?;
        writer.text_element("comment", &setting.comment)?;
        writer.text_element("value", &setting.value)?;
        writer.end("setting")?;
    }
    footer(
        &mut session.sink,
        "settings",
        "setting_count",
        &filt_id,
        &query.filter,
        rows.len(),
        filtered as i64,
    )?;
    response::close(&mut session.sink, "get_settings")?;
    Ok(Flow::Continue)
}

// =============================================================================
// Simple Listings
// =============================================================================

pub(crate) fn send_nvt_families<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
) -> Result<Flow> {
    let families = match backend.nvt_families() {
        Ok(families) => families,
        Err(error) => {
            response::simple(&mut session.sink, "get_nvt_families", backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };
    response::open(&mut session.sink, "get_nvt_families", StatusCode::Ok)?;
    let mut writer = XmlWriter::new(&mut session.sink);
    writer.start("families", &[])?;
    for family in &families {
        writer.start("family", &[])?;
        writer.text_element("name", &family.name)?;
        writer.text_element("max_nvt_count", &family.max_nvt_count.to_string())?;
        writer.end("family")?;
    }
    writer.end("families")?;
    response::close(&mut session.sink, "get_nvt_families")?;
    Ok(Flow::Continue)
}

pub(crate) fn send_feed_checksum<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    algorithm: &str,
) -> Result<Flow> {
    match backend.nvt_feed_checksum(algorithm) {
        Ok(Some(checksum)) => {
            response::open(&mut session.sink, "get_nvt_feed_checksum", StatusCode::Ok)?;
            let mut writer = XmlWriter::new(&mut session.sink);
            writer.start("checksum", &[("algorithm", algorithm)])?;
            writer.text(&checksum)?;
            writer.end("checksum")?;
            response::close(&mut session.sink, "get_nvt_feed_checksum")?;
        }
        Ok(None) => {
            response::with_text(
                &mut session.sink,
                "get_nvt_feed_checksum",
                StatusCode::Syntax,
                &format!("GET_NVT_FEED_CHECKSUM algorithm must be md5, not '{}'", algorithm),
            )?;
        }
        Err(error) => {
            response::simple(
                &mut session.sink,
                "get_nvt_feed_checksum",
                backend_status(&error),
            )?;
        }
    }
    Ok(Flow::Continue)
}

pub(crate) fn send_preferences<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    nvt_oid: Option<&str>,
    config_id: Option<&str>,
    preference: Option<&str>,
) -> Result<Flow> {
    if let Some(config_id) = config_id {
        match backend.find(ResourceKind::Config, config_id, false) {
            Ok(true) => {}
            Ok(false) => {
                response::with_text(
                    &mut session.sink,
                    "get_preferences",
                    StatusCode::Missing,
                    &response::missing_text("config", config_id),
                )?;
                return Ok(Flow::Continue);
            }
            Err(error) => {
                response::simple(&mut session.sink, "get_preferences", backend_status(&error))?;
                return Ok(Flow::Continue);
            }
        }
    }

    let rows = match backend.preferences(nvt_oid, config_id, preference) {
        Ok(rows) => rows,
        Err(error) => {
            response::simple(&mut session.sink, "get_preferences", backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };
    response::open(&mut session.sink, "get_preferences", StatusCode::Ok)?;
    let mut writer = XmlWriter::new(&mut session.sink);
    for row in &rows {
        writer.start("preference", &[])?;
        if !row.nvt_oid.is_empty() {
            writer.start("nvt", &[("oid", &row.nvt_oid)])?;
            writer.text_element("name", &row.nvt_name)?;
            writer.end("nvt")?;
        }
        writer.text_element("name", &row.name)?;
        writer.text_element("value", &row.value)?;
        writer.end("preference")?;
    }
    response::close(&mut session.sink, "get_preferences")?;
    Ok(Flow::Continue)
}

pub(crate) fn send_dependencies<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
) -> Result<Flow> {
    let rows = match backend.dependencies() {
        Ok(rows) => rows,
        Err(error) => {
            response::simple(&mut session.sink, "get_dependencies", backend_status(&error))?;
            return Ok(Flow::Continue);
        }
    };
    response::open(&mut session.sink, "get_dependencies", StatusCode::Ok)?;
    let mut writer = XmlWriter::new(&mut session.sink);
    for row in &rows {
        writer.start("dependency", &[])?;
        writer.text_element("needer", &row.name)?;
        for required in &row.requires {
            writer.text_element("needee", required)?;
        }
        writer.end("dependency")?;
    }
    response::close(&mut session.sink, "get_dependencies")?;
    Ok(Flow::Continue)
}

pub(crate) fn send_system_reports<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
    name: Option<&str>,
    duration: Option<u64>,
    brief: bool,
) -> Result<Flow> {
    let wanted = if brief { None } else { name };
    let rows = match backend.system_reports(wanted, duration) {
        Ok(rows) => rows,
        Err(error) => {
            response::simple(
                &mut session.sink,
                "get_system_reports",
                backend_status(&error),
            )?;
            return Ok(Flow::Continue);
        }
    };

    if let Some(name) = wanted {
        if rows.is_empty() {
            response::with_text(
                &mut session.sink,
                "get_system_reports",
                StatusCode::Missing,
                &response::missing_text("system report", name),
            )?;
            return Ok(Flow::Continue);
        }
    }

    response::open(&mut session.sink, "get_system_reports", StatusCode::Ok)?;
    let mut writer = XmlWriter::new(&mut session.sink);
    for row in &rows {
        writer.start("system_report", &[])?;
        writer.text_element("name", &row.name)?;
        writer.text_element("title", &row.title)?;
        if let Some(report) = &row.report {
            let duration_text = duration.unwrap_or(86400).to_string();
            writer.start(
                "report",
                &[("format", "txt"), ("duration", &duration_text)],
            )?;
            writer.text(report)?;
            writer.end("report")?;
        }
        writer.end("system_report")?;
    }
    response::close(&mut session.sink, "get_system_reports")?;
    Ok(Flow::Continue)
}

pub(crate) fn send_target_locators<S: OutputSink, B: Backend>(
    session: &mut Session<S>,
    backend: &mut B,
) -> Result<Flow> {
    let names = match backend.target_locators() {
        Ok(names) => names,
        Err(error) => {
            response::simple(
                &mut session.sink,
                "get_target_locators",
                backend_status(&error),
            )?;
            return Ok(Flow::Continue);
        }
    };
    response::open(&mut session.sink, "get_target_locators", StatusCode::Ok)?;
    let mut writer = XmlWriter::new(&mut session.sink);
    for name in &names {
        writer.start("target_locator", &[])?;
        writer.text_element("name", name)?;
        writer.end("target_locator")?;
    }
    response::close(&mut session.sink, "get_target_locators")?;
    Ok(Flow::Continue)
}
