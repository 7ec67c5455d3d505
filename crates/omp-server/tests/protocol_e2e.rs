//! End-to-end protocol tests: bytes in, envelope out.
//!
//! Each test drives a session over the in-memory backend exactly the
//! way a connection handler would.

use std::io::Cursor;

use omp_core::error::Error;
use omp_core::sink::{BoundedSink, BufferSink};
use omp_server::backend::ResourceKind;
use omp_server::{EngineConfig, Session};
use omp_test_utils::{MemoryBackend, StartBehavior};

fn serve(backend: &mut MemoryBackend, xml: &str) -> (Session<BufferSink>, String) {
    serve_with(backend, EngineConfig::default(), xml)
}

fn serve_with(
    backend: &mut MemoryBackend,
    config: EngineConfig,
    xml: &str,
) -> (Session<BufferSink>, String) {
    let mut session = Session::new(config, BufferSink::new());
    session
        .serve(Cursor::new(xml.as_bytes().to_vec()), backend)
        .expect("stream serves cleanly");
    let output = session.sink().as_str().into_owned();
    (session, output)
}

const LOGIN: &str =
    "<authenticate><credentials><username>alice</username><password>secret</password></credentials></authenticate>";

fn serve_authed(backend: &mut MemoryBackend, xml: &str) -> (Session<BufferSink>, String) {
    let combined = format!("{}{}", LOGIN, xml);
    let (session, output) = serve(backend, &combined);
    let auth_end = output.find("</authenticate_response>").expect("auth reply")
        + "</authenticate_response>".len();
    (session, output[auth_end..].to_owned())
}

// =============================================================================
// Version, Authentication, Help
// =============================================================================

#[test]
fn get_version_works_before_authentication() {
    let mut backend = MemoryBackend::with_alice();
    let (session, output) = serve(&mut backend, "<get_version/>");
    assert_eq!(
        output,
        r#"<get_version_response status="200" status_text="OK"><version>4.0</version></get_version_response>"#
    );
    // Still unauthenticated: the command does not advance the session.
    assert!(!session.authenticated());
    assert!(session.at_baseline());
}

#[test]
fn authenticate_success_reports_role_and_timezone() {
    let mut backend = MemoryBackend::with_alice();
    let (session, output) = serve(&mut backend, LOGIN);
    assert_eq!(
        output,
        r#"<authenticate_response status="200" status_text="OK"><role>User</role><timezone>UTC</timezone></authenticate_response>"#
    );
    assert!(session.authenticated());
    assert_eq!(session.user().unwrap().username, "alice");
}

#[test]
fn authenticate_failure_keeps_session_unauthenticated() {
    let mut backend = MemoryBackend::with_alice();
    let xml =
        "<authenticate><credentials><username>alice</username><password>wrong</password></credentials></authenticate>";
    let (session, output) = serve(&mut backend, xml);
    assert_eq!(
        output,
        r#"<authenticate_response status="400" status_text="Authentication failed"/>"#
    );
    assert!(!session.authenticated());
    assert!(session.at_baseline());
}

#[test]
fn other_commands_need_authentication_first() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve(&mut backend, "<get_tasks/>");
    assert_eq!(
        output,
        r#"<get_tasks_response status="401" status_text="Authenticate first"/>"#
    );
}

#[test]
fn help_lists_the_command_set() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve(&mut backend, "<help/>");
    assert!(output.starts_with(r#"<help_response status="200" status_text="OK">"#));
    assert!(output.contains("CREATE_TASK"));
    assert!(output.contains("GET_NVT_FEED_CHECKSUM"));
    assert!(output.contains("RESUME_OR_START_TASK"));
}

// =============================================================================
// Missing Resources and Empty Listings
// =============================================================================

#[test]
fn delete_task_on_missing_id_is_404_with_exact_text() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, r#"<delete_task task_id="nonexistent-uuid"/>"#);
    assert_eq!(
        output,
        r#"<delete_task_response status="404" status_text="Failed to find task 'nonexistent-uuid'"/>"#
    );
}

#[test]
fn get_tasks_with_no_tasks_yields_empty_envelope() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, "<get_tasks/>");
    assert_eq!(
        output,
        "<get_tasks_response status=\"200\" status_text=\"OK\">\
         <apply_overrides>0</apply_overrides>\
         <filters id=\"0\"><term></term></filters>\
         <sort><field>name<order>ascending</order></field></sort>\
         <tasks start=\"1\" max=\"-1\"/>\
         <task_count>0<filtered>0</filtered><page>0</page></task_count>\
         </get_tasks_response>"
    );
}

#[test]
fn single_resource_get_reports_dangling_id() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, r#"<get_targets target_id="gone"/>"#);
    assert_eq!(
        output,
        r#"<get_targets_response status="404" status_text="Failed to find target 'gone'"/>"#
    );
}

// =============================================================================
// Syntax Errors and the Baseline State
// =============================================================================

#[test]
fn unknown_element_inside_command_is_syntax_error_and_baseline() {
    let mut backend = MemoryBackend::with_alice();
    let (session, output) = serve_authed(&mut backend, "<create_task><bogus/></create_task>");
    assert!(output.contains(r#"<create_task_response status="400""#));
    assert!(output.contains("Bogus element: bogus"));
    assert!(session.at_baseline());
    assert_eq!(backend.mutations, 0);
}

#[test]
fn unknown_top_level_command_is_refused() {
    let mut backend = MemoryBackend::with_alice();
    let (session, output) = serve_authed(&mut backend, "<frobnicate/>");
    assert_eq!(
        output,
        r#"<omp_response status="400" status_text="Bogus command name"/>"#
    );
    assert!(session.at_baseline());
}

#[test]
fn missing_required_field_is_a_command_specific_syntax_error() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, "<create_task><name>n</name></create_task>");
    assert!(output.contains(r#"status="400""#));
    assert!(output.contains("CREATE_TASK requires a config"));
    assert_eq!(backend.mutations, 0);
}

#[test]
fn oversized_command_text_is_refused() {
    let mut backend = MemoryBackend::with_alice();
    let config = EngineConfig::new().with_max_command_text(16);
    let long = "x".repeat(64);
    let mut session = Session::new(config, BufferSink::new());
    let xml = format!(
        "{}<create_target><name>t</name><comment>{}</comment></create_target>",
        LOGIN, long
    );
    session
        .serve(Cursor::new(xml.into_bytes()), &mut backend)
        .unwrap();
    let output = session.sink().as_str().into_owned();
    assert!(output.contains("Command text is too long"));
    assert!(session.at_baseline());
    assert_eq!(backend.mutations, 0);
}

// =============================================================================
// Cross-command Isolation
// =============================================================================

#[test]
fn optional_fields_do_not_leak_into_the_next_command() {
    let mut backend = MemoryBackend::with_alice();
    let xml = "<create_target><name>first</name><hosts>10.0.0.1</hosts>\
               <comment>only on the first</comment></create_target>\
               <create_target><name>second</name><hosts>10.0.0.2</hosts></create_target>";
    let (_, output) = serve_authed(&mut backend, xml);
    assert_eq!(output.matches(r#"status="201""#).count(), 2);

    // A fresh session listing the same store: the second target must
    // not have inherited the first one's comment.
    let (_, listing) = serve_authed(&mut backend, "<get_targets/>");
    assert!(listing.contains("<name>second</name><comment></comment>"));
    assert!(listing.contains("<name>first</name><comment>only on the first</comment>"));
}

#[test]
fn repeated_command_matches_a_fresh_session() {
    let mut backend = MemoryBackend::with_alice();
    let task_id = backend.seed(ResourceKind::Task, "scan");

    // Same store, two sessions: a modify that omits the comment the
    // previous modify supplied answers identically to a fresh session.
    let first = format!(
        "<modify_task task_id=\"{id}\"><comment>c</comment></modify_task>\
         <modify_task task_id=\"{id}\"><name>renamed</name></modify_task>",
        id = task_id
    );
    let (_, repeated) = serve_authed(&mut backend, &first);
    let second_response = repeated
        .split_inclusive("/>")
        .nth(1)
        .expect("two responses");

    let fresh = format!(
        "<modify_task task_id=\"{}\"><name>renamed-again</name></modify_task>",
        task_id
    );
    let (_, fresh_response) = serve_authed(&mut backend, &fresh);
    assert_eq!(second_response, fresh_response);
}

// =============================================================================
// Pagination Retry
// =============================================================================

#[test]
fn vanished_page_triggers_exactly_one_retry_from_row_one() {
    let mut backend = MemoryBackend::with_alice();
    for name in ["a", "b", "c"] {
        backend.seed(ResourceKind::Target, name);
    }
    backend.vanish_next_page();
    let (_, output) = serve_authed(&mut backend, r#"<get_targets filter="first=2"/>"#);

    let calls: Vec<i64> = backend
        .list_calls()
        .into_iter()
        .filter(|(kind, _)| *kind == ResourceKind::Target)
        .map(|(_, first)| first)
        .collect();
    assert_eq!(calls, vec![2, 1]);
    assert!(output.contains(r#"status="200""#));
    // The retry starts at row one and returns the whole set.
    assert!(output.contains("<name>a</name>"));
}

#[test]
fn empty_after_retry_terminates_with_count_zero() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, r#"<get_targets filter="first=5"/>"#);
    let calls: Vec<i64> = backend
        .list_calls()
        .into_iter()
        .map(|(_, first)| first)
        .collect();
    // One fetch, one retry, no loop.
    assert_eq!(calls, vec![5, 1]);
    assert!(output.contains("<target_count>0<filtered>0</filtered><page>0</page></target_count>"));
}

// =============================================================================
// Observer Role
// =============================================================================

#[test]
fn observer_mutations_are_refused_before_the_backend() {
    let mut backend = MemoryBackend::new();
    backend.add_user("watcher", "pw", "Observer", "UTC");
    let task_id = backend.seed(ResourceKind::Task, "scan");
    let mutations_before = backend.mutations;

    let login = "<authenticate><credentials><username>watcher</username>\
                 <password>pw</password></credentials></authenticate>";
    let commands = [
        "<create_target><name>t</name><hosts>h</hosts></create_target>".to_owned(),
        format!("<delete_task task_id=\"{}\"/>", task_id),
        format!("<modify_task task_id=\"{}\"><name>x</name></modify_task>", task_id),
        format!("<start_task task_id=\"{}\"/>", task_id),
        "<empty_trashcan/>".to_owned(),
        "<run_wizard><name>quick_first_scan</name></run_wizard>".to_owned(),
        "<test_alert alert_id=\"a\"/>".to_owned(),
    ];
    for command in &commands {
        let xml = format!("{}{}", login, command);
        let (_, output) = serve(&mut backend, &xml);
        assert!(
            output.contains(r#"status="403" status_text="Access to resource forbidden""#),
            "observer not refused for {}: {}",
            command,
            output
        );
    }
    assert_eq!(backend.mutations, mutations_before);
}

#[test]
fn observer_reads_still_work() {
    let mut backend = MemoryBackend::new();
    backend.add_user("watcher", "pw", "Observer", "UTC");
    let login = "<authenticate><credentials><username>watcher</username>\
                 <password>pw</password></credentials></authenticate>";
    let (_, output) = serve(&mut backend, &format!("{}<get_tasks/>", login));
    assert!(output.contains(r#"<get_tasks_response status="200""#));
}

// =============================================================================
// Disabled Commands
// =============================================================================

#[test]
fn disabled_command_is_service_unavailable() {
    let mut backend = MemoryBackend::with_alice();
    let config = EngineConfig::new().with_disabled_command("start_task");
    let task_id = backend.seed(ResourceKind::Task, "scan");
    let xml = format!("{}<start_task task_id=\"{}\"/>", LOGIN, task_id);
    let (_, output) = serve_with(&mut backend, config, &xml);
    assert!(output.contains(
        r#"<start_task_response status="503" status_text="Service unavailable"/>"#
    ));
    // Only the lookup ran; the scan never started.
    assert_eq!(backend.mutations, 0);
}

// =============================================================================
// Task Lifecycle and Forking
// =============================================================================

#[test]
fn start_task_returns_202_with_a_report_id() {
    let mut backend = MemoryBackend::with_alice();
    let task_id = backend.seed(ResourceKind::Task, "scan");
    let (_, output) = serve_authed(&mut backend, &format!("<start_task task_id=\"{}\"/>", task_id));
    assert!(output.starts_with(
        r#"<start_task_response status="202" status_text="OK, request submitted">"#
    ));
    assert!(output.contains("<report_id>"));
}

#[test]
fn second_fork_in_one_process_is_fatal() {
    let mut backend = MemoryBackend::with_alice();
    backend.start_behavior = StartBehavior::Forked;
    let task_id = backend.seed(ResourceKind::Task, "scan");
    let xml = format!(
        "{}<start_task task_id=\"{id}\"/><start_task task_id=\"{id}\"/>",
        LOGIN,
        id = task_id
    );
    let mut session = Session::new(EngineConfig::default(), BufferSink::new());
    let err = session
        .serve(Cursor::new(xml.into_bytes()), &mut backend)
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyForked));
    // The first start still answered.
    assert_eq!(
        session.sink().as_str().matches("status=\"202\"").count(),
        1
    );
}

#[test]
fn start_on_active_task_is_reported() {
    let mut backend = MemoryBackend::with_alice();
    backend.start_behavior = StartBehavior::AlreadyActive;
    let task_id = backend.seed(ResourceKind::Task, "scan");
    let (_, output) = serve_authed(&mut backend, &format!("<start_task task_id=\"{}\"/>", task_id));
    assert!(output.contains(r#"status="400" status_text="Task is active already""#));
}

#[test]
fn stop_pause_resume_are_requested() {
    let mut backend = MemoryBackend::with_alice();
    let task_id = backend.seed(ResourceKind::Task, "scan");
    for verb in ["stop_task", "pause_task", "resume_paused_task"] {
        let (_, output) =
            serve_authed(&mut backend, &format!("<{} task_id=\"{}\"/>", verb, task_id));
        assert!(
            output.contains(r#"status="202""#),
            "{} should be accepted: {}",
            verb,
            output
        );
    }
}

// =============================================================================
// Creation, Trashcan, Restore
// =============================================================================

#[test]
fn create_target_returns_created_with_id() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(
        &mut backend,
        "<create_target><name>lan</name><hosts>192.168.0.0/24</hosts></create_target>",
    );
    assert!(output.starts_with(
        r#"<create_target_response status="201" status_text="OK, resource created" id=""#
    ));
}

#[test]
fn duplicate_create_is_a_syntax_error() {
    let mut backend = MemoryBackend::with_alice();
    backend.seed(ResourceKind::Target, "lan");
    let (_, output) = serve_authed(
        &mut backend,
        "<create_target><name>lan</name><hosts>10.0.0.1</hosts></create_target>",
    );
    assert!(output.contains(r#"status="400" status_text="Target exists already""#));
}

#[test]
fn delete_in_use_resource_is_busy() {
    let mut backend = MemoryBackend::with_alice();
    let target_id = backend.seed(ResourceKind::Target, "lan");
    backend.mark_in_use(&target_id);
    let (_, output) =
        serve_authed(&mut backend, &format!("<delete_target target_id=\"{}\"/>", target_id));
    assert!(output.contains(r#"status="409" status_text="Resource busy""#));
}

#[test]
fn trash_and_restore_round_trip() {
    let mut backend = MemoryBackend::with_alice();
    let target_id = backend.seed(ResourceKind::Target, "lan");
    let (_, output) =
        serve_authed(&mut backend, &format!("<delete_target target_id=\"{}\"/>", target_id));
    assert!(output.contains(r#"status="200""#));

    // Visible in the trashcan listing.
    let (_, trash) = serve_authed(&mut backend, "<get_targets trash=\"1\"/>");
    assert!(trash.contains("<name>lan</name>"));

    let (_, restored) =
        serve_authed(&mut backend, &format!("<restore id=\"{}\"/>", target_id));
    assert!(restored.contains(r#"<restore_response status="200""#));

    let (_, live) = serve_authed(&mut backend, "<get_targets/>");
    assert!(live.contains("<name>lan</name>"));
}

#[test]
fn restore_of_unknown_id_is_404() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, r#"<restore id="nothing"/>"#);
    assert!(output.contains(r#"status="404""#));
}

#[test]
fn empty_trashcan_clears_trash_listing() {
    let mut backend = MemoryBackend::with_alice();
    backend.seed_trash(ResourceKind::Target, "old");
    let (_, output) = serve_authed(&mut backend, "<empty_trashcan/>");
    assert!(output.contains(r#"<empty_trashcan_response status="200""#));
    let (_, trash) = serve_authed(&mut backend, "<get_targets trash=\"1\"/>");
    assert!(!trash.contains("<name>old</name>"));
}

// =============================================================================
// Saved Filters
// =============================================================================

#[test]
fn saved_filter_term_applies_and_is_echoed() {
    let mut backend = MemoryBackend::with_alice();
    backend.seed(ResourceKind::Target, "web-1");
    backend.seed(ResourceKind::Target, "db-1");
    backend.save_filter_term("f-9", "web");
    let (_, output) = serve_authed(&mut backend, r#"<get_targets filt_id="f-9"/>"#);
    assert!(output.contains(r#"<filters id="f-9"><term>web</term></filters>"#));
    assert!(output.contains("<name>web-1</name>"));
    assert!(!output.contains("<name>db-1</name>"));
}

#[test]
fn dangling_saved_filter_is_404() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, r#"<get_targets filt_id="gone"/>"#);
    assert!(output.contains(r#"status="404" status_text="Failed to find filter 'gone'""#));
}

// =============================================================================
// COMMANDS Wrapper and Wizard Reentrancy
// =============================================================================

#[test]
fn commands_wrapper_runs_children_in_order() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve(&mut backend, "<commands><get_version/><help/></commands>");
    assert!(output.starts_with(r#"<commands_response status="200" status_text="OK">"#));
    assert!(output.ends_with("</commands_response>"));
    let version_at = output.find("<get_version_response").unwrap();
    let help_at = output.find("<help_response").unwrap();
    assert!(version_at < help_at);
}

#[test]
fn quick_first_scan_wizard_creates_and_starts() {
    let mut backend = MemoryBackend::with_alice();
    let xml = "<run_wizard><name>quick_first_scan</name>\
               <params><param><name>hosts</name><value>10.0.0.9</value></param></params>\
               </run_wizard>";
    let (session, output) = serve_authed(&mut backend, xml);
    assert!(output.starts_with(
        r#"<run_wizard_response status="202" status_text="OK, request submitted">"#
    ));
    // Inner responses surface in order: target, task, start.
    let target_at = output.find("<create_target_response").unwrap();
    let task_at = output.find("<create_task_response").unwrap();
    let start_at = output.find("<start_task_response").unwrap();
    assert!(target_at < task_at && task_at < start_at);
    // The outer session resumed exactly where it left off.
    assert!(session.at_baseline());

    let (_, tasks) = serve_authed(&mut backend, "<get_tasks/>");
    assert!(tasks.contains("Immediate scan of IP 10.0.0.9"));
}

#[test]
fn unknown_wizard_is_404() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(
        &mut backend,
        "<run_wizard><name>paint_it_black</name></run_wizard>",
    );
    assert!(output.contains(r#"status="404" status_text="Failed to find wizard 'paint_it_black'""#));
}

// =============================================================================
// Verification and Alerts
// =============================================================================

#[test]
fn verify_report_format_reports_broken_signature() {
    let mut backend = MemoryBackend::with_alice();
    let ok_id = backend.seed(ResourceKind::ReportFormat, "latex");
    let bad_id = backend.seed(ResourceKind::ReportFormat, "tampered");
    backend.mark_invalid_signature(&bad_id);

    let (_, output) = serve_authed(
        &mut backend,
        &format!("<verify_report_format report_format_id=\"{}\"/>", ok_id),
    );
    assert!(output.contains(r#"status="200""#));

    let (_, output) = serve_authed(
        &mut backend,
        &format!("<verify_report_format report_format_id=\"{}\"/>", bad_id),
    );
    assert!(output.contains(r#"status="500""#));
    assert!(output.contains("failed verification"));
}

#[test]
fn test_alert_runs_the_alert() {
    let mut backend = MemoryBackend::with_alice();
    let alert_id = backend.seed(ResourceKind::Alert, "mail-admin");
    let (_, output) =
        serve_authed(&mut backend, &format!("<test_alert alert_id=\"{}\"/>", alert_id));
    assert!(output.contains(r#"<test_alert_response status="200""#));
}

// =============================================================================
// SecInfo Listings
// =============================================================================

#[test]
fn get_nvts_lists_seeded_rows() {
    let mut backend = MemoryBackend::with_alice();
    backend.nvt_rows.push(omp_server::backend::NvtRow {
        oid: "1.3.6.1.4.1.25623.1.0.10330".to_owned(),
        name: "Services".to_owned(),
        family: "Service detection".to_owned(),
        cvss_base: "".to_owned(),
        risk_factor: "None".to_owned(),
        summary: "Find open ports".to_owned(),
        preference_count: 2,
    });
    let (_, output) = serve_authed(&mut backend, "<get_nvts/>");
    assert!(output.contains(r#"<nvt oid="1.3.6.1.4.1.25623.1.0.10330">"#));
    assert!(output.contains("<name>Services</name>"));
    assert!(output.contains("<nvt_count>1<filtered>1</filtered><page>1</page></nvt_count>"));
}

#[test]
fn get_nvts_missing_oid_is_404() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, r#"<get_nvts nvt_oid="1.2.3"/>"#);
    assert!(output.contains(r#"status="404" status_text="Failed to find nvt '1.2.3'""#));
}

#[test]
fn info_listing_keeps_its_irregular_name() {
    let mut backend = MemoryBackend::with_alice();
    backend.info_rows.push(omp_server::backend::InfoRow {
        id: "CVE-2011-0001".to_owned(),
        name: "CVE-2011-0001".to_owned(),
        info_type: "cve".to_owned(),
        summary: "A sample entry".to_owned(),
    });
    let (_, output) = serve_authed(&mut backend, r#"<get_info type="cve"/>"#);
    // Listing and count tags drop the trailing "s".
    assert!(output.contains(r#"<info start="1" max="-1"/>"#));
    assert!(output.contains("<info_count>1<filtered>1</filtered><page>1</page></info_count>"));
}

#[test]
fn feed_checksum_for_md5() {
    let mut backend = MemoryBackend::with_alice();
    let (_, output) = serve_authed(&mut backend, r#"<get_nvt_feed_checksum algorithm="md5"/>"#);
    assert!(output.contains(r#"<checksum algorithm="md5">7c5e1a2b</checksum>"#));

    let (_, output) = serve_authed(&mut backend, r#"<get_nvt_feed_checksum algorithm="crc"/>"#);
    assert!(output.contains(r#"status="400""#));

    let (_, output) = serve_authed(&mut backend, "<get_nvt_feed_checksum/>");
    assert!(output.contains("GET_NVT_FEED_CHECKSUM requires an algorithm attribute"));
}

#[test]
fn nvt_families_listing() {
    let mut backend = MemoryBackend::with_alice();
    backend.family_rows.push(omp_server::backend::FamilyRow {
        name: "Port scanners".to_owned(),
        max_nvt_count: 9,
    });
    let (_, output) = serve_authed(&mut backend, "<get_nvt_families/>");
    assert!(output.contains(
        "<families><family><name>Port scanners</name><max_nvt_count>9</max_nvt_count></family></families>"
    ));
}

// =============================================================================
// Import Commands
// =============================================================================

#[test]
fn port_list_import_creates_from_exporter_payload() {
    let mut backend = MemoryBackend::with_alice();
    let xml = "<create_port_list><get_port_lists_response>\
               <port_list id=\"ignored\"><name>All privileged TCP</name>\
               <something_new>skipped</something_new>\
               <port_ranges><port_range><start>1</start><end>1023</end>\
               <type>tcp</type></port_range></port_ranges>\
               </port_list></get_port_lists_response></create_port_list>";
    let (session, output) = serve_authed(&mut backend, xml);
    assert!(output.contains(r#"status="201""#), "{}", output);
    assert!(session.at_baseline());

    let (_, listing) = serve_authed(&mut backend, "<get_port_lists/>");
    assert!(listing.contains("<name>All privileged TCP</name>"));
}

// =============================================================================
// Backpressure
// =============================================================================

#[test]
fn full_sink_surfaces_backpressure_not_a_protocol_error() {
    let mut backend = MemoryBackend::with_alice();
    let mut session = Session::new(EngineConfig::default(), BoundedSink::with_capacity(8));
    let err = session
        .serve(
            Cursor::new(b"<get_version/>".to_vec()),
            &mut backend,
        )
        .unwrap_err();
    assert!(err.is_backpressure());
}
