//! The GET family.
//!
//! Every GET command's payload is attributes on the opening tag; the
//! shared [`GetData`] record drives validation and pagination in the
//! dispatcher.

use omp_core::event::Attrs;

use crate::backend::ResourceKind;
use crate::command::{GetData, GetWhat};

/// What a GET verb lists, if the name is a GET verb of the shared shape.
pub(crate) fn get_what(name: &str) -> Option<GetWhat> {
    let what = match name {
        "get_agents" => GetWhat::Resource(ResourceKind::Agent),
        "get_alerts" => GetWhat::Resource(ResourceKind::Alert),
        "get_configs" => GetWhat::Resource(ResourceKind::Config),
        "get_filters" => GetWhat::Resource(ResourceKind::Filter),
        "get_lsc_credentials" => GetWhat::Resource(ResourceKind::LscCredential),
        "get_notes" => GetWhat::Resource(ResourceKind::Note),
        "get_overrides" => GetWhat::Resource(ResourceKind::Override),
        "get_port_lists" => GetWhat::Resource(ResourceKind::PortList),
        "get_reports" => GetWhat::Resource(ResourceKind::Report),
        "get_report_formats" => GetWhat::Resource(ResourceKind::ReportFormat),
        "get_schedules" => GetWhat::Resource(ResourceKind::Schedule),
        "get_slaves" => GetWhat::Resource(ResourceKind::Slave),
        "get_targets" => GetWhat::Resource(ResourceKind::Target),
        "get_tasks" => GetWhat::Resource(ResourceKind::Task),
        "get_nvts" => GetWhat::Nvts,
        "get_info" => GetWhat::Info,
        "get_settings" => GetWhat::Settings,
        _ => return None,
    };
    Some(what)
}

/// Capture the shared listing attributes.
///
/// The id attribute is named after the resource ("task_id", "agent_id",
/// …); NVTs use their OID and settings their setting id.
pub(crate) fn get_data(_name: &str, what: &GetWhat, attrs: &Attrs) -> GetData {
    let id = match what {
        GetWhat::Resource(kind) => attrs.get_owned(&format!("{}_id", kind.tag())),
        GetWhat::Nvts => attrs.get_owned("nvt_oid"),
        GetWhat::Info => attrs.get_owned("info_id").or_else(|| attrs.get_owned("name")),
        GetWhat::Settings => attrs.get_owned("setting_id"),
    };

    GetData {
        id,
        filter: attrs.get_owned("filter"),
        filt_id: attrs.get_owned("filt_id"),
        subtype: attrs.get_owned("type"),
        trash: attrs.get_bool("trash"),
        details: attrs.get_bool("details"),
        actions: attrs.get_owned("actions"),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attrs {
        Attrs::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn resource_gets_resolve() {
        assert_eq!(
            get_what("get_tasks"),
            Some(GetWhat::Resource(ResourceKind::Task))
        );
        assert_eq!(
            get_what("get_lsc_credentials"),
            Some(GetWhat::Resource(ResourceKind::LscCredential))
        );
        assert_eq!(get_what("get_info"), Some(GetWhat::Info));
        assert_eq!(get_what("get_nvt_families"), None);
        assert_eq!(get_what("create_task"), None);
    }

    #[test]
    fn id_attribute_is_kind_specific() {
        let what = get_what("get_tasks").unwrap();
        let data = get_data(
            "get_tasks",
            &what,
            &attrs(&[("task_id", "t1"), ("trash", "1"), ("details", "1")]),
        );
        assert_eq!(data.id.as_deref(), Some("t1"));
        assert!(data.trash);
        assert!(data.details);
    }

    #[test]
    fn nvts_use_their_oid() {
        let what = get_what("get_nvts").unwrap();
        let data = get_data("get_nvts", &what, &attrs(&[("nvt_oid", "1.2.3")]));
        assert_eq!(data.id.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn filter_attributes_carry_over() {
        let what = get_what("get_targets").unwrap();
        let data = get_data(
            "get_targets",
            &what,
            &attrs(&[("filter", "first=3 max=5"), ("filt_id", "f9")]),
        );
        assert_eq!(data.filter.as_deref(), Some("first=3 max=5"));
        assert_eq!(data.filt_id.as_deref(), Some("f9"));
        assert!(!data.trash);
    }
}
