//! One-shot verbs whose payload is attributes only: HELP, GET_VERSION,
//! DELETE_*, the trashcan pair, task lifecycle, alert tests, signature
//! verification, and the remaining simple listings.

use omp_core::event::Attrs;

use crate::command::Command;

use super::delete_kind;

/// Build the command for a leaf verb, if `name` is one.
pub(crate) fn leaf_command(name: &str, attrs: &Attrs) -> Option<Command> {
    if let Some(kind) = delete_kind(name) {
        return Some(Command::Delete {
            kind,
            id: attrs.get_owned(&format!("{}_id", kind.tag())),
            ultimate: attrs.get_bool("ultimate"),
        });
    }

    let command = match name {
        "help" => Command::Help,
        "get_version" => Command::GetVersion,
        "empty_trashcan" => Command::EmptyTrashcan,
        "restore" => Command::Restore {
            id: attrs.get_owned("id"),
        },
        "start_task" => Command::StartTask {
            task_id: attrs.get_owned("task_id"),
        },
        "stop_task" => Command::StopTask {
            task_id: attrs.get_owned("task_id"),
        },
        "pause_task" => Command::PauseTask {
            task_id: attrs.get_owned("task_id"),
        },
        "resume_paused_task" => Command::ResumePausedTask {
            task_id: attrs.get_owned("task_id"),
        },
        "resume_stopped_task" => Command::ResumeStoppedTask {
            task_id: attrs.get_owned("task_id"),
        },
        "resume_or_start_task" => Command::ResumeOrStartTask {
            task_id: attrs.get_owned("task_id"),
        },
        "test_alert" => Command::TestAlert {
            alert_id: attrs.get_owned("alert_id"),
        },
        "verify_agent" => Command::VerifyAgent {
            agent_id: attrs.get_owned("agent_id"),
        },
        "verify_report_format" => Command::VerifyReportFormat {
            report_format_id: attrs.get_owned("report_format_id"),
        },
        "get_nvt_families" => Command::GetNvtFamilies,
        "get_nvt_feed_checksum" => Command::GetNvtFeedChecksum {
            algorithm: attrs.get_owned("algorithm"),
        },
        "get_preferences" => Command::GetPreferences {
            nvt_oid: attrs.get_owned("nvt_oid"),
            config_id: attrs.get_owned("config_id"),
            preference: attrs.get_owned("preference"),
        },
        "get_dependencies" => Command::GetDependencies,
        "get_system_reports" => Command::GetSystemReports {
            name: attrs.get_owned("name"),
            duration: attrs.get("duration").and_then(|d| d.parse().ok()),
            brief: attrs.get_bool("brief"),
        },
        "get_target_locators" => Command::GetTargetLocators,
        _ => return None,
    };
    Some(command)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ResourceKind;

    fn attrs(pairs: &[(&str, &str)]) -> Attrs {
        Attrs::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn delete_takes_kind_specific_id() {
        match leaf_command("delete_task", &attrs(&[("task_id", "t1"), ("ultimate", "1")])) {
            Some(Command::Delete {
                kind: ResourceKind::Task,
                id,
                ultimate,
            }) => {
                assert_eq!(id.as_deref(), Some("t1"));
                assert!(ultimate);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn lifecycle_verbs_take_task_id() {
        for name in [
            "start_task",
            "stop_task",
            "pause_task",
            "resume_paused_task",
            "resume_stopped_task",
            "resume_or_start_task",
        ] {
            match leaf_command(name, &attrs(&[("task_id", "t7")])) {
                Some(command) => assert_eq!(command.name(), name),
                None => panic!("{} should resolve", name),
            }
        }
    }

    #[test]
    fn duration_parses_or_is_dropped() {
        match leaf_command("get_system_reports", &attrs(&[("duration", "3600")])) {
            Some(Command::GetSystemReports { duration, .. }) => {
                assert_eq!(duration, Some(3600));
            }
            other => panic!("unexpected {:?}", other),
        }
        match leaf_command("get_system_reports", &attrs(&[("duration", "soon")])) {
            Some(Command::GetSystemReports { duration, .. }) => assert_eq!(duration, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unrelated_names_do_not_resolve() {
        assert!(leaf_command("create_task", &Attrs::default()).is_none());
        assert!(leaf_command("commands", &Attrs::default()).is_none());
    }
}
