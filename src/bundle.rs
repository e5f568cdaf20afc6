use crate::errors::ProgressError;
use crate::ledger::list_logs;
use crate::models::StateBundle;
use crate::progress::load_progress;
use crate::storage::{write_json, Store, StoreKey};
use crate::tasks::list_tasks;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

pub fn export_state(store: &dyn Store) -> Result<StateBundle, ProgressError> {
    export_state_at(store, Utc::now())
}

pub fn export_state_at(store: &dyn Store, now: DateTime<Utc>) -> Result<StateBundle, ProgressError> {
    Ok(StateBundle {
        progress: Some(load_progress(store)?),
        logs: Some(list_logs(store)?),
        tasks: Some(list_tasks(store)?),
        export_date: Some(now),
    })
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("bootcamp-progress-{}.json", date.format("%Y-%m-%d"))
}

/// Overwrites every section present in `text`. Sections that are absent keep
/// their stored value. A malformed document changes nothing.
pub fn import_state(store: &mut dyn Store, text: &str) -> Result<StateBundle, ProgressError> {
    let bundle: StateBundle = serde_json::from_str(text).map_err(|err| {
        warn!("rejected import: {err}");
        ProgressError::from(err)
    })?;

    if let Some(progress) = &bundle.progress {
        write_json(store, StoreKey::Progress, progress)?;
    }
    if let Some(logs) = &bundle.logs {
        write_json(store, StoreKey::Logs, logs)?;
    }
    if let Some(tasks) = &bundle.tasks {
        write_json(store, StoreKey::Tasks, tasks)?;
    }

    info!(
        progress = bundle.progress.is_some(),
        logs = bundle.logs.as_ref().map_or(0, Vec::len),
        tasks = bundle.tasks.as_ref().map_or(0, Vec::len),
        "progress imported"
    );
    Ok(bundle)
}

pub fn reset_all(store: &mut dyn Store) -> Result<(), ProgressError> {
    for key in StoreKey::ALL {
        store.remove(key)?;
    }
    info!("all progress reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::add_log_at;
    use crate::models::{LogDraft, ProgressAggregate};
    use crate::progress::{set_week_progress, WeekId};
    use crate::storage::MemoryStore;
    use crate::tasks::{add_task_at, toggle_task};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap()
    }

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        let draft = LogDraft {
            date: "2024-01-01".into(),
            hours: 2.5,
            notes: "intro".into(),
        };
        add_log_at(&mut store, draft, now()).unwrap();
        let (task, _) = add_task_at(&mut store, "Read chapter 1", now()).unwrap();
        toggle_task(&mut store, &task.id).unwrap();
        add_task_at(&mut store, "Write notes", now()).unwrap();
        set_week_progress(&mut store, WeekId::new(4).unwrap(), 65).unwrap();
        store
    }

    #[test]
    fn export_then_import_restores_state() {
        let source = seeded_store();
        let bundle = export_state_at(&source, now()).unwrap();
        assert_eq!(bundle.export_date, Some(now()));
        let document = serde_json::to_string_pretty(&bundle).unwrap();

        let mut target = MemoryStore::new();
        import_state(&mut target, &document).unwrap();

        assert_eq!(load_progress(&target).unwrap(), load_progress(&source).unwrap());
        assert_eq!(list_logs(&target).unwrap(), list_logs(&source).unwrap());
        assert_eq!(list_tasks(&target).unwrap(), list_tasks(&source).unwrap());
    }

    #[test]
    fn export_document_uses_stored_field_names() {
        let bundle = export_state_at(&seeded_store(), now()).unwrap();
        let value = serde_json::to_value(&bundle).unwrap();
        assert!(value["exportDate"].is_string());
        assert_eq!(value["progress"]["daysCompleted"], 1);
        assert_eq!(value["progress"]["tasksCompleted"], 1);
        assert_eq!(value["progress"]["weekProgress"]["week4"], 65);
        assert_eq!(value["logs"][0]["notes"], "intro");
        assert_eq!(value["tasks"][1]["text"], "Write notes");
    }

    #[test]
    fn partial_import_only_touches_present_sections() {
        let mut store = seeded_store();
        let tasks_before = list_tasks(&store).unwrap();

        import_state(
            &mut store,
            r#"{"logs":[{"id":7,"date":"2023-12-31","hours":1.5,"notes":"old","timestamp":"2023-12-31T10:00:00.000Z"}]}"#,
        )
        .unwrap();

        let logs = list_logs(&store).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, 7);
        assert_eq!(list_tasks(&store).unwrap(), tasks_before);
    }

    #[test]
    fn import_ignores_a_plain_date_export_stamp() {
        let mut store = MemoryStore::new();
        import_state(
            &mut store,
            r#"{"tasks":[{"id":"task-1","text":"Read","completed":true}],"exportDate":"2024-01-03"}"#,
        )
        .unwrap();

        let tasks = list_tasks(&store).unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].completed);
    }

    #[test]
    fn import_accepts_fractional_week_percentages() {
        let mut store = MemoryStore::new();
        import_state(
            &mut store,
            r#"{"progress":{"daysCompleted":3,"hoursLogged":7.5,"tasksCompleted":0,"projectsDone":1,"weekProgress":{"week1":45.5,"week3":100}},"logs":[]}"#,
        )
        .unwrap();

        let progress = load_progress(&store).unwrap();
        assert_eq!(progress.days_completed, 3);
        assert_eq!(progress.hours_logged, 7.5);
        assert_eq!(progress.projects_done, 1);
        assert_eq!(progress.week_progress["week1"], 46);
        assert_eq!(progress.week_progress["week3"], 100);
        assert_eq!(progress.week_progress["week8"], 0);
    }

    #[test]
    fn malformed_import_is_rejected_without_changes() {
        let mut store = seeded_store();
        let logs_before = list_logs(&store).unwrap();

        for bad in ["not json", "[1,2,3]", r#"{"logs":"nope"}"#] {
            assert!(matches!(
                import_state(&mut store, bad),
                Err(ProgressError::Parse(_))
            ));
        }
        assert_eq!(list_logs(&store).unwrap(), logs_before);
    }

    #[test]
    fn reset_returns_to_defaults() {
        let mut store = seeded_store();
        store.set(StoreKey::WeeklyProgress, "{}").unwrap();

        reset_all(&mut store).unwrap();

        for key in StoreKey::ALL {
            assert_eq!(store.get(key).unwrap(), None);
        }
        assert_eq!(load_progress(&store).unwrap(), ProgressAggregate::default());
        assert!(list_logs(&store).unwrap().is_empty());
    }

    #[test]
    fn filename_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(export_filename(date), "bootcamp-progress-2024-02-09.json");
    }
}
