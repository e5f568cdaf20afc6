use crate::errors::ProgressError;
use crate::models::{LogDraft, LogEntry, ProgressAggregate};
use crate::progress::apply_ledger;
use crate::storage::{load_or_default, write_json, Store, StoreKey};
use chrono::{DateTime, Utc};
use tracing::info;

/// Logs, newest first.
pub fn list_logs(store: &dyn Store) -> Result<Vec<LogEntry>, ProgressError> {
    load_or_default(store, StoreKey::Logs)
}

pub fn add_log(
    store: &mut dyn Store,
    draft: LogDraft,
) -> Result<(LogEntry, ProgressAggregate), ProgressError> {
    add_log_at(store, draft, Utc::now())
}

pub fn add_log_at(
    store: &mut dyn Store,
    draft: LogDraft,
    now: DateTime<Utc>,
) -> Result<(LogEntry, ProgressAggregate), ProgressError> {
    let date = draft.date.trim();
    let notes = draft.notes.trim();
    if date.is_empty() || notes.is_empty() || !draft.hours.is_finite() || draft.hours <= 0.0 {
        return Err(ProgressError::validation("Please fill in all fields"));
    }

    let mut logs = list_logs(store)?;
    let newest = logs.iter().map(|log| log.id).max().unwrap_or(i64::MIN);
    let entry = LogEntry {
        id: now.timestamp_millis().max(newest.saturating_add(1)),
        date: date.to_string(),
        hours: draft.hours,
        notes: notes.to_string(),
        timestamp: now,
    };
    logs.insert(0, entry.clone());
    write_json(store, StoreKey::Logs, &logs)?;

    let progress = apply_ledger(store, &logs)?;
    info!(id = entry.id, date = %entry.date, hours = entry.hours, "log saved");
    Ok((entry, progress))
}

/// Removes a log. Returns `None` when the id is unknown; nothing changes then.
pub fn delete_log(
    store: &mut dyn Store,
    id: i64,
) -> Result<Option<ProgressAggregate>, ProgressError> {
    let mut logs = list_logs(store)?;
    let Some(index) = logs.iter().position(|log| log.id == id) else {
        return Ok(None);
    };
    let removed = logs.remove(index);
    write_json(store, StoreKey::Logs, &logs)?;

    let progress = apply_ledger(store, &logs)?;
    info!(id = removed.id, date = %removed.date, "log deleted");
    Ok(Some(progress))
}
