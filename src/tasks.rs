use crate::errors::ProgressError;
use crate::models::{ProgressAggregate, TaskItem};
use crate::progress::apply_tasks;
use crate::storage::{load_or_default, write_json, Store, StoreKey};
use chrono::{DateTime, Utc};
use tracing::info;

/// Tasks in the order they were added.
pub fn list_tasks(store: &dyn Store) -> Result<Vec<TaskItem>, ProgressError> {
    load_or_default(store, StoreKey::Tasks)
}

pub fn add_task(
    store: &mut dyn Store,
    text: &str,
) -> Result<(TaskItem, ProgressAggregate), ProgressError> {
    add_task_at(store, text, Utc::now())
}

pub fn add_task_at(
    store: &mut dyn Store,
    text: &str,
    now: DateTime<Utc>,
) -> Result<(TaskItem, ProgressAggregate), ProgressError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ProgressError::validation("Task text is required"));
    }

    let mut tasks = list_tasks(store)?;
    let item = TaskItem {
        id: fresh_id(&tasks, now.timestamp_millis()),
        text: text.to_string(),
        completed: false,
    };
    tasks.push(item.clone());
    write_json(store, StoreKey::Tasks, &tasks)?;

    let progress = apply_tasks(store, &tasks)?;
    info!(id = %item.id, "task added");
    Ok((item, progress))
}

pub fn delete_task(
    store: &mut dyn Store,
    id: &str,
) -> Result<Option<ProgressAggregate>, ProgressError> {
    let mut tasks = list_tasks(store)?;
    let before = tasks.len();
    tasks.retain(|task| task.id != id);
    if tasks.len() == before {
        return Ok(None);
    }
    write_json(store, StoreKey::Tasks, &tasks)?;

    let progress = apply_tasks(store, &tasks)?;
    info!(id, "task deleted");
    Ok(Some(progress))
}

/// Flips a task's completion. Returns the updated task, or `None` if unknown.
pub fn toggle_task(
    store: &mut dyn Store,
    id: &str,
) -> Result<Option<(TaskItem, ProgressAggregate)>, ProgressError> {
    let mut tasks = list_tasks(store)?;
    let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
        return Ok(None);
    };
    task.completed = !task.completed;
    let toggled = task.clone();
    write_json(store, StoreKey::Tasks, &tasks)?;

    let progress = apply_tasks(store, &tasks)?;
    info!(id, completed = toggled.completed, "task toggled");
    Ok(Some((toggled, progress)))
}

fn fresh_id(tasks: &[TaskItem], millis: i64) -> String {
    let mut candidate = millis;
    loop {
        let id = format!("task-{candidate}");
        if tasks.iter().all(|task| task.id != id) {
            return id;
        }
        candidate += 1;
    }
}
