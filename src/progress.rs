use crate::errors::ProgressError;
use crate::models::{ChartPoint, LogEntry, ProgressAggregate, TaskItem, TimelineRow, WEEK_COUNT};
use crate::storage::{load_or_default, write_json, Store, StoreKey};
use std::collections::BTreeSet;
use std::fmt;
use tracing::info;

/// One of the eight course weeks, `week1` through `week8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WeekId(u8);

impl WeekId {
    pub fn new(week: u8) -> Result<Self, ProgressError> {
        if (1..=WEEK_COUNT).contains(&week) {
            Ok(Self(week))
        } else {
            Err(ProgressError::validation(format!(
                "week must be between 1 and {WEEK_COUNT}"
            )))
        }
    }

    /// Accepts either `week3` or a bare `3`.
    pub fn parse(raw: &str) -> Result<Self, ProgressError> {
        let raw = raw.trim();
        let digits = raw.strip_prefix("week").unwrap_or(raw);
        let week = digits
            .parse::<u8>()
            .map_err(|_| ProgressError::validation(format!("unknown week '{raw}'")))?;
        Self::new(week)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn key(self) -> String {
        format!("week{}", self.0)
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerTotals {
    pub days_completed: u32,
    pub hours_logged: f64,
}

/// Day and hour totals for a ledger. Order of entries does not matter.
pub fn recompute_from_ledger(logs: &[LogEntry]) -> LedgerTotals {
    let days: BTreeSet<&str> = logs.iter().map(|log| log.date.as_str()).collect();
    let hours: f64 = logs.iter().map(|log| log.hours).sum();
    LedgerTotals {
        days_completed: days.len() as u32,
        hours_logged: hours.max(0.0),
    }
}

pub fn recompute_from_tasks(tasks: &[TaskItem]) -> u32 {
    tasks.iter().filter(|task| task.completed).count() as u32
}

pub fn load_progress(store: &dyn Store) -> Result<ProgressAggregate, ProgressError> {
    let mut progress: ProgressAggregate = load_or_default(store, StoreKey::Progress)?;
    for week in 1..=WEEK_COUNT {
        progress
            .week_progress
            .entry(format!("week{week}"))
            .or_insert(0);
    }
    Ok(progress)
}

pub fn save_progress(store: &mut dyn Store, progress: &ProgressAggregate) -> Result<(), ProgressError> {
    write_json(store, StoreKey::Progress, progress)
}

pub fn set_week_progress(
    store: &mut dyn Store,
    week: WeekId,
    percentage: i64,
) -> Result<ProgressAggregate, ProgressError> {
    let clamped = percentage.clamp(0, 100) as u8;
    let mut progress = load_progress(store)?;
    progress.week_progress.insert(week.key(), clamped);
    save_progress(store, &progress)?;
    info!("{week} progress set to {clamped}%");
    Ok(progress)
}

/// Refreshes the ledger-derived counters and persists the aggregate.
pub(crate) fn apply_ledger(
    store: &mut dyn Store,
    logs: &[LogEntry],
) -> Result<ProgressAggregate, ProgressError> {
    let totals = recompute_from_ledger(logs);
    let mut progress = load_progress(store)?;
    progress.days_completed = totals.days_completed;
    progress.hours_logged = totals.hours_logged;
    save_progress(store, &progress)?;
    Ok(progress)
}

pub(crate) fn apply_tasks(
    store: &mut dyn Store,
    tasks: &[TaskItem],
) -> Result<ProgressAggregate, ProgressError> {
    let mut progress = load_progress(store)?;
    progress.tasks_completed = recompute_from_tasks(tasks);
    save_progress(store, &progress)?;
    Ok(progress)
}

// The chart merges weeks 1 and 2 into one bar sourced from week1; week2 is
// stored but never drawn.
const CHART_SLOTS: [(&str, &str); 7] = [
    ("Week 1-2", "week1"),
    ("Week 3", "week3"),
    ("Week 4", "week4"),
    ("Week 5", "week5"),
    ("Week 6", "week6"),
    ("Week 7", "week7"),
    ("Week 8", "week8"),
];

pub fn chart_points(progress: &ProgressAggregate) -> Vec<ChartPoint> {
    CHART_SLOTS
        .iter()
        .map(|(label, week)| ChartPoint {
            label: (*label).to_string(),
            week: (*week).to_string(),
            percentage: week_percentage(progress, week),
        })
        .collect()
}

pub fn timeline(progress: &ProgressAggregate) -> Vec<TimelineRow> {
    (1..=WEEK_COUNT)
        .map(|week| {
            let key = format!("week{week}");
            TimelineRow {
                percentage: week_percentage(progress, &key),
                week: key,
            }
        })
        .collect()
}

fn week_percentage(progress: &ProgressAggregate, key: &str) -> u8 {
    progress.week_progress.get(key).copied().unwrap_or(0).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    fn log(id: i64, date: &str, hours: f64) -> LogEntry {
        LogEntry {
            id,
            date: date.to_string(),
            hours,
            notes: "n".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn defaults_have_all_weeks() {
        let store = MemoryStore::new();
        let progress = load_progress(&store).unwrap();
        assert_eq!(progress.days_completed, 0);
        assert_eq!(progress.hours_logged, 0.0);
        assert_eq!(progress.week_progress.len(), 8);
        assert!(progress.week_progress.values().all(|value| *value == 0));
    }

    #[test]
    fn partial_week_map_is_filled_on_load() {
        let mut store = MemoryStore::new();
        store
            .set(
                StoreKey::Progress,
                r#"{"daysCompleted":3,"hoursLogged":4.5,"tasksCompleted":1,"projectsDone":2,"weekProgress":{"week3":40}}"#,
            )
            .unwrap();
        let progress = load_progress(&store).unwrap();
        assert_eq!(progress.projects_done, 2);
        assert_eq!(progress.week_progress["week3"], 40);
        assert_eq!(progress.week_progress["week8"], 0);
        assert_eq!(progress.week_progress.len(), 8);
    }

    #[test]
    fn stored_fractional_week_keeps_counters() {
        let mut store = MemoryStore::new();
        store
            .set(
                StoreKey::Progress,
                r#"{"daysCompleted":5,"hoursLogged":9.25,"tasksCompleted":2,"projectsDone":3,"weekProgress":{"week2":45.5}}"#,
            )
            .unwrap();

        let progress = load_progress(&store).unwrap();
        assert_eq!(progress.days_completed, 5);
        assert_eq!(progress.hours_logged, 9.25);
        assert_eq!(progress.projects_done, 3);
        assert_eq!(progress.week_progress["week2"], 46);
    }

    #[test]
    fn corrupted_progress_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(StoreKey::Progress, "{oops").unwrap();
        assert_eq!(load_progress(&store).unwrap(), ProgressAggregate::default());
    }

    #[test]
    fn week_progress_is_clamped() {
        let mut store = MemoryStore::new();
        let week = WeekId::parse("week3").unwrap();

        set_week_progress(&mut store, week, 150).unwrap();
        assert_eq!(load_progress(&store).unwrap().week_progress["week3"], 100);

        set_week_progress(&mut store, week, -20).unwrap();
        assert_eq!(load_progress(&store).unwrap().week_progress["week3"], 0);
    }

    #[test]
    fn week_id_parsing() {
        assert_eq!(WeekId::parse("week5").unwrap().number(), 5);
        assert_eq!(WeekId::parse("2").unwrap().key(), "week2");
        assert!(WeekId::parse("week9").is_err());
        assert!(WeekId::parse("week0").is_err());
        assert!(WeekId::parse("weekly").is_err());
    }

    #[test]
    fn ledger_recompute_counts_distinct_dates() {
        let logs = vec![
            log(3, "2024-01-02", 2.0),
            log(2, "2024-01-01", 1.0),
            log(1, "2024-01-01", 2.5),
        ];
        let totals = recompute_from_ledger(&logs);
        assert_eq!(totals.days_completed, 2);
        assert!((totals.hours_logged - 5.5).abs() < 1e-9);

        let mut reversed = logs.clone();
        reversed.reverse();
        assert_eq!(recompute_from_ledger(&reversed), totals);
    }

    #[test]
    fn ledger_hours_never_negative() {
        let totals = recompute_from_ledger(&[log(1, "2024-01-01", -3.0)]);
        assert_eq!(totals.hours_logged, 0.0);
    }

    #[test]
    fn chart_skips_week_two() {
        let mut progress = ProgressAggregate::default();
        progress.week_progress.insert("week1".into(), 80);
        progress.week_progress.insert("week2".into(), 50);
        progress.week_progress.insert("week8".into(), 10);

        let points = chart_points(&progress);
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].label, "Week 1-2");
        assert_eq!(points[0].percentage, 80);
        assert!(points.iter().all(|point| point.week != "week2"));
        assert_eq!(points[6].percentage, 10);

        let rows = timeline(&progress);
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[1].week, "week2");
        assert_eq!(rows[1].percentage, 50);
    }
}
