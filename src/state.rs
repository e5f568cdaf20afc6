use crate::errors::{AppError, ProgressError};
use crate::storage::Store;
use std::sync::{Arc, Mutex};
use tokio::task;

/// Shared handle to the progress store.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Box<dyn Store + Send>>>,
}

impl AppState {
    pub fn new(store: impl Store + Send + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    /// Runs `op` on the blocking pool with the store locked for its whole
    /// read-modify-write cycle, so mutations never interleave within one process.
    pub async fn run<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut dyn Store) -> Result<T, ProgressError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .map_err(|err| AppError::internal_message(format!("store lock poisoned: {err}")))?;
            op(&mut **guard).map_err(AppError::from)
        })
        .await
        .map_err(AppError::internal)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{add_log, list_logs};
    use crate::models::LogDraft;
    use crate::progress::load_progress;
    use crate::storage::MemoryStore;
    use axum::http::StatusCode;

    fn draft(notes: &str) -> LogDraft {
        LogDraft {
            date: "2024-01-01".into(),
            hours: 1.0,
            notes: notes.into(),
        }
    }

    #[tokio::test]
    async fn operations_run_against_the_shared_store() {
        let state = AppState::new(MemoryStore::new());
        let other = state.clone();

        state.run(|store| add_log(store, draft("first"))).await.unwrap();
        other.run(|store| add_log(store, draft("second"))).await.unwrap();

        let (logs, progress) = state
            .run(|store| Ok((list_logs(store)?, load_progress(store)?)))
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(progress.days_completed, 1);
        assert_eq!(progress.hours_logged, 2.0);
    }

    #[tokio::test]
    async fn concurrent_mutations_are_serialized() {
        let state = AppState::new(MemoryStore::new());
        let mut handles = Vec::new();
        for step in 0..8 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                state
                    .run(move |store| add_log(store, draft(&format!("entry {step}"))))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let progress = state.run(|store| load_progress(store)).await.unwrap();
        assert_eq!(progress.hours_logged, 8.0);
        assert_eq!(state.run(|store| list_logs(store)).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn domain_errors_become_http_errors() {
        let state = AppState::new(MemoryStore::new());
        let err = state
            .run(|store| add_log(store, draft("")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
