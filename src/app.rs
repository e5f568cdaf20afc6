use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/logs", post(handlers::log_submit))
        .route("/logs/:id/delete", post(handlers::log_delete_submit))
        .route("/tasks", post(handlers::task_submit))
        .route("/tasks/:id/toggle", post(handlers::task_toggle_submit))
        .route("/tasks/:id/delete", post(handlers::task_delete_submit))
        .route("/weeks/:week", post(handlers::week_submit))
        .route("/reset", post(handlers::reset_submit))
        .route("/api/progress", get(handlers::get_progress))
        .route("/api/progress/weeks/:week", put(handlers::put_week_progress))
        .route("/api/logs", get(handlers::get_logs).post(handlers::create_log))
        .route("/api/logs/:id", delete(handlers::remove_log))
        .route("/api/tasks", get(handlers::get_tasks).post(handlers::create_task))
        .route("/api/tasks/:id/toggle", post(handlers::flip_task))
        .route("/api/tasks/:id", delete(handlers::remove_task))
        .route("/api/export", get(handlers::export))
        .route("/api/import", post(handlers::import))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}
