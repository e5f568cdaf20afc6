use crate::bundle::{export_filename, export_state, import_state, reset_all};
use crate::errors::{AppError, ProgressError};
use crate::ledger::{add_log, delete_log, list_logs};
use crate::models::{
    IndexQuery, LogDraft, LogEntry, LogForm, ProgressAggregate, ProgressResponse, TaskItem,
    TaskRequest, WeekProgressForm, WeekProgressRequest,
};
use crate::progress::{chart_points, load_progress, set_week_progress, timeline, WeekId};
use crate::state::AppState;
use crate::tasks::{add_task, delete_task, list_tasks, toggle_task};
use crate::ui::{render_index, Notice, PageView};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let (progress, logs, tasks) = state
        .run(|store| Ok((load_progress(store)?, list_logs(store)?, list_tasks(store)?)))
        .await?;
    let view = PageView {
        today: today(),
        progress,
        logs,
        tasks,
        notice: query.notice.as_deref().and_then(Notice::from_code),
    };
    Ok(Html(render_index(&view)))
}

pub async fn log_submit(
    State(state): State<AppState>,
    Form(form): Form<LogForm>,
) -> Result<Redirect, AppError> {
    let draft = LogDraft {
        hours: form.hours.trim().parse().unwrap_or(0.0),
        date: form.date,
        notes: form.notes,
    };
    let notice = state
        .run(move |store| match add_log(store, draft) {
            Ok(_) => Ok(Notice::LogSaved),
            Err(ProgressError::Validation(_)) => Ok(Notice::MissingFields),
            Err(err) => Err(err),
        })
        .await?;
    Ok(back(notice))
}

pub async fn log_delete_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    state.run(move |store| delete_log(store, id)).await?;
    Ok(back(Notice::LogDeleted))
}

pub async fn task_submit(
    State(state): State<AppState>,
    Form(form): Form<TaskRequest>,
) -> Result<Redirect, AppError> {
    let notice = state
        .run(move |store| match add_task(store, &form.text) {
            Ok(_) => Ok(Notice::TaskAdded),
            Err(ProgressError::Validation(_)) => Ok(Notice::MissingTask),
            Err(err) => Err(err),
        })
        .await?;
    Ok(back(notice))
}

pub async fn task_toggle_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.run(move |store| toggle_task(store, &id)).await?;
    Ok(Redirect::to("/#tasks"))
}

pub async fn task_delete_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.run(move |store| delete_task(store, &id)).await?;
    Ok(back(Notice::TaskDeleted))
}

pub async fn week_submit(
    State(state): State<AppState>,
    Path(week): Path<String>,
    Form(form): Form<WeekProgressForm>,
) -> Result<Redirect, AppError> {
    let week = WeekId::parse(&week)?;
    let Ok(percentage) = form.percentage.trim().parse::<f64>() else {
        return Ok(back(Notice::InvalidPercentage));
    };
    state
        .run(move |store| set_week_progress(store, week, percentage.round() as i64))
        .await?;
    Ok(back(Notice::WeekUpdated))
}

pub async fn reset_submit(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.run(|store| reset_all(store)).await?;
    Ok(back(Notice::Reset))
}

pub async fn get_progress(State(state): State<AppState>) -> Result<Json<ProgressResponse>, AppError> {
    let progress = state.run(|store| load_progress(store)).await?;
    Ok(Json(progress_response(progress)))
}

pub async fn put_week_progress(
    State(state): State<AppState>,
    Path(week): Path<String>,
    Json(payload): Json<WeekProgressRequest>,
) -> Result<Json<ProgressResponse>, AppError> {
    let week = WeekId::parse(&week)?;
    let progress = state
        .run(move |store| set_week_progress(store, week, payload.percentage))
        .await?;
    Ok(Json(progress_response(progress)))
}

pub async fn get_logs(State(state): State<AppState>) -> Result<Json<Vec<LogEntry>>, AppError> {
    Ok(Json(state.run(|store| list_logs(store)).await?))
}

pub async fn create_log(
    State(state): State<AppState>,
    Json(draft): Json<LogDraft>,
) -> Result<(StatusCode, Json<LogEntry>), AppError> {
    let (entry, _) = state.run(move |store| add_log(store, draft)).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProgressAggregate>, AppError> {
    let progress = state
        .run(move |store| match delete_log(store, id)? {
            Some(progress) => Ok(progress),
            None => load_progress(store),
        })
        .await?;
    Ok(Json(progress))
}

pub async fn get_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskItem>>, AppError> {
    Ok(Json(state.run(|store| list_tasks(store)).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<TaskRequest>,
) -> Result<(StatusCode, Json<TaskItem>), AppError> {
    let (item, _) = state.run(move |store| add_task(store, &payload.text)).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn flip_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskItem>, AppError> {
    let target = id.clone();
    match state.run(move |store| toggle_task(store, &target)).await? {
        Some((item, _)) => Ok(Json(item)),
        None => Err(AppError {
            status: StatusCode::NOT_FOUND,
            message: format!("no task with id '{id}'"),
        }),
    }
}

pub async fn remove_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProgressAggregate>, AppError> {
    let progress = state
        .run(move |store| match delete_task(store, &id)? {
            Some(progress) => Ok(progress),
            None => load_progress(store),
        })
        .await?;
    Ok(Json(progress))
}

pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bundle = state.run(|store| export_state(store)).await?;
    let body = serde_json::to_string_pretty(&bundle).map_err(AppError::internal)?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(today()));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Applies an uploaded backup and answers with the state rebuilt from storage.
pub async fn import(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ProgressResponse>, AppError> {
    let progress = state
        .run(move |store| {
            import_state(store, &body)?;
            load_progress(store)
        })
        .await?;
    Ok(Json(progress_response(progress)))
}

pub async fn reset(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.run(|store| reset_all(store)).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn progress_response(progress: ProgressAggregate) -> ProgressResponse {
    ProgressResponse {
        chart: chart_points(&progress),
        timeline: timeline(&progress),
        progress,
    }
}

fn back(notice: Notice) -> Redirect {
    Redirect::to(&format!("/?notice={}", notice.code()))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
