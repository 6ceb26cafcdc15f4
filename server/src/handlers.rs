// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::database::TaskStore;
use crate::error::TaskError;
use crate::query;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{Filter, Task, TaskPayload, TaskStats};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

/// Query string accepted by `GET /api/tasks`.
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    #[serde(default)]
    pub filter: Filter,
}

/// Handler for listing tasks, optionally filtered.
pub async fn list_tasks(
    State(store): State<TaskStore>, // State injection (task store)
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = query::list(&store, params.filter).await?;
    info!(
        "Successfully retrieved {} tasks for filter {:?}.",
        tasks.len(),
        params.filter
    );
    Ok(Json(tasks))
}

/// Handler for creating a new task.
pub async fn create_task(
    State(store): State<TaskStore>,
    Json(payload): Json<TaskPayload>, // Extracting the request body as JSON
) -> Result<(StatusCode, Json<Task>), AppError> {
    debug!("Received request to create task: {:?}", payload);

    let id = store.insert(&payload.description, payload.deadline).await?;
    let task = fetch_existing(&store, id).await?;

    // Return a 201 Created status with the new task as JSON.
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for fetching a single task by ID.
pub async fn get_task(
    State(store): State<TaskStore>,
    Path(task_id): Path<i64>, // Extract task ID from the URL path
) -> Result<Json<Task>, AppError> {
    Ok(Json(fetch_existing(&store, task_id).await?))
}

/// Handler for replacing a task's description and deadline.
pub async fn update_task(
    State(store): State<TaskStore>,
    Path(task_id): Path<i64>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, AppError> {
    debug!("Received request to update task {}: {:?}", task_id, payload);

    store
        .update(task_id, &payload.description, payload.deadline)
        .await?;

    Ok(Json(fetch_existing(&store, task_id).await?))
}

/// Handler for flipping a task between pending and done.
pub async fn toggle_task(
    State(store): State<TaskStore>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, AppError> {
    store.toggle(task_id).await?;
    Ok(Json(fetch_existing(&store, task_id).await?))
}

/// Handler for deleting a task by ID. Unknown IDs are accepted silently.
pub async fn delete_task(
    State(store): State<TaskStore>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    store.delete(task_id).await?;
    Ok(StatusCode::NO_CONTENT) // 204 No Content for successful deletion
}

/// Handler for the dashboard counters. Always answers 200.
pub async fn get_stats(State(store): State<TaskStore>) -> Json<TaskStats> {
    Json(query::stats(&store).await)
}

/// Target of the client's connectivity probe (GET or HEAD).
pub async fn health() -> StatusCode {
    StatusCode::OK
}

async fn fetch_existing(store: &TaskStore, id: i64) -> Result<Task, TaskError> {
    store.get_by_id(id).await?.ok_or(TaskError::NotFound { id })
}

// --- Custom Error Handling ---

/// Our custom error type for the application.
#[derive(Debug)]
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

/// Maps store failures onto HTTP status codes.
impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, &message),
            err @ TaskError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, &err.to_string())
            }
            TaskError::Storage(e) => {
                // Log the internal error for debugging.
                error!("Internal server error: {:?}", e);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.",
                )
            }
        }
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.code.is_server_error() {
            error!(
                "Responding with error: status_code={}, message={}",
                self.code.as_u16(),
                self.message
            );
        } else {
            warn!(
                "Rejecting request: status_code={}, message={}",
                self.code.as_u16(),
                self.message
            );
        }
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
