// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::database::TaskStore;
use crate::handlers;
use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::trace::TraceLayer;

/// Creates and configures the application router.
pub fn create_router(store: TaskStore) -> Router {
    Router::new()
        // `GET /api/tasks?filter=...` lists, `POST /api/tasks` creates
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        // Single task: read, replace description/deadline, delete
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/api/tasks/{id}/toggle", patch(handlers::toggle_task))
        .route("/api/stats", get(handlers::get_stats))
        // `get` also answers HEAD, which is what the connectivity probe sends
        .route("/api/health", get(handlers::health))
        // Adds the task store to the application state
        .with_state(store)
        .layer(TraceLayer::new_for_http())
}
