// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use thiserror::Error;

/// Failures returned by the task store and the query layer.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Caller-supplied data violates a precondition. Nothing was written.
    #[error("{0}")]
    Validation(String),

    /// The referenced task does not exist.
    #[error("Task with ID {id} not found.")]
    NotFound { id: i64 },

    /// The underlying SQLite operation failed (closed pool, I/O, constraint...).
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
