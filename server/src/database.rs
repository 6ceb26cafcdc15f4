// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::str::FromStr;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use common::Task;
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase, sqlite::SqliteConnectOptions};
use tracing::{debug, info};

use crate::error::{Result, TaskError};

/// Value stored in `PRAGMA user_version` once the schema is in place.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY,
        description TEXT NOT NULL,
        deadline TIMESTAMP NULL,
        done BOOLEAN NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_tasks_done ON tasks (done);
    CREATE INDEX IF NOT EXISTS idx_tasks_deadline ON tasks (deadline);
    CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks (created_at);
    PRAGMA user_version = 1;
"#;

/// Handle on the task table.
///
/// Opened once by the composition root and cloned into whoever needs it;
/// clones share the same connection pool, so closing one closes them all.
/// Every mutating method is a single statement, so it either lands completely
/// or not at all.
#[derive(Clone, Debug)]
pub struct TaskStore {
    pool: SqlitePool,
    id_generator: fn(DateTime<Utc>) -> i64,
}

impl TaskStore {
    /// Opens (and creates if needed) the database behind `database_url`,
    /// then makes sure the `tasks` table has the expected schema.
    pub async fn open(database_url: &str) -> anyhow::Result<Self> {
        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating database {}", database_url);
            let options = SqliteConnectOptions::from_str(database_url)
                .with_context(|| format!("Invalid database URL: {}", database_url))?;
            if let Some(dir) = options
                .get_filename()
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
            {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("Failed to create directory {}", dir.display()))?;
            }
            Sqlite::create_database(database_url)
                .await
                .context("Failed to create database")?;
        } else {
            info!("Database already exists.");
        }

        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .context("Failed to read schema version")?;
        if version > SCHEMA_VERSION {
            pool.close().await;
            bail!(
                "Database schema version {} is newer than supported version {}",
                version,
                SCHEMA_VERSION
            );
        }

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .context("Failed to create 'tasks' table")?;

        info!("'tasks' table is ready (schema version {}).", SCHEMA_VERSION);

        Ok(Self {
            pool,
            id_generator: generate_id,
        })
    }

    /// Closes every connection. Later calls on this handle (or its clones)
    /// fail with [`TaskError::Storage`].
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Task store closed.");
    }

    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    #[cfg(test)]
    fn with_id_generator(mut self, id_generator: fn(DateTime<Utc>) -> i64) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// Inserts a new, not-yet-done task and returns its generated ID.
    pub async fn insert(&self, description: &str, deadline: Option<DateTime<Utc>>) -> Result<i64> {
        let description = validate_description(description)?;
        let created_at = now_millis();

        let id = (self.id_generator)(created_at);

        debug!(
            "Insert values: id={}, description={}, deadline={:?}, created_at={}",
            id, description, deadline, created_at
        );

        // A clashing ID fails on the primary key and surfaces as a storage error.
        sqlx::query(
            "INSERT INTO tasks (id, description, deadline, done, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(description)
        .bind(deadline)
        .bind(false)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        info!("Task created with ID: {}", id);
        Ok(id)
    }

    /// Returns every task, in no particular order.
    pub async fn get_all(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, description, deadline, done, created_at FROM tasks",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Point lookup. A missing ID is `Ok(None)`, not an error.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, description, deadline, done, created_at FROM tasks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Replaces the description and deadline of an existing task.
    /// `id`, `done` and `created_at` are left untouched.
    pub async fn update(
        &self,
        id: i64,
        description: &str,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let description = validate_description(description)?;
        debug!(
            "Updating task {}: description={}, deadline={:?}",
            id, description, deadline
        );

        let result = sqlx::query("UPDATE tasks SET description = ?, deadline = ? WHERE id = ?")
            .bind(description)
            .bind(deadline)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound { id });
        }

        info!("Task with ID {} updated.", id);
        Ok(())
    }

    /// Flips the `done` flag and returns its new value.
    pub async fn toggle(&self, id: i64) -> Result<bool> {
        debug!("Toggling task with ID: {}", id);

        let done: Option<bool> =
            sqlx::query_scalar("UPDATE tasks SET done = NOT done WHERE id = ? RETURNING done")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let done = done.ok_or(TaskError::NotFound { id })?;
        info!("Task with ID {} is now {}.", id, if done { "done" } else { "pending" });
        Ok(done)
    }

    /// Removes a task. Deleting an unknown ID is a no-op.
    pub async fn delete(&self, id: i64) -> Result<()> {
        debug!("Attempting to delete task with ID: {}", id);

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Deleted {} rows for task ID: {}", result.rows_affected(), id);
        Ok(())
    }
}

fn validate_description(description: &str) -> Result<&str> {
    let description = description.trim();
    if description.is_empty() {
        return Err(TaskError::Validation(
            "Description cannot be empty.".to_string(),
        ));
    }
    Ok(description)
}

/// Current time truncated to whole milliseconds.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Creation timestamp in milliseconds plus a random offset below 1000.
/// Not collision-free: two inserts close in time can draw the same ID.
fn generate_id(created_at: DateTime<Utc>) -> i64 {
    created_at.timestamp_millis() + rand::random_range(0..1000)
}
