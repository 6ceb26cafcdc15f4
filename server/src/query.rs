// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Read-only views derived from the task store. Nothing here keeps state:
//! every call rescans the table.

use chrono::{DateTime, Utc};
use common::{Filter, Task, TaskStats};
use tracing::{debug, warn};

use crate::database::TaskStore;
use crate::error::Result;

/// Lists the tasks matching `filter`, most recently created first.
pub async fn list(store: &TaskStore, filter: Filter) -> Result<Vec<Task>> {
    list_at(store, filter, Utc::now()).await
}

/// Same as [`list`], with an explicit query time for the overdue check.
pub async fn list_at(store: &TaskStore, filter: Filter, now: DateTime<Utc>) -> Result<Vec<Task>> {
    let mut tasks: Vec<Task> = store
        .get_all()
        .await?
        .into_iter()
        .filter(|task| filter.matches(task, now))
        .collect();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    debug!("Filter {:?} matched {} tasks.", filter, tasks.len());
    Ok(tasks)
}

/// Counts tasks per state. Never fails: a storage error yields all-zero counts.
pub async fn stats(store: &TaskStore) -> TaskStats {
    stats_at(store, Utc::now()).await
}

/// Same as [`stats`], with an explicit query time for the overdue count.
pub async fn stats_at(store: &TaskStore, now: DateTime<Utc>) -> TaskStats {
    match store.get_all().await {
        Ok(tasks) => TaskStats::from_tasks(&tasks, now),
        Err(e) => {
            warn!("Failed to compute task stats, reporting zeros: {:?}", e);
            TaskStats::default()
        }
    }
}
