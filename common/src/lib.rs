// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[allow(clippy::doc_overindented_list_items)]
/// Represents a to-do item stored in the `tasks` table.
///
/// Derivation attributes (derive):
/// - `Serialize`, `Deserialize`: Allows conversion to/from JSON.
/// - `Debug`, `Clone`, `PartialEq`: Debug output, copies and comparisons in tests.
/// - `sqlx::FromRow`: Allows `sqlx` to create a `Task` instance directly
///    from a database result row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Task {
    // Assigned by the store at creation time, never changes afterwards.
    #[sqlx(rename = "id")]
    pub id: i64,

    #[sqlx(rename = "description")]
    pub description: String,

    // `None` means the task has no deadline.
    #[sqlx(rename = "deadline")]
    pub deadline: Option<DateTime<Utc>>,

    #[sqlx(rename = "done")]
    pub done: bool,

    #[sqlx(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A task is overdue when it is not done and its deadline is strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.done && self.deadline.is_some_and(|deadline| deadline < now)
    }
}

/// Named predicate applied when listing tasks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl Filter {
    /// Returns true if `task` belongs to this view at query time `now`.
    pub fn matches(self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.done,
            Filter::Completed => task.done,
            Filter::Overdue => task.is_overdue(now),
        }
    }
}

/// Aggregate counts over the whole table.
/// `pending + completed == total` always holds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl TaskStats {
    /// Computes the counts from a single pass over `tasks`.
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            if task.done {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }
            if task.is_overdue(now) {
                stats.overdue += 1;
            }
            stats
        })
    }
}

/// Structure used to receive task data from the API, both on creation
/// and on update. `deadline` is optional; absent or `null` clears it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskPayload {
    pub description: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}
