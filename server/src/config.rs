// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::net::SocketAddr;

use clap::Parser;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://database/todo.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Offline-first task tracker backend
#[derive(Parser, Debug, Clone)]
#[command(name = "todo-server", version, about, long_about = None)]
pub struct Config {
    /// SQLite database URL; the file and its directory are created if missing
    #[arg(long, env = "TODO_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Address the HTTP server listens on
    #[arg(long, env = "TODO_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind: SocketAddr,
}
