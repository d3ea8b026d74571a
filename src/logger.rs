/*
 * This file is part of pifan.
 *
 * Copyright (C) 2025 pifan contributors
 *
 * pifan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pifan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pifan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Diagnostic logging
//!
//! Goes to the systemd journal when available, otherwise to stderr.
//! stdout is reserved for status lines.

use std::path::Path;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::constants::paths;

/// Where diagnostic logs ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Journald,
    Stderr,
}

/// Log filter from $PIFAN_LOG, or the default level
pub fn log_filter() -> String {
    std::env::var(paths::LOG_ENV)
        .ok()
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| paths::DEFAULT_LOG_LEVEL.to_string())
}

pub fn init_logging() -> LogTarget {
    let filter = log_filter();

    if Path::new(paths::JOURNALD_SOCKET).exists() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(EnvFilter::new(&filter))
                    .init();
                return LogTarget::Journald;
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stderr", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::new(&filter))
        .init();
    LogTarget::Stderr
}
