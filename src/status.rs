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

//! Status lines
//!
//! One tab-separated record per event: `[timestamp\t]temperature\ttoken`,
//! flushed immediately so log collectors see it in real time.

use std::io::{self, Write};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use pifan_error::Result;

use crate::config::TimestampMode;

/// Writes status lines to a sink (stdout in the binary)
pub struct StatusReporter<W: Write> {
    out: W,
    timestamp: TimestampMode,
    utc: bool,
}

impl StatusReporter<io::Stdout> {
    pub fn stdout(timestamp: TimestampMode, utc: bool) -> Self {
        Self::new(io::stdout(), timestamp, utc)
    }
}

impl<W: Write> StatusReporter<W> {
    pub fn new(out: W, timestamp: TimestampMode, utc: bool) -> Self {
        Self { out, timestamp, utc }
    }

    /// Emit one status line for `token` at `temperature`
    pub fn emit(&mut self, token: &str, temperature: f64) -> Result<()> {
        let now = wall_clock(Utc::now(), self.utc, &Local);
        let line = render_line(format_timestamp(self.timestamp, now).as_deref(), temperature, token);
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Wall-clock reading of `at`, in UTC or in the `local` zone
pub fn wall_clock<Tz: TimeZone>(at: DateTime<Utc>, utc: bool, local: &Tz) -> NaiveDateTime {
    if utc {
        at.naive_utc()
    } else {
        at.with_timezone(local).naive_local()
    }
}

/// Format a timestamp column, or `None` when timestamps are disabled
pub fn format_timestamp(mode: TimestampMode, at: NaiveDateTime) -> Option<String> {
    match mode {
        TimestampMode::Iso => Some(at.format("%Y-%m-%dT%H:%M:%S").to_string()),
        TimestampMode::Datetime => Some(at.format("%Y-%m-%d\t%H:%M:%S").to_string()),
        TimestampMode::None => None,
    }
}

pub fn render_line(stamp: Option<&str>, temperature: f64, token: &str) -> String {
    match stamp {
        Some(stamp) => format!("{}\t{:.1}\t{}", stamp, temperature, token),
        None => format!("{:.1}\t{}", temperature, token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 7, 23)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    #[test]
    fn test_timestamp_formats() {
        let at = fixed_time();
        assert_eq!(
            format_timestamp(TimestampMode::Iso, at).as_deref(),
            Some("2016-07-23T14:05:09")
        );
        assert_eq!(
            format_timestamp(TimestampMode::Datetime, at).as_deref(),
            Some("2016-07-23\t14:05:09")
        );
        assert_eq!(format_timestamp(TimestampMode::None, at), None);
    }

    #[test]
    fn test_render_line() {
        assert_eq!(render_line(None, 47.3, "current-temperature"), "47.3\tcurrent-temperature");
        assert_eq!(render_line(None, 50.0, "stopped"), "50.0\tstopped");
        assert_eq!(
            render_line(Some("2016-07-23T14:05:09"), 61.24, "cooling"),
            "2016-07-23T14:05:09\t61.2\tcooling"
        );
    }

    #[test]
    fn test_emit_without_timestamp() {
        let mut reporter = StatusReporter::new(Vec::new(), TimestampMode::None, false);
        reporter.emit("cooling", 62.0).unwrap();
        reporter.emit("stopped", 50.0).unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "62.0\tcooling\n50.0\tstopped\n");
    }

    #[test]
    fn test_emit_with_timestamp_has_expected_columns() {
        let mut reporter = StatusReporter::new(Vec::new(), TimestampMode::Datetime, true);
        reporter.emit("unchanged", 57.5).unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let columns: Vec<&str> = out.trim_end().split('\t').collect();
        assert_eq!(columns.len(), 4);
        assert_eq!(columns[2], "57.5");
        assert_eq!(columns[3], "unchanged");
    }

    #[test]
    fn test_wall_clock_honours_utc_flag() {
        let at = fixed_time().and_utc();
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(wall_clock(at, true, &cest), fixed_time());
        assert_eq!(
            format_timestamp(TimestampMode::Iso, wall_clock(at, false, &cest)).as_deref(),
            Some("2016-07-23T16:05:09")
        );
    }
}
