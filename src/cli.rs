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

//! Command Line Interface
//!
//! Every setting is optional here so that unset flags fall through to the
//! config file; defaults are applied in [`ConfigLayer::resolve`].

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigLayer, ExitAction, Mode, SensorKind, TimestampMode};

#[derive(Parser, Debug)]
#[command(name = "pifan")]
#[command(version)]
#[command(about = "pifan - control a cooling fan attached to a Raspberry Pi GPIO pin")]
#[command(long_about = "pifan - control a cooling fan attached to a Raspberry Pi GPIO pin

Temperatures are in degrees Celsius. Pins are physical header pin numbers (1-40).
Status lines are written to stdout as tab-separated [timestamp] temperature status.

EXAMPLES:
    pifan                              Print the current temperature
    pifan -m run                       Turn the fan on
    pifan -m cron -o 65 -f 58          Apply thresholds once (for cron)
    pifan -m daemon -c 30 -x run       Monitor every 30s, leave fan on at exit

ENVIRONMENT VARIABLES:
    PIFAN_LOG=debug        Diagnostic log filter (written to stderr or the journal)
    PIFAN_CONFIG=PATH      JSON config file

FILES:
    /etc/pifan/config.json   Default config file (command-line flags win)")]
pub struct Cli {
    /// Operating mode [default: report]
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Physical header pin driving the fan [default: 8]
    #[arg(short, long)]
    pub pin: Option<u8>,

    /// Temperature above which the fan is turned on [default: 60.0]
    #[arg(short, long, alias = "onTemp", allow_negative_numbers = true)]
    pub on_temp: Option<f64>,

    /// Temperature below which the fan is turned off [default: 55.0]
    #[arg(short = 'f', long, alias = "offTemp", allow_negative_numbers = true)]
    pub off_temp: Option<f64>,

    /// Seconds between temperature checks in daemon mode [default: 60]
    #[arg(short, long, alias = "checkInterval")]
    pub check_interval: Option<u64>,

    /// Fan state left behind when daemon mode ends [default: stop]
    #[arg(short = 'x', long, value_enum, alias = "daemonExitAction")]
    pub exit_action: Option<ExitAction>,

    /// Timestamp format for status lines [default: iso]
    #[arg(short, long, value_enum, alias = "timeStamp")]
    pub timestamp: Option<TimestampMode>,

    /// Use UTC for status timestamps instead of local time
    #[arg(short, long, alias = "utcTime")]
    pub utc: bool,

    /// Temperature sensor [default: vcgencmd]
    #[arg(long, value_enum)]
    pub sensor: Option<SensorKind>,

    /// Sensor samples averaged per reading [default: 10]
    #[arg(long)]
    pub samples: Option<u32>,

    /// JSON config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Settings given on the command line, as the top config layer
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            mode: self.mode,
            pin: self.pin,
            on_temp: self.on_temp,
            off_temp: self.off_temp,
            check_interval: self.check_interval,
            exit_action: self.exit_action,
            timestamp: self.timestamp,
            // a bare flag can only switch UTC on
            utc: self.utc.then_some(true),
            sensor: self.sensor,
            samples: self.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_flags_leaves_layer_empty() {
        let cli = Cli::try_parse_from(["pifan"]).unwrap();
        assert_eq!(cli.layer(), ConfigLayer::default());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "pifan", "-m", "daemon", "-p", "12", "-o", "65", "-f", "58.5", "-c", "30", "-x", "run",
            "-t", "datetime", "-u",
        ])
        .unwrap();
        let layer = cli.layer();

        assert_eq!(layer.mode, Some(Mode::Daemon));
        assert_eq!(layer.pin, Some(12));
        assert_eq!(layer.on_temp, Some(65.0));
        assert_eq!(layer.off_temp, Some(58.5));
        assert_eq!(layer.check_interval, Some(30));
        assert_eq!(layer.exit_action, Some(ExitAction::Run));
        assert_eq!(layer.timestamp, Some(TimestampMode::Datetime));
        assert_eq!(layer.utc, Some(true));
    }

    #[test]
    fn test_legacy_spellings() {
        let cli = Cli::try_parse_from([
            "pifan",
            "--mode",
            "temp",
            "--onTemp",
            "70",
            "--offTemp",
            "65",
            "--checkInterval",
            "5",
            "--daemonExitAction",
            "stop",
            "--timeStamp",
            "none",
            "--utcTime",
        ])
        .unwrap();

        assert_eq!(cli.mode, Some(Mode::Report));
        assert_eq!(cli.on_temp, Some(70.0));
        assert_eq!(cli.off_temp, Some(65.0));
        assert_eq!(cli.check_interval, Some(5));
        assert_eq!(cli.exit_action, Some(ExitAction::Stop));
        assert_eq!(cli.timestamp, Some(TimestampMode::None));
        assert!(cli.utc);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        assert!(Cli::try_parse_from(["pifan", "--mode", "turbo"]).is_err());
        assert!(Cli::try_parse_from(["pifan", "--on-temp", "hot"]).is_err());
        assert!(Cli::try_parse_from(["pifan", "--check-interval", "-5"]).is_err());
        assert!(Cli::try_parse_from(["pifan", "--pin", "300"]).is_err());
    }

    #[test]
    fn test_sensor_selection() {
        let cli = Cli::try_parse_from(["pifan", "--sensor", "thermal-zone", "--samples", "3"]).unwrap();
        assert_eq!(cli.sensor, Some(SensorKind::ThermalZone));
        assert_eq!(cli.samples, Some(3));
    }
}
