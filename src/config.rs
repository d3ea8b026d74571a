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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use pifan_error::{PifanError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{defaults, limits, paths};
use crate::gpio::header_pin_to_bcm;
use crate::policy::{FanState, Thresholds};

/// What a single invocation does
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Turn the fan on and exit
    Run,
    /// Turn the fan off and exit
    Stop,
    /// Print the current temperature and exit
    #[value(alias = "temp")]
    #[serde(alias = "temp")]
    Report,
    /// Apply the thresholds once and exit
    Cron,
    /// Apply the thresholds every check interval until stopped
    Daemon,
}

/// State the fan is left in when daemon mode ends
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitAction {
    Run,
    Stop,
}

impl ExitAction {
    pub fn fan_state(self) -> FanState {
        match self {
            ExitAction::Run => FanState::On,
            ExitAction::Stop => FanState::Off,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampMode {
    /// 2016-07-23T14:05:09
    Iso,
    /// Date and time as two tab-separated columns
    Datetime,
    /// No timestamp column
    None,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorKind {
    /// `vcgencmd measure_temp` (Raspberry Pi firmware)
    Vcgencmd,
    /// /sys/class/thermal/thermal_zone0/temp
    ThermalZone,
}

/// One layer of optional settings: the config file or the command line.
///
/// Unset fields fall through to the layer below, then to built-in defaults.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub mode: Option<Mode>,
    pub pin: Option<u8>,
    pub on_temp: Option<f64>,
    pub off_temp: Option<f64>,
    pub check_interval: Option<u64>,
    pub exit_action: Option<ExitAction>,
    pub timestamp: Option<TimestampMode>,
    pub utc: Option<bool>,
    pub sensor: Option<SensorKind>,
    pub samples: Option<u32>,
}

impl ConfigLayer {
    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| PifanError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Values from `top` win over values from `self`
    pub fn overlay(self, top: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            mode: top.mode.or(self.mode),
            pin: top.pin.or(self.pin),
            on_temp: top.on_temp.or(self.on_temp),
            off_temp: top.off_temp.or(self.off_temp),
            check_interval: top.check_interval.or(self.check_interval),
            exit_action: top.exit_action.or(self.exit_action),
            timestamp: top.timestamp.or(self.timestamp),
            utc: top.utc.or(self.utc),
            sensor: top.sensor.or(self.sensor),
            samples: top.samples.or(self.samples),
        }
    }

    /// Fill in defaults and validate
    pub fn resolve(self) -> Result<(Mode, RunConfiguration)> {
        let mode = self.mode.unwrap_or(Mode::Report);
        let config = RunConfiguration {
            pin: self.pin.unwrap_or(defaults::PIN),
            thresholds: Thresholds::new(
                self.on_temp.unwrap_or(defaults::ON_TEMP),
                self.off_temp.unwrap_or(defaults::OFF_TEMP),
            ),
            check_interval: Duration::from_secs(
                self.check_interval.unwrap_or(defaults::CHECK_INTERVAL_SECS),
            ),
            exit_action: self.exit_action.unwrap_or(ExitAction::Stop),
            timestamp: self.timestamp.unwrap_or(TimestampMode::Iso),
            utc: self.utc.unwrap_or(false),
            sensor: self.sensor.unwrap_or(SensorKind::Vcgencmd),
            samples: self.samples.unwrap_or(defaults::SAMPLES),
        };
        config.validate()?;
        Ok((mode, config))
    }
}

/// Settings for one invocation; never changes once built
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    /// Physical header pin
    pub pin: u8,
    pub thresholds: Thresholds,
    pub check_interval: Duration,
    pub exit_action: ExitAction,
    pub timestamp: TimestampMode,
    pub utc: bool,
    pub sensor: SensorKind,
    pub samples: u32,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            pin: defaults::PIN,
            thresholds: Thresholds::new(defaults::ON_TEMP, defaults::OFF_TEMP),
            check_interval: Duration::from_secs(defaults::CHECK_INTERVAL_SECS),
            exit_action: ExitAction::Stop,
            timestamp: TimestampMode::Iso,
            utc: false,
            sensor: SensorKind::Vcgencmd,
            samples: defaults::SAMPLES,
        }
    }
}

impl RunConfiguration {
    pub fn validate(&self) -> Result<()> {
        if !self.thresholds.on_temp.is_finite() {
            return Err(PifanError::invalid_config("on_temp", "must be a finite number"));
        }
        if !self.thresholds.off_temp.is_finite() {
            return Err(PifanError::invalid_config("off_temp", "must be a finite number"));
        }
        if self.check_interval.is_zero() {
            return Err(PifanError::invalid_config("check_interval", "must be at least 1 second"));
        }
        if !(limits::MIN_SAMPLES..=limits::MAX_SAMPLES).contains(&self.samples) {
            return Err(PifanError::invalid_config(
                "samples",
                format!("must be between {} and {}", limits::MIN_SAMPLES, limits::MAX_SAMPLES),
            ));
        }
        header_pin_to_bcm(self.pin)?;

        if self.thresholds.is_inverted() {
            warn!(
                on_temp = self.thresholds.on_temp,
                off_temp = self.thresholds.off_temp,
                "on temperature is below off temperature; overlapping readings turn the fan on"
            );
        }
        Ok(())
    }
}

/// Pick the config file: explicit path, then $PIFAN_CONFIG, then the system file if present.
///
/// Explicit and environment paths are returned even when missing, so that
/// loading them reports the error instead of silently using defaults.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(from_env) = env::var(paths::CONFIG_ENV) {
        if !from_env.is_empty() {
            return Some(PathBuf::from(from_env));
        }
    }
    let system = PathBuf::from(paths::SYSTEM_CONFIG);
    system.exists().then_some(system)
}

/// Load the file layer, or an empty layer when no config file applies
pub fn load_file_layer(explicit: Option<&Path>) -> Result<ConfigLayer> {
    match config_path(explicit) {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            ConfigLayer::load(&path)
        }
        None => Ok(ConfigLayer::default()),
    }
}
