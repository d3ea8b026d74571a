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

//! pifan - cooling fan control for the Raspberry Pi
//!
//! Reads the SoC temperature and switches a GPIO-driven fan on and off
//! with two-threshold hysteresis, either once or continuously.

pub mod cli;
pub mod config;
pub mod constants;
pub mod control;
pub mod gpio;
pub mod logger;
pub mod modes;
pub mod policy;
pub mod sensor;
pub mod shutdown;
pub mod status;

pub use config::{ConfigLayer, ExitAction, Mode, RunConfiguration, SensorKind, TimestampMode};
pub use control::Controller;
pub use gpio::{GpioFan, OutputDriver};
pub use pifan_error::{PifanError, Result};
pub use policy::{evaluate, Decision, FanState, Thresholds};
pub use sensor::TemperatureSource;
pub use shutdown::StopCause;
pub use status::StatusReporter;

#[cfg(test)]
pub mod test_utils;
