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

//! Temperature sources
//!
//! Readers for the SoC temperature (`vcgencmd measure_temp`) and generic
//! Linux thermal zones, plus an averaging wrapper that smooths sensor jitter.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pifan_error::{PifanError, Result};
use tracing::{debug, trace};

use crate::config::SensorKind;
use crate::constants::sensor as sensor_const;

/// Something that produces a Celsius reading on demand.
///
/// Reads block; the control loop moves them off the async executor.
pub trait TemperatureSource: Send + Sync {
    fn read_celsius(&self) -> Result<f64>;
}

impl<T: TemperatureSource + ?Sized> TemperatureSource for Arc<T> {
    fn read_celsius(&self) -> Result<f64> {
        (**self).read_celsius()
    }
}

/// Reads the SoC temperature through the firmware utility
#[derive(Debug, Clone)]
pub struct VcgencmdSensor {
    command: String,
}

impl VcgencmdSensor {
    pub fn new() -> Self {
        Self {
            command: sensor_const::VCGENCMD.to_string(),
        }
    }

    /// Use a different executable (e.g. an absolute path)
    pub fn with_command(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }
}

impl Default for VcgencmdSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureSource for VcgencmdSensor {
    fn read_celsius(&self) -> Result<f64> {
        let output = Command::new(&self.command)
            .arg(sensor_const::VCGENCMD_ARG)
            .output()
            .map_err(|e| PifanError::SensorCommand {
                command: self.command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(PifanError::SensorCommand {
                command: self.command.clone(),
                reason: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or_default();
        parse_vcgencmd(line)
    }
}

/// Parse a `vcgencmd measure_temp` line such as `temp=47.3'C`
pub fn parse_vcgencmd(line: &str) -> Result<f64> {
    let value = line
        .trim()
        .strip_prefix("temp=")
        .and_then(|rest| rest.strip_suffix("'C"))
        .ok_or_else(|| PifanError::sensor_parse(line))?;

    let celsius: f64 = value.parse().map_err(|_| PifanError::sensor_parse(line))?;
    if !celsius.is_finite() {
        return Err(PifanError::sensor_parse(line));
    }
    Ok(celsius)
}

/// Reads a sysfs thermal zone reporting millidegrees Celsius
#[derive(Debug, Clone)]
pub struct ThermalZoneSensor {
    path: PathBuf,
}

impl ThermalZoneSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ThermalZoneSensor {
    fn default() -> Self {
        Self::new(sensor_const::THERMAL_ZONE_PATH)
    }
}

impl TemperatureSource for ThermalZoneSensor {
    fn read_celsius(&self) -> Result<f64> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| PifanError::SensorRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let millidegrees: f64 = content
            .trim()
            .parse()
            .map_err(|_| PifanError::sensor_parse(content.trim()))?;

        let celsius = millidegrees / 1000.0;
        if !celsius.is_finite() {
            return Err(PifanError::sensor_parse(content.trim()));
        }
        Ok(celsius)
    }
}

/// Averages several samples from an inner source, spaced over a short window.
///
/// The result is rounded to 0.1 °C. Any failing sample fails the whole reading.
#[derive(Debug, Clone)]
pub struct SmoothedSensor<S> {
    inner: S,
    samples: u32,
    spacing: Duration,
}

impl<S: TemperatureSource> SmoothedSensor<S> {
    /// Spread `samples` reads over the default sample window
    pub fn new(inner: S, samples: u32) -> Self {
        let samples = samples.max(1);
        Self {
            inner,
            samples,
            spacing: sensor_const::SAMPLE_WINDOW / samples,
        }
    }

    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }
}

impl<S: TemperatureSource> TemperatureSource for SmoothedSensor<S> {
    fn read_celsius(&self) -> Result<f64> {
        let mut sum = 0.0;
        for i in 0..self.samples {
            if i > 0 && !self.spacing.is_zero() {
                thread::sleep(self.spacing);
            }
            let sample = self.inner.read_celsius()?;
            trace!(sample, "sensor sample");
            sum += sample;
        }

        let average = round_tenths(sum / f64::from(self.samples));
        debug!(samples = self.samples, average, "averaged temperature reading");
        Ok(average)
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Build the configured temperature source
pub fn build_sensor(kind: SensorKind, samples: u32) -> Arc<dyn TemperatureSource> {
    match kind {
        SensorKind::Vcgencmd => Arc::new(SmoothedSensor::new(VcgencmdSensor::new(), samples)),
        SensorKind::ThermalZone => {
            Arc::new(SmoothedSensor::new(ThermalZoneSensor::default(), samples))
        }
    }
}

/// Read a temperature without blocking the async executor
pub async fn read_temperature_async(source: &Arc<dyn TemperatureSource>) -> Result<f64> {
    let source = Arc::clone(source);
    tokio::task::spawn_blocking(move || source.read_celsius())
        .await
        .map_err(|e| PifanError::Task(format!("temperature read task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingSensor, ScriptedSensor};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_vcgencmd() {
        assert_eq!(parse_vcgencmd("temp=47.3'C").unwrap(), 47.3);
        assert_eq!(parse_vcgencmd("temp=60.0'C\n").unwrap(), 60.0);
        assert_eq!(parse_vcgencmd("  temp=-4.5'C  ").unwrap(), -4.5);
    }

    #[test]
    fn test_parse_vcgencmd_rejects_garbage() {
        for line in ["", "temp=", "temp='C", "47.3'C", "temp=abc'C", "temp=47.3", "temp=NaN'C"] {
            let err = parse_vcgencmd(line).unwrap_err();
            assert!(matches!(err, PifanError::SensorParse { .. }), "line {:?}", line);
        }
    }

    #[test]
    fn test_vcgencmd_command_failures() {
        let missing = VcgencmdSensor::with_command("/nonexistent/pifan/vcgencmd");
        assert!(matches!(
            missing.read_celsius().unwrap_err(),
            PifanError::SensorCommand { .. }
        ));

        // `false` ignores its argument and exits 1
        let failing = VcgencmdSensor::with_command("false");
        assert!(matches!(
            failing.read_celsius().unwrap_err(),
            PifanError::SensorCommand { .. }
        ));
    }

    #[test]
    fn test_thermal_zone_reads_millidegrees() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "47312").unwrap();

        let sensor = ThermalZoneSensor::new(file.path());
        assert!((sensor.read_celsius().unwrap() - 47.312).abs() < 1e-9);
    }

    #[test]
    fn test_thermal_zone_errors() {
        let missing = ThermalZoneSensor::new("/nonexistent/pifan/thermal_zone0/temp");
        assert!(matches!(
            missing.read_celsius().unwrap_err(),
            PifanError::SensorRead { .. }
        ));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not-a-number").unwrap();
        let garbage = ThermalZoneSensor::new(file.path());
        assert!(matches!(
            garbage.read_celsius().unwrap_err(),
            PifanError::SensorParse { .. }
        ));
    }

    #[test]
    fn test_smoothing_averages_and_rounds() {
        let inner = ScriptedSensor::new(vec![47.0, 47.0, 47.0, 47.12]);
        let sensor = SmoothedSensor::new(inner.clone(), 4).with_spacing(Duration::ZERO);

        // 188.12 / 4 = 47.03
        assert_eq!(sensor.read_celsius().unwrap(), 47.0);
        assert_eq!(inner.reads(), 4);
    }

    #[test]
    fn test_smoothing_single_sample() {
        let sensor = SmoothedSensor::new(ScriptedSensor::new(vec![52.34]), 0)
            .with_spacing(Duration::ZERO);
        assert_eq!(sensor.read_celsius().unwrap(), 52.3);
    }

    #[test]
    fn test_smoothing_propagates_failure() {
        let sensor = SmoothedSensor::new(FailingSensor, 3).with_spacing(Duration::ZERO);
        assert!(sensor.read_celsius().is_err());
    }

    #[tokio::test]
    async fn test_async_read() {
        let source: Arc<dyn TemperatureSource> = Arc::new(ScriptedSensor::new(vec![47.3]));
        assert_eq!(read_temperature_async(&source).await.unwrap(), 47.3);

        let failing: Arc<dyn TemperatureSource> = Arc::new(FailingSensor);
        assert!(read_temperature_async(&failing).await.is_err());
    }
}
