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

//! Fan control loop
//!
//! Sense, decide, act, sleep. The loop owns the only mutable state in the
//! program: the fan state last driven to the output. Sensor and output
//! failures are fatal and returned as-is; nothing is retried and no
//! fallback temperature is ever substituted.

use std::convert::Infallible;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use pifan_error::Result;
use tracing::{debug, info, warn};

use crate::config::RunConfiguration;
use crate::constants::tokens;
use crate::gpio::OutputDriver;
use crate::policy::FanState;
use crate::sensor::{read_temperature_async, TemperatureSource};
use crate::shutdown::StopCause;
use crate::status::StatusReporter;

/// Everything the daemon needs, passed by ownership instead of living in globals
pub struct Controller<D, W: Write> {
    pub(crate) config: RunConfiguration,
    pub(crate) sensor: Arc<dyn TemperatureSource>,
    pub(crate) driver: D,
    pub(crate) reporter: StatusReporter<W>,
    /// Last state driven to the output
    pub(crate) state: FanState,
}

impl<D: OutputDriver, W: Write> Controller<D, W> {
    pub fn new(
        config: RunConfiguration,
        sensor: Arc<dyn TemperatureSource>,
        driver: D,
        reporter: StatusReporter<W>,
    ) -> Self {
        Self {
            config,
            sensor,
            driver,
            reporter,
            state: FanState::Off,
        }
    }

    pub fn state(&self) -> FanState {
        self.state
    }

    pub async fn read_temperature(&self) -> Result<f64> {
        read_temperature_async(&self.sensor).await
    }

    /// Force the fan off regardless of its physical state, then report the start
    pub async fn start(&mut self) -> Result<()> {
        self.driver.drive(FanState::Off)?;
        self.state = FanState::Off;

        let temp = self.read_temperature().await?;
        info!(
            temp,
            on_temp = self.config.thresholds.on_temp,
            off_temp = self.config.thresholds.off_temp,
            interval_secs = self.config.check_interval.as_secs(),
            "daemon cooling mode started"
        );
        self.report(tokens::DAEMON_STARTED, temp);
        Ok(())
    }

    /// Act on one temperature sample.
    ///
    /// Only a decision that differs from the current state reaches the
    /// driver and the status line. Returns the new state when it changed.
    pub fn apply(&mut self, temp: f64) -> Result<Option<FanState>> {
        let decision = self.config.thresholds.evaluate(temp);
        let Some(target) = decision.transition_from(self.state) else {
            debug!(temp, ?decision, state = ?self.state, "no fan change");
            return Ok(None);
        };

        self.driver.drive(target)?;
        self.state = target;
        info!(temp, ?target, "fan state changed");
        self.report(target.token(), temp);
        Ok(Some(target))
    }

    /// Emit a status line; a failed write is logged and never stops the loop
    /// or the exit action.
    pub(crate) fn report(&mut self, token: &str, temp: f64) {
        if let Err(e) = self.reporter.emit(token, temp) {
            warn!(token, "Failed to write status line: {}", e);
        }
    }

    /// Read the sensor once and act on it
    pub async fn tick(&mut self) -> Result<Option<FanState>> {
        let temp = self.read_temperature().await?;
        self.apply(temp)
    }

    async fn cycle(&mut self) -> Result<Infallible> {
        self.start().await?;
        loop {
            self.tick().await?;
            tokio::time::sleep(self.config.check_interval).await;
        }
    }

    /// Run daemon mode until `stop` resolves, then hand over to the termination handler.
    ///
    /// `stop` is polled first, so it wins over a tick that completes at the
    /// same moment. A tick cut short by `stop` never reaches the driver.
    pub async fn run<F>(&mut self, stop: F) -> Result<StopCause>
    where
        F: Future<Output = StopCause>,
    {
        let outcome = tokio::select! {
            biased;
            cause = stop => Ok(cause),
            result = self.cycle() => match result {
                Ok(never) => match never {},
                Err(e) => Err(e),
            },
        };
        let cause = outcome?;

        info!(?cause, "stop requested");
        self.terminate(cause).await?;
        Ok(cause)
    }
}
