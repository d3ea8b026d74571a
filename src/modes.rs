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

//! Mode dispatch
//!
//! `run`, `stop`, `report` and `cron` do one thing and return; `daemon`
//! hands the controller to the control loop until a stop signal arrives.

use std::io::Write;

use pifan_error::Result;
use tracing::info;

use crate::config::Mode;
use crate::constants::tokens;
use crate::control::Controller;
use crate::gpio::{apply_decision, OutputDriver};
use crate::policy::FanState;
use crate::shutdown::StopSignals;

/// Execute one invocation in the given mode
pub async fn execute<D: OutputDriver, W: Write>(
    mode: Mode,
    mut controller: Controller<D, W>,
) -> Result<()> {
    info!(?mode, pin = controller.config.pin, "executing");
    match mode {
        Mode::Run => controller.driver.drive(FanState::On),
        Mode::Stop => controller.driver.drive(FanState::Off),
        Mode::Report => report(&mut controller).await,
        Mode::Cron => cron(&mut controller).await,
        Mode::Daemon => {
            let signals = StopSignals::install()?;
            controller.run(signals.recv()).await.map(|_| ())
        }
    }
}

/// Print the current temperature without touching the fan
pub async fn report<D: OutputDriver, W: Write>(controller: &mut Controller<D, W>) -> Result<()> {
    let temp = controller.read_temperature().await?;
    controller.reporter.emit(tokens::CURRENT_TEMPERATURE, temp)
}

/// Apply the thresholds once.
///
/// There is no memory of earlier runs, so any ON/OFF decision is driven
/// and the decision is always reported, `unchanged` included.
pub async fn cron<D: OutputDriver, W: Write>(controller: &mut Controller<D, W>) -> Result<()> {
    let temp = controller.read_temperature().await?;
    let decision = controller.config.thresholds.evaluate(temp);
    apply_decision(&mut controller.driver, decision)?;
    if let Some(state) = decision.target() {
        controller.state = state;
    }
    controller.reporter.emit(decision.token(), temp)
}
