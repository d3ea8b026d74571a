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

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use pifan::cli::Cli;
use pifan::config::load_file_layer;
use pifan::control::Controller;
use pifan::gpio::GpioFan;
use pifan::logger;
use pifan::modes;
use pifan::sensor::build_sensor;
use pifan::status::StatusReporter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Usage errors exit here, before logging or hardware
    let cli = Cli::parse();

    let target = logger::init_logging();
    debug!(?target, "logging initialised");
    info!("STARTUP: pifan {} starting", VERSION);

    let file_layer = load_file_layer(cli.config.as_deref()).context("loading config file")?;
    let (mode, config) = file_layer
        .overlay(cli.layer())
        .resolve()
        .context("invalid configuration")?;
    debug!(?mode, ?config, "resolved configuration");

    let sensor = build_sensor(config.sensor, config.samples);
    let driver = GpioFan::new(config.pin)?;
    let reporter = StatusReporter::stdout(config.timestamp, config.utc);
    let controller = Controller::new(config, sensor, driver, reporter);

    modes::execute(mode, controller)
        .await
        .with_context(|| format!("{:?} mode failed", mode))?;
    Ok(())
}
