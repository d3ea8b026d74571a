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

//! Daemon termination
//!
//! SIGINT (Ctrl-C) and SIGTERM both end daemon mode through the same path;
//! the cause only changes the final status token.

use std::io::Write;

use pifan_error::{PifanError, Result};
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{info, warn};

use crate::constants::tokens;
use crate::control::Controller;
use crate::gpio::OutputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// Interactive interrupt (Ctrl-C)
    User,
    /// Termination request from the process manager
    Signal,
}

impl StopCause {
    pub fn token(self) -> &'static str {
        match self {
            StopCause::User => tokens::DAEMON_ENDED_BY_USER,
            StopCause::Signal => tokens::DAEMON_ENDED_BY_SIGNAL,
        }
    }
}

/// Listeners for the stop signals.
///
/// Install before the first tick: once installed, the signals no longer
/// kill the process and are only observed through [`StopSignals::recv`].
pub struct StopSignals {
    interrupt: Signal,
    terminate: Signal,
}

impl StopSignals {
    pub fn install() -> Result<Self> {
        let interrupt = signal(SignalKind::interrupt()).map_err(PifanError::Signal)?;
        let terminate = signal(SignalKind::terminate()).map_err(PifanError::Signal)?;
        Ok(Self { interrupt, terminate })
    }

    /// Wait for the first stop signal
    pub async fn recv(mut self) -> StopCause {
        let cause = tokio::select! {
            _ = self.interrupt.recv() => StopCause::User,
            _ = self.terminate.recv() => StopCause::Signal,
        };
        info!(?cause, "SIGNAL: stop signal received");
        cause
    }
}

impl<D: OutputDriver, W: Write> Controller<D, W> {
    /// Leave the fan in the configured exit state and report why the daemon ended.
    ///
    /// Does not trust the tracked state: the exit state is always driven,
    /// even if it matches what the loop last set.
    pub async fn terminate(&mut self, cause: StopCause) -> Result<()> {
        let exit_state = self.config.exit_action.fan_state();
        self.driver.drive(exit_state)?;
        self.state = exit_state;

        if let Err(e) = self.driver.release() {
            warn!("Failed to release output: {}", e);
        }

        let temp = self.read_temperature().await?;
        self.report(cause.token(), temp);
        info!(?cause, ?exit_state, "SHUTDOWN: daemon cooling mode ended");
        Ok(())
    }
}
