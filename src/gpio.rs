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

//! Fan output driver
//!
//! The fan hangs off a GPIO line (usually through a transistor), addressed
//! by its physical pin number on the 40-pin header.

use pifan_error::{PifanError, Result};
use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, info};

use crate::policy::{Decision, FanState};

/// Drives the fan output high (on) or low (off)
#[cfg_attr(test, mockall::automock)]
pub trait OutputDriver {
    /// Set the output to a definite state
    fn drive(&mut self, state: FanState) -> Result<()>;

    /// Release any handles held on the output subsystem
    fn release(&mut self) -> Result<()>;
}

/// Apply a policy decision; `Unchanged` never reaches the driver
pub fn apply_decision<D: OutputDriver + ?Sized>(driver: &mut D, decision: Decision) -> Result<()> {
    match decision.target() {
        Some(state) => driver.drive(state),
        None => Ok(()),
    }
}

/// Physical header pin -> BCM GPIO line, for the 40-pin header
const HEADER_TO_BCM: &[(u8, u8)] = &[
    (3, 2),
    (5, 3),
    (7, 4),
    (8, 14),
    (10, 15),
    (11, 17),
    (12, 18),
    (13, 27),
    (15, 22),
    (16, 23),
    (18, 24),
    (19, 10),
    (21, 9),
    (22, 25),
    (23, 11),
    (24, 8),
    (26, 7),
    (27, 0),
    (28, 1),
    (29, 5),
    (31, 6),
    (32, 12),
    (33, 13),
    (35, 19),
    (36, 16),
    (37, 26),
    (38, 20),
    (40, 21),
];

/// Map a physical header pin to its BCM line number
pub fn header_pin_to_bcm(pin: u8) -> Result<u8> {
    HEADER_TO_BCM
        .iter()
        .find(|(header, _)| *header == pin)
        .map(|(_, bcm)| *bcm)
        .ok_or(PifanError::InvalidPin(pin))
}

/// GPIO driver backed by rppal.
///
/// The line is claimed on the first `drive` call so that read-only modes
/// never touch the GPIO subsystem. The line is not reset when released, so
/// the last driven level stays on the pin after exit.
pub struct GpioFan {
    header_pin: u8,
    bcm: u8,
    output: Option<OutputPin>,
}

impl GpioFan {
    pub fn new(header_pin: u8) -> Result<Self> {
        let bcm = header_pin_to_bcm(header_pin)?;
        Ok(Self {
            header_pin,
            bcm,
            output: None,
        })
    }

    fn output(&mut self) -> Result<&mut OutputPin> {
        if self.output.is_none() {
            let gpio = Gpio::new().map_err(|e| PifanError::gpio(self.header_pin, e))?;
            let mut pin = gpio
                .get(self.bcm)
                .map_err(|e| PifanError::gpio(self.header_pin, e))?
                .into_output();
            pin.set_reset_on_drop(false);
            debug!(header_pin = self.header_pin, bcm = self.bcm, "claimed GPIO line");
            self.output = Some(pin);
        }
        self.output
            .as_mut()
            .ok_or_else(|| PifanError::gpio(self.header_pin, "output line unavailable"))
    }
}

impl OutputDriver for GpioFan {
    fn drive(&mut self, state: FanState) -> Result<()> {
        let pin = self.output()?;
        match state {
            FanState::On => pin.set_high(),
            FanState::Off => pin.set_low(),
        }
        debug!(header_pin = self.header_pin, ?state, "fan output driven");
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.output.take().is_some() {
            info!(header_pin = self.header_pin, "released GPIO line");
        }
        Ok(())
    }
}
