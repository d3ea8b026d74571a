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

//! Cooling policy
//!
//! Two-threshold on/off hysteresis. Comparisons are strict: a temperature
//! exactly on a threshold leaves the fan alone.

use crate::constants::tokens;

/// Physical state of the fan output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanState {
    On,
    Off,
}

impl FanState {
    /// Status token reported when the fan is driven into this state
    pub fn token(self) -> &'static str {
        match self {
            FanState::On => tokens::COOLING,
            FanState::Off => tokens::STOPPED,
        }
    }
}

/// Outcome of evaluating the policy against one temperature sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    On,
    Off,
    Unchanged,
}

impl Decision {
    /// The state this decision asks for, if any
    pub fn target(self) -> Option<FanState> {
        match self {
            Decision::On => Some(FanState::On),
            Decision::Off => Some(FanState::Off),
            Decision::Unchanged => None,
        }
    }

    /// The state to drive given what the output currently is.
    ///
    /// Returns `None` when the decision is `Unchanged` or already matches `current`.
    pub fn transition_from(self, current: FanState) -> Option<FanState> {
        self.target().filter(|target| *target != current)
    }

    pub fn token(self) -> &'static str {
        match self.target() {
            Some(state) => state.token(),
            None => tokens::UNCHANGED,
        }
    }
}

/// On/off temperature pair in °C
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub on_temp: f64,
    pub off_temp: f64,
}

impl Thresholds {
    pub fn new(on_temp: f64, off_temp: f64) -> Self {
        Self { on_temp, off_temp }
    }

    /// True when on_temp < off_temp; evaluation still works, ON wins overlaps
    pub fn is_inverted(&self) -> bool {
        self.on_temp < self.off_temp
    }

    pub fn evaluate(&self, current_temp: f64) -> Decision {
        evaluate(current_temp, self.on_temp, self.off_temp)
    }
}

/// Map a temperature onto a fan decision.
///
/// The ON check runs first, so with inverted thresholds a temperature that
/// satisfies both comparisons resolves to ON.
pub fn evaluate(current_temp: f64, on_temp: f64, off_temp: f64) -> Decision {
    if current_temp > on_temp {
        Decision::On
    } else if current_temp < off_temp {
        Decision::Off
    } else {
        Decision::Unchanged
    }
}
