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

//! Constants and configuration defaults for pifan
//!
//! Centralizes defaults, status tokens and sensor parameters.

/// Built-in defaults applied when neither the command line nor the config file sets a value
pub mod defaults {
    /// Physical header pin driving the fan
    pub const PIN: u8 = 8;

    /// Temperature above which the fan is turned on (°C)
    pub const ON_TEMP: f64 = 60.0;

    /// Temperature below which the fan is turned off (°C)
    pub const OFF_TEMP: f64 = 55.0;

    /// Seconds between temperature checks in daemon mode
    pub const CHECK_INTERVAL_SECS: u64 = 60;

    /// Number of sensor samples averaged per reading
    pub const SAMPLES: u32 = 10;
}

/// Limits enforced by configuration validation
pub mod limits {
    pub const MIN_SAMPLES: u32 = 1;
    pub const MAX_SAMPLES: u32 = 100;
}

/// Tokens written in the status column of each status line
pub mod tokens {
    pub const COOLING: &str = "cooling";
    pub const STOPPED: &str = "stopped";
    pub const UNCHANGED: &str = "unchanged";
    pub const CURRENT_TEMPERATURE: &str = "current-temperature";
    pub const DAEMON_STARTED: &str = "daemon-cooling-mode: started";
    pub const DAEMON_ENDED_BY_USER: &str = "daemon-cooling-mode: ended-by-user";
    pub const DAEMON_ENDED_BY_SIGNAL: &str = "daemon-cooling-mode: ended-by-signal";
}

/// Temperature sensor parameters
pub mod sensor {
    use std::time::Duration;

    /// Firmware utility reporting the SoC temperature
    pub const VCGENCMD: &str = "vcgencmd";
    pub const VCGENCMD_ARG: &str = "measure_temp";

    /// Default Linux thermal zone (millidegrees Celsius)
    pub const THERMAL_ZONE_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

    /// Total wall-clock window the averaged samples are spread over
    pub const SAMPLE_WINDOW: Duration = Duration::from_millis(250);
}

/// File system paths and environment variables
pub mod paths {
    /// Config file used when neither --config nor PIFAN_CONFIG is given
    pub const SYSTEM_CONFIG: &str = "/etc/pifan/config.json";

    /// Environment variable overriding the config file location
    pub const CONFIG_ENV: &str = "PIFAN_CONFIG";

    /// Environment variable holding the log filter
    pub const LOG_ENV: &str = "PIFAN_LOG";

    /// Default log filter
    pub const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Present when systemd-journald is available
    pub const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";
}
