//! Runtime settings
//!
//! Read from a TOML file. Every field has a default, so an empty file (or
//! no file at all) gives the stock HAT setup. Unknown keys are rejected so
//! typos do not pass silently.
//!
//! ```toml
//! [scheduler]
//! refresh_interval_secs = 180
//! poll_interval_ms = 200
//! auto_cycle = true
//!
//! [input]
//! pins = [5, 6, 13, 19]
//! debounce_ms = 50
//! sample_interval_ms = 10
//! pull = "up"
//!
//! [hardware]
//! spi_device = "/dev/spidev0.0"
//! spi_speed_hz = 2000000
//! gpio_chip = "/dev/gpiochip0"
//! rst_pin = 17
//! dc_pin = 25
//! busy_pin = 24
//! busy_timeout_ms = 30000
//!
//! [demo]
//! output_dir = "demo-output"
//! ```

use core::fmt;
use core::time::Duration;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::input::{DEFAULT_DEBOUNCE, DEFAULT_PINS, DEFAULT_SAMPLE_INTERVAL, KEY_COUNT, Pull};
use crate::interface::DEFAULT_BUSY_TIMEOUT_MS;
use crate::scheduler::{DEFAULT_POLL_INTERVAL, DEFAULT_REFRESH_INTERVAL, SchedulerConfig};

/// Errors loading a settings file
#[derive(Debug)]
pub enum SettingsError {
    /// The file could not be read
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The file is not valid settings TOML
    Parse(toml::de::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Cannot read {}: {source}", path.display()),
            Self::Parse(e) => write!(f, "Invalid settings: {e}"),
        }
    }
}

impl core::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
        }
    }
}

/// `[scheduler]`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSettings {
    /// Seconds between automatic refreshes
    pub refresh_interval_secs: u64,
    /// Milliseconds between poll ticks
    pub poll_interval_ms: u64,
    /// Start with auto-cycle on
    pub auto_cycle: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            auto_cycle: true,
        }
    }
}

impl SchedulerSettings {
    /// Loop configuration
    pub fn config(&self) -> SchedulerConfig {
        SchedulerConfig {
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            auto_cycle: self.auto_cycle,
        }
    }
}

/// `[input]`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InputSettings {
    /// GPIO lines of KEY1..KEY4
    pub pins: [u32; KEY_COUNT],
    /// Refractory window in milliseconds
    pub debounce_ms: u64,
    /// Sampling period in milliseconds
    pub sample_interval_ms: u64,
    /// Line bias: "up", "down" or "keep"
    pub pull: Pull,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            pins: DEFAULT_PINS,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
            pull: Pull::Up,
        }
    }
}

impl InputSettings {
    /// Debounce window
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Sampling period, at least 1 ms
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }
}

/// `[hardware]`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HardwareSettings {
    /// spidev node of the panel
    pub spi_device: PathBuf,
    /// SPI clock
    pub spi_speed_hz: u32,
    /// GPIO character device
    pub gpio_chip: PathBuf,
    /// Reset line
    pub rst_pin: u32,
    /// Data/command line
    pub dc_pin: u32,
    /// Busy line
    pub busy_pin: u32,
    /// Ceiling on each busy wait
    pub busy_timeout_ms: u32,
}

impl Default for HardwareSettings {
    fn default() -> Self {
        Self {
            spi_device: PathBuf::from("/dev/spidev0.0"),
            spi_speed_hz: 2_000_000,
            gpio_chip: PathBuf::from("/dev/gpiochip0"),
            rst_pin: 17,
            dc_pin: 25,
            busy_pin: 24,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// `[demo]`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DemoSettings {
    /// Where rendered PNGs go
    pub output_dir: PathBuf,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("demo-output"),
        }
    }
}

/// Complete settings file
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Loop timing
    pub scheduler: SchedulerSettings,
    /// Buttons
    pub input: InputSettings,
    /// Panel wiring
    pub hardware: HardwareSettings,
    /// Headless rendering
    pub demo: DemoSettings,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(SettingsError::Parse)
    }

    /// Read and parse a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        debug!("Loading settings from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
