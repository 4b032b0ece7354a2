//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};
use crate::interface::DEFAULT_BUSY_TIMEOUT_MS;
use crate::lut::{self, Waveforms};

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Number of rows (height in pixels, corresponds to gate outputs)
    pub rows: u16,
    /// Number of columns (width in pixels, corresponds to source outputs)
    pub cols: u16,
}

impl Dimensions {
    /// Native size of the 2.7" panel: 264 rows of 176 pixels
    pub const EPD_2IN7: Self = Self {
        rows: MAX_GATE_OUTPUTS,
        cols: MAX_SOURCE_OUTPUTS,
    };

    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - rows > MAX_GATE_OUTPUTS
    /// - cols > MAX_SOURCE_OUTPUTS
    /// - cols % 8 != 0 (must be byte-aligned for memory)
    pub fn new(rows: u16, cols: u16) -> Result<Self, BuilderError> {
        if rows == 0 || rows > MAX_GATE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        if cols == 0 || cols > MAX_SOURCE_OUTPUTS || cols % 8 != 0 {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        (self.rows as usize * self.cols as usize) / 8
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::EPD_2IN7
    }
}

/// Rotation of the logical canvas relative to native orientation (clockwise)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Rotation {
    /// No rotation
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    ///
    /// The HAT mounting: a landscape image turned a quarter counter-clockwise.
    #[default]
    Rotate270,
}

/// Controller setup values written during initialization
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelSetup {
    /// Panel setting byte (0x00)
    pub panel_setting: u8,
    /// PLL control byte (0x30)
    pub pll: u8,
    /// Power setting bytes (0x01)
    pub power_setting: [u8; 5],
    /// Booster soft-start bytes (0x06)
    pub booster_soft_start: [u8; 3],
    /// Power optimization register/value pairs (0xF8)
    pub power_optimization: [[u8; 2]; 5],
    /// VCM DC byte (0x82)
    pub vcm_dc: u8,
    /// VCOM and data interval while active (0x50)
    pub vcom_data_interval: u8,
    /// VCOM and data interval written before power off (0x50)
    pub vcom_data_interval_sleep: u8,
}

impl Default for PanelSetup {
    fn default() -> Self {
        Self {
            // KW-R mode, LUT from registers
            panel_setting: 0xAF,
            // 100Hz
            pll: 0x3A,
            power_setting: [0x03, 0x00, 0x2B, 0x2B, 0x09],
            booster_soft_start: [0x07, 0x07, 0x17],
            power_optimization: [
                [0x60, 0xA5],
                [0x89, 0xA5],
                [0x90, 0x00],
                [0x93, 0x2A],
                [0x73, 0x41],
            ],
            vcm_dc: 0x12,
            vcom_data_interval: 0x87,
            // Floating border while powering down
            vcom_data_interval_sleep: 0xF7,
        }
    }
}

/// Display configuration
///
/// This struct holds all configurable parameters for the controller.
/// Use `Builder` to create a Config, or [`Config::epd2in7b`] for the stock
/// panel.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions (native, unrotated)
    pub dimensions: Dimensions,
    /// Rotation of the logical canvas
    pub rotation: Rotation,
    /// Controller setup values
    pub setup: PanelSetup,
    /// Waveform tables uploaded at init
    pub waveforms: Waveforms,
    /// Ceiling for a single busy wait, in milliseconds
    pub busy_timeout_ms: u32,
    /// Interval between busy line samples, in milliseconds
    pub busy_poll_ms: u32,
}

impl Config {
    /// Stock configuration for the 2.7" (B) V1 HAT
    pub fn epd2in7b() -> Self {
        Self {
            dimensions: Dimensions::EPD_2IN7,
            rotation: Rotation::Rotate270,
            setup: PanelSetup::default(),
            waveforms: lut::V1,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            busy_poll_ms: DEFAULT_BUSY_POLL_MS,
        }
    }
}

/// Default interval between busy line samples in milliseconds
pub const DEFAULT_BUSY_POLL_MS: u32 = 100;

/// Builder for constructing display configuration
///
/// # Example
///
/// ```rust,no_run
/// use eink_dashboard::{Builder, Dimensions, Rotation};
///
/// let dims = match Dimensions::new(264, 176) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new().dimensions(dims).rotation(Rotation::Rotate270).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    /// Display dimensions (required)
    dimensions: Option<Dimensions>,
    /// Display rotation
    rotation: Rotation,
    /// Controller setup values
    setup: PanelSetup,
    /// Waveform tables
    waveforms: Waveforms,
    /// Busy wait ceiling in milliseconds
    busy_timeout_ms: u32,
    /// Busy line sample interval in milliseconds
    busy_poll_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            rotation: Rotation::Rotate270,
            setup: PanelSetup::default(),
            waveforms: lut::V1,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            busy_poll_ms: DEFAULT_BUSY_POLL_MS,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set display rotation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replace the controller setup values
    pub fn setup(mut self, setup: PanelSetup) -> Self {
        self.setup = setup;
        self
    }

    /// Replace the waveform tables
    pub fn waveforms(mut self, waveforms: Waveforms) -> Self {
        self.waveforms = waveforms;
        self
    }

    /// Set the busy wait ceiling in milliseconds
    ///
    /// Default is 30,000ms. Set to 0 to wait forever.
    pub fn busy_timeout_ms(mut self, value: u32) -> Self {
        self.busy_timeout_ms = value;
        self
    }

    /// Set the busy line sample interval in milliseconds (minimum 1)
    pub fn busy_poll_ms(mut self, value: u32) -> Self {
        self.busy_poll_ms = value.max(1);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set
    pub fn build(self) -> Result<Config, BuilderError> {
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            rotation: self.rotation,
            setup: self.setup,
            waveforms: self.waveforms,
            busy_timeout_ms: self.busy_timeout_ms,
            busy_poll_ms: self.busy_poll_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_rejects_unaligned_cols() {
        assert!(matches!(
            Dimensions::new(264, 170),
            Err(BuilderError::InvalidDimensions { rows: 264, cols: 170 })
        ));
    }

    #[test]
    fn test_dimensions_rejects_oversize() {
        assert!(Dimensions::new(265, 176).is_err());
        assert!(Dimensions::new(264, 184).is_err());
        assert!(Dimensions::new(0, 176).is_err());
    }

    #[test]
    fn test_native_buffer_size() {
        assert_eq!(Dimensions::EPD_2IN7.buffer_size(), 5808);
    }

    #[test]
    fn test_builder_requires_dimensions() {
        assert!(matches!(
            Builder::new().build(),
            Err(BuilderError::MissingDimensions)
        ));
    }

    #[test]
    fn test_stock_config_is_landscape() {
        let config = Config::epd2in7b();
        let logical = crate::rotation::logical_size(
            u32::from(config.dimensions.cols),
            u32::from(config.dimensions.rows),
            config.rotation,
        );
        assert_eq!(logical, (264, 176));
        assert_eq!(config.busy_timeout_ms, 30_000);
        assert_eq!(config.busy_poll_ms, 100);
    }

    #[test]
    fn test_builder_poll_interval_floor() {
        let config = Builder::new()
            .dimensions(Dimensions::EPD_2IN7)
            .busy_poll_ms(0)
            .build()
            .unwrap();
        assert_eq!(config.busy_poll_ms, 1);
    }
}
