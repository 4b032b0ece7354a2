//! Controller command definitions for the 2.7" (B) V1 panel
//!
//! This module defines the command bytes understood by the controller on the
//! V1 revision of the Waveshare 2.7" tri-color HAT. Commands are sent over SPI
//! with the DC pin low; their parameters follow with DC high, one byte per
//! transfer.
//!
//! ## Command Structure
//!
//! All commands follow the pattern:
//! 1. Set DC low (command mode)
//! 2. Send command byte
//! 3. Set DC high (data mode)
//! 4. Send each parameter byte in its own transfer
//!
//! The V2 revision of this HAT uses a different command set (0x24/0x26 for
//! RAM writes) and is not handled here.
//!
//! ## Example
//!
//! ```rust,no_run
//! use eink_dashboard::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
//! // Panel setting: KW-R mode, LUT from register
//! let _ = interface.send_command(command::PANEL_SETTING);
//! let _ = interface.send_data(0xAF);
//! ```

// Power and panel setup

/// Panel setting command (0x00)
///
/// Selects resolution, LUT source and color mode.
/// Requires 1 byte: 0xAF = KW-R mode, LUT from registers.
pub const PANEL_SETTING: u8 = 0x00;

/// Power setting command (0x01)
///
/// Configures the internal voltage generators.
/// Requires 5 bytes.
pub const POWER_SETTING: u8 = 0x01;

/// Power off command (0x02)
///
/// Turns off the booster and source/gate drivers. BUSY goes low until done.
pub const POWER_OFF: u8 = 0x02;

/// Power on command (0x04)
///
/// Turns on the booster. BUSY goes low until the rails are stable.
pub const POWER_ON: u8 = 0x04;

/// Booster soft-start command (0x06)
///
/// Requires 3 bytes.
pub const BOOSTER_SOFT_START: u8 = 0x06;

/// Deep sleep command (0x07)
///
/// Requires the check byte [`DEEP_SLEEP_CHECK`]. Only a hardware reset wakes
/// the controller afterwards.
pub const DEEP_SLEEP: u8 = 0x07;

/// Check byte that must follow [`DEEP_SLEEP`]
pub const DEEP_SLEEP_CHECK: u8 = 0xA5;

/// PLL control command (0x30)
///
/// Requires 1 byte: 0x3A = 100Hz frame rate.
pub const PLL_CONTROL: u8 = 0x30;

/// VCOM and data interval setting command (0x50)
///
/// Requires 1 byte. Also selects the border output while powering down.
pub const VCOM_AND_DATA_INTERVAL_SETTING: u8 = 0x50;

/// Resolution setting command (0x61)
///
/// Requires 4 bytes: [width MSB, width LSB, height MSB, height LSB]
pub const TCON_RESOLUTION: u8 = 0x61;

/// VCM DC setting command (0x82)
///
/// Requires 1 byte.
pub const VCM_DC_SETTING: u8 = 0x82;

/// Undocumented power optimization register write (0xF8)
///
/// Requires 2 bytes: [register, value]. Sent five times during init.
pub const POWER_OPTIMIZATION: u8 = 0xF8;

// Image data commands

/// Start transmission of the black plane (0x10)
///
/// Followed by `width * height / 8` data bytes. Bit=1: black ink.
pub const DATA_START_TRANSMISSION_1: u8 = 0x10;

/// Stop data transmission (0x11)
pub const DATA_STOP: u8 = 0x11;

/// Trigger a full display refresh (0x12)
///
/// BUSY goes low for the duration of the refresh (10-20 seconds).
pub const DISPLAY_REFRESH: u8 = 0x12;

/// Start transmission of the red plane (0x13)
///
/// Followed by `width * height / 8` data bytes. Bit=1: red ink.
pub const DATA_START_TRANSMISSION_2: u8 = 0x13;

/// Partial display refresh control (0x16)
///
/// Requires 1 byte. Written as 0x00 during init so every refresh is full.
pub const PARTIAL_DISPLAY_REFRESH: u8 = 0x16;

// Waveform tables

/// VCOM waveform table (0x20), 44 bytes
pub const LUT_FOR_VCOM: u8 = 0x20;

/// White-to-white waveform table (0x21), 42 bytes
pub const LUT_WHITE_TO_WHITE: u8 = 0x21;

/// Black-to-white waveform table (0x22), 42 bytes
pub const LUT_BLACK_TO_WHITE: u8 = 0x22;

/// White-to-black waveform table (0x23), 42 bytes
pub const LUT_WHITE_TO_BLACK: u8 = 0x23;

/// Black-to-black waveform table (0x24), 42 bytes
pub const LUT_BLACK_TO_BLACK: u8 = 0x24;
