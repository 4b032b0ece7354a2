//! Waveform lookup tables for the 2.7" (B) V1 panel
//!
//! The V1 controller has no usable waveform in OTP, so all five tables are
//! uploaded on every [`initialize`](crate::Display::initialize).
//!
//! The tables for commands 0x23 and 0x24 are deliberately cross-wired:
//! [`LUT_BB`] goes to the white-to-black register and [`LUT_WB`] to the
//! black-to-black register. That is the pairing the panel is known to
//! render correctly with.

use crate::command;

/// Length of the VCOM waveform table
pub const LUT_VCOM_SIZE: usize = 44;

/// Length of each pixel transition table
pub const LUT_SIZE: usize = 42;

/// VCOM waveform
pub const LUT_VCOM_DC: [u8; LUT_VCOM_SIZE] = [
    0x00, 0x00, 0x00, 0x1A, 0x1A, 0x00, 0x00, 0x01, 0x00, 0x0A, 0x0A, 0x00, 0x00, 0x08, 0x00,
    0x0E, 0x01, 0x0E, 0x01, 0x10, 0x00, 0x0A, 0x0A, 0x00, 0x00, 0x08, 0x00, 0x04, 0x10, 0x00,
    0x00, 0x05, 0x00, 0x03, 0x0E, 0x00, 0x00, 0x0A, 0x00, 0x23, 0x00, 0x00, 0x00, 0x01,
];

/// White-to-white transition
pub const LUT_WW: [u8; LUT_SIZE] = [
    0x90, 0x1A, 0x1A, 0x00, 0x00, 0x01, 0x40, 0x0A, 0x0A, 0x00, 0x00, 0x08, 0x84, 0x0E, 0x01,
    0x0E, 0x01, 0x10, 0x80, 0x0A, 0x0A, 0x00, 0x00, 0x08, 0x00, 0x04, 0x10, 0x00, 0x00, 0x05,
    0x00, 0x03, 0x0E, 0x00, 0x00, 0x0A, 0x00, 0x23, 0x00, 0x00, 0x00, 0x01,
];

/// Black-to-white transition
pub const LUT_BW: [u8; LUT_SIZE] = [
    0xA0, 0x1A, 0x1A, 0x00, 0x00, 0x01, 0x00, 0x0A, 0x0A, 0x00, 0x00, 0x08, 0x84, 0x0E, 0x01,
    0x0E, 0x01, 0x10, 0x90, 0x0A, 0x0A, 0x00, 0x00, 0x08, 0xB0, 0x04, 0x10, 0x00, 0x00, 0x05,
    0xB0, 0x03, 0x0E, 0x00, 0x00, 0x0A, 0xC0, 0x23, 0x00, 0x00, 0x00, 0x01,
];

/// Black-to-black transition (identical to [`LUT_WW`] on this panel)
pub const LUT_BB: [u8; LUT_SIZE] = LUT_WW;

/// White-to-black transition
pub const LUT_WB: [u8; LUT_SIZE] = [
    0x90, 0x1A, 0x1A, 0x00, 0x00, 0x01, 0x20, 0x0A, 0x0A, 0x00, 0x00, 0x08, 0x84, 0x0E, 0x01,
    0x0E, 0x01, 0x10, 0x10, 0x0A, 0x0A, 0x00, 0x00, 0x08, 0x00, 0x04, 0x10, 0x00, 0x00, 0x05,
    0x00, 0x03, 0x0E, 0x00, 0x00, 0x0A, 0x00, 0x23, 0x00, 0x00, 0x00, 0x01,
];

/// One complete waveform set, ready to upload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waveforms {
    /// Table for [`command::LUT_FOR_VCOM`]
    pub vcom: [u8; LUT_VCOM_SIZE],
    /// Table for [`command::LUT_WHITE_TO_WHITE`]
    pub white_to_white: [u8; LUT_SIZE],
    /// Table for [`command::LUT_BLACK_TO_WHITE`]
    pub black_to_white: [u8; LUT_SIZE],
    /// Table for [`command::LUT_WHITE_TO_BLACK`]
    pub white_to_black: [u8; LUT_SIZE],
    /// Table for [`command::LUT_BLACK_TO_BLACK`]
    pub black_to_black: [u8; LUT_SIZE],
}

/// Waveform set for the 2.7" (B) V1 panel
pub const V1: Waveforms = Waveforms {
    vcom: LUT_VCOM_DC,
    white_to_white: LUT_WW,
    black_to_white: LUT_BW,
    white_to_black: LUT_BB,
    black_to_black: LUT_WB,
};

impl Waveforms {
    /// Tables in upload order, paired with their register command
    pub fn upload_order(&self) -> [(u8, &[u8]); 5] {
        [
            (command::LUT_FOR_VCOM, &self.vcom),
            (command::LUT_WHITE_TO_WHITE, &self.white_to_white),
            (command::LUT_BLACK_TO_WHITE, &self.black_to_white),
            (command::LUT_WHITE_TO_BLACK, &self.white_to_black),
            (command::LUT_BLACK_TO_BLACK, &self.black_to_black),
        ]
    }
}

impl Default for Waveforms {
    fn default() -> Self {
        V1
    }
}
