//! Coordinate rotation utilities
//!
//! This module maps logical canvas coordinates onto the physical, bit-packed
//! panel memory.
//!
//! The panel stores 8 horizontal pixels per byte along its native (portrait)
//! rows. When the canvas is rotated, the byte index and bit position within
//! each byte must be calculated differently.
//!
//! ## Rotation Modes
//!
//! - **Rotate0**: Native orientation, pixels packed left-to-right
//! - **Rotate90**: 90° clockwise, width and height swapped
//! - **Rotate180**: 180° rotation, origin at bottom-right
//! - **Rotate270**: 270° clockwise (or 90° counter-clockwise). The 2.7" HAT
//!   uses this: logical `(x, y)` on the 264x176 canvas lands on physical
//!   column `y`, row `263 - x`.
//!
//! ## Example
//!
//! ```
//! use eink_dashboard::{rotation::apply_rotation, Rotation};
//!
//! // For an 8x1 display at native orientation, pixel (0,0) is at byte 0, bit 7 (MSB)
//! let (idx, bit) = apply_rotation(0, 0, 8, 1, Rotation::Rotate0);
//! assert_eq!(idx, 0);
//! assert_eq!(bit, 0x80);
//!
//! // Top-left of the landscape canvas is the bottom-left of the portrait panel
//! let (idx, bit) = apply_rotation(0, 0, 176, 264, Rotation::Rotate270);
//! assert_eq!(idx, 263 * 22);
//! assert_eq!(bit, 0x80);
//! ```

use crate::config::Rotation;

/// Apply rotation transformation to get buffer index and bit mask
///
/// Converts logical (x, y) coordinates to physical buffer location (byte_index, bit_mask)
/// based on the specified rotation.
///
/// # Arguments
///
/// * `x` - Logical X coordinate (column)
/// * `y` - Logical Y coordinate (row)
/// * `width` - Physical width in pixels (must be multiple of 8)
/// * `height` - Physical height in pixels
/// * `rotation` - Rotation mode
///
/// # Returns
///
/// Returns a tuple of (byte_index, bit_mask):
/// - `byte_index`: Index into the buffer array
/// - `bit_mask`: Bit mask within the byte (0x80, 0x40, 0x20, etc.)
///
/// Callers must keep `(x, y)` inside the logical canvas; coordinates outside
/// it do not map to a meaningful location.
pub fn apply_rotation(x: u32, y: u32, width: u32, height: u32, rotation: Rotation) -> (usize, u8) {
    match rotation {
        Rotation::Rotate0 => {
            let index = (x / 8 + (width / 8) * y) as usize;
            let bit = 0x80 >> (x % 8);
            (index, bit)
        }
        Rotation::Rotate90 => {
            let index = ((width - 1 - y) / 8 + (width / 8) * x) as usize;
            let bit = 0x01 << (y % 8);
            (index, bit)
        }
        Rotation::Rotate180 => {
            let index = (((width / 8) * height - 1) - (x / 8 + (width / 8) * y)) as usize;
            let bit = 0x01 << (x % 8);
            (index, bit)
        }
        Rotation::Rotate270 => {
            let index = (y / 8 + (height - 1 - x) * (width / 8)) as usize;
            let bit = 0x80 >> (y % 8);
            (index, bit)
        }
    }
}

/// Logical canvas size (width, height) for a physical panel size
pub fn logical_size(width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    match rotation {
        Rotation::Rotate0 | Rotation::Rotate180 => (width, height),
        Rotation::Rotate90 | Rotation::Rotate270 => (height, width),
    }
}
