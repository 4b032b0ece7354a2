//! Color types for the tri-color panel
//!
//! This module defines the [`Color`] enum for the three inks the panel can
//! show, and [`Layer`] for the two ink layers a frame is composed on.
//!
//! ## Color Representation
//!
//! Each pixel is one bit in each of two planes. On this panel a set bit
//! means ink:
//!
//! | Color | Black plane | Red plane |
//! |-------|-------------|-----------|
//! | White | 0           | 0         |
//! | Black | 1           | 0         |
//! | Red   | 0           | 1         |
//!
//! ## Example
//!
//! ```
//! use eink_dashboard::Color;
//! use embedded_graphics_core::pixelcolor::Rgb888;
//!
//! assert_eq!(Color::Red.rgb(), Rgb888::new(255, 0, 0));
//! assert_eq!(Color::Black.ink(), (true, false));
//! ```

use embedded_graphics_core::pixelcolor::{Rgb888, RgbColor};

/// Colors the panel can show
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    /// No ink
    White,
    /// Black ink
    Black,
    /// Red ink
    Red,
}

/// Quantisation palette, in the order ties are resolved
pub const PALETTE: [Color; 3] = [Color::White, Color::Black, Color::Red];

impl Color {
    /// Nominal screen color
    pub fn rgb(self) -> Rgb888 {
        match self {
            Self::White => Rgb888::WHITE,
            Self::Black => Rgb888::BLACK,
            Self::Red => Rgb888::RED,
        }
    }

    /// Ink bits as (black plane, red plane)
    pub fn ink(self) -> (bool, bool) {
        match self {
            Self::White => (false, false),
            Self::Black => (true, false),
            Self::Red => (false, true),
        }
    }

    /// Layer that carries this color, `None` for white
    pub fn layer(self) -> Option<Layer> {
        match self {
            Self::White => None,
            Self::Black => Some(Layer::Black),
            Self::Red => Some(Layer::Red),
        }
    }
}

/// One of the two ink layers a frame is drawn on
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Layer {
    /// Black ink layer
    Black,
    /// Red ink layer
    Red,
}

impl Layer {
    /// Ink color of this layer
    pub fn color(self) -> Color {
        match self {
            Self::Black => Color::Black,
            Self::Red => Color::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inks_are_exclusive() {
        for color in PALETTE {
            let (black, red) = color.ink();
            assert!(!(black && red));
        }
    }

    #[test]
    fn test_layer_round_trip() {
        assert_eq!(Color::White.layer(), None);
        assert_eq!(Layer::Red.color().layer(), Some(Layer::Red));
        assert_eq!(Layer::Black.color(), Color::Black);
    }
}
