//! Tri-color test pattern
//!
//! Exercises every path to the panel: solid blocks in each ink, dithered
//! ramps from the error-diffusion engine, a thresholded ramp, thin and
//! thick lines in both inks and text at several sizes.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use super::{Panel, fonts};
use crate::color::Layer;
use crate::compositor::Compositor;
use crate::dither::{ColorImage, dither};

const BLOCK_HEIGHT: u32 = 30;
const RAMP_HEIGHT: u32 = 9;
const THRESHOLD_RAMP_HEIGHT: u32 = 6;
const INSET: i32 = 4;
const LINE_COUNT: i32 = 10;
const LINE_PITCH: i32 = 12;
const LINE_LENGTH: i32 = 14;
const RED_COLUMN_X: i32 = 130;

/// Horizontal ramps rendered through the dithering engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ramp {
    /// Black on the left to white on the right
    BlackToWhite,
    /// Red to white
    RedToWhite,
    /// Black to red
    BlackToRed,
}

impl Ramp {
    /// Source color at `x` of a ramp `width` pixels wide
    pub fn color_at(self, x: u32, width: u32) -> Rgb888 {
        let span = width.saturating_sub(1).max(1);
        let v = (x.min(span) * 255 / span) as u8;
        match self {
            Self::BlackToWhite => Rgb888::new(v, v, v),
            Self::RedToWhite => Rgb888::new(255, v, v),
            Self::BlackToRed => Rgb888::new(v, 0, 0),
        }
    }

    /// Ramp image of the given size
    pub fn image(self, width: u32, height: u32) -> ColorImage {
        ColorImage::from_fn(width, height, |x, _| self.color_at(x, width))
    }
}

/// Full-bleed pattern for checking the hardware and the dither
#[derive(Debug, Default, Clone, Copy)]
pub struct TestPatternPanel;

impl TestPatternPanel {
    fn blocks(frame: &mut Compositor, width: u32) {
        let third = width / 3;
        frame.fill(Rectangle::new(Point::zero(), Size::new(third, BLOCK_HEIGHT)), Layer::Black);
        frame.fill(
            Rectangle::new(
                Point::new((third * 2) as i32, 0),
                Size::new(width - third * 2, BLOCK_HEIGHT),
            ),
            Layer::Red,
        );

        // Each label in an ink that shows on its block
        let label_y = 10;
        let center = |frame: &Compositor, text: &str, slot: u32| -> i32 {
            (slot * third) as i32 + (third as i32 - frame.text_width(text, &fonts::SMALL) as i32) / 2
        };
        let x = center(&*frame, "BLACK", 0);
        frame.text(Point::new(x, label_y), "BLACK", &fonts::SMALL, Layer::Red);
        let x = center(&*frame, "WHITE", 1);
        frame.text(Point::new(x, label_y), "WHITE", &fonts::SMALL, Layer::Black);
        let x = center(&*frame, "RED", 2);
        frame.text(Point::new(x, label_y), "RED", &fonts::SMALL, Layer::Black);
    }

    fn line_set(frame: &mut Compositor, y: i32, width: u32) {
        for (x0, layer) in [(INSET, Layer::Black), (RED_COLUMN_X, Layer::Red)] {
            for i in 0..LINE_COUNT {
                let x = x0 + i * LINE_PITCH;
                frame.line(Point::new(x, y), Point::new(x, y + LINE_LENGTH), layer, width);
            }
        }
    }
}

impl Panel for TestPatternPanel {
    fn title(&self) -> &str {
        "TEST PATTERN"
    }

    fn fullbleed(&self) -> bool {
        true
    }

    fn draw(&mut self, frame: &mut Compositor, size: Size) {
        Self::blocks(frame, size.width);
        let mut y = BLOCK_HEIGHT as i32 + 2;

        let ramp_width = size.width.saturating_sub(2 * INSET as u32);
        for ramp in [Ramp::BlackToWhite, Ramp::RedToWhite, Ramp::BlackToRed] {
            let planes = dither(&ramp.image(ramp_width, RAMP_HEIGHT));
            frame.paste(&planes, Point::new(INSET, y));
            y += RAMP_HEIGHT as i32;
        }

        // Same ramp without dithering: a hard edge at the midpoint
        frame.gradient(
            Rectangle::new(Point::new(INSET, y), Size::new(ramp_width, THRESHOLD_RAMP_HEIGHT)),
            Layer::Black,
        );
        y += THRESHOLD_RAMP_HEIGHT as i32 + 3;

        frame.text(Point::new(INSET, y), "Lines:", &fonts::SMALL, Layer::Black);
        y += 12;
        Self::line_set(frame, y, 1);
        y += 16;
        Self::line_set(frame, y, 2);
        y += 18;

        frame.text(Point::new(INSET, y), "Abc123", &fonts::LARGE, Layer::Black);
        frame.text(Point::new(RED_COLUMN_X, y), "Abc123", &fonts::LARGE, Layer::Red);
        y += 22;

        frame.text(Point::new(INSET, y), "Quick brown fox", &fonts::BODY, Layer::Black);
        y += 14;
        frame.text(Point::new(INSET, y), "Quick brown fox", &fonts::BODY, Layer::Red);
        y += 14;

        frame.text(Point::new(INSET, y), "TINY TEXT 0123456789", &fonts::SMALL, Layer::Black);
        frame.text_right(y, "RED TINY TEXT", &fonts::SMALL, Layer::Red);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(Ramp::BlackToWhite.color_at(0, 256), Rgb888::new(0, 0, 0));
        assert_eq!(Ramp::BlackToWhite.color_at(255, 256), Rgb888::new(255, 255, 255));
        assert_eq!(Ramp::RedToWhite.color_at(0, 256), Rgb888::new(255, 0, 0));
        assert_eq!(Ramp::BlackToRed.color_at(255, 256), Rgb888::new(255, 0, 0));
    }

    #[test]
    fn test_dithered_ramp_goes_dark_to_light() {
        let planes = dither(&Ramp::BlackToWhite.image(256, 9));
        let inked = |x0: u32| {
            (x0..x0 + 32)
                .flat_map(|x| (0..9).map(move |y| (x, y)))
                .filter(|(x, y)| planes.black.get(*x, *y))
                .count()
        };
        assert!(inked(0) > inked(224));
        assert!(planes.red.is_blank());
    }

    #[test]
    fn test_pattern_uses_both_inks_to_the_edges() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        let size = frame.size();
        TestPatternPanel.draw(&mut frame, size);
        assert_eq!(frame.layer(Layer::Black).luma(0, 0), Some(0));
        assert_eq!(frame.layer(Layer::Red).luma(263, 0), Some(0));
        assert_eq!(frame.layer(Layer::Black).luma(131, 1), Some(255));
    }
}
