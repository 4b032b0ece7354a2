//! Banner and footer drawn around framed panels

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use super::{FOOTER_HEIGHT, HEADER_HEIGHT, fonts};
use crate::color::Layer;
use crate::compositor::Compositor;

const DOT_RADIUS: i32 = 2;
const DOT_SPACING: i32 = 12;
const DOT_START_X: i32 = 4;

/// Red banner with the title in black
pub fn header(frame: &mut Compositor, title: &str) {
    let width = frame.size().width;
    frame.fill(
        Rectangle::new(Point::zero(), Size::new(width, HEADER_HEIGHT as u32)),
        Layer::Red,
    );
    frame.text_centered(3, title, &fonts::TITLE, Layer::Black);
}

/// Vertical centre of the footer dots
pub fn footer_baseline(frame: &Compositor) -> i32 {
    frame.size().height as i32 - FOOTER_HEIGHT + 2
}

/// Centre of the dot for panel `index`
pub fn dot_center(index: usize, baseline: i32) -> Point {
    Point::new(DOT_START_X + index as i32 * DOT_SPACING + DOT_RADIUS, baseline)
}

/// One dot per panel, the current one filled, and the update stamp
pub fn footer(frame: &mut Compositor, index: usize, total: usize, stamp: &str) {
    let y = footer_baseline(frame);
    let diameter = (DOT_RADIUS * 2 + 1) as u32;
    for i in 0..total {
        let center = dot_center(i, y);
        let area = Rectangle::new(
            center - Point::new(DOT_RADIUS, DOT_RADIUS),
            Size::new(diameter, diameter),
        );
        frame.ellipse(area, Layer::Black, i == index);
    }
    frame.text_right(y - 2, stamp, &fonts::SMALL, Layer::Black);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_current_dot_is_filled() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        footer(&mut frame, 2, 6, "");
        let y = footer_baseline(&frame);
        assert_eq!(y, 164);
        let layer = frame.layer(Layer::Black);
        for i in 0..6 {
            let c = dot_center(i, y);
            let inked = layer.luma(c.x as u32, c.y as u32) == Some(0);
            assert_eq!(inked, i == 2, "dot {i}");
        }
    }

    #[test]
    fn test_header_covers_banner() {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        header(&mut frame, "");
        let red = frame.layer(Layer::Red);
        assert_eq!(red.luma(0, 0), Some(0));
        assert_eq!(red.luma(263, 21), Some(0));
        assert_eq!(red.luma(0, 22), Some(255));
    }
}
