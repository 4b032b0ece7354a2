//! Grayscale drawing surface
//!
//! [`GrayCanvas`] is an 8-bit luminance image (255 = paper, 0 = full ink)
//! at the logical canvas size. It implements
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) with
//! [`Gray8`] pixels, so every embedded-graphics primitive, font and image
//! can be drawn onto it. Pixels outside the canvas are dropped silently.
//!
//! ## Example
//!
//! ```
//! use eink_dashboard::GrayCanvas;
//! use embedded_graphics::{
//!     pixelcolor::{Gray8, GrayColor},
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//!
//! let mut canvas = GrayCanvas::new(32, 16);
//! let _ = Rectangle::new(Point::new(-4, -4), Size::new(8, 8))
//!     .into_styled(PrimitiveStyle::with_fill(Gray8::BLACK))
//!     .draw(&mut canvas);
//! assert_eq!(canvas.luma(0, 0), Some(0));
//! assert_eq!(canvas.luma(4, 4), Some(255));
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Point, Size},
    pixelcolor::{Gray8, GrayColor},
    prelude::Pixel,
    primitives::Rectangle,
};

/// Luminance of blank paper
pub const PAPER: u8 = 255;

/// 8-bit luminance image used as one ink layer
#[derive(Clone, PartialEq, Eq)]
pub struct GrayCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayCanvas {
    /// Blank canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![PAPER; width as usize * height as usize],
        }
    }

    /// Reset every pixel to paper
    pub fn clear(&mut self) {
        self.pixels.fill(PAPER);
    }

    /// Luminance at a pixel, `None` outside the canvas
    pub fn luma(&self, x: u32, y: u32) -> Option<u8> {
        self.index(x as i32, y as i32).map(|i| self.pixels[i])
    }

    /// Raw luminance values, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Overwrite one pixel; out of bounds is a no-op
    pub fn put(&mut self, x: i32, y: i32, luma: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = luma;
        }
    }

    /// Add partial ink coverage (0.0..=1.0) to a pixel, never lightening it
    pub fn blend(&mut self, x: i32, y: i32, coverage: f32) {
        if coverage <= 0.0 {
            return;
        }
        if let Some(i) = self.index(x, y) {
            let luma = (f32::from(PAPER) * (1.0 - coverage.min(1.0))).round() as u8;
            self.pixels[i] = self.pixels[i].min(luma);
        }
    }

    /// One pixel wide anti-aliased line (Xiaolin Wu)
    ///
    /// Horizontal and vertical lines come out solid; diagonals spread their
    /// ink over the two nearest pixels of each step. The line is clipped to
    /// the canvas first, so distant endpoints cost nothing.
    pub fn aa_line(&mut self, start: Point, end: Point) {
        let bounds = Rectangle::new(
            Point::new(-1, -1),
            Size::new(self.width + 2, self.height + 2),
        );
        let Some((start, end)) = clip_segment(start, end, &bounds) else {
            return;
        };
        let (mut x0, mut y0) = (start.x as f32, start.y as f32);
        let (mut x1, mut y1) = (end.x as f32, end.y as f32);

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            core::mem::swap(&mut x0, &mut y0);
            core::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            core::mem::swap(&mut x0, &mut x1);
            core::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let gradient = if dx == 0.0 { 0.0 } else { (y1 - y0) / dx };

        let mut y = y0;
        for x in (x0 as i32)..=(x1 as i32) {
            let base = y.floor();
            let frac = y - base;
            let row = base as i32;
            if steep {
                self.blend(row, x, 1.0 - frac);
                self.blend(row + 1, x, frac);
            } else {
                self.blend(x, row, 1.0 - frac);
                self.blend(x, row + 1, frac);
            }
            y += gradient;
        }
    }

    /// Horizontal luminance ramp from `from` at the left edge to `to` at the
    /// right edge of `area`
    pub fn gradient(&mut self, area: &Rectangle, from: u8, to: u8) {
        let span = area.size.width.saturating_sub(1).max(1) as f32;
        let left = i64::from(area.top_left.x);
        let top = i64::from(area.top_left.y);
        let x_range = left.max(0)..(left + i64::from(area.size.width)).min(i64::from(self.width));
        let y_range = top.max(0)..(top + i64::from(area.size.height)).min(i64::from(self.height));
        for x in x_range {
            let t = (x - left) as f32 / span;
            let luma = (f32::from(from) + (f32::from(to) - f32::from(from)) * t).round() as u8;
            for y in y_range.clone() {
                self.put(x as i32, y as i32, luma);
            }
        }
    }
}

/// Part of the segment from `start` to `end` inside `bounds`
///
/// Liang-Barsky in `f64`, which holds every `i32` exactly. Endpoints that
/// are already inside come back unchanged; clipped ones are rounded to the
/// nearest pixel.
pub fn clip_segment(start: Point, end: Point, bounds: &Rectangle) -> Option<(Point, Point)> {
    if bounds.size.width == 0 || bounds.size.height == 0 {
        return None;
    }
    let left = f64::from(bounds.top_left.x);
    let top = f64::from(bounds.top_left.y);
    let right = left + f64::from(bounds.size.width) - 1.0;
    let bottom = top + f64::from(bounds.size.height) - 1.0;
    let (x0, y0) = (f64::from(start.x), f64::from(start.y));
    let (dx, dy) = (f64::from(end.x) - x0, f64::from(end.y) - y0);

    let (mut enter, mut leave) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, x0 - left),
        (dx, right - x0),
        (-dy, y0 - top),
        (dy, bottom - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            enter = enter.max(q / p);
        } else {
            leave = leave.min(q / p);
        }
    }
    if enter > leave {
        return None;
    }

    let at = |t: f64| Point::new((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
    Some((at(enter), at(leave)))
}

impl core::fmt::Debug for GrayCanvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GrayCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl DrawTarget for GrayCanvas {
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            self.put(x, y, color.luma());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let luma = color.luma();
        let width = self.width as usize;
        for y in area.top_left.y..=bottom_right.y {
            let row = y as usize * width;
            let start = row + area.top_left.x as usize;
            let end = row + bottom_right.x as usize;
            self.pixels[start..=end].fill(luma);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color.luma());
        Ok(())
    }
}

impl OriginDimensions for GrayCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        prelude::*,
        primitives::{Line, PrimitiveStyle},
    };

    #[test]
    fn test_new_canvas_is_paper() {
        let canvas = GrayCanvas::new(4, 3);
        assert_eq!(canvas.pixels().len(), 12);
        assert!(canvas.pixels().iter().all(|p| *p == PAPER));
        assert_eq!(canvas.luma(4, 0), None);
    }

    #[test]
    fn test_fill_solid_clips() {
        let mut canvas = GrayCanvas::new(10, 10);
        canvas
            .fill_solid(&Rectangle::new(Point::new(8, -3), Size::new(10, 5)), Gray8::BLACK)
            .unwrap();
        let inked = canvas.pixels().iter().filter(|p| **p == 0).count();
        assert_eq!(inked, 4);
        assert_eq!(canvas.luma(9, 1), Some(0));
        assert_eq!(canvas.luma(9, 2), Some(255));
    }

    #[test]
    fn test_fill_solid_fully_outside() {
        let mut canvas = GrayCanvas::new(10, 10);
        canvas
            .fill_solid(&Rectangle::new(Point::new(20, 20), Size::new(5, 5)), Gray8::BLACK)
            .unwrap();
        assert!(canvas.pixels().iter().all(|p| *p == PAPER));
    }

    #[test]
    fn test_primitives_draw_offscreen_without_panic() {
        let mut canvas = GrayCanvas::new(10, 10);
        Line::new(Point::new(-50, -50), Point::new(50, 50))
            .into_styled(PrimitiveStyle::with_stroke(Gray8::BLACK, 3))
            .draw(&mut canvas)
            .unwrap();
        assert_eq!(canvas.luma(5, 5), Some(0));
    }

    #[test]
    fn test_aa_line_axis_aligned_is_solid() {
        let mut canvas = GrayCanvas::new(10, 3);
        canvas.aa_line(Point::new(0, 1), Point::new(9, 1));
        for x in 0..10 {
            assert_eq!(canvas.luma(x, 1), Some(0));
            assert_eq!(canvas.luma(x, 0), Some(255));
        }
    }

    #[test]
    fn test_aa_line_diagonal_has_partial_coverage() {
        let mut canvas = GrayCanvas::new(10, 10);
        canvas.aa_line(Point::new(0, 0), Point::new(9, 4));
        let partial = canvas.pixels().iter().filter(|p| **p > 0 && **p < 255).count();
        assert!(partial > 0);
        assert_eq!(canvas.luma(0, 0), Some(0));
    }

    #[test]
    fn test_clip_segment_keeps_inside_endpoints() {
        let bounds = Rectangle::new(Point::zero(), Size::new(10, 10));
        let (a, b) = (Point::new(1, 2), Point::new(8, 7));
        assert_eq!(clip_segment(a, b, &bounds), Some((a, b)));
    }

    #[test]
    fn test_clip_segment_trims_to_bounds() {
        let bounds = Rectangle::new(Point::zero(), Size::new(10, 10));
        let clipped = clip_segment(Point::new(-10, 5), Point::new(20, 5), &bounds);
        assert_eq!(clipped, Some((Point::new(0, 5), Point::new(9, 5))));
        assert_eq!(
            clip_segment(Point::new(-5, -5), Point::new(-1, 20), &bounds),
            None
        );
        assert_eq!(
            clip_segment(Point::new(i32::MIN, 3), Point::new(i32::MAX, 3), &bounds),
            Some((Point::new(0, 3), Point::new(9, 3)))
        );
    }

    #[test]
    fn test_aa_line_extreme_endpoints() {
        let mut canvas = GrayCanvas::new(264, 176);
        canvas.aa_line(Point::new(0, i32::MAX), Point::new(10, i32::MAX - 1));
        canvas.aa_line(Point::new(i32::MIN, i32::MIN), Point::new(i32::MAX, i32::MAX - 7));
        canvas.aa_line(Point::new(-200_000_000, 0), Point::new(200_000_000, 1));
        assert_eq!(canvas.pixels().len(), 264 * 176);

        // A long line through the canvas still inks the visible part
        let mut canvas = GrayCanvas::new(10, 10);
        canvas.aa_line(Point::new(-1_000_000, 5), Point::new(1_000_000, 6));
        assert!(canvas.luma(5, 5).is_some_and(|l| l < 255) || canvas.luma(5, 6).is_some_and(|l| l < 255));
    }

    #[test]
    fn test_gradient_clips_offscreen_area() {
        let mut canvas = GrayCanvas::new(4, 2);
        canvas.gradient(&Rectangle::new(Point::new(i32::MAX - 2, 0), Size::new(8, 2)), 0, 250);
        assert!(canvas.pixels().iter().all(|p| *p == PAPER));
        canvas.gradient(&Rectangle::new(Point::new(-5, 0), Size::new(11, 1)), 0, 250);
        assert_eq!(canvas.luma(0, 0), Some(125));
    }

    #[test]
    fn test_blend_never_lightens() {
        let mut canvas = GrayCanvas::new(2, 1);
        canvas.put(0, 0, 10);
        canvas.blend(0, 0, 0.5);
        assert_eq!(canvas.luma(0, 0), Some(10));
        canvas.blend(1, 0, 0.5);
        assert_eq!(canvas.luma(1, 0), Some(128));
    }

    #[test]
    fn test_gradient_endpoints() {
        let mut canvas = GrayCanvas::new(11, 2);
        canvas.gradient(&Rectangle::new(Point::zero(), Size::new(11, 2)), 0, 250);
        assert_eq!(canvas.luma(0, 1), Some(0));
        assert_eq!(canvas.luma(5, 0), Some(125));
        assert_eq!(canvas.luma(10, 1), Some(250));
    }
}
