//! Generative tri-color art
//!
//! Each draw picks the next of three generators: a Voronoi mosaic,
//! concentric rings or diamonds, and a tile grid. Randomness comes from a
//! seeded xorshift generator, so a given seed always yields the same
//! sequence of pictures.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use super::Panel;
use crate::color::{Color, Layer};
use crate::compositor::Compositor;

/// xorshift64* generator
#[derive(Clone, Debug)]
pub struct XorShift(u64);

impl XorShift {
    /// Generator for `seed`; zero is remapped since it is a fixed point
    pub fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    /// Next raw value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform value in `low..=high`
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (i64::from(high) - i64::from(low) + 1) as u64;
        low + (self.next_u64() % span) as i32
    }

    /// Uniform pick from a non-empty slice
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let index = (self.next_u64() % items.len() as u64) as usize;
        items.get(index).copied()
    }
}

/// The three generators, in rotation order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// Nearest-seed cells in random inks with black borders
    Voronoi,
    /// Nested circles or diamonds plus scattered dots
    Concentric,
    /// Square tiles with random motifs
    Tiles,
}

impl Style {
    const ORDER: [Self; 3] = [Self::Voronoi, Self::Concentric, Self::Tiles];

    /// Generator for the `n`th draw
    pub fn nth(n: usize) -> Self {
        Self::ORDER[n % Self::ORDER.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Circles,
    Diamonds,
    Mixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Motif {
    Solid,
    Cross,
    Diagonal,
    Dots,
    Empty,
}

const INKS: [Layer; 2] = [Layer::Black, Layer::Red];
const VORONOI_BLOCK: i32 = 4;

/// Full-bleed generative art, cycling generators on each draw
#[derive(Clone, Debug)]
pub struct ArtPanel {
    rng: XorShift,
    draws: usize,
}

impl ArtPanel {
    /// Panel seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: XorShift::new(seed),
            draws: 0,
        }
    }

    /// Generator the next draw will use
    pub fn next_style(&self) -> Style {
        Style::nth(self.draws)
    }

    fn voronoi(&mut self, frame: &mut Compositor, size: Size) {
        let (width, height) = (size.width as i32, size.height as i32);
        let count = self.rng.range(12, 20) as usize;
        let seeds: Vec<(Point, Color)> = (0..count)
            .map(|_| {
                let at = Point::new(self.rng.range(0, width), self.rng.range(0, height));
                let color = self
                    .rng
                    .pick(&[Color::Black, Color::Red, Color::White])
                    .unwrap_or(Color::White);
                (at, color)
            })
            .collect();
        let nearest = |p: Point| -> usize {
            seeds
                .iter()
                .enumerate()
                .min_by_key(|(_, (s, _))| {
                    let d = *s - p;
                    d.x * d.x + d.y * d.y
                })
                .map_or(0, |(i, _)| i)
        };

        let half = VORONOI_BLOCK / 2;
        for by in (0..height).step_by(VORONOI_BLOCK as usize) {
            for bx in (0..width).step_by(VORONOI_BLOCK as usize) {
                let here = nearest(Point::new(bx + half, by + half));
                if let Some(layer) = seeds[here].1.layer() {
                    frame.fill(
                        Rectangle::new(
                            Point::new(bx, by),
                            Size::new(VORONOI_BLOCK as u32, VORONOI_BLOCK as u32),
                        ),
                        layer,
                    );
                }
                // border where the next block belongs to another cell
                let right = nearest(Point::new(bx + half + VORONOI_BLOCK, by + half));
                if bx + VORONOI_BLOCK < width && right != here {
                    let x = bx + VORONOI_BLOCK;
                    let bottom = (by + VORONOI_BLOCK).min(height) - 1;
                    frame.line(Point::new(x, by), Point::new(x, bottom), Layer::Black, 1);
                }
            }
        }
    }

    fn diamond(frame: &mut Compositor, center: Point, r: i32, layer: Layer, fill: bool) {
        let top = center - Point::new(0, r);
        let right = center + Point::new(r, 0);
        let bottom = center + Point::new(0, r);
        let left = center - Point::new(r, 0);
        for (a, b) in [(top, right), (right, bottom), (bottom, left), (left, top)] {
            frame.line(a, b, layer, 1);
        }
        if fill {
            for dy in (1 - r)..r {
                let half = r - dy.abs();
                let y = center.y + dy;
                frame.line(
                    Point::new(center.x - half, y),
                    Point::new(center.x + half, y),
                    layer,
                    1,
                );
            }
        }
    }

    fn concentric(&mut self, frame: &mut Compositor, size: Size) {
        let center = Point::new(size.width as i32 / 2, size.height as i32 / 2);
        let max_r = size.width.min(size.height) as i32 / 2;
        let shape = self
            .rng
            .pick(&[Shape::Circles, Shape::Diamonds, Shape::Mixed])
            .unwrap_or(Shape::Circles);
        let rings = self.rng.range(6, 12);

        for i in (1..=rings).rev() {
            let r = max_r * i / rings;
            let layer = if i % 3 == 0 { Layer::Red } else { Layer::Black };
            let fill = i % 2 == 0;
            let circle = shape == Shape::Circles || (shape == Shape::Mixed && i % 2 == 0);
            if circle {
                let d = (2 * r + 1) as u32;
                frame.ellipse(
                    Rectangle::new(center - Point::new(r, r), Size::new(d, d)),
                    layer,
                    fill,
                );
            } else {
                Self::diamond(frame, center, r, layer, fill);
            }
        }

        for _ in 0..self.rng.range(5, 15) {
            let x = self.rng.range(10, size.width as i32 - 10);
            let y = self.rng.range(10, size.height as i32 - 10);
            let r = self.rng.range(2, 6);
            let layer = self.rng.pick(&INKS).unwrap_or(Layer::Black);
            let d = (2 * r + 1) as u32;
            frame.ellipse(
                Rectangle::new(Point::new(x - r, y - r), Size::new(d, d)),
                layer,
                true,
            );
        }
    }

    fn tiles(&mut self, frame: &mut Compositor, size: Size) {
        let tile = self.rng.pick(&[16, 22, 32]).unwrap_or(22);
        let (width, height) = (size.width as i32, size.height as i32);
        let motifs = [
            Motif::Solid,
            Motif::Cross,
            Motif::Diagonal,
            Motif::Dots,
            Motif::Empty,
        ];

        for row in 0..=height / tile {
            for col in 0..=width / tile {
                let (x, y) = (col * tile, row * tile);
                let x1 = (x + tile - 1).min(width - 1);
                let y1 = (y + tile - 1).min(height - 1);
                let motif = self.rng.pick(&motifs).unwrap_or(Motif::Empty);
                let layer = self.rng.pick(&INKS).unwrap_or(Layer::Black);
                let mid = Point::new(x + tile / 2, y + tile / 2);
                match motif {
                    Motif::Solid => frame.fill(
                        Rectangle::with_corners(Point::new(x, y), Point::new(x1, y1)),
                        layer,
                    ),
                    Motif::Cross => {
                        frame.line(Point::new(x, mid.y), Point::new(x1, mid.y), layer, 1);
                        frame.line(Point::new(mid.x, y), Point::new(mid.x, y1), layer, 1);
                    }
                    Motif::Diagonal => {
                        frame.line(Point::new(x, y), Point::new(x1, y1), layer, 1);
                        frame.line(Point::new(x1, y), Point::new(x, y1), layer, 1);
                    }
                    Motif::Dots => {
                        let r = (tile / 6).max(2);
                        let d = (2 * r + 1) as u32;
                        frame.ellipse(
                            Rectangle::new(mid - Point::new(r, r), Size::new(d, d)),
                            layer,
                            true,
                        );
                    }
                    Motif::Empty => {}
                }
            }
        }
    }
}

impl Panel for ArtPanel {
    fn title(&self) -> &str {
        "ART"
    }

    fn fullbleed(&self) -> bool {
        true
    }

    fn draw(&mut self, frame: &mut Compositor, size: Size) {
        let style = self.next_style();
        log::debug!("Drawing generative art: {style:?}");
        match style {
            Style::Voronoi => self.voronoi(frame, size),
            Style::Concentric => self.concentric(frame, size),
            Style::Tiles => self.tiles(frame, size),
        }
        self.draws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn render(panel: &mut ArtPanel) -> crate::bitplane::Planes {
        let mut frame = Compositor::new(&Config::epd2in7b());
        frame.begin_frame();
        let size = frame.size();
        panel.draw(&mut frame, size);
        frame.finalize()
    }

    #[test]
    fn test_rng_range_bounds() {
        let mut rng = XorShift::new(7);
        for _ in 0..1000 {
            let v = rng.range(-3, 5);
            assert!((-3..=5).contains(&v));
        }
        assert_eq!(rng.range(4, 4), 4);
        assert_eq!(rng.pick::<u8>(&[]), None);
    }

    #[test]
    fn test_zero_seed_is_not_stuck() {
        let mut rng = XorShift::new(0);
        assert_ne!(rng.next_u64(), rng.next_u64());
    }

    #[test]
    fn test_styles_rotate() {
        let mut panel = ArtPanel::new(42);
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(panel.next_style());
            render(&mut panel);
        }
        assert_eq!(
            seen,
            [Style::Voronoi, Style::Concentric, Style::Tiles, Style::Voronoi]
        );
    }

    #[test]
    fn test_same_seed_same_pictures() {
        let mut a = ArtPanel::new(1234);
        let mut b = ArtPanel::new(1234);
        for _ in 0..3 {
            assert_eq!(render(&mut a), render(&mut b));
        }
    }

    #[test]
    fn test_concentric_draws_ink() {
        let mut panel = ArtPanel::new(99);
        render(&mut panel);
        let planes = render(&mut panel);
        assert!(!planes.black.is_blank());
    }
}
