//! Two-layer frame compositor
//!
//! A [`Compositor`] holds one [`GrayCanvas`] per ink [`Layer`] at the
//! logical (landscape) size. Panels draw on the layers; [`finalize`]
//! thresholds each layer at [`THRESHOLD`] and turns it into a physical
//! (portrait) [`Bitplane`] through the configured rotation.
//!
//! Where both layers carry ink at a pixel, both planes get the bit. The
//! controller resolves the overlap (black shows on top).
//!
//! ## Example
//!
//! ```
//! use eink_dashboard::{Config, Compositor, Layer};
//! use embedded_graphics::mono_font::ascii::FONT_6X10;
//!
//! let mut frame = Compositor::new(&Config::epd2in7b());
//! frame.begin_frame();
//! frame.text_centered(4, "HELLO", &FONT_6X10, Layer::Red);
//! frame.progress_bar(10, 40, 100, 10, 92.0, Layer::Black);
//!
//! let planes = frame.finalize();
//! assert_eq!(planes.size(), (176, 264));
//! assert!(!planes.red.is_blank());
//! ```
//!
//! [`finalize`]: Compositor::finalize

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::{Gray8, GrayColor},
    prelude::*,
    primitives::{Ellipse, Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text, renderer::TextRenderer},
};

use crate::bitplane::Planes;
use crate::canvas::{GrayCanvas, clip_segment};
use crate::color::Layer;
use crate::config::{Config, Rotation};
use crate::rotation::{apply_rotation, logical_size};

/// Luminance below which a layer pixel becomes ink
pub const THRESHOLD: u8 = 128;

/// Percentage at which a progress bar switches to red
pub const CRITICAL_PERCENT: f32 = 85.0;

/// Side margin used by [`Compositor::hline`] and [`Compositor::text_right`]
pub const MARGIN: i32 = 4;

/// Gap between label and value in [`Compositor::label_value`]
const LABEL_GAP: i32 = 3;

/// Whether every corner of `area` is representable in `i32`
fn fits(area: &Rectangle) -> bool {
    area.top_left.x.checked_add_unsigned(area.size.width).is_some()
        && area.top_left.y.checked_add_unsigned(area.size.height).is_some()
}

/// Drawing surface for one frame
pub struct Compositor {
    /// Physical plane size (width, height)
    physical: (u32, u32),
    rotation: Rotation,
    black: GrayCanvas,
    red: GrayCanvas,
}

impl Compositor {
    /// Compositor for a panel configuration
    pub fn new(config: &Config) -> Self {
        let dims = config.dimensions;
        Self::with_panel(u32::from(dims.cols), u32::from(dims.rows), config.rotation)
    }

    /// Compositor for an arbitrary physical size and rotation
    pub fn with_panel(width: u32, height: u32, rotation: Rotation) -> Self {
        let (lw, lh) = logical_size(width, height, rotation);
        Self {
            physical: (width, height),
            rotation,
            black: GrayCanvas::new(lw, lh),
            red: GrayCanvas::new(lw, lh),
        }
    }

    /// Logical canvas size
    pub fn size(&self) -> Size {
        self.black.size()
    }

    /// Physical plane size (width, height)
    pub fn physical_size(&self) -> (u32, u32) {
        self.physical
    }

    /// Clear both layers to paper
    pub fn begin_frame(&mut self) {
        self.black.clear();
        self.red.clear();
    }

    /// One layer, for drawing with embedded-graphics directly
    pub fn layer_mut(&mut self, layer: Layer) -> &mut GrayCanvas {
        match layer {
            Layer::Black => &mut self.black,
            Layer::Red => &mut self.red,
        }
    }

    /// One layer, read-only
    pub fn layer(&self, layer: Layer) -> &GrayCanvas {
        match layer {
            Layer::Black => &self.black,
            Layer::Red => &self.red,
        }
    }

    /// Text with its top-left corner at `position`
    pub fn text(&mut self, position: Point, text: &str, font: &MonoFont<'_>, layer: Layer) {
        let style = MonoTextStyle::new(font, Gray8::BLACK);
        // Infallible
        let _ = Text::with_baseline(text, position, style, Baseline::Top).draw(self.layer_mut(layer));
    }

    /// Rendered width of `text` in pixels
    pub fn text_width(&self, text: &str, font: &MonoFont<'_>) -> u32 {
        MonoTextStyle::new(font, Gray8::BLACK)
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
    }

    /// Text centred horizontally on the canvas
    pub fn text_centered(&mut self, y: i32, text: &str, font: &MonoFont<'_>, layer: Layer) {
        let free = self.size().width as i32 - self.text_width(text, font) as i32;
        self.text(Point::new(free / 2, y), text, font, layer);
    }

    /// Text flush against the right margin
    pub fn text_right(&mut self, y: i32, text: &str, font: &MonoFont<'_>, layer: Layer) {
        let x = self.size().width as i32 - self.text_width(text, font) as i32 - MARGIN;
        self.text(Point::new(x, y), text, font, layer);
    }

    /// Red label followed by a black value
    pub fn label_value(
        &mut self,
        position: Point,
        label: &str,
        value: &str,
        label_font: &MonoFont<'_>,
        value_font: &MonoFont<'_>,
    ) {
        self.text(position, label, label_font, Layer::Red);
        let offset = self.text_width(label, label_font) as i32 + LABEL_GAP;
        self.text(position + Point::new(offset, 0), value, value_font, Layer::Black);
    }

    /// Filled or outlined rectangle
    pub fn rect(&mut self, area: Rectangle, layer: Layer, fill: bool) {
        let style = if fill {
            PrimitiveStyle::with_fill(Gray8::BLACK)
        } else {
            PrimitiveStyle::with_stroke(Gray8::BLACK, 1)
        };
        if !fits(&area) {
            return;
        }
        let _ = area.into_styled(style).draw(self.layer_mut(layer));
    }

    /// Solid block of ink
    pub fn fill(&mut self, area: Rectangle, layer: Layer) {
        self.rect(area, layer, true);
    }

    /// Straight line; one pixel diagonals are anti-aliased
    ///
    /// The segment is clipped to the frame (plus the stroke width) first.
    pub fn line(&mut self, start: Point, end: Point, layer: Layer, width: u32) {
        let pad = width.min(1024) + 1;
        let size = self.size();
        let bounds = Rectangle::new(
            Point::new(-(pad as i32), -(pad as i32)),
            Size::new(size.width + 2 * pad, size.height + 2 * pad),
        );
        let Some((start, end)) = clip_segment(start, end, &bounds) else {
            return;
        };
        let axis_aligned = start.x == end.x || start.y == end.y;
        if width <= 1 && !axis_aligned {
            self.layer_mut(layer).aa_line(start, end);
        } else {
            let _ = Line::new(start, end)
                .into_styled(PrimitiveStyle::with_stroke(Gray8::BLACK, width.max(1)))
                .draw(self.layer_mut(layer));
        }
    }

    /// Full-width divider inset by [`MARGIN`]
    pub fn hline(&mut self, y: i32, layer: Layer) {
        let right = self.size().width as i32 - MARGIN;
        self.line(Point::new(MARGIN, y), Point::new(right, y), layer, 1);
    }

    /// Filled or outlined ellipse inscribed in `area`
    pub fn ellipse(&mut self, area: Rectangle, layer: Layer, fill: bool) {
        let style = if fill {
            PrimitiveStyle::with_fill(Gray8::BLACK)
        } else {
            PrimitiveStyle::with_stroke(Gray8::BLACK, 1)
        };
        let _ = Ellipse::new(area.top_left, area.size)
            .into_styled(style)
            .draw(self.layer_mut(layer));
    }

    /// Horizontal gradient from full ink on the left to paper on the right
    ///
    /// At finalize this thresholds to a hard edge at the midpoint; use
    /// [`dither`](crate::dither::dither) and [`paste`](Self::paste) for a
    /// smooth ramp.
    pub fn gradient(&mut self, area: Rectangle, layer: Layer) {
        self.layer_mut(layer).gradient(&area, 0, 255);
    }

    /// Outlined bar filled to `percent`
    ///
    /// The outline is always black. The fill uses `layer` below
    /// [`CRITICAL_PERCENT`] and red at or above it.
    pub fn progress_bar(&mut self, x: i32, y: i32, width: u32, height: u32, percent: f32, layer: Layer) {
        let fill_layer = if percent >= CRITICAL_PERCENT {
            Layer::Red
        } else {
            layer
        };
        self.rect(
            Rectangle::new(Point::new(x, y), Size::new(width, height)),
            Layer::Black,
            false,
        );

        let inner = width.saturating_sub(2);
        let filled = (inner as f32 * percent.clamp(0.0, 100.0) / 100.0) as u32;
        if filled > 0 {
            self.fill(
                Rectangle::new(
                    Point::new(x.saturating_add(1), y.saturating_add(1)),
                    Size::new(filled, height.saturating_sub(2)),
                ),
                fill_layer,
            );
        }
    }

    /// Stamp pre-rendered logical-orientation planes at `origin`
    ///
    /// Inked bits become full ink on the matching layer; unset bits leave
    /// the layer untouched.
    pub fn paste(&mut self, planes: &Planes, origin: Point) {
        let (width, height) = planes.size();
        for y in 0..height {
            let Some(py) = i32::try_from(y).ok().and_then(|y| origin.y.checked_add(y)) else {
                break;
            };
            for x in 0..width {
                let Some(px) = i32::try_from(x).ok().and_then(|x| origin.x.checked_add(x)) else {
                    break;
                };
                if planes.black.get(x, y) {
                    self.black.put(px, py, 0);
                }
                if planes.red.get(x, y) {
                    self.red.put(px, py, 0);
                }
            }
        }
    }

    /// Threshold both layers and rotate them into physical planes
    ///
    /// Does not modify the layers, so calling it twice yields identical
    /// planes.
    pub fn finalize(&self) -> Planes {
        let (width, height) = self.physical;
        let mut planes = Planes::new(width, height);
        let size = self.size();

        for y in 0..size.height {
            for x in 0..size.width {
                let black = self.black.luma(x, y).is_some_and(|l| l < THRESHOLD);
                let red = self.red.luma(x, y).is_some_and(|l| l < THRESHOLD);
                if !(black || red) {
                    continue;
                }
                let (index, bit) = apply_rotation(x, y, width, height, self.rotation);
                if black {
                    planes.black.set_mask(index, bit);
                }
                if red {
                    planes.red.set_mask(index, bit);
                }
            }
        }
        planes
    }
}
