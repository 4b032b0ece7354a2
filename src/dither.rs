//! Tri-color error diffusion
//!
//! Quantises an RGB image to the white/black/red [`PALETTE`] with Atkinson
//! error diffusion: each pixel takes the nearest palette color (Euclidean
//! RGB distance), and 1/8 of its error goes to each of six unvisited
//! neighbours:
//!
//! ```text
//!         *   1   1
//!     1   1   1
//!         1
//! ```
//!
//! The remaining 2/8 of the error is dropped, which keeps highlights and
//! shadows clean. Error that would land outside the image is discarded.
//!
//! ## Example
//!
//! ```
//! use eink_dashboard::dither::{dither, ColorImage};
//! use embedded_graphics_core::pixelcolor::Rgb888;
//!
//! let ramp = ColorImage::from_fn(64, 8, |x, _| {
//!     let v = (x * 4) as u8;
//!     Rgb888::new(255, v, v)
//! });
//! let planes = dither(&ramp);
//! assert_eq!(planes.size(), (64, 8));
//! assert!(!planes.red.is_blank());
//! ```

use embedded_graphics_core::pixelcolor::{Rgb888, RgbColor};

use crate::bitplane::Planes;
use crate::color::{Color, PALETTE};

/// Atkinson neighbour offsets (dx, dy); each gets 1/8 of the error
const KERNEL: [(i32, i32); 6] = [(1, 0), (2, 0), (-1, 1), (0, 1), (1, 1), (0, 2)];

/// Share of the error each neighbour receives
const SHARE: f32 = 1.0 / 8.0;

/// In-memory RGB image to be dithered
#[derive(Clone, Debug, PartialEq)]
pub struct ColorImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl ColorImage {
    /// Image filled with one color
    pub fn new(width: u32, height: u32, fill: Rgb888) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Image generated per pixel
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgb888,
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap row-major pixels; `None` if the count does not match
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb888>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at (x, y), `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

#[cfg(feature = "png")]
impl From<&image::RgbImage> for ColorImage {
    fn from(image: &image::RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| Rgb888::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }
}

/// Nearest palette entry; earlier entries win ties
fn nearest(value: [f32; 3]) -> Color {
    let mut best = PALETTE[0];
    let mut best_distance = f32::INFINITY;
    for color in PALETTE {
        let target = channels(color.rgb());
        let distance: f32 = value
            .iter()
            .zip(target.iter())
            .map(|(v, t)| (v - t) * (v - t))
            .sum();
        if distance < best_distance {
            best_distance = distance;
            best = color;
        }
    }
    best
}

fn channels(color: Rgb888) -> [f32; 3] {
    [f32::from(color.r()), f32::from(color.g()), f32::from(color.b())]
}

/// Quantise every pixel in raster order, handing each result to `visit`
///
/// `visit` is called exactly once per pixel with `(x, y, color)`.
pub fn dither_with<F>(image: &ColorImage, mut visit: F)
where
    F: FnMut(u32, u32, Color),
{
    let (width, height) = (image.width as usize, image.height as usize);
    let mut errors = vec![[0.0f32; 3]; width * height];

    for y in 0..height {
        for x in 0..width {
            let index = y * width + x;
            let source = channels(image.pixels[index]);
            let mut value = [0.0f32; 3];
            for c in 0..3 {
                value[c] = (source[c] + errors[index][c]).clamp(0.0, 255.0).trunc();
            }

            let color = nearest(value);
            visit(x as u32, y as u32, color);

            let target = channels(color.rgb());
            let error = [
                value[0] - target[0],
                value[1] - target[1],
                value[2] - target[2],
            ];
            for (dx, dy) in KERNEL {
                let nx = x as i64 + i64::from(dx);
                let ny = y as i64 + i64::from(dy);
                if nx < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let neighbour = &mut errors[ny as usize * width + nx as usize];
                for c in 0..3 {
                    neighbour[c] += error[c] * SHARE;
                }
            }
        }
    }
}

/// Dither an image into black and red ink planes of the same size
///
/// At most one plane is set per pixel.
pub fn dither(image: &ColorImage) -> Planes {
    let mut planes = Planes::new(image.width, image.height);
    dither_with(image, |x, y, color| {
        let (black, red) = color.ink();
        planes.black.set(x, y, black);
        planes.red.set(x, y, red);
    });
    planes
}
