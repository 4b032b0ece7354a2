//! Headless rendering to PNG files
//!
//! [`PngSink`] stands in for the panel. Every frame becomes three files in
//! the output directory:
//!
//! * `<idx>_<name>_black.png` and `<idx>_<name>_red.png`: one layer each,
//!   landscape as drawn, ink black on white
//! * `<idx>_<name>_preview.png`: the frame as seen on the HAT, landscape,
//!   black ink over red ink over white paper

use core::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, Rgb, RgbImage};
use log::{debug, info};

use crate::bitplane::{Bitplane, Planes};
use crate::config::Rotation;
use crate::rotation::{apply_rotation, logical_size};
use crate::sink::{FrameInfo, FrameSink};

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK_INK: Rgb<u8> = Rgb([0, 0, 0]);
const RED_INK: Rgb<u8> = Rgb([200, 0, 0]);

/// Errors writing demo output
#[derive(Debug)]
pub enum DemoError {
    /// Output directory could not be created
    Io {
        /// Directory being created
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// A PNG could not be encoded or written
    Image {
        /// File being written
        path: PathBuf,
        /// Underlying error
        source: image::ImageError,
    },
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot create {}: {source}", path.display())
            }
            Self::Image { path, source } => {
                write!(f, "Cannot write {}: {source}", path.display())
            }
        }
    }
}

impl core::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Image { source, .. } => Some(source),
        }
    }
}

/// One physical plane turned back to logical orientation, ink black on white
///
/// `rotation` must be the one the plane was finalized with.
pub fn plane_image(plane: &Bitplane, rotation: Rotation) -> GrayImage {
    let (width, height) = plane.size();
    let (logical_width, logical_height) = logical_size(width, height, rotation);
    GrayImage::from_fn(logical_width, logical_height, |x, y| {
        let (index, bit) = apply_rotation(x, y, width, height, rotation);
        if plane.test_mask(index, bit) { Luma([0]) } else { Luma([255]) }
    })
}

/// Both planes composited in logical orientation
///
/// `rotation` must be the one the planes were finalized with. Where both
/// planes carry ink the pixel is black, matching what the controller shows.
pub fn preview_image(planes: &Planes, rotation: Rotation) -> RgbImage {
    let (width, height) = planes.size();
    let (logical_width, logical_height) = logical_size(width, height, rotation);
    RgbImage::from_fn(logical_width, logical_height, |x, y| {
        let (index, bit) = apply_rotation(x, y, width, height, rotation);
        if planes.black.test_mask(index, bit) {
            BLACK_INK
        } else if planes.red.test_mask(index, bit) {
            RED_INK
        } else {
            PAPER
        }
    })
}

/// Sink writing every frame as PNG files
#[derive(Debug, Clone)]
pub struct PngSink {
    output_dir: PathBuf,
    rotation: Rotation,
    written: Vec<PathBuf>,
}

impl PngSink {
    /// Sink writing into `output_dir`, created if missing
    ///
    /// `rotation` is used to turn the planes back to landscape.
    pub fn new(output_dir: impl Into<PathBuf>, rotation: Rotation) -> Result<Self, DemoError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| DemoError::Io {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self {
            output_dir,
            rotation,
            written: Vec::new(),
        })
    }

    /// Target directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Every file written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn save(
        &mut self,
        name: &str,
        write: impl FnOnce(&Path) -> image::ImageResult<()>,
    ) -> Result<(), DemoError> {
        let path = self.output_dir.join(name);
        debug!("Writing {}", path.display());
        write(&path).map_err(|source| DemoError::Image {
            path: path.clone(),
            source,
        })?;
        self.written.push(path);
        Ok(())
    }
}

impl FrameSink for PngSink {
    type Error = DemoError;

    fn show(&mut self, planes: &Planes, info: &FrameInfo<'_>) -> Result<(), Self::Error> {
        let prefix = format!("{}_{}", info.index, info.file_stem());
        let black = plane_image(&planes.black, self.rotation);
        self.save(&format!("{prefix}_black.png"), |path| black.save(path))?;
        let red = plane_image(&planes.red, self.rotation);
        self.save(&format!("{prefix}_red.png"), |path| red.save(path))?;
        let preview = preview_image(planes, self.rotation);
        self.save(&format!("{prefix}_preview.png"), |path| preview.save(path))?;
        info!("Rendered {} to {}", info.title, self.output_dir.display());
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
