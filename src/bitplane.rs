//! Packed monochrome bitplanes
//!
//! A [`Bitplane`] is one ink layer: 8 pixels per byte, MSB first, each row
//! starting on a byte boundary. A set bit means "put ink here". The panel
//! takes one plane per ink, bundled as [`Planes`].
//!
//! ## Example
//!
//! ```
//! use eink_dashboard::Bitplane;
//!
//! let mut plane = Bitplane::new(16, 2);
//! plane.set(9, 1, true);
//! assert!(plane.get(9, 1));
//! assert_eq!(plane.as_bytes(), &[0x00, 0x00, 0x00, 0x40]);
//!
//! // Out of bounds writes are ignored
//! plane.set(100, 100, true);
//! assert_eq!(plane.count_set(), 1);
//! ```

/// One packed-bit ink layer
#[derive(Clone, PartialEq, Eq)]
pub struct Bitplane {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl Bitplane {
    /// Create an empty (no ink) plane
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width.div_ceil(8) as usize;
        Self {
            width,
            height,
            bytes: vec![0; stride * height as usize],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height) in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    /// Byte index and bit mask of a pixel, or `None` outside the plane
    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.stride() + (x / 8) as usize;
        Some((index, 0x80 >> (x % 8)))
    }

    /// Set or clear ink at a pixel; out of bounds is a no-op
    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        if let Some((index, mask)) = self.locate(x, y) {
            if ink {
                self.bytes[index] |= mask;
            } else {
                self.bytes[index] &= !mask;
            }
        }
    }

    /// Whether a pixel carries ink; out of bounds reads as no ink
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.locate(x, y)
            .is_some_and(|(index, mask)| self.bytes[index] & mask != 0)
    }

    /// OR a mask into a byte, as produced by
    /// [`apply_rotation`](crate::rotation::apply_rotation)
    ///
    /// Indices past the end are ignored.
    pub fn set_mask(&mut self, index: usize, mask: u8) {
        if let Some(byte) = self.bytes.get_mut(index) {
            *byte |= mask;
        }
    }

    /// Whether any bit of `mask` is set in byte `index`
    pub fn test_mask(&self, index: usize, mask: u8) -> bool {
        self.bytes.get(index).is_some_and(|byte| byte & mask != 0)
    }

    /// Fill every pixel with ink or clear it
    pub fn fill(&mut self, ink: bool) {
        let value = if ink { 0xFF } else { 0x00 };
        self.bytes.fill(value);
        self.mask_padding();
    }

    /// Clear the unused bits at the end of each row when width is not a
    /// multiple of 8
    fn mask_padding(&mut self) {
        let tail = self.width % 8;
        if tail == 0 {
            return;
        }
        let keep = !(0xFFu8 >> tail);
        let stride = self.stride();
        for row in self.bytes.chunks_mut(stride) {
            if let Some(last) = row.last_mut() {
                *last &= keep;
            }
        }
    }

    /// Packed bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of inked pixels
    pub fn count_set(&self) -> u32 {
        self.bytes.iter().map(|byte| byte.count_ones()).sum()
    }

    /// Whether no pixel carries ink
    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(|byte| *byte == 0)
    }
}

impl core::fmt::Debug for Bitplane {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bitplane")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("inked", &self.count_set())
            .finish()
    }
}

/// The two ink layers of one frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Planes {
    /// Black ink
    pub black: Bitplane,
    /// Red ink
    pub red: Bitplane,
}

impl Planes {
    /// Two empty planes of the same size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            black: Bitplane::new(width, height),
            red: Bitplane::new(width, height),
        }
    }

    /// (width, height) shared by both planes
    pub fn size(&self) -> (u32, u32) {
        self.black.size()
    }
}
