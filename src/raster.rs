//! Raster and palette implementation.

/// Number of entries in a FLIC palette.
pub const NUM_COLS: usize = 256;

/// An 8-bit palette-indexed raster surface.
///
/// Pixels are stored row-major with a pitch equal to the width.  The
/// decoder owns its raster and may replace it wholesale when a frame
/// declares new dimensions.
#[derive(Clone,Debug,Eq,PartialEq)]
pub struct Raster {
    w: usize,
    h: usize,
    buf: Vec<u8>,
}

/// A 256 entry RGB palette with a "changed since last query" flag.
#[derive(Clone)]
pub struct Palette {
    pal: [u8; 3 * NUM_COLS],
    changed: bool,
}

impl Raster {
    /// Allocate a new raster, with all pixels set to colour index 0.
    ///
    /// # Examples
    ///
    /// ```
    /// const SCREEN_W: usize = 320;
    /// const SCREEN_H: usize = 200;
    ///
    /// let raster = flicdec::Raster::new(SCREEN_W, SCREEN_H);
    /// assert_eq!(raster.pixels().len(), SCREEN_W * SCREEN_H);
    /// ```
    pub fn new(w: usize, h: usize) -> Self {
        Raster {
            w: w,
            h: h,
            buf: vec![0; w * h],
        }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.w
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.h
    }

    /// Bytes between the start of consecutive rows.
    pub fn pitch(&self) -> usize {
        self.w
    }

    /// The pixel buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.buf
    }

    /// The pixel buffer, for the codecs.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// A single row of pixels.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = self.w * y;
        &self.buf[start..(start + self.w)]
    }

    /// Set every pixel to colour index 0.
    pub fn clear(&mut self) {
        for e in self.buf.iter_mut() {
            *e = 0;
        }
    }
}

impl Palette {
    /// Allocate a new palette with every entry black.
    pub fn new() -> Self {
        Palette {
            pal: [0; 3 * NUM_COLS],
            changed: false,
        }
    }

    /// The palette as packed RGB triples.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pal[..]
    }

    /// The palette as packed RGB triples, for the codecs.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pal[..]
    }

    /// The RGB triple for a colour index.
    pub fn rgb(&self, idx: u8) -> [u8; 3] {
        let i = 3 * idx as usize;
        [self.pal[i], self.pal[i + 1], self.pal[i + 2]]
    }

    /// True if the palette was updated since the flag was last cleared.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Flag the palette as updated.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Clear the changed flag.
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Return the changed flag and clear it.
    pub fn take_changed(&mut self) -> bool {
        let changed = self.changed;
        self.changed = false;
        changed
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new()
    }
}
