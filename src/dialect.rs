//! FLIC dialects.
//!
//! Game titles built their own variations on the Animator Pro FLC
//! container: a different header layout, extra fields in the frame
//! header, or a second frame type carrying sound and script commands.
//! A `Dialect` describes such a variation as plain data, and is passed
//! to the loader when the animation is opened.

use crate::{FormatError,FormatResult};

/// Magic for an Animator Pro FLC file.
pub const FLIHR_MAGIC: u16 = 0xAF12;

/// Magic for a FLIC frame - FLIC Frame Chunks.
///
/// Frame chunks contain the pixel and color data for the animation.
/// A frame chunk may contain multiple subordinate chunks, each
/// containing a different type of data for the current frame.  Each
/// frame chunk starts with a 16-byte header that describes the
/// contents of the frame:
///
///   Offset | Length |   Name   | Description
///   ------:| ------:|:--------:| -----------------------------------
///        0 |      4 |   size   | The size of the frame chunk, including this header and all subordinate chunks that follow.
///        4 |      2 |   type   | Frame chunk identifier.
///        6 |      2 |  chunks  | Number of subordinate chunks in the frame chunk.
///        8 |      8 | reserved | Unused space, set to zeroes.
pub const FCID_FRAME: u16 = 0xF1FA;

/// Magic for a scripted frame, carrying sound and script commands.
///
/// A scripted frame starts with an 8-byte header: the frame size, the
/// frame type, and the number of command chunks that follow.
pub const FCID_SCRIPT: u16 = 0xFAF1;

/// Size of a FLIC file header on disk.
pub const SIZE_OF_FLIC_HEADER: usize = 128;

/// Size of a scripted FLIC file header on disk.
pub const SIZE_OF_SCRIPTED_HEADER: usize = 24;

/// Number of command chunk types in a scripted frame.
pub const NUM_SCRIPT_COMMANDS: u16 = 22;

/// Where the nominal frame delay lives in the file header.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum DelayField {
    /// 16-bit milliseconds at the given offset.
    U16(usize),

    /// 32-bit milliseconds at the given offset.
    U32(usize),
}

/// Layout of the file header.
///
/// The fields at offsets 0 to 13 (size, magic, frames, width, height,
/// depth) are shared by every dialect.  The remaining fields move
/// around.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub struct HeaderLayout {
    /// Number of bytes in the fixed header.
    pub size: usize,

    /// Nominal frame delay.
    pub delay: DelayField,

    /// Offset of the 32-bit first frame offset.  If None, the first
    /// frame immediately follows the header.
    pub frame1: Option<usize>,

    /// Offset of the 32-bit ring frame offset.  If None, the animation
    /// cannot loop.
    pub ring: Option<usize>,
}

/// Interpretation of the last 8 bytes of a standard frame header.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum FrameHeaderLayout {
    /// Reserved, skipped.
    Reserved,

    /// A 16-bit delay override, a reserved word, then 16-bit width and
    /// height overrides.  Non-zero values replace the current ones.
    Overrides,
}

/// How an extension chunk's declared length is measured.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum ChunkLength {
    /// The length includes the 6-byte chunk header.
    IncludesHeader,

    /// The length covers the payload only.
    PayloadOnly,
}

/// Chunk types routed to the extension hook.
#[derive(Clone,Debug,Eq,PartialEq)]
pub struct ExtensionTable {
    /// Frame type whose chunks all belong to the hook.
    pub frame_type: Option<u16>,

    /// Chunk types accepted inside an extension frame.
    pub frame_chunks: Vec<u16>,

    /// Length convention for chunks inside an extension frame.
    pub frame_chunk_length: ChunkLength,

    /// Extra chunk types accepted inside standard frames.  These use
    /// the standard length convention.
    pub standard_chunks: Vec<u16>,
}

/// A FLIC dialect.
#[derive(Clone,Debug,Eq,PartialEq)]
pub struct Dialect {
    pub magic: u16,
    pub header: HeaderLayout,
    pub frame_header: FrameHeaderLayout,
    pub extension: Option<ExtensionTable>,
}

/*--------------------------------------------------------------*/

/// Size of the shared header fields, up to and including flags.
const SIZE_OF_COMMON_HEADER: usize = 16;

impl HeaderLayout {
    /// The Animator Pro FLC header.
    ///
    /// A FLC file begins with a 128-byte header, described below.  All
    /// lengths and offsets are in bytes.  All values stored in the
    /// header fields are unsigned.
    ///
    ///   Offset | Length |   Name   | Description
    ///   ------:| ------:|:--------:| -----------------------------------
    ///        0 |      4 |   size   | The size of the entire animation file, including this file header.
    ///        4 |      2 |   magic  | File format identifier.  Always 0xAF12.
    ///        6 |      2 |  frames  | Number of frames in the FLIC.  This count does not include the ring frame.
    ///        8 |      2 |   width  | Screen width in pixels.
    ///       10 |      2 |   height | Screen height in pixels.
    ///       12 |      2 |   depth  | Bits per pixel (always 8).
    ///       14 |      2 |   flags  | Unused by the player.
    ///       16 |      4 |   speed  | Number of milliseconds to delay between each frame during playback.
    ///       20 |     60 | reserved | Creator, aspect ratio and unused space.
    ///       80 |      4 |  oframe1 | Offset from the beginning of the file to the first animation frame chunk.
    ///       84 |      4 |  oframe2 | Offset of the ring frame.  This value is used when looping back after the last frame during playback.
    ///       88 |     40 | reserved | Unused space, set to zeroes.
    pub fn flc() -> Self {
        HeaderLayout {
            size: SIZE_OF_FLIC_HEADER,
            delay: DelayField::U32(16),
            frame1: Some(80),
            ring: Some(84),
        }
    }

    /// The scripted FLIC header.
    ///
    ///   Offset | Length |   Name   | Description
    ///   ------:| ------:|:--------:| -----------------------------------
    ///        0 |     16 |          | As for the FLC header.
    ///       16 |      2 |   speed  | Number of milliseconds to delay between each frame during playback.
    ///       18 |      2 | reserved | Unused word.
    ///       20 |      4 |  oframe1 | Offset from the beginning of the file to the first animation frame chunk.
    ///
    /// There is no ring frame; scripted animations play once.
    pub fn scripted() -> Self {
        HeaderLayout {
            size: SIZE_OF_SCRIPTED_HEADER,
            delay: DelayField::U16(16),
            frame1: Some(20),
            ring: None,
        }
    }

    /// Check every field lies inside the header.
    pub fn validate(&self) -> FormatResult<()> {
        let (delay_offset, delay_len) = match self.delay {
            DelayField::U16(offset) => (offset, 2),
            DelayField::U32(offset) => (offset, 4),
        };

        let fits = |offset: usize, len: usize| {
            offset >= SIZE_OF_COMMON_HEADER && offset + len <= self.size
        };

        if self.size < SIZE_OF_COMMON_HEADER
                || !fits(delay_offset, delay_len)
                || !self.frame1.map_or(true, |o| fits(o, 4))
                || !self.ring.map_or(true, |o| fits(o, 4)) {
            return Err(FormatError::BadLayout);
        }

        Ok(())
    }
}

impl ExtensionTable {
    /// The scripted frame table: frame type 0xFAF1, carrying command
    /// chunks 0 to 21 whose lengths cover the payload only.
    pub fn scripted() -> Self {
        ExtensionTable {
            frame_type: Some(FCID_SCRIPT),
            frame_chunks: (0..NUM_SCRIPT_COMMANDS).collect(),
            frame_chunk_length: ChunkLength::PayloadOnly,
            standard_chunks: Vec::new(),
        }
    }
}

impl Dialect {
    /// Plain Animator Pro FLC.
    ///
    /// # Examples
    ///
    /// ```
    /// let dialect = flicdec::Dialect::flc();
    /// assert_eq!(dialect.magic, 0xAF12);
    /// assert!(dialect.is_rewindable());
    /// ```
    pub fn flc() -> Self {
        Dialect {
            magic: FLIHR_MAGIC,
            header: HeaderLayout::flc(),
            frame_header: FrameHeaderLayout::Reserved,
            extension: None,
        }
    }

    /// Animator Pro FLC whose frame headers carry delay and dimension
    /// overrides.
    pub fn flc_with_overrides() -> Self {
        Dialect {
            frame_header: FrameHeaderLayout::Overrides,
            ..Dialect::flc()
        }
    }

    /// Scripted FLIC: a short header, frame overrides, no ring frame,
    /// and scripted frames carrying sound and script commands.
    pub fn scripted() -> Self {
        Dialect {
            magic: FLIHR_MAGIC,
            header: HeaderLayout::scripted(),
            frame_header: FrameHeaderLayout::Overrides,
            extension: Some(ExtensionTable::scripted()),
        }
    }

    /// Replace the magic.
    pub fn with_magic(mut self, magic: u16) -> Self {
        self.magic = magic;
        self
    }

    /// Replace the extension table.
    pub fn with_extension(mut self, extension: ExtensionTable) -> Self {
        self.extension = Some(extension);
        self
    }

    /// True if the animation loops back to a ring frame.
    pub fn is_rewindable(&self) -> bool {
        self.header.ring.is_some()
    }

    /// Get the extension table if the frame type belongs to the
    /// extension hook.
    pub fn extension_frame(&self, magic: u16) -> Option<&ExtensionTable> {
        match self.extension {
            Some(ref ext) if ext.frame_type == Some(magic) => Some(ext),
            _ => None,
        }
    }

    /// True if the frame type belongs to the extension hook.
    pub fn is_extension_frame(&self, magic: u16) -> bool {
        self.extension_frame(magic).is_some()
    }

    /// True if a chunk type inside a standard frame belongs to the
    /// extension hook.
    pub fn is_extension_chunk(&self, magic: u16) -> bool {
        match self.extension {
            Some(ref ext) => ext.standard_chunks.contains(&magic),
            None => false,
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::flc()
    }
}
