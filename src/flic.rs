//! FLIC implementation.

use std::cmp::min;
use std::io::{Read,Seek,SeekFrom};
use byteorder::LittleEndian as LE;
use byteorder::{ByteOrder,ReadBytesExt};
use log::{debug,trace,warn};

use crate::{DecodeError,DecodeResult,FormatError,FormatResult};
use crate::{DirtyRects,Palette,Raster,Rect};
use crate::codec::*;
use crate::dialect::*;
use crate::extension::*;

/// Size of a standard FLIC frame header on disk.
pub const SIZE_OF_FLIC_FRAME: usize = 16;

/// Size of a chunk header on disk.
///
/// Immediately following the frame header are the frame's subordinate
/// data chunks.  When the chunks count in the frame header is zero,
/// it indicates that this frame is identical to the previous frame.
/// This implies that no change is made to the screen or color
/// palette, but the appropriate delay is still inserted during
/// playback.
///
/// Each data chunk within a frame chunk is formatted as follows:
///
///   Offset | Length | Name | Description
///   ------:| ------:|:----:| ---------------------------------------
///        0 |      4 | size | The size of the chunk, including this header.
///        4 |      2 | type | Data type identifier.
///        6 | size-6 | data | The color or pixel data.
///
/// The type values in the chunk headers indicate what type of
/// graphics data the chunk contains and which compression method was
/// used to encode the data.
pub const SIZE_OF_CHUNK: usize = 6;

/// FLIC header.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub struct FlicHeader {
    pub magic: u16,
    pub size: u32,
    pub frame_count: u16,
    pub w: u16,
    pub h: u16,
    pub depth: u16,
    pub speed_msec: u32,
    pub offset_frame1: u64,

    /// Offset of the ring frame, or None if the animation plays once.
    pub offset_ring: Option<u64>,
}

/// Record containing playback information.
#[derive(Clone,Copy,Debug,Default,Eq,PartialEq)]
pub struct FlicPlaybackResult {
    /// The frame just decoded was the last frame of the animation.
    pub ended: bool,

    /// The decoder has moved back to the ring frame.
    pub looped: bool,

    pub palette_updated: bool,
}

/// FLIC animation decoder.
///
/// Holds onto the stream, the raster and the palette until closed or
/// dropped.  The raster and palette are only lent out; the decoder
/// may replace the raster on any decode call.
pub struct FlicDecoder<R, H = IgnoreChunks> {
    hdr: FlicHeader,
    dialect: Dialect,
    handler: H,
    state: Option<FlicState<R>>,
}

/// Everything released on close.
struct FlicState<R> {
    file: R,
    raster: Raster,
    pal: Palette,
    dirty: DirtyRects,
    frame: usize,
    speed_msec: u32,
    finished: bool,
}

/*--------------------------------------------------------------*/

impl<R: Read + Seek> FlicDecoder<R> {
    /// Load an Animator Pro FLC animation.
    ///
    /// The stream must be positioned at the start of the file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use std::io::BufReader;
    ///
    /// let file = BufReader::new(File::open("ex.flc").unwrap());
    /// if let Ok(mut flic) = flicdec::FlicDecoder::load(file) {
    ///     let raster = flic.decode_next_frame();
    /// }
    /// ```
    pub fn load(stream: R)
            -> FormatResult<Self> {
        Self::load_dialect(stream, Dialect::flc())
    }

    /// Load an animation in the given dialect, ignoring any extension
    /// chunks the dialect declares.
    pub fn load_dialect(stream: R, dialect: Dialect)
            -> FormatResult<Self> {
        FlicDecoder::load_with_handler(stream, dialect, IgnoreChunks)
    }
}

impl<R: Read + Seek, H: ChunkHandler> FlicDecoder<R, H> {
    /// Load an animation in the given dialect, passing extension
    /// chunks to the handler.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use std::io::BufReader;
    ///
    /// let file = BufReader::new(File::open("intro.tgp").unwrap());
    /// let mut flic = flicdec::FlicDecoder::load_with_handler(
    ///         file, flicdec::Dialect::scripted(), flicdec::CommandQueue::new()).unwrap();
    ///
    /// while flic.decode_next_frame().is_ok() {
    ///     for event in flic.handler_mut().drain() {
    ///         println!("{:?}", event.command);
    ///     }
    /// }
    /// ```
    pub fn load_with_handler(mut stream: R, dialect: Dialect, handler: H)
            -> FormatResult<Self> {
        let hdr = read_flic_header(&mut stream, &dialect)?;
        stream.seek(SeekFrom::Start(hdr.offset_frame1))?;

        debug!("Loaded {}x{} FLIC, {} frames, {} msec, frame1={}, ring={:?}",
                hdr.w, hdr.h, hdr.frame_count, hdr.speed_msec,
                hdr.offset_frame1, hdr.offset_ring);

        let state = FlicState {
            file: stream,
            raster: Raster::new(hdr.w as usize, hdr.h as usize),
            pal: Palette::new(),
            dirty: DirtyRects::new(),
            frame: 0,
            speed_msec: hdr.speed_msec,
            finished: hdr.frame_count == 0,
        };

        Ok(FlicDecoder {
            hdr: hdr,
            dialect: dialect,
            handler: handler,
            state: Some(state),
        })
    }

    /// Decode the next frame in the FLIC.
    ///
    /// Returns the raster, which is only valid until the next call.
    pub fn decode_next_frame(&mut self)
            -> DecodeResult<&Raster> {
        self.read_next_frame()?;
        match self.state {
            Some(ref state) => Ok(&state.raster),
            None => Err(DecodeError::Closed),
        }
    }

    /// Decode the next frame in the FLIC.
    ///
    /// The raster must contain the previous frame, which it always
    /// does unless the caller rewinds.  The FLIC will loop back to the
    /// ring frame when it reaches the last frame, if the dialect
    /// allows it.
    ///
    /// Returns a record indicating what was processed.
    ///
    /// If an extension handler fails, the rest of the frame is still
    /// decoded and the decoder moves on to the next frame before the
    /// handler's error is returned.
    pub fn read_next_frame(&mut self)
            -> DecodeResult<FlicPlaybackResult> {
        let state = self.state.as_mut().ok_or(DecodeError::Closed)?;
        if state.finished {
            return Err(DecodeError::NoMoreFrames);
        }

        let mut res = FlicPlaybackResult::default();

        let offset = state.file.seek(SeekFrom::Current(0))?;
        let size = state.file.read_u32::<LE>()?;
        let magic = state.file.read_u16::<LE>()?;

        let failure = if magic == FCID_FRAME {
            let failure = read_standard_frame(state, &self.dialect,
                    &mut self.handler, &mut res)?;
            let position = state.file.seek(SeekFrom::Current(0))?;
            check_frame_size(state.frame, offset, size, position);
            failure
        } else {
            match self.dialect.extension_frame(magic) {
                Some(ext) => read_extension_frame(state, ext, &mut self.handler)?,
                None => return Err(DecodeError::UnknownFrameType(magic)),
            }
        };

        let frame_count = self.hdr.frame_count as usize;
        state.frame = state.frame + 1;
        if state.frame >= frame_count {
            res.ended = true;
            match self.hdr.offset_ring {
                Some(ring) => {
                    state.file.seek(SeekFrom::Start(ring))?;
                    state.frame = 0;
                    res.looped = true;
                },
                None => state.finished = true,
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(res),
        }
    }

    /// Move back to the first frame.
    ///
    /// The raster and palette are left as they are, and the frame
    /// delay returns to the nominal delay.
    pub fn rewind(&mut self)
            -> DecodeResult<()> {
        let state = self.state.as_mut().ok_or(DecodeError::Closed)?;
        if !self.dialect.is_rewindable() {
            return Err(DecodeError::NotRewindable);
        }

        state.file.seek(SeekFrom::Start(self.hdr.offset_frame1))?;
        state.frame = 0;
        state.speed_msec = self.hdr.speed_msec;
        state.finished = self.hdr.frame_count == 0;
        Ok(())
    }

    /// Current position in the underlying stream.
    pub fn stream_position(&mut self)
            -> DecodeResult<u64> {
        let state = self.state.as_mut().ok_or(DecodeError::Closed)?;
        Ok(state.file.seek(SeekFrom::Current(0))?)
    }
}

impl<R, H> FlicDecoder<R, H> {
    /// Release the stream, raster and palette.  Closing twice is
    /// harmless.
    pub fn close(&mut self) {
        if self.state.take().is_some() {
            debug!("Closed FLIC");
        }
    }

    /// True if the decoder has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.is_none()
    }

    /// Get the FLIC header.
    pub fn header(&self) -> &FlicHeader {
        &self.hdr
    }

    /// Get the dialect the FLIC was loaded with.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Get the extension chunk handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Get the extension chunk handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Get the next frame number.
    pub fn frame(&self) -> usize {
        match self.state {
            Some(ref state) => state.frame,
            None => 0,
        }
    }

    /// Get the frame count, not including the ring frame.
    pub fn frame_count(&self) -> u16 {
        self.hdr.frame_count
    }

    /// Get the FLIC width, as declared by the file header.
    pub fn width(&self) -> u16 {
        self.hdr.w
    }

    /// Get the FLIC height, as declared by the file header.
    pub fn height(&self) -> u16 {
        self.hdr.h
    }

    /// Nominal number of milliseconds to delay between each frame
    /// during playback.
    pub fn speed_msec(&self) -> u32 {
        self.hdr.speed_msec
    }

    /// Nominal number of jiffies to delay between each frame during
    /// playback.  A jiffy is 1/70 of a second.
    pub fn speed_jiffies(&self) -> u16 {
        min((self.hdr.speed_msec as u64) * 70 / 1000, ::std::u16::MAX as u64) as u16
    }

    /// Number of milliseconds to delay after the most recent frame.
    /// Frames may override the nominal delay.
    pub fn frame_delay_msec(&self) -> u32 {
        match self.state {
            Some(ref state) => state.speed_msec,
            None => self.hdr.speed_msec,
        }
    }

    /// Frames per second for the current frame delay, if it is
    /// non-zero.
    pub fn frame_rate(&self) -> Option<f64> {
        match self.frame_delay_msec() {
            0 => None,
            msec => Some(1000.0 / msec as f64),
        }
    }

    /// True if the FLIC loops back to a ring frame.
    pub fn is_rewindable(&self) -> bool {
        self.hdr.offset_ring.is_some()
    }

    /// True once the last frame of a non-looping FLIC has been
    /// decoded, or the decoder is closed.
    pub fn end_of_animation(&self) -> bool {
        match self.state {
            Some(ref state) => state.finished,
            None => true,
        }
    }

    /// Get the raster.
    pub fn raster(&self) -> Option<&Raster> {
        self.state.as_ref().map(|state| &state.raster)
    }

    /// Get the palette.
    pub fn palette(&self) -> Option<&Palette> {
        self.state.as_ref().map(|state| &state.pal)
    }

    /// True if the palette changed since the flag was last cleared.
    pub fn palette_changed(&self) -> bool {
        match self.state {
            Some(ref state) => state.pal.is_changed(),
            None => false,
        }
    }

    /// Clear the palette changed flag.
    pub fn clear_palette_changed(&mut self) {
        if let Some(ref mut state) = self.state {
            state.pal.clear_changed();
        }
    }

    /// Get the rectangles touched since the list was last cleared.
    pub fn dirty_rects(&self) -> &[Rect] {
        match self.state {
            Some(ref state) => state.dirty.as_slice(),
            None => &[],
        }
    }

    /// Remove and return the dirty rectangles.
    pub fn take_dirty_rects(&mut self) -> Vec<Rect> {
        match self.state {
            Some(ref mut state) => state.dirty.take(),
            None => Vec::new(),
        }
    }

    pub fn clear_dirty_rects(&mut self) {
        if let Some(ref mut state) = self.state {
            state.dirty.clear();
        }
    }

    /// Copy the dirty regions of the raster into a caller surface,
    /// then clear the dirty rectangles.
    pub fn copy_dirty_rects_to_buffer(&mut self, dst: &mut [u8], pitch: usize) {
        if let Some(ref mut state) = self.state {
            state.dirty.copy_to_buffer(&state.raster, dst, pitch);
        }
    }
}

/*--------------------------------------------------------------*/

/// Read the FLIC's header.
fn read_flic_header<R: Read>(r: &mut R, dialect: &Dialect)
        -> FormatResult<FlicHeader> {
    let layout = &dialect.header;
    layout.validate()?;

    let mut buf = vec![0; layout.size];
    r.read_exact(&mut buf)?;

    let size = LE::read_u32(&buf[0..4]);
    let magic = LE::read_u16(&buf[4..6]);
    if magic != dialect.magic {
        return Err(FormatError::BadMagic(magic, dialect.magic));
    }

    let frame_count = LE::read_u16(&buf[6..8]);
    let width = LE::read_u16(&buf[8..10]);
    let height = LE::read_u16(&buf[10..12]);
    let depth = LE::read_u16(&buf[12..14]);
    let _flags = LE::read_u16(&buf[14..16]);

    if depth != 8 {
        return Err(FormatError::UnsupportedColorDepth(depth));
    }
    if width == 0 || height == 0 {
        return Err(FormatError::BadDimensions(width, height));
    }

    let speed_msec = match layout.delay {
        DelayField::U16(offset) => LE::read_u16(&buf[offset..]) as u32,
        DelayField::U32(offset) => LE::read_u32(&buf[offset..]),
    };

    // Some writers leave the offsets as 0 and expect the reader to
    // compute them.
    let offset_frame1 = match layout.frame1 {
        Some(offset) => match LE::read_u32(&buf[offset..]) {
            0 => {
                warn!("First frame offset is 0, assuming {}", layout.size);
                layout.size as u64
            },
            o => o as u64,
        },
        None => layout.size as u64,
    };

    let offset_ring = match layout.ring {
        Some(offset) => match LE::read_u32(&buf[offset..]) {
            0 => {
                warn!("Ring frame offset is 0, assuming {}", offset_frame1);
                Some(offset_frame1)
            },
            o => Some(o as u64),
        },
        None => None,
    };

    Ok(FlicHeader {
        magic: magic,
        size: size,
        frame_count: frame_count,
        w: width,
        h: height,
        depth: depth,
        speed_msec: speed_msec,
        offset_frame1: offset_frame1,
        offset_ring: offset_ring,
    })
}

/// Read and decode a standard frame, after its size and type.
///
/// Returns the first extension handler failure, if any.
fn read_standard_frame<R: Read + Seek, H: ChunkHandler>(
        state: &mut FlicState<R>, dialect: &Dialect, handler: &mut H,
        res: &mut FlicPlaybackResult)
        -> DecodeResult<Option<DecodeError>> {
    let num_chunks = state.file.read_u16::<LE>()?;

    let mut buf = [0; SIZE_OF_FLIC_FRAME - 8];
    state.file.read_exact(&mut buf)?;
    if dialect.frame_header == FrameHeaderLayout::Overrides {
        apply_frame_overrides(state, &buf);
    }

    let mut failure = None;

    for _ in 0..num_chunks {
        let size = state.file.read_u32::<LE>()?;
        let magic = state.file.read_u16::<LE>()?;

        // Never trust the length of a chunk we cannot identify.
        if !is_base_chunk(magic) && !dialect.is_extension_chunk(magic) {
            return Err(DecodeError::UnknownSubchunkType(magic));
        }
        if size < SIZE_OF_CHUNK as u32 {
            return Err(DecodeError::BadChunkLength(magic, size));
        }

        let payload = read_payload(&mut state.file, size - SIZE_OF_CHUNK as u32)?;
        trace!("Frame {} - chunk {}, {} bytes", state.frame, magic, payload.len());

        match decode_chunk(magic, &payload,
                &mut state.raster, &mut state.pal, &mut state.dirty)? {
            ChunkOutcome::Applied => {
                if chunk_modifies_palette(magic) {
                    res.palette_updated = true;
                }
            },
            ChunkOutcome::Skipped => (),
            ChunkOutcome::Unrecognised => {
                let chunk = ExtensionChunk {
                    frame: state.frame,
                    kind: FrameKind::Standard,
                    magic: magic,
                    payload: &payload,
                };
                run_handler(handler, chunk, &mut failure)?;
            },
        }
    }

    Ok(failure)
}

/// Read an extension frame, after its size and type, passing every
/// chunk to the handler.
///
/// Returns the first extension handler failure, if any.
fn read_extension_frame<R: Read, H: ChunkHandler>(
        state: &mut FlicState<R>, ext: &ExtensionTable, handler: &mut H)
        -> DecodeResult<Option<DecodeError>> {
    let num_chunks = state.file.read_u16::<LE>()?;
    let mut failure = None;

    for _ in 0..num_chunks {
        let size = state.file.read_u32::<LE>()?;
        let magic = state.file.read_u16::<LE>()?;

        if !ext.frame_chunks.contains(&magic) {
            return Err(DecodeError::UnknownSubchunkType(magic));
        }

        let len = match ext.frame_chunk_length {
            ChunkLength::IncludesHeader => {
                if size < SIZE_OF_CHUNK as u32 {
                    return Err(DecodeError::BadChunkLength(magic, size));
                }
                size - SIZE_OF_CHUNK as u32
            },
            ChunkLength::PayloadOnly => size,
        };

        let payload = read_payload(&mut state.file, len)?;
        trace!("Frame {} - extension chunk {}, {} bytes", state.frame, magic, payload.len());

        let chunk = ExtensionChunk {
            frame: state.frame,
            kind: FrameKind::Extension,
            magic: magic,
            payload: &payload,
        };
        run_handler(handler, chunk, &mut failure)?;
    }

    Ok(failure)
}

/// Apply the delay and dimension overrides in a standard frame
/// header.
fn apply_frame_overrides<R>(state: &mut FlicState<R>, buf: &[u8]) {
    let speed = LE::read_u16(&buf[0..2]);
    let _reserved = LE::read_u16(&buf[2..4]);
    let w = LE::read_u16(&buf[4..6]);
    let h = LE::read_u16(&buf[6..8]);

    if speed > 0 {
        state.speed_msec = speed as u32;
    }

    if w != 0 || h != 0 {
        let w = if w == 0 { state.raster.width() } else { w as usize };
        let h = if h == 0 { state.raster.height() } else { h as usize };

        debug!("Frame {} - raster reallocated to {}x{}", state.frame, w, h);
        state.raster = Raster::new(w, h);
        state.dirty.mark_all(w, h);
    }
}

/// Pass a chunk to the extension handler.  A handler failure is kept
/// in `failure` so the frame can be finished first.
fn run_handler<H: ChunkHandler>(
        handler: &mut H, chunk: ExtensionChunk, failure: &mut Option<DecodeError>)
        -> DecodeResult<()> {
    match handler.handle(chunk) {
        Ok(Handling::Handled) => Ok(()),
        Ok(Handling::Unrecognised) => Err(DecodeError::UnknownSubchunkType(chunk.magic)),
        Err(err) => {
            warn!("Frame {} - extension chunk {} failed: {}", chunk.frame, chunk.magic, err);
            if failure.is_none() {
                *failure = Some(DecodeError::Extension(chunk.frame, chunk.magic, err));
            }
            Ok(())
        },
    }
}

/// Read a chunk's payload.
fn read_payload<R: Read>(r: &mut R, len: u32)
        -> DecodeResult<Vec<u8>> {
    let mut buf = Vec::new();
    r.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len as usize {
        return Err(DecodeError::Truncated);
    }

    Ok(buf)
}

/// Warn if a frame's chunks did not add up to the frame size.
fn check_frame_size(frame: usize, offset: u64, size: u32, position: u64) {
    let expected = offset + size as u64;
    if position > expected {
        warn!("Frame {} reads too much - current offset={}, expected offset={}",
                frame, position, expected);
    } else if position < expected {
        warn!("Frame {} reads too little - current offset={}, expected offset={}",
                frame, position, expected);
    }
}
