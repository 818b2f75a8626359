//! Codec for chunk type 15 = FLI_BRUN.

use std::io::{Cursor,Read};
use byteorder::ReadBytesExt;

use crate::{DecodeError,DecodeResult,DirtyRects,Raster};

/// Magic for a FLI_BRUN chunk - Byte Run Length Compression.
///
/// This chunk contains the entire image in a compressed format.
/// Usually this chunk is used in the first frame of an animation, or
/// within a postage stamp image chunk.
///
/// The data is organized in lines.  Each line contains packets of
/// compressed pixels.  The first line is at the top of the animation,
/// followed by subsequent lines moving downward.
///
/// The first byte of each line is a count of packets in the line.
///
/// Each packet consist of a type/size byte, followed by one or more
/// pixels.  If the packet type is negative it is a count of pixels to
/// be copied from the packet to the animation image.  If the packet
/// type is positive it contains a single pixel which is to be
/// replicated; the absolute value of the packet type is the number of
/// times the pixel is to be replicated.
///
/// Pixels are addressed linearly from the top-left corner.  A packet
/// running past the end of a line continues on the next line, and
/// decoding stops once width x height pixels have been written.
pub const FLI_BRUN: u16 = 15;

/// Decode a FLI_BRUN chunk.
///
/// On success the dirty list holds a single rectangle covering the
/// whole raster.
pub fn decode_fli_brun(src: &[u8], dst: &mut Raster, dirty: &mut DirtyRects)
        -> DecodeResult<()> {
    let mut r = Cursor::new(src);
    let w = dst.width();
    let h = dst.height();
    let buf = dst.pixels_mut();
    let mut x0 = 0;

    while x0 < buf.len() {
        let count = r.read_u8()?;

        for _ in 0..count {
            let signed_length = r.read_i8()? as i32;

            let start = x0;
            let end = start + signed_length.abs() as usize;
            if end > buf.len() {
                return Err(DecodeError::OutOfBounds);
            }

            if signed_length >= 0 {
                let c = r.read_u8()?;
                for e in &mut buf[start..end] {
                    *e = c;
                }
            } else {
                r.read_exact(&mut buf[start..end])?;
            }

            x0 = end;
        }
    }

    dirty.mark_all(w, h);
    Ok(())
}
