//! Codec for chunk type 7 = FLI_SS2.

use std::io::{Cursor,Read};
use byteorder::LittleEndian as LE;
use byteorder::ReadBytesExt;
use log::trace;

use crate::{DecodeError,DecodeResult,DirtyRects,Raster,Rect};

/// Magic for a FLI_SS2 chunk - Word Aligned Delta Compression.
///
/// This format contains the differences between consecutive frames.
/// This is the format most often used by Animator Pro for frames
/// other than the first frame of an animation.  The data is organized
/// into lines and each line is organized into packets.
///
/// The first word in the data following the chunk header contains the
/// number of lines in the chunk.  Each line can begin with some
/// optional words that are used to skip lines and set the last byte
/// in the line for animations with odd widths.  These optional words
/// are followed by a count of the packets in the line.  The line
/// count does not include skipped lines.
///
/// The high order two bits of the word is used to determine the
/// contents of the word.
///
///   Bit 15 | Bit 14 | Meaning
///  :------:|:------:| ----------------------------------------------
///      0   |    0   | The word contains the packet count.  The packets follow this word.  The packet count can be zero; this occurs when only the last pixel on a line changes.
///      0   |    1   | Undefined.  The word is read and ignored.
///      1   |    0   | The low order byte is to be stored in the last byte of the current line.  More words follow.
///      1   |    1   | The word contains a line skip count.  The number of lines skipped is given by the absolute value of the word.  This word can be followed by more skip counts, by a last byte word, or by the packet count.
///
/// The first byte of each packet is a column skip count.  The second
/// byte is a packet type.  If the packet type is positive, the packet
/// type is a count of words to be copied from the packet to the
/// animation image.  If the packet type is negative, the packet
/// contains one more word which is to be replicated.  The absolute
/// value of the packet type gives the number of times the word is to
/// be replicated.  The high and low order byte in the replicated word
/// do not necessarily have the same value.
///
/// A packet type of zero marks the end of the chunk's data; nothing
/// more is applied for the rest of the frame.
pub const FLI_SS2: u16 = 7;

const SS2_PACKET_COUNT: u16 = 0;
const SS2_UNDEFINED: u16 = 1;
const SS2_LAST_PIXEL: u16 = 2;
const SS2_LINE_SKIP: u16 = 3;

/// Decode a FLI_SS2 chunk.
///
/// The raster must contain the previous frame.  Every edited span is
/// recorded in the dirty list.
pub fn decode_fli_ss2(src: &[u8], dst: &mut Raster, dirty: &mut DirtyRects)
        -> DecodeResult<()> {
    let mut r = Cursor::new(src);
    let w = dst.width();
    let h = dst.height();
    let buf = dst.pixels_mut();
    let mut y = 0;

    let lines = r.read_u16::<LE>()?;
    for _ in 0..lines {
        let count = loop {
            let opcode = r.read_u16::<LE>()?;
            match opcode >> 14 {
                SS2_PACKET_COUNT => break opcode & 0x3FFF,
                SS2_UNDEFINED => (),
                SS2_LAST_PIXEL => {
                    if y >= h || w == 0 {
                        return Err(DecodeError::OutOfBounds);
                    }

                    buf[w * y + w - 1] = opcode as u8;
                    dirty.push(Rect::new(w - 1, y, w, y + 1));
                },
                SS2_LINE_SKIP => {
                    y = y + (-((opcode as i16) as i32)) as usize;
                },
                _ => unreachable!(),
            }
        };

        let mut x0 = 0;
        for _ in 0..count {
            let nskip = r.read_u8()? as usize;
            let signed_length = r.read_i8()? as i32;

            if signed_length == 0 {
                trace!("FLI_SS2: end of data at line {}", y);
                return Ok(());
            }

            let start = x0 + nskip;
            let end = start + 2 * signed_length.abs() as usize;
            if y >= h || end > w {
                return Err(DecodeError::OutOfBounds);
            }

            let row = &mut buf[(w * y)..(w * y + w)];
            if signed_length > 0 {
                r.read_exact(&mut row[start..end])?;
            } else {
                let c0 = r.read_u8()?;
                let c1 = r.read_u8()?;
                for e in row[start..end].chunks_mut(2) {
                    e[0] = c0;
                    e[1] = c1;
                }
            }

            dirty.push(Rect::new(start, y, end, y + 1));
            x0 = end;
        }

        y = y + 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{DecodeError,DirtyRects,Raster,Rect};
    use super::*;

    #[test]
    fn test_decode_fli_ss2() {
        let src = [
            0x02, 0x00, // hh 2
            0x02, 0x00, // count 2
            3, 5,       // skip 3, length 5
            0x01, 0x12, 0x23, 0x34, 0x45, 0x56, 0x67, 0x78, 0x89, 0x90,
            2, (-4i8) as u8,    // skip 2, length -4
            0xAB, 0xCD,
            0xFF, 0xFF, // skip 1 line
            0xEE, 0x80, // bit15 = 1, bit14 = 0, data = 0xEE
            0x00, 0x00, // count 0
        ];
        let expected = [
            0x00, 0x00, 0x00,
            0x01, 0x12, 0x23, 0x34, 0x45, 0x56, 0x67, 0x78, 0x89, 0x90,
            0x00, 0x00,
            0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD,
        ];

        const SCREEN_W: usize = 320;
        const SCREEN_H: usize = 200;
        let mut raster = Raster::new(SCREEN_W, SCREEN_H);
        let mut dirty = DirtyRects::new();

        let res = decode_fli_ss2(&src, &mut raster, &mut dirty);
        assert!(res.is_ok());
        assert_eq!(&raster.pixels()[0..23], &expected[..]);
        assert_eq!(raster.pixels()[(SCREEN_W * 2) + (SCREEN_W - 1)], 0xEE);

        assert_eq!(dirty.as_slice(), &[
            Rect::new(3, 0, 13, 1),
            Rect::new(15, 0, 23, 1),
            Rect::new(SCREEN_W - 1, 2, SCREEN_W, 3) ]);
    }

    #[test]
    fn test_decode_fli_ss2_undefined_opcode_ignored() {
        let src = [
            0x01, 0x00, // hh 1
            0x34, 0x52, // bit15 = 0, bit14 = 1, ignored
            0x01, 0x00, // count 1
            0, 1,       // skip 0, length 1
            0x09, 0x09 ];

        let mut raster = Raster::new(4, 2);
        let mut dirty = DirtyRects::new();

        let res = decode_fli_ss2(&src, &mut raster, &mut dirty);
        assert!(res.is_ok());
        assert_eq!(raster.pixels(), &[9, 9, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_fli_ss2_rows_touched() {
        let src = [
            0x02, 0x00, // hh 2
            0xFD, 0xFF, // skip 3 lines
            0x01, 0x00, // count 1
            2, 1,       // skip 2, length 1
            0x11, 0x22,
            0xFD, 0xFF, // skip 3 lines
            0x01, 0x00, // count 1
            0, (-2i8) as u8,    // skip 0, length -2
            0x33, 0x44 ];

        const SCREEN_W: usize = 8;
        const SCREEN_H: usize = 10;
        let mut raster = Raster::new(SCREEN_W, SCREEN_H);
        let mut dirty = DirtyRects::new();

        let res = decode_fli_ss2(&src, &mut raster, &mut dirty);
        assert!(res.is_ok());

        let mut rows: Vec<usize> = dirty.as_slice().iter()
            .flat_map(|r| r.top..r.bottom)
            .collect();
        rows.dedup();
        assert_eq!(rows, vec![3, 7]);

        assert_eq!(raster.row(3), &[0, 0, 0x11, 0x22, 0, 0, 0, 0]);
        assert_eq!(raster.row(7), &[0x33, 0x44, 0x33, 0x44, 0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_fli_ss2_zero_length_ends_frame() {
        let src = [
            0x02, 0x00, // hh 2
            0x02, 0x00, // count 2
            0, 1,       // skip 0, length 1
            0x05, 0x06,
            0, 0,       // end of data
            0x01, 0x00, // never read
            0, 1,
            0x07, 0x08 ];

        let mut raster = Raster::new(4, 2);
        let mut dirty = DirtyRects::new();

        let res = decode_fli_ss2(&src, &mut raster, &mut dirty);
        assert!(res.is_ok());
        assert_eq!(raster.pixels(), &[5, 6, 0, 0, 0, 0, 0, 0]);
        assert_eq!(dirty.as_slice(), &[Rect::new(0, 0, 2, 1)]);
    }

    #[test]
    fn test_decode_fli_ss2_truncated() {
        let src = [
            0x01, 0x00, // hh 1
            0x01, 0x00, // count 1
            0, 2,       // skip 0, length 2
            0x05, 0x06 ];

        let mut raster = Raster::new(4, 2);
        let mut dirty = DirtyRects::new();

        match decode_fli_ss2(&src, &mut raster, &mut dirty) {
            Err(DecodeError::Truncated) => (),
            res => panic!("unexpected {:?}", res),
        }
    }

    #[test]
    fn test_decode_fli_ss2_past_last_line() {
        let src = [
            0x01, 0x00, // hh 1
            0xFE, 0xFF, // skip 2 lines
            0x01, 0x00, // count 1
            0, 1,       // skip 0, length 1
            0x05, 0x06 ];

        let mut raster = Raster::new(4, 2);
        let mut dirty = DirtyRects::new();

        match decode_fli_ss2(&src, &mut raster, &mut dirty) {
            Err(DecodeError::OutOfBounds) => (),
            res => panic!("unexpected {:?}", res),
        }
    }
}
