//! Codec for chunk type 4 = FLI_COLOR256.

use std::io::{Cursor,Read};
use byteorder::LittleEndian as LE;
use byteorder::{ByteOrder,ReadBytesExt};
use log::trace;

use crate::{DecodeError,DecodeResult,Palette};

/// Magic for a FLI_COLOR256 chunk - 256-Level Color.
///
/// The data in this chunk is organized in packets.  The first word
/// following the chunk header is a count of the number of packets in
/// the chunk.
///
/// Each packet consists of a one-byte color index skip count, a
/// one-byte color count and three bytes of color information for each
/// color defined.
///
/// At the start of the chunk, the color index is assumed to be zero.
/// Before processing any colors in a packet, the color index skip
/// count is added to the current color index.  After the packet's
/// colors are copied, the color index moves past them.  The three
/// bytes for each color define the red, green, and blue components of
/// the color in that order.  The data to change colors 2, 7, 8, and 9
/// would appear as follows:
///
/// ```text
///     2                       ; two packets
///     2,1,r,g,b               ; skip 2, change 1
///     4,3,r,g,b,r,g,b,r,g,b   ; skip 4, change 3
/// ```
///
/// If the word following the packet count is zero, the chunk replaces
/// the entire palette and all 256 colors follow, whatever the packet
/// count says.
pub const FLI_COLOR256: u16 = 4;

/// Decode a FLI_COLOR256 chunk.
///
/// The palette is flagged as changed whenever this runs, even if no
/// color actually differs.
pub fn decode_fli_color256(src: &[u8], pal: &mut Palette)
        -> DecodeResult<()> {
    let mut r = Cursor::new(src);
    pal.mark_changed();

    let count = r.read_u16::<LE>()?;

    let pos = r.position() as usize;
    if src.len() >= pos + 2 && LE::read_u16(&src[pos..]) == 0 {
        trace!("FLI_COLOR256: full palette");
        r.set_position((pos + 2) as u64);
        r.read_exact(pal.as_bytes_mut())?;
        return Ok(());
    }

    let dst = pal.as_bytes_mut();
    let mut idx0 = 0;
    for _ in 0..count {
        let nskip = r.read_u8()? as usize;
        let ncopy = r.read_u8()? as usize;

        let start = 3 * (idx0 + nskip);
        let end = start + 3 * ncopy;
        if end > dst.len() {
            return Err(DecodeError::OutOfBounds);
        }

        r.read_exact(&mut dst[start..end])?;

        idx0 = idx0 + nskip + ncopy;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{DecodeError,Palette};
    use super::*;

    #[test]
    fn test_decode_fli_color256() {
        let src = [
            0x02, 0x00, // count 2
            1, 2,       // skip 1, copy 2
            0x0A, 0x0B, 0x0C, 0x1A, 0x1B, 0x1C,
            3, 4,       // skip 3, copy 4
            0x2A, 0x2B, 0x2C, 0x3A, 0x3B, 0x3C, 0x4A, 0x4B, 0x4C, 0x5A, 0x5B, 0x5C ];

        let expected = [
            0x00, 0x00, 0x00,
            0x0A, 0x0B, 0x0C, 0x1A, 0x1B, 0x1C,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x2A, 0x2B, 0x2C, 0x3A, 0x3B, 0x3C, 0x4A, 0x4B, 0x4C, 0x5A, 0x5B, 0x5C,
            0x00, 0x00, 0x00 ];

        let mut pal = Palette::new();

        let res = decode_fli_color256(&src, &mut pal);
        assert!(res.is_ok());
        assert_eq!(&pal.as_bytes()[0..33], &expected[..]);
        assert!(pal.is_changed());
    }

    #[test]
    fn test_decode_fli_color256_partial_keeps_others() {
        let src = [
            0x01, 0x00, // count 1
            10, 2,      // skip 10, copy 2
            0x11, 0x12, 0x13, 0x21, 0x22, 0x23 ];

        let mut pal = Palette::new();
        for e in pal.as_bytes_mut().iter_mut() {
            *e = 0x77;
        }
        let before = pal.as_bytes().to_vec();

        let res = decode_fli_color256(&src, &mut pal);
        assert!(res.is_ok());

        assert_eq!(pal.rgb(10), [0x11, 0x12, 0x13]);
        assert_eq!(pal.rgb(11), [0x21, 0x22, 0x23]);
        for c in (0..256).filter(|&c| c != 10 && c != 11) {
            let i = 3 * c;
            assert_eq!(&pal.as_bytes()[i..(i + 3)], &before[i..(i + 3)]);
        }
    }

    #[test]
    fn test_decode_fli_color256_full() {
        let mut src = vec![
            0x01, 0x00, // count 1
            0, 0 ];     // skip 0, copy 256
        for c in 0..256 {
            src.push(c as u8);
            src.push(!(c as u8));
            src.push(0x40);
        }

        // Same values as already present; still flagged.
        let mut pal = Palette::new();
        decode_fli_color256(&src, &mut pal).expect("decode");
        pal.clear_changed();

        let res = decode_fli_color256(&src, &mut pal);
        assert!(res.is_ok());
        assert!(pal.is_changed());
        assert_eq!(&pal.as_bytes()[..], &src[4..]);
    }

    #[test]
    fn test_decode_fli_color256_full_zero_count() {
        let mut src = vec![
            0x00, 0x00, // count 0
            0x00, 0x00 ];   // full palette
        for c in 0..256 {
            src.extend_from_slice(&[ c as u8, c as u8, c as u8 ]);
        }

        let mut pal = Palette::new();
        let res = decode_fli_color256(&src, &mut pal);
        assert!(res.is_ok());
        assert_eq!(pal.rgb(200), [200, 200, 200]);
        assert_eq!(pal.rgb(255), [255, 255, 255]);
    }

    #[test]
    fn test_decode_fli_color256_empty() {
        let src = [
            0x00, 0x00 ];   // count 0

        let mut pal = Palette::new();
        let res = decode_fli_color256(&src, &mut pal);
        assert!(res.is_ok());
        assert!(pal.is_changed());
        assert_eq!(pal.rgb(0), [0, 0, 0]);
    }

    #[test]
    fn test_decode_fli_color256_overflow() {
        let src = [
            0x01, 0x00, // count 1
            255, 2,     // skip 255, copy 2
            0, 0, 0, 0, 0, 0 ];

        let mut pal = Palette::new();
        match decode_fli_color256(&src, &mut pal) {
            Err(DecodeError::OutOfBounds) => (),
            res => panic!("unexpected {:?}", res),
        }
    }

    #[test]
    fn test_decode_fli_color256_truncated() {
        let src = [
            0x01, 0x00, // count 1
            0, 0,       // full palette, but no data
            0x01, 0x02, 0x03 ];

        let mut pal = Palette::new();
        match decode_fli_color256(&src, &mut pal) {
            Err(DecodeError::Truncated) => (),
            res => panic!("unexpected {:?}", res),
        }
    }
}
