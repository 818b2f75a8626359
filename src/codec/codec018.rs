//! Codec for chunk type 18 = FLI_PSTAMP.

use byteorder::ByteOrder;
use byteorder::LittleEndian as LE;
use log::debug;

/// Magic for a FLI_PSTAMP chunk - Postage Stamp Image.
///
/// This chunk type holds a postage stamp -- a reduced-size image --
/// of the frame.  It generally appears only in the first frame chunk
/// within a FLIC file.  The image is only a preview for file
/// browsers, so the player skips over it.
///
/// When a frame data chunk has been identified as a postage stamp,
/// the header for the chunk contains more fields than just size and
/// type.  The full postage stamp chunk header is defined as follows:
///
///   Offset | Length |  Name  | Description
///   ------:| ------:|:------:| -------------------------------------
///        0 |      4 |  size  | The size of the postage stamp chunk, including this header.
///        4 |      2 |  type  | Postage stamp identifier; always 18.
///        6 |      2 | height | Height of the postage stamp image, in pixels.
///        8 |      2 |  width | Width of the postage stamp image, in pixels.
///       10 |      2 |  xlate | Color translation type; always 1, indicating six-cube color space.
pub const FLI_PSTAMP: u16 = 18;

/// Skip a FLI_PSTAMP chunk.  The payload is never interpreted, and a
/// malformed postage stamp is not an error.
pub fn skip_fli_pstamp(src: &[u8]) {
    if src.len() >= 4 {
        debug!("FLI_PSTAMP: skipping {}x{} postage stamp, {} bytes",
                LE::read_u16(&src[2..4]), LE::read_u16(&src[0..2]), src.len());
    } else {
        debug!("FLI_PSTAMP: skipping {} bytes", src.len());
    }
}
