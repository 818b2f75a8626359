//! FLIC decoding subroutines.

macro_rules! module {
    ($e:ident) => {
        pub use self::$e::*;
        mod $e;
    };
}

use crate::{DecodeResult,DirtyRects,Palette,Raster};

module!(codec004);
module!(codec007);
module!(codec015);
module!(codec018);

/*--------------------------------------------------------------*/

/// What the base chunk table did with a chunk.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum ChunkOutcome {
    /// The chunk was decoded into the raster or palette.
    Applied,

    /// The chunk type is known but carries nothing for playback.
    Skipped,

    /// The chunk type is not part of the base format.
    Unrecognised,
}

/// Returns true if the chunk type belongs to the base format.
pub fn is_base_chunk(magic: u16)
        -> bool {
    match magic {
        FLI_COLOR256 | FLI_SS2 | FLI_BRUN | FLI_PSTAMP => true,
        _ => false,
    }
}

/// Returns true if the chunk type modifies the palette.
pub fn chunk_modifies_palette(magic: u16)
        -> bool {
    magic == FLI_COLOR256
}

/// Decode a chunk, based on the chunk type.
///
/// Unknown chunk types are reported as `ChunkOutcome::Unrecognised`
/// and leave the raster and palette untouched; the caller decides
/// whether that is fatal.
pub fn decode_chunk(magic: u16, buf: &[u8],
        raster: &mut Raster, pal: &mut Palette, dirty: &mut DirtyRects)
        -> DecodeResult<ChunkOutcome> {
    match magic {
        FLI_COLOR256 => decode_fli_color256(buf, pal)?,
        FLI_SS2 => decode_fli_ss2(buf, raster, dirty)?,
        FLI_BRUN => decode_fli_brun(buf, raster, dirty)?,
        FLI_PSTAMP => {
            skip_fli_pstamp(buf);
            return Ok(ChunkOutcome::Skipped);
        },
        _ => return Ok(ChunkOutcome::Unrecognised),
    }

    Ok(ChunkOutcome::Applied)
}
