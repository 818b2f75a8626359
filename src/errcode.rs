//! FLIC error codes.

use std::error;
use std::io;

use quick_error::quick_error;

pub type FormatResult<T> = Result<T, FormatError>;
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Error raised by an extension chunk handler.
pub type HandlerError = Box<dyn error::Error + Send + Sync>;

quick_error! {
    /// Errors raised while loading a FLIC container.  No decoder is
    /// returned when any of these occur.
    #[derive(Debug)]
    pub enum FormatError {
        BadMagic(found: u16, expected: u16) {
            display("Bad magic 0x{:04X}, expected 0x{:04X}", found, expected)
        }
        UnsupportedColorDepth(depth: u16) {
            display("Unsupported colour depth {}", depth)
        }
        BadDimensions(w: u16, h: u16) {
            display("Bad dimensions {}x{}", w, h)
        }
        BadLayout {
            display("Header layout does not fit inside the header")
        }
        TruncatedHeader {
            display("Truncated header")
        }
        Io(err: io::Error) {
            display("IO error: {}", err)
            source(err)
        }
    }
}

quick_error! {
    /// Errors raised while decoding a frame.  These are fatal to the
    /// current decode call.
    #[derive(Debug)]
    pub enum DecodeError {
        UnknownFrameType(magic: u16) {
            display("Unknown frame type 0x{:04X}", magic)
        }
        UnknownSubchunkType(magic: u16) {
            display("Unknown chunk type {}", magic)
        }
        BadChunkLength(magic: u16, size: u32) {
            display("Chunk type {} has bad length {}", magic, size)
        }
        Truncated {
            display("Premature end of chunk data")
        }
        OutOfBounds {
            display("Chunk data writes outside the raster")
        }
        Extension(frame: usize, magic: u16, err: HandlerError) {
            display("Frame {} - extension chunk {} failed: {}", frame, magic, err)
            source(&**err)
        }
        NotRewindable {
            display("Animation cannot be rewound")
        }
        NoMoreFrames {
            display("No more frames")
        }
        Closed {
            display("Decoder is closed")
        }
        Io(err: io::Error) {
            display("IO error: {}", err)
            source(err)
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> FormatError {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => FormatError::TruncatedHeader,
            _ => FormatError::Io(err),
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> DecodeError {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::Truncated,
            _ => DecodeError::Io(err),
        }
    }
}
