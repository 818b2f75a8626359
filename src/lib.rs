//! This crate provides routines for decoding Autodesk Animator Pro
//! FLC files, and the game-specific variations built on them.
//!
//! A `Dialect` describes the container layout.  Chunk types the base
//! format does not know are handed to a `ChunkHandler`, which lets an
//! engine pick up sound and script commands without the decoder
//! interpreting them.

pub use crate::dialect::{ChunkLength,DelayField,Dialect,ExtensionTable,FrameHeaderLayout,HeaderLayout};
pub use crate::dirty::{DirtyRects,Rect};
pub use crate::errcode::{DecodeError,DecodeResult,FormatError,FormatResult,HandlerError};
pub use crate::extension::{ChunkHandler,CommandQueue,ExtensionChunk,FrameKind,Handling,IgnoreChunks};
pub use crate::extension::{ScriptedCommand,ScriptedEvent};
pub use crate::flic::{FlicDecoder,FlicHeader,FlicPlaybackResult};
pub use crate::raster::{NUM_COLS,Palette,Raster};

pub mod codec;
pub mod dialect;
pub mod errcode;
pub mod extension;
pub mod flic;

mod dirty;
mod raster;
