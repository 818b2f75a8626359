//! Extension hook for title-specific chunks.
//!
//! Chunks listed in a dialect's `ExtensionTable` are handed, raw, to a
//! `ChunkHandler` supplied by the embedding engine.  The decoder never
//! interprets them.

use std::collections::VecDeque;

use log::debug;

use crate::HandlerError;

/// The kind of frame an extension chunk was found in.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum FrameKind {
    Standard,
    Extension,
}

/// An extension chunk, as handed to a `ChunkHandler`.
#[derive(Clone,Copy,Debug)]
pub struct ExtensionChunk<'a> {
    /// Index of the frame being decoded.
    pub frame: usize,
    pub kind: FrameKind,
    pub magic: u16,
    pub payload: &'a [u8],
}

/// What a handler did with a chunk.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum Handling {
    Handled,

    /// The handler does not know the chunk.  The decoder treats this
    /// as an unknown chunk type.
    Unrecognised,
}

/// Strategy invoked for extension chunks.
///
/// Returning an error does not undo anything already applied to the
/// raster or palette; the decoder finishes the frame and then reports
/// the error.
pub trait ChunkHandler {
    fn handle(&mut self, chunk: ExtensionChunk)
            -> Result<Handling, HandlerError>;
}

/// Handler that accepts and discards every chunk the dialect routes to
/// it.
#[derive(Clone,Copy,Debug,Default)]
pub struct IgnoreChunks;

/// Commands carried by a scripted frame.
#[derive(Clone,Copy,Debug,Eq,PartialEq,Hash)]
pub enum ScriptedCommand {
    FadeIn,
    FadeOut,
    LoadMusic,
    LoadRaw,
    LoadVoc,
    PlayMusic,
    PlaySeq,
    PlayPattern,
    StopMusic,
    WaitMusicEnd,
    SetMusicVolume,
    SetLoopMode,
    PlayRaw,
    PlayVoc,
    SetSoundVolume,
    SetChannelVolume,
    FreeSoundEffect,
    MusicFadeIn,
    MusicFadeOut,
    SetBalance,
    SetSpeed,
    ClearScreen,
}

/// A scripted command, with the frame it was found in.
#[derive(Clone,Debug,Eq,PartialEq)]
pub struct ScriptedEvent {
    pub frame: usize,
    pub command: ScriptedCommand,
    pub payload: Vec<u8>,
}

/// Handler that queues scripted commands for the host to drain.
#[derive(Clone,Debug,Default)]
pub struct CommandQueue {
    events: VecDeque<ScriptedEvent>,
}

/*--------------------------------------------------------------*/

impl<'a, H: ChunkHandler + ?Sized> ChunkHandler for &'a mut H {
    fn handle(&mut self, chunk: ExtensionChunk)
            -> Result<Handling, HandlerError> {
        (**self).handle(chunk)
    }
}

impl<H: ChunkHandler + ?Sized> ChunkHandler for Box<H> {
    fn handle(&mut self, chunk: ExtensionChunk)
            -> Result<Handling, HandlerError> {
        (**self).handle(chunk)
    }
}

impl ChunkHandler for IgnoreChunks {
    fn handle(&mut self, chunk: ExtensionChunk)
            -> Result<Handling, HandlerError> {
        debug!("Frame {} - ignoring extension chunk {}, {} bytes",
                chunk.frame, chunk.magic, chunk.payload.len());
        Ok(Handling::Handled)
    }
}

impl ScriptedCommand {
    /// Look up the command for a chunk type.
    pub fn from_magic(magic: u16) -> Option<Self> {
        use self::ScriptedCommand::*;
        let cmd = match magic {
            0 => FadeIn,
            1 => FadeOut,
            2 => LoadMusic,
            3 => LoadRaw,
            4 => LoadVoc,
            5 => PlayMusic,
            6 => PlaySeq,
            7 => PlayPattern,
            8 => StopMusic,
            9 => WaitMusicEnd,
            10 => SetMusicVolume,
            11 => SetLoopMode,
            12 => PlayRaw,
            13 => PlayVoc,
            14 => SetSoundVolume,
            15 => SetChannelVolume,
            16 => FreeSoundEffect,
            17 => MusicFadeIn,
            18 => MusicFadeOut,
            19 => SetBalance,
            20 => SetSpeed,
            21 => ClearScreen,
            _ => return None,
        };

        Some(cmd)
    }

    /// The chunk type for the command.
    pub fn magic(self) -> u16 {
        self as u16
    }

    /// True for the palette fade commands.
    pub fn is_fade(self) -> bool {
        match self {
            ScriptedCommand::FadeIn | ScriptedCommand::FadeOut => true,
            _ => false,
        }
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        CommandQueue {
            events: VecDeque::new(),
        }
    }

    /// Remove and return the oldest queued command.
    pub fn pop(&mut self) -> Option<ScriptedEvent> {
        self.events.pop_front()
    }

    /// Remove and return every queued command, oldest first.
    pub fn drain(&mut self) -> Vec<ScriptedEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl ChunkHandler for CommandQueue {
    fn handle(&mut self, chunk: ExtensionChunk)
            -> Result<Handling, HandlerError> {
        if chunk.kind != FrameKind::Extension {
            return Ok(Handling::Unrecognised);
        }

        match ScriptedCommand::from_magic(chunk.magic) {
            Some(command) => {
                self.events.push_back(ScriptedEvent {
                    frame: chunk.frame,
                    command: command,
                    payload: chunk.payload.to_vec(),
                });
                Ok(Handling::Handled)
            },
            None => Ok(Handling::Unrecognised),
        }
    }
}
