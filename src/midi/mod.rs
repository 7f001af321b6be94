//! MIDI side of the bridge
//!
//! This module provides:
//! - [`MidiNoteEvent`], the only message type the bridge forwards
//! - [`decoder`], which turns serial text lines into note events
//! - the [`MidiSink`] trait for output destinations
//! - [`MidirSink`] for real MIDI ports via midir
//!
mod sink;
pub mod decoder;
pub mod midir_sink;

pub use decoder::{decode, DecodeError, Decoded};
pub use midir_sink::{list_output_ports, MidirSink};
pub use sink::{MidiError, MidiNoteEvent, MidiSink, NoteKind, Result};
