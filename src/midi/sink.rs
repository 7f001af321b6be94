use std::error::Error;
use std::fmt;

/// Custom error type for MIDI output operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiError {
    /// Error when sending a note event to the destination
    SendError(String),
    /// Error when connecting to a MIDI destination
    ConnectionError(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
        }
    }
}

impl Error for MidiError {}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

const DATA_RANGE: std::ops::RangeInclusive<i64> = 0..=0x7F;

/// The two kinds of note events the bridge forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    NoteOn,
    NoteOff,
}

impl NoteKind {
    fn status_nibble(self) -> u8 {
        match self {
            NoteKind::NoteOn => 0x90,
            NoteKind::NoteOff => 0x80,
        }
    }
}

/// A decoded note event, passed from the line decoder to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiNoteEvent {
    pub kind: NoteKind,
    pub channel: i64,
    pub note: i64,
    pub velocity: i64,
}

impl MidiNoteEvent {
    pub fn note_on(channel: i64, note: i64, velocity: i64) -> Self {
        Self {
            kind: NoteKind::NoteOn,
            channel,
            note,
            velocity,
        }
    }

    pub fn note_off(channel: i64, note: i64, velocity: i64) -> Self {
        Self {
            kind: NoteKind::NoteOff,
            channel,
            note,
            velocity,
        }
    }

    /// Encodes the event as a three byte channel voice message.
    ///
    /// The decoder passes field values through unchecked, so this is where
    /// out-of-range channels and data bytes get rejected.
    pub fn to_bytes(&self) -> Result<[u8; 3]> {
        if !(0..=0x0F).contains(&self.channel) {
            return Err(MidiError::SendError(format!(
                "channel {} out of range 0-15",
                self.channel
            )));
        }
        if !DATA_RANGE.contains(&self.note) || !DATA_RANGE.contains(&self.velocity) {
            return Err(MidiError::SendError(format!(
                "data bytes out of range 0-127 (note={}, velocity={})",
                self.note, self.velocity
            )));
        }
        Ok([
            self.kind.status_nibble() | self.channel as u8,
            self.note as u8,
            self.velocity as u8,
        ])
    }
}

impl fmt::Display for MidiNoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            NoteKind::NoteOn => "Note On",
            NoteKind::NoteOff => "Note Off",
        };
        write!(
            f,
            "{}: ch={}, note={}, vel={}",
            kind, self.channel, self.note, self.velocity
        )
    }
}

/// Trait defining a MIDI output destination
pub trait MidiSink: Send {
    /// Sends a note event to the destination
    fn send(&mut self, event: &MidiNoteEvent) -> Result<()>;

    /// Releases the destination. Consumes the handle.
    fn close(self: Box<Self>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_bytes() {
        let event = MidiNoteEvent::note_on(0, 60, 100);
        assert_eq!(event.to_bytes().unwrap(), [0x90, 60, 100]);
    }

    #[test]
    fn test_note_off_bytes_carry_channel() {
        let event = MidiNoteEvent::note_off(9, 36, 0);
        assert_eq!(event.to_bytes().unwrap(), [0x89, 36, 0]);
    }

    #[test]
    fn test_out_of_range_channel_rejected() {
        let event = MidiNoteEvent::note_on(16, 60, 100);
        assert!(matches!(event.to_bytes(), Err(MidiError::SendError(_))));
    }

    #[test]
    fn test_out_of_range_data_rejected() {
        let event = MidiNoteEvent::note_on(0, 200, 100);
        assert!(event.to_bytes().is_err());
        let event = MidiNoteEvent::note_off(0, 60, 128);
        assert!(event.to_bytes().is_err());
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(MidiNoteEvent::note_on(-1, 60, 100).to_bytes().is_err());
        assert!(MidiNoteEvent::note_on(0, -1, 100).to_bytes().is_err());
        assert!(MidiNoteEvent::note_off(0, 60, -5).to_bytes().is_err());
    }

    #[test]
    fn test_range_edges_accepted() {
        let event = MidiNoteEvent::note_on(15, 127, 127);
        assert_eq!(event.to_bytes().unwrap(), [0x9F, 127, 127]);
        let event = MidiNoteEvent::note_off(0, 0, 0);
        assert_eq!(event.to_bytes().unwrap(), [0x80, 0, 0]);
    }

    #[test]
    fn test_midi_error_display() {
        let send_error = MidiError::SendError("Failed to send".to_string());
        let conn_error = MidiError::ConnectionError("Failed to connect".to_string());
        assert_eq!(send_error.to_string(), "MIDI send error: Failed to send");
        assert_eq!(
            conn_error.to_string(),
            "MIDI connection error: Failed to connect"
        );
    }
}
