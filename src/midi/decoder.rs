//! Decoder for the textual note protocol spoken on the serial side
//!
//! Each record is a single line:
//!
//! ```text
//! MIDI message: <status>, channel: <ch>, data1: <note>, data2: <velocity>
//! ```
//!
//! A status of 144 decodes to Note On, any other integer to Note Off.

use super::MidiNoteEvent;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Literal prefix marking a line as a note record
pub const MESSAGE_PREFIX: &str = "MIDI message";

/// Status value selecting Note On
pub const NOTE_ON_STATUS: i64 = 144;

const FIELD_SEPARATOR: &str = ", ";
const VALUE_SEPARATOR: &str = ": ";

/// Outcome of decoding a line that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A well-formed record
    Note(MidiNoteEvent),
    /// The line is not a note record
    Ignored,
}

/// A recognized record whose fields could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer than four fields after splitting on ", "
    MissingField(&'static str),
    /// The field has no ": " separating key and value
    MissingValue(&'static str),
    /// The value is not an integer
    InvalidValue { field: &'static str, value: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingField(field) => write!(f, "missing field '{}'", field),
            DecodeError::MissingValue(field) => write!(f, "field '{}' has no value", field),
            DecodeError::InvalidValue { field, value } => {
                write!(f, "field '{}' is not an integer: {:?}", field, value)
            }
        }
    }
}

impl Error for DecodeError {}

/// Parses one line into a note event.
///
/// Fields are positional: status, channel, data1, data2. Any integer is
/// accepted; the sink enforces MIDI ranges.
pub fn decode(line: &str) -> Result<Decoded, DecodeError> {
    if !line.starts_with(MESSAGE_PREFIX) {
        return Ok(Decoded::Ignored);
    }

    let mut fields = line.split(FIELD_SEPARATOR);
    let status: i64 = field_value(fields.next(), "status")?;
    let channel: i64 = field_value(fields.next(), "channel")?;
    let note: i64 = field_value(fields.next(), "data1")?;
    let velocity: i64 = field_value(fields.next(), "data2")?;

    let event = if status == NOTE_ON_STATUS {
        MidiNoteEvent::note_on(channel, note, velocity)
    } else {
        MidiNoteEvent::note_off(channel, note, velocity)
    };
    Ok(Decoded::Note(event))
}

fn field_value<T: FromStr>(field: Option<&str>, name: &'static str) -> Result<T, DecodeError> {
    let field = field.ok_or(DecodeError::MissingField(name))?;
    let (_, value) = field
        .split_once(VALUE_SEPARATOR)
        .ok_or(DecodeError::MissingValue(name))?;
    value
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidValue {
            field: name,
            value: value.to_string(),
        })
}
