//! Serial side of the bridge
//!
//! A [`SerialSource`] is a line-oriented view of a serial connection. The
//! real implementation is [`SystemSerialSource`]; both it and the mock
//! devices assemble lines with [`LineBuffer`].

mod line;
pub mod port;

pub use line::{LineBuffer, MAX_LINE_LENGTH};
pub use port::{list_ports, resolve_endpoint, SystemSerialSource};

use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum SerialError {
    /// The endpoint does not exist on this host
    NotFound(String),
    /// The endpoint exists but could not be claimed
    Open { endpoint: String, reason: String },
    /// Read failure on an open connection
    Io(io::Error),
    /// The connection went away
    Disconnected(String),
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::NotFound(endpoint) => write!(f, "Port {} not found", endpoint),
            SerialError::Open { endpoint, reason } => {
                write!(f, "Failed to open serial port {}: {}", endpoint, reason)
            }
            SerialError::Io(e) => write!(f, "Serial I/O error: {}", e),
            SerialError::Disconnected(endpoint) => {
                write!(f, "Serial port {} disconnected", endpoint)
            }
        }
    }
}

impl Error for SerialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SerialError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SerialError {
    fn from(e: io::Error) -> Self {
        SerialError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// Line-buffered serial connection
pub trait SerialSource: Send {
    /// Non-blocking check for pending bytes
    fn has_data(&mut self) -> Result<bool>;

    /// Reads one line, waiting at most the source's read timeout.
    ///
    /// Returns `Ok(None)` when no complete line arrived in time; any partial
    /// line is kept for the next call. The returned line still carries its
    /// terminator.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Releases the connection. Consumes the handle.
    fn close(self: Box<Self>) -> Result<()>;
}
