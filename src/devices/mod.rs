//! Opening and enumerating the devices a channel bridges between
//!
//! [`DeviceOpener`] is the seam between the bridge and real hardware:
//! [`SystemDevices`] talks to serial ports and MIDI outputs on this host,
//! [`MockDevices`] stands in for both in tests.

pub mod mock;

pub use mock::{MockDevices, SerialFeed};

use crate::midi::{self, MidiError, MidiSink, MidirSink};
use crate::serial::{self, SerialError, SerialSource, SystemSerialSource};

pub trait DeviceOpener: Send + Sync {
    /// Opens a serial endpoint at the given baud rate
    fn open_serial(
        &self,
        endpoint: &str,
        baud_rate: u32,
    ) -> Result<Box<dyn SerialSource>, SerialError>;

    /// Opens a MIDI output destination
    fn open_midi(&self, destination: &str) -> Result<Box<dyn MidiSink>, MidiError>;
}

/// Host serial ports and MIDI outputs
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDevices;

impl SystemDevices {
    pub fn new() -> Self {
        SystemDevices
    }
}

impl DeviceOpener for SystemDevices {
    fn open_serial(
        &self,
        endpoint: &str,
        baud_rate: u32,
    ) -> Result<Box<dyn SerialSource>, SerialError> {
        Ok(Box::new(SystemSerialSource::open(endpoint, baud_rate)?))
    }

    fn open_midi(&self, destination: &str) -> Result<Box<dyn MidiSink>, MidiError> {
        Ok(Box::new(MidirSink::connect(destination)?))
    }
}

/// Serial endpoint names available on this host
pub fn list_serial_ports() -> Vec<String> {
    serial::list_ports()
}

/// MIDI output names available on this host
pub fn list_midi_outputs() -> Vec<String> {
    midi::list_output_ports()
}
