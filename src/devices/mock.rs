use super::DeviceOpener;
use crate::config::LINE_READ_TIMEOUT;
use crate::midi::{MidiError, MidiNoteEvent, MidiSink};
use crate::serial::{LineBuffer, SerialError, SerialSource};
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// In-memory serial ports and MIDI outputs.
///
/// Serial data is fed through a [`SerialFeed`]; events sent to an output
/// arrive on the receiver returned by [`MockDevices::add_midi_output`].
/// Opens claim the device until the handle is closed or dropped.
#[derive(Clone, Default)]
pub struct MockDevices {
    registry: Arc<Mutex<Registry>>,
}

#[derive(Default)]
struct Registry {
    serial_ports: HashMap<String, Receiver<Vec<u8>>>,
    midi_outputs: HashMap<String, MockOutput>,
    claimed: HashSet<String>,
    baud_rates: HashMap<String, u32>,
    close_log: Vec<String>,
}

#[derive(Clone)]
struct MockOutput {
    events: Sender<MidiNoteEvent>,
    fail_sends: bool,
}

fn serial_key(name: &str) -> String {
    format!("serial:{}", name)
}

fn midi_key(name: &str) -> String {
    format!("midi:{}", name)
}

/// Writing end of a mock serial port
pub struct SerialFeed {
    tx: Sender<Vec<u8>>,
}

impl SerialFeed {
    /// Writes `line` followed by a newline. Returns false once the port is gone.
    pub fn write_line(&self, line: &str) -> bool {
        self.write_bytes(format!("{}\n", line).as_bytes())
    }

    pub fn write_bytes(&self, bytes: &[u8]) -> bool {
        self.tx.send(bytes.to_vec()).is_ok()
    }
}

impl MockDevices {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_serial_port(&self, name: &str) -> SerialFeed {
        let (tx, rx) = unbounded();
        self.registry().serial_ports.insert(name.to_string(), rx);
        SerialFeed { tx }
    }

    pub fn add_midi_output(&self, name: &str) -> Receiver<MidiNoteEvent> {
        self.insert_output(name, false)
    }

    /// An output whose every send fails
    pub fn add_failing_midi_output(&self, name: &str) -> Receiver<MidiNoteEvent> {
        self.insert_output(name, true)
    }

    fn insert_output(&self, name: &str, fail_sends: bool) -> Receiver<MidiNoteEvent> {
        let (events, rx) = unbounded();
        self.registry()
            .midi_outputs
            .insert(name.to_string(), MockOutput { events, fail_sends });
        rx
    }

    pub fn serial_port_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry().serial_ports.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn midi_output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry().midi_outputs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_serial_claimed(&self, name: &str) -> bool {
        self.registry().claimed.contains(&serial_key(name))
    }

    pub fn is_midi_claimed(&self, name: &str) -> bool {
        self.registry().claimed.contains(&midi_key(name))
    }

    /// Baud rate the port was last opened with
    pub fn baud_rate(&self, name: &str) -> Option<u32> {
        self.registry().baud_rates.get(name).copied()
    }

    /// Devices in the order they were closed, as `serial:<name>` / `midi:<name>`
    pub fn close_log(&self) -> Vec<String> {
        self.registry().close_log.clone()
    }

    fn release(registry: &Mutex<Registry>, key: String) {
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.claimed.remove(&key);
        registry.close_log.push(key);
    }
}

impl DeviceOpener for MockDevices {
    fn open_serial(
        &self,
        endpoint: &str,
        baud_rate: u32,
    ) -> Result<Box<dyn SerialSource>, SerialError> {
        let mut registry = self.registry();
        let rx = registry
            .serial_ports
            .get(endpoint)
            .cloned()
            .ok_or_else(|| SerialError::NotFound(endpoint.to_string()))?;
        if !registry.claimed.insert(serial_key(endpoint)) {
            return Err(SerialError::Open {
                endpoint: endpoint.to_string(),
                reason: "port is busy".to_string(),
            });
        }
        registry.baud_rates.insert(endpoint.to_string(), baud_rate);

        Ok(Box::new(MockSerialSource {
            name: endpoint.to_string(),
            rx,
            buffer: LineBuffer::new(),
            registry: Arc::clone(&self.registry),
        }))
    }

    fn open_midi(&self, destination: &str) -> Result<Box<dyn MidiSink>, MidiError> {
        let mut registry = self.registry();
        let output = registry
            .midi_outputs
            .get(destination)
            .cloned()
            .ok_or_else(|| {
                MidiError::ConnectionError(format!(
                    "MIDI output device '{}' not found",
                    destination
                ))
            })?;
        if !registry.claimed.insert(midi_key(destination)) {
            return Err(MidiError::ConnectionError(format!(
                "MIDI output device '{}' is busy",
                destination
            )));
        }

        Ok(Box::new(MockMidiSink {
            name: destination.to_string(),
            output,
            registry: Arc::clone(&self.registry),
        }))
    }
}

struct MockSerialSource {
    name: String,
    rx: Receiver<Vec<u8>>,
    buffer: LineBuffer,
    registry: Arc<Mutex<Registry>>,
}

impl SerialSource for MockSerialSource {
    fn has_data(&mut self) -> Result<bool, SerialError> {
        loop {
            match self.rx.try_recv() {
                Ok(bytes) => self.buffer.extend(&bytes),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) if self.buffer.is_empty() => {
                    return Err(SerialError::Disconnected(self.name.clone()))
                }
                Err(TryRecvError::Disconnected) => break,
            }
        }
        Ok(!self.buffer.is_empty())
    }

    fn read_line(&mut self) -> Result<Option<String>, SerialError> {
        let deadline = Instant::now() + LINE_READ_TIMEOUT;
        loop {
            if let Some(line) = self.buffer.next_line() {
                return Ok(Some(line));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(bytes) => self.buffer.extend(&bytes),
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SerialError::Disconnected(self.name.clone()))
                }
            }
        }
    }

    fn close(self: Box<Self>) -> Result<(), SerialError> {
        drop(self);
        Ok(())
    }
}

impl Drop for MockSerialSource {
    fn drop(&mut self) {
        MockDevices::release(&self.registry, serial_key(&self.name));
    }
}

struct MockMidiSink {
    name: String,
    output: MockOutput,
    registry: Arc<Mutex<Registry>>,
}

impl MidiSink for MockMidiSink {
    fn send(&mut self, event: &MidiNoteEvent) -> Result<(), MidiError> {
        if self.output.fail_sends {
            return Err(MidiError::SendError(format!(
                "{} rejected {}",
                self.name, event
            )));
        }
        event.to_bytes()?;
        self.output
            .events
            .send(*event)
            .map_err(|_| MidiError::SendError(format!("{} is no longer listening", self.name)))
    }

    fn close(self: Box<Self>) -> Result<(), MidiError> {
        drop(self);
        Ok(())
    }
}

impl Drop for MockMidiSink {
    fn drop(&mut self) {
        MockDevices::release(&self.registry, midi_key(&self.name));
    }
}
