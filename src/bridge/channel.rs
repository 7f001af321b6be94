use super::stats::ChannelStats;
use crate::config::{ChannelConfig, POLL_INTERVAL};
use crate::devices::DeviceOpener;
use crate::midi::{decode, Decoded, MidiError, MidiSink};
use crate::serial::{SerialError, SerialSource};
use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// What a call to [`BridgeChannel::start`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Both devices opened and the read loop is running
    Started,
    /// The configuration lacks an endpoint or destination; nothing was opened
    Inert,
    /// The channel was already running; nothing changed
    AlreadyRunning,
}

/// Failure to activate a channel
#[derive(Debug)]
pub enum OpenError {
    Serial(SerialError),
    Midi(MidiError),
    /// The worker thread could not be spawned
    Spawn(io::Error),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::Serial(e) => write!(f, "{}", e),
            OpenError::Midi(e) => write!(f, "{}", e),
            OpenError::Spawn(e) => write!(f, "Failed to spawn bridge worker: {}", e),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OpenError::Serial(e) => Some(e),
            OpenError::Midi(e) => Some(e),
            OpenError::Spawn(e) => Some(e),
        }
    }
}

impl From<SerialError> for OpenError {
    fn from(e: SerialError) -> Self {
        OpenError::Serial(e)
    }
}

impl From<MidiError> for OpenError {
    fn from(e: MidiError) -> Self {
        OpenError::Midi(e)
    }
}

/// Read-only view of a channel for status displays.
///
/// Run state and counters follow the channel across restarts; `config` and
/// `started_at` are captured when the monitor is taken.
#[derive(Debug, Clone)]
pub struct ChannelMonitor {
    pub index: usize,
    pub config: Option<ChannelConfig>,
    pub started_at: Option<DateTime<Local>>,
    running: Arc<AtomicBool>,
    stats: Arc<ChannelStats>,
}

impl ChannelMonitor {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }
}

/// One serial source bridged to one MIDI sink.
///
/// While running, the source and sink are owned by the channel's worker
/// thread, which closes them (sink first) when its loop ends.
pub struct BridgeChannel {
    index: usize,
    config: Option<ChannelConfig>,
    running: Arc<AtomicBool>,
    stats: Arc<ChannelStats>,
    started_at: Option<DateTime<Local>>,
    worker: Option<JoinHandle<()>>,
}

impl BridgeChannel {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            config: None,
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(ChannelStats::new()),
            started_at: None,
            worker: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Configuration of the current or most recent run
    pub fn config(&self) -> Option<&ChannelConfig> {
        self.config.as_ref()
    }

    pub fn stats(&self) -> Arc<ChannelStats> {
        Arc::clone(&self.stats)
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn state(&self) -> RunState {
        match &self.worker {
            Some(worker) if !worker.is_finished() && self.running.load(Ordering::SeqCst) => {
                RunState::Running
            }
            _ => RunState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn monitor(&self) -> ChannelMonitor {
        ChannelMonitor {
            index: self.index,
            config: self.config.clone(),
            started_at: self.started_at,
            running: Arc::clone(&self.running),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Opens the serial source, then the MIDI sink, and starts the read loop.
    ///
    /// Activation is all-or-nothing: if the sink fails to open, the source
    /// is closed again and the channel stays stopped.
    pub fn start<D: DeviceOpener + ?Sized>(
        &mut self,
        config: &ChannelConfig,
        baud_rate: u32,
        devices: &D,
    ) -> Result<Activation, OpenError> {
        if self.is_running() {
            warn!("Channel {} is already running", self.index);
            return Ok(Activation::AlreadyRunning);
        }
        // Reap a worker that ended on its own
        self.stop();

        let (Some(endpoint), Some(destination)) =
            (config.serial_endpoint(), config.midi_destination())
        else {
            debug!("Channel {} is not fully configured, leaving it inert", self.index);
            return Ok(Activation::Inert);
        };

        let source = devices.open_serial(endpoint, baud_rate)?;
        let sink = match devices.open_midi(destination) {
            Ok(sink) => sink,
            Err(e) => {
                if let Err(close_err) = source.close() {
                    warn!(
                        "Channel {} failed to close serial port {}: {}",
                        self.index, endpoint, close_err
                    );
                }
                return Err(e.into());
            }
        };

        // Any previous worker has been joined; its flag and counters carry over
        self.stats.reset();
        self.running.store(true, Ordering::SeqCst);
        let worker = Worker {
            index: self.index,
            source,
            sink,
            running: Arc::clone(&self.running),
            stats: Arc::clone(&self.stats),
        };

        // A failed spawn drops the worker, which releases both devices
        let handle = match thread::Builder::new()
            .name(format!("bridge-{}", self.index))
            .spawn(move || worker.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                error!("Channel {} failed to spawn its worker: {}", self.index, e);
                return Err(OpenError::Spawn(e));
            }
        };

        info!(
            "Channel {} bridging {} -> {} at {} baud",
            self.index, endpoint, destination, baud_rate
        );
        self.config = Some(config.clone());
        self.started_at = Some(Local::now());
        self.worker = Some(handle);
        Ok(Activation::Started)
    }

    /// Signals the read loop to end and waits for it to close its devices.
    /// Stopping a stopped channel does nothing.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.running.store(false, Ordering::SeqCst);
        if worker.join().is_err() {
            error!("Channel {} worker panicked", self.index);
        }
        info!("Channel {} stopped", self.index);
    }
}

impl Drop for BridgeChannel {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    index: usize,
    source: Box<dyn SerialSource>,
    sink: Box<dyn MidiSink>,
    running: Arc<AtomicBool>,
    stats: Arc<ChannelStats>,
}

impl Worker {
    fn run(mut self) {
        debug!("Channel {} read loop started", self.index);
        while self.running.load(Ordering::SeqCst) {
            match self.poll() {
                Ok(true) => {}
                Ok(false) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    error!("Channel {} serial source failed: {}", self.index, e);
                    self.running.store(false, Ordering::SeqCst);
                }
            }
        }
        self.close();
    }

    /// Reads at most one line. Returns false when the source was idle.
    fn poll(&mut self) -> Result<bool, SerialError> {
        if !self.source.has_data()? {
            return Ok(false);
        }
        if let Some(line) = self.source.read_line()? {
            self.forward(line.trim());
        }
        Ok(true)
    }

    fn forward(&mut self, line: &str) {
        self.stats.line_read();
        match decode(line) {
            Ok(Decoded::Note(event)) => match self.sink.send(&event) {
                Ok(()) => {
                    debug!("Channel {} sent {}", self.index, event);
                    self.stats.event_sent();
                }
                Err(e) => {
                    warn!("Channel {} dropped {}: {}", self.index, event, e);
                    self.stats.send_failed();
                }
            },
            Ok(Decoded::Ignored) => {
                debug!("Channel {} unrecognized line (ignored): {}", self.index, line);
                self.stats.line_ignored();
            }
            Err(e) => {
                warn!("Channel {} error parsing MIDI message {:?}: {}", self.index, line, e);
                self.stats.decode_failed();
            }
        }
    }

    fn close(self) {
        let Worker {
            index, source, sink, ..
        } = self;
        if let Err(e) = sink.close() {
            warn!("Channel {} failed to close MIDI output: {}", index, e);
        }
        if let Err(e) = source.close() {
            warn!("Channel {} failed to close serial port: {}", index, e);
        }
        debug!("Channel {} devices closed", index);
    }
}
