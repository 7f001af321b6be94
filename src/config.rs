// config.rs

use log::debug;
use serde::Deserialize;
use simplelog::LevelFilter;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BAUD_RATE: u32 = 31250;
pub const SUPPORTED_BAUD_RATES: [u32; 6] = [9600, 19200, 38400, 57600, 115200, 31250];
pub const DEFAULT_CHANNEL_COUNT: usize = 3;

/// Idle wait between polls of a serial source
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Longest a single line read may wait for a terminator
pub const LINE_READ_TIMEOUT: Duration = Duration::from_millis(100);

const ENV_PREFIX: &str = "SERIALMIDI";
const EMPTY_SLOT: &str = "-";

#[derive(Debug)]
pub enum ConfigError {
    /// No channel has both a serial endpoint and a MIDI destination
    NoCompleteChannel,
    /// The number of channel records differs from the number of slots
    ChannelCountMismatch { expected: usize, actual: usize },
    InvalidBaudRate(u32),
    /// More endpoints were given than there are channel slots
    TooManyEndpoints { slots: usize, given: usize },
    /// The configuration file or environment could not be read
    Source(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoCompleteChannel => write!(
                f,
                "Please select at least one serial port and MIDI output for the same channel"
            ),
            ConfigError::ChannelCountMismatch { expected, actual } => write!(
                f,
                "Expected {} channel configurations, got {}",
                expected, actual
            ),
            ConfigError::InvalidBaudRate(baud) => write!(f, "Invalid baud rate: {}", baud),
            ConfigError::TooManyEndpoints { slots, given } => write!(
                f,
                "{} endpoints given but only {} channels are available",
                given, slots
            ),
            ConfigError::Source(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for ConfigError {}

impl From<::config::ConfigError> for ConfigError {
    fn from(e: ::config::ConfigError) -> Self {
        ConfigError::Source(e.to_string())
    }
}

/// Serial endpoint and MIDI destination for one channel slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub serial_endpoint: Option<String>,
    #[serde(default)]
    pub midi_destination: Option<String>,
}

impl ChannelConfig {
    pub fn new(serial_endpoint: Option<String>, midi_destination: Option<String>) -> Self {
        Self {
            serial_endpoint,
            midi_destination,
        }
    }

    pub fn bridged(serial_endpoint: &str, midi_destination: &str) -> Self {
        Self::new(
            Some(serial_endpoint.to_string()),
            Some(midi_destination.to_string()),
        )
    }

    pub fn serial_endpoint(&self) -> Option<&str> {
        non_empty(self.serial_endpoint.as_deref())
    }

    pub fn midi_destination(&self) -> Option<&str> {
        non_empty(self.midi_destination.as_deref())
    }

    /// Both fields are present; a channel that is not complete stays inert
    pub fn is_complete(&self) -> bool {
        self.serial_endpoint().is_some() && self.midi_destination().is_some()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// On-disk / environment layer
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    baud_rate: Option<u32>,
    channel_count: Option<usize>,
    #[serde(default)]
    channels: Vec<ChannelConfig>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub baud_rate: u32,
    pub channel_count: usize,
    pub channels: Vec<ChannelConfig>,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            channel_count: DEFAULT_CHANNEL_COUNT,
            channels: Vec::new(),
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl BridgeConfig {
    /// Loads the optional TOML file, then `SERIALMIDI_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let file: FileConfig = builder.build()?.try_deserialize()?;
        debug!("Raw configuration layer: {:?}", file);
        Self::from_file_config(file)
    }

    fn from_file_config(file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let log_level = match file.log_level {
            Some(level) => LevelFilter::from_str(&level)
                .map_err(|_| ConfigError::Source(format!("unknown log level '{}'", level)))?,
            None => defaults.log_level,
        };
        Ok(Self {
            baud_rate: file.baud_rate.unwrap_or(defaults.baud_rate),
            channel_count: file.channel_count.unwrap_or(defaults.channel_count),
            channels: file.channels,
            log_level,
            log_file: file.log_file,
        })
    }

    /// Replaces channel endpoints with positional lists from the command line.
    ///
    /// Each list fills slots in order; `-` or an empty string leaves a slot empty.
    pub fn set_endpoints(&mut self, serial: &[String], midi: &[String]) {
        let len = serial.len().max(midi.len());
        if len == 0 {
            return;
        }
        self.channels = (0..len)
            .map(|i| {
                ChannelConfig::new(
                    serial.get(i).and_then(|s| parse_slot(s)),
                    midi.get(i).and_then(|s| parse_slot(s)),
                )
            })
            .collect();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::InvalidBaudRate(self.baud_rate));
        }
        if self.channels.len() > self.channel_count {
            return Err(ConfigError::TooManyEndpoints {
                slots: self.channel_count,
                given: self.channels.len(),
            });
        }
        Ok(())
    }

    /// The effective settings, one line each, for logging at startup
    pub fn summary(&self) -> Vec<String> {
        let standard = if SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            ""
        } else {
            " (non-standard)"
        };
        let mut lines = vec![
            format!("Baud rate {}{}", self.baud_rate, standard),
            format!("{} channel slots", self.channel_count),
        ];
        for (i, slot) in self.slot_configs().iter().enumerate() {
            lines.push(format!(
                "Channel {}: {} -> {}",
                i + 1,
                slot.serial_endpoint().unwrap_or(EMPTY_SLOT),
                slot.midi_destination().unwrap_or(EMPTY_SLOT)
            ));
        }
        lines
    }

    /// One record per slot, padding missing slots with empty channels
    pub fn slot_configs(&self) -> Vec<ChannelConfig> {
        let mut slots = self.channels.clone();
        slots.resize(self.channel_count.max(slots.len()), ChannelConfig::default());
        slots
    }
}

fn parse_slot(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == EMPTY_SLOT {
        None
    } else {
        Some(value.to_string())
    }
}
