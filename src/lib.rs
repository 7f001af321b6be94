pub mod bridge;
pub mod cli;
pub mod config;
pub mod devices;
pub mod logging;
pub mod midi;
pub mod serial;
pub mod ui;

pub use bridge::{Activation, BridgeChannel, BridgeManager, OpenError, RunState};
pub use cli::{handle_midi_list, handle_port_list, validate_device, Args};
pub use config::{BridgeConfig, ChannelConfig, ConfigError};
pub use devices::{DeviceOpener, MockDevices, SystemDevices};
pub use midi::{decode, DecodeError, Decoded, MidiNoteEvent, NoteKind};
