mod prompt;

pub use prompt::{prompt_bridge_setup, selection_to_device, NO_DEVICE};

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bridge serial text lines to MIDI outputs", long_about = None)]
pub struct Args {
    /// List available serial ports
    #[arg(long)]
    pub port_list: bool,

    /// List available MIDI outputs
    #[arg(long)]
    pub midi_list: bool,

    /// Serial port for the next channel ("-" leaves the channel empty)
    #[arg(short, long = "serial", value_name = "PORT")]
    pub serial: Vec<String>,

    /// MIDI output for the next channel ("-" leaves the channel empty)
    #[arg(short, long = "midi-output", value_name = "DEVICE")]
    pub midi_output: Vec<String>,

    /// Baud rate shared by all serial ports
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub baud: Option<u32>,

    /// Number of channel slots
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=16))]
    pub channels: Option<u64>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Choose ports and outputs interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Do not draw the status display
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn handle_port_list() -> Vec<String> {
    crate::devices::list_serial_ports()
}

pub fn handle_midi_list() -> Vec<String> {
    crate::devices::list_midi_outputs()
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
