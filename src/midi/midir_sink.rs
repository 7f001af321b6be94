use crate::midi::{MidiError, MidiNoteEvent, MidiSink, Result};
use log::{debug, error, info};
use midir::{MidiOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "serialmidibridge-out";
const CONNECTION_NAME: &str = "serialmidibridge-output";

/// MIDI destination backed by a midir output connection
pub struct MidirSink {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidirSink {
    /// Connects to the first output port whose name contains `destination`
    pub fn connect(destination: &str) -> Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        let out_ports = midi_out.ports();
        let port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(destination)
            })
            .ok_or_else(|| {
                error!("MIDI output device '{}' not found", destination);
                MidiError::ConnectionError(format!(
                    "MIDI output device '{}' not found",
                    destination
                ))
            })?;

        let port_name = midi_out
            .port_name(port)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        info!("Connecting to MIDI output port: {}", port_name);

        let connection = midi_out
            .connect(port, CONNECTION_NAME)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        Ok(MidirSink {
            connection,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiSink for MidirSink {
    fn send(&mut self, event: &MidiNoteEvent) -> Result<()> {
        let bytes = event.to_bytes()?;
        debug!("Sending MIDI {} to {}", event, self.port_name);
        self.connection
            .send(&bytes)
            .map_err(|e| MidiError::SendError(e.to_string()))
    }

    fn close(self: Box<Self>) -> Result<()> {
        info!("Closing MIDI output port: {}", self.port_name);
        self.connection.close();
        Ok(())
    }
}

/// Lists the names of all MIDI output ports on this host
#[cfg(not(feature = "test-mock"))]
pub fn list_output_ports() -> Vec<String> {
    let midi_out = match MidiOutput::new("serialmidibridge-port-lister") {
        Ok(m) => m,
        Err(e) => {
            error!("Failed to list MIDI ports: {}", e);
            return vec![];
        }
    };

    midi_out
        .ports()
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect()
}

#[cfg(feature = "test-mock")]
pub fn list_output_ports() -> Vec<String> {
    vec!["Mock MIDI Out 1".to_string(), "Mock MIDI Out 2".to_string()]
}
