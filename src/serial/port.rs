use super::{LineBuffer, Result, SerialError, SerialSource};
use crate::config::{LINE_READ_TIMEOUT, POLL_INTERVAL};
use log::{debug, info};
use serialport::SerialPort;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Instant;

const READ_CHUNK: usize = 256;

/// Serial connection backed by the `serialport` crate
pub struct SystemSerialSource {
    port: Box<dyn SerialPort>,
    endpoint: String,
    buffer: LineBuffer,
}

impl SystemSerialSource {
    pub fn open(endpoint: &str, baud_rate: u32) -> Result<Self> {
        let path = resolve_endpoint(endpoint);
        if cfg!(unix) && !Path::new(&path).exists() {
            return Err(SerialError::NotFound(path));
        }

        info!("Opening serial port {} at {} baud", path, baud_rate);
        let port = serialport::new(&path, baud_rate)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|e| SerialError::Open {
                endpoint: path.clone(),
                reason: e.to_string(),
            })?;

        Ok(SystemSerialSource {
            port,
            endpoint: path,
            buffer: LineBuffer::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SerialSource for SystemSerialSource {
    fn has_data(&mut self) -> Result<bool> {
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        let waiting = self.port.bytes_to_read().map_err(|e| match e.kind() {
            serialport::ErrorKind::NoDevice => SerialError::Disconnected(self.endpoint.clone()),
            _ => SerialError::Io(e.into()),
        })?;
        Ok(waiting > 0)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let deadline = Instant::now() + LINE_READ_TIMEOUT;
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(line) = self.buffer.next_line() {
                return Ok(Some(line));
            }
            if Instant::now() >= deadline {
                debug!("No complete line from {} within timeout", self.endpoint);
                return Ok(None);
            }
            match self.port.read(&mut chunk) {
                Ok(0) => return Err(SerialError::Disconnected(self.endpoint.clone())),
                Ok(n) => self.buffer.extend(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {}
                Err(e) => return Err(SerialError::Io(e)),
            }
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        info!("Closing serial port {}", self.endpoint);
        // The port handle is released on drop
        Ok(())
    }
}

/// Maps a configured endpoint to a device path.
///
/// On Unix a bare device name such as `tty.usbmodem1` lives under `/dev`.
pub fn resolve_endpoint(endpoint: &str) -> String {
    if cfg!(unix) && !endpoint.contains('/') {
        format!("/dev/{}", endpoint)
    } else {
        endpoint.to_string()
    }
}

/// Lists serial endpoint names available on this host
#[cfg(not(feature = "test-mock"))]
pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            log::error!("Failed to enumerate serial ports: {}", e);
            vec![]
        }
    }
}

#[cfg(feature = "test-mock")]
pub fn list_ports() -> Vec<String> {
    vec!["tty.mock1".to_string(), "tty.mock2".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_bare_name_resolves_under_dev() {
        assert_eq!(resolve_endpoint("tty.usbmodem1"), "/dev/tty.usbmodem1");
        assert_eq!(resolve_endpoint("/dev/ttyACM0"), "/dev/ttyACM0");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_endpoint_is_not_found() {
        match SystemSerialSource::open("tty.does-not-exist-serialmidibridge", 31250) {
            Err(SerialError::NotFound(path)) => {
                assert_eq!(path, "/dev/tty.does-not-exist-serialmidibridge")
            }
            Err(e) => panic!("Expected NotFound, got {}", e),
            Ok(_) => panic!("Expected NotFound, got an open port"),
        }
    }
}
