use super::channel::{Activation, BridgeChannel, ChannelMonitor, OpenError};
use crate::config::{ChannelConfig, ConfigError};
use crate::devices::DeviceOpener;
use log::{error, info};

/// Per-slot outcome of [`BridgeManager::start_all`]
pub type ChannelResult = Result<Activation, OpenError>;

/// Fixed set of bridge channels sharing one baud rate
pub struct BridgeManager<D: DeviceOpener> {
    devices: D,
    channels: Vec<BridgeChannel>,
}

impl<D: DeviceOpener> BridgeManager<D> {
    pub fn new(devices: D, channel_count: usize) -> Self {
        Self {
            devices,
            channels: (0..channel_count).map(BridgeChannel::new).collect(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&BridgeChannel> {
        self.channels.get(index)
    }

    pub fn channels(&self) -> &[BridgeChannel] {
        &self.channels
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    pub fn running_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_running()).count()
    }

    pub fn monitors(&self) -> Vec<ChannelMonitor> {
        self.channels.iter().map(BridgeChannel::monitor).collect()
    }

    /// Starts every fully configured channel, one config per slot.
    ///
    /// Fails without touching any channel when the slot count is wrong, the
    /// baud rate is zero, or no slot has both an endpoint and a destination.
    /// Otherwise each slot is attempted independently and its result
    /// returned in slot order; one channel failing to open does not stop
    /// the rest.
    pub fn start_all(
        &mut self,
        configs: &[ChannelConfig],
        baud_rate: u32,
    ) -> Result<Vec<ChannelResult>, ConfigError> {
        if configs.len() != self.channels.len() {
            return Err(ConfigError::ChannelCountMismatch {
                expected: self.channels.len(),
                actual: configs.len(),
            });
        }
        if baud_rate == 0 {
            return Err(ConfigError::InvalidBaudRate(baud_rate));
        }
        if !configs.iter().any(ChannelConfig::is_complete) {
            error!("No channel has both a serial port and a MIDI output");
            return Err(ConfigError::NoCompleteChannel);
        }

        let devices = &self.devices;
        let results: Vec<ChannelResult> = self
            .channels
            .iter_mut()
            .zip(configs)
            .map(|(channel, config)| {
                let result = channel.start(config, baud_rate, devices);
                if let Err(e) = &result {
                    error!("Error opening channel {}: {}", channel.index(), e);
                }
                result
            })
            .collect();

        info!(
            "Bridge running on {} of {} channels at {} baud",
            self.running_count(),
            self.channels.len(),
            baud_rate
        );
        Ok(results)
    }

    /// Stops every channel regardless of state
    pub fn stop_all(&mut self) {
        for channel in &mut self.channels {
            channel.stop();
        }
        info!("Bridge stopped");
    }
}
