//! The bridge engine
//!
//! A [`BridgeChannel`] pumps lines from one serial source through the
//! decoder into one MIDI sink on its own worker thread. A [`BridgeManager`]
//! owns a fixed number of channels and starts or stops them together.

mod channel;
mod manager;
mod stats;

pub use channel::{Activation, BridgeChannel, ChannelMonitor, OpenError, RunState};
pub use manager::{BridgeManager, ChannelResult};
pub use stats::{ChannelStats, StatsSnapshot};
