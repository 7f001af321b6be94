use std::sync::atomic::{AtomicU64, Ordering};

/// Per-channel counters, updated by the channel's worker
#[derive(Debug, Default)]
pub struct ChannelStats {
    lines_read: AtomicU64,
    events_sent: AtomicU64,
    ignored_lines: AtomicU64,
    decode_errors: AtomicU64,
    send_errors: AtomicU64,
}

/// Point-in-time copy of [`ChannelStats`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub lines_read: u64,
    pub events_sent: u64,
    pub ignored_lines: u64,
    pub decode_errors: u64,
    pub send_errors: u64,
}

impl ChannelStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_sent(&self) {
        self.events_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn line_ignored(&self) {
        self.ignored_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_failed(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn send_failed(&self) {
        self.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Zeroes every counter, for a fresh run of the same channel
    pub fn reset(&self) {
        for counter in [
            &self.lines_read,
            &self.events_sent,
            &self.ignored_lines,
            &self.decode_errors,
            &self.send_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            events_sent: self.events_sent.load(Ordering::Relaxed),
            ignored_lines: self.ignored_lines.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(ChannelStats::new().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_counters_are_independent() {
        let stats = ChannelStats::new();
        stats.line_read();
        stats.line_read();
        stats.event_sent();
        stats.line_ignored();
        stats.decode_failed();
        stats.send_failed();
        stats.send_failed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.lines_read, 2);
        assert_eq!(snapshot.events_sent, 1);
        assert_eq!(snapshot.ignored_lines, 1);
        assert_eq!(snapshot.decode_errors, 1);
        assert_eq!(snapshot.send_errors, 2);
    }

    #[test]
    fn test_reset_zeroes_counters() {
        let stats = ChannelStats::new();
        stats.line_read();
        stats.event_sent();
        stats.send_failed();
        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }
}
