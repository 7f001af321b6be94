// ui.rs

use crate::bridge::{ChannelMonitor, StatsSnapshot};
use log::error;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

fn create_channel_spinner(multi_progress: &MultiProgress, index: usize) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new_spinner());
    let style = ProgressStyle::default_spinner()
        .template("{prefix:.bold.dim} {spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_prefix(format!("Channel {}", index + 1));
    pb
}

/// One status line for a channel slot
pub fn status_line(monitor: &ChannelMonitor, stats: StatsSnapshot) -> String {
    let Some(config) = monitor.config.as_ref() else {
        return "idle".to_string();
    };
    let route = format!(
        "{} -> {}",
        config.serial_endpoint().unwrap_or("?"),
        config.midi_destination().unwrap_or("?")
    );
    let state = if monitor.is_running() {
        match monitor.started_at {
            Some(t) => format!("running since {}", t.format("%H:%M:%S")),
            None => "running".to_string(),
        }
    } else {
        "stopped".to_string()
    };
    format!(
        "{} [{}] lines: {}, sent: {}, ignored: {}, decode errors: {}, send errors: {}",
        route,
        state,
        stats.lines_read,
        stats.events_sent,
        stats.ignored_lines,
        stats.decode_errors,
        stats.send_errors
    )
}

pub struct StatusDisplay {
    monitors: Vec<ChannelMonitor>,
    #[allow(dead_code)]
    multi_progress: MultiProgress,
    spinners: Vec<ProgressBar>,
}

impl StatusDisplay {
    pub fn new(monitors: Vec<ChannelMonitor>) -> Self {
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());
        let spinners = monitors
            .iter()
            .map(|m| create_channel_spinner(&multi_progress, m.index))
            .collect();
        StatusDisplay {
            monitors,
            multi_progress,
            spinners,
        }
    }

    fn refresh(&self) {
        for (monitor, pb) in self.monitors.iter().zip(&self.spinners) {
            pb.set_message(status_line(monitor, monitor.stats().snapshot()));
            if monitor.is_running() {
                pb.tick();
            }
        }
    }

    /// Redraws until `stop` is set, then leaves the final state on screen
    pub fn run(self, stop: Arc<AtomicBool>) -> JoinHandle<()> {
        thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                self.refresh();
                thread::sleep(REFRESH_INTERVAL);
            }
            self.refresh();
            for pb in &self.spinners {
                pb.finish();
            }
        })
    }
}

/// Signals a display started by [`StatusDisplay::run`] and waits for it.
/// Returns false if the display thread panicked.
pub fn stop_display(stop: &AtomicBool, handle: JoinHandle<()>) -> bool {
    stop.store(true, Ordering::SeqCst);
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            error!("Status display thread panicked");
            false
        }
    }
}
