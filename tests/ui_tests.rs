use serialmidibridge::bridge::{BridgeChannel, StatsSnapshot};
use serialmidibridge::ui::{status_line, stop_display, StatusDisplay};
use serialmidibridge::{ChannelConfig, MockDevices};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_unconfigured_slot_is_idle() {
    let channel = BridgeChannel::new(0);
    let line = status_line(&channel.monitor(), StatsSnapshot::default());
    assert_eq!(line, "idle");
}

#[test]
fn test_running_channel_status() {
    let devices = MockDevices::new();
    let _feed = devices.add_serial_port("A");
    let _events = devices.add_midi_output("X");

    let mut channel = BridgeChannel::new(0);
    channel
        .start(&ChannelConfig::bridged("A", "X"), 31250, &devices)
        .unwrap();

    let stats = StatsSnapshot {
        lines_read: 5,
        events_sent: 3,
        ignored_lines: 1,
        decode_errors: 1,
        send_errors: 0,
    };
    let line = status_line(&channel.monitor(), stats);
    assert!(line.starts_with("A -> X [running since "), "got: {}", line);
    assert!(line.ends_with(
        "lines: 5, sent: 3, ignored: 1, decode errors: 1, send errors: 0"
    ));
}

#[test]
fn test_stopped_channel_status() {
    let devices = MockDevices::new();
    let _feed = devices.add_serial_port("A");
    let _events = devices.add_midi_output("X");

    let mut channel = BridgeChannel::new(0);
    channel
        .start(&ChannelConfig::bridged("A", "X"), 31250, &devices)
        .unwrap();
    channel.stop();

    let line = status_line(&channel.monitor(), StatsSnapshot::default());
    assert!(line.starts_with("A -> X [stopped]"), "got: {}", line);
}

#[test]
fn test_status_display_stops_on_signal() {
    let monitors = vec![BridgeChannel::new(0).monitor(), BridgeChannel::new(1).monitor()];
    let stop = Arc::new(AtomicBool::new(false));
    let handle = StatusDisplay::new(monitors).run(Arc::clone(&stop));

    thread::sleep(Duration::from_millis(250));
    stop.store(true, Ordering::SeqCst);
    handle.join().expect("status display thread panicked");
}

#[test]
fn test_stop_display_joins_cleanly() {
    let stop = Arc::new(AtomicBool::new(false));
    let handle = StatusDisplay::new(vec![BridgeChannel::new(0).monitor()]).run(Arc::clone(&stop));
    assert!(stop_display(&stop, handle));
    assert!(stop.load(Ordering::SeqCst));
}

#[test]
fn test_stop_display_reports_a_panicked_thread() {
    let stop = AtomicBool::new(false);
    let handle: thread::JoinHandle<()> = thread::spawn(|| panic!("display failed"));
    assert!(!stop_display(&stop, handle));
}
