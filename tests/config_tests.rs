use serialmidibridge::config::{DEFAULT_BAUD_RATE, DEFAULT_CHANNEL_COUNT};
use serialmidibridge::{BridgeConfig, ChannelConfig, ConfigError};
use simplelog::LevelFilter;
use std::fs;
use std::path::PathBuf;

fn write_config(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("serialmidibridge-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_defaults_without_file() {
    let config = BridgeConfig::default();
    assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
    assert_eq!(config.channel_count, DEFAULT_CHANNEL_COUNT);
    assert!(config.channels.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_toml_file() {
    let path = write_config(
        "bridge.toml",
        r#"
baud_rate = 115200
channel_count = 4
log_level = "debug"

[[channels]]
serial_endpoint = "tty.usbmodem1"
midi_destination = "IAC Driver Bus 1"

[[channels]]

[[channels]]
midi_destination = "IAC Driver Bus 2"
"#,
    );

    let config = BridgeConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.baud_rate, 115200);
    assert_eq!(config.channel_count, 4);
    assert_eq!(config.log_level, LevelFilter::Debug);
    assert_eq!(
        config.channels,
        vec![
            ChannelConfig::bridged("tty.usbmodem1", "IAC Driver Bus 1"),
            ChannelConfig::default(),
            ChannelConfig::new(None, Some("IAC Driver Bus 2".to_string())),
        ]
    );

    let slots = config.slot_configs();
    assert_eq!(slots.len(), 4);
    assert!(slots[0].is_complete());
    assert!(!slots[2].is_complete());
    assert_eq!(slots[3], ChannelConfig::default());
}

#[test]
fn test_missing_file_is_an_error() {
    let path = std::env::temp_dir().join("serialmidibridge-does-not-exist.toml");
    let result = BridgeConfig::load(Some(path.as_path()));
    assert!(matches!(result, Err(ConfigError::Source(_))));
}

#[test]
fn test_command_line_endpoints_replace_file_channels() {
    let path = write_config(
        "override.toml",
        r#"
[[channels]]
serial_endpoint = "tty.old"
midi_destination = "Old Synth"
"#,
    );

    let mut config = BridgeConfig::load(Some(path.as_path())).unwrap();
    config.set_endpoints(&["tty.new".to_string()], &["New Synth".to_string()]);
    assert_eq!(
        config.channels,
        vec![ChannelConfig::bridged("tty.new", "New Synth")]
    );

    // No endpoints on the command line keeps the file's channels
    let mut config = BridgeConfig::load(Some(path.as_path())).unwrap();
    config.set_endpoints(&[], &[]);
    assert_eq!(
        config.channels,
        vec![ChannelConfig::bridged("tty.old", "Old Synth")]
    );
}

#[test]
fn test_config_error_messages() {
    assert_eq!(
        ConfigError::NoCompleteChannel.to_string(),
        "Please select at least one serial port and MIDI output for the same channel"
    );
    assert_eq!(
        ConfigError::ChannelCountMismatch {
            expected: 3,
            actual: 2
        }
        .to_string(),
        "Expected 3 channel configurations, got 2"
    );
}
