#[cfg(test)]
mod tests {
    use clap::Parser;
    use serialmidibridge::*;
    use std::path::PathBuf;

    #[cfg(feature = "test-mock")]
    #[test]
    fn test_port_list() {
        let ports = handle_port_list();
        assert_eq!(ports, vec!["tty.mock1".to_string(), "tty.mock2".to_string()]);
    }

    #[cfg(feature = "test-mock")]
    #[test]
    fn test_midi_list() {
        let outputs = handle_midi_list();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0], "Mock MIDI Out 1");
        assert_eq!(outputs[1], "Mock MIDI Out 2");
    }

    #[test]
    fn test_args_with_channels() {
        let args = Args::parse_from([
            "test",
            "--serial",
            "tty.usbmodem1",
            "--midi-output",
            "IAC Driver Bus 1",
            "--serial",
            "-",
            "--midi-output",
            "IAC Driver Bus 2",
            "--baud",
            "115200",
        ]);
        assert_eq!(args.serial, vec!["tty.usbmodem1", "-"]);
        assert_eq!(args.midi_output, vec!["IAC Driver Bus 1", "IAC Driver Bus 2"]);
        assert_eq!(args.baud, Some(115200));
        assert!(!args.port_list);
        assert!(!args.interactive);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["test"]);
        assert!(args.serial.is_empty());
        assert!(args.midi_output.is_empty());
        assert_eq!(args.baud, None);
        assert_eq!(args.channels, None);
        assert_eq!(args.config, None);
        assert!(!args.quiet);
    }

    #[test]
    fn test_args_config_path() {
        let args = Args::parse_from(["test", "-c", "bridge.toml", "-q"]);
        assert_eq!(args.config, Some(PathBuf::from("bridge.toml")));
        assert!(args.quiet);
    }

    #[test]
    fn test_zero_baud_rejected() {
        assert!(Args::try_parse_from(["test", "--baud", "0"]).is_err());
        assert!(Args::try_parse_from(["test", "--baud", "fast"]).is_err());
    }

    #[test]
    fn test_channel_count_bounds() {
        assert!(Args::try_parse_from(["test", "--channels", "0"]).is_err());
        let args = Args::try_parse_from(["test", "--channels", "4"]).unwrap();
        assert_eq!(args.channels, Some(4));
    }

    #[test]
    fn test_valid_device() {
        let devices = vec!["IAC Driver Bus 1".to_string(), "USB MIDI".to_string()];
        assert!(validate_device("IAC Driver", &devices).is_ok());
    }

    #[test]
    fn test_invalid_device_lists_alternatives() {
        let devices = vec!["IAC Driver Bus 1".to_string(), "USB MIDI".to_string()];
        let error = validate_device("Nonexistent Device", &devices).unwrap_err();
        assert!(error.contains("Nonexistent Device"));
        assert!(error.contains("  - IAC Driver Bus 1"));
        assert!(error.contains("  - USB MIDI"));
    }
}
