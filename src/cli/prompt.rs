use crate::config::{ChannelConfig, DEFAULT_BAUD_RATE, SUPPORTED_BAUD_RATES};
use dialoguer::Select;

/// First entry of every device menu
pub const NO_DEVICE: &str = "(none)";

fn menu(devices: &[String]) -> Vec<&str> {
    std::iter::once(NO_DEVICE)
        .chain(devices.iter().map(String::as_str))
        .collect()
}

/// Maps a menu index back to a device name; index 0 is "(none)"
pub fn selection_to_device(devices: &[String], selection: usize) -> Option<String> {
    selection
        .checked_sub(1)
        .and_then(|i| devices.get(i))
        .cloned()
}

fn select_device(prompt: &str, devices: &[String], default: usize) -> dialoguer::Result<Option<String>> {
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&menu(devices))
        .default(default)
        .interact()?;
    Ok(selection_to_device(devices, selection))
}

/// Asks for a serial port and MIDI output per channel, then a baud rate.
///
/// The first channel defaults to the first device of each list, the others
/// to "(none)".
pub fn prompt_bridge_setup(
    channel_count: usize,
    serial_ports: &[String],
    midi_outputs: &[String],
) -> dialoguer::Result<(Vec<ChannelConfig>, u32)> {
    let mut channels = Vec::with_capacity(channel_count);
    for index in 0..channel_count {
        let default_serial = usize::from(index == 0 && !serial_ports.is_empty());
        let default_midi = usize::from(index == 0 && !midi_outputs.is_empty());

        let serial = select_device(
            &format!("Channel {} serial port", index + 1),
            serial_ports,
            default_serial,
        )?;
        let midi = select_device(
            &format!("Channel {} MIDI output", index + 1),
            midi_outputs,
            default_midi,
        )?;
        channels.push(ChannelConfig::new(serial, midi));
    }

    let default_baud = SUPPORTED_BAUD_RATES
        .iter()
        .position(|&b| b == DEFAULT_BAUD_RATE)
        .unwrap_or(0);
    let baud_index = Select::new()
        .with_prompt("Baud rate")
        .items(&SUPPORTED_BAUD_RATES)
        .default(default_baud)
        .interact()?;
    let baud_rate = SUPPORTED_BAUD_RATES[baud_index];

    Ok((channels, baud_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<String> {
        vec!["tty.usbmodem1".to_string(), "tty.usbmodem2".to_string()]
    }

    #[test]
    fn test_menu_starts_with_none() {
        assert_eq!(
            menu(&devices()),
            vec![NO_DEVICE, "tty.usbmodem1", "tty.usbmodem2"]
        );
    }

    #[test]
    fn test_selection_to_device() {
        assert_eq!(selection_to_device(&devices(), 0), None);
        assert_eq!(
            selection_to_device(&devices(), 2),
            Some("tty.usbmodem2".to_string())
        );
        assert_eq!(selection_to_device(&devices(), 3), None);
    }
}
