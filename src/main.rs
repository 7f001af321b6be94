use clap::Parser;
use serialmidibridge::{
    bridge::{Activation, ChannelResult},
    cli::prompt_bridge_setup,
    handle_midi_list, handle_port_list, logging,
    ui::{self, StatusDisplay},
    validate_device, Args, BridgeConfig, BridgeManager, SystemDevices,
};
use std::error::Error;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::{thread, time::Duration};

fn main() {
    let args = parse_command_line_arguments();

    if args.port_list {
        list_available_devices("serial ports", &handle_port_list());
        return;
    }
    if args.midi_list {
        list_available_devices("MIDI outputs", &handle_midi_list());
        return;
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => exit_with_error(&format!("Error: {}", e)),
    };
    initialize_logging(&config);
    log_configuration(&args, &config);
    warn_about_unknown_devices(&config);

    let mut manager = BridgeManager::new(SystemDevices::new(), config.channel_count);
    match manager.start_all(&config.slot_configs(), config.baud_rate) {
        Ok(results) => report_channel_results(&results),
        Err(e) => exit_with_error(&format!("Error: {}", e)),
    }

    if manager.running_count() == 0 {
        exit_with_error("Error opening serial ports or MIDI outputs: no channel is running");
    }

    run_until_stopped(&mut manager, args.quiet);
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn build_config(args: &Args) -> Result<BridgeConfig, Box<dyn Error>> {
    let mut config = BridgeConfig::load(args.config.as_deref())?;
    if let Some(count) = args.channels {
        config.channel_count = count as usize;
    }
    if let Some(baud) = args.baud {
        config.baud_rate = baud;
    }
    config.set_endpoints(&args.serial, &args.midi_output);

    if args.interactive {
        let (channels, baud_rate) =
            prompt_bridge_setup(config.channel_count, &handle_port_list(), &handle_midi_list())?;
        config.channels = channels;
        config.baud_rate = baud_rate;
    }

    config.validate()?;
    Ok(config)
}

fn initialize_logging(config: &BridgeConfig) {
    match logging::init_logger(config.log_level, config.log_file.as_deref()) {
        Ok(path) => {
            log::info!("Application starting");
            println!("Logging to {}", path.display());
        }
        Err(e) => eprintln!("Logger initialization failed: {}", e),
    }
}

fn log_configuration(args: &Args, config: &BridgeConfig) {
    if let Some(path) = &args.config {
        log::info!("Configuration file: {}", path.display());
    }
    if args.interactive {
        log::info!("Channels chosen interactively");
    }
    for line in config.summary() {
        log::info!("{}", line);
    }
}

fn list_available_devices(kind: &str, devices: &[String]) {
    println!("Available {}:", kind);
    for device in devices {
        println!("  - {}", device);
    }
}

fn warn_about_unknown_devices(config: &BridgeConfig) {
    let midi_outputs = handle_midi_list();
    for destination in config.channels.iter().filter_map(|c| c.midi_destination()) {
        if let Err(msg) = validate_device(destination, &midi_outputs) {
            log::warn!("{}", msg);
            eprintln!("Warning: {}", msg);
        }
    }
}

fn report_channel_results(results: &[ChannelResult]) {
    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(Activation::Started) => println!("Channel {}: running", index + 1),
            Ok(Activation::Inert) | Ok(Activation::AlreadyRunning) => {}
            Err(e) => eprintln!("Channel {}: {}", index + 1, e),
        }
    }
}

fn run_until_stopped(manager: &mut BridgeManager<SystemDevices>, quiet: bool) {
    let stop = Arc::new(AtomicBool::new(false));
    let display = if quiet {
        None
    } else {
        Some(StatusDisplay::new(manager.monitors()).run(Arc::clone(&stop)))
    };

    println!("\nPress Enter to stop the bridge...");
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        // No terminal attached: run until every channel has ended
        Ok(0) => {
            while manager.running_count() > 0 {
                thread::sleep(Duration::from_secs(1));
            }
        }
        Ok(_) => log::info!("Stop requested"),
        Err(e) => log::error!("Failed to read stdin: {}", e),
    }

    if let Some(handle) = display {
        ui::stop_display(&stop, handle);
    }
    manager.stop_all();
}

fn exit_with_error(msg: &str) -> ! {
    log::error!("{}", msg);
    eprintln!("{}", msg);
    std::process::exit(1);
}
