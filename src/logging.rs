use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// `~/.local/share/serialmidibridge/logs/bridge.log`
pub fn default_log_path() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("serialmidibridge")
        .join("logs")
        .join("bridge.log"))
}

/// Installs the file logger once per process and returns the log path
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<PathBuf, Error> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => default_log_path()?,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    // Thread names tell channel workers apart
    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Trace)
        .set_thread_mode(ThreadLogMode::Names)
        .build();

    INIT.call_once(|| {
        if WriteLogger::init(level, config, file).is_ok() {
            LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        }
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(path)
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}
