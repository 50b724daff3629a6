use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ConfigManager;

static FILE_LOGGING: AtomicBool = AtomicBool::new(false);

/// Initialize the logging system
///
/// Sets up console logging and, when `log_to_file` is enabled, an
/// append-only log file in the config directory.
///
/// **Console logging** is controlled via the `RUST_LOG` environment
/// variable (`error`, `warn`, `info`, `debug`, `trace`); the default
/// level is `info`.
///
/// **File logging** goes to:
/// - Linux: ~/.config/sane-psh/sane-psh.log or $XDG_CONFIG_HOME/sane-psh/sane-psh.log
/// - macOS: ~/Library/Application Support/sane-psh/sane-psh.log
/// - Windows: %APPDATA%\sane-psh\sane-psh.log
pub fn init_logger(log_to_file: bool) -> Result<()> {
    FILE_LOGGING.store(log_to_file, Ordering::Relaxed);

    if log_to_file {
        ConfigManager::ensure_config_dir()?;
    }

    let default_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(default_level)
        .target(env_logger::Target::Stdout)
        .try_init()
        .ok(); // Ignore error if logger is already initialized

    log_to_log_file(&format!("Logger initialized with level: {default_level:?}"))?;

    Ok(())
}

/// Append a line to the log file, if file logging is enabled.
pub fn log_to_log_file(message: &str) -> Result<()> {
    if !FILE_LOGGING.load(Ordering::Relaxed) {
        return Ok(());
    }

    let log_path = ConfigManager::log_file_path()?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )?;

    Ok(())
}
