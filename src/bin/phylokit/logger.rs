use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record};

/// Logs to stderr with a colored level tag
pub struct MinimalLogger;

impl log::Log for MinimalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_string = match record.level() {
            Level::Error => record.level().to_string().red(),
            Level::Warn => record.level().to_string().yellow(),
            Level::Info => record.level().to_string().cyan(),
            Level::Debug => record.level().to_string().purple(),
            Level::Trace => record.level().to_string().normal(),
        };

        // stdout only carries command output
        eprintln!("{:<5} {}", level_string, record.args())
    }

    fn flush(&self) {}
}

static LOGGER: MinimalLogger = MinimalLogger;

/// Installs the logger, `quiet` wins over `verbose`
pub fn init(verbose: u8, quiet: bool) -> Result<(), log::SetLoggerError> {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, _) => LevelFilter::Debug,
    };
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
