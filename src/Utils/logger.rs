//! Console logging for the engine's `log` macros.
use crate::error::{EngineError, EngineResult};
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode};

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Installs a terminal logger at `level`. `LevelFilter::Off` installs nothing.
/// Fails if a logger is already installed.
pub fn init_logger(level: LevelFilter) -> EngineResult<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    let loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    CombinedLogger::init(loggers).map_err(|e| EngineError::Logger(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_installs_nothing() {
        assert!(init_logger(LevelFilter::Off).is_ok());
    }

    #[test]
    fn test_second_logger_is_rejected() {
        // the first call may lose the race against another test, the second never succeeds
        let _ = init_logger(LevelFilter::Warn);
        assert!(matches!(
            init_logger(LevelFilter::Warn),
            Err(EngineError::Logger(_))
        ));
    }
}
