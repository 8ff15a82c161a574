use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ConfigBuilder, TermLogger};

/// HTTP transport crates that log every connection and frame. Hidden unless
/// running at Trace.
const FILTERED_MODULES: &[&str] = &["hyper", "hyper_util", "h2", "reqwest", "rustls", "mio"];

pub struct Logger {}

impl Logger {
    /// Installs a terminal logger at the configured level.
    ///
    /// `log` records from the contacts client and `tracing` events from the
    /// token client (through its `log` bridge) both end up here.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let log_config = Self::build_log_config(config.log_level_filter);

        TermLogger::init(
            config.log_level_filter,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    fn filtered_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            FILTERED_MODULES
        }
    }

    fn build_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        for module in Self::filtered_modules(level) {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_crates_are_filtered() {
        for module in ["hyper", "hyper_util", "h2", "reqwest", "rustls"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_own_crates_are_never_filtered() {
        for module in ["contacts", "jwt_client", "fetch_contacts"] {
            assert!(!FILTERED_MODULES.contains(&module));
        }
    }

    #[test]
    fn test_trace_shows_everything() {
        assert!(Logger::filtered_modules(LevelFilter::Trace).is_empty());
    }

    #[test]
    fn test_other_levels_filter_transport() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert_eq!(Logger::filtered_modules(level), FILTERED_MODULES);
        }
    }

    #[test]
    fn test_build_log_config() {
        let _filtered = Logger::build_log_config(LevelFilter::Info);
        let _unfiltered = Logger::build_log_config(LevelFilter::Trace);
    }
}
