//! Leveled logging with an optional fail-fast policy.
//!
//! All code logs through the `log` macros. [`init_logger`] installs a
//! [`FailFastLogger`], which hands records to `env_logger` for stderr output
//! and, when `fail_fast` is on, aborts the process right after an error-level
//! record has been written and flushed.
//!
//! Error level is reserved for broken invariants (for example a duplicate
//! component under the strict policy), so in a fail-fast build an error log
//! line is always the last thing the process prints. Tests and tools that
//! want to observe those errors instead run with `fail_fast: false` or
//! without a logger at all.

use std::sync::OnceLock;

use log::Log;

use crate::config::LogConfig;
use crate::error::Result;

/// Logger that delegates to `env_logger` and may abort on errors.
pub struct FailFastLogger {
    inner: env_logger::Logger,
    fail_fast: bool,
}

impl FailFastLogger {
    /// Build a logger filtering at `config.level`, overridable with
    /// `RUST_LOG`.
    pub fn new(config: &LogConfig) -> Result<Self> {
        let level = config.level_filter()?;
        let inner = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .build();
        Ok(Self {
            inner,
            fail_fast: config.fail_fast,
        })
    }

    /// Most verbose level any record can pass at.
    pub fn filter(&self) -> log::LevelFilter {
        self.inner.filter()
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Whether a record at `level` ends the process.
    pub fn aborts_on(&self, level: log::Level) -> bool {
        self.fail_fast && level == log::Level::Error
    }
}

impl Log for FailFastLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata) || self.aborts_on(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
        if self.aborts_on(record.level()) {
            self.inner.flush();
            eprintln!("[hospy] aborting after error (log.fail_fast is set)");
            std::process::abort();
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<FailFastLogger> = OnceLock::new();

/// Install the process-wide logger.
///
/// Call once, early. A second call, or a call after another logger was
/// installed, leaves the existing logger in place and prints a warning.
pub fn init_logger(config: &LogConfig) -> Result<()> {
    let logger = FailFastLogger::new(config)?;
    let max_level = logger.filter().max(if logger.fail_fast() {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Off
    });

    let logger = LOGGER.get_or_init(|| logger);
    if log::set_logger(logger).is_err() {
        eprintln!("[hospy] Warning: a logger is already set, keeping it.");
        return Ok(());
    }
    log::set_max_level(max_level);
    log::debug!(
        "logger installed at {} (fail_fast: {})",
        logger.filter(),
        logger.fail_fast()
    );
    Ok(())
}
