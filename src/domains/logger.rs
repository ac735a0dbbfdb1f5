use chrono::Utc;
use log::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

/// Domain-level logging port (Hexagonal port).
/// Non-fallible from the planner's perspective; adapters decide where lines go.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);

    fn debug(&self, _msg: &str) {}
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// A file-based adapter using `fast_log` for file writing.
pub struct FileLogger;

impl FileLogger {
    /// Initialize fast_log with console output plus the given log file.
    pub fn init(path: &str, level: log::LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .console()
                .file(path)
                .level(level),
        )?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn debug(&self, msg: &str) {
        log_debug!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}

/// Prefixes every line with a plan id so concurrent runs stay distinguishable.
pub struct ScopedLogger {
    scope: String,
    inner: DynLogger,
}

impl ScopedLogger {
    pub fn new(scope: impl Into<String>, inner: DynLogger) -> Self {
        Self {
            scope: scope.into(),
            inner,
        }
    }
}

impl DomainLogger for ScopedLogger {
    fn info(&self, msg: &str) {
        self.inner.info(&format!("[{}] {}", self.scope, msg));
    }

    fn warn(&self, msg: &str) {
        self.inner.warn(&format!("[{}] {}", self.scope, msg));
    }

    fn error(&self, msg: &str) {
        self.inner.error(&format!("[{}] {}", self.scope, msg));
    }

    fn debug(&self, msg: &str) {
        self.inner.debug(&format!("[{}] {}", self.scope, msg));
    }
}
