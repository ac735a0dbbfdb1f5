use crate::domains::logger::{DomainLogger, FileLogger};
use std::sync::Arc;

/// Parses a `[logging] level` value; unknown names fall back to `info`.
pub fn parse_level(level: &str) -> log::LevelFilter {
    level.parse().unwrap_or(log::LevelFilter::Info)
}

/// Initialize fast_log against `path` and return the logger the planner can inject.
pub fn init_file_logger(path: &str, level: log::LevelFilter) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, level).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}
