use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards every line to a primary logger and an optional secondary one.
pub struct MultiLogger {
    primary: Arc<dyn DomainLogger>,
    secondary: Option<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(primary: Arc<dyn DomainLogger>, secondary: Option<Arc<dyn DomainLogger>>) -> Self {
        Self { primary, secondary }
    }

    fn each<F: Fn(&dyn DomainLogger)>(&self, f: F) {
        f(self.primary.as_ref());
        if let Some(sec) = &self.secondary {
            f(sec.as_ref());
        }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.each(|l| l.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.each(|l| l.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.each(|l| l.error(msg));
    }

    fn debug(&self, msg: &str) {
        self.each(|l| l.debug(msg));
    }
}

/// File logger when `path` is set and fast_log accepts it, console otherwise,
/// with `extra` receiving a copy of every line.
pub fn init_planner_logger(
    path: Option<&str>,
    level: log::LevelFilter,
    extra: Option<Arc<dyn DomainLogger>>,
) -> Arc<dyn DomainLogger> {
    let console = if level >= log::LevelFilter::Debug {
        crate::adapters::outbound::init_verbose_console_logger()
    } else {
        crate::adapters::outbound::init_console_logger()
    };
    let primary = match path {
        Some(path) => match crate::adapters::outbound::file_logger::init_file_logger(path, level) {
            Ok(file_logger) => file_logger,
            Err(e) => {
                console.warn(&format!("{}; logging to console only", e));
                console
            }
        },
        None => console,
    };
    match extra {
        Some(extra) => Arc::new(MultiLogger::new(primary, Some(extra))),
        None => primary,
    }
}
