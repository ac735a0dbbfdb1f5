use crate::common::{DomainError, DomainResult};
use crate::domains::motion_planning::ports::PathExporter;
use crate::domains::motion_planning::Solution;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `[[[x, y], ...], ...]`, one list per agent in scenario order.
pub struct JsonPathExporter {
    path: PathBuf,
    pretty: bool,
}

impl JsonPathExporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: false,
        }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, solution: &Solution) -> DomainResult<String> {
        let paths = solution.export_paths();
        let text = if self.pretty {
            serde_json::to_string_pretty(&paths)?
        } else {
            serde_json::to_string(&paths)?
        };
        Ok(text)
    }
}

impl PathExporter for JsonPathExporter {
    fn export(&self, solution: &Solution) -> DomainResult<()> {
        let text = self.render(solution)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
            }
        }
        fs::write(&self.path, text)
            .map_err(|e| DomainError::InfrastructureError(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

/// Reads an exported artifact back.
pub fn read_exported_paths<P: AsRef<Path>>(path: P) -> DomainResult<Vec<Vec<[f64; 2]>>> {
    let text = fs::read_to_string(path.as_ref())
        .map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
    Ok(serde_json::from_str(&text)?)
}
