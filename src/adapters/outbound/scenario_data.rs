use crate::common::{DomainError, DomainResult};
use crate::config::ScenarioConfig;
use crate::domains::motion_planning::ports::ScenarioSource;
use crate::domains::motion_planning::Scenario;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads `<base>/<name>` (`.toml` appended when missing) using the `[scenario]` schema.
pub struct FilesystemScenarioSource {
    base: PathBuf,
}

impl FilesystemScenarioSource {
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| {
            if let Ok(v) = env::var("MOTION_SCENARIO_DIR") {
                PathBuf::from(v)
            } else {
                let cwd_default = Path::new("resources/scenarios");
                if cwd_default.exists() { cwd_default.to_path_buf() } else { PathBuf::from(".") }
            }
        });
        Self { base }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let mut p = self.base.clone();
        p.push(name);
        if p.extension().is_none() {
            p.set_extension("toml");
        }
        p
    }

    /// Writes a scenario config so it can be reloaded with `load_scenario`.
    pub fn save_scenario(&self, name: &str, scenario: &ScenarioConfig) -> DomainResult<()> {
        let p = self.resolve(name);
        if let Some(parent) = p.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
            }
        }
        let text = toml::to_string_pretty(scenario)
            .map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        fs::write(&p, text).map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        Ok(())
    }
}

impl ScenarioSource for FilesystemScenarioSource {
    fn load_scenario(&self, name: &str) -> DomainResult<Scenario> {
        let p = self.resolve(name);
        let text = fs::read_to_string(&p)
            .map_err(|e| DomainError::InfrastructureError(format!("{}: {}", p.display(), e)))?;
        let config: ScenarioConfig = toml::from_str(&text)
            .map_err(|e| DomainError::InfrastructureError(format!("{}: {}", p.display(), e)))?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        config.to_scenario(&mut rng)
    }
}
