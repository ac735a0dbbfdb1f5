use crate::common::DomainResult;
use crate::domains::motion_planning::{
    GridPoolGenerator, PlannerSettings, Point2D, Scenario, ScenarioGenerator, ScenarioTemplate,
    SolveParams,
};
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scenario: ScenarioConfig,
    pub planner: PlannerSettings,
    pub solver: SolverSettings,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// One explicitly placed agent; `speed` defaults to the scenario speed limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub start: [f64; 2],
    pub target: [f64; 2],
    #[serde(default)]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub grid_width: f64,
    pub grid_height: f64,
    pub agent_diameter: f64,
    pub horizon_steps: usize,
    pub speed_limit: f64,
    /// Number of agents drawn from the grid pool when `agents` is empty.
    pub agent_count: usize,
    pub seed: Option<u64>,
    pub agents: Vec<AgentSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub time_limit_secs: Option<f64>,
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub paths_file: String,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl ScenarioConfig {
    pub fn template(&self) -> ScenarioTemplate {
        ScenarioTemplate {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            agent_diameter: self.agent_diameter,
            horizon_steps: self.horizon_steps,
            speed_limit: self.speed_limit,
        }
    }

    /// Explicit agents when listed, otherwise a grid-pool draw from `rng`.
    pub fn to_scenario<R: Rng>(&self, rng: &mut R) -> DomainResult<Scenario> {
        let template = self.template();
        if self.agents.is_empty() {
            return GridPoolGenerator::new(self.agent_count).generate(&template, rng);
        }
        let mut scenario = template.empty_scenario();
        for spec in &self.agents {
            scenario.add_agent(
                Point2D::new(spec.start[0], spec.start[1]),
                Point2D::new(spec.target[0], spec.target[1]),
                spec.speed.unwrap_or(self.speed_limit),
            );
        }
        Ok(scenario)
    }
}

impl SolverSettings {
    /// Negative, non-finite or unrepresentable limits mean no limit.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn params(&self) -> SolveParams {
        SolveParams {
            time_limit: self.time_limit(),
            threads: self.threads.max(1),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            grid_width: 100.0,
            grid_height: 100.0,
            agent_diameter: 16.0,
            horizon_steps: 15,
            speed_limit: 10.0,
            agent_count: 4,
            seed: None,
            agents: Vec::new(),
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: Some(60.0),
            threads: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            paths_file: "paths.json".to_string(),
        }
    }
}
