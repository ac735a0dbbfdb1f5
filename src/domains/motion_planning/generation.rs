use crate::common::{DomainResult, ScenarioError};
use crate::domains::motion_planning::aggregate::scenario::Scenario;
use crate::domains::motion_planning::aggregate::types::Point2D;
use rand::Rng;

/// Grid-level parameters shared by generated scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTemplate {
    pub grid_width: f64,
    pub grid_height: f64,
    pub agent_diameter: f64,
    pub horizon_steps: usize,
    pub speed_limit: f64,
}

impl ScenarioTemplate {
    pub fn empty_scenario(&self) -> Scenario {
        Scenario::new(
            self.grid_width,
            self.grid_height,
            self.agent_diameter,
            self.horizon_steps,
            self.speed_limit,
        )
    }
}

/// Source of start/target placements. Randomness is always injected.
pub trait ScenarioGenerator {
    fn generate<R: Rng>(&self, template: &ScenarioTemplate, rng: &mut R) -> DomainResult<Scenario>;
}

/// Draws starts and targets without replacement from a lattice with one
/// footprint of spacing, so generated endpoints never overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoolGenerator {
    pub agent_count: usize,
    /// Per-agent speed; the template's speed limit when `None`.
    pub speed: Option<f64>,
}

impl GridPoolGenerator {
    pub fn new(agent_count: usize) -> Self {
        Self {
            agent_count,
            speed: None,
        }
    }

    pub fn pool(template: &ScenarioTemplate) -> Vec<Point2D> {
        let spacing = template.agent_diameter;
        let half = spacing / 2.0;
        let mut points = Vec::new();
        if !(spacing > 0.0) {
            return points;
        }
        let mut x = half;
        while x <= template.grid_width - half {
            let mut y = half;
            while y <= template.grid_height - half {
                points.push(Point2D::new(x, y));
                y += spacing;
            }
            x += spacing;
        }
        points
    }
}

impl ScenarioGenerator for GridPoolGenerator {
    fn generate<R: Rng>(&self, template: &ScenarioTemplate, rng: &mut R) -> DomainResult<Scenario> {
        let mut pool = Self::pool(template);
        let required = self.agent_count * 2;
        if pool.len() < required {
            return Err(ScenarioError::InsufficientCells {
                required,
                available: pool.len(),
            }
            .into());
        }

        let speed = self.speed.unwrap_or(template.speed_limit);
        let mut scenario = template.empty_scenario();
        for _ in 0..self.agent_count {
            let start = pool.swap_remove(rng.gen_range(0..pool.len()));
            let target = pool.swap_remove(rng.gen_range(0..pool.len()));
            scenario.add_agent(start, target, speed);
        }
        Ok(scenario)
    }
}
