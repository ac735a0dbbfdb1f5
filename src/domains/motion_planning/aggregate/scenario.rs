use super::types::{AgentId, Endpoint, Footprint, Point2D, ProtectedWindow};
use crate::common::ScenarioError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub start: Point2D,
    pub target: Point2D,
    pub speed: f64,
}

impl Agent {
    pub fn endpoint(&self, endpoint: Endpoint) -> Point2D {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::Target => self.target,
        }
    }
}

/// Fixed, fully known planning problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub grid_width: f64,
    pub grid_height: f64,
    pub agent_diameter: f64,
    pub horizon_steps: usize,
    pub speed_limit: f64,
    pub agents: Vec<Agent>,
}

/// Axis ranges an agent centre may occupy without its footprint leaving the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl FootprintBounds {
    pub fn contains(&self, point: &Point2D, tolerance: f64) -> bool {
        point.x >= self.min_x - tolerance
            && point.x <= self.max_x + tolerance
            && point.y >= self.min_y - tolerance
            && point.y <= self.max_y + tolerance
    }
}

impl Scenario {
    pub fn new(
        grid_width: f64,
        grid_height: f64,
        agent_diameter: f64,
        horizon_steps: usize,
        speed_limit: f64,
    ) -> Self {
        Self {
            grid_width,
            grid_height,
            agent_diameter,
            horizon_steps,
            speed_limit,
            agents: Vec::new(),
        }
    }

    /// Appends an agent; its id is its position in the agent list.
    pub fn add_agent(&mut self, start: Point2D, target: Point2D, speed: f64) -> AgentId {
        let id = AgentId(self.agents.len());
        self.agents.push(Agent {
            id,
            start,
            target,
            speed,
        });
        id
    }

    pub fn with_agent(mut self, start: Point2D, target: Point2D, speed: f64) -> Self {
        self.add_agent(start, target, speed);
        self
    }

    pub fn half_diameter(&self) -> f64 {
        self.agent_diameter / 2.0
    }

    pub fn footprint_bounds(&self) -> FootprintBounds {
        let half = self.half_diameter();
        FootprintBounds {
            min_x: half,
            max_x: self.grid_width - half,
            min_y: half,
            max_y: self.grid_height - half,
        }
    }

    /// Checks the grid-level parameters shared by every agent.
    pub fn validate_dimensions(&self) -> Result<(), ScenarioError> {
        for (field, value) in [
            ("grid_width", self.grid_width),
            ("grid_height", self.grid_height),
            ("agent_diameter", self.agent_diameter),
            ("speed_limit", self.speed_limit),
        ] {
            if !(value > 0.0) {
                return Err(ScenarioError::NonPositive { field, value });
            }
        }
        if self.agent_diameter > self.grid_width.min(self.grid_height) {
            return Err(ScenarioError::DiameterExceedsGrid {
                diameter: self.agent_diameter,
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.horizon_steps < 2 {
            return Err(ScenarioError::HorizonTooShort {
                steps: self.horizon_steps,
            });
        }
        Ok(())
    }

    /// Rejects an agent whose start or target would put its footprint off the grid.
    pub fn check_footprint(&self, agent: &Agent) -> Result<(), ScenarioError> {
        let bounds = self.footprint_bounds();
        for endpoint in [Endpoint::Start, Endpoint::Target] {
            let point = agent.endpoint(endpoint);
            if !bounds.contains(&point, 0.0) {
                return Err(ScenarioError::OutOfBounds {
                    agent: agent.id,
                    endpoint,
                    point,
                    min_x: bounds.min_x,
                    max_x: bounds.max_x,
                    min_y: bounds.min_y,
                    max_y: bounds.max_y,
                });
            }
        }
        if !(agent.speed > 0.0) {
            return Err(ScenarioError::NonPositive {
                field: "agent speed",
                value: agent.speed,
            });
        }
        if agent.speed > self.speed_limit {
            return Err(ScenarioError::SpeedAboveLimit {
                agent: agent.id,
                speed: agent.speed,
                limit: self.speed_limit,
            });
        }
        Ok(())
    }

    /// Full pre-solve validation. `integral` is set for integer-valued
    /// encodings; `window` decides whether endpoint footprints must already
    /// be separated.
    pub fn validate(
        &self,
        footprint: Footprint,
        integral: bool,
        window: ProtectedWindow,
    ) -> Result<(), ScenarioError> {
        self.validate_dimensions()?;
        if self.agents.is_empty() {
            return Err(ScenarioError::NoAgents);
        }
        for agent in &self.agents {
            self.check_footprint(agent)?;
            if integral {
                for endpoint in [Endpoint::Start, Endpoint::Target] {
                    let point = agent.endpoint(endpoint);
                    if !point.is_integral() {
                        return Err(ScenarioError::NonIntegralPlacement {
                            agent: agent.id,
                            endpoint,
                            point,
                        });
                    }
                }
            }
        }

        for (i, first) in self.agents.iter().enumerate() {
            for second in &self.agents[i + 1..] {
                for endpoint in [Endpoint::Start, Endpoint::Target] {
                    let a = first.endpoint(endpoint);
                    let b = second.endpoint(endpoint);
                    if a == b {
                        return Err(ScenarioError::DuplicatePlacement {
                            first: first.id,
                            second: second.id,
                            endpoint,
                            point: a,
                        });
                    }
                    if window.covers_endpoints() {
                        let separation = footprint.separation(a.x - b.x, a.y - b.y);
                        if separation < self.agent_diameter {
                            return Err(ScenarioError::OverlappingEndpoints {
                                first: first.id,
                                second: second.id,
                                endpoint,
                                separation,
                                diameter: self.agent_diameter,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
