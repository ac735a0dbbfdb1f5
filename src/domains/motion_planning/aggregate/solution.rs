use super::scenario::Scenario;
use super::trajectory::TrajectoryVars;
use super::types::{AgentId, Displacement2D, Endpoint, Footprint, Point2D, ProtectedWindow};
use crate::common::{DomainResult, ValidationIssue};
use crate::domains::motion_planning::expr::VarId;
use crate::domains::motion_planning::ports::{SolveStatus, SolverContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPath {
    pub agent: AgentId,
    pub positions: Vec<Point2D>,
    pub movements: Vec<Displacement2D>,
}

impl AgentPath {
    pub fn control_effort(&self) -> f64 {
        self.movements.iter().map(Displacement2D::squared_norm).sum()
    }
}

/// Decoded trajectories for every agent, in scenario order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub status: SolveStatus,
    pub paths: Vec<AgentPath>,
}

/// What the validator checks against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRules {
    pub footprint: Footprint,
    pub window: ProtectedWindow,
    /// Zero for integer-valued encodings.
    pub tolerance: f64,
}

impl Solution {
    /// Reads position and movement values back from a solved context.
    ///
    /// Integer-valued models are rounded so later comparisons are exact.
    pub fn extract(
        ctx: &dyn SolverContext,
        trajectories: &[TrajectoryVars],
        status: SolveStatus,
        integral: bool,
    ) -> DomainResult<Self> {
        let read = |var: VarId| -> DomainResult<f64> {
            let value = ctx.value_of(var)?;
            Ok(if integral { value.round() } else { value })
        };

        let mut paths = Vec::with_capacity(trajectories.len());
        for trajectory in trajectories {
            let mut positions = Vec::with_capacity(trajectory.horizon_steps());
            for step in 0..trajectory.horizon_steps() {
                let (x, y) = trajectory.position(step);
                positions.push(Point2D::new(read(x)?, read(y)?));
            }
            let mut movements = Vec::with_capacity(trajectory.mov_x.len());
            for step in 0..trajectory.mov_x.len() {
                let (dx, dy) = trajectory.movement(step);
                movements.push(Displacement2D::new(read(dx)?, read(dy)?));
            }
            paths.push(AgentPath {
                agent: trajectory.agent,
                positions,
                movements,
            });
        }
        Ok(Self { status, paths })
    }

    pub fn is_feasible(&self) -> bool {
        self.status.has_solution()
    }

    pub fn control_effort(&self) -> f64 {
        self.paths.iter().map(AgentPath::control_effort).sum()
    }

    /// Export artifact: one list of `[x, y]` pairs per agent, agent order implicit.
    pub fn export_paths(&self) -> Vec<Vec<[f64; 2]>> {
        self.paths
            .iter()
            .map(|path| path.positions.iter().map(|p| [p.x, p.y]).collect())
            .collect()
    }

    /// Re-checks every invariant without trusting the solver's status.
    pub fn validate(&self, scenario: &Scenario, rules: &ValidationRules) -> Result<(), ValidationIssue> {
        let eps = rules.tolerance;
        if self.paths.len() != scenario.agents.len() {
            return Err(ValidationIssue::AgentCountMismatch {
                expected: scenario.agents.len(),
                actual: self.paths.len(),
            });
        }

        let bounds = scenario.footprint_bounds();
        for (agent, path) in scenario.agents.iter().zip(&self.paths) {
            let steps = scenario.horizon_steps;
            if path.positions.len() != steps || path.movements.len() + 1 != steps {
                return Err(ValidationIssue::HorizonMismatch {
                    agent: agent.id,
                    expected: steps,
                    actual: path.positions.len(),
                });
            }

            for (endpoint, actual) in [
                (Endpoint::Start, path.positions[0]),
                (Endpoint::Target, path.positions[steps - 1]),
            ] {
                let expected = agent.endpoint(endpoint);
                if (actual.x - expected.x).abs() > eps || (actual.y - expected.y).abs() > eps {
                    return Err(ValidationIssue::Boundary {
                        agent: agent.id,
                        endpoint,
                        expected,
                        actual,
                    });
                }
            }

            for (step, position) in path.positions.iter().enumerate() {
                if !bounds.contains(position, eps) {
                    return Err(ValidationIssue::OutsideGrid {
                        agent: agent.id,
                        step,
                        position: *position,
                    });
                }
            }

            for (step, movement) in path.movements.iter().enumerate() {
                let expected = path.positions[step].offset(movement);
                let actual = path.positions[step + 1];
                let residual = (actual.x - expected.x).abs().max((actual.y - expected.y).abs());
                if residual > eps {
                    return Err(ValidationIssue::Continuity {
                        agent: agent.id,
                        step: step + 1,
                        residual,
                    });
                }
                let norm = rules.footprint.movement_norm(movement);
                if norm > agent.speed + eps {
                    return Err(ValidationIssue::SpeedExceeded {
                        agent: agent.id,
                        step,
                        norm,
                        speed: agent.speed,
                    });
                }
            }
        }

        for (i, first) in self.paths.iter().enumerate() {
            for second in &self.paths[i + 1..] {
                for step in rules.window.steps(scenario.horizon_steps) {
                    let a = first.positions[step];
                    let b = second.positions[step];
                    let separation = rules.footprint.separation(a.x - b.x, a.y - b.y);
                    if separation < scenario.agent_diameter - eps {
                        return Err(ValidationIssue::Separation {
                            first: first.agent,
                            second: second.agent,
                            step,
                            separation,
                            diameter: scenario.agent_diameter,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
