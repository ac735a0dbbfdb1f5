use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an agent inside its scenario. Scopes the agent's variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl AgentId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, movement: &Displacement2D) -> Point2D {
        Point2D::new(self.x + movement.dx, self.y + movement.dy)
    }

    pub fn is_integral(&self) -> bool {
        self.x.fract() == 0.0 && self.y.fract() == 0.0
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Displacement2D {
    pub dx: f64,
    pub dy: f64,
}

impl Displacement2D {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn between(from: &Point2D, to: &Point2D) -> Self {
        Self::new(to.x - from.x, to.y - from.y)
    }

    pub fn squared_norm(&self) -> f64 {
        self.dx * self.dx + self.dy * self.dy
    }
}

/// Spatial extent an agent occupies around its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Footprint {
    /// Disk of the agent diameter; separation and speed are Euclidean.
    Disk,
    /// Axis-aligned square of side equal to the diameter; separation is
    /// Chebyshev and speed is bounded per axis.
    Square,
}

impl Footprint {
    /// Distance between two agent centres under this footprint's metric.
    pub fn separation(&self, dx: f64, dy: f64) -> f64 {
        match self {
            Footprint::Disk => (dx * dx + dy * dy).sqrt(),
            Footprint::Square => dx.abs().max(dy.abs()),
        }
    }

    /// Magnitude of a movement vector compared against the agent speed.
    pub fn movement_norm(&self, movement: &Displacement2D) -> f64 {
        match self {
            Footprint::Disk => movement.squared_norm().sqrt(),
            Footprint::Square => movement.dx.abs().max(movement.dy.abs()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    Start,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

/// Which time steps carry pairwise separation constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectedWindow {
    /// Steps `1..T-1`; start and target placements are left to the scenario.
    #[default]
    Interior,
    /// Every step `0..T`.
    Full,
}

impl ProtectedWindow {
    pub fn steps(&self, horizon_steps: usize) -> std::ops::Range<usize> {
        match self {
            ProtectedWindow::Interior => 1..horizon_steps.saturating_sub(1).max(1),
            ProtectedWindow::Full => 0..horizon_steps,
        }
    }

    pub fn covers_endpoints(&self) -> bool {
        matches!(self, ProtectedWindow::Full)
    }
}
