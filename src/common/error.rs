use std::time::Duration;
use thiserror::Error;

use crate::domains::motion_planning::aggregate::types::{AgentId, Endpoint, Point2D};

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid scenario: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Solver reported that no collision-free assignment exists")]
    Infeasible,

    #[error("Solver exhausted its time budget ({limit:?}) without a verdict")]
    TimedOut { limit: Option<Duration> },

    #[error("Solution failed validation: {0}")]
    ValidationFailure(#[from] ValidationIssue),

    #[error("Solver capability error: {0}")]
    Solver(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

/// Problems detected before any variable reaches the solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("agent diameter {diameter} exceeds the grid ({width}x{height})")]
    DiameterExceedsGrid { diameter: f64, width: f64, height: f64 },

    #[error("horizon of {steps} steps is too short, at least 2 are required")]
    HorizonTooShort { steps: usize },

    #[error("{agent} {endpoint} {point} leaves the footprint bounds x in [{min_x}, {max_x}], y in [{min_y}, {max_y}]")]
    OutOfBounds {
        agent: AgentId,
        endpoint: Endpoint,
        point: Point2D,
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },

    #[error("{agent} {endpoint} {point} is not integral, which the selected encoding requires")]
    NonIntegralPlacement {
        agent: AgentId,
        endpoint: Endpoint,
        point: Point2D,
    },

    #[error("{agent} speed {speed} exceeds the scenario speed limit {limit}")]
    SpeedAboveLimit { agent: AgentId, speed: f64, limit: f64 },

    #[error("{first} and {second} share the {endpoint} cell {point}")]
    DuplicatePlacement {
        first: AgentId,
        second: AgentId,
        endpoint: Endpoint,
        point: Point2D,
    },

    #[error("{first} and {second} {endpoint} footprints overlap (separation {separation:.3} < {diameter})")]
    OverlappingEndpoints {
        first: AgentId,
        second: AgentId,
        endpoint: Endpoint,
        separation: f64,
        diameter: f64,
    },

    #[error("grid offers {available} placement cells but {required} are needed")]
    InsufficientCells { required: usize, available: usize },

    #[error("scenario has no agents")]
    NoAgents,
}

/// Post-solve invariant violations. Always a formulation bug.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("solution covers {actual} agents, scenario has {expected}")]
    AgentCountMismatch { expected: usize, actual: usize },

    #[error("{agent} path has {actual} positions, horizon is {expected}")]
    HorizonMismatch {
        agent: AgentId,
        expected: usize,
        actual: usize,
    },

    #[error("{agent} {endpoint} is {actual}, expected {expected}")]
    Boundary {
        agent: AgentId,
        endpoint: Endpoint,
        expected: Point2D,
        actual: Point2D,
    },

    #[error("{agent} breaks continuity at step {step} (residual {residual:.6})")]
    Continuity {
        agent: AgentId,
        step: usize,
        residual: f64,
    },

    #[error("{agent} moves {norm:.6} at step {step}, speed is {speed}")]
    SpeedExceeded {
        agent: AgentId,
        step: usize,
        norm: f64,
        speed: f64,
    },

    #[error("{agent} footprint leaves the grid at step {step} ({position})")]
    OutsideGrid {
        agent: AgentId,
        step: usize,
        position: Point2D,
    },

    #[error("{first} and {second} are {separation:.6} apart at step {step}, minimum is {diameter}")]
    Separation {
        first: AgentId,
        second: AgentId,
        step: usize,
        separation: f64,
        diameter: f64,
    },
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Planning task failed: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
