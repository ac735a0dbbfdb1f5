use crate::common::DomainResult;
use crate::domains::motion_planning::aggregate::scenario::Scenario;
use crate::domains::motion_planning::aggregate::solution::Solution;
use crate::domains::motion_planning::expr::{
    FixedInterval, LinearExpr, QuadExpr, Relation, Sense, VarId, VarKind,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// A satisfying assignment that is proven optimal (or there is no objective).
    Optimal,
    /// A satisfying assignment without an optimality proof.
    Feasible,
    /// No satisfying assignment exists.
    Infeasible,
    /// The budget ran out before either a proof or an assignment was found.
    TimedOut,
}

impl SolveStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveParams {
    pub time_limit: Option<Duration>,
    pub threads: usize,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            time_limit: None,
            threads: 1,
        }
    }
}

/// Port onto a mathematical-programming engine.
///
/// Every component that contributes to the model receives the same
/// `&mut dyn SolverContext`; registration happens strictly before `solve`,
/// and backends may reject additions afterwards.
pub trait SolverContext: Send {
    fn declare_variable(
        &mut self,
        kind: VarKind,
        lower: f64,
        upper: f64,
        name: &str,
    ) -> DomainResult<VarId>;

    fn add_linear_constraint(
        &mut self,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) -> DomainResult<()>;

    /// Must accept non-convex feasible regions (e.g. `dx² + dy² >= d²`).
    fn add_quadratic_constraint(
        &mut self,
        expr: QuadExpr,
        relation: Relation,
        rhs: f64,
    ) -> DomainResult<()>;

    /// `flag == 1  =>  expr (relation) rhs`
    fn add_indicator_constraint(
        &mut self,
        flag: VarId,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) -> DomainResult<()>;

    /// No two rectangles `x_intervals[i] × y_intervals[i]` overlap.
    fn add_no_overlap_2d(
        &mut self,
        x_intervals: Vec<FixedInterval>,
        y_intervals: Vec<FixedInterval>,
    ) -> DomainResult<()>;

    fn set_objective(&mut self, expr: QuadExpr, sense: Sense) -> DomainResult<()>;

    /// Warm-start value; backends are free to ignore it.
    fn set_hint(&mut self, var: VarId, value: f64) -> DomainResult<()>;

    fn solve(&mut self, params: &SolveParams) -> DomainResult<SolveStatus>;

    fn value_of(&self, var: VarId) -> DomainResult<f64>;
}

/// Port for loading scenarios from files or other stores.
pub trait ScenarioSource: Send + Sync {
    fn load_scenario(&self, name: &str) -> DomainResult<Scenario>;
}

/// Port for handing validated plans to an exporter (file, renderer, ...).
pub trait PathExporter: Send + Sync {
    fn export(&self, solution: &Solution) -> DomainResult<()>;
}
