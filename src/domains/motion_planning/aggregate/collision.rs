//! Pairwise collision-avoidance encodings.
//!
//! Each encoder turns "agents `i` and `j` stay at least one diameter apart at
//! step `t`" into constraints over the position variables owned by the
//! trajectory model. Encoders only read those handles; the auxiliary binaries
//! they declare belong to them.

use super::trajectory::{KinematicShape, TrajectoryVars};
use super::types::Footprint;
use crate::common::{DomainError, DomainResult};
use crate::domains::motion_planning::expr::{FixedInterval, LinearExpr, QuadExpr, Relation, VarId, VarKind};
use crate::domains::motion_planning::ports::SolverContext;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionStrategy {
    /// `dx² + dy² >= d²`, disks, non-convex quadratic.
    DiskQuadratic,
    /// Separation on both axes at once (stricter than the square footprint needs).
    BigMOneAxis,
    /// Separation on at least one axis in one direction.
    #[default]
    BigMAnyAxis,
    /// Per-step 2-D no-overlap over fixed-size intervals, integer positions.
    #[serde(rename = "no_overlap_2d")]
    NoOverlap2D,
}

impl CollisionStrategy {
    pub fn encoder(&self, mode: IndicatorMode) -> Box<dyn CollisionEncoder> {
        match self {
            CollisionStrategy::DiskQuadratic => Box::new(DiskQuadraticEncoder),
            CollisionStrategy::BigMOneAxis => Box::new(BigMOneAxisEncoder { mode }),
            CollisionStrategy::BigMAnyAxis => Box::new(BigMAnyAxisEncoder { mode }),
            CollisionStrategy::NoOverlap2D => Box::new(NoOverlap2DEncoder),
        }
    }
}

/// How `flag => constraint` reaches the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorMode {
    /// Native indicator constraints.
    #[default]
    Native,
    /// Linearised with a big-M constant derived from the grid extent.
    BigM,
}

/// Everything an encoder needs to protect one scenario.
#[derive(Debug, Clone)]
pub struct SeparationRequest<'a> {
    pub trajectories: &'a [TrajectoryVars],
    pub steps: Range<usize>,
    pub diameter: f64,
    /// Upper bound on any centre-to-centre axis difference plus the diameter.
    pub big_m: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingStats {
    pub auxiliary_binaries: usize,
    pub constraints: usize,
    pub no_overlap_groups: usize,
}

pub trait CollisionEncoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Variable typing and speed metric the encoding expects from the trajectory model.
    fn shape(&self) -> KinematicShape;

    /// Whether centre offsets `(dx, dy)` satisfy the constraints this encoder emits.
    fn admits(&self, dx: f64, dy: f64, diameter: f64) -> bool;

    fn encode(
        &self,
        ctx: &mut dyn SolverContext,
        request: &SeparationRequest<'_>,
    ) -> DomainResult<EncodingStats>;

    fn footprint(&self) -> Footprint {
        self.shape().footprint
    }
}

fn for_each_pair_step<F>(request: &SeparationRequest<'_>, mut emit: F) -> DomainResult<()>
where
    F: FnMut(&TrajectoryVars, &TrajectoryVars, usize) -> DomainResult<()>,
{
    let trajectories = request.trajectories;
    for (i, first) in trajectories.iter().enumerate() {
        for second in &trajectories[i + 1..] {
            for step in request.steps.clone() {
                emit(first, second, step)?;
            }
        }
    }
    Ok(())
}

fn axis_differences(first: &TrajectoryVars, second: &TrajectoryVars, step: usize) -> (LinearExpr, LinearExpr) {
    let (x1, y1) = first.position(step);
    let (x2, y2) = second.position(step);
    (LinearExpr::difference(x1, x2), LinearExpr::difference(y1, y2))
}

fn declare_flag(
    ctx: &mut dyn SolverContext,
    first: &TrajectoryVars,
    second: &TrajectoryVars,
    step: usize,
    label: &str,
) -> DomainResult<VarId> {
    ctx.declare_variable(
        VarKind::Binary,
        0.0,
        1.0,
        &format!("sep_{}_{}_step_{}_{}", first.agent, second.agent, step, label),
    )
}

/// `flag == 1 => expr (relation) rhs`, natively or via big-M.
fn imply(
    ctx: &mut dyn SolverContext,
    mode: IndicatorMode,
    big_m: f64,
    flag: VarId,
    expr: LinearExpr,
    relation: Relation,
    rhs: f64,
) -> DomainResult<()> {
    match (mode, relation) {
        (IndicatorMode::Native, _) => ctx.add_indicator_constraint(flag, expr, relation, rhs),
        (IndicatorMode::BigM, Relation::LessEq) => {
            ctx.add_linear_constraint(expr.plus(flag, big_m), Relation::LessEq, rhs + big_m)
        }
        (IndicatorMode::BigM, Relation::GreaterEq) => {
            ctx.add_linear_constraint(expr.plus(flag, -big_m), Relation::GreaterEq, rhs - big_m)
        }
        (IndicatorMode::BigM, Relation::Equal) => Err(DomainError::Solver(
            "big-M linearisation only covers inequalities".to_string(),
        )),
    }
}

/// Four directional flags for one pair/step: `dx <= -d`, `dx >= d`, `dy <= -d`, `dy >= d`.
fn directional_flags(
    ctx: &mut dyn SolverContext,
    mode: IndicatorMode,
    request: &SeparationRequest<'_>,
    first: &TrajectoryVars,
    second: &TrajectoryVars,
    step: usize,
) -> DomainResult<[VarId; 4]> {
    let (dx, dy) = axis_differences(first, second, step);
    let d = request.diameter;
    let flags = [
        declare_flag(ctx, first, second, step, "left")?,
        declare_flag(ctx, first, second, step, "right")?,
        declare_flag(ctx, first, second, step, "below")?,
        declare_flag(ctx, first, second, step, "above")?,
    ];
    imply(ctx, mode, request.big_m, flags[0], dx.clone(), Relation::LessEq, -d)?;
    imply(ctx, mode, request.big_m, flags[1], dx, Relation::GreaterEq, d)?;
    imply(ctx, mode, request.big_m, flags[2], dy.clone(), Relation::LessEq, -d)?;
    imply(ctx, mode, request.big_m, flags[3], dy, Relation::GreaterEq, d)?;
    Ok(flags)
}

pub struct DiskQuadraticEncoder;

impl CollisionEncoder for DiskQuadraticEncoder {
    fn name(&self) -> &'static str {
        "disk-quadratic"
    }

    fn shape(&self) -> KinematicShape {
        KinematicShape {
            kind: VarKind::Continuous,
            footprint: Footprint::Disk,
        }
    }

    fn admits(&self, dx: f64, dy: f64, diameter: f64) -> bool {
        dx * dx + dy * dy >= diameter * diameter
    }

    fn encode(
        &self,
        ctx: &mut dyn SolverContext,
        request: &SeparationRequest<'_>,
    ) -> DomainResult<EncodingStats> {
        let mut stats = EncodingStats::default();
        let min_squared = request.diameter * request.diameter;
        for_each_pair_step(request, |first, second, step| {
            let (dx, dy) = axis_differences(first, second, step);
            let distance = QuadExpr::square(&dx) + QuadExpr::square(&dy);
            ctx.add_quadratic_constraint(distance, Relation::GreaterEq, min_squared)?;
            stats.constraints += 1;
            Ok(())
        })?;
        Ok(stats)
    }
}

/// Exclusive choice of direction on each axis, both axes required.
///
/// Agents separated along only one axis are treated as colliding. Kept as
/// its own strategy because plans produced with it are reproducible only
/// under this stricter rule.
pub struct BigMOneAxisEncoder {
    pub mode: IndicatorMode,
}

impl CollisionEncoder for BigMOneAxisEncoder {
    fn name(&self) -> &'static str {
        "big-m-one-axis"
    }

    fn shape(&self) -> KinematicShape {
        KinematicShape {
            kind: VarKind::Continuous,
            footprint: Footprint::Square,
        }
    }

    fn admits(&self, dx: f64, dy: f64, diameter: f64) -> bool {
        dx.abs() >= diameter && dy.abs() >= diameter
    }

    fn encode(
        &self,
        ctx: &mut dyn SolverContext,
        request: &SeparationRequest<'_>,
    ) -> DomainResult<EncodingStats> {
        let mut stats = EncodingStats::default();
        for_each_pair_step(request, |first, second, step| {
            let [left, right, below, above] =
                directional_flags(ctx, self.mode, request, first, second, step)?;
            // xor per axis
            ctx.add_linear_constraint(LinearExpr::sum([left, right]), Relation::Equal, 1.0)?;
            ctx.add_linear_constraint(LinearExpr::sum([below, above]), Relation::Equal, 1.0)?;
            stats.auxiliary_binaries += 4;
            stats.constraints += 6;
            Ok(())
        })?;
        Ok(stats)
    }
}

pub struct BigMAnyAxisEncoder {
    pub mode: IndicatorMode,
}

impl CollisionEncoder for BigMAnyAxisEncoder {
    fn name(&self) -> &'static str {
        "big-m-any-axis"
    }

    fn shape(&self) -> KinematicShape {
        KinematicShape {
            kind: VarKind::Continuous,
            footprint: Footprint::Square,
        }
    }

    fn admits(&self, dx: f64, dy: f64, diameter: f64) -> bool {
        dx.abs() >= diameter || dy.abs() >= diameter
    }

    fn encode(
        &self,
        ctx: &mut dyn SolverContext,
        request: &SeparationRequest<'_>,
    ) -> DomainResult<EncodingStats> {
        let mut stats = EncodingStats::default();
        for_each_pair_step(request, |first, second, step| {
            let flags = directional_flags(ctx, self.mode, request, first, second, step)?;
            ctx.add_linear_constraint(LinearExpr::sum(flags), Relation::GreaterEq, 1.0)?;
            stats.auxiliary_binaries += 4;
            stats.constraints += 5;
            Ok(())
        })?;
        Ok(stats)
    }
}

/// One no-overlap group per protected step; rectangles are the footprints
/// centred on the integer position variables.
pub struct NoOverlap2DEncoder;

impl CollisionEncoder for NoOverlap2DEncoder {
    fn name(&self) -> &'static str {
        "no-overlap-2d"
    }

    fn shape(&self) -> KinematicShape {
        KinematicShape {
            kind: VarKind::Integer,
            footprint: Footprint::Square,
        }
    }

    fn admits(&self, dx: f64, dy: f64, diameter: f64) -> bool {
        dx.abs() >= diameter || dy.abs() >= diameter
    }

    fn encode(
        &self,
        ctx: &mut dyn SolverContext,
        request: &SeparationRequest<'_>,
    ) -> DomainResult<EncodingStats> {
        let mut stats = EncodingStats::default();
        if request.trajectories.len() < 2 {
            return Ok(stats);
        }
        let half = request.diameter / 2.0;
        for step in request.steps.clone() {
            let mut x_intervals = Vec::with_capacity(request.trajectories.len());
            let mut y_intervals = Vec::with_capacity(request.trajectories.len());
            for trajectory in request.trajectories {
                let (x, y) = trajectory.position(step);
                x_intervals.push(FixedInterval {
                    start: LinearExpr::from(x) - LinearExpr::constant(half),
                    size: request.diameter,
                });
                y_intervals.push(FixedInterval {
                    start: LinearExpr::from(y) - LinearExpr::constant(half),
                    size: request.diameter,
                });
            }
            ctx.add_no_overlap_2d(x_intervals, y_intervals)?;
            stats.no_overlap_groups += 1;
            stats.constraints += 1;
        }
        Ok(stats)
    }
}
