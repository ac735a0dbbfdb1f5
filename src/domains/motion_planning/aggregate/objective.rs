use super::trajectory::TrajectoryVars;
use crate::common::DomainResult;
use crate::domains::motion_planning::expr::{LinearExpr, QuadExpr, Sense};
use crate::domains::motion_planning::ports::SolverContext;

/// Control effort: sum of squared movement magnitudes over all agents and steps.
pub fn control_effort(trajectories: &[TrajectoryVars]) -> QuadExpr {
    let mut effort = QuadExpr::new();
    for trajectory in trajectories {
        for (mx, my) in trajectory.mov_x.iter().zip(&trajectory.mov_y) {
            effort = effort
                + QuadExpr::square(&LinearExpr::from(*mx))
                + QuadExpr::square(&LinearExpr::from(*my));
        }
    }
    effort
}

/// Registers the control-effort objective when `enabled`; returns whether it did.
pub fn apply_objective(
    ctx: &mut dyn SolverContext,
    trajectories: &[TrajectoryVars],
    enabled: bool,
) -> DomainResult<bool> {
    if !enabled {
        return Ok(false);
    }
    ctx.set_objective(control_effort(trajectories), Sense::Minimize)?;
    Ok(true)
}
