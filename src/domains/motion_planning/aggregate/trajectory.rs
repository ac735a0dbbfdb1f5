use super::scenario::{Agent, Scenario};
use super::types::{AgentId, Footprint};
use crate::common::DomainResult;
use crate::domains::motion_planning::expr::{LinearExpr, QuadExpr, Relation, VarId, VarKind};
use crate::domains::motion_planning::ports::SolverContext;

/// Variable handles owned by one agent's trajectory.
///
/// `pos_*` have `horizon_steps` entries, `mov_*` one fewer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryVars {
    pub agent: AgentId,
    pub pos_x: Vec<VarId>,
    pub pos_y: Vec<VarId>,
    pub mov_x: Vec<VarId>,
    pub mov_y: Vec<VarId>,
}

impl TrajectoryVars {
    pub fn horizon_steps(&self) -> usize {
        self.pos_x.len()
    }

    pub fn position(&self, step: usize) -> (VarId, VarId) {
        (self.pos_x[step], self.pos_y[step])
    }

    pub fn movement(&self, step: usize) -> (VarId, VarId) {
        (self.mov_x[step], self.mov_y[step])
    }

    pub fn variable_count(&self) -> usize {
        self.pos_x.len() + self.pos_y.len() + self.mov_x.len() + self.mov_y.len()
    }
}

/// How the trajectory variables are typed and how speed is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KinematicShape {
    pub kind: VarKind,
    pub footprint: Footprint,
}

pub struct TrajectoryModel;

impl TrajectoryModel {
    /// Declares the agent's position/movement variables and registers
    /// boundary, continuity and speed constraints against `ctx`.
    ///
    /// Footprint bounds are checked before anything reaches the solver.
    pub fn build(
        ctx: &mut dyn SolverContext,
        scenario: &Scenario,
        agent: &Agent,
        shape: KinematicShape,
    ) -> DomainResult<TrajectoryVars> {
        scenario.validate_dimensions()?;
        scenario.check_footprint(agent)?;

        let steps = scenario.horizon_steps;
        let bounds = scenario.footprint_bounds();
        let (min_x, max_x, min_y, max_y, speed) = match shape.kind {
            VarKind::Continuous => (
                bounds.min_x,
                bounds.max_x,
                bounds.min_y,
                bounds.max_y,
                agent.speed,
            ),
            _ => (
                bounds.min_x.ceil(),
                bounds.max_x.floor(),
                bounds.min_y.ceil(),
                bounds.max_y.floor(),
                agent.speed.floor(),
            ),
        };

        let mut vars = TrajectoryVars {
            agent: agent.id,
            pos_x: Vec::with_capacity(steps),
            pos_y: Vec::with_capacity(steps),
            mov_x: Vec::with_capacity(steps - 1),
            mov_y: Vec::with_capacity(steps - 1),
        };
        for t in 0..steps {
            vars.pos_x.push(ctx.declare_variable(
                shape.kind,
                min_x,
                max_x,
                &format!("{}_pos_x_{}", agent.id, t),
            )?);
            vars.pos_y.push(ctx.declare_variable(
                shape.kind,
                min_y,
                max_y,
                &format!("{}_pos_y_{}", agent.id, t),
            )?);
        }
        for t in 0..steps - 1 {
            vars.mov_x.push(ctx.declare_variable(
                shape.kind,
                -speed,
                speed,
                &format!("{}_mov_x_{}", agent.id, t),
            )?);
            vars.mov_y.push(ctx.declare_variable(
                shape.kind,
                -speed,
                speed,
                &format!("{}_mov_y_{}", agent.id, t),
            )?);
        }

        // start and target
        let last = steps - 1;
        ctx.add_linear_constraint(vars.pos_x[0].into(), Relation::Equal, agent.start.x)?;
        ctx.add_linear_constraint(vars.pos_y[0].into(), Relation::Equal, agent.start.y)?;
        ctx.add_linear_constraint(vars.pos_x[last].into(), Relation::Equal, agent.target.x)?;
        ctx.add_linear_constraint(vars.pos_y[last].into(), Relation::Equal, agent.target.y)?;

        // pos[t] = pos[t-1] + mov[t-1]
        for t in 1..steps {
            for (pos, mov) in [(&vars.pos_x, &vars.mov_x), (&vars.pos_y, &vars.mov_y)] {
                let continuity = LinearExpr::difference(pos[t], pos[t - 1]).plus(mov[t - 1], -1.0);
                ctx.add_linear_constraint(continuity, Relation::Equal, 0.0)?;
            }
        }

        // Box bounds already cap each axis; the disk model also caps the Euclidean norm.
        if shape.footprint == Footprint::Disk {
            for t in 0..steps - 1 {
                let norm = QuadExpr::square(&LinearExpr::from(vars.mov_x[t]))
                    + QuadExpr::square(&LinearExpr::from(vars.mov_y[t]));
                ctx.add_quadratic_constraint(norm, Relation::LessEq, agent.speed * agent.speed)?;
            }
        }

        Ok(vars)
    }
}
