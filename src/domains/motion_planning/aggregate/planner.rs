use super::collision::{CollisionEncoder, CollisionStrategy, EncodingStats, IndicatorMode, SeparationRequest};
use super::objective::apply_objective;
use super::scenario::Scenario;
use super::solution::{Solution, ValidationRules};
use super::trajectory::{TrajectoryModel, TrajectoryVars};
use super::types::{Displacement2D, ProtectedWindow};
use crate::common::{DomainError, DomainResult};
use crate::domains::logger::DynLogger;
use crate::domains::motion_planning::expr::VarKind;
use crate::domains::motion_planning::ports::{SolveParams, SolveStatus, SolverContext};
use crate::domains::motion_planning::warm_start::{apply_hints, SpaceTimeSearch, DEFAULT_NODE_BUDGET};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub strategy: CollisionStrategy,
    /// Adds the control-effort objective; without it any feasible plan is accepted.
    pub minimize_effort: bool,
    pub protected_window: ProtectedWindow,
    pub indicator_mode: IndicatorMode,
    /// Validation tolerance for continuous encodings.
    pub tolerance: f64,
    pub warm_start: bool,
    pub warm_start_node_budget: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            strategy: CollisionStrategy::default(),
            minimize_effort: true,
            protected_window: ProtectedWindow::default(),
            indicator_mode: IndicatorMode::default(),
            tolerance: 1e-6,
            warm_start: true,
            warm_start_node_budget: DEFAULT_NODE_BUDGET,
        }
    }
}

/// Handles into a fully registered model.
#[derive(Debug, Clone)]
pub struct PlanningModel {
    pub trajectories: Vec<TrajectoryVars>,
    pub encoding: EncodingStats,
    pub has_objective: bool,
    pub hinted_values: usize,
}

impl PlanningModel {
    pub fn trajectory_variables(&self) -> usize {
        self.trajectories.iter().map(TrajectoryVars::variable_count).sum()
    }
}

/// Drives scenario -> model -> solve -> validated solution against one solver context.
pub struct TrajectoryPlanner {
    settings: PlannerSettings,
    encoder: Box<dyn CollisionEncoder>,
    logger: DynLogger,
}

impl TrajectoryPlanner {
    pub fn new(settings: PlannerSettings, logger: DynLogger) -> Self {
        let encoder = settings.strategy.encoder(settings.indicator_mode);
        Self {
            settings,
            encoder,
            logger,
        }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn encoder(&self) -> &dyn CollisionEncoder {
        self.encoder.as_ref()
    }

    fn integral(&self) -> bool {
        self.encoder.shape().kind != VarKind::Continuous
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            footprint: self.encoder.footprint(),
            window: self.settings.protected_window,
            tolerance: if self.integral() { 0.0 } else { self.settings.tolerance },
        }
    }

    /// Fails with `Infeasible` when some agent cannot cover its start-to-target
    /// offset within `T - 1` steps at its own speed under the encoder's metric.
    pub fn check_reachability(&self, scenario: &Scenario) -> DomainResult<()> {
        let footprint = self.encoder.footprint();
        let steps = scenario.horizon_steps.saturating_sub(1) as f64;
        for agent in &scenario.agents {
            let speed = if self.integral() { agent.speed.floor() } else { agent.speed };
            let distance = footprint.movement_norm(&Displacement2D::between(&agent.start, &agent.target));
            if distance > speed * steps + self.settings.tolerance {
                self.logger.warn(&format!(
                    "{} cannot reach its target: {:.3} to cover, at most {:.3} in {} steps",
                    agent.id, distance, speed * steps, steps
                ));
                return Err(DomainError::Infeasible);
            }
        }
        Ok(())
    }

    /// Validates the scenario, then registers every variable and constraint.
    pub fn build_model(&self, scenario: &Scenario, ctx: &mut dyn SolverContext) -> DomainResult<PlanningModel> {
        self.build_model_until(scenario, ctx, None)
    }

    /// As `build_model`, abandoning the warm start once `deadline` passes.
    pub fn build_model_until(
        &self,
        scenario: &Scenario,
        ctx: &mut dyn SolverContext,
        deadline: Option<Instant>,
    ) -> DomainResult<PlanningModel> {
        scenario.validate(
            self.encoder.footprint(),
            self.integral(),
            self.settings.protected_window,
        )?;
        self.check_reachability(scenario)?;

        let shape = self.encoder.shape();
        let mut trajectories = Vec::with_capacity(scenario.agents.len());
        for agent in &scenario.agents {
            trajectories.push(TrajectoryModel::build(ctx, scenario, agent, shape)?);
        }

        let request = SeparationRequest {
            trajectories: &trajectories,
            steps: self.settings.protected_window.steps(scenario.horizon_steps),
            diameter: scenario.agent_diameter,
            big_m: scenario.grid_width.max(scenario.grid_height),
        };
        let encoding = self.encoder.encode(ctx, &request)?;
        let has_objective = apply_objective(ctx, &trajectories, self.settings.minimize_effort)?;

        let mut hinted_values = 0;
        if self.settings.warm_start {
            let search = SpaceTimeSearch::new(
                scenario,
                self.encoder.as_ref(),
                self.settings.protected_window,
                self.settings.warm_start_node_budget,
            )
            .with_deadline(deadline);
            match search.plan() {
                Some(paths) => hinted_values = apply_hints(ctx, &trajectories, &paths)?,
                None => self.logger.warn("warm start found no lattice plan; solving without hints"),
            }
        }

        let model = PlanningModel {
            trajectories,
            encoding,
            has_objective,
            hinted_values,
        };
        self.logger.info(&format!(
            "{} model: {} agents, {} trajectory variables, {} auxiliary binaries, {} separation constraints, {} no-overlap groups, objective={}",
            self.encoder.name(),
            scenario.agents.len(),
            model.trajectory_variables(),
            encoding.auxiliary_binaries,
            encoding.constraints,
            encoding.no_overlap_groups,
            has_objective,
        ));
        Ok(model)
    }

    /// Runs the solver and turns terminal statuses into errors.
    pub fn solve(&self, ctx: &mut dyn SolverContext, params: &SolveParams) -> DomainResult<SolveStatus> {
        let started = Instant::now();
        let status = ctx.solve(params)?;
        self.logger.info(&format!(
            "solver finished with {:?} after {:.3}s",
            status,
            started.elapsed().as_secs_f64()
        ));
        match status {
            SolveStatus::Optimal | SolveStatus::Feasible => Ok(status),
            SolveStatus::Infeasible => Err(DomainError::Infeasible),
            SolveStatus::TimedOut => Err(DomainError::TimedOut {
                limit: params.time_limit,
            }),
        }
    }

    /// Decodes the solved values and re-validates them; a violation is a formulation bug.
    pub fn extract(
        &self,
        scenario: &Scenario,
        model: &PlanningModel,
        ctx: &dyn SolverContext,
        status: SolveStatus,
    ) -> DomainResult<Solution> {
        let solution = Solution::extract(ctx, &model.trajectories, status, self.integral())?;
        if let Err(issue) = solution.validate(scenario, &self.validation_rules()) {
            self.logger.error(&format!(
                "{} produced an invalid plan: {}",
                self.encoder.name(),
                issue
            ));
            return Err(issue.into());
        }
        Ok(solution)
    }

    pub fn plan(
        &self,
        scenario: &Scenario,
        ctx: &mut dyn SolverContext,
        params: &SolveParams,
    ) -> DomainResult<Solution> {
        let deadline = params.time_limit.and_then(|limit| Instant::now().checked_add(limit));
        let model = self.build_model_until(scenario, ctx, deadline)?;
        let status = self.solve(ctx, params)?;
        let solution = self.extract(scenario, &model, ctx, status)?;
        self.logger.info(&format!(
            "validated plan for {} agents, control effort {:.3}",
            solution.paths.len(),
            solution.control_effort()
        ));
        Ok(solution)
    }
}
