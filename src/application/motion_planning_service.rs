// Motion Planning Service - async shell around the synchronous planner
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::common::{ApplicationError, ApplicationResult, DomainError};
use crate::domains::logger::{DynLogger, ScopedLogger};
use crate::domains::motion_planning::{
    CollisionStrategy, PathExporter, PlannerSettings, Scenario, Solution, SolveParams,
    SolverContext, TrajectoryPlanner,
};

/// Builds a fresh, empty solver context for every plan.
pub type SolverFactory = Arc<dyn Fn() -> Box<dyn SolverContext> + Send + Sync>;

const DEFAULT_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub plan_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub strategy: CollisionStrategy,
    pub solve_millis: u64,
    pub solution: Solution,
}

pub struct MotionPlanningService {
    settings: PlannerSettings,
    params: SolveParams,
    logger: DynLogger,
    solver_factory: SolverFactory,
    exporter: Option<Arc<dyn PathExporter>>,
    grace: Duration,
}

impl MotionPlanningService {
    pub fn new(
        settings: PlannerSettings,
        params: SolveParams,
        logger: DynLogger,
        solver_factory: SolverFactory,
    ) -> Self {
        Self {
            settings,
            params,
            logger,
            solver_factory,
            exporter: None,
            grace: DEFAULT_GRACE,
        }
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn PathExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Extra wall-clock time granted on top of the solver time limit.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Validates, builds, solves and extracts on the blocking pool, then exports.
    pub async fn plan(&self, scenario: Scenario) -> ApplicationResult<PlanReport> {
        let plan_id = Uuid::new_v4();
        let logger: DynLogger = Arc::new(ScopedLogger::new(plan_id.to_string(), self.logger.clone()));
        let settings = self.settings.clone();
        let params = self.params.clone();
        let factory = self.solver_factory.clone();
        let strategy = settings.strategy;

        info!(%plan_id, agents = scenario.agents.len(), ?strategy, "planning started");
        let started = Instant::now();
        let task = tokio::task::spawn_blocking(move || {
            let planner = TrajectoryPlanner::new(settings, logger);
            let mut ctx = factory();
            planner.plan(&scenario, ctx.as_mut(), &params)
        });

        // A limit too large to extend by the grace period is treated as none.
        let budget = self
            .params
            .time_limit
            .and_then(|limit| limit.checked_add(self.grace).map(|budget| (limit, budget)));
        let joined = match budget {
            Some((limit, budget)) => match tokio::time::timeout(budget, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(%plan_id, "solver did not return within its time limit");
                    return Err(DomainError::TimedOut { limit: Some(limit) }.into());
                }
            },
            None => task.await,
        };
        let solution = joined.map_err(|e| ApplicationError::Task(e.to_string()))??;
        let solve_millis = started.elapsed().as_millis() as u64;

        if let Some(exporter) = &self.exporter {
            exporter
                .export(&solution)
                .map_err(|e| ApplicationError::Export(e.to_string()))?;
        }

        info!(%plan_id, solve_millis, effort = solution.control_effort(), "planning finished");
        Ok(PlanReport {
            plan_id,
            created_at: Utc::now(),
            strategy,
            solve_millis,
            solution,
        })
    }
}
