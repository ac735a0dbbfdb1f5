use gryphon_motion::adapters::outbound::{
    init_planner_logger, parse_level, reference_solver_factory, JsonPathExporter,
};
use gryphon_motion::application::MotionPlanningService;
use gryphon_motion::{ApplicationError, Config, DomainError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

async fn load_config(path: &str) -> Result<Config, ApplicationError> {
    if Path::new(path).exists() {
        Ok(Config::from_file(path).await?)
    } else {
        warn!("{} not found, using default configuration", path);
        Ok(Config::default())
    }
}

async fn run(config_path: &str) -> Result<(), ApplicationError> {
    let config = load_config(config_path).await?;
    info!("Configuration loaded successfully");
    info!("Strategy: {:?}, window: {:?}", config.planner.strategy, config.planner.protected_window);

    let logger = init_planner_logger(
        config.logging.file.as_deref(),
        parse_level(&config.logging.level),
        None,
    );

    let mut rng = match config.scenario.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let scenario = config.scenario.to_scenario(&mut rng)?;
    info!(
        "Scenario: {} agents on a {}x{} grid over {} steps",
        scenario.agents.len(),
        scenario.grid_width,
        scenario.grid_height,
        scenario.horizon_steps
    );

    let exporter = Arc::new(JsonPathExporter::new(&config.output.paths_file));
    let service = MotionPlanningService::new(
        config.planner.clone(),
        config.solver.params(),
        logger,
        reference_solver_factory(),
    )
    .with_exporter(exporter);

    let report = service.plan(scenario).await?;
    info!(
        "Plan {} ({:?}) written to {}, control effort {:.3}",
        report.plan_id,
        report.solution.status,
        config.output.paths_file,
        report.solution.control_effort()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Gryphon Motion");
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());

    match run(&config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ApplicationError::Domain(DomainError::Infeasible)) => {
            error!("No collision-free plan exists for this scenario");
            ExitCode::from(2)
        }
        Err(ApplicationError::Domain(DomainError::TimedOut { limit })) => {
            error!("No plan found within the time limit ({:?})", limit);
            ExitCode::from(3)
        }
        Err(e) => {
            error!("Planning failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
