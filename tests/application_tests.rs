use gryphon_motion::adapters::outbound::{
    init_noop_logger, read_exported_paths, reference_solver_factory, JsonPathExporter,
};
use gryphon_motion::application::MotionPlanningService;
use gryphon_motion::common::{ApplicationError, DomainError};
use gryphon_motion::domains::motion_planning::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn swap_scenario() -> Scenario {
    Scenario::new(60.0, 60.0, 10.0, 10, 10.0)
        .with_agent(Point2D::new(15.0, 30.0), Point2D::new(45.0, 30.0), 10.0)
        .with_agent(Point2D::new(45.0, 30.0), Point2D::new(15.0, 30.0), 10.0)
}

fn params() -> SolveParams {
    SolveParams {
        time_limit: Some(Duration::from_secs(30)),
        threads: 1,
    }
}

#[tokio::test]
async fn test_service_plans_and_exports() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("paths.json");
    let service = MotionPlanningService::new(
        PlannerSettings::default(),
        params(),
        init_noop_logger(),
        reference_solver_factory(),
    )
    .with_exporter(Arc::new(JsonPathExporter::new(&file)));

    let report = service.plan(swap_scenario()).await.unwrap();

    assert_eq!(report.strategy, CollisionStrategy::BigMAnyAxis);
    assert!(report.solution.is_feasible());
    let exported = read_exported_paths(&file).unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0].len(), 10);
    assert_eq!(exported[0][0], [15.0, 30.0]);
    assert_eq!(exported[1][9], [15.0, 30.0]);
    assert_eq!(exported, report.solution.export_paths());
}

#[tokio::test]
async fn test_each_plan_gets_its_own_id() {
    let service = MotionPlanningService::new(
        PlannerSettings::default(),
        params(),
        init_noop_logger(),
        reference_solver_factory(),
    );
    let a = service.plan(swap_scenario()).await.unwrap();
    let b = service.plan(swap_scenario()).await.unwrap();
    assert_ne!(a.plan_id, b.plan_id);
    assert_eq!(a.solution.export_paths(), b.solution.export_paths());
}

#[tokio::test]
async fn test_invalid_scenario_surfaces_as_domain_error() {
    let service = MotionPlanningService::new(
        PlannerSettings::default(),
        params(),
        init_noop_logger(),
        reference_solver_factory(),
    );
    let empty = Scenario::new(60.0, 60.0, 10.0, 10, 10.0);
    let result = service.plan(empty).await;
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::Scenario(_)))
    ));
}

#[tokio::test]
async fn test_infeasible_scenario() {
    let service = MotionPlanningService::new(
        PlannerSettings::default(),
        SolveParams::default(),
        init_noop_logger(),
        reference_solver_factory(),
    );
    let scenario = Scenario::new(100.0, 100.0, 16.0, 15, 10.0).with_agent(
        Point2D::new(20.0, 50.0),
        Point2D::new(80.0, 50.0),
        4.0,
    );
    assert!(matches!(
        service.plan(scenario).await,
        Err(ApplicationError::Domain(DomainError::Infeasible))
    ));
}

#[tokio::test]
async fn test_report_serializes() {
    let service = MotionPlanningService::new(
        PlannerSettings::default(),
        params(),
        init_noop_logger(),
        reference_solver_factory(),
    );
    let report = service.plan(swap_scenario()).await.unwrap();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains(&report.plan_id.to_string()));
    assert!(json.contains("\"strategy\":\"big_m_any_axis\""));
}

#[tokio::test]
async fn test_maximal_time_limit_does_not_overflow_the_grace_period() {
    let params = SolveParams {
        time_limit: Some(Duration::MAX),
        threads: 1,
    };
    let service = MotionPlanningService::new(
        PlannerSettings::default(),
        params,
        init_noop_logger(),
        reference_solver_factory(),
    );
    let report = service.plan(swap_scenario()).await.unwrap();
    assert!(report.solution.is_feasible());
}
