use gryphon_motion::common::{DomainError, ScenarioError};
use gryphon_motion::domains::motion_planning::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn swap_scenario() -> Scenario {
    Scenario::new(60.0, 60.0, 10.0, 10, 10.0)
        .with_agent(Point2D::new(15.0, 30.0), Point2D::new(45.0, 30.0), 10.0)
        .with_agent(Point2D::new(45.0, 30.0), Point2D::new(15.0, 30.0), 10.0)
}

#[cfg(test)]
mod scenario_validation_tests {
    use super::*;

    #[test]
    fn test_swap_scenario_is_valid_for_interior_window() {
        let scenario = swap_scenario();
        assert_eq!(scenario.agents[1].id, AgentId(1));
        assert!(scenario
            .validate(Footprint::Square, true, ProtectedWindow::Interior)
            .is_ok());
    }

    #[test]
    fn test_footprint_bounds_leave_half_diameter_margin() {
        let bounds = swap_scenario().footprint_bounds();
        assert_eq!(bounds.min_x, 5.0);
        assert_eq!(bounds.max_x, 55.0);
        assert_eq!(bounds.min_y, 5.0);
        assert_eq!(bounds.max_y, 55.0);
    }

    #[test]
    fn test_start_outside_footprint_bounds_is_rejected() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 10, 10.0).with_agent(
            Point2D::new(3.0, 30.0),
            Point2D::new(45.0, 30.0),
            10.0,
        );
        match scenario.validate(Footprint::Square, false, ProtectedWindow::Interior) {
            Err(ScenarioError::OutOfBounds { agent, endpoint, .. }) => {
                assert_eq!(agent, AgentId(0));
                assert_eq!(endpoint, Endpoint::Start);
            }
            other => panic!("expected OutOfBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_dimensions_are_rejected() {
        let scenario = Scenario::new(60.0, 0.0, 10.0, 10, 10.0);
        assert!(matches!(
            scenario.validate_dimensions(),
            Err(ScenarioError::NonPositive { field: "grid_height", .. })
        ));

        let scenario = Scenario::new(60.0, 60.0, -1.0, 10, 10.0);
        assert!(matches!(
            scenario.validate_dimensions(),
            Err(ScenarioError::NonPositive { field: "agent_diameter", .. })
        ));
    }

    #[test]
    fn test_diameter_larger_than_grid_is_rejected() {
        let scenario = Scenario::new(60.0, 8.0, 10.0, 10, 10.0);
        assert!(matches!(
            scenario.validate_dimensions(),
            Err(ScenarioError::DiameterExceedsGrid { .. })
        ));
    }

    #[test]
    fn test_horizon_needs_two_steps() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 1, 10.0);
        assert_eq!(
            scenario.validate_dimensions(),
            Err(ScenarioError::HorizonTooShort { steps: 1 })
        );
    }

    #[test]
    fn test_empty_scenario_is_rejected() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 10, 10.0);
        assert_eq!(
            scenario.validate(Footprint::Disk, false, ProtectedWindow::Interior),
            Err(ScenarioError::NoAgents)
        );
    }

    #[test]
    fn test_speed_above_limit_is_rejected() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 10, 5.0).with_agent(
            Point2D::new(15.0, 30.0),
            Point2D::new(45.0, 30.0),
            6.0,
        );
        assert!(matches!(
            scenario.validate(Footprint::Square, false, ProtectedWindow::Interior),
            Err(ScenarioError::SpeedAboveLimit { .. })
        ));
    }

    #[test]
    fn test_non_integral_placement_only_matters_for_integer_models() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 10, 10.0).with_agent(
            Point2D::new(15.5, 30.0),
            Point2D::new(45.0, 30.0),
            10.0,
        );
        assert!(scenario
            .validate(Footprint::Square, false, ProtectedWindow::Interior)
            .is_ok());
        assert!(matches!(
            scenario.validate(Footprint::Square, true, ProtectedWindow::Interior),
            Err(ScenarioError::NonIntegralPlacement { .. })
        ));
    }

    #[test]
    fn test_shared_start_cell_is_rejected() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 10, 10.0)
            .with_agent(Point2D::new(15.0, 30.0), Point2D::new(45.0, 30.0), 10.0)
            .with_agent(Point2D::new(15.0, 30.0), Point2D::new(45.0, 50.0), 10.0);
        match scenario.validate(Footprint::Square, false, ProtectedWindow::Interior) {
            Err(ScenarioError::DuplicatePlacement {
                first,
                second,
                endpoint,
                ..
            }) => {
                assert_eq!((first, second), (AgentId(0), AgentId(1)));
                assert_eq!(endpoint, Endpoint::Start);
            }
            other => panic!("expected DuplicatePlacement, got {:?}", other),
        }
    }

    #[test]
    fn test_full_window_requires_separated_endpoints() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 10, 10.0)
            .with_agent(Point2D::new(15.0, 30.0), Point2D::new(45.0, 30.0), 10.0)
            .with_agent(Point2D::new(20.0, 30.0), Point2D::new(45.0, 50.0), 10.0);
        assert!(scenario
            .validate(Footprint::Square, false, ProtectedWindow::Interior)
            .is_ok());
        assert!(matches!(
            scenario.validate(Footprint::Square, false, ProtectedWindow::Full),
            Err(ScenarioError::OverlappingEndpoints { .. })
        ));
    }

    #[test]
    fn test_protected_window_steps() {
        assert_eq!(ProtectedWindow::Interior.steps(10), 1..9);
        assert_eq!(ProtectedWindow::Full.steps(10), 0..10);
        assert!(ProtectedWindow::Interior.steps(2).is_empty());
    }
}

#[cfg(test)]
mod scenario_generation_tests {
    use super::*;

    fn template() -> ScenarioTemplate {
        ScenarioTemplate {
            grid_width: 60.0,
            grid_height: 60.0,
            agent_diameter: 10.0,
            horizon_steps: 10,
            speed_limit: 10.0,
        }
    }

    #[test]
    fn test_pool_is_a_diameter_spaced_lattice() {
        let pool = GridPoolGenerator::pool(&template());
        assert_eq!(pool.len(), 36);
        assert!(pool.contains(&Point2D::new(5.0, 5.0)));
        assert!(pool.contains(&Point2D::new(55.0, 55.0)));
    }

    #[test]
    fn test_generated_scenario_is_valid_and_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let scenario = GridPoolGenerator::new(4).generate(&template(), &mut rng).unwrap();
        assert_eq!(scenario.agents.len(), 4);
        assert!(scenario
            .validate(Footprint::Square, true, ProtectedWindow::Full)
            .is_ok());

        let mut cells: Vec<Point2D> = scenario
            .agents
            .iter()
            .flat_map(|a| [a.start, a.target])
            .collect();
        assert_eq!(cells.len(), 8);
        for (i, cell) in cells.iter().enumerate() {
            assert!(!cells[i + 1..].contains(cell));
        }
        for agent in &scenario.agents {
            assert_eq!(agent.speed, 10.0);
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let generator = GridPoolGenerator::new(3);
        let a = generator
            .generate(&template(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = generator
            .generate(&template(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_many_agents_for_the_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = GridPoolGenerator::new(19).generate(&template(), &mut rng);
        match result {
            Err(DomainError::Scenario(ScenarioError::InsufficientCells { required, available })) => {
                assert_eq!(required, 38);
                assert_eq!(available, 36);
            }
            other => panic!("expected InsufficientCells, got {:?}", other),
        }
    }
}
