use gryphon_motion::adapters::outbound::reference_solver::ReferenceSolver;
use gryphon_motion::common::{DomainError, ScenarioError};
use gryphon_motion::domains::motion_planning::*;

fn three_agents() -> Scenario {
    Scenario::new(60.0, 60.0, 10.0, 10, 10.0)
        .with_agent(Point2D::new(15.0, 15.0), Point2D::new(45.0, 15.0), 10.0)
        .with_agent(Point2D::new(15.0, 45.0), Point2D::new(45.0, 45.0), 10.0)
        .with_agent(Point2D::new(30.0, 30.0), Point2D::new(30.0, 50.0), 10.0)
}

fn build_all(
    scenario: &Scenario,
    strategy: CollisionStrategy,
    mode: IndicatorMode,
) -> (ReferenceSolver, Vec<TrajectoryVars>, EncodingStats) {
    let encoder = strategy.encoder(mode);
    let mut ctx = ReferenceSolver::new();
    let trajectories: Vec<TrajectoryVars> = scenario
        .agents
        .iter()
        .map(|agent| TrajectoryModel::build(&mut ctx, scenario, agent, encoder.shape()).unwrap())
        .collect();
    let request = SeparationRequest {
        trajectories: &trajectories,
        steps: ProtectedWindow::Interior.steps(scenario.horizon_steps),
        diameter: scenario.agent_diameter,
        big_m: 60.0,
    };
    let stats = encoder.encode(&mut ctx, &request).unwrap();
    (ctx, trajectories, stats)
}

#[cfg(test)]
mod trajectory_model_tests {
    use super::*;

    #[test]
    fn test_variables_and_constraints_per_agent() {
        let scenario = three_agents();
        let shape = CollisionStrategy::BigMAnyAxis.encoder(IndicatorMode::Native).shape();
        let mut ctx = ReferenceSolver::new();
        let vars = TrajectoryModel::build(&mut ctx, &scenario, &scenario.agents[0], shape).unwrap();

        assert_eq!(vars.horizon_steps(), 10);
        assert_eq!(vars.mov_x.len(), 9);
        assert_eq!(vars.variable_count(), 38);

        let stats = ctx.stats();
        assert_eq!(stats.variables, 38);
        // four boundary rows plus two continuity rows per transition
        assert_eq!(stats.linear, 4 + 2 * 9);
        assert_eq!(stats.quadratic, 0);
    }

    #[test]
    fn test_position_bounds_follow_footprint() {
        let scenario = three_agents();
        let shape = CollisionStrategy::BigMAnyAxis.encoder(IndicatorMode::Native).shape();
        let mut ctx = ReferenceSolver::new();
        let vars = TrajectoryModel::build(&mut ctx, &scenario, &scenario.agents[0], shape).unwrap();

        let pos = ctx.variable(vars.pos_x[3]).unwrap();
        assert_eq!((pos.lower, pos.upper), (5.0, 55.0));
        assert_eq!(pos.name, "agent-0_pos_x_3");
        let mov = ctx.variable(vars.mov_y[0]).unwrap();
        assert_eq!((mov.lower, mov.upper), (-10.0, 10.0));
        assert_eq!(mov.kind, VarKind::Continuous);
    }

    #[test]
    fn test_disk_model_adds_speed_norm_rows() {
        let scenario = three_agents();
        let shape = CollisionStrategy::DiskQuadratic.encoder(IndicatorMode::Native).shape();
        let mut ctx = ReferenceSolver::new();
        TrajectoryModel::build(&mut ctx, &scenario, &scenario.agents[0], shape).unwrap();
        assert_eq!(ctx.stats().quadratic, 9);
    }

    #[test]
    fn test_integer_model_uses_integer_variables() {
        let scenario = Scenario::new(61.0, 61.0, 11.0, 10, 7.5).with_agent(
            Point2D::new(15.0, 15.0),
            Point2D::new(45.0, 15.0),
            7.5,
        );
        let shape = CollisionStrategy::NoOverlap2D.encoder(IndicatorMode::Native).shape();
        let mut ctx = ReferenceSolver::new();
        let vars = TrajectoryModel::build(&mut ctx, &scenario, &scenario.agents[0], shape).unwrap();

        let pos = ctx.variable(vars.pos_x[1]).unwrap();
        assert_eq!(pos.kind, VarKind::Integer);
        assert_eq!((pos.lower, pos.upper), (6.0, 55.0));
        let mov = ctx.variable(vars.mov_x[1]).unwrap();
        assert_eq!((mov.lower, mov.upper), (-7.0, 7.0));
    }

    #[test]
    fn test_out_of_bounds_agent_never_reaches_the_solver() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 10, 10.0).with_agent(
            Point2D::new(15.0, 15.0),
            Point2D::new(58.0, 15.0),
            10.0,
        );
        let shape = CollisionStrategy::BigMAnyAxis.encoder(IndicatorMode::Native).shape();
        let mut ctx = ReferenceSolver::new();
        let result = TrajectoryModel::build(&mut ctx, &scenario, &scenario.agents[0], shape);
        assert!(matches!(
            result,
            Err(DomainError::Scenario(ScenarioError::OutOfBounds {
                endpoint: Endpoint::Target,
                ..
            }))
        ));
        assert_eq!(ctx.stats().variables, 0);
    }
}

#[cfg(test)]
mod collision_encoder_tests {
    use super::*;

    // three pairs over the eight interior steps of a ten-step horizon
    const PAIR_STEPS: usize = 3 * 8;

    #[test]
    fn test_any_axis_counts() {
        let (ctx, _, stats) = build_all(&three_agents(), CollisionStrategy::BigMAnyAxis, IndicatorMode::Native);
        assert_eq!(stats.auxiliary_binaries, 4 * PAIR_STEPS);
        assert_eq!(stats.constraints, 5 * PAIR_STEPS);
        assert_eq!(stats.no_overlap_groups, 0);

        let model = ctx.stats();
        assert_eq!(model.binaries, 4 * PAIR_STEPS);
        assert_eq!(model.indicator, 4 * PAIR_STEPS);
        assert_eq!(model.linear, 3 * 22 + PAIR_STEPS);
    }

    #[test]
    fn test_one_axis_adds_an_exclusive_choice_per_axis() {
        let (ctx, _, stats) = build_all(&three_agents(), CollisionStrategy::BigMOneAxis, IndicatorMode::Native);
        assert_eq!(stats.auxiliary_binaries, 4 * PAIR_STEPS);
        assert_eq!(stats.constraints, 6 * PAIR_STEPS);
        assert_eq!(ctx.stats().linear, 3 * 22 + 2 * PAIR_STEPS);
    }

    #[test]
    fn test_big_m_mode_replaces_indicators_with_linear_rows() {
        let (ctx, _, stats) = build_all(&three_agents(), CollisionStrategy::BigMAnyAxis, IndicatorMode::BigM);
        assert_eq!(stats.constraints, 5 * PAIR_STEPS);
        let model = ctx.stats();
        assert_eq!(model.indicator, 0);
        assert_eq!(model.linear, 3 * 22 + 5 * PAIR_STEPS);
    }

    #[test]
    fn test_disk_emits_one_quadratic_row_per_pair_step() {
        let (ctx, _, stats) = build_all(&three_agents(), CollisionStrategy::DiskQuadratic, IndicatorMode::Native);
        assert_eq!(stats.auxiliary_binaries, 0);
        assert_eq!(stats.constraints, PAIR_STEPS);
        // plus nine speed rows per agent
        assert_eq!(ctx.stats().quadratic, PAIR_STEPS + 3 * 9);
    }

    #[test]
    fn test_no_overlap_emits_one_group_per_step() {
        let (ctx, _, stats) = build_all(&three_agents(), CollisionStrategy::NoOverlap2D, IndicatorMode::Native);
        assert_eq!(stats.no_overlap_groups, 8);
        assert_eq!(stats.auxiliary_binaries, 0);
        assert_eq!(ctx.stats().no_overlap, 8);
    }

    #[test]
    fn test_single_agent_needs_no_separation() {
        let scenario = Scenario::new(60.0, 60.0, 10.0, 10, 10.0).with_agent(
            Point2D::new(15.0, 15.0),
            Point2D::new(45.0, 15.0),
            10.0,
        );
        for strategy in [
            CollisionStrategy::DiskQuadratic,
            CollisionStrategy::BigMOneAxis,
            CollisionStrategy::BigMAnyAxis,
            CollisionStrategy::NoOverlap2D,
        ] {
            let (_, _, stats) = build_all(&scenario, strategy, IndicatorMode::Native);
            assert_eq!(stats, EncodingStats::default());
        }
    }

    #[test]
    fn test_separation_predicates() {
        let disk = CollisionStrategy::DiskQuadratic.encoder(IndicatorMode::Native);
        let one = CollisionStrategy::BigMOneAxis.encoder(IndicatorMode::Native);
        let any = CollisionStrategy::BigMAnyAxis.encoder(IndicatorMode::Native);
        let grid = CollisionStrategy::NoOverlap2D.encoder(IndicatorMode::Native);

        // side by side on one axis
        assert!(disk.admits(10.0, 0.0, 10.0));
        assert!(!one.admits(10.0, 0.0, 10.0));
        assert!(any.admits(10.0, 0.0, 10.0));
        assert!(grid.admits(10.0, 0.0, 10.0));

        // diagonal gap that squares clear but disks do not need
        assert!(disk.admits(8.0, 8.0, 10.0));
        assert!(!any.admits(8.0, 8.0, 10.0));
    }

    #[test]
    fn test_flags_are_named_after_pair_and_step() {
        let (ctx, trajectories, _) =
            build_all(&three_agents(), CollisionStrategy::BigMAnyAxis, IndicatorMode::Native);
        let first_flag = VarId(trajectories.iter().map(TrajectoryVars::variable_count).sum());
        assert_eq!(
            ctx.variable(first_flag).unwrap().name,
            "sep_agent-0_agent-1_step_1_left"
        );
    }
}

#[cfg(test)]
mod objective_tests {
    use super::*;

    #[test]
    fn test_control_effort_sums_squared_movements() {
        let (_, trajectories, _) =
            build_all(&three_agents(), CollisionStrategy::BigMAnyAxis, IndicatorMode::Native);
        let effort = control_effort(&trajectories);
        // two squared components per movement, nine movements, three agents
        assert_eq!(effort.quadratic.len(), 2 * 9 * 3);
        assert_eq!(effort.evaluate(|_| 2.0), 4.0 * 2.0 * 9.0 * 3.0);
    }

    #[test]
    fn test_objective_toggle() {
        let (mut ctx, trajectories, _) =
            build_all(&three_agents(), CollisionStrategy::BigMAnyAxis, IndicatorMode::Native);
        assert!(!apply_objective(&mut ctx, &trajectories, false).unwrap());
        assert!(apply_objective(&mut ctx, &trajectories, true).unwrap());
    }
}
