//! Prioritized space-time search producing warm-start hints.
//!
//! Agents are planned one after another on the integer lattice. Each search
//! minimises squared movement (the control-effort objective) and treats the
//! already planned agents as moving obstacles under the active encoder's own
//! separation predicate, so a hint it returns satisfies the model as encoded.

use crate::common::DomainResult;
use crate::domains::motion_planning::aggregate::collision::CollisionEncoder;
use crate::domains::motion_planning::aggregate::scenario::{Agent, Scenario};
use crate::domains::motion_planning::aggregate::trajectory::TrajectoryVars;
use crate::domains::motion_planning::aggregate::types::{Footprint, Point2D, ProtectedWindow};
use crate::domains::motion_planning::ports::SolverContext;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::Instant;

pub const DEFAULT_NODE_BUDGET: usize = 100_000;

type Cell = (i64, i64);
type StateKey = (i64, i64, usize);

pub struct SpaceTimeSearch<'a> {
    scenario: &'a Scenario,
    encoder: &'a dyn CollisionEncoder,
    window: ProtectedWindow,
    node_budget: usize,
    deadline: Option<Instant>,
}

impl<'a> SpaceTimeSearch<'a> {
    pub fn new(
        scenario: &'a Scenario,
        encoder: &'a dyn CollisionEncoder,
        window: ProtectedWindow,
        node_budget: usize,
    ) -> Self {
        Self {
            scenario,
            encoder,
            window,
            node_budget,
            deadline: None,
        }
    }

    /// Gives up (returning no hints) once `deadline` passes.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    /// Lattice paths for every agent in scenario order, or `None` when any
    /// agent has a non-integral endpoint or its search runs out of budget or time.
    pub fn plan(&self) -> Option<Vec<Vec<Point2D>>> {
        let mut planned: Vec<Vec<Cell>> = Vec::with_capacity(self.scenario.agents.len());
        for agent in &self.scenario.agents {
            if !agent.start.is_integral() || !agent.target.is_integral() {
                return None;
            }
            let path = self.plan_agent(agent, &planned)?;
            planned.push(path);
        }
        Some(
            planned
                .into_iter()
                .map(|cells| {
                    cells
                        .into_iter()
                        .map(|(x, y)| Point2D::new(x as f64, y as f64))
                        .collect()
                })
                .collect(),
        )
    }

    /// Lattice moves within `speed`, never longer than the grid `span`.
    fn moves(&self, speed: f64, span: i64) -> Vec<Cell> {
        let reach = speed.floor().min(span as f64).max(0.0) as i64;
        let footprint = self.encoder.footprint();
        let mut moves = Vec::new();
        for mx in -reach..=reach {
            for my in -reach..=reach {
                let within = match footprint {
                    Footprint::Disk => ((mx * mx + my * my) as f64) <= speed * speed,
                    Footprint::Square => true,
                };
                if within {
                    moves.push((mx, my));
                }
            }
        }
        moves
    }

    fn reachable(&self, from: Cell, to: Cell, remaining: usize, speed: f64) -> bool {
        let dx = (to.0 - from.0) as f64;
        let dy = (to.1 - from.1) as f64;
        let budget = remaining as f64 * speed;
        match self.encoder.footprint() {
            Footprint::Disk => (dx * dx + dy * dy).sqrt() <= budget + 1e-9,
            Footprint::Square => dx.abs().max(dy.abs()) <= remaining as f64 * speed.floor(),
        }
    }

    /// Minimum squared-movement cost to cover the remaining offset in `remaining` steps.
    fn heuristic(from: Cell, to: Cell, remaining: usize) -> f64 {
        let dx = (to.0 - from.0) as f64;
        let dy = (to.1 - from.1) as f64;
        if remaining == 0 {
            return 0.0;
        }
        (dx * dx + dy * dy) / remaining as f64
    }

    fn admitted(&self, cell: Cell, step: usize, planned: &[Vec<Cell>]) -> bool {
        if !self.window.steps(self.scenario.horizon_steps).contains(&step) {
            return true;
        }
        planned.iter().all(|other| {
            let (ox, oy) = other[step];
            self.encoder.admits(
                (cell.0 - ox) as f64,
                (cell.1 - oy) as f64,
                self.scenario.agent_diameter,
            )
        })
    }

    fn plan_agent(&self, agent: &Agent, planned: &[Vec<Cell>]) -> Option<Vec<Cell>> {
        let last = self.scenario.horizon_steps - 1;
        let bounds = self.scenario.footprint_bounds();
        let (lo_x, hi_x) = (bounds.min_x.ceil() as i64, bounds.max_x.floor() as i64);
        let (lo_y, hi_y) = (bounds.min_y.ceil() as i64, bounds.max_y.floor() as i64);
        let start: Cell = (agent.start.x as i64, agent.start.y as i64);
        let target: Cell = (agent.target.x as i64, agent.target.y as i64);
        if !self.reachable(start, target, last, agent.speed) {
            return None;
        }
        let span = (hi_x - lo_x).max(hi_y - lo_y).max(0);
        let moves = self.moves(agent.speed, span);

        let mut open = BinaryHeap::new();
        let mut best: HashMap<StateKey, f64> = HashMap::new();
        let mut parent: HashMap<StateKey, StateKey> = HashMap::new();
        let mut closed: HashSet<StateKey> = HashSet::new();

        let origin = (start.0, start.1, 0);
        best.insert(origin, 0.0);
        open.push(Reverse((
            OrderedFloat(Self::heuristic(start, target, last)),
            Reverse(0usize),
            start.0,
            start.1,
        )));

        let mut expansions = 0usize;
        while let Some(Reverse((_, Reverse(step), x, y))) = open.pop() {
            let key = (x, y, step);
            if !closed.insert(key) {
                continue;
            }
            if step == last {
                if (x, y) == target {
                    return Some(Self::reconstruct(&parent, key));
                }
                continue;
            }
            expansions += 1;
            if expansions > self.node_budget || self.expired() {
                return None;
            }

            let g = best.get(&key).copied().unwrap_or(f64::INFINITY);
            let next_step = step + 1;
            let remaining = last - next_step;
            for &(mx, my) in &moves {
                let cell = (x + mx, y + my);
                if cell.0 < lo_x || cell.0 > hi_x || cell.1 < lo_y || cell.1 > hi_y {
                    continue;
                }
                if remaining == 0 && cell != target {
                    continue;
                }
                if !self.reachable(cell, target, remaining, agent.speed) {
                    continue;
                }
                if !self.admitted(cell, next_step, planned) {
                    continue;
                }
                let next = (cell.0, cell.1, next_step);
                if closed.contains(&next) {
                    continue;
                }
                let cost = g + (mx * mx + my * my) as f64;
                if cost < best.get(&next).copied().unwrap_or(f64::INFINITY) {
                    best.insert(next, cost);
                    parent.insert(next, key);
                    let f = cost + Self::heuristic(cell, target, remaining);
                    open.push(Reverse((OrderedFloat(f), Reverse(next_step), cell.0, cell.1)));
                }
            }
        }
        None
    }

    fn reconstruct(parent: &HashMap<StateKey, StateKey>, goal: StateKey) -> Vec<Cell> {
        let mut cells = vec![(goal.0, goal.1)];
        let mut current = goal;
        while let Some(previous) = parent.get(&current) {
            cells.push((previous.0, previous.1));
            current = *previous;
        }
        cells.reverse();
        cells
    }
}

/// Hands lattice paths to the solver as position and movement hints.
pub fn apply_hints(
    ctx: &mut dyn SolverContext,
    trajectories: &[TrajectoryVars],
    paths: &[Vec<Point2D>],
) -> DomainResult<usize> {
    let mut hinted = 0;
    for (trajectory, path) in trajectories.iter().zip(paths) {
        for (step, point) in path.iter().enumerate() {
            let (x, y) = trajectory.position(step);
            ctx.set_hint(x, point.x)?;
            ctx.set_hint(y, point.y)?;
            hinted += 2;
        }
        for (step, pair) in path.windows(2).enumerate() {
            let (mx, my) = trajectory.movement(step);
            ctx.set_hint(mx, pair[1].x - pair[0].x)?;
            ctx.set_hint(my, pair[1].y - pair[0].y)?;
            hinted += 2;
        }
    }
    Ok(hinted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::motion_planning::aggregate::collision::{CollisionStrategy, IndicatorMode};

    #[test]
    fn test_single_agent_follows_straight_line() {
        let scenario = Scenario::new(100.0, 100.0, 16.0, 5, 10.0).with_agent(
            Point2D::new(10.0, 50.0),
            Point2D::new(50.0, 50.0),
            10.0,
        );
        let encoder = CollisionStrategy::BigMAnyAxis.encoder(IndicatorMode::Native);
        let search = SpaceTimeSearch::new(&scenario, encoder.as_ref(), ProtectedWindow::Interior, 1_000);
        let paths = search.plan().expect("straight path");
        let xs: Vec<f64> = paths[0].iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
        assert!(paths[0].iter().all(|p| p.y == 50.0));
    }

    #[test]
    fn test_unreachable_target_yields_none() {
        let scenario = Scenario::new(100.0, 100.0, 16.0, 3, 10.0).with_agent(
            Point2D::new(10.0, 50.0),
            Point2D::new(80.0, 50.0),
            10.0,
        );
        let encoder = CollisionStrategy::NoOverlap2D.encoder(IndicatorMode::Native);
        let search = SpaceTimeSearch::new(&scenario, encoder.as_ref(), ProtectedWindow::Interior, 1_000);
        assert!(search.plan().is_none());
    }

    #[test]
    fn test_move_reach_is_bounded_by_grid_span() {
        let scenario = Scenario::new(100.0, 100.0, 16.0, 5, 1.0e4);
        let encoder = CollisionStrategy::BigMAnyAxis.encoder(IndicatorMode::Native);
        let search = SpaceTimeSearch::new(&scenario, encoder.as_ref(), ProtectedWindow::Interior, 1_000);
        let moves = search.moves(1.0e4, 84);
        assert_eq!(moves.len(), 169 * 169);
        assert!(moves.iter().all(|(mx, my)| mx.abs() <= 84 && my.abs() <= 84));
    }

    #[test]
    fn test_fast_agent_on_small_grid_still_plans() {
        let scenario = Scenario::new(100.0, 100.0, 16.0, 4, 1.0e4).with_agent(
            Point2D::new(10.0, 10.0),
            Point2D::new(90.0, 90.0),
            1.0e4,
        );
        let encoder = CollisionStrategy::BigMAnyAxis.encoder(IndicatorMode::Native);
        let search = SpaceTimeSearch::new(&scenario, encoder.as_ref(), ProtectedWindow::Interior, 1_000);
        let paths = search.plan().expect("fast agent path");
        assert_eq!(paths[0].first(), Some(&Point2D::new(10.0, 10.0)));
        assert_eq!(paths[0].last(), Some(&Point2D::new(90.0, 90.0)));
    }

    #[test]
    fn test_passed_deadline_yields_none() {
        let scenario = Scenario::new(100.0, 100.0, 16.0, 5, 10.0).with_agent(
            Point2D::new(10.0, 50.0),
            Point2D::new(50.0, 50.0),
            10.0,
        );
        let encoder = CollisionStrategy::BigMAnyAxis.encoder(IndicatorMode::Native);
        let search = SpaceTimeSearch::new(&scenario, encoder.as_ref(), ProtectedWindow::Interior, 1_000)
            .with_deadline(Some(Instant::now()));
        assert!(search.plan().is_none());
    }
}
