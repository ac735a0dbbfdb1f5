//! In-process `SolverContext` backend.
//!
//! Records the model in flat arenas and answers `solve` without branching:
//! bound propagation over the linear rows (an empty domain proves
//! infeasibility), then completion of a single candidate assignment from fixed
//! domains, hints, equality rows and greedy binary choices, which is accepted
//! only if it satisfies every recorded constraint, even when the time limit
//! ran out while it was being checked. Anything else is reported as
//! `TimedOut`: the budget bought no verdict.

mod evaluate;
mod propagate;

use crate::common::{DomainError, DomainResult};
use crate::domains::motion_planning::expr::{
    FixedInterval, LinearExpr, QuadExpr, Relation, Sense, VarId, VarKind,
};
use crate::domains::motion_planning::ports::{SolveParams, SolveStatus, SolverContext};
use propagate::{Domain, Propagation};
use std::time::Instant;
use tracing::debug;

pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearRow {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearRow {
    fn holds<F: Fn(VarId) -> f64>(&self, value: F, tolerance: f64) -> bool {
        self.relation.holds(self.expr.evaluate(value), self.rhs, tolerance)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticRow {
    pub expr: QuadExpr,
    pub relation: Relation,
    pub rhs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub flag: VarId,
    pub row: LinearRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoOverlapGroup {
    pub x_intervals: Vec<FixedInterval>,
    pub y_intervals: Vec<FixedInterval>,
}

/// Sizes of the recorded model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub variables: usize,
    pub binaries: usize,
    pub linear: usize,
    pub quadratic: usize,
    pub indicator: usize,
    pub no_overlap: usize,
}

#[derive(Debug, Clone, Copy)]
enum RowRef {
    Linear(usize),
    Indicator(usize),
}

#[derive(Debug, Default)]
pub struct ReferenceSolver {
    vars: Vec<VariableDecl>,
    linear: Vec<LinearRow>,
    quadratic: Vec<QuadraticRow>,
    indicators: Vec<IndicatorRow>,
    no_overlap: Vec<NoOverlapGroup>,
    objective: Option<(QuadExpr, Sense)>,
    hints: Vec<Option<f64>>,
    tolerance: f64,
    status: Option<SolveStatus>,
    values: Option<Vec<f64>>,
}

impl ReferenceSolver {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            variables: self.vars.len(),
            binaries: self.vars.iter().filter(|v| v.kind == VarKind::Binary).count(),
            linear: self.linear.len(),
            quadratic: self.quadratic.len(),
            indicator: self.indicators.len(),
            no_overlap: self.no_overlap.len(),
        }
    }

    pub fn variable(&self, var: VarId) -> Option<&VariableDecl> {
        self.vars.get(var.0)
    }

    pub fn hint(&self, var: VarId) -> Option<f64> {
        self.hints.get(var.0).copied().flatten()
    }

    pub fn status(&self) -> Option<SolveStatus> {
        self.status
    }

    pub fn objective_value(&self) -> Option<f64> {
        let (expr, _) = self.objective.as_ref()?;
        let values = self.values.as_ref()?;
        Some(expr.evaluate(|v| values[v.0]))
    }

    fn ensure_open(&self) -> DomainResult<()> {
        if self.status.is_some() {
            return Err(DomainError::Solver(
                "model is sealed once solve has been called".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_known<I: IntoIterator<Item = VarId>>(&self, vars: I) -> DomainResult<()> {
        for var in vars {
            if var.0 >= self.vars.len() {
                return Err(DomainError::Solver(format!("unknown variable handle {}", var.0)));
            }
        }
        Ok(())
    }

    fn is_fixed(&self, domain: &Domain) -> bool {
        domain.upper - domain.lower <= self.tolerance
    }

    fn row_index(&self) -> Vec<Vec<RowRef>> {
        let mut index = vec![Vec::new(); self.vars.len()];
        for (i, row) in self.linear.iter().enumerate() {
            for var in row.expr.vars() {
                index[var.0].push(RowRef::Linear(i));
            }
        }
        for (i, indicator) in self.indicators.iter().enumerate() {
            index[indicator.flag.0].push(RowRef::Indicator(i));
            for var in indicator.row.expr.vars() {
                index[var.0].push(RowRef::Indicator(i));
            }
        }
        index
    }

    /// `None` while any variable of the row is still unassigned.
    fn row_satisfied(&self, row: RowRef, values: &[Option<f64>]) -> Option<bool> {
        let assigned = |v: VarId| values[v.0];
        match row {
            RowRef::Linear(i) => {
                let row = &self.linear[i];
                let mut lhs = row.expr.constant;
                for (var, coef) in &row.expr.terms {
                    lhs += coef * assigned(*var)?;
                }
                Some(row.relation.holds(lhs, row.rhs, self.tolerance))
            }
            RowRef::Indicator(i) => {
                let indicator = &self.indicators[i];
                if assigned(indicator.flag)? < 0.5 {
                    return Some(true);
                }
                let mut lhs = indicator.row.expr.constant;
                for (var, coef) in &indicator.row.expr.terms {
                    lhs += coef * assigned(*var)?;
                }
                Some(indicator.row.relation.holds(lhs, indicator.row.rhs, self.tolerance))
            }
        }
    }

    /// Single-unknown equality rows, repeated until nothing changes.
    fn complete_equalities(&self, values: &mut [Option<f64>]) {
        loop {
            let mut progressed = false;
            for row in self.linear.iter().filter(|r| r.relation == Relation::Equal) {
                let mut unknown = None;
                let mut unknown_count = 0;
                let mut partial = row.expr.constant;
                for (var, coef) in &row.expr.terms {
                    match values[var.0] {
                        Some(value) => partial += coef * value,
                        None => {
                            unknown_count += 1;
                            unknown = Some((*var, *coef));
                        }
                    }
                }
                if let (1, Some((var, coef))) = (unknown_count, unknown) {
                    if coef.abs() > f64::EPSILON {
                        let mut value = (row.rhs - partial) / coef;
                        if self.vars[var.0].kind.is_discrete() {
                            value = value.round();
                        }
                        values[var.0] = Some(value);
                        progressed = true;
                    }
                }
            }
            if !progressed {
                break;
            }
        }
    }

    fn complete(&self, domains: &[Domain]) -> Vec<f64> {
        let mut values: Vec<Option<f64>> = domains
            .iter()
            .enumerate()
            .map(|(i, domain)| {
                if self.is_fixed(domain) {
                    Some(domain.lower)
                } else {
                    self.hints[i]
                }
            })
            .collect();

        self.complete_equalities(&mut values);

        let index = self.row_index();
        for (i, decl) in self.vars.iter().enumerate() {
            if decl.kind != VarKind::Binary || values[i].is_some() {
                continue;
            }
            values[i] = Some(1.0);
            let accepted = index[i]
                .iter()
                .all(|row| self.row_satisfied(*row, &values).unwrap_or(true));
            if !accepted {
                values[i] = Some(0.0);
            }
        }

        values
            .into_iter()
            .zip(domains)
            .enumerate()
            .map(|(i, (value, domain))| {
                value.unwrap_or_else(|| {
                    let mid = (domain.lower + domain.upper) / 2.0;
                    if self.vars[i].kind.is_discrete() {
                        mid.round()
                    } else {
                        mid
                    }
                })
            })
            .collect()
    }

}

impl SolverContext for ReferenceSolver {
    fn declare_variable(
        &mut self,
        kind: VarKind,
        lower: f64,
        upper: f64,
        name: &str,
    ) -> DomainResult<VarId> {
        self.ensure_open()?;
        let (lower, upper) = match kind {
            VarKind::Binary => (lower.max(0.0), upper.min(1.0)),
            _ => (lower, upper),
        };
        if lower > upper {
            return Err(DomainError::Solver(format!(
                "variable {} has empty bounds [{}, {}]",
                name, lower, upper
            )));
        }
        let id = VarId(self.vars.len());
        self.vars.push(VariableDecl {
            name: name.to_string(),
            kind,
            lower,
            upper,
        });
        self.hints.push(None);
        Ok(id)
    }

    fn add_linear_constraint(
        &mut self,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) -> DomainResult<()> {
        self.ensure_open()?;
        self.ensure_known(expr.vars())?;
        self.linear.push(LinearRow { expr, relation, rhs });
        Ok(())
    }

    fn add_quadratic_constraint(
        &mut self,
        expr: QuadExpr,
        relation: Relation,
        rhs: f64,
    ) -> DomainResult<()> {
        self.ensure_open()?;
        self.ensure_known(expr.vars())?;
        self.quadratic.push(QuadraticRow { expr, relation, rhs });
        Ok(())
    }

    fn add_indicator_constraint(
        &mut self,
        flag: VarId,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) -> DomainResult<()> {
        self.ensure_open()?;
        self.ensure_known(std::iter::once(flag).chain(expr.vars()))?;
        if self.vars[flag.0].kind != VarKind::Binary {
            return Err(DomainError::Solver(format!(
                "indicator flag {} is not binary",
                self.vars[flag.0].name
            )));
        }
        self.indicators.push(IndicatorRow {
            flag,
            row: LinearRow { expr, relation, rhs },
        });
        Ok(())
    }

    fn add_no_overlap_2d(
        &mut self,
        x_intervals: Vec<FixedInterval>,
        y_intervals: Vec<FixedInterval>,
    ) -> DomainResult<()> {
        self.ensure_open()?;
        if x_intervals.len() != y_intervals.len() {
            return Err(DomainError::Solver(format!(
                "no-overlap needs paired intervals, got {} x and {} y",
                x_intervals.len(),
                y_intervals.len()
            )));
        }
        self.ensure_known(
            x_intervals
                .iter()
                .chain(&y_intervals)
                .flat_map(|i| i.start.vars().collect::<Vec<_>>()),
        )?;
        self.no_overlap.push(NoOverlapGroup {
            x_intervals,
            y_intervals,
        });
        Ok(())
    }

    fn set_objective(&mut self, expr: QuadExpr, sense: Sense) -> DomainResult<()> {
        self.ensure_open()?;
        self.ensure_known(expr.vars())?;
        self.objective = Some((expr, sense));
        Ok(())
    }

    fn set_hint(&mut self, var: VarId, value: f64) -> DomainResult<()> {
        self.ensure_open()?;
        self.ensure_known(std::iter::once(var))?;
        self.hints[var.0] = Some(value);
        Ok(())
    }

    fn solve(&mut self, params: &SolveParams) -> DomainResult<SolveStatus> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        if params.threads > 1 {
            debug!(threads = params.threads, "reference solver runs single-threaded");
        }
        let deadline = params.time_limit.and_then(|limit| Instant::now().checked_add(limit));
        let stats = self.stats();
        debug!(?stats, "solving recorded model");

        let status = match propagate::tighten(&self.vars, &self.linear, self.tolerance, deadline) {
            Propagation::Empty(var) => {
                let name = self.vars.get(var.0).map(|v| v.name.as_str()).unwrap_or("constant row");
                debug!(variable = name, "bound propagation emptied a domain");
                SolveStatus::Infeasible
            }
            Propagation::Expired => SolveStatus::TimedOut,
            Propagation::Domains(domains) => {
                let all_fixed = domains.iter().all(|d| self.is_fixed(d));
                let candidate = self.complete(&domains);
                match evaluate::first_violation(self, &candidate) {
                    None => {
                        self.values = Some(candidate);
                        if self.objective.is_some() && !all_fixed {
                            SolveStatus::Feasible
                        } else {
                            SolveStatus::Optimal
                        }
                    }
                    Some(violation) if all_fixed => {
                        debug!(%violation, "the only assignment left by propagation is infeasible");
                        SolveStatus::Infeasible
                    }
                    Some(violation) => {
                        debug!(%violation, "candidate assignment rejected");
                        SolveStatus::TimedOut
                    }
                }
            }
        };
        self.status = Some(status);
        Ok(status)
    }

    fn value_of(&self, var: VarId) -> DomainResult<f64> {
        let values = self
            .values
            .as_ref()
            .ok_or_else(|| DomainError::Solver("no solution values available".to_string()))?;
        values
            .get(var.0)
            .copied()
            .ok_or_else(|| DomainError::Solver(format!("unknown variable handle {}", var.0)))
    }
}

/// Factory for the application service.
pub fn reference_solver_factory() -> crate::application::SolverFactory {
    std::sync::Arc::new(|| Box::new(ReferenceSolver::new()) as Box<dyn SolverContext>)
}
