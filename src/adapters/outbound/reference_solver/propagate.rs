use super::{LinearRow, VariableDecl};
use crate::domains::motion_planning::expr::{Relation, VarId};
use std::time::Instant;

const MAX_ROUNDS: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Domain {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug)]
pub(super) enum Propagation {
    Domains(Vec<Domain>),
    Empty(VarId),
    Expired,
}

fn round_in(decl: &VariableDecl, lower: f64, upper: f64, tolerance: f64) -> (f64, f64) {
    if decl.kind.is_discrete() {
        ((lower - tolerance).ceil(), (upper + tolerance).floor())
    } else {
        (lower, upper)
    }
}

fn significant(old: f64, new: f64) -> bool {
    (new - old).abs() > 1e-9 * old.abs().max(1.0)
}

/// Activity range of a row, `None` when some term is unbounded.
fn activity(row: &LinearRow, domains: &[Domain]) -> Option<(f64, f64)> {
    let mut min = 0.0;
    let mut max = 0.0;
    for (var, coef) in &row.expr.terms {
        let d = domains[var.0];
        let (a, b) = (coef * d.lower, coef * d.upper);
        min += a.min(b);
        max += a.max(b);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

/// Tightens variable bounds against the linear rows until a fixpoint.
///
/// The first pass always runs; later passes stop once `deadline` passes.
pub(super) fn tighten(
    vars: &[VariableDecl],
    rows: &[LinearRow],
    tolerance: f64,
    deadline: Option<Instant>,
) -> Propagation {
    let mut domains = Vec::with_capacity(vars.len());
    for (i, decl) in vars.iter().enumerate() {
        let (lower, upper) = round_in(decl, decl.lower, decl.upper, tolerance);
        if lower > upper + tolerance {
            return Propagation::Empty(VarId(i));
        }
        domains.push(Domain { lower, upper });
    }

    for round in 0..MAX_ROUNDS {
        if round > 0 && deadline.map(|d| Instant::now() >= d).unwrap_or(false) {
            return Propagation::Expired;
        }
        let mut changed = false;
        for row in rows {
            let Some((min_act, max_act)) = activity(row, &domains) else {
                continue;
            };
            let target = row.rhs - row.expr.constant;
            let upper_side = matches!(row.relation, Relation::LessEq | Relation::Equal);
            let lower_side = matches!(row.relation, Relation::GreaterEq | Relation::Equal);

            if upper_side && min_act > target + tolerance {
                return Propagation::Empty(row.expr.terms.first().map(|(v, _)| *v).unwrap_or(VarId(0)));
            }
            if lower_side && max_act < target - tolerance {
                return Propagation::Empty(row.expr.terms.first().map(|(v, _)| *v).unwrap_or(VarId(0)));
            }

            for (var, coef) in &row.expr.terms {
                if coef.abs() <= f64::EPSILON {
                    continue;
                }
                let d = domains[var.0];
                let (a, b) = (coef * d.lower, coef * d.upper);
                let (own_min, own_max) = (a.min(b), a.max(b));
                let mut lower = d.lower;
                let mut upper = d.upper;

                if upper_side {
                    // coef * x <= target - (min activity of the other terms)
                    let bound = (target - (min_act - own_min)) / coef;
                    if *coef > 0.0 {
                        upper = upper.min(bound);
                    } else {
                        lower = lower.max(bound);
                    }
                }
                if lower_side {
                    let bound = (target - (max_act - own_max)) / coef;
                    if *coef > 0.0 {
                        lower = lower.max(bound);
                    } else {
                        upper = upper.min(bound);
                    }
                }

                let (lower, upper) = round_in(&vars[var.0], lower, upper, tolerance);
                if lower > upper + tolerance {
                    return Propagation::Empty(*var);
                }
                // Snap tolerance-sized crossings back to a point.
                let (lower, upper) = if lower > upper { (upper, upper) } else { (lower, upper) };
                let slot = &mut domains[var.0];
                if significant(slot.lower, lower) && lower > slot.lower {
                    slot.lower = lower;
                    changed = true;
                }
                if significant(slot.upper, upper) && upper < slot.upper {
                    slot.upper = upper;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    Propagation::Domains(domains)
}
