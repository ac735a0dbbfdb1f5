use super::ReferenceSolver;
use crate::domains::motion_planning::expr::{FixedInterval, VarId, VarKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Violation {
    Bounds { var: String, value: f64 },
    Integrality { var: String, value: f64 },
    Linear(usize),
    Quadratic(usize),
    Indicator(usize),
    NoOverlap { group: usize, first: usize, second: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Bounds { var, value } => write!(f, "{} = {} is out of bounds", var, value),
            Violation::Integrality { var, value } => write!(f, "{} = {} is not integral", var, value),
            Violation::Linear(i) => write!(f, "linear row {}", i),
            Violation::Quadratic(i) => write!(f, "quadratic row {}", i),
            Violation::Indicator(i) => write!(f, "indicator row {}", i),
            Violation::NoOverlap { group, first, second } => write!(
                f,
                "rectangles {} and {} overlap in no-overlap group {}",
                first, second, group
            ),
        }
    }
}

fn overlaps(a: f64, b: f64, size_a: f64, size_b: f64, tolerance: f64) -> bool {
    a < b + size_b - tolerance && b < a + size_a - tolerance
}

/// Checks an assignment against every recorded constraint.
pub(super) fn first_violation(model: &ReferenceSolver, values: &[f64]) -> Option<Violation> {
    let tol = model.tolerance;
    let value = |v: VarId| values[v.0];

    for (decl, x) in model.vars.iter().zip(values) {
        if *x < decl.lower - tol || *x > decl.upper + tol {
            return Some(Violation::Bounds {
                var: decl.name.clone(),
                value: *x,
            });
        }
        if decl.kind != VarKind::Continuous && (x - x.round()).abs() > tol {
            return Some(Violation::Integrality {
                var: decl.name.clone(),
                value: *x,
            });
        }
    }

    if let Some(i) = model.linear.iter().position(|row| !row.holds(value, tol)) {
        return Some(Violation::Linear(i));
    }

    if let Some(i) = model
        .quadratic
        .iter()
        .position(|row| !row.relation.holds(row.expr.evaluate(value), row.rhs, tol))
    {
        return Some(Violation::Quadratic(i));
    }

    if let Some(i) = model
        .indicators
        .iter()
        .position(|ind| value(ind.flag) >= 0.5 && !ind.row.holds(value, tol))
    {
        return Some(Violation::Indicator(i));
    }

    let start = |interval: &FixedInterval| interval.start.evaluate(value);
    for (group, rects) in model.no_overlap.iter().enumerate() {
        let n = rects.x_intervals.len();
        for first in 0..n {
            for second in (first + 1)..n {
                let (xa, xb) = (&rects.x_intervals[first], &rects.x_intervals[second]);
                let (ya, yb) = (&rects.y_intervals[first], &rects.y_intervals[second]);
                if overlaps(start(xa), start(xb), xa.size, xb.size, tol)
                    && overlaps(start(ya), start(yb), ya.size, yb.size, tol)
                {
                    return Some(Violation::NoOverlap { group, first, second });
                }
            }
        }
    }

    None
}
