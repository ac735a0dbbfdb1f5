//! Affine and quadratic expressions over solver variable handles.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Opaque handle returned by [`super::ports::SolverContext::declare_variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Continuous,
    Integer,
    Binary,
}

impl VarKind {
    pub fn is_discrete(&self) -> bool {
        !matches!(self, VarKind::Continuous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

impl Relation {
    pub fn holds(&self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Relation::LessEq => lhs <= rhs + tolerance,
            Relation::GreaterEq => lhs >= rhs - tolerance,
            Relation::Equal => (lhs - rhs).abs() <= tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// `sum(coef * var) + constant`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn term(var: VarId, coef: f64) -> Self {
        Self {
            terms: vec![(var, coef)],
            constant: 0.0,
        }
    }

    /// `a - b`
    pub fn difference(a: VarId, b: VarId) -> Self {
        Self {
            terms: vec![(a, 1.0), (b, -1.0)],
            constant: 0.0,
        }
    }

    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    pub fn plus(mut self, var: VarId, coef: f64) -> Self {
        self.terms.push((var, coef));
        self
    }

    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms.iter().map(|(v, _)| *v)
    }

    pub fn evaluate<F: Fn(VarId) -> f64>(&self, value: F) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, (v, c)| acc + c * value(*v))
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        LinearExpr::term(var, 1.0)
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        self + (-rhs)
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1.0
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, rhs: f64) -> LinearExpr {
        for (_, c) in self.terms.iter_mut() {
            *c *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

/// `sum(coef * a * b) + linear`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuadExpr {
    pub quadratic: Vec<(VarId, VarId, f64)>,
    pub linear: LinearExpr,
}

impl QuadExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands `expr²`.
    pub fn square(expr: &LinearExpr) -> Self {
        let mut quadratic = Vec::with_capacity(expr.terms.len() * expr.terms.len());
        for (a, ca) in &expr.terms {
            for (b, cb) in &expr.terms {
                quadratic.push((*a, *b, ca * cb));
            }
        }
        let linear = LinearExpr {
            terms: expr
                .terms
                .iter()
                .map(|(v, c)| (*v, 2.0 * c * expr.constant))
                .collect(),
            constant: expr.constant * expr.constant,
        };
        Self { quadratic, linear }
    }

    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.quadratic
            .iter()
            .flat_map(|(a, b, _)| [*a, *b])
            .chain(self.linear.vars())
    }

    pub fn evaluate<F: Fn(VarId) -> f64>(&self, value: F) -> f64 {
        let quadratic: f64 = self
            .quadratic
            .iter()
            .map(|(a, b, c)| c * value(*a) * value(*b))
            .sum();
        quadratic + self.linear.evaluate(value)
    }
}

impl Add for QuadExpr {
    type Output = QuadExpr;

    fn add(mut self, rhs: QuadExpr) -> QuadExpr {
        self.quadratic.extend(rhs.quadratic);
        self.linear = self.linear + rhs.linear;
        self
    }
}

/// Fixed-size interval `[start, start + size)` with an affine start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedInterval {
    pub start: LinearExpr,
    pub size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_expands_difference() {
        let expr = LinearExpr::difference(VarId(0), VarId(1)) + LinearExpr::constant(3.0);
        let squared = QuadExpr::square(&expr);
        let values = [7.0, 2.0];
        let direct = (7.0 - 2.0 + 3.0_f64).powi(2);
        assert!((squared.evaluate(|v| values[v.0]) - direct).abs() < 1e-9);
    }

    #[test]
    fn test_linear_ops_keep_constant() {
        let expr = (LinearExpr::from(VarId(0)) - LinearExpr::constant(2.0)) * 3.0;
        assert_eq!(expr.constant, -6.0);
        assert_eq!(expr.evaluate(|_| 4.0), 6.0);
    }
}
