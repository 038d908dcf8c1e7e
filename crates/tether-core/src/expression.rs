//! Symbolic linear expressions.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use indexmap::IndexMap;

use crate::constraint::{Constraint, Relation};
use crate::variable::Variable;

/// Tolerance for floating-point comparisons.
pub const EPSILON: f64 = 1e-8;

/// Near-zero check for floating point values.
pub fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// A linear expression in the form `constant + Σ(coefficient · variable)`.
///
/// Coefficients that fall within [`EPSILON`] of zero are dropped, so the term
/// map never carries dead entries. Expressions are plain values; combining two
/// expressions produces a fresh one and never aliases solver state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub constant: f64,
    terms: IndexMap<Variable, f64>,
}

impl Expression {
    /// Create a constant expression.
    pub fn from_constant(value: f64) -> Self {
        Self {
            constant: value,
            terms: IndexMap::new(),
        }
    }

    /// Create an expression from a single variable with coefficient 1.
    pub fn from_variable(var: Variable) -> Self {
        Self::from_term(var, 1.0)
    }

    /// Create an expression `coefficient · var`.
    pub fn from_term(var: Variable, coefficient: f64) -> Self {
        let mut terms = IndexMap::new();
        if !near_zero(coefficient) {
            terms.insert(var, coefficient);
        }
        Self {
            constant: 0.0,
            terms,
        }
    }

    /// Add `coefficient · var`, merging with any existing term.
    pub fn add_term(&mut self, var: Variable, coefficient: f64) {
        if near_zero(coefficient) {
            return;
        }
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coefficient;
        if near_zero(*entry) {
            self.terms.swap_remove(&var);
        }
    }

    /// Set the coefficient of `var`, replacing any existing term.
    pub fn set_term(&mut self, var: Variable, coefficient: f64) {
        if near_zero(coefficient) {
            self.terms.swap_remove(&var);
        } else {
            self.terms.insert(var, coefficient);
        }
    }

    /// Multiply the expression by a scalar.
    pub fn multiply(&mut self, scalar: f64) {
        self.constant *= scalar;
        for coeff in self.terms.values_mut() {
            *coeff *= scalar;
        }
    }

    /// Add `multiplier · other` to this expression.
    pub fn add_expression(&mut self, other: &Expression, multiplier: f64) {
        self.constant += other.constant * multiplier;
        for (&var, &coeff) in &other.terms {
            self.add_term(var, coeff * multiplier);
        }
    }

    /// Get the coefficient for a variable (0 when absent).
    pub fn coefficient(&self, var: Variable) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// Check whether the expression mentions the given variable.
    pub fn contains(&self, var: Variable) -> bool {
        self.terms.contains_key(&var)
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over the terms.
    pub fn terms(&self) -> impl Iterator<Item = (&Variable, &f64)> {
        self.terms.iter()
    }

    /// Build the constraint `self = rhs` with required strength.
    pub fn equals(mut self, rhs: impl Into<Expression>) -> Constraint {
        self.add_expression(&rhs.into(), -1.0);
        Constraint::new(self, Relation::Equal)
    }

    /// Build the constraint `self ≤ rhs` with required strength.
    pub fn leq(mut self, rhs: impl Into<Expression>) -> Constraint {
        self.add_expression(&rhs.into(), -1.0);
        Constraint::new(self, Relation::LessOrEqual)
    }

    /// Build the constraint `self ≥ rhs` with required strength.
    pub fn geq(mut self, rhs: impl Into<Expression>) -> Constraint {
        self.add_expression(&rhs.into(), -1.0);
        Constraint::new(self, Relation::GreaterOrEqual)
    }
}

impl From<Variable> for Expression {
    fn from(var: Variable) -> Self {
        Expression::from_variable(var)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::from_constant(value)
    }
}

impl<R: Into<Expression>> Add<R> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: R) -> Expression {
        self.add_expression(&rhs.into(), 1.0);
        self
    }
}

impl<R: Into<Expression>> Sub<R> for Expression {
    type Output = Expression;

    fn sub(mut self, rhs: R) -> Expression {
        self.add_expression(&rhs.into(), -1.0);
        self
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(mut self, scalar: f64) -> Expression {
        self.multiply(scalar);
        self
    }
}

impl Div<f64> for Expression {
    type Output = Expression;

    fn div(mut self, scalar: f64) -> Expression {
        self.multiply(1.0 / scalar);
        self
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(mut self) -> Expression {
        self.multiply(-1.0);
        self
    }
}

impl<R: Into<Expression>> Add<R> for Variable {
    type Output = Expression;

    fn add(self, rhs: R) -> Expression {
        Expression::from_variable(self) + rhs
    }
}

impl<R: Into<Expression>> Sub<R> for Variable {
    type Output = Expression;

    fn sub(self, rhs: R) -> Expression {
        Expression::from_variable(self) - rhs
    }
}

impl Mul<f64> for Variable {
    type Output = Expression;

    fn mul(self, scalar: f64) -> Expression {
        Expression::from_term(self, scalar)
    }
}

impl Div<f64> for Variable {
    type Output = Expression;

    fn div(self, scalar: f64) -> Expression {
        Expression::from_term(self, 1.0 / scalar)
    }
}

impl Neg for Variable {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::from_term(self, -1.0)
    }
}

impl Mul<Expression> for f64 {
    type Output = Expression;

    fn mul(self, mut rhs: Expression) -> Expression {
        rhs.multiply(self);
        rhs
    }
}

impl Mul<Variable> for f64 {
    type Output = Expression;

    fn mul(self, rhs: Variable) -> Expression {
        Expression::from_term(rhs, self)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constant)?;
        for (var, coeff) in &self.terms {
            if *coeff < 0.0 {
                write!(f, " - {}*{}", -coeff, var)?;
            } else {
                write!(f, " + {}*{}", coeff, var)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_accumulation() {
        let x = Variable::new();
        let mut e = Expression::from_term(x, 2.0);
        e.add_term(x, 3.0);
        assert_eq!(e.coefficient(x), 5.0);
    }

    #[test]
    fn test_cancelled_term_is_dropped() {
        let x = Variable::new();
        let mut e = Expression::from_term(x, 2.0);
        e.add_term(x, -2.0);
        assert!(!e.contains(x));
        assert!(e.is_constant());
    }

    #[test]
    fn test_operator_arithmetic() {
        let x = Variable::new();
        let y = Variable::new();
        let e = x + 2.0 * y - 3.0;
        assert_eq!(e.coefficient(x), 1.0);
        assert_eq!(e.coefficient(y), 2.0);
        assert_eq!(e.constant, -3.0);

        let neg = -(x + 1.0);
        assert_eq!(neg.coefficient(x), -1.0);
        assert_eq!(neg.constant, -1.0);
    }

    #[test]
    fn test_scalar_multiply_divide() {
        let x = Variable::new();
        let e = (x + 4.0) * 0.5;
        assert_eq!(e.coefficient(x), 0.5);
        assert_eq!(e.constant, 2.0);

        let d = (x * 2.0) / 2.0;
        assert_eq!(d.coefficient(x), 1.0);
    }

    #[test]
    fn test_add_expression_with_multiplier() {
        let x = Variable::new();
        let y = Variable::new();
        let mut e = Expression::from_variable(x);
        let other = y + 1.0;
        e.add_expression(&other, -2.0);
        assert_eq!(e.coefficient(y), -2.0);
        assert_eq!(e.constant, -2.0);
    }

    #[test]
    fn test_comparison_builders() {
        let x = Variable::new();
        let y = Variable::new();
        let cn = (x + y).equals(10.0);
        assert_eq!(cn.relation(), Relation::Equal);
        assert_eq!(cn.expression().constant, -10.0);
        assert!(cn.is_required());

        let cn = x.leq(5.0);
        assert_eq!(cn.relation(), Relation::LessOrEqual);
        assert_eq!(cn.expression().coefficient(x), 1.0);
    }
}
