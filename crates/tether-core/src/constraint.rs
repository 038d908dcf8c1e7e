//! Constraint objects.

use std::fmt;

use crate::expression::Expression;
use crate::strength::Strength;
use crate::variable::Variable;

/// The relation asserted between a constraint expression and zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessOrEqual => write!(f, "<="),
            Relation::Equal => write!(f, "=="),
            Relation::GreaterOrEqual => write!(f, ">="),
        }
    }
}

/// The role a constraint plays in the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// An ordinary equality or inequality.
    Linear,
    /// A stay: keep the variable near its current value.
    Stay(Variable),
    /// An edit: allow suggested values to move the variable.
    Edit(Variable),
}

/// Handle returned when a constraint is added to a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub usize);

/// A linear constraint `expression (relation) 0` with a strength and weight.
#[derive(Debug, Clone)]
pub struct Constraint {
    expression: Expression,
    relation: Relation,
    strength: Strength,
    weight: f64,
    kind: ConstraintKind,
}

impl Constraint {
    /// Create a new required constraint. Use [`with_strength`] to soften it.
    ///
    /// [`with_strength`]: Constraint::with_strength
    pub fn new(expression: Expression, relation: Relation) -> Self {
        Self {
            expression,
            relation,
            strength: Strength::REQUIRED,
            weight: 1.0,
            kind: ConstraintKind::Linear,
        }
    }

    /// Create a stay constraint `var = value`.
    pub fn stay(var: Variable, value: f64, strength: Strength, weight: f64) -> Self {
        let mut expression = Expression::from_constant(value);
        expression.add_term(var, -1.0);
        Self {
            expression,
            relation: Relation::Equal,
            strength,
            weight,
            kind: ConstraintKind::Stay(var),
        }
    }

    /// Create an edit constraint `var = value`.
    pub fn edit(var: Variable, value: f64, strength: Strength) -> Self {
        let mut expression = Expression::from_constant(value);
        expression.add_term(var, -1.0);
        Self {
            expression,
            relation: Relation::Equal,
            strength,
            weight: 1.0,
            kind: ConstraintKind::Edit(var),
        }
    }

    /// Replace the strength.
    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    /// Replace the weight multiplier.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.strength.is_required()
    }

    pub fn is_inequality(&self) -> bool {
        self.relation != Relation::Equal
    }

    pub fn is_stay(&self) -> bool {
        matches!(self.kind, ConstraintKind::Stay(_))
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.kind, ConstraintKind::Edit(_))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} 0 [{}]",
            self.expression, self.relation, self.strength
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let x = Variable::new();
        let cn = Constraint::new(Expression::from_variable(x), Relation::GreaterOrEqual)
            .with_strength(Strength::MEDIUM)
            .with_weight(2.0);
        assert!(cn.is_inequality());
        assert!(!cn.is_required());
        assert_eq!(cn.weight(), 2.0);
        assert_eq!(cn.kind(), ConstraintKind::Linear);
    }

    #[test]
    fn test_stay_and_edit_expressions() {
        let x = Variable::new();
        let stay = Constraint::stay(x, 5.0, Strength::WEAK, 1.0);
        assert!(stay.is_stay());
        assert_eq!(stay.expression().constant, 5.0);
        assert_eq!(stay.expression().coefficient(x), -1.0);

        let edit = Constraint::edit(x, 5.0, Strength::STRONG);
        assert!(edit.is_edit());
        assert_eq!(edit.relation(), Relation::Equal);
    }
}
