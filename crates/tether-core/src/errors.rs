//! Error types for the constraint solver.

use thiserror::Error;

/// Errors reported at the solver's operation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The required constraints are inconsistent. The offending constraint is
    /// not added and the tableau is left unchanged.
    #[error("required constraint cannot be satisfied")]
    Unsatisfiable,

    /// A constraint handle was passed that the solver does not know.
    #[error("constraint is not in the solver")]
    UnknownConstraint,

    /// An algorithmic invariant did not hold. Indicates a bug in the solver,
    /// not a problem with the constraint system.
    #[error("internal solver error: {0}")]
    Internal(&'static str),
}
