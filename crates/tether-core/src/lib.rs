//! Core types for the Tether constraint solver.
//!
//! This crate provides the value types shared by clients and the solver engine:
//! - Variable handles and identity
//! - Symbolic linear expressions with operator overloads
//! - Constraint objects (equalities, inequalities, stays, edits)
//! - Strength levels and their numeric weights
//! - Error types

pub mod constraint;
pub mod errors;
pub mod expression;
pub mod strength;
pub mod variable;

pub use constraint::*;
pub use errors::*;
pub use expression::*;
pub use strength::*;
pub use variable::*;
