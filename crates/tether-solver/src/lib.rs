//! Incremental solving of prioritized linear constraints.
//!
//! This crate implements the simplex engine behind Tether: clients describe
//! relationships between variables as linear equalities and inequalities with
//! strengths, and the solver maintains an assignment that satisfies every
//! required constraint exactly while minimizing the weighted error of the
//! rest. Adding a constraint, removing one, or suggesting a new value for an
//! edit variable each re-solve incrementally from the previous tableau.
//!
//! ```
//! use tether_core::{Strength, Variable};
//! use tether_solver::Solver;
//!
//! let mut solver = Solver::new();
//! let x = Variable::new();
//! let y = Variable::new();
//! solver.add_var(x).unwrap();
//! solver.add_var(y).unwrap();
//! solver.add_constraint((x + y).equals(10.0)).unwrap();
//! solver.add_constraint(x.leq(4.0)).unwrap();
//! assert!((solver.get_value(x) + solver.get_value(y) - 10.0).abs() < 1e-6);
//! assert!(solver.get_value(x) <= 4.0 + 1e-6);
//! ```

mod tableau;

pub mod solver;

pub use solver::Solver;
