//! Quantum circuit equivalence checking
//!
//! This crate compares quantum circuits that may end in measurements. Two circuits
//! are treated as equivalent when they differ only by phase that no experiment can
//! observe: a global phase, or a phase attached to the classical outcome of a
//! terminal measurement.
//!
//! The `quantum` module holds the circuit model (qubits, gates, operations) and
//! produces unitary matrices and text diagrams. The `testing` module holds the
//! phase-cancellation solver and the equivalence assertions built on it.

pub mod error;
pub mod linalg;
pub mod quantum;
pub mod testing;

pub use error::{CircuitError, CircuitResult, EquivalenceError, EquivalenceResult};

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::quantum::prelude::*;
    pub use crate::testing::{assert_equivalent, cancel_phase, verify_equivalent, CompareConfig};
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
