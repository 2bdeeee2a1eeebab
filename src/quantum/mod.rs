// src/quantum/mod.rs
//! Circuit model
//!
//! This module defines qubits, gates and circuits, and turns a circuit into
//! its unitary matrix or a text diagram.

pub mod qubit;
pub mod gate;
pub mod circuit;
pub mod diagram;

pub use qubit::Qubit;
pub use gate::{QuantumGate, StandardGate, ParametrizedGate, CustomMatrixGate};
pub use circuit::{Circuit, CircuitBuilder, Operation};

/// Re-export commonly used types and traits
pub mod prelude {
    pub use super::{Qubit, Circuit, CircuitBuilder, Operation};
    pub use super::{QuantumGate, StandardGate, ParametrizedGate, CustomMatrixGate};
}
