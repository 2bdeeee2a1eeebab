//! Error types for circuit construction and equivalence checking

use thiserror::Error;

use crate::quantum::Qubit;

/// Errors raised while building a circuit or extracting its unitary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CircuitError {
    #[error("gate {gate} acts on {expected} qubits, but {actual} qubits were specified")]
    QubitCountMismatch {
        gate: String,
        expected: usize,
        actual: usize,
    },

    #[error("qubit {0} appears more than once in a single operation")]
    DuplicateQubit(Qubit),

    #[error("measurement must target at least one qubit")]
    EmptyMeasurement,

    #[error("qubit {0} is not present in the requested qubit order")]
    QubitNotInOrder(Qubit),

    #[error("qubit order lists {0} more than once")]
    DuplicateInOrder(Qubit),

    #[error("measurement '{key}' on qubit {qubit} is followed by another operation on that qubit")]
    NonTerminalMeasurement { key: String, qubit: Qubit },

    #[error("gate {0} does not have a unitary matrix")]
    NonUnitaryGate(String),

    #[error("a {rows}x{cols} matrix is not a square matrix of power-of-two dimension")]
    InvalidMatrixShape { rows: usize, cols: usize },
}

pub type CircuitResult<T> = Result<T, CircuitError>;

/// Errors raised by the equivalence check
///
/// `Mismatch` is the designed negative answer. The other variants mean the
/// check was misused and cannot give an answer at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquivalenceError {
    #[error("all measurements must be terminal, but this circuit is not:\n{diagram}")]
    NonTerminalMeasurement { diagram: String },

    #[error("circuits measure different qubits: {actual:?} vs {reference:?}")]
    MeasuredQubitsDiffer {
        actual: Vec<Qubit>,
        reference: Vec<Qubit>,
    },

    #[error("could not compute circuit unitary: {0}")]
    Circuit(#[from] CircuitError),

    #[error("phase freedoms {0:?} could not be resolved by the phase-cancellation solver")]
    UnresolvedPhase(Vec<usize>),

    #[error(
        "Circuit's effect differs from the reference circuit (max deviation {max_deviation:.3e}).\n\
         \n\
         Diagram of actual circuit:\n\
         {actual_diagram}\n\
         \n\
         Diagram of reference circuit with desired function:\n\
         {reference_diagram}\n"
    )]
    Mismatch {
        max_deviation: f64,
        actual_diagram: String,
        reference_diagram: String,
    },
}

pub type EquivalenceResult<T> = Result<T, EquivalenceError>;
