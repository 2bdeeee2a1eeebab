//! Qubit identifiers
//!
//! Qubits carry no state of their own. They only name a wire in a circuit and
//! give every set of wires a fixed, total order.

use std::fmt;
use serde::{Deserialize, Serialize};

/// An opaque, totally ordered qubit identifier
///
/// Line qubits order by index and come before every named qubit. Named qubits
/// order by name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Qubit {
    /// A qubit on a line, identified by its position
    Line(i64),

    /// A qubit identified by a free-form name
    Named(String),
}

impl Qubit {
    /// Create a line qubit
    pub fn line(index: i64) -> Self {
        Qubit::Line(index)
    }

    /// Create a named qubit
    pub fn named(name: impl Into<String>) -> Self {
        Qubit::Named(name.into())
    }

    /// The line qubits `0..count`
    pub fn range(count: usize) -> Vec<Qubit> {
        (0..count as i64).map(Qubit::Line).collect()
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qubit::Line(index) => write!(f, "{}", index),
            Qubit::Named(name) => write!(f, "{}", name),
        }
    }
}
