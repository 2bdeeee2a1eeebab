// src/quantum/gate.rs
//! Quantum gates
//!
//! Every gate reports how many qubits it acts on through `qubit_count`, so
//! callers never need to inspect a gate's concrete type to find its arity.

use std::fmt::Debug;
use num_complex::Complex64;
use ndarray::{array, Array1, Array2};

use crate::error::{CircuitError, CircuitResult};

/// Common complex numbers used in quantum gates
pub mod constants {
    use num_complex::Complex64;

    /// The imaginary unit i
    pub const I: Complex64 = Complex64::new(0.0, 1.0);

    /// 1/sqrt(2)
    pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
}

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Embeds a 2x2 target matrix as the lower-right block of a controlled 4x4 gate
fn controlled(target: Array2<Complex64>) -> Array2<Complex64> {
    let mut matrix = Array2::from_diag(&Array1::from_elem(4, ONE));
    for i in 0..2 {
        for j in 0..2 {
            matrix[[2 + i, 2 + j]] = target[[i, j]];
        }
    }
    matrix
}

/// Trait for quantum gates
pub trait QuantumGate: Debug + Send + Sync {
    /// Returns the number of qubits this gate acts on
    fn qubit_count(&self) -> usize;

    /// Returns the matrix representation of this gate
    ///
    /// The gate's first qubit is the most significant bit of the row index.
    fn matrix(&self) -> Array2<Complex64>;

    /// Returns a display name for this gate
    fn name(&self) -> String;

    /// Create a clone of this gate
    fn clone_box(&self) -> Box<dyn QuantumGate>;

    /// The symbol drawn on each of the gate's wires in a text diagram
    fn wire_symbols(&self) -> Vec<String> {
        let name = self.name();
        (0..self.qubit_count())
            .map(|k| if k == 0 { name.clone() } else { format!("#{}", k + 1) })
            .collect()
    }

    /// Compares this gate with another gate by matrix
    fn equals(&self, other: &dyn QuantumGate) -> bool {
        let m1 = self.matrix();
        let m2 = other.matrix();

        if m1.shape() != m2.shape() {
            return false;
        }

        m1.iter()
            .zip(m2.iter())
            .all(|(a, b)| (a.re - b.re).abs() <= 1e-10 && (a.im - b.im).abs() <= 1e-10)
    }

    /// Expands this gate to a `total_qubits` system
    ///
    /// `positions[k]` is the position of the gate's k-th qubit in the system,
    /// where position 0 is the most significant bit.
    fn tensor_to_full_system(
        &self,
        total_qubits: usize,
        positions: &[usize]
    ) -> Array2<Complex64> {
        let gate_matrix = self.matrix();
        let dim = 1usize << total_qubits;
        let local_dim = 1usize << positions.len();

        let shifts: Vec<usize> = positions.iter().map(|&p| total_qubits - 1 - p).collect();
        let mask = shifts.iter().fold(0usize, |m, &s| m | (1 << s));

        let mut result = Array2::zeros((dim, dim));
        for row in 0..dim {
            let local_row = gather_bits(row, &shifts);
            let untouched = row & !mask;
            for local_col in 0..local_dim {
                let amplitude = gate_matrix[[local_row, local_col]];
                if amplitude == ZERO {
                    continue;
                }
                result[[row, untouched | scatter_bits(local_col, &shifts)]] = amplitude;
            }
        }

        result
    }
}

/// Collects the bits of `index` at `shifts` into a local index, first shift most significant
fn gather_bits(index: usize, shifts: &[usize]) -> usize {
    shifts
        .iter()
        .fold(0, |local, &s| (local << 1) | ((index >> s) & 1))
}

/// Inverse of `gather_bits`
fn scatter_bits(local: usize, shifts: &[usize]) -> usize {
    let width = shifts.len();
    shifts
        .iter()
        .enumerate()
        .fold(0, |index, (k, &s)| index | (((local >> (width - 1 - k)) & 1) << s))
}

impl Clone for Box<dyn QuantumGate> {
    fn clone(&self) -> Box<dyn QuantumGate> {
        self.clone_box()
    }
}

impl PartialEq for Box<dyn QuantumGate> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.equals(other.as_ref())
    }
}

/// A gate defined directly by its matrix
#[derive(Debug, Clone)]
pub struct CustomMatrixGate {
    matrix: Array2<Complex64>,
    name: String,
    qubits: usize,
}

impl CustomMatrixGate {
    /// Create a gate from a square matrix of dimension 2^n
    ///
    /// Unitarity is not checked here; unitary extraction rejects gates whose
    /// matrix is not unitary.
    pub fn new(matrix: Array2<Complex64>, name: impl Into<String>) -> CircuitResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || !rows.is_power_of_two() {
            return Err(CircuitError::InvalidMatrixShape { rows, cols });
        }

        Ok(CustomMatrixGate {
            qubits: rows.trailing_zeros() as usize,
            matrix,
            name: name.into(),
        })
    }
}

impl QuantumGate for CustomMatrixGate {
    fn qubit_count(&self) -> usize {
        self.qubits
    }

    fn matrix(&self) -> Array2<Complex64> {
        self.matrix.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }
}

/// Standard quantum gates (Pauli, Hadamard, etc.)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StandardGate {
    /// Identity gate
    I(usize), // number of qubits

    /// Pauli-X gate (NOT gate)
    X,

    /// Pauli-Y gate
    Y,

    /// Pauli-Z gate
    Z,

    /// Hadamard gate
    H,

    /// Phase gate (S gate)
    S,

    /// π/8 gate (T gate)
    T,

    /// CNOT gate
    CNOT,

    /// SWAP gate
    SWAP,

    /// Toffoli gate (CCNOT)
    Toffoli,

    /// Controlled-Z gate
    CZ,

    /// Controlled-Y gate
    CY,
}

impl QuantumGate for StandardGate {
    fn qubit_count(&self) -> usize {
        match self {
            StandardGate::I(n) => *n,
            StandardGate::X | StandardGate::Y | StandardGate::Z |
            StandardGate::H | StandardGate::S | StandardGate::T => 1,
            StandardGate::CNOT | StandardGate::SWAP | StandardGate::CZ |
            StandardGate::CY => 2,
            StandardGate::Toffoli => 3,
        }
    }

    fn matrix(&self) -> Array2<Complex64> {
        use constants::*;
        match self {
            StandardGate::I(n) => Array2::from_diag(&Array1::from_elem(1usize << n, ONE)),
            StandardGate::X => array![[ZERO, ONE], [ONE, ZERO]],
            StandardGate::Y => array![[ZERO, -I], [I, ZERO]],
            StandardGate::Z => array![[ONE, ZERO], [ZERO, -ONE]],
            StandardGate::H => {
                let h = c(FRAC_1_SQRT_2, 0.0);
                array![[h, h], [h, -h]]
            },
            StandardGate::S => array![[ONE, ZERO], [ZERO, I]],
            StandardGate::T => array![[ONE, ZERO], [ZERO, c(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]],
            StandardGate::CNOT => controlled(StandardGate::X.matrix()),
            StandardGate::CY => controlled(StandardGate::Y.matrix()),
            StandardGate::CZ => controlled(StandardGate::Z.matrix()),
            StandardGate::SWAP => {
                let mut matrix = Array2::zeros((4, 4));
                matrix[[0, 0]] = ONE;
                matrix[[1, 2]] = ONE;
                matrix[[2, 1]] = ONE;
                matrix[[3, 3]] = ONE;
                matrix
            },
            StandardGate::Toffoli => {
                let mut matrix = Array2::zeros((8, 8));
                for i in 0..8 {
                    // Flip the target (least significant bit) when both controls are set
                    let j = if i & 0b110 == 0b110 { i ^ 1 } else { i };
                    matrix[[i, j]] = ONE;
                }
                matrix
            }
        }
    }

    fn name(&self) -> String {
        match self {
            StandardGate::I(n) => format!("I({})", n),
            StandardGate::X => "X".to_string(),
            StandardGate::Y => "Y".to_string(),
            StandardGate::Z => "Z".to_string(),
            StandardGate::H => "H".to_string(),
            StandardGate::S => "S".to_string(),
            StandardGate::T => "T".to_string(),
            StandardGate::CNOT => "CNOT".to_string(),
            StandardGate::SWAP => "SWAP".to_string(),
            StandardGate::CZ => "CZ".to_string(),
            StandardGate::CY => "CY".to_string(),
            StandardGate::Toffoli => "Toffoli".to_string(),
        }
    }

    fn wire_symbols(&self) -> Vec<String> {
        let symbols: &[&str] = match self {
            StandardGate::I(n) => return vec!["I".to_string(); *n],
            StandardGate::CNOT => &["@", "X"],
            StandardGate::CY => &["@", "Y"],
            StandardGate::CZ => &["@", "@"],
            StandardGate::SWAP => &["×", "×"],
            StandardGate::Toffoli => &["@", "@", "X"],
            _ => return vec![self.name()],
        };
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }
}

/// Parametrized quantum gates
#[derive(Clone, Debug, PartialEq)]
pub enum ParametrizedGate {
    /// Rotation around X-axis
    Rx(f64),

    /// Rotation around Y-axis
    Ry(f64),

    /// Rotation around Z-axis
    Rz(f64),

    /// General single-qubit unitary with Euler angles
    U3(f64, f64, f64),

    /// Controlled rotation around Z-axis
    CRz(f64),

    /// Controlled rotation around X-axis
    CRx(f64),

    /// Controlled rotation around Y-axis
    CRy(f64),

    /// Phase gate with arbitrary angle
    Phase(f64),

    /// Controlled phase gate with arbitrary angle
    CPhase(f64),
}

impl ParametrizedGate {
    /// The single-qubit matrix this gate applies to its target
    fn target_matrix(&self) -> Array2<Complex64> {
        match self {
            ParametrizedGate::Rx(theta) | ParametrizedGate::CRx(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![[c(cos, 0.0), c(0.0, -sin)], [c(0.0, -sin), c(cos, 0.0)]]
            },
            ParametrizedGate::Ry(theta) | ParametrizedGate::CRy(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![[c(cos, 0.0), c(-sin, 0.0)], [c(sin, 0.0), c(cos, 0.0)]]
            },
            ParametrizedGate::Rz(theta) | ParametrizedGate::CRz(theta) => {
                array![
                    [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
                    [ZERO, Complex64::from_polar(1.0, theta / 2.0)]
                ]
            },
            ParametrizedGate::Phase(theta) | ParametrizedGate::CPhase(theta) => {
                array![[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, *theta)]]
            },
            ParametrizedGate::U3(theta, phi, lambda) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![
                    [c(cos, 0.0), -Complex64::from_polar(sin, *lambda)],
                    [Complex64::from_polar(sin, *phi), Complex64::from_polar(cos, phi + lambda)]
                ]
            },
        }
    }

    fn is_controlled(&self) -> bool {
        matches!(
            self,
            ParametrizedGate::CRz(_) | ParametrizedGate::CRx(_) |
            ParametrizedGate::CRy(_) | ParametrizedGate::CPhase(_)
        )
    }

    fn target_name(&self) -> String {
        match self {
            ParametrizedGate::Rx(theta) | ParametrizedGate::CRx(theta) => format!("Rx({:.2})", theta),
            ParametrizedGate::Ry(theta) | ParametrizedGate::CRy(theta) => format!("Ry({:.2})", theta),
            ParametrizedGate::Rz(theta) | ParametrizedGate::CRz(theta) => format!("Rz({:.2})", theta),
            ParametrizedGate::Phase(theta) | ParametrizedGate::CPhase(theta) => format!("P({:.2})", theta),
            ParametrizedGate::U3(theta, phi, lambda) => {
                format!("U3({:.2}, {:.2}, {:.2})", theta, phi, lambda)
            },
        }
    }
}

impl QuantumGate for ParametrizedGate {
    fn qubit_count(&self) -> usize {
        if self.is_controlled() { 2 } else { 1 }
    }

    fn matrix(&self) -> Array2<Complex64> {
        if self.is_controlled() {
            controlled(self.target_matrix())
        } else {
            self.target_matrix()
        }
    }

    fn name(&self) -> String {
        if self.is_controlled() {
            format!("C{}", self.target_name())
        } else {
            self.target_name()
        }
    }

    fn wire_symbols(&self) -> Vec<String> {
        if self.is_controlled() {
            vec!["@".to_string(), self.target_name()]
        } else {
            vec![self.target_name()]
        }
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }
}
