use serde::{Deserialize, Serialize};

/// Tolerances and strictness of an equivalence check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Absolute tolerance per matrix entry
    pub atol: f64,

    /// Relative tolerance per matrix entry, scaled by the reference entry
    pub rtol: f64,

    /// Reject circuits when some measured-qubit phase could not be solved for
    ///
    /// The freedoms derived from two circuits (a global phase plus one per
    /// distinct measured qubit) always form a full-rank system, so this never
    /// fires through the circuit checks. It matters only when the solver report
    /// comes from a hand-built freedom list passed to `cancel_phase`.
    pub fail_on_unresolved_phase: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            atol: 1e-8,
            rtol: 1e-5,
            fail_on_unresolved_phase: false,
        }
    }
}

impl CompareConfig {
    pub fn with_atol(atol: f64) -> Self {
        Self { atol, ..Self::default() }
    }

    pub fn strict(mut self) -> Self {
        self.fail_on_unresolved_phase = true;
        self
    }
}
