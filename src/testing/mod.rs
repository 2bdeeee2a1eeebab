// src/testing/mod.rs
//! Assertions for comparing circuits in tests
//!
//! The central check is [`assert_equivalent`], which accepts two circuits as
//! equal when they differ only by phases that their terminal measurements
//! cannot observe.

pub mod config;
pub mod phase;
pub mod circuit_compare;
pub mod lin_alg_utils;

pub use config::CompareConfig;
pub use phase::{cancel_phase, PhaseCancellation, PhaseCorrection};
pub use circuit_compare::{
    assert_equivalent,
    assert_same_circuits,
    canonicalize_up_to_terminal_measurement_phase,
    verify_equivalent,
    verify_equivalent_with,
};
pub use lin_alg_utils::assert_allclose_up_to_global_phase;
