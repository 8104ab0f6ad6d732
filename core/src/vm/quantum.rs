//! Quantum registers.
//!
//! This is a two-outcome toy model: a register is a qubit count, a list of
//! amplitudes and an entanglement flag. No joint state is tracked.

use core::f64::consts::FRAC_1_SQRT_2;

use serde::{Deserialize, Serialize};

use crate::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub real: f64,
    pub imag: f64,
}

impl Complex {
    pub const fn new(real: f64, imag: f64) -> Self {
        Self { real, imag }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantumRegister {
    pub qubits: u8,
    pub state: Vec<Complex>,
    pub entangled: bool,
}

impl QuantumRegister {
    /// A fresh register in the |0⟩ state.
    pub fn new(qubits: u8) -> Self {
        Self {
            qubits,
            state: alloc::vec![Complex::new(1.0, 0.0)],
            entangled: false,
        }
    }

    /// Overwrite the state with (|0⟩ + |1⟩) / √2.
    pub fn superpose(&mut self) {
        self.state = alloc::vec![
            Complex::new(FRAC_1_SQRT_2, 0.0),
            Complex::new(FRAC_1_SQRT_2, 0.0),
        ];
    }

    pub fn entangle(&mut self) {
        self.entangled = true;
    }

    pub fn is_superposed(&self) -> bool {
        self.state.len() == 2
    }
}
