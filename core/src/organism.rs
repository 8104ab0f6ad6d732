//! Organism state threaded through execution.
//!
//! The consciousness metrics and fitness are opaque scoring heuristics: the
//! VM only guarantees the literal formulas implemented here.

use alloc::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{String, Value, format};

/// The four-symbol gene alphabet, indexed by `code point % 4`.
pub const BASES: [char; 4] = ['A', 'T', 'G', 'C'];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consciousness {
    pub phi: f64,
    pub coherence: f64,
    pub awareness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismState {
    /// Gene key to gene payload, ordered by key.
    pub genome: BTreeMap<String, Value>,
    pub consciousness: Consciousness,
    pub fitness: f64,
    pub generation: u64,
    /// Living cells. A fresh organism is a single cell.
    pub cells: u64,
}

impl Default for OrganismState {
    fn default() -> Self {
        Self {
            genome: BTreeMap::new(),
            consciousness: Consciousness::default(),
            fitness: 0.0,
            generation: 0,
            cells: 1,
        }
    }
}

impl OrganismState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key the next encoded gene is stored under.
    pub fn next_gene_key(&self) -> String {
        format!("gene_{}", self.genome.len())
    }

    /// `(genome size / 100 + phi) / 2`
    pub fn calculate_fitness(&self) -> f64 {
        let genome_fitness = self.genome.len() as f64 / 100.0;
        (genome_fitness + self.consciousness.phi) / 2.0
    }

    /// `min(1, genome size * coherence / 100)`
    pub fn calculate_phi(&self) -> f64 {
        let complexity = self.genome.len() as f64;
        (complexity * self.consciousness.coherence / 100.0).min(1.0)
    }

    /// Re-mutate every gene independently with probability `rate`.
    ///
    /// Returns the number of genes that were selected for mutation.
    pub fn mutate_genome<R: Rng>(&mut self, rate: f64, rng: &mut R) -> usize {
        let mut mutated = 0;
        for gene in self.genome.values_mut() {
            if rng.r#gen::<f64>() < rate {
                mutate_gene(gene, rng);
                mutated += 1;
            }
        }
        mutated
    }
}

/// Encode a value as a gene sequence.
///
/// The value's literal text is mapped character by character through
/// [`BASES`]. The mapping is lossy and has no inverse.
pub fn encode_gene(value: &Value) -> String {
    let text = format!("{}", value);
    text.chars()
        .map(|c| BASES[(c as u32 % 4) as usize])
        .collect()
}

/// Decode a gene sequence.
///
/// Encoding is lossy, so this is a pass-through that returns the stored
/// sequence unchanged.
pub fn decode_gene(sequence: &Value) -> Value {
    sequence.clone()
}

/// Replace one randomly chosen symbol of a string gene with a random base.
///
/// Non-string genes and empty strings are left unchanged.
pub fn mutate_gene<R: Rng>(gene: &mut Value, rng: &mut R) {
    let Value::Str(sequence) = gene else {
        return;
    };
    if sequence.is_empty() {
        return;
    }
    let mut symbols: alloc::vec::Vec<char> = sequence.chars().collect();
    let point = rng.gen_range(0..symbols.len());
    symbols[point] = BASES[rng.gen_range(0..BASES.len())];
    *sequence = symbols.into_iter().collect();
}
