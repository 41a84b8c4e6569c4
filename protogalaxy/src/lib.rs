//! This library implements the prover of the
//! [Protogalaxy](https://eprint.iacr.org/2023/1106.pdf) folding scheme for a
//! PlonK-ish arithmetization.
//!
//! Folding combines `NUM` proving keys into one accumulator, a relaxed key
//! carrying a target sum and gate challenges, whose validity implies the
//! validity of every key folded into it. The components are:
//! - [proving_key]: building keys from an execution trace;
//! - [oink]: the rounds run on a fresh key before it is folded;
//! - [prover_internal]: the numeric kernel (perturbator, combiner, quotient);
//! - [prover]: the orchestration of the rounds, see [ProtogalaxyProver].
//!
//! All the messages of the prover go through a Fiat-Shamir [Transcript].

pub mod columns;
pub mod error;
pub mod gate_separator;
pub mod mock_circuits;
pub mod oink;
pub mod polynomial;
pub mod prover;
pub mod prover_internal;
pub mod proving_key;
pub mod relations;
pub mod transcript;
pub mod univariate;

pub use error::{ProverError, TranscriptError};
pub use prover::{
    normalize_circuit_sizes, CombinerQuotientOutput, FoldingResult, PerturbatorOutput,
    ProtogalaxyProver,
};
pub use proving_key::{ArithmeticGate, ExecutionTrace, ProvingKey, TraceSettings};
pub use transcript::{Blake2bTranscript, Transcript};

use relations::MAX_RELATION_DEGREE;

/// Maximum log2 of the circuit size of a folded key. It is also the number of
/// gate challenges of every key and the degree of the perturbator.
pub const CONST_PG_LOG_N: usize = 20;

/// Number of points `(MAX_RELATION_DEGREE + 1) (num_keys - 1) + 1` the
/// combiner is evaluated on. The relation separators add one to the degree
/// of the relation.
pub const fn batched_extended_length(num_keys: usize) -> usize {
    (MAX_RELATION_DEGREE + 1) * (num_keys - 1) + 1
}
