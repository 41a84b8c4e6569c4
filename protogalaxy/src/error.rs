//! This module implements the [`ProverError`] and [`TranscriptError`] types.

use ark_serialize::SerializationError;
use thiserror::Error;

/// Errors raised by the Fiat-Shamir transcript
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("the element sent under label {label} could not be serialized: {source}")]
    Serialization {
        label: String,
        #[source]
        source: SerializationError,
    },
}

/// Errors that can arise when building keys or folding them
#[derive(Error, Debug)]
pub enum ProverError {
    #[error("transcript failure: {0}")]
    Transcript(#[from] TranscriptError),

    #[error("the execution trace does not contain any gate")]
    EmptyTrace,

    #[error("the circuit of size 2^{log_size} exceeds the maximum folding size 2^{max}")]
    CircuitTooLarge { log_size: usize, max: usize },

    #[error("the gate at row {row} references the unknown variable {variable}")]
    UnknownVariable { row: usize, variable: u32 },

    #[error(
        "the combiner does not agree with the perturbator at domain point {point}, the quotient is not exact"
    )]
    CombinerQuotientNotExact { point: usize },
}
