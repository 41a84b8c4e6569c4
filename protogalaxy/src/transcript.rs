//! Fiat-Shamir transcript.
//!
//! The prover writes its messages with [Transcript::send_to_verifier] and
//! derives verifier challenges with [Transcript::get_challenge]. A challenge
//! is a deterministic function of everything written before it: the
//! [Blake2bTranscript] hashes the previous challenge, the challenge label and
//! all the data sent since the previous challenge.
//!
//! The bytes sent to the verifier are accumulated in a proof buffer, moved out
//! by [Transcript::export_proof]. Exporting does not reset the hash state, so
//! a sequence of folds can share a single transcript.

use crate::error::TranscriptError;
use ark_ff::PrimeField;
use ark_serialize::CanonicalSerialize;
use blake2::{Blake2b512, Digest};
use core::marker::PhantomData;

/// Prefix hashed before the first challenge
const TRANSCRIPT_DOMAIN: &[u8] = b"protogalaxy-transcript";

pub trait Transcript<F: PrimeField> {
    /// Appends a labelled field element to the proof and to the data bound by
    /// the next challenge.
    fn send_to_verifier(&mut self, label: &str, element: &F) -> Result<(), TranscriptError>;

    /// Derives a challenge from the current state of the transcript.
    fn get_challenge(&mut self, label: &str) -> Result<F, TranscriptError>;

    /// Moves out the proof bytes sent since the last export.
    fn export_proof(&mut self) -> Vec<u8>;
}

/// One entry of the [Manifest]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestEntry {
    Sent { label: String, num_bytes: usize },
    Challenge { label: String },
}

/// Ordered log of the labels sent and derived, grouped by round. A round ends
/// with a challenge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    pub rounds: Vec<Vec<ManifestEntry>>,
    round_open: bool,
}

impl Manifest {
    fn record(&mut self, entry: ManifestEntry) {
        let closes_round = matches!(entry, ManifestEntry::Challenge { .. });
        if !self.round_open || self.rounds.is_empty() {
            self.rounds.push(vec![]);
        }
        if let Some(round) = self.rounds.last_mut() {
            round.push(entry);
        }
        self.round_open = !closes_round;
    }

    /// Labels of every element sent, in order
    pub fn sent_labels(&self) -> Vec<&str> {
        self.rounds
            .iter()
            .flatten()
            .filter_map(|entry| match entry {
                ManifestEntry::Sent { label, .. } => Some(label.as_str()),
                ManifestEntry::Challenge { .. } => None,
            })
            .collect()
    }

    /// Labels of every challenge derived, in order
    pub fn challenge_labels(&self) -> Vec<&str> {
        self.rounds
            .iter()
            .flatten()
            .filter_map(|entry| match entry {
                ManifestEntry::Challenge { label } => Some(label.as_str()),
                ManifestEntry::Sent { .. } => None,
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct Blake2bTranscript<F> {
    previous_challenge: Vec<u8>,
    current_round_data: Vec<u8>,
    proof_data: Vec<u8>,
    manifest: Manifest,
    _field: PhantomData<F>,
}

impl<F: PrimeField> Blake2bTranscript<F> {
    pub fn new() -> Self {
        Self::with_seed(&[])
    }

    /// A transcript whose first challenge also binds `seed`.
    pub fn with_seed(seed: &[u8]) -> Self {
        let mut hasher = Blake2b512::new();
        hasher.update(TRANSCRIPT_DOMAIN);
        hasher.update(seed);
        Self {
            previous_challenge: hasher.finalize().to_vec(),
            current_round_data: vec![],
            proof_data: vec![],
            manifest: Manifest::default(),
            _field: PhantomData,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Proof bytes not exported yet
    pub fn proof_data(&self) -> &[u8] {
        &self.proof_data
    }
}

impl<F: PrimeField> Default for Blake2bTranscript<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PrimeField> Transcript<F> for Blake2bTranscript<F> {
    fn send_to_verifier(&mut self, label: &str, element: &F) -> Result<(), TranscriptError> {
        let mut bytes = Vec::with_capacity(element.compressed_size());
        element
            .serialize_compressed(&mut bytes)
            .map_err(|source| TranscriptError::Serialization {
                label: label.to_string(),
                source,
            })?;

        self.current_round_data.extend_from_slice(label.as_bytes());
        self.current_round_data.extend_from_slice(&bytes);
        self.proof_data.extend_from_slice(&bytes);
        self.manifest.record(ManifestEntry::Sent {
            label: label.to_string(),
            num_bytes: bytes.len(),
        });
        Ok(())
    }

    fn get_challenge(&mut self, label: &str) -> Result<F, TranscriptError> {
        let mut hasher = Blake2b512::new();
        hasher.update(&self.previous_challenge);
        hasher.update(label.as_bytes());
        hasher.update(&self.current_round_data);
        let digest = hasher.finalize();

        self.previous_challenge = digest.to_vec();
        self.current_round_data.clear();
        self.manifest.record(ManifestEntry::Challenge {
            label: label.to_string(),
        });

        Ok(F::from_le_bytes_mod_order(&digest))
    }

    fn export_proof(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.proof_data)
    }
}
