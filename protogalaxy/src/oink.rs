//! Oink: the rounds a fresh key goes through before it can be folded.
//!
//! Oink commits to the wires, derives the relation parameters, computes the
//! derived witness columns (`w_4` and the grand product `z_perm`) and finally
//! derives the relation separators. Every label is prefixed by the domain
//! separator of the key so that the transcripts of several keys folded
//! together cannot be confused.
//!
//! The commitment scheme is not part of this crate: a column is bound to the
//! transcript by a Blake2b digest of its values.

use crate::{
    columns::{Column, ProverPolynomials},
    error::{ProverError, TranscriptError},
    polynomial::Polynomial,
    proving_key::ProvingKey,
    relations::{RelationParameters, NUM_ALPHAS},
    transcript::Transcript,
};
use ark_ff::{batch_inversion, PrimeField};
use ark_serialize::CanonicalSerialize;
use blake2::{Blake2b512, Digest};
use rayon::prelude::*;

pub struct OinkProver<'a, F: PrimeField, T: Transcript<F>> {
    key: &'a mut ProvingKey<F>,
    transcript: &'a mut T,
    domain_separator: String,
}

impl<'a, F: PrimeField, T: Transcript<F>> OinkProver<'a, F, T> {
    pub fn new(key: &'a mut ProvingKey<F>, transcript: &'a mut T, domain_separator: &str) -> Self {
        Self {
            key,
            transcript,
            domain_separator: domain_separator.to_string(),
        }
    }

    pub fn prove(mut self) -> Result<(), ProverError> {
        self.execute_preamble_round()?;
        self.execute_wire_commitments_round()?;
        self.execute_record_round()?;
        self.execute_grand_product_round()?;
        self.generate_alphas_round()?;
        Ok(())
    }

    fn label(&self, name: &str) -> String {
        format!("{}{name}", self.domain_separator)
    }

    fn send(&mut self, name: &str, value: &F) -> Result<(), ProverError> {
        let label = self.label(name);
        self.transcript.send_to_verifier(&label, value)?;
        Ok(())
    }

    fn challenge(&mut self, name: &str) -> Result<F, ProverError> {
        let label = self.label(name);
        Ok(self.transcript.get_challenge(&label)?)
    }

    fn execute_preamble_round(&mut self) -> Result<(), ProverError> {
        let circuit_size = F::from(self.key.circuit_size as u64);
        self.send("circuit_size", &circuit_size)
    }

    fn execute_wire_commitments_round(&mut self) -> Result<(), ProverError> {
        for (name, col) in [("W_L", Column::WL), ("W_R", Column::WR), ("W_O", Column::WO)] {
            let commitment = commit(&self.key.polynomials[col])?;
            self.send(name, &commitment)?;
        }
        Ok(())
    }

    /// Derives `η` and fills `w_4 = w_l + η w_r + η² w_o`.
    fn execute_record_round(&mut self) -> Result<(), ProverError> {
        let eta = self.challenge("eta")?;
        let eta_two = eta.square();
        self.key.relation_parameters.eta = eta;
        self.key.relation_parameters.eta_two = eta_two;

        let polynomials = &self.key.polynomials;
        let w_4: Vec<F> = (0..polynomials.size())
            .into_par_iter()
            .map(|row| {
                polynomials[Column::WL].get(row)
                    + eta * polynomials[Column::WR].get(row)
                    + eta_two * polynomials[Column::WO].get(row)
            })
            .collect();
        self.key.polynomials[Column::W4]
            .evals_mut()
            .copy_from_slice(&w_4);

        let commitment = commit(&self.key.polynomials[Column::W4])?;
        self.send("W_4", &commitment)
    }

    /// Derives `β`, `γ` and computes the grand product of the permutation
    /// argument.
    fn execute_grand_product_round(&mut self) -> Result<(), ProverError> {
        let beta = self.challenge("beta")?;
        let gamma = self.challenge("gamma")?;
        self.key.relation_parameters.beta = beta;
        self.key.relation_parameters.gamma = gamma;

        let z_perm = compute_grand_product(&self.key.polynomials, &self.key.relation_parameters);
        self.key.polynomials[Column::ZPerm]
            .evals_mut()
            .copy_from_slice(&z_perm);

        let commitment = commit(&self.key.polynomials[Column::ZPerm])?;
        self.send("Z_PERM", &commitment)
    }

    fn generate_alphas_round(&mut self) -> Result<(), ProverError> {
        let alphas = (0..NUM_ALPHAS)
            .map(|idx| self.challenge(&format!("alpha_{idx}")))
            .collect::<Result<Vec<F>, _>>()?;
        self.key.alphas = alphas;
        Ok(())
    }
}

/// Digest of the values of a column, standing in for a commitment.
fn commit<F: PrimeField>(polynomial: &Polynomial<F>) -> Result<F, ProverError> {
    let mut bytes = vec![];
    polynomial
        .evals()
        .serialize_compressed(&mut bytes)
        .map_err(|source| TranscriptError::Serialization {
            label: "commitment".to_string(),
            source,
        })?;
    let digest = Blake2b512::digest(&bytes);
    Ok(F::from_le_bytes_mod_order(&digest))
}

/// Computes `z_perm` over the allocated rows with `z_perm[0] = 0` and, for
/// `i ≥ 1`,
///
/// ```text
/// z_perm[i] = ∏_{j < i} ∏_k (w_k[j] + β id_k[j] + γ) / (w_k[j] + β σ_k[j] + γ)
/// ```
///
/// The product over every row is `1` when the copy constraints hold; the
/// relation reads it through `L_last`.
pub(crate) fn compute_grand_product<F: PrimeField>(
    polynomials: &ProverPolynomials<F>,
    params: &RelationParameters<F>,
) -> Vec<F> {
    let size = polynomials.size();
    let accumulate = |row: usize, permutation: [Column; 3]| -> F {
        Column::wires()
            .into_iter()
            .zip(permutation)
            .map(|(w, s)| {
                polynomials[w].get(row) + params.beta * polynomials[s].get(row) + params.gamma
            })
            .product()
    };
    let numerators: Vec<F> = (0..size)
        .into_par_iter()
        .map(|row| accumulate(row, Column::ids()))
        .collect();
    let mut denominators: Vec<F> = (0..size)
        .into_par_iter()
        .map(|row| accumulate(row, Column::sigmas()))
        .collect();
    batch_inversion(&mut denominators);

    let mut z_perm = Vec::with_capacity(size);
    z_perm.push(F::zero());
    let mut running = F::one();
    for row in 0..size - 1 {
        running *= numerators[row] * denominators[row];
        z_perm.push(running);
    }
    z_perm
}
