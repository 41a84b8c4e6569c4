//! The Protogalaxy folding prover.
//!
//! [ProtogalaxyProver] folds `NUM` proving keys into a single accumulator. The
//! key at position `0` is the accumulator-designate: either the result of a
//! previous fold or a fresh key, in which case the fold bootstraps a new
//! accumulator. The rounds are:
//!
//! 1. Oink on every key that needs it ([crate::oink]);
//! 2. the perturbator round, sending `F(X)` but its constant coefficient;
//! 3. the combiner quotient round, sending the values of `K(X)` past the
//!    folding domain;
//! 4. the target sum update and the fold of the keys at the last challenge.
//!
//! Each round reads the challenges derived after the messages of the previous
//! one, so the rounds are strictly sequential. The work inside a round is
//! spread over the rayon thread pool.

use crate::{
    batched_extended_length,
    error::ProverError,
    gate_separator::GateSeparatorPolynomial,
    oink::OinkProver,
    prover_internal::{
        compute_and_extend_alphas, compute_combiner, compute_combiner_quotient,
        compute_extended_relation_parameters, compute_perturbator, compute_round_challenge_pows,
        compute_vanishing_polynomial_and_lagranges, update_gate_challenges,
    },
    proving_key::ProvingKey,
    relations::RelationParameters,
    transcript::Transcript,
    univariate::Univariate,
    CONST_PG_LOG_N,
};
use ark_ff::PrimeField;
use ark_poly::{univariate::DensePolynomial, Polynomial as _};
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use std::time::Instant;

/// Output of [ProtogalaxyProver::perturbator_round]
#[derive(Clone, Debug)]
pub struct PerturbatorOutput<F: PrimeField> {
    /// `[δ, δ², ..., δ^(2^(CONST_PG_LOG_N - 1))]`
    pub deltas: Vec<F>,
    pub perturbator: DensePolynomial<F>,
}

/// Output of [ProtogalaxyProver::combiner_quotient_round]
#[derive(Clone, Debug)]
pub struct CombinerQuotientOutput<F: PrimeField> {
    /// The gate challenges of the next accumulator
    pub gate_challenges: Vec<F>,
    pub alphas: Vec<Univariate<F>>,
    pub relation_parameters: RelationParameters<Univariate<F>>,
    /// `F(α)`, the value at `0` of the combiner
    pub perturbator_evaluation: F,
    pub combiner_quotient: Univariate<F>,
}

#[derive(Clone, Debug)]
pub struct FoldingResult<F> {
    pub accumulator: ProvingKey<F>,
    /// Bytes sent to the verifier during the fold
    pub proof: Vec<u8>,
}

/// Pads every key to the largest virtual size among them. The values already
/// stored are not modified.
pub fn normalize_circuit_sizes<F: PrimeField>(keys: &mut [ProvingKey<F>]) {
    let max_circuit_size = keys
        .iter()
        .map(|key| key.polynomials.virtual_size())
        .max()
        .unwrap_or(0);
    for (idx, key) in keys.iter_mut().enumerate() {
        let virtual_size = key.polynomials.virtual_size();
        if virtual_size != max_circuit_size {
            info!(
                "Circuit size mismatch: increasing the virtual size of key {idx} from {virtual_size} to {max_circuit_size}"
            );
            key.polynomials.increase_virtual_size(max_circuit_size);
        }
    }
}

pub struct ProtogalaxyProver<'a, F: PrimeField, T: Transcript<F>, const NUM: usize> {
    keys_to_fold: [ProvingKey<F>; NUM],
    transcript: &'a mut T,
}

impl<'a, F: PrimeField, T: Transcript<F>, const NUM: usize> ProtogalaxyProver<'a, F, T, NUM> {
    /// Number of points the combiner is evaluated on
    pub const BATCHED_EXTENDED_LENGTH: usize = batched_extended_length(NUM);

    pub fn new(keys_to_fold: [ProvingKey<F>; NUM], transcript: &'a mut T) -> Self {
        assert!(NUM >= 2, "folding requires at least two keys, got {NUM}");
        Self {
            keys_to_fold,
            transcript,
        }
    }

    pub fn keys_to_fold(&self) -> &[ProvingKey<F>; NUM] {
        &self.keys_to_fold
    }

    pub fn prove(mut self) -> Result<FoldingResult<F>, ProverError> {
        normalize_circuit_sizes(&mut self.keys_to_fold);

        let start = Instant::now();
        self.run_oink_prover_on_each_incomplete_key()?;
        debug!("Oink on each incomplete key: {} μs", start.elapsed().as_micros());

        let start = Instant::now();
        let PerturbatorOutput {
            deltas,
            perturbator,
        } = self.perturbator_round()?;
        debug!("Perturbator round: {} μs", start.elapsed().as_micros());

        let start = Instant::now();
        let combiner_output = self.combiner_quotient_round(&deltas, &perturbator)?;
        debug!("Combiner quotient round: {} μs", start.elapsed().as_micros());

        let start = Instant::now();
        let result = self.update_target_sum_and_fold(combiner_output)?;
        debug!("Target sum update and fold: {} μs", start.elapsed().as_micros());
        Ok(result)
    }

    /// Runs Oink on the accumulator-designate when it is not an accumulator
    /// yet, and on every other key. Keys that are not accumulators start
    /// with a zero target sum and zero gate challenges.
    pub fn run_oink_prover_on_each_incomplete_key(&mut self) -> Result<(), ProverError> {
        for (idx, key) in self.keys_to_fold.iter_mut().enumerate() {
            if idx == 0 && key.is_accumulator {
                continue;
            }
            let domain_separator = format!("{idx}_");
            OinkProver::new(key, self.transcript, &domain_separator).prove()?;
            if !key.is_accumulator {
                key.target_sum = F::zero();
                key.gate_challenges = vec![F::zero(); CONST_PG_LOG_N];
            }
        }
        Ok(())
    }

    /// Sends the coefficients `1..=CONST_PG_LOG_N` of the perturbator of the
    /// accumulator. The perturbator of a fresh key is zero.
    pub fn perturbator_round(&mut self) -> Result<PerturbatorOutput<F>, ProverError> {
        let accumulator = &self.keys_to_fold[0];
        let delta = self.transcript.get_challenge("delta")?;
        let deltas = compute_round_challenge_pows(CONST_PG_LOG_N, delta);
        let perturbator = if accumulator.is_accumulator {
            compute_perturbator(accumulator, &deltas)
        } else {
            DensePolynomial { coeffs: vec![] }
        };

        for idx in 1..=CONST_PG_LOG_N {
            let coefficient = perturbator.coeffs.get(idx).copied().unwrap_or_else(F::zero);
            self.transcript
                .send_to_verifier(&format!("perturbator_{idx}"), &coefficient)?;
        }
        Ok(PerturbatorOutput {
            deltas,
            perturbator,
        })
    }

    /// Sends the values of the combiner quotient on
    /// `{NUM, ..., BATCHED_EXTENDED_LENGTH - 1}`.
    pub fn combiner_quotient_round(
        &mut self,
        deltas: &[F],
        perturbator: &DensePolynomial<F>,
    ) -> Result<CombinerQuotientOutput<F>, ProverError> {
        let perturbator_challenge = self.transcript.get_challenge("perturbator_challenge")?;

        let keys = &self.keys_to_fold;
        let gate_challenges =
            update_gate_challenges(perturbator_challenge, &keys[0].gate_challenges, deltas);
        let alphas = compute_and_extend_alphas(keys, Self::BATCHED_EXTENDED_LENGTH);
        let log_size = keys[0].polynomials.virtual_size().trailing_zeros() as usize;
        let gate_separators = GateSeparatorPolynomial::new(&gate_challenges, log_size);
        let relation_parameters =
            compute_extended_relation_parameters(keys, Self::BATCHED_EXTENDED_LENGTH);

        let combiner = compute_combiner(
            keys,
            &gate_separators,
            &relation_parameters,
            &alphas,
            Self::BATCHED_EXTENDED_LENGTH,
        );
        let perturbator_evaluation = perturbator.evaluate(&perturbator_challenge);
        let combiner_quotient = compute_combiner_quotient(perturbator_evaluation, &combiner, NUM)?;

        for idx in NUM..Self::BATCHED_EXTENDED_LENGTH {
            self.transcript.send_to_verifier(
                &format!("combiner_quotient_{idx}"),
                &combiner_quotient.value_at(idx),
            )?;
        }

        Ok(CombinerQuotientOutput {
            gate_challenges,
            alphas,
            relation_parameters,
            perturbator_evaluation,
            combiner_quotient,
        })
    }

    /// Folds the keys at the last challenge `γ`: the polynomials, the
    /// relation separators and the relation parameters become their
    /// interpolations evaluated at `γ`, and the target sum becomes
    /// `F(α) L_0(γ) + Z(γ) K(γ)`.
    pub fn update_target_sum_and_fold(
        self,
        output: CombinerQuotientOutput<F>,
    ) -> Result<FoldingResult<F>, ProverError> {
        let CombinerQuotientOutput {
            gate_challenges,
            alphas,
            relation_parameters,
            perturbator_evaluation,
            combiner_quotient,
        } = output;
        let combiner_challenge = self.transcript.get_challenge("combiner_quotient_challenge")?;
        let proof = self.transcript.export_proof();

        let mut keys: Vec<ProvingKey<F>> = self.keys_to_fold.into_iter().collect();
        let mut accumulator = keys.remove(0);
        accumulator.is_accumulator = true;

        let (vanishing_polynomial_at_challenge, mut lagranges) =
            compute_vanishing_polynomial_and_lagranges(combiner_challenge, NUM);
        accumulator.target_sum = perturbator_evaluation * lagranges[0]
            + vanishing_polynomial_at_challenge * combiner_quotient.evaluate(combiner_challenge);

        // The accumulator must have the largest memory footprint: when the
        // incoming key overflows more, the two sides of the linear
        // combination are exchanged.
        if keys[0].overflow_size > accumulator.overflow_size {
            assert_eq!(
                NUM, 2,
                "exchanging the accumulator with an incoming key is only supported when folding two keys"
            );
            debug_assert_eq!(
                accumulator.polynomials.virtual_size(),
                keys[0].polynomials.virtual_size()
            );
            let incoming = &mut keys[0];
            core::mem::swap(&mut accumulator.polynomials, &mut incoming.polynomials);
            lagranges.swap(0, 1);
            core::mem::swap(&mut accumulator.circuit_size, &mut incoming.circuit_size);
            core::mem::swap(
                &mut accumulator.log_circuit_size,
                &mut incoming.log_circuit_size,
            );
            // The footprint follows the storage
            core::mem::swap(&mut accumulator.overflow_size, &mut incoming.overflow_size);
        }

        let lagrange_0 = lagranges[0];
        accumulator
            .polynomials
            .get_unshifted_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(col, acc_poly)| {
                acc_poly.scale(lagrange_0);
                for (key, lagrange) in keys.iter().zip_eq(&lagranges[1..]) {
                    acc_poly.add_scaled(&key.polynomials.get_unshifted()[col], *lagrange);
                }
            });

        accumulator.alphas = alphas
            .par_iter()
            .map(|alpha| alpha.evaluate(combiner_challenge))
            .collect();
        accumulator.relation_parameters = RelationParameters::from_to_fold(
            relation_parameters
                .get_to_fold()
                .map(|univariate| univariate.evaluate(combiner_challenge)),
        );
        accumulator.gate_challenges = gate_challenges;

        Ok(FoldingResult { accumulator, proof })
    }
}
