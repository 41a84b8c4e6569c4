//! The numeric kernel of the folding prover.
//!
//! These functions are pure: they read the keys and the challenges and return
//! new values, the transcript and the ownership of the keys being handled by
//! [crate::prover::ProtogalaxyProver].
//!
//! Notations, for `NUM` keys folded over the domain `{0, ..., NUM - 1}`:
//! - `f_i(key)` is the value at row `i` of the relation of a key, its
//!   subrelations batched by the separators `alphas` of the key;
//! - `pow_β(i)` is the gate separator (see [GateSeparatorPolynomial]);
//! - the perturbator of an accumulator is
//!   `F(X) = Σ_i f_i ∏_{k : bit k of i is set} (β_k + X δ_k)`, so that
//!   `F(0) = Σ_i pow_β(i) f_i` is its target sum;
//! - the combiner is `G(X) = Σ_i pow_β*(i) f_i(Σ_j L_j(X) key_j)`, where
//!   everything the relation reads (rows, separators, parameters) is
//!   interpolated across keys.

use crate::{
    columns::{RowEvaluations, NUMBER_OF_COLUMNS},
    error::ProverError,
    gate_separator::GateSeparatorPolynomial,
    proving_key::ProvingKey,
    relations::{batch_over_subrelations, evaluate_subrelations, RelationParameters, NUM_ALPHAS},
    univariate::{lagrange_basis_at, Univariate},
    CONST_PG_LOG_N,
};
use ark_ff::{batch_inversion, PrimeField};
use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial};
use itertools::Itertools;
use rayon::prelude::*;

/// `[δ, δ², δ⁴, ..., δ^(2^(num_powers - 1))]`, by successive squaring.
pub fn compute_round_challenge_pows<F: PrimeField>(num_powers: usize, challenge: F) -> Vec<F> {
    let mut pows = Vec::with_capacity(num_powers);
    let mut current = challenge;
    for _ in 0..num_powers {
        pows.push(current);
        current.square_in_place();
    }
    pows
}

/// `β*_i = β_i + α δ_i`
pub fn update_gate_challenges<F: PrimeField>(
    perturbator_challenge: F,
    gate_challenges: &[F],
    deltas: &[F],
) -> Vec<F> {
    assert_eq!(gate_challenges.len(), deltas.len());
    gate_challenges
        .iter()
        .zip(deltas)
        .map(|(beta, delta)| *beta + perturbator_challenge * delta)
        .collect()
}

/// Values `f_i` of the batched relation of `key` at every row of the circuit.
/// Rows past the allocated memory are zero rows, on which every subrelation
/// vanishes.
pub fn compute_row_evaluations<F: PrimeField>(key: &ProvingKey<F>) -> Vec<F> {
    let allocated = key.polynomials.size();
    let mut evaluations: Vec<F> = (0..allocated)
        .into_par_iter()
        .map(|row| {
            let subrelations =
                evaluate_subrelations(&key.polynomials.row(row), &key.relation_parameters);
            batch_over_subrelations(&subrelations, &key.alphas)
        })
        .collect();
    evaluations.resize(key.circuit_size, F::zero());
    evaluations
}

/// Builds the coefficients of `Σ_i f_i ∏_{bit k of i} (β_k + X δ_k)` level by
/// level: the nodes `2p` and `2p + 1` of a level are merged into
/// `left + (β_k + X δ_k) right`, each level adding one to the degree.
pub fn construct_perturbator_coefficients<F: PrimeField>(
    betas: &[F],
    deltas: &[F],
    full_honk_evaluations: Vec<F>,
) -> Vec<F> {
    assert_eq!(betas.len(), deltas.len());
    assert_eq!(full_honk_evaluations.len(), 1 << betas.len());

    let mut level: Vec<Vec<F>> = full_honk_evaluations
        .into_iter()
        .map(|f| vec![f])
        .collect();
    for (beta, delta) in betas.iter().zip(deltas) {
        level = level
            .par_chunks(2)
            .map(|pair| {
                let (left, right) = (&pair[0], &pair[1]);
                let mut node = Vec::with_capacity(left.len() + 1);
                node.extend_from_slice(left);
                node.push(F::zero());
                for (j, r) in right.iter().enumerate() {
                    node[j] += *beta * r;
                    node[j + 1] += *delta * r;
                }
                node
            })
            .collect();
    }
    level.pop().unwrap_or_default()
}

/// The perturbator of an accumulator, of degree at most [CONST_PG_LOG_N].
pub fn compute_perturbator<F: PrimeField>(
    accumulator: &ProvingKey<F>,
    deltas: &[F],
) -> DensePolynomial<F> {
    let log_n = accumulator.log_circuit_size;
    let full_honk_evaluations = compute_row_evaluations(accumulator);
    let mut coefficients = construct_perturbator_coefficients(
        &accumulator.gate_challenges[..log_n],
        &deltas[..log_n],
        full_honk_evaluations,
    );
    coefficients.resize(CONST_PG_LOG_N + 1, F::zero());
    DensePolynomial::from_coefficients_vec(coefficients)
}

/// For each relation separator, the univariate of degree `NUM - 1` taking
/// the separator of key `j` at `j`, given by its values on `length` points.
pub fn compute_and_extend_alphas<F: PrimeField>(
    keys: &[ProvingKey<F>],
    length: usize,
) -> Vec<Univariate<F>> {
    (0..NUM_ALPHAS)
        .into_par_iter()
        .map(|idx| Univariate::new(keys.iter().map(|key| key.alphas[idx]).collect()).extend_to(length))
        .collect()
}

/// Relation parameters interpolated across keys, given by their values on
/// `length` points.
pub fn compute_extended_relation_parameters<F: PrimeField>(
    keys: &[ProvingKey<F>],
    length: usize,
) -> RelationParameters<Univariate<F>> {
    let extend = |idx: usize| {
        Univariate::new(
            keys.iter()
                .map(|key| *key.relation_parameters.get_to_fold()[idx])
                .collect(),
        )
        .extend_to(length)
    };
    RelationParameters::from_to_fold([extend(0), extend(1), extend(2), extend(3)])
}

/// `Σ_j lagranges[j] rows[j]`, column by column
fn interpolate_row<F: PrimeField>(rows: &[RowEvaluations<F>], lagranges: &[F]) -> RowEvaluations<F> {
    let mut interpolated = RowEvaluations::zero();
    for (row, l) in rows.iter().zip(lagranges) {
        for col in 0..NUMBER_OF_COLUMNS {
            interpolated.curr[col] += row.curr[col] * l;
            interpolated.next[col] += row.next[col] * l;
        }
    }
    interpolated
}

/// Values of the combiner on `{0, ..., length - 1}`.
///
/// The keys must share the same virtual size, `gate_separators` covering
/// every row of it.
pub fn compute_combiner<F: PrimeField>(
    keys: &[ProvingKey<F>],
    gate_separators: &GateSeparatorPolynomial<F>,
    relation_parameters: &RelationParameters<Univariate<F>>,
    alphas: &[Univariate<F>],
    length: usize,
) -> Univariate<F> {
    let num_keys = keys.len();
    assert!(keys
        .iter()
        .map(|key| key.polynomials.virtual_size())
        .all_equal());

    // Past the largest allocation every key has zero rows only.
    let allocated = keys
        .iter()
        .map(|key| key.polynomials.size())
        .max()
        .unwrap_or(0);

    let lagranges: Vec<Vec<F>> = (0..length)
        .map(|x| lagrange_basis_at(0, num_keys, F::from(x as u64)))
        .collect();
    let parameters: Vec<RelationParameters<F>> = (0..length)
        .map(|x| {
            RelationParameters::from_to_fold(
                relation_parameters.get_to_fold().map(|u| u.value_at(x)),
            )
        })
        .collect();
    let separators: Vec<Vec<F>> = (0..length)
        .map(|x| alphas.iter().map(|alpha| alpha.value_at(x)).collect())
        .collect();

    let evaluations = (0..allocated)
        .into_par_iter()
        .fold(
            || vec![F::zero(); length],
            |mut acc, row| {
                let rows: Vec<RowEvaluations<F>> =
                    keys.iter().map(|key| key.polynomials.row(row)).collect();
                let pow = gate_separators.at(row);
                for (x, acc_x) in acc.iter_mut().enumerate() {
                    let extended = interpolate_row(&rows, &lagranges[x]);
                    let subrelations = evaluate_subrelations(&extended, &parameters[x]);
                    *acc_x += pow * batch_over_subrelations(&subrelations, &separators[x]);
                }
                acc
            },
        )
        .reduce(
            || vec![F::zero(); length],
            |mut a, b| {
                a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                a
            },
        );
    Univariate::new(evaluations)
}

/// `Z(x) = ∏_{j < num_keys} (x - j)`
fn vanishing_at<F: PrimeField>(x: F, num_keys: usize) -> F {
    (0..num_keys).map(|j| x - F::from(j as u64)).product()
}

/// Values on `{num_keys, ..., combiner.len() - 1}` of the quotient
/// `K(X) = (G(X) - e L_0(X)) / Z(X)`.
///
/// The division is exact only if `G(0) = e` and `G(j) = 0` for the other
/// points of the domain; otherwise the keys do not satisfy their relations
/// and no quotient is returned.
pub fn compute_combiner_quotient<F: PrimeField>(
    perturbator_evaluation: F,
    combiner: &Univariate<F>,
    num_keys: usize,
) -> Result<Univariate<F>, ProverError> {
    for point in 0..num_keys {
        let expected = if point == 0 {
            perturbator_evaluation
        } else {
            F::zero()
        };
        if combiner.value_at(point) != expected {
            return Err(ProverError::CombinerQuotientNotExact { point });
        }
    }

    let points = num_keys..combiner.len();
    let mut inverse_vanishing: Vec<F> = points
        .clone()
        .map(|point| vanishing_at(F::from(point as u64), num_keys))
        .collect();
    batch_inversion(&mut inverse_vanishing);

    let quotient = points
        .zip(inverse_vanishing)
        .map(|(point, inverse)| {
            let lagrange_0 = lagrange_basis_at(0, num_keys, F::from(point as u64))[0];
            (combiner.value_at(point) - perturbator_evaluation * lagrange_0) * inverse
        })
        .collect();
    Ok(Univariate::with_domain_start(quotient, num_keys))
}

/// `Z(challenge)` and `[L_0(challenge), ..., L_{num_keys - 1}(challenge)]`
/// for the domain `{0, ..., num_keys - 1}`.
pub fn compute_vanishing_polynomial_and_lagranges<F: PrimeField>(
    challenge: F,
    num_keys: usize,
) -> (F, Vec<F>) {
    (
        vanishing_at(challenge, num_keys),
        lagrange_basis_at(0, num_keys, challenge),
    )
}

/// `Σ_i pow_β(i) f_i` for the gate challenges of `key`: the target sum an
/// honest key satisfies.
pub fn compute_full_relation_sum<F: PrimeField>(key: &ProvingKey<F>) -> F {
    let pow = GateSeparatorPolynomial::new(&key.gate_challenges, key.log_circuit_size);
    compute_row_evaluations(key)
        .into_par_iter()
        .enumerate()
        .map(|(row, f)| pow.at(row) * f)
        .sum()
}
