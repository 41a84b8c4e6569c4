//! The relations satisfied row-wise by an honest proving key.
//!
//! A relation is a small set of subrelations, polynomial identities in the
//! values of the columns at a row and in the relation parameters. The whole
//! arithmetization is the concatenation of the subrelations of
//! [ArithmeticRelation], [RecordRelation] and [PermutationRelation].
//!
//! Folding interpolates both the columns and the relation parameters across
//! keys, so the degree that matters for the combiner is the total degree in
//! both (see [MAX_RELATION_DEGREE]).

use crate::columns::{Column, CurrOrNext, RowEvaluations};
use ark_ff::Field;

/// Relation parameters: the challenges derived by Oink that the relations
/// depend on. `T` is a field element for a single key, or a univariate when
/// the parameters of several keys are interpolated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationParameters<T> {
    pub eta: T,
    pub eta_two: T,
    pub beta: T,
    pub gamma: T,
}

pub const NUMBER_OF_PARAMETERS_TO_FOLD: usize = 4;

impl<T> RelationParameters<T> {
    pub fn get_to_fold(&self) -> [&T; NUMBER_OF_PARAMETERS_TO_FOLD] {
        [&self.eta, &self.eta_two, &self.beta, &self.gamma]
    }

    pub fn from_to_fold([eta, eta_two, beta, gamma]: [T; NUMBER_OF_PARAMETERS_TO_FOLD]) -> Self {
        Self {
            eta,
            eta_two,
            beta,
            gamma,
        }
    }
}

pub trait Relation {
    const NUM_SUBRELATIONS: usize;

    /// Total degree of the subrelations, counting the relation parameters
    const DEGREE: usize;

    /// Writes the value of every subrelation at `row` in `evals`, of length
    /// [Self::NUM_SUBRELATIONS].
    fn accumulate<F: Field>(evals: &mut [F], row: &RowEvaluations<F>, params: &RelationParameters<F>);
}

/// `q_m w_l w_r + q_l w_l + q_r w_r + q_o w_o + q_c = 0`
pub struct ArithmeticRelation;

impl Relation for ArithmeticRelation {
    const NUM_SUBRELATIONS: usize = 1;
    const DEGREE: usize = 3;

    fn accumulate<F: Field>(evals: &mut [F], row: &RowEvaluations<F>, _params: &RelationParameters<F>) {
        use Column::*;
        evals[0] = row[QM] * row[WL] * row[WR]
            + row[QL] * row[WL]
            + row[QR] * row[WR]
            + row[QO] * row[WO]
            + row[QC];
    }
}

/// `w_4` is the compression `w_l + η w_r + η₂ w_o` of the three wires.
pub struct RecordRelation;

impl Relation for RecordRelation {
    const NUM_SUBRELATIONS: usize = 1;
    const DEGREE: usize = 2;

    fn accumulate<F: Field>(evals: &mut [F], row: &RowEvaluations<F>, params: &RelationParameters<F>) {
        use Column::*;
        evals[0] = row[W4] - (row[WL] + params.eta * row[WR] + params.eta_two * row[WO]);
    }
}

/// Grand product argument for the copy constraints.
///
/// With the convention `z_perm[0] = 0`, the running product is
/// `z_perm + L_first` at the current row and `z_perm_shift + L_last` at the
/// next one, the last row closing the product to `1`.
pub struct PermutationRelation;

impl Relation for PermutationRelation {
    const NUM_SUBRELATIONS: usize = 2;
    const DEGREE: usize = 7;

    fn accumulate<F: Field>(evals: &mut [F], row: &RowEvaluations<F>, params: &RelationParameters<F>) {
        use Column::*;
        let numerator: F = Column::wires()
            .into_iter()
            .zip(Column::ids())
            .map(|(w, id)| row[w] + params.beta * row[id] + params.gamma)
            .product();
        let denominator: F = Column::wires()
            .into_iter()
            .zip(Column::sigmas())
            .map(|(w, sigma)| row[w] + params.beta * row[sigma] + params.gamma)
            .product();
        let z_perm_shift = row[(ZPerm, CurrOrNext::Next)];

        evals[0] = (row[ZPerm] + row[LagrangeFirst]) * numerator
            - (z_perm_shift + row[LagrangeLast]) * denominator;
        evals[1] = row[LagrangeLast] * z_perm_shift;
    }
}

pub const NUM_SUBRELATIONS: usize = ArithmeticRelation::NUM_SUBRELATIONS
    + RecordRelation::NUM_SUBRELATIONS
    + PermutationRelation::NUM_SUBRELATIONS;

/// Number of relation separators of a key: the first subrelation is not
/// scaled.
pub const NUM_ALPHAS: usize = NUM_SUBRELATIONS - 1;

pub const MAX_RELATION_DEGREE: usize = max(
    ArithmeticRelation::DEGREE,
    max(RecordRelation::DEGREE, PermutationRelation::DEGREE),
);

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

/// Values of all the subrelations at one row
pub fn evaluate_subrelations<F: Field>(
    row: &RowEvaluations<F>,
    params: &RelationParameters<F>,
) -> [F; NUM_SUBRELATIONS] {
    let mut evals = [F::zero(); NUM_SUBRELATIONS];
    let (arithmetic, rest) = evals.split_at_mut(ArithmeticRelation::NUM_SUBRELATIONS);
    let (record, permutation) = rest.split_at_mut(RecordRelation::NUM_SUBRELATIONS);
    ArithmeticRelation::accumulate(arithmetic, row, params);
    RecordRelation::accumulate(record, row, params);
    PermutationRelation::accumulate(permutation, row, params);
    evals
}

/// `s_0 + Σ_{k ≥ 1} α_{k-1} s_k`
pub fn batch_over_subrelations<F: Field>(evals: &[F; NUM_SUBRELATIONS], alphas: &[F]) -> F {
    debug_assert_eq!(alphas.len(), NUM_ALPHAS);
    evals[0]
        + evals[1..]
            .iter()
            .zip(alphas)
            .map(|(s, alpha)| *s * alpha)
            .sum::<F>()
}
