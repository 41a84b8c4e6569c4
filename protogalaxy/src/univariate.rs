//! Univariate polynomials in evaluation form over consecutive integer points.
//!
//! The folding domain is `{0, 1, ..., NUM - 1}`: key `j` of the folded list
//! lives at point `j`. Everything that is interpolated across keys (the rows
//! of the arithmetization, the relation separators, the relation parameters)
//! is represented by its values on that domain and then extended to more
//! points so that products of such polynomials can be computed pointwise.

use ark_ff::{batch_inversion, PrimeField};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Univariate<F> {
    evaluations: Vec<F>,
    domain_start: usize,
}

/// Returns the values `L_j(x)` of the Lagrange basis of the domain
/// `{domain_start, ..., domain_start + domain_size - 1}`.
///
/// When `x` is one of the domain points the result is the corresponding unit
/// vector.
pub fn lagrange_basis_at<F: PrimeField>(domain_start: usize, domain_size: usize, x: F) -> Vec<F> {
    assert!(domain_size > 0);
    let points: Vec<F> = (0..domain_size)
        .map(|j| F::from((domain_start + j) as u64))
        .collect();

    if let Some(j) = points.iter().position(|p| *p == x) {
        let mut unit = vec![F::zero(); domain_size];
        unit[j] = F::one();
        return unit;
    }

    // L_j(x) = prod_{m != j} (x - x_m) / (x_j - x_m)
    //        = Z(x) / ((x - x_j) * w_j)
    let mut denominators: Vec<F> = points
        .iter()
        .enumerate()
        .map(|(j, x_j)| {
            let w_j: F = points
                .iter()
                .enumerate()
                .filter(|(m, _)| *m != j)
                .map(|(_, x_m)| *x_j - x_m)
                .product();
            (x - x_j) * w_j
        })
        .collect();
    batch_inversion(&mut denominators);

    let vanishing: F = points.iter().map(|x_m| x - x_m).product();
    denominators.into_iter().map(|d| vanishing * d).collect()
}

impl<F: PrimeField> Univariate<F> {
    /// Polynomial given by its values at `0, 1, ..., evaluations.len() - 1`.
    pub fn new(evaluations: Vec<F>) -> Self {
        Self::with_domain_start(evaluations, 0)
    }

    /// Polynomial given by its values at `domain_start, domain_start + 1, ...`.
    pub fn with_domain_start(evaluations: Vec<F>, domain_start: usize) -> Self {
        assert!(!evaluations.is_empty());
        Self {
            evaluations,
            domain_start,
        }
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    pub fn domain_start(&self) -> usize {
        self.domain_start
    }

    /// One past the last point of the domain
    pub fn domain_end(&self) -> usize {
        self.domain_start + self.evaluations.len()
    }

    pub fn evaluations(&self) -> &[F] {
        &self.evaluations
    }

    /// Value at the domain point `point`.
    pub fn value_at(&self, point: usize) -> F {
        assert!(
            (self.domain_start..self.domain_end()).contains(&point),
            "point {point} outside of the domain [{}, {})",
            self.domain_start,
            self.domain_end()
        );
        self.evaluations[point - self.domain_start]
    }

    /// Extends the evaluations to `length` consecutive points, assuming the
    /// degree of the polynomial is smaller than the current number of points.
    pub fn extend_to(&self, length: usize) -> Self {
        let size = self.len();
        assert!(length >= size, "cannot shrink a univariate to extend it");
        let mut evaluations = self.evaluations.clone();
        evaluations.extend((self.domain_end()..self.domain_start + length).map(|point| {
            lagrange_basis_at(self.domain_start, size, F::from(point as u64))
                .into_iter()
                .zip(self.evaluations.iter())
                .map(|(l, v)| l * v)
                .sum::<F>()
        }));
        Self {
            evaluations,
            domain_start: self.domain_start,
        }
    }

    /// Evaluation at an arbitrary field element, by Lagrange interpolation over
    /// the domain.
    pub fn evaluate(&self, x: F) -> F {
        lagrange_basis_at(self.domain_start, self.len(), x)
            .into_iter()
            .zip(self.evaluations.iter())
            .map(|(l, v)| l * v)
            .sum()
    }
}
