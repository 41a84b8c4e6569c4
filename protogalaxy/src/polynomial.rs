//! Polynomials over the rows of a circuit, stored by their values on the
//! boolean hypercube.
//!
//! A [Polynomial] only allocates the rows the trace actually uses. Its
//! `virtual_size` can be larger: every row past the backing vector is an
//! implicit zero. This is what allows two keys with different circuit sizes
//! to be folded pointwise without reallocating the smaller one.

use ark_ff::Field;
use rayon::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial<F> {
    evals: Vec<F>,
    virtual_size: usize,
}

impl<F: Field> Polynomial<F> {
    /// Allocates `size` zero rows, virtually extended to `virtual_size`.
    pub fn new(size: usize, virtual_size: usize) -> Self {
        assert!(
            size <= virtual_size,
            "cannot back {size} rows with a virtual size of {virtual_size}"
        );
        Self {
            evals: vec![F::zero(); size],
            virtual_size,
        }
    }

    /// Number of allocated rows
    pub fn size(&self) -> usize {
        self.evals.len()
    }

    pub fn virtual_size(&self) -> usize {
        self.virtual_size
    }

    pub fn evals(&self) -> &[F] {
        &self.evals
    }

    pub fn evals_mut(&mut self) -> &mut [F] {
        &mut self.evals
    }

    /// Value at `row`, zero outside of the backing memory.
    pub fn get(&self, row: usize) -> F {
        debug_assert!(row <= self.virtual_size);
        self.evals.get(row).copied().unwrap_or_else(F::zero)
    }

    /// Grows the virtual size. The backing memory and its content are left
    /// untouched.
    pub fn increase_virtual_size(&mut self, virtual_size: usize) {
        assert!(
            virtual_size >= self.virtual_size,
            "virtual size can only grow ({} -> {virtual_size})",
            self.virtual_size
        );
        self.virtual_size = virtual_size;
    }

    /// `self <- scalar * self`
    pub fn scale(&mut self, scalar: F) {
        self.evals.par_iter_mut().for_each(|x| *x *= scalar);
    }

    /// `self <- self + scalar * other`
    ///
    /// The backing memory of `other` must fit in the one of `self`.
    pub fn add_scaled(&mut self, other: &Self, scalar: F) {
        assert!(
            other.size() <= self.size(),
            "cannot accumulate {} allocated rows into {} allocated rows",
            other.size(),
            self.size()
        );
        self.evals
            .par_iter_mut()
            .zip(other.evals.par_iter())
            .for_each(|(x, y)| *x += scalar * y);
    }
}
