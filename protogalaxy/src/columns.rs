//! Columns of the arithmetization.
//!
//! Every column is stored once per key as a [Polynomial]. Some columns are
//! also read at the next row (`z_perm` in the grand product relation); the
//! shifted polynomial is never stored, it is read from the unshifted one.

use crate::polynomial::Polynomial;
use ark_ff::Field;
use core::ops::{Index, IndexMut};
use rayon::prelude::*;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCountMacro, EnumIter)]
pub enum Column {
    // Gate selectors
    QM,
    QL,
    QR,
    QO,
    QC,
    // Permutation
    Sigma1,
    Sigma2,
    Sigma3,
    Id1,
    Id2,
    Id3,
    LagrangeFirst,
    LagrangeLast,
    // Witness
    WL,
    WR,
    WO,
    W4,
    ZPerm,
}

pub const NUMBER_OF_COLUMNS: usize = Column::COUNT;

/// Columns read at the next row by the relations
pub const SHIFTED_COLUMNS: [Column; 1] = [Column::ZPerm];

/// Whether a value is read at the current row or at the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrOrNext {
    Curr,
    Next,
}

impl CurrOrNext {
    pub fn shift(&self) -> usize {
        match self {
            CurrOrNext::Curr => 0,
            CurrOrNext::Next => 1,
        }
    }
}

impl Column {
    /// The wires of the arithmetic gate, in permutation order
    pub fn wires() -> [Column; 3] {
        [Column::WL, Column::WR, Column::WO]
    }

    pub fn sigmas() -> [Column; 3] {
        [Column::Sigma1, Column::Sigma2, Column::Sigma3]
    }

    pub fn ids() -> [Column; 3] {
        [Column::Id1, Column::Id2, Column::Id3]
    }
}

/// Values of every column at a single row (and at the next row for the
/// shifted columns).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowEvaluations<F> {
    pub curr: [F; NUMBER_OF_COLUMNS],
    pub next: [F; NUMBER_OF_COLUMNS],
}

impl<F: Field> RowEvaluations<F> {
    pub fn zero() -> Self {
        Self {
            curr: [F::zero(); NUMBER_OF_COLUMNS],
            next: [F::zero(); NUMBER_OF_COLUMNS],
        }
    }
}

impl<F> Index<(Column, CurrOrNext)> for RowEvaluations<F> {
    type Output = F;

    fn index(&self, (col, curr_or_next): (Column, CurrOrNext)) -> &F {
        match curr_or_next {
            CurrOrNext::Curr => &self.curr[col as usize],
            CurrOrNext::Next => &self.next[col as usize],
        }
    }
}

impl<F> Index<Column> for RowEvaluations<F> {
    type Output = F;

    fn index(&self, col: Column) -> &F {
        &self.curr[col as usize]
    }
}

/// The polynomials of a proving key, one per [Column].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProverPolynomials<F> {
    polynomials: Vec<Polynomial<F>>,
}

impl<F: Field> ProverPolynomials<F> {
    /// Every column allocated with `size` zero rows.
    pub fn new(size: usize, virtual_size: usize) -> Self {
        Self {
            polynomials: Column::iter()
                .map(|_| Polynomial::new(size, virtual_size))
                .collect(),
        }
    }

    /// Polynomials of the columns that are committed to and folded, in
    /// [Column] order.
    pub fn get_unshifted(&self) -> &[Polynomial<F>] {
        &self.polynomials
    }

    pub fn get_unshifted_mut(&mut self) -> &mut [Polynomial<F>] {
        &mut self.polynomials
    }

    /// Number of allocated rows, identical for every column.
    pub fn size(&self) -> usize {
        self[Column::WL].size()
    }

    pub fn virtual_size(&self) -> usize {
        self[Column::WL].virtual_size()
    }

    pub fn increase_virtual_size(&mut self, virtual_size: usize) {
        self.polynomials
            .par_iter_mut()
            .for_each(|p| p.increase_virtual_size(virtual_size));
    }

    pub fn row(&self, row: usize) -> RowEvaluations<F> {
        let mut evals = RowEvaluations::zero();
        for col in Column::iter() {
            evals.curr[col as usize] = self[col].get(row);
        }
        for col in SHIFTED_COLUMNS {
            evals.next[col as usize] = self[col].get(row + CurrOrNext::Next.shift());
        }
        evals
    }
}

impl<F> Index<Column> for ProverPolynomials<F> {
    type Output = Polynomial<F>;

    fn index(&self, col: Column) -> &Polynomial<F> {
        &self.polynomials[col as usize]
    }
}

impl<F> IndexMut<Column> for ProverPolynomials<F> {
    fn index_mut(&mut self, col: Column) -> &mut Polynomial<F> {
        &mut self.polynomials[col as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    #[test]
    fn test_row_reads_the_shifted_columns_at_the_next_row() {
        let mut polynomials = ProverPolynomials::<Fr>::new(3, 4);
        polynomials[Column::ZPerm]
            .evals_mut()
            .copy_from_slice(&[1u64, 2, 3].map(Fr::from));
        polynomials[Column::WL].evals_mut()[1] = Fr::from(7u64);

        let row = polynomials.row(1);
        assert_eq!(row[Column::WL], Fr::from(7u64));
        assert_eq!(row[Column::ZPerm], Fr::from(2u64));
        assert_eq!(row[(Column::ZPerm, CurrOrNext::Next)], Fr::from(3u64));
        // Only the shifted columns are read at the next row
        assert_eq!(row[(Column::WL, CurrOrNext::Next)], Fr::from(0u64));

        assert_eq!(polynomials.row(2)[(Column::ZPerm, CurrOrNext::Next)], Fr::from(0u64));
    }

    #[test]
    fn test_increase_virtual_size() {
        let mut polynomials = ProverPolynomials::<Fr>::new(3, 4);
        polynomials.increase_virtual_size(16);
        assert_eq!(polynomials.size(), 3);
        assert!(polynomials
            .get_unshifted()
            .iter()
            .all(|p| p.virtual_size() == 16));
    }
}
