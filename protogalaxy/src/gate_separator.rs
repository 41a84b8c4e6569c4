//! The gate separator `pow_β(i) = ∏_{k : bit k of i is set} β_k`, used to
//! take a random linear combination of the relation over the rows of the
//! circuit.

use ark_ff::Field;

#[derive(Clone, Debug)]
pub struct GateSeparatorPolynomial<F> {
    /// `beta_products[i] = pow_β(i)` for every row `i < 2^log_num_monomials`
    pub beta_products: Vec<F>,
}

impl<F: Field> GateSeparatorPolynomial<F> {
    pub fn new(betas: &[F], log_num_monomials: usize) -> Self {
        assert!(
            log_num_monomials <= betas.len(),
            "{log_num_monomials} bits requested with only {} challenges",
            betas.len()
        );
        Self {
            beta_products: compute_beta_products(&betas[..log_num_monomials]),
        }
    }

    pub fn at(&self, row: usize) -> F {
        self.beta_products[row]
    }
}

/// Successive doubling: after processing `β_k`, the upper half of the table
/// is the lower half times `β_k`.
fn compute_beta_products<F: Field>(betas: &[F]) -> Vec<F> {
    let mut products = Vec::with_capacity(1 << betas.len());
    products.push(F::one());
    for beta in betas {
        let extension: Vec<F> = products.iter().map(|p| *p * beta).collect();
        products.extend(extension);
    }
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    #[test]
    fn test_beta_products() {
        let betas = [Fr::from(2u64), Fr::from(3u64), Fr::from(5u64)];
        let pow = GateSeparatorPolynomial::new(&betas, 3);
        let expected: Vec<Fr> = [1u64, 2, 3, 6, 5, 10, 15, 30]
            .into_iter()
            .map(Fr::from)
            .collect();
        assert_eq!(pow.beta_products, expected);
        assert_eq!(pow.at(6), Fr::from(15u64));
    }

    #[test]
    fn test_unused_betas_are_ignored() {
        let betas = [Fr::from(2u64), Fr::from(3u64), Fr::from(5u64)];
        let pow = GateSeparatorPolynomial::new(&betas, 1);
        assert_eq!(pow.beta_products, vec![Fr::from(1u64), Fr::from(2u64)]);
    }
}
