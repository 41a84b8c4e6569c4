//! Random satisfiable traces, for tests, benchmarks and the binary.

use crate::proving_key::{ArithmeticGate, ExecutionTrace};
use ark_ff::PrimeField;
use ark_std::UniformRand;
use rand::Rng;

pub struct MockCircuits;

impl MockCircuits {
    /// A trace of `num_gates` gates, alternating multiplications and
    /// additions. The inputs of a gate are taken among the variables already
    /// defined, so most variables are shared by several wires.
    pub fn construct_arithmetic_trace<F: PrimeField, R: Rng>(
        rng: &mut R,
        num_gates: usize,
    ) -> ExecutionTrace<F> {
        let mut trace = ExecutionTrace::new();
        let seed_a = trace.add_variable(F::rand(rng));
        let seed_b = trace.add_variable(F::rand(rng));
        let mut defined = vec![seed_a, seed_b];

        for i in 0..num_gates {
            let a = defined[rng.gen_range(0..defined.len())];
            let b = defined[rng.gen_range(0..defined.len())];
            let (value_a, value_b) = (
                trace.variables[a as usize],
                trace.variables[b as usize],
            );
            let gate = if i % 2 == 0 {
                let c = trace.add_variable(value_a * value_b);
                ArithmeticGate {
                    w_l: a,
                    w_r: b,
                    w_o: c,
                    q_m: F::one(),
                    q_l: F::zero(),
                    q_r: F::zero(),
                    q_o: -F::one(),
                    q_c: F::zero(),
                }
            } else {
                // q_l a + q_r b + q_c = c with random selectors
                let (q_l, q_r, q_c) = (F::rand(rng), F::rand(rng), F::rand(rng));
                let c = trace.add_variable(q_l * value_a + q_r * value_b + q_c);
                ArithmeticGate {
                    w_l: a,
                    w_r: b,
                    w_o: c,
                    q_m: F::zero(),
                    q_l,
                    q_r,
                    q_o: -F::one(),
                    q_c,
                }
            };
            defined.push(gate.w_o);
            trace.create_gate(gate);
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::make_test_rng;
    use ark_bn254::Fr;
    use ark_ff::Zero;

    #[test]
    fn test_gates_are_satisfied() {
        let mut rng = make_test_rng(None);
        let trace = MockCircuits::construct_arithmetic_trace::<Fr, _>(&mut rng, 20);
        assert_eq!(trace.num_gates(), 20);
        for gate in &trace.gates {
            let [a, b, c] = [gate.w_l, gate.w_r, gate.w_o].map(|w| trace.variables[w as usize]);
            let value = gate.q_m * a * b + gate.q_l * a + gate.q_r * b + gate.q_o * c + gate.q_c;
            assert!(value.is_zero());
        }
    }
}
