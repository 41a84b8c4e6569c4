//! Proving keys: the polynomials of a circuit together with the data the
//! folding prover accumulates into them.

use crate::{
    columns::{Column, ProverPolynomials},
    error::ProverError,
    relations::{RelationParameters, NUM_ALPHAS},
    CONST_PG_LOG_N,
};
use ark_ff::PrimeField;
use std::collections::BTreeMap;

/// A gate `q_m a b + q_l a + q_r b + q_o c + q_c = 0` over the variables
/// `a = variables[w_l]`, `b = variables[w_r]` and `c = variables[w_o]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArithmeticGate<F> {
    pub w_l: u32,
    pub w_r: u32,
    pub w_o: u32,
    pub q_m: F,
    pub q_l: F,
    pub q_r: F,
    pub q_o: F,
    pub q_c: F,
}

/// A list of gates over a table of variables. Wires sharing a variable are
/// constrained to be equal by the permutation argument.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionTrace<F> {
    pub variables: Vec<F>,
    pub gates: Vec<ArithmeticGate<F>>,
}

impl<F: PrimeField> ExecutionTrace<F> {
    pub fn new() -> Self {
        Self {
            variables: vec![],
            gates: vec![],
        }
    }

    pub fn add_variable(&mut self, value: F) -> u32 {
        self.variables.push(value);
        (self.variables.len() - 1) as u32
    }

    pub fn create_gate(&mut self, gate: ArithmeticGate<F>) {
        self.gates.push(gate);
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }
}

/// Layout of the trace in memory.
///
/// Every key reserves `structured_rows` rows whatever its number of gates.
/// The gates that do not fit overflow the structured region and make the
/// allocation larger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceSettings {
    pub structured_rows: usize,
}

/// Minimal number of allocated rows: the grand product needs distinct first
/// and last rows.
const MIN_ALLOCATED_ROWS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvingKey<F> {
    pub circuit_size: usize,
    pub log_circuit_size: usize,
    pub polynomials: ProverPolynomials<F>,
    pub is_accumulator: bool,
    pub target_sum: F,
    /// Always of length [CONST_PG_LOG_N]
    pub gate_challenges: Vec<F>,
    /// Number of rows allocated past the structured region of the trace
    pub overflow_size: usize,
    pub alphas: Vec<F>,
    pub relation_parameters: RelationParameters<F>,
}

impl<F: PrimeField> ProvingKey<F> {
    pub fn new(trace: &ExecutionTrace<F>, settings: &TraceSettings) -> Result<Self, ProverError> {
        let num_gates = trace.num_gates();
        if num_gates == 0 {
            return Err(ProverError::EmptyTrace);
        }
        let allocated = num_gates
            .max(settings.structured_rows)
            .max(MIN_ALLOCATED_ROWS);
        let circuit_size = allocated.next_power_of_two();
        let log_circuit_size = circuit_size.trailing_zeros() as usize;
        if log_circuit_size > CONST_PG_LOG_N {
            return Err(ProverError::CircuitTooLarge {
                log_size: log_circuit_size,
                max: CONST_PG_LOG_N,
            });
        }

        let mut polynomials = ProverPolynomials::new(allocated, circuit_size);
        let mut copy_cycles: BTreeMap<u32, Vec<(usize, usize)>> = BTreeMap::new();
        for (row, gate) in trace.gates.iter().enumerate() {
            polynomials[Column::QM].evals_mut()[row] = gate.q_m;
            polynomials[Column::QL].evals_mut()[row] = gate.q_l;
            polynomials[Column::QR].evals_mut()[row] = gate.q_r;
            polynomials[Column::QO].evals_mut()[row] = gate.q_o;
            polynomials[Column::QC].evals_mut()[row] = gate.q_c;
            for (wire_index, (wire, variable)) in Column::wires()
                .into_iter()
                .zip([gate.w_l, gate.w_r, gate.w_o])
                .enumerate()
            {
                let value = trace
                    .variables
                    .get(variable as usize)
                    .ok_or(ProverError::UnknownVariable { row, variable })?;
                polynomials[wire].evals_mut()[row] = *value;
                copy_cycles
                    .entry(variable)
                    .or_default()
                    .push((wire_index, row));
            }
        }

        // Identity permutation on every allocated row, then each cycle of
        // wires sharing a variable is rotated by one position.
        let id_of = |wire_index: usize, row: usize| F::from((wire_index * allocated + row) as u64);
        for (wire_index, (id, sigma)) in Column::ids()
            .into_iter()
            .zip(Column::sigmas())
            .enumerate()
        {
            let ids: Vec<F> = (0..allocated).map(|row| id_of(wire_index, row)).collect();
            polynomials[sigma].evals_mut().copy_from_slice(&ids);
            polynomials[id].evals_mut().copy_from_slice(&ids);
        }
        for cycle in copy_cycles.values() {
            for (position, (wire_index, row)) in cycle.iter().enumerate() {
                let (next_wire, next_row) = cycle[(position + 1) % cycle.len()];
                polynomials[Column::sigmas()[*wire_index]].evals_mut()[*row] =
                    id_of(next_wire, next_row);
            }
        }

        polynomials[Column::LagrangeFirst].evals_mut()[0] = F::one();
        polynomials[Column::LagrangeLast].evals_mut()[allocated - 1] = F::one();

        Ok(Self {
            circuit_size,
            log_circuit_size,
            polynomials,
            is_accumulator: false,
            target_sum: F::zero(),
            gate_challenges: vec![F::zero(); CONST_PG_LOG_N],
            overflow_size: num_gates.saturating_sub(settings.structured_rows),
            alphas: vec![F::zero(); NUM_ALPHAS],
            relation_parameters: RelationParameters::default(),
        })
    }
}
