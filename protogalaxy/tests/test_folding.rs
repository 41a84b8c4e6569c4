use ark_bn254::Fr;
use ark_ff::{One, Zero};
use ark_poly::Polynomial as _;
use protogalaxy::{
    batched_extended_length,
    columns::Column,
    gate_separator::GateSeparatorPolynomial,
    mock_circuits::MockCircuits,
    normalize_circuit_sizes,
    prover_internal::{
        compute_combiner, compute_full_relation_sum, compute_vanishing_polynomial_and_lagranges,
    },
    transcript::ManifestEntry,
    Blake2bTranscript, ProtogalaxyProver, ProverError, ProvingKey, TraceSettings, Transcript,
    CONST_PG_LOG_N,
};
use rand::{rngs::StdRng, SeedableRng};

/// Size of a serialized scalar
const FR_BYTES: usize = 32;

/// Elements sent by Oink for each key
const OINK_ENTRIES: usize = 6;

fn fresh_key(rng: &mut StdRng, num_gates: usize) -> ProvingKey<Fr> {
    let trace = MockCircuits::construct_arithmetic_trace(rng, num_gates);
    ProvingKey::new(&trace, &TraceSettings::default()).unwrap()
}

#[test]
fn test_two_fresh_keys() {
    let mut rng = StdRng::seed_from_u64(0);
    let keys = [fresh_key(&mut rng, 8), fresh_key(&mut rng, 8)];
    let mut transcript = Blake2bTranscript::new();
    let result = ProtogalaxyProver::new(keys, &mut transcript)
        .prove()
        .unwrap();

    let quotient_entries = batched_extended_length(2) - 2;
    assert_eq!(quotient_entries, 7);
    assert!(result.accumulator.is_accumulator);
    assert_eq!(
        result.proof.len(),
        (2 * OINK_ENTRIES + CONST_PG_LOG_N + quotient_entries) * FR_BYTES
    );
    assert_eq!(
        compute_full_relation_sum(&result.accumulator),
        result.accumulator.target_sum
    );

    let sent = transcript.manifest().sent_labels();
    assert_eq!(sent.len(), 2 * OINK_ENTRIES + CONST_PG_LOG_N + quotient_entries);
    assert_eq!(sent[2 * OINK_ENTRIES], "perturbator_1");
    assert_eq!(sent[2 * OINK_ENTRIES + CONST_PG_LOG_N - 1], "perturbator_20");
    assert_eq!(sent.last(), Some(&"combiner_quotient_8"));
    assert_eq!(
        transcript.manifest().challenge_labels()[12..],
        ["delta", "perturbator_challenge", "combiner_quotient_challenge"]
    );
    // Everything was moved into the proof
    assert!(transcript.proof_data().is_empty());
}

#[test]
fn test_bootstrap_perturbator_is_zero() {
    let mut rng = StdRng::seed_from_u64(1);
    let keys = [fresh_key(&mut rng, 5), fresh_key(&mut rng, 7)];
    let mut transcript = Blake2bTranscript::new();
    let result = ProtogalaxyProver::new(keys, &mut transcript)
        .prove()
        .unwrap();

    let start = 2 * OINK_ENTRIES * FR_BYTES;
    let end = start + CONST_PG_LOG_N * FR_BYTES;
    assert!(result.proof[start..end].iter().all(|b| *b == 0));
    // The quotient is not zero
    assert!(result.proof[end..].iter().any(|b| *b != 0));

    let perturbator_entries = transcript
        .manifest()
        .rounds
        .iter()
        .flatten()
        .filter(|entry| {
            matches!(entry, ManifestEntry::Sent { label, num_bytes }
                if label.starts_with("perturbator_") && *num_bytes == FR_BYTES)
        })
        .count();
    assert_eq!(perturbator_entries, CONST_PG_LOG_N);
}

#[test]
fn test_target_sum_is_the_combiner_at_the_challenge() {
    let mut rng = StdRng::seed_from_u64(2);
    let keys = [fresh_key(&mut rng, 12), fresh_key(&mut rng, 12)];

    let mut transcript = Blake2bTranscript::new();
    let result = ProtogalaxyProver::new(keys.clone(), &mut transcript)
        .prove()
        .unwrap();

    // Replays the rounds up to the last challenge
    let mut replay = Blake2bTranscript::new();
    let mut prover = ProtogalaxyProver::new(keys, &mut replay);
    prover.run_oink_prover_on_each_incomplete_key().unwrap();
    let perturbator_output = prover.perturbator_round().unwrap();
    let output = prover
        .combiner_quotient_round(&perturbator_output.deltas, &perturbator_output.perturbator)
        .unwrap();
    let keys = prover.keys_to_fold().clone();
    let challenge = replay.get_challenge("combiner_quotient_challenge").unwrap();

    let (vanishing, lagranges) = compute_vanishing_polynomial_and_lagranges(challenge, 2);
    let reconstructed = output.perturbator_evaluation * lagranges[0]
        + vanishing * output.combiner_quotient.evaluate(challenge);
    assert_eq!(result.accumulator.target_sum, reconstructed);

    let length = batched_extended_length(2);
    let gate_separators = GateSeparatorPolynomial::new(&output.gate_challenges, 4);
    let combiner = compute_combiner(
        &keys,
        &gate_separators,
        &output.relation_parameters,
        &output.alphas,
        length,
    );
    assert_eq!(combiner.evaluate(challenge), reconstructed);
    assert_eq!(result.accumulator.gate_challenges, output.gate_challenges);
}

#[test]
fn test_chained_folds() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut transcript = Blake2bTranscript::new();
    let first = ProtogalaxyProver::new(
        [fresh_key(&mut rng, 10), fresh_key(&mut rng, 10)],
        &mut transcript,
    )
    .prove()
    .unwrap();
    let accumulator = first.accumulator;
    assert!(!accumulator.target_sum.is_zero());

    let mut prover = ProtogalaxyProver::new(
        [accumulator.clone(), fresh_key(&mut rng, 10)],
        &mut transcript,
    );
    prover.run_oink_prover_on_each_incomplete_key().unwrap();
    // The accumulator is not touched by Oink
    assert_eq!(prover.keys_to_fold()[0], accumulator);

    let perturbator_output = prover.perturbator_round().unwrap();
    assert_eq!(
        perturbator_output.perturbator.evaluate(&Fr::zero()),
        accumulator.target_sum
    );
    let output = prover
        .combiner_quotient_round(&perturbator_output.deltas, &perturbator_output.perturbator)
        .unwrap();
    let second = prover.update_target_sum_and_fold(output).unwrap();

    assert_eq!(
        compute_full_relation_sum(&second.accumulator),
        second.accumulator.target_sum
    );
    // The second fold only sends the Oink messages of the incoming key
    assert_eq!(
        second.proof.len(),
        (OINK_ENTRIES + CONST_PG_LOG_N + batched_extended_length(2) - 2) * FR_BYTES
    );
    let sent = transcript.manifest().sent_labels();
    assert!(sent.contains(&"1_Z_PERM"));
    assert_eq!(sent.iter().filter(|label| label.starts_with("0_")).count(), OINK_ENTRIES);
}

#[test]
fn test_larger_incoming_key_is_exchanged() {
    let mut rng = StdRng::seed_from_u64(4);
    let small = fresh_key(&mut rng, 3);
    let large = fresh_key(&mut rng, 13);
    assert!(large.overflow_size > small.overflow_size);

    let mut transcript = Blake2bTranscript::new();
    let result = ProtogalaxyProver::new([small.clone(), large.clone()], &mut transcript)
        .prove()
        .unwrap();

    // Folds the keys by hand, without exchanging them
    let mut keys = [small, large];
    normalize_circuit_sizes(&mut keys);
    let mut replay = Blake2bTranscript::new();
    let mut prover = ProtogalaxyProver::new(keys, &mut replay);
    prover.run_oink_prover_on_each_incomplete_key().unwrap();
    let perturbator_output = prover.perturbator_round().unwrap();
    let output = prover
        .combiner_quotient_round(&perturbator_output.deltas, &perturbator_output.perturbator)
        .unwrap();
    let [small, large] = prover.keys_to_fold().clone();
    let challenge = replay.get_challenge("combiner_quotient_challenge").unwrap();
    let (vanishing, lagranges) = compute_vanishing_polynomial_and_lagranges(challenge, 2);

    let accumulator = result.accumulator;
    assert_eq!(
        accumulator.target_sum,
        output.perturbator_evaluation * lagranges[0]
            + vanishing * output.combiner_quotient.evaluate(challenge)
    );
    assert_eq!(accumulator.circuit_size, 16);
    assert_eq!(accumulator.log_circuit_size, 4);
    assert_eq!(accumulator.polynomials.size(), 13);
    assert_eq!(accumulator.overflow_size, 13);
    for col in [Column::WL, Column::ZPerm, Column::Sigma2] {
        for row in 0..16 {
            assert_eq!(
                accumulator.polynomials[col].get(row),
                lagranges[0] * small.polynomials[col].get(row)
                    + lagranges[1] * large.polynomials[col].get(row),
                "column {col:?}, row {row}"
            );
        }
    }
    assert_eq!(compute_full_relation_sum(&accumulator), accumulator.target_sum);
}

#[test]
fn test_fold_after_exchange() {
    let mut rng = StdRng::seed_from_u64(10);
    let mut transcript = Blake2bTranscript::new();
    let first = ProtogalaxyProver::new(
        [fresh_key(&mut rng, 3), fresh_key(&mut rng, 13)],
        &mut transcript,
    )
    .prove()
    .unwrap();
    let accumulator = first.accumulator;
    assert_eq!(accumulator.polynomials.size(), 13);
    assert_eq!(accumulator.overflow_size, 13);
    assert_eq!(compute_full_relation_sum(&accumulator), accumulator.target_sum);

    // The incoming key overflows less than the storage of the accumulator
    let incoming = fresh_key(&mut rng, 10);
    assert!(incoming.overflow_size < accumulator.overflow_size);
    let second = ProtogalaxyProver::new([accumulator, incoming], &mut transcript)
        .prove()
        .unwrap();
    let accumulator = second.accumulator;
    assert_eq!(accumulator.polynomials.size(), 13);
    assert_eq!(accumulator.overflow_size, 13);
    assert_eq!(compute_full_relation_sum(&accumulator), accumulator.target_sum);
}

#[test]
#[should_panic(expected = "only supported when folding two keys")]
fn test_exchange_with_more_than_two_keys_panics() {
    let mut rng = StdRng::seed_from_u64(5);
    let keys = [
        fresh_key(&mut rng, 3),
        fresh_key(&mut rng, 13),
        fresh_key(&mut rng, 13),
    ];
    let mut transcript = Blake2bTranscript::new();
    let _ = ProtogalaxyProver::new(keys, &mut transcript).prove();
}

#[test]
fn test_fold_three_keys() {
    let mut rng = StdRng::seed_from_u64(6);
    let keys = [
        fresh_key(&mut rng, 6),
        fresh_key(&mut rng, 6),
        fresh_key(&mut rng, 6),
    ];
    let mut transcript = Blake2bTranscript::new();
    let result = ProtogalaxyProver::new(keys, &mut transcript)
        .prove()
        .unwrap();
    let quotient_entries = batched_extended_length(3) - 3;
    assert_eq!(
        result.proof.len(),
        (3 * OINK_ENTRIES + CONST_PG_LOG_N + quotient_entries) * FR_BYTES
    );
    assert_eq!(
        compute_full_relation_sum(&result.accumulator),
        result.accumulator.target_sum
    );
}

#[test]
fn test_folding_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let keys = [fresh_key(&mut rng, 9), fresh_key(&mut rng, 9)];

    let mut t1 = Blake2bTranscript::new();
    let mut t2 = Blake2bTranscript::new();
    let r1 = ProtogalaxyProver::new(keys.clone(), &mut t1).prove().unwrap();
    let r2 = ProtogalaxyProver::new(keys.clone(), &mut t2).prove().unwrap();
    assert_eq!(r1.proof, r2.proof);
    assert_eq!(r1.accumulator, r2.accumulator);

    // A different transcript seed gives a different fold
    let mut t3 = Blake2bTranscript::with_seed(b"another session");
    let r3 = ProtogalaxyProver::new(keys, &mut t3).prove().unwrap();
    assert_ne!(r1.accumulator.target_sum, r3.accumulator.target_sum);
}

#[test]
fn test_padding_keeps_existing_values() {
    let mut rng = StdRng::seed_from_u64(8);
    let small = fresh_key(&mut rng, 3);
    let large = fresh_key(&mut rng, 13);
    let mut keys = [small.clone(), large.clone()];
    normalize_circuit_sizes(&mut keys);

    assert_eq!(keys[0].polynomials.virtual_size(), 16);
    assert_eq!(keys[1], large);
    for (padded, original) in keys[0]
        .polynomials
        .get_unshifted()
        .iter()
        .zip(small.polynomials.get_unshifted())
    {
        assert_eq!(padded.evals(), original.evals());
        assert!((original.size()..16).all(|row| padded.get(row).is_zero()));
    }

    // Padding is idempotent
    let padded = keys.clone();
    normalize_circuit_sizes(&mut keys);
    assert_eq!(keys, padded);
}

#[test]
fn test_unsatisfied_key_is_rejected() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut invalid = fresh_key(&mut rng, 8);
    invalid.polynomials[Column::WO].evals_mut()[0] += Fr::one();
    let keys = [fresh_key(&mut rng, 8), invalid];

    let mut transcript = Blake2bTranscript::new();
    let result = ProtogalaxyProver::new(keys, &mut transcript).prove();
    assert!(matches!(
        result,
        Err(ProverError::CombinerQuotientNotExact { point: 1 })
    ));
}
