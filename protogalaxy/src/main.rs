//! Folds a chain of random circuits into a single accumulator, checking after
//! each fold that the accumulator satisfies its target sum.

use ark_bn254::Fr;
use log::{debug, info};
use protogalaxy::{
    mock_circuits::MockCircuits, prover_internal::compute_full_relation_sum, Blake2bTranscript,
    ProtogalaxyProver, ProvingKey, TraceSettings,
};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Instant;

pub fn main() {
    // See https://github.com/rust-lang/log
    env_logger::init();

    let arg_n = clap::arg!(--"n" <U64> "Number of circuits folded into the accumulator")
        .value_parser(clap::value_parser!(u64));
    let arg_log2_size = clap::arg!(--"log2-size" <USIZE> "Number of gates of each circuit in base 2")
        .value_parser(clap::value_parser!(usize));
    let arg_seed = clap::arg!(--"seed" <U64> "Seed of the random circuits")
        .required(false)
        .value_parser(clap::value_parser!(u64));
    let arg_structured_rows =
        clap::arg!(--"structured-rows" <USIZE> "Number of rows reserved by every key")
            .required(false)
            .value_parser(clap::value_parser!(usize));

    let cmd = clap::Command::new("protogalaxy")
        .bin_name("protogalaxy")
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("fold")
                .arg(arg_n)
                .arg(arg_log2_size)
                .arg(arg_seed)
                .arg(arg_structured_rows)
                .arg_required_else_help(true),
        );
    let matches = cmd.get_matches();
    let matches = match matches.subcommand() {
        Some(("fold", matches)) => matches,
        _ => unreachable!("clap should ensure we don't get here"),
    };
    let n_folds = *matches.get_one::<u64>("n").unwrap();
    let log2_size = *matches.get_one::<usize>("log2-size").unwrap();
    let seed = *matches.get_one::<u64>("seed").unwrap_or(&0);
    let settings = TraceSettings {
        structured_rows: *matches.get_one::<usize>("structured-rows").unwrap_or(&0),
    };

    info!("Folding {n_folds} circuits of 2^{log2_size} gates (seed {seed})");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut new_key = || {
        let trace = MockCircuits::construct_arithmetic_trace::<Fr, _>(&mut rng, 1 << log2_size);
        ProvingKey::new(&trace, &settings).unwrap()
    };

    let mut transcript = Blake2bTranscript::<Fr>::new();
    let mut accumulator = new_key();
    let mut proof_size = 0;
    for i in 0..n_folds {
        let start = Instant::now();
        let result = ProtogalaxyProver::new([accumulator, new_key()], &mut transcript)
            .prove()
            .unwrap();
        accumulator = result.accumulator;
        proof_size += result.proof.len();
        info!("Fold {}/{n_folds}: {} ms", i + 1, start.elapsed().as_millis());

        let start = Instant::now();
        assert_eq!(
            compute_full_relation_sum(&accumulator),
            accumulator.target_sum,
            "the accumulator does not satisfy its target sum after fold {}",
            i + 1
        );
        debug!("Decider check: {} μs", start.elapsed().as_micros());
    }
    info!("Total proof size: {proof_size} bytes");
}
