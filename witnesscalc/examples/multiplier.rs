//! Computes the witness of a two-input multiplier circuit.
//!
//! Run with `RUST_LOG=debug` to see each stage of the calculation.

use std::collections::BTreeMap;

use circuit::{
    build_input_hash_map, CircuitDescriptor, CircuitError, CircuitParams, InputSignalInfo,
};
use field::Fr;
use tracing_subscriber::EnvFilter;
use witnesscalc::{signal_hash, Status, WitnessCalculator, WitnessFile};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Signals: [one, c, a, b] with c = a * b.
    let params = CircuitParams {
        input_hash_map_size: 4,
        witness_count: 4,
        constants_count: 0,
        io_map_count: 0,
        main_input_signal_start: 2,
        main_input_signal_count: 2,
        total_signal_count: 4,
    };
    let inputs = [
        InputSignalInfo {
            hash: signal_hash("a"),
            signal_id: 2,
            signal_size: 1,
        },
        InputSignalInfo {
            hash: signal_hash("b"),
            signal_id: 3,
            signal_size: 1,
        },
    ];
    let descriptor = CircuitDescriptor::<Fr>::new(
        build_input_hash_map(&inputs, params.input_hash_map_size).expect("hash map fits"),
        vec![0, 1, 2, 3],
        vec![],
        BTreeMap::new(),
    )
    .to_bytes();

    let calculator = WitnessCalculator::<Fr, _>::new(
        params,
        |_: &CircuitDescriptor<Fr>, signals: &mut [Fr]| {
            signals[1] = signals[2] * signals[3];
            Ok::<(), CircuitError>(())
        },
    );
    let json = br#"{"a": "0x3", "b": "11"}"#;

    let mut wtns = Vec::new();
    let mut wtns_size = 0;
    let mut error = [0u8; 256];
    let status = calculator.calculate(&descriptor, json, &mut wtns, &mut wtns_size, &mut error);
    if status == Status::ShortBuffer {
        wtns.resize(wtns_size, 0);
    }
    let status = calculator.calculate(&descriptor, json, &mut wtns, &mut wtns_size, &mut error);
    if status != Status::Ok {
        let end = error.iter().position(|b| *b == 0).unwrap_or(error.len());
        eprintln!("error: {}", String::from_utf8_lossy(&error[..end]));
        std::process::exit(status.code());
    }

    let file = WitnessFile::parse(&wtns[..wtns_size]).expect("parse witness");
    let witness = file.elements::<Fr>().expect("decode witness");
    println!("{} bytes, {} witnesses", wtns_size, file.witness_count);
    for (slot, value) in witness.iter().enumerate() {
        println!("  w[{slot}] = {value}");
    }
}
