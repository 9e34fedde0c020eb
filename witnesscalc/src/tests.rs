use super::*;
use circuit::{
    CircuitDescriptor, CircuitError, CircuitParams, FormatError, InputSignalInfo, IoDef, Section,
    build_input_hash_map,
};
use field::{Fr, RandomField, WitnessField};
use p3_field::PrimeCharacteristicRing;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::io::Write;

// Signals: [one, c, a, b] with c = a * b.
fn multiplier_params() -> CircuitParams {
    CircuitParams {
        input_hash_map_size: 4,
        witness_count: 4,
        constants_count: 0,
        io_map_count: 0,
        main_input_signal_start: 2,
        main_input_signal_count: 2,
        total_signal_count: 4,
    }
}

fn multiplier_descriptor(io_map: BTreeMap<u32, Vec<IoDef>>) -> Vec<u8> {
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
    CircuitDescriptor::<Fr>::new(
        build_input_hash_map(&inputs, 4).expect("fits"),
        vec![0, 1, 2, 3],
        vec![],
        io_map,
    )
    .to_bytes()
}

fn multiply(_: &CircuitDescriptor<Fr>, signals: &mut [Fr]) -> Result<(), CircuitError> {
    signals[1] = signals[2] * signals[3];
    Ok(())
}

type Evaluate = fn(&CircuitDescriptor<Fr>, &mut [Fr]) -> Result<(), CircuitError>;

fn multiplier() -> WitnessCalculator<Fr, Evaluate> {
    WitnessCalculator::<Fr, _>::new(multiplier_params(), multiply as Evaluate)
}

/// Runs the status-code entry point with a buffer of exactly the right size
/// and returns the status, the bytes and the message as text.
fn run<E: circuit::Evaluator<Fr>>(
    calculator: &WitnessCalculator<Fr, E>,
    descriptor: &[u8],
    json: &str,
    msg_len: usize,
) -> (Status, Vec<u8>, String) {
    let mut wtns_size = calculator.witness_size();
    let mut wtns = vec![0u8; wtns_size];
    let mut msg = vec![0u8; msg_len];
    let status =
        calculator.calculate(descriptor, json.as_bytes(), &mut wtns, &mut wtns_size, &mut msg);
    wtns.truncate(wtns_size);
    let end = msg.iter().position(|b| *b == 0).unwrap_or(msg.len());
    (status, wtns, String::from_utf8_lossy(&msg[..end]).into_owned())
}

#[test]
fn test_multiplier_witness() {
    let mut rng = StdRng::seed_from_u64(42);
    let a = Fr::random(&mut rng);
    let b = Fr::random(&mut rng);
    let json = format!(r#"{{"a": "{a}", "b": "{b}"}}"#);

    let descriptor = multiplier_descriptor(BTreeMap::new());
    let (status, wtns, msg) = run(&multiplier(), &descriptor, &json, 64);
    assert_eq!(status, Status::Ok, "{msg}");

    let file = WitnessFile::parse(&wtns).expect("parse");
    assert_eq!(file.witness_count, 4);
    assert_eq!(file.elements::<Fr>().expect("elements"), vec![Fr::ONE, a * b, a, b]);
}

#[test]
fn test_mixed_literal_bases() {
    let (status, wtns, msg) = run(
        &multiplier(),
        &multiplier_descriptor(BTreeMap::new()),
        r#"{"a": "0x0B", "b": [[3]]}"#,
        64,
    );
    assert_eq!(status, Status::Ok, "{msg}");
    let file = WitnessFile::parse(&wtns).expect("parse");
    assert_eq!(file.element(1).expect("slot 1")[0], 33);
}

#[test]
fn test_two_phase_sizing() {
    let calculator = multiplier();
    let descriptor = multiplier_descriptor(BTreeMap::new());
    let json = br#"{"a": 2, "b": 5}"#;
    let required = required_size(4, Fr::width());
    assert_eq!(calculator.witness_size(), required);

    let mut small = vec![0xAAu8; required - 1];
    let mut wtns_size = small.len();
    let mut msg = [0x55u8; 32];
    let status = calculator.calculate(&descriptor, json, &mut small, &mut wtns_size, &mut msg);
    assert_eq!(status, Status::ShortBuffer);
    assert_eq!(wtns_size, required);
    assert!(small.iter().all(|b| *b == 0xAA));
    assert!(msg.iter().all(|b| *b == 0x55));

    let mut exact = vec![0u8; wtns_size];
    let status = calculator.calculate(&descriptor, json, &mut exact, &mut wtns_size, &mut msg);
    assert_eq!(status, Status::Ok);
    assert_eq!(wtns_size, required);
}

#[test]
fn test_oversized_witness_count_asks_for_unreachable_size() {
    let params = CircuitParams {
        witness_count: usize::MAX,
        ..multiplier_params()
    };
    let calculator = WitnessCalculator::<Fr, _>::new(params, multiply as Evaluate);
    assert_eq!(calculator.witness_size(), usize::MAX);

    let descriptor = multiplier_descriptor(BTreeMap::new());
    let mut wtns = vec![0u8; 64];
    let mut wtns_size = wtns.len();
    let mut msg = [0u8; 32];
    let status = calculator.calculate(&descriptor, b"{}", &mut wtns, &mut wtns_size, &mut msg);
    assert_eq!(status, Status::ShortBuffer);
    assert_eq!(wtns_size, usize::MAX);
}

#[test]
fn test_declared_size_limits_capacity() {
    let calculator = multiplier();
    let descriptor = multiplier_descriptor(BTreeMap::new());
    let mut wtns = vec![0u8; 4096];
    let mut wtns_size = 10;
    let mut msg = [0u8; 32];
    let status = calculator.calculate(&descriptor, b"{}", &mut wtns, &mut wtns_size, &mut msg);
    assert_eq!(status, Status::ShortBuffer);
    assert_eq!(wtns_size, calculator.witness_size());
}

#[test]
fn test_truncated_io_map() {
    let mut io_map = BTreeMap::new();
    io_map.insert(
        5,
        vec![IoDef {
            offset: 0,
            lengths: vec![2, 3],
        }],
    );
    let params = CircuitParams {
        io_map_count: 1,
        ..multiplier_params()
    };
    let calculator = WitnessCalculator::<Fr, _>::new(params, multiply as Evaluate);
    let mut descriptor = multiplier_descriptor(io_map);
    descriptor.truncate(descriptor.len() - 4);

    let mut out = vec![0u8; calculator.witness_size()];
    let err = calculator
        .try_calculate(&descriptor, br#"{"a": 1, "b": 1}"#, &mut out)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    match err {
        WitnessCalcError::Format(format) => {
            assert_eq!(
                format,
                FormatError::IoMapTruncated {
                    template_id: 5,
                    definition: 0,
                }
            );
            assert_eq!(format.section(), Some(Section::IoMap));
        }
        other => panic!("unexpected {other:?}"),
    }

    let (status, _, msg) = run(&calculator, &descriptor, "{}", 128);
    assert_eq!(status, Status::Error);
    assert!(msg.contains("io map"), "{msg}");
}

#[test]
fn test_zero_input_circuit() {
    let params = CircuitParams {
        input_hash_map_size: 0,
        witness_count: 3,
        constants_count: 0,
        io_map_count: 0,
        main_input_signal_start: 1,
        main_input_signal_count: 0,
        total_signal_count: 3,
    };
    let calculator = WitnessCalculator::<Fr, _>::new(
        params,
        |_: &CircuitDescriptor<Fr>, signals: &mut [Fr]| {
            signals[1] = Fr::from_u32(7);
            signals[2] = signals[1].square();
            Ok::<(), CircuitError>(())
        },
    );
    let descriptor =
        CircuitDescriptor::<Fr>::new(vec![], vec![0, 1, 2], vec![], BTreeMap::new()).to_bytes();

    let (status, wtns, msg) = run(&calculator, &descriptor, "{}", 64);
    assert_eq!(status, Status::Ok, "{msg}");
    assert_eq!(wtns.len(), required_size(3, 32));

    let file = WitnessFile::parse(&wtns).expect("parse");
    assert_eq!(file.element_width, 32);
    assert_eq!(file.modulus, Fr::modulus_le_bytes());
    assert_eq!(file.witness_count, 3);
    assert_eq!(
        file.elements::<Fr>().expect("elements"),
        vec![Fr::ONE, Fr::from_u32(7), Fr::from_u32(49)]
    );
}

#[test]
fn test_sized_zero_input_still_evaluates() {
    // Signals: [one, out]; "x" is declared with no elements.
    let params = CircuitParams {
        input_hash_map_size: 2,
        witness_count: 2,
        constants_count: 0,
        io_map_count: 0,
        main_input_signal_start: 1,
        main_input_signal_count: 0,
        total_signal_count: 2,
    };
    let inputs = [InputSignalInfo {
        hash: signal_hash("x"),
        signal_id: 1,
        signal_size: 0,
    }];
    let descriptor = CircuitDescriptor::<Fr>::new(
        build_input_hash_map(&inputs, 2).expect("fits"),
        vec![0, 1],
        vec![],
        BTreeMap::new(),
    )
    .to_bytes();
    let calculator = WitnessCalculator::<Fr, _>::new(
        params,
        |_: &CircuitDescriptor<Fr>, signals: &mut [Fr]| {
            signals[1] = Fr::from_u32(5);
            Ok::<(), CircuitError>(())
        },
    );

    let (status, wtns, msg) = run(&calculator, &descriptor, r#"{"x": []}"#, 64);
    assert_eq!(status, Status::Ok, "{msg}");
    let file = WitnessFile::parse(&wtns).expect("parse");
    assert_eq!(file.elements::<Fr>().expect("elements"), vec![Fr::ONE, Fr::from_u32(5)]);
}

#[test]
fn test_incomplete_input() {
    let descriptor = multiplier_descriptor(BTreeMap::new());
    let (status, _, msg) = run(&multiplier(), &descriptor, r#"{"a": 3}"#, 128);
    assert_eq!(status, Status::Error);
    assert_eq!(msg, "Not all inputs have been set. Only 1 out of 2");

    let (status, _, msg) = run(&multiplier(), &descriptor, "{}", 128);
    assert_eq!(status, Status::Error);
    assert_eq!(msg, "Not all inputs have been set. Only 0 out of 2");
}

#[test]
fn test_error_messages() {
    let descriptor = multiplier_descriptor(BTreeMap::new());
    let cases = [
        (r#"{"a": "0xg", "b": 1}"#, "Invalid number in JSON input: 0xg"),
        (r#"{"a": 1, "b": [1, 2]}"#, "Error loading signal b: Too many values"),
        (r#"{"a": [], "b": 1}"#, "Error loading signal a: Not enough values"),
        (r#"{"z": 1}"#, "Error loading signal z: Signal not found"),
        (r#"{"a": 1, "b": true}"#, "Invalid JSON type: boolean"),
    ];
    for (json, expected) in cases {
        let (status, _, msg) = run(&multiplier(), &descriptor, json, 256);
        assert_eq!(status, Status::Error, "{json}");
        assert!(msg.starts_with(expected), "{json}: {msg}");
    }
}

#[test]
fn test_message_truncated_to_buffer() {
    let calculator = multiplier();
    let descriptor = multiplier_descriptor(BTreeMap::new());
    let mut wtns = vec![0u8; calculator.witness_size()];
    let mut wtns_size = wtns.len();
    let mut msg = [0xFFu8; 12];
    let status = calculator.calculate(&descriptor, b"{}", &mut wtns, &mut wtns_size, &mut msg);
    assert_eq!(status, Status::Error);
    assert_eq!(&msg, b"Not all inpu");
    assert_eq!(wtns_size, calculator.witness_size());
}

#[test]
fn test_evaluator_panic_is_unknown_error() {
    let calculator = WitnessCalculator::<Fr, _>::new(
        multiplier_params(),
        |_: &CircuitDescriptor<Fr>, _: &mut [Fr]| -> Result<(), CircuitError> {
            panic!("evaluator bug")
        },
    );
    let descriptor = multiplier_descriptor(BTreeMap::new());
    let (status, _, msg) = run(&calculator, &descriptor, r#"{"a": 1, "b": 2}"#, 64);
    assert_eq!(status, Status::Error);
    assert_eq!(msg, "unknown error");
}

#[test]
fn test_evaluator_error_is_reported() {
    let calculator = WitnessCalculator::<Fr, _>::new(
        multiplier_params(),
        |_: &CircuitDescriptor<Fr>, _: &mut [Fr]| -> Result<(), CircuitError> {
            Err(CircuitError::Evaluation("assert failed in template Multiplier".into()))
        },
    );
    let descriptor = multiplier_descriptor(BTreeMap::new());
    let (status, _, msg) = run(&calculator, &descriptor, r#"{"a": 1, "b": 2}"#, 128);
    assert_eq!(status, Status::Error);
    assert!(msg.starts_with("Error setting signal: b\n"), "{msg}");
    assert!(msg.contains("assert failed in template Multiplier"), "{msg}");
}

#[test]
fn test_from_dat_file() {
    let calculator = multiplier();
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(&multiplier_descriptor(BTreeMap::new())).expect("write");
    file.flush().expect("flush");

    let mut wtns = vec![0u8; calculator.witness_size()];
    let mut wtns_size = wtns.len();
    let mut msg = [0u8; 128];
    let status = calculator.calculate_from_dat_file(
        file.path(),
        br#"{"a": 6, "b": 7}"#,
        &mut wtns,
        &mut wtns_size,
        &mut msg,
    );
    assert_eq!(status, Status::Ok);
    let file = WitnessFile::parse(&wtns[..wtns_size]).expect("parse");
    assert_eq!(file.element(1).expect("slot 1")[0], 42);
}

#[test]
fn test_from_missing_dat_file() {
    let calculator = multiplier();
    let dir = tempfile::tempdir().expect("tempdir");
    let mut wtns = vec![0u8; calculator.witness_size()];
    let mut wtns_size = wtns.len();
    let mut msg = [0u8; 256];
    let status = calculator.calculate_from_dat_file(
        dir.path().join("missing.dat"),
        b"{}",
        &mut wtns,
        &mut wtns_size,
        &mut msg,
    );
    assert_eq!(status, Status::Error);
    assert!(msg.starts_with(b"Failed to map circuit file"));
}
