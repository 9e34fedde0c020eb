//! Binding of JSON input values to circuit signals.

use std::hash::Hasher;

use circuit::EvaluationContext;
use field::WitnessField;
use fnv::FnvHasher;
use serde_json::Value;
use tracing::debug;

use crate::errors::WitnessCalcError;
use crate::number::{json_type, literal_from_json};

/// 64-bit FNV-1a hash of a signal name, the key circuits index inputs by.
///
/// Names are assumed not to collide within one circuit; nothing here checks.
pub fn signal_hash(name: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(name.as_bytes());
    hasher.finish()
}

/// Flattens a scalar or an arbitrarily nested array into field elements,
/// row-major, matching the circuit's layout of multi-dimensional signals.
pub fn flatten<F: WitnessField>(value: &Value) -> Result<Vec<F>, WitnessCalcError> {
    let mut out = Vec::new();
    flatten_into(value, &mut out)?;
    Ok(out)
}

fn flatten_into<F: WitnessField>(value: &Value, out: &mut Vec<F>) -> Result<(), WitnessCalcError> {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out)?;
            }
        }
        scalar => out.push(literal_from_json(scalar)?.to_field()?),
    }
    Ok(())
}

/// Parses `json` and writes every signal it names into `ctx`.
///
/// Each top-level key must flatten to exactly as many elements as the circuit
/// declares for that signal. Returns the number of signals bound. An empty
/// object still gives the context a chance to run, for circuits without
/// inputs.
pub fn bind_inputs<F, C>(ctx: &mut C, json: &[u8]) -> Result<usize, WitnessCalcError>
where
    F: WitnessField,
    C: EvaluationContext<F>,
{
    let value: Value = serde_json::from_slice(json)?;
    let Value::Object(signals) = value else {
        return Err(WitnessCalcError::NotAnObject {
            found: json_type(&value),
        });
    };

    if signals.is_empty() {
        ctx.try_run()?;
    }

    for (name, value) in &signals {
        let hash = signal_hash(name);
        let values = flatten::<F>(value)?;
        let expected = ctx
            .input_signal_size(hash)
            .map_err(|source| WitnessCalcError::LoadSignal {
                signal: name.clone(),
                source,
            })?;

        if values.len() < expected {
            return Err(WitnessCalcError::TooFewValues {
                signal: name.clone(),
                expected,
                got: values.len(),
            });
        }
        if values.len() > expected {
            return Err(WitnessCalcError::TooManyValues {
                signal: name.clone(),
                expected,
                got: values.len(),
            });
        }

        for (index, element) in values.into_iter().enumerate() {
            ctx.set_input_signal(hash, index, element)
                .map_err(|source| WitnessCalcError::SetSignal {
                    signal: name.clone(),
                    source,
                })?;
        }
        debug!(signal = %name, hash, elements = expected, "bound input signal");
    }
    Ok(signals.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit::CircuitError;
    use field::{Fr, KoalaBear};
    use p3_field::PrimeCharacteristicRing;
    use serde_json::json;
    use std::collections::HashMap;

    /// Records writes; every signal is declared with the given size.
    #[derive(Default)]
    struct Recorder {
        sizes: HashMap<u64, usize>,
        writes: Vec<(u64, usize, KoalaBear)>,
        runs: usize,
        reject: Option<u64>,
    }

    impl Recorder {
        fn with(signals: &[(&str, usize)]) -> Self {
            Self {
                sizes: signals.iter().map(|(name, size)| (signal_hash(name), *size)).collect(),
                ..Self::default()
            }
        }
    }

    impl EvaluationContext<KoalaBear> for Recorder {
        fn input_signal_size(&self, hash: u64) -> Result<usize, CircuitError> {
            self.sizes.get(&hash).copied().ok_or(CircuitError::SignalNotFound { hash })
        }

        fn set_input_signal(
            &mut self,
            hash: u64,
            index: usize,
            value: KoalaBear,
        ) -> Result<(), CircuitError> {
            if self.reject == Some(hash) {
                return Err(CircuitError::SignalAssignedTwice { signal: index });
            }
            self.writes.push((hash, index, value));
            Ok(())
        }

        fn remaining_inputs(&self) -> usize {
            0
        }

        fn total_inputs(&self) -> usize {
            self.sizes.values().sum()
        }

        fn try_run(&mut self) -> Result<(), CircuitError> {
            self.runs += 1;
            Ok(())
        }

        fn witness(&self, _slot: usize) -> Result<KoalaBear, CircuitError> {
            Ok(KoalaBear::ZERO)
        }
    }

    fn bind(ctx: &mut Recorder, json: &str) -> Result<usize, WitnessCalcError> {
        bind_inputs::<KoalaBear, _>(ctx, json.as_bytes())
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(signal_hash(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(signal_hash("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_flatten_nested_arrays_in_order() {
        let values = flatten::<Fr>(&json!([[1, 2], [3, 4]])).unwrap();
        let expected = (1..=4).map(Fr::from_u32).collect::<Vec<_>>();
        assert_eq!(values, expected);

        let deep = flatten::<Fr>(&json!([[[["0x1"]]], [], "0b10"])).unwrap();
        assert_eq!(deep, vec![Fr::ONE, Fr::TWO]);
        assert_eq!(flatten::<Fr>(&json!("7")).unwrap(), vec![Fr::from_u32(7)]);
    }

    #[test]
    fn test_binds_each_element_at_its_flat_index() {
        let mut ctx = Recorder::with(&[("in", 4), ("k", 1)]);
        let bound = bind(&mut ctx, r#"{"in": [[1, 2], [3, "0x4"]], "k": "9"}"#).unwrap();
        assert_eq!(bound, 2);

        let hash = signal_hash("in");
        let writes = ctx
            .writes
            .iter()
            .filter(|(h, _, _)| *h == hash)
            .map(|(_, index, value)| (*index, *value))
            .collect::<Vec<_>>();
        assert_eq!(
            writes,
            (0..4)
                .map(|i| (i, KoalaBear::from_u32(i as u32 + 1)))
                .collect::<Vec<_>>()
        );
        assert_eq!(ctx.runs, 0);
    }

    #[test]
    fn test_arity_mismatch() {
        let mut ctx = Recorder::with(&[("in", 4)]);
        match bind(&mut ctx, r#"{"in": [1, 2, 3]}"#) {
            Err(WitnessCalcError::TooFewValues { signal, expected, got }) => {
                assert_eq!((signal.as_str(), expected, got), ("in", 4, 3));
            }
            other => panic!("unexpected {other:?}"),
        }
        match bind(&mut ctx, r#"{"in": [1, 2, 3, 4, 5]}"#) {
            Err(WitnessCalcError::TooManyValues { signal, expected, got }) => {
                assert_eq!((signal.as_str(), expected, got), ("in", 4, 5));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(ctx.writes.is_empty());
    }

    #[test]
    fn test_empty_object_runs_context() {
        let mut ctx = Recorder::default();
        assert_eq!(bind(&mut ctx, "{}").unwrap(), 0);
        assert_eq!(ctx.runs, 1);
    }

    #[test]
    fn test_errors_name_the_signal() {
        let mut ctx = Recorder::with(&[("x", 1)]);
        let err = bind(&mut ctx, r#"{"y": 1}"#).unwrap_err();
        assert!(err.to_string().starts_with("Error loading signal y"));

        ctx.reject = Some(signal_hash("x"));
        let err = bind(&mut ctx, r#"{"x": 1}"#).unwrap_err();
        assert!(matches!(err, WitnessCalcError::SetSignal { ref signal, .. } if signal == "x"));
        assert!(err.to_string().starts_with("Error setting signal: x\n"));
    }

    #[test]
    fn test_rejects_non_object_and_bad_json() {
        let mut ctx = Recorder::default();
        assert!(matches!(
            bind(&mut ctx, "[1, 2]"),
            Err(WitnessCalcError::NotAnObject { found: "array" })
        ));
        assert!(matches!(bind(&mut ctx, "{\"a\": "), Err(WitnessCalcError::Json(_))));
        let mut ctx = Recorder::with(&[("a", 1)]);
        assert!(matches!(
            bind(&mut ctx, r#"{"a": "0xzz"}"#),
            Err(WitnessCalcError::InvalidNumber { .. })
        ));
    }
}
