//! The evaluation context shared by input binding, evaluation and witness
//! serialization.

use field::WitnessField;
use tracing::debug;

use crate::descriptor::CircuitDescriptor;
use crate::errors::CircuitError;
use crate::params::CircuitParams;

/// Circuit-specific code that computes every signal from the bound inputs.
///
/// On entry `signals` holds the constant one at index 0 and every main input
/// at its assigned position; all other entries are zero.
pub trait Evaluator<F> {
    fn evaluate(&self, circuit: &CircuitDescriptor<F>, signals: &mut [F])
    -> Result<(), CircuitError>;
}

impl<F, T> Evaluator<F> for T
where
    T: Fn(&CircuitDescriptor<F>, &mut [F]) -> Result<(), CircuitError>,
{
    fn evaluate(
        &self,
        circuit: &CircuitDescriptor<F>,
        signals: &mut [F],
    ) -> Result<(), CircuitError> {
        self(circuit, signals)
    }
}

/// State of one witness computation.
///
/// Inputs are written element by element, keyed by the FNV-1a hash of the
/// signal name and the element's flat index. Once every required input is set
/// the context evaluates the circuit, after which witness slots can be read.
pub trait EvaluationContext<F> {
    /// Number of field elements the input signal named by `hash` expects.
    fn input_signal_size(&self, hash: u64) -> Result<usize, CircuitError>;

    fn set_input_signal(&mut self, hash: u64, index: usize, value: F) -> Result<(), CircuitError>;

    /// Required input elements that have not been set yet.
    fn remaining_inputs(&self) -> usize;

    /// Required input elements in total.
    fn total_inputs(&self) -> usize;

    /// Evaluates the circuit if nothing remains to be set and it has not been
    /// evaluated yet. Otherwise does nothing.
    fn try_run(&mut self) -> Result<(), CircuitError>;

    /// Final value of witness slot `slot`, in the field's internal form.
    fn witness(&self, slot: usize) -> Result<F, CircuitError>;
}

/// [`EvaluationContext`] backed by a flat signal table.
///
/// Signal 0 is the constant one; main inputs occupy
/// `main_input_signal_start..main_input_signal_start + main_input_signal_count`.
pub struct SignalContext<'a, F, E> {
    circuit: &'a CircuitDescriptor<F>,
    params: &'a CircuitParams,
    evaluator: &'a E,
    signals: Vec<F>,
    assigned: Vec<bool>,
    remaining: usize,
    evaluated: bool,
}

impl<'a, F: WitnessField, E: Evaluator<F>> SignalContext<'a, F, E> {
    /// Fails if the witness map points outside the signal table.
    pub fn new(
        circuit: &'a CircuitDescriptor<F>,
        params: &'a CircuitParams,
        evaluator: &'a E,
    ) -> Result<Self, CircuitError> {
        let total = params.total_signal_count;
        if let Some((slot, &signal)) = circuit
            .witness_to_signal()
            .iter()
            .enumerate()
            .find(|(_, signal)| **signal >= total as u64)
        {
            return Err(CircuitError::WitnessSignalOutOfRange {
                slot,
                signal,
                total,
            });
        }

        let mut signals = vec![F::ZERO; total];
        if let Some(one) = signals.first_mut() {
            *one = F::ONE;
        }

        Ok(Self {
            circuit,
            params,
            evaluator,
            signals,
            assigned: vec![false; params.main_input_signal_count],
            remaining: params.main_input_signal_count,
            evaluated: false,
        })
    }

    pub fn signals(&self) -> &[F] {
        &self.signals
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }
}

impl<F: WitnessField, E: Evaluator<F>> EvaluationContext<F> for SignalContext<'_, F, E> {
    fn input_signal_size(&self, hash: u64) -> Result<usize, CircuitError> {
        self.circuit
            .input_signal(hash)
            .map(|info| info.signal_size as usize)
            .ok_or(CircuitError::SignalNotFound { hash })
    }

    fn set_input_signal(&mut self, hash: u64, index: usize, value: F) -> Result<(), CircuitError> {
        let info = self
            .circuit
            .input_signal(hash)
            .ok_or(CircuitError::SignalNotFound { hash })?;
        let size = info.signal_size as usize;
        if index >= size {
            return Err(CircuitError::SignalIndexOutOfRange { index, size });
        }

        let signal = (info.signal_id as usize).saturating_add(index);
        let slot = signal
            .checked_sub(self.params.main_input_signal_start)
            .filter(|slot| *slot < self.assigned.len() && signal < self.signals.len())
            .ok_or(CircuitError::NotAnInput { signal })?;
        if self.assigned[slot] {
            return Err(CircuitError::SignalAssignedTwice { signal });
        }

        self.signals[signal] = value;
        self.assigned[slot] = true;
        self.remaining -= 1;
        if self.remaining == 0 {
            self.try_run()?;
        }
        Ok(())
    }

    fn remaining_inputs(&self) -> usize {
        self.remaining
    }

    fn total_inputs(&self) -> usize {
        self.params.main_input_signal_count
    }

    fn try_run(&mut self) -> Result<(), CircuitError> {
        if self.remaining > 0 || self.evaluated {
            return Ok(());
        }
        debug!(signals = self.signals.len(), "evaluating circuit");
        self.evaluator.evaluate(self.circuit, &mut self.signals)?;
        self.evaluated = true;
        Ok(())
    }

    fn witness(&self, slot: usize) -> Result<F, CircuitError> {
        let map = self.circuit.witness_to_signal();
        let signal = *map.get(slot).ok_or(CircuitError::WitnessSlotOutOfRange {
            slot,
            count: map.len(),
        })?;
        Ok(self.signals[signal as usize])
    }
}
