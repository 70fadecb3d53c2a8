use anyhow::Result;
use rand::distributions::uniform::SampleBorrow;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use thiserror::Error;

use crate::infer::EmptyModelError;
use crate::structs::{Model, Observation};

/// An Error that is thrown when a state's probabilities
/// can't be used as weights to draw the next symbol.
#[derive(Error, Debug)]
pub enum SamplingError {
    #[error("state \"{state}\" has no usable emission probabilities")]
    MissingEmission {
        state: String,
        #[source]
        reason: WeightedError,
    },
    #[error("state \"{state}\" has no usable transition probabilities")]
    MissingTransition {
        state: String,
        #[source]
        reason: WeightedError,
    },
    #[error("state \"{state}\" transitioned to \"{destination}\", which has no transitions of its own")]
    UnknownDestination { state: String, destination: String },
}

/// Draw an observation of `length` symbols from the model.
///
/// The first state is chosen uniformly from the whole state set. At each step,
/// the current state is recorded, an output is drawn from its emission
/// probabilities and the next state is drawn from its transition probabilities.
/// The probabilities are used as relative weights, so they don't need to sum
/// to one. The next state is drawn from the full transition table row,
/// including destinations that are not states themselves; landing on one of
/// those stops the draw with a [`SamplingError`], as does a state whose
/// weights are all zero (or that has none at all).
pub fn generate(model: &Model, length: usize, rng: &mut impl Rng) -> Result<Observation> {
    if model.num_states() == 0 {
        return Err(EmptyModelError.into());
    }

    let mut states: Vec<String> = Vec::with_capacity(length);
    let mut outputs: Vec<String> = Vec::with_capacity(length);

    let mut state_idx = rng.gen_range(0..model.num_states());

    for _ in 0..length {
        let state = model.states().symbol(state_idx);
        states.push(state.to_string());

        let output_idx = sample(model.emission_row(state_idx), rng).map_err(|reason| {
            SamplingError::MissingEmission {
                state: state.to_string(),
                reason,
            }
        })?;
        outputs.push(model.outputs().symbol(output_idx).to_string());

        let row = model
            .transition_table()
            .row(state)
            .ok_or_else(|| SamplingError::MissingTransition {
                state: state.to_string(),
                reason: WeightedError::NoItem,
            })?;

        let destination_idx = sample(row.values(), rng).map_err(|reason| {
            SamplingError::MissingTransition {
                state: state.to_string(),
                reason,
            }
        })?;

        let (destination, _) =
            row.get_index(destination_idx)
                .ok_or_else(|| SamplingError::MissingTransition {
                    state: state.to_string(),
                    reason: WeightedError::NoItem,
                })?;

        state_idx = model.states().index_of(destination).ok_or_else(|| {
            SamplingError::UnknownDestination {
                state: state.to_string(),
                destination: destination.to_string(),
            }
        })?;
    }

    log::debug!("generated an observation of length {length}");

    Ok(Observation::with_states(states, outputs))
}

fn sample<I>(weights: I, rng: &mut impl Rng) -> Result<usize, WeightedError>
where
    I: IntoIterator,
    I::Item: SampleBorrow<f64>,
{
    Ok(WeightedIndex::<f64>::new(weights)?.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::model::tests::cat_model;
    use crate::structs::ProbabilityTable;
    use assert2::{check, let_assert};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_generate_length_and_symbols() -> anyhow::Result<()> {
        let model = cat_model();
        let mut rng = Pcg64::seed_from_u64(7);

        for length in [0, 1, 2, 25] {
            let observation = generate(&model, length, &mut rng)?;
            let_assert!(Some(states) = &observation.states);

            check!(states.len() == length);
            check!(observation.outputs.len() == length);
            check!(states.iter().all(|s| model.states().contains(s)));
            check!(observation.outputs.iter().all(|o| model.outputs().contains(o)));
        }
        Ok(())
    }

    #[test]
    fn test_generate_is_deterministic_for_a_seed() -> anyhow::Result<()> {
        let model = cat_model();

        let a = generate(&model, 50, &mut Pcg64::seed_from_u64(42))?;
        let b = generate(&model, 50, &mut Pcg64::seed_from_u64(42))?;
        check!(a == b);
        Ok(())
    }

    #[test]
    fn test_generate_follows_forced_paths() -> anyhow::Result<()> {
        let transitions = ProbabilityTable::from_records([
            ("a", "b", 1.0),
            ("a", "a", 0.0),
            ("b", "a", 5.0),
        ]);
        let emissions = ProbabilityTable::from_records([("a", "x", 1.0), ("b", "y", 0.3)]);
        let model = Model::new(transitions, emissions);

        let observation = generate(&model, 6, &mut Pcg64::seed_from_u64(1))?;
        let_assert!(Some(states) = observation.states);

        // every state alternates, and each state only has one symbol
        states.windows(2).for_each(|w| {
            check!(w[0] != w[1]);
        });
        states
            .iter()
            .zip(observation.outputs.iter())
            .for_each(|(s, o)| {
                check!((s == "a" && o == "x") || (s == "b" && o == "y"));
            });
        Ok(())
    }

    #[test]
    fn test_generate_missing_emissions() {
        let transitions = ProbabilityTable::from_records([("a", "a", 1.0)]);
        let emissions = ProbabilityTable::from_records([("b", "x", 1.0)]);
        let model = Model::new(transitions, emissions);

        let result = generate(&model, 3, &mut Pcg64::seed_from_u64(3));
        let_assert!(Err(err) = result);
        let_assert!(Some(SamplingError::MissingEmission { state, .. }) = err.downcast_ref::<SamplingError>());
        check!(state == "a");
    }

    #[test]
    fn test_generate_missing_transitions() {
        let transitions = ProbabilityTable::from_records([("a", "a", 0.0)]);
        let emissions = ProbabilityTable::from_records([("a", "x", 1.0)]);
        let model = Model::new(transitions, emissions);

        let result = generate(&model, 1, &mut Pcg64::seed_from_u64(3));
        let_assert!(Err(err) = result);
        let_assert!(Some(SamplingError::MissingTransition { .. }) = err.downcast_ref::<SamplingError>());
    }

    #[test]
    fn test_generate_keeps_weight_on_non_state_destinations() {
        let transitions = ProbabilityTable::from_records([("a", "a", 0.5), ("a", "ghost", 0.5)]);
        let emissions = ProbabilityTable::from_records([("a", "x", 1.0)]);
        let model = Model::new(transitions, emissions);

        for seed in 0..20 {
            let result = generate(&model, 60, &mut Pcg64::seed_from_u64(seed));
            let_assert!(Err(err) = result);
            let_assert!(
                Some(SamplingError::UnknownDestination { state, destination }) =
                    err.downcast_ref::<SamplingError>()
            );
            check!(state == "a");
            check!(destination == "ghost");
        }
    }

    #[test]
    fn test_generate_empty_model() {
        let model = Model::new(ProbabilityTable::new(), ProbabilityTable::new());
        let result = generate(&model, 3, &mut Pcg64::seed_from_u64(3));
        let_assert!(Err(err) = result);
        check!(err.downcast_ref::<EmptyModelError>().is_some());
    }
}
