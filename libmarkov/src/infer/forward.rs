use crate::infer::structs::DpMatrix;
use crate::infer::{Domain, TerminalState};
use crate::log_sum;
use crate::structs::Model;
use crate::util::{LogAbuse, VecMath};

/// Fill `dp_matrix` with forward probabilities.
///
/// The cell at `(s, t)` holds the probability of the first `t + 1` symbols of
/// the observation with the model in state `s` at step `t`. Every state starts
/// with the same prior probability of `1 / S`. The arithmetic is done directly
/// on probabilities, so long observations will underflow towards zero; see
/// [`forward_log`] for the log space version.
///
/// The matrix must already be shaped `model.num_states()` × `observation.len()`.
pub fn forward(model: &Model, observation: &[Option<usize>], dp_matrix: &mut impl DpMatrix) {
    let num_states = model.num_states();
    debug_assert_eq!(dp_matrix.num_states(), num_states);
    debug_assert_eq!(dp_matrix.length(), observation.len());

    let prior = 1.0 / num_states as f64;

    for state_idx in 0..num_states {
        dp_matrix.set(state_idx, 0, prior * model.emission(state_idx, observation[0]));
    }

    for (time_idx, &output) in observation.iter().enumerate().skip(1) {
        for state_idx in 0..num_states {
            let emission = model.emission(state_idx, output);

            let mut sum = 0.0;
            for prev_state_idx in 0..num_states {
                sum += dp_matrix.get(prev_state_idx, time_idx - 1)
                    * model.transition(prev_state_idx, state_idx)
                    * emission;
            }

            dp_matrix.set(state_idx, time_idx, sum);
        }
    }
}

/// Fill `dp_matrix` with natural log forward probabilities.
///
/// This follows the same recurrence as [`forward`], but the sums are taken in
/// log space. Zero probabilities become negative infinity.
pub fn forward_log(model: &Model, observation: &[Option<usize>], dp_matrix: &mut impl DpMatrix) {
    let num_states = model.num_states();
    debug_assert_eq!(dp_matrix.num_states(), num_states);
    debug_assert_eq!(dp_matrix.length(), observation.len());

    let log_prior = (1.0 / num_states as f64).ln();

    for state_idx in 0..num_states {
        dp_matrix.set(
            state_idx,
            0,
            log_prior + model.emission(state_idx, observation[0]).ln_or_inf(),
        );
    }

    for (time_idx, &output) in observation.iter().enumerate().skip(1) {
        for state_idx in 0..num_states {
            let log_emission = model.emission(state_idx, output).ln_or_inf();

            let mut sum = -f64::INFINITY;
            for prev_state_idx in 0..num_states {
                sum = log_sum!(
                    sum,
                    dp_matrix.get(prev_state_idx, time_idx - 1)
                        + model.transition(prev_state_idx, state_idx).ln_or_inf()
                );
            }

            dp_matrix.set(state_idx, time_idx, sum + log_emission);
        }
    }
}

/// Pick the state with the greatest value in the last column of a filled forward matrix.
///
/// Ties go to the state with the lowest index, so a column of all zeros
/// reports the first state.
pub fn terminal_state(dp_matrix: &impl DpMatrix, domain: Domain) -> TerminalState {
    let last_column = dp_matrix.column(dp_matrix.length() - 1);
    let state_idx = last_column.argmax().unwrap_or(0);

    TerminalState {
        state_idx,
        value: last_column[state_idx],
        domain,
    }
}
