use crate::infer::structs::{Backpointers, DpMatrix};
use crate::structs::Model;
use crate::util::LogAbuse;

/// Fill `dp_matrix` with the probability of the best state path ending in each
/// cell, and `backpointers` with the previous state on that path.
///
/// Every state starts with a prior of `1 / S`. For each cell, the candidate
/// previous states are scanned in index order and the running best only moves
/// on a strictly greater value, so ties go to the lowest index. The running
/// best starts at zero: a cell whose candidates are all zero stores a zero and
/// points back to state 0, even though no path actually reaches it.
///
/// Both must already be shaped `model.num_states()` × `observation.len()`.
pub fn viterbi(
    model: &Model,
    observation: &[Option<usize>],
    dp_matrix: &mut impl DpMatrix,
    backpointers: &mut Backpointers,
) {
    let num_states = model.num_states();
    debug_assert_eq!(dp_matrix.num_states(), num_states);
    debug_assert_eq!(dp_matrix.length(), observation.len());

    let prior = 1.0 / num_states as f64;

    for state_idx in 0..num_states {
        dp_matrix.set(state_idx, 0, prior * model.emission(state_idx, observation[0]));
        backpointers.set(state_idx, 0, 0);
    }

    for (time_idx, &output) in observation.iter().enumerate().skip(1) {
        for state_idx in 0..num_states {
            let emission = model.emission(state_idx, output);

            let mut max_probability = 0.0;
            let mut best_prev_state_idx = 0;

            for prev_state_idx in 0..num_states {
                let probability = dp_matrix.get(prev_state_idx, time_idx - 1)
                    * model.transition(prev_state_idx, state_idx)
                    * emission;

                if probability > max_probability {
                    max_probability = probability;
                    best_prev_state_idx = prev_state_idx;
                }
            }

            dp_matrix.set(state_idx, time_idx, max_probability);
            backpointers.set(state_idx, time_idx, best_prev_state_idx);
        }
    }
}

/// The log space version of [`viterbi`].
///
/// Cells hold natural log probabilities and the running best starts at
/// negative infinity, so the tie breaking and the fallback to state 0
/// behave the same as the linear version for non-negative inputs.
pub fn viterbi_log(
    model: &Model,
    observation: &[Option<usize>],
    dp_matrix: &mut impl DpMatrix,
    backpointers: &mut Backpointers,
) {
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
        backpointers.set(state_idx, 0, 0);
    }

    for (time_idx, &output) in observation.iter().enumerate().skip(1) {
        for state_idx in 0..num_states {
            let log_emission = model.emission(state_idx, output).ln_or_inf();

            let mut max_score = -f64::INFINITY;
            let mut best_prev_state_idx = 0;

            for prev_state_idx in 0..num_states {
                let score = dp_matrix.get(prev_state_idx, time_idx - 1)
                    + model.transition(prev_state_idx, state_idx).ln_or_inf()
                    + log_emission;

                if score > max_score {
                    max_score = score;
                    best_prev_state_idx = prev_state_idx;
                }
            }

            dp_matrix.set(state_idx, time_idx, max_score);
            backpointers.set(state_idx, time_idx, best_prev_state_idx);
        }
    }
}
