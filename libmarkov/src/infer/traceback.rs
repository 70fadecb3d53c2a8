use crate::infer::structs::{Backpointers, DpMatrix, Trace};
use crate::infer::Domain;
use crate::util::VecMath;

/// Recover the best state path from a filled Viterbi matrix and its backpointers.
///
/// The path ends in the state with the greatest value in the last column, where
/// a state only takes the lead by being strictly greater than every state before
/// it and than the domain's zero. If no state clears that bar, the path ends in
/// state 0. From there, each step follows the backpointer of the step after it.
pub fn traceback(
    dp_matrix: &impl DpMatrix,
    backpointers: &Backpointers,
    domain: Domain,
    trace: &mut Trace,
) {
    let length = dp_matrix.length();
    debug_assert!(length > 0);
    debug_assert_eq!(backpointers.length, length);

    trace.reuse(length);

    let last_time_idx = length - 1;
    let (best_state_idx, score) = dp_matrix.column(last_time_idx).argmax_above(domain.zero());

    trace.states[last_time_idx] = best_state_idx;
    trace.score = score;

    for time_idx in (0..last_time_idx).rev() {
        trace.states[time_idx] = backpointers.get(trace.states[time_idx + 1], time_idx + 1);
    }
}
