pub mod structs;

mod forward;
pub use forward::{forward, forward_log, terminal_state};

mod viterbi;
pub use viterbi::{viterbi, viterbi_log};

mod traceback;
pub use traceback::traceback;

mod generate;
pub use generate::{generate, SamplingError};

use std::fmt::{Display, Formatter};

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

use crate::structs::{Model, Observation};
use structs::{Backpointers, DpMatrixFlat, Trace};

#[derive(Error, Debug)]
#[error("the model has no states")]
pub struct EmptyModelError;

#[derive(Error, Debug)]
#[error("the observation has no symbols")]
pub struct EmptyObservationError;

/// An Error that is thrown by strict Viterbi when every
/// state path through the observation has probability zero.
#[derive(Error, Debug)]
#[error("no state path through the {length} symbol observation has a nonzero probability")]
pub struct NoViablePathError {
    pub length: usize,
}

/// The number space that DP lattice values are kept in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Plain probabilities
    #[default]
    Linear,
    /// Natural log probabilities
    Log,
}

impl Domain {
    /// The value that stands for a probability of zero.
    pub fn zero(&self) -> f64 {
        match self {
            Domain::Linear => 0.0,
            Domain::Log => -f64::INFINITY,
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Linear => write!(f, "linear"),
            Domain::Log => write!(f, "log"),
        }
    }
}

/// The most likely final state of an observation under the forward algorithm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminalState {
    pub state_idx: usize,
    /// The forward value of the state, in `domain`
    pub value: f64,
    pub domain: Domain,
}

impl TerminalState {
    /// The forward value as a plain probability.
    pub fn probability(&self) -> f64 {
        match self.domain {
            Domain::Linear => self.value,
            Domain::Log => self.value.exp(),
        }
    }

    pub fn name<'a>(&self, model: &'a Model) -> &'a str {
        model.states().symbol(self.state_idx)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ViterbiParams {
    pub domain: Domain,
    /// Return a [`NoViablePathError`] instead of the
    /// fallback path when every path has probability zero.
    pub strict: bool,
}

fn digitize_checked(model: &Model, observation: &Observation) -> Result<Vec<Option<usize>>> {
    if model.num_states() == 0 {
        return Err(EmptyModelError.into());
    }
    if observation.is_empty() {
        return Err(EmptyObservationError.into());
    }

    let digital = observation.digitize(model);

    let unknown = digital.iter().filter(|d| d.is_none()).count();
    if unknown > 0 {
        log::debug!("{unknown} observed symbols are not emitted by any state");
    }

    Ok(digital)
}

/// Run the forward algorithm and report the most likely final state.
///
/// `dp_matrix` is reshaped to fit and holds the full lattice afterwards.
pub fn most_likely_state(
    model: &Model,
    observation: &Observation,
    domain: Domain,
    dp_matrix: &mut DpMatrixFlat,
) -> Result<TerminalState> {
    let digital = digitize_checked(model, observation)?;

    dp_matrix.reuse(model.num_states(), digital.len());
    match domain {
        Domain::Linear => forward(model, &digital, dp_matrix),
        Domain::Log => forward_log(model, &digital, dp_matrix),
    }

    let best = terminal_state(dp_matrix, domain);
    log::debug!(
        "forward: {} states x {} steps, best final state {} ({})",
        model.num_states(),
        digital.len(),
        best.name(model),
        best.value
    );

    Ok(best)
}

/// Run the Viterbi algorithm and recover the most likely state path.
///
/// `dp_matrix` and `backpointers` are reshaped to fit and hold the full
/// lattices afterwards.
///
/// When every path has probability zero, the lattice gives no real answer and
/// the recovered path is whatever the all-zero fallbacks point at (state 0 at
/// the end, then the first state of each tied cell). That path is returned with
/// a warning, unless `params.strict` is set, in which case it is an error.
pub fn most_likely_path(
    model: &Model,
    observation: &Observation,
    params: &ViterbiParams,
    dp_matrix: &mut DpMatrixFlat,
    backpointers: &mut Backpointers,
) -> Result<Trace> {
    let digital = digitize_checked(model, observation)?;

    dp_matrix.reuse(model.num_states(), digital.len());
    backpointers.reuse(model.num_states(), digital.len());
    match params.domain {
        Domain::Linear => viterbi(model, &digital, dp_matrix, backpointers),
        Domain::Log => viterbi_log(model, &digital, dp_matrix, backpointers),
    }

    let mut trace = Trace::new(digital.len());
    traceback(dp_matrix, backpointers, params.domain, &mut trace);

    log::debug!(
        "viterbi: {} states x {} steps, path score {}",
        model.num_states(),
        digital.len(),
        trace.score
    );

    if trace.score == params.domain.zero() {
        if params.strict {
            return Err(NoViablePathError {
                length: digital.len(),
            }
            .into());
        }
        log::warn!(
            "every state path through the {} symbol observation has probability zero; \
             the reported path is a fallback through the lowest state indices",
            digital.len()
        );
    }

    Ok(trace)
}
