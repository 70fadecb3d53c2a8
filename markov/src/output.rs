use std::io::Write;

use anyhow::Result;
use libmarkov::infer::{structs::Trace, Domain, TerminalState};
use libmarkov::structs::{Model, Observation};
use serde::Serialize;

use crate::args::OutputFormat;

/// One result of a markov run, in the order it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Report {
    Generate {
        #[serde(flatten)]
        observation: Observation,
    },
    Viterbi {
        /// The index of the observation within its file
        index: usize,
        path: Vec<String>,
        score: f64,
        domain: Domain,
    },
    Forward {
        index: usize,
        state: String,
        value: f64,
        probability: f64,
        domain: Domain,
    },
}

impl Report {
    pub fn viterbi(index: usize, trace: &Trace, model: &Model, domain: Domain) -> Self {
        Report::Viterbi {
            index,
            path: trace.labels(model).into_iter().map(String::from).collect(),
            score: trace.score,
            domain,
        }
    }

    pub fn forward(index: usize, terminal: &TerminalState, model: &Model) -> Self {
        Report::Forward {
            index,
            state: terminal.name(model).to_string(),
            value: terminal.value,
            probability: terminal.probability(),
            domain: terminal.domain,
        }
    }

    /// The plain text rendering:
    ///   - generate: the state sequence, then the output sequence on the next line
    ///   - viterbi: the state sequence
    ///   - forward: the final state and its forward value
    pub fn text(&self) -> String {
        match self {
            Report::Generate { observation } => observation.to_string(),
            Report::Viterbi { path, .. } => path.join(" "),
            Report::Forward { state, value, .. } => format!("{state} {}", format_value(*value)),
        }
    }

    pub fn write(&self, out: &mut impl Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Text => writeln!(out, "{}", self.text())?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, self)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

/// Plain notation for ordinary magnitudes, scientific notation for the
/// tiny (or huge) values that long observations underflow to.
fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || !value.is_finite() || (1e-4..1e6).contains(&magnitude) {
        format!("{value}")
    } else {
        format!("{value:e}")
    }
}
