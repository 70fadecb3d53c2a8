use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::structs::Model;

/// An ordered sequence of output symbols, optionally
/// paired with the hidden states that produced them.
///
/// The states are only ever known for generated observations (or hand
/// labeled data); they are carried along for display and testing and are
/// never consulted during inference.
#[derive(Default, Clone, Debug, PartialEq, Serialize)]
pub struct Observation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
    pub outputs: Vec<String>,
}

impl Observation {
    pub fn new(outputs: Vec<String>) -> Self {
        Self {
            states: None,
            outputs,
        }
    }

    pub fn with_states(states: Vec<String>, outputs: Vec<String>) -> Self {
        debug_assert_eq!(states.len(), outputs.len());
        Self {
            states: Some(states),
            outputs,
        }
    }

    /// Split a string into output symbols on whitespace.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split_whitespace().map(String::from).collect())
    }

    /// Read an observation file, treating its entire contents as a single observation.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = read_observation_file(path.as_ref())?;
        Ok(Self::parse(&text))
    }

    /// Read an observation file, treating every non-blank line as its own observation.
    pub fn lines_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let text = read_observation_file(path.as_ref())?;
        Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Self::parse)
            .collect())
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Map every output symbol to its index in the model's output alphabet.
    ///
    /// Symbols the model has never seen map to `None`.
    pub fn digitize(&self, model: &Model) -> Vec<Option<usize>> {
        self.outputs
            .iter()
            .map(|symbol| model.outputs().index_of(symbol))
            .collect()
    }
}

fn read_observation_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| {
        format!(
            "failed to read observation file: {}",
            path.to_string_lossy()
        )
    })
}

impl Display for Observation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(ref states) = self.states {
            writeln!(f, "{}", states.join(" "))?;
        }
        write!(f, "{}", self.outputs.join(" "))
    }
}
