use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::alphabet::Alphabet;
use crate::structs::ProbabilityTable;

/// The file extension of a model's transition table.
pub const TRANSITION_EXTENSION: &str = "trans";
/// The file extension of a model's emission table.
pub const EMISSION_EXTENSION: &str = "emit";

/// A discrete Hidden Markov Model.
///
/// The set of hidden states is exactly the set of outer keys of the transition
/// table, indexed in the order they first appear. The outputs are every symbol
/// found in the emission table, indexed the same way. Those two index tables are
/// built once, along with dense copies of both probability tables:
///
/// ```text
/// transition_matrix[from * S + to]
/// emission_matrix[state * O + output]
/// ```
///
/// where S is the number of states and O is the number of output symbols. Any
/// pair that is absent from the source tables is stored as zero. The source
/// tables themselves are kept so that the probabilities can be queried by name,
/// including pairs that fall outside of the state set.
#[derive(Clone, Debug)]
pub struct Model {
    /// The name of the model, usually the basename of its table files
    pub name: String,
    states: Alphabet,
    outputs: Alphabet,
    transition_matrix: Vec<f64>,
    emission_matrix: Vec<f64>,
    transitions: ProbabilityTable,
    emissions: ProbabilityTable,
}

impl Model {
    pub fn new(transitions: ProbabilityTable, emissions: ProbabilityTable) -> Self {
        let states: Alphabet = transitions.keys().collect();
        let outputs: Alphabet = emissions.records().map(|r| r.to).collect();

        let num_states = states.len();
        let num_outputs = outputs.len();

        let mut transition_matrix = vec![0.0; num_states * num_states];
        transitions.records().for_each(|record| {
            // destinations that never appear as a source aren't states
            if let (Some(from_idx), Some(to_idx)) =
                (states.index_of(record.from), states.index_of(record.to))
            {
                transition_matrix[from_idx * num_states + to_idx] = record.probability;
            }
        });

        let mut emission_matrix = vec![0.0; num_states * num_outputs];
        emissions.records().for_each(|record| {
            if let (Some(state_idx), Some(output_idx)) =
                (states.index_of(record.from), outputs.index_of(record.to))
            {
                emission_matrix[state_idx * num_outputs + output_idx] = record.probability;
            }
        });

        Self {
            name: String::new(),
            states,
            outputs,
            transition_matrix,
            emission_matrix,
            transitions,
            emissions,
        }
    }

    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        transition_path: P,
        emission_path: Q,
    ) -> Result<Self> {
        let transitions = ProbabilityTable::from_path(&transition_path)?;
        let emissions = ProbabilityTable::from_path(&emission_path)?;

        let model = Self::new(transitions, emissions);

        log::info!(
            "loaded model with {} states and {} output symbols from: {}, {}",
            model.num_states(),
            model.num_outputs(),
            transition_path.as_ref().to_string_lossy(),
            emission_path.as_ref().to_string_lossy(),
        );

        let missing_rows = model
            .states
            .iter()
            .filter(|s| model.emissions.row(s).is_none())
            .count();
        if missing_rows > 0 {
            log::warn!("{missing_rows} states have no emission probabilities");
        }

        Ok(model)
    }

    /// Load a model from `<basename>.trans` and `<basename>.emit`.
    pub fn from_basename<P: AsRef<Path>>(basename: P) -> Result<Self> {
        let basename = basename.as_ref();
        let mut model = Self::from_paths(
            with_extension(basename, TRANSITION_EXTENSION),
            with_extension(basename, EMISSION_EXTENSION),
        )?;

        model.name = basename
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(model)
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn states(&self) -> &Alphabet {
        &self.states
    }

    pub fn outputs(&self) -> &Alphabet {
        &self.outputs
    }

    pub fn transition_table(&self) -> &ProbabilityTable {
        &self.transitions
    }

    pub fn emission_table(&self) -> &ProbabilityTable {
        &self.emissions
    }

    #[inline]
    pub fn transition(&self, from_idx: usize, to_idx: usize) -> f64 {
        debug_assert!(from_idx < self.num_states());
        debug_assert!(to_idx < self.num_states());
        self.transition_matrix[from_idx * self.num_states() + to_idx]
    }

    /// The probability of `state_idx` emitting the output at `output_idx`.
    ///
    /// `None` stands for a symbol that is not in the model's output
    /// alphabet, which no state can emit.
    #[inline]
    pub fn emission(&self, state_idx: usize, output_idx: Option<usize>) -> f64 {
        debug_assert!(state_idx < self.num_states());
        match output_idx {
            Some(output_idx) => {
                debug_assert!(output_idx < self.num_outputs());
                self.emission_matrix[state_idx * self.num_outputs() + output_idx]
            }
            None => 0.0,
        }
    }

    /// The dense transition probabilities out of `from_idx`, indexed by state.
    pub fn transition_row(&self, from_idx: usize) -> &[f64] {
        let start = from_idx * self.num_states();
        &self.transition_matrix[start..start + self.num_states()]
    }

    /// The dense emission probabilities of `state_idx`, indexed by output symbol.
    pub fn emission_row(&self, state_idx: usize) -> &[f64] {
        let start = state_idx * self.num_outputs();
        &self.emission_matrix[start..start + self.num_outputs()]
    }

    /// The transition probability between two named states, or 0 if it wasn't given.
    pub fn transition_probability(&self, from: &str, to: &str) -> f64 {
        self.transitions.get(from, to).unwrap_or(0.0)
    }

    /// The emission probability of a named state and symbol, or 0 if it wasn't given.
    pub fn emission_probability(&self, state: &str, output: &str) -> f64 {
        self.emissions.get(state, output).unwrap_or(0.0)
    }
}

fn with_extension(basename: &Path, extension: &str) -> PathBuf {
    // Path::with_extension would replace anything after a dot in the basename
    let mut path = OsString::from(basename.as_os_str());
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert2::check;

    pub fn cat_model() -> Model {
        let transitions = ProbabilityTable::from_records([
            ("Happy", "Happy", 0.6),
            ("Happy", "Grumpy", 0.4),
            ("Grumpy", "Happy", 0.3),
            ("Grumpy", "Grumpy", 0.7),
        ]);
        let emissions = ProbabilityTable::from_records([
            ("Happy", "meow", 0.8),
            ("Happy", "purr", 0.2),
            ("Grumpy", "meow", 0.3),
            ("Grumpy", "purr", 0.7),
        ]);
        Model::new(transitions, emissions)
    }

    #[test]
    fn test_model_state_order_follows_transition_keys() {
        let model = cat_model();
        check!(model.num_states() == 2);
        check!(model.states().iter().collect::<Vec<_>>() == vec!["Happy", "Grumpy"]);
        check!(model.outputs().iter().collect::<Vec<_>>() == vec!["meow", "purr"]);
    }

    #[test]
    fn test_model_dense_lookups() {
        let model = cat_model();
        check!(model.transition(0, 1) == 0.4);
        check!(model.transition(1, 0) == 0.3);
        check!(model.emission(1, Some(1)) == 0.7);
        check!(model.emission(0, None) == 0.0);
        check!(model.transition_row(1) == &[0.3, 0.7][..]);
        check!(model.emission_row(0) == &[0.8, 0.2][..]);
    }

    #[test]
    fn test_model_named_lookups_round_trip() -> anyhow::Result<()> {
        let trans_text = "s1 s1 0.25\ns1 s2 0.75\ns1 nowhere 0.125\ns2 s1 1.0\n";
        let emit_text = "s1 x 0.1\ns2 y 0.9\nghost z 0.5\n";

        let transitions = crate::structs::parse_table(trans_text.as_bytes(), "t")?;
        let emissions = crate::structs::parse_table(emit_text.as_bytes(), "e")?;
        let model = Model::new(transitions.clone(), emissions.clone());

        transitions
            .records()
            .for_each(|r| {
                check!(model.transition_probability(r.from, r.to) == r.probability);
            });
        emissions
            .records()
            .for_each(|r| {
                check!(model.emission_probability(r.from, r.to) == r.probability);
            });

        // misses are zero, not errors
        check!(model.transition_probability("s2", "s2") == 0.0);
        check!(model.emission_probability("s1", "y") == 0.0);
        check!(model.emission_probability("unknown", "x") == 0.0);

        // "nowhere" isn't a source state, so it isn't part of the state set
        check!(model.num_states() == 2);
        check!(model.transition_row(0) == &[0.25, 0.75][..]);

        // rows of non-states are kept in the table but don't reach the dense matrix
        check!(model.num_outputs() == 3);
        check!(model.emission_row(0) == &[0.1, 0.0, 0.0][..]);
        Ok(())
    }

    #[test]
    fn test_model_from_basename() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("libmarkov-model-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let basename = dir.join("cat.v2");

        std::fs::write(
            with_extension(&basename, TRANSITION_EXTENSION),
            "# cat moods\nHappy Happy 0.6\nHappy Grumpy 0.4\n\nGrumpy Happy 0.3\nGrumpy Grumpy 0.7\n",
        )?;
        std::fs::write(
            with_extension(&basename, EMISSION_EXTENSION),
            "Happy meow 0.8\nHappy purr 0.2\nGrumpy meow 0.3\nGrumpy purr 0.7\n",
        )?;

        let model = Model::from_basename(&basename)?;
        let expected = cat_model();

        check!(model.name == "cat.v2");
        check!(model.states().iter().collect::<Vec<_>>() == vec!["Happy", "Grumpy"]);
        check!(model.outputs().iter().collect::<Vec<_>>() == vec!["meow", "purr"]);
        (0..2).for_each(|from| {
            check!(model.transition_row(from) == expected.transition_row(from));
            check!(model.emission_row(from) == expected.emission_row(from));
        });

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_model_from_basename_missing_files() {
        let basename = std::env::temp_dir().join(format!(
            "libmarkov-missing-{}/nothing",
            std::process::id()
        ));
        check!(Model::from_basename(&basename).is_err());
    }

    #[test]
    fn test_with_extension_keeps_dots() {
        let path = with_extension(Path::new("data/part.of.speech"), TRANSITION_EXTENSION);
        check!(path == PathBuf::from("data/part.of.speech.trans"));
    }
}
