use crate::structs::Model;

/// A recovered hidden state path.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Trace {
    /// The state index at every time step, in observation order
    pub states: Vec<usize>,
    /// The lattice value of the final state of the path
    pub score: f64,
}

impl Trace {
    pub fn new(length: usize) -> Self {
        Trace {
            states: vec![0; length],
            score: 0.0,
        }
    }

    pub fn reuse(&mut self, length: usize) {
        self.states.clear();
        self.states.resize(length, 0);
        self.score = 0.0;
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The path as state names.
    pub fn labels<'a>(&self, model: &'a Model) -> Vec<&'a str> {
        self.states
            .iter()
            .map(|&state_idx| model.states().symbol(state_idx))
            .collect()
    }
}
