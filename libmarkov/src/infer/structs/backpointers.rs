/// A state × time lattice of previous-state indices.
///
/// The cell at `(state, t)` holds the index of the state at `t - 1` that
/// contributed the best score to `(state, t)`. The cells of the first
/// time step are unused and hold 0.
#[derive(Default, Clone, Debug)]
pub struct Backpointers {
    pub num_states: usize,
    pub length: usize,
    pub data: Vec<usize>,
}

impl Backpointers {
    pub fn new(num_states: usize, length: usize) -> Self {
        Self {
            num_states,
            length,
            data: vec![0; num_states * length],
        }
    }

    pub fn reuse(&mut self, num_states: usize, length: usize) {
        let new_size = num_states * length;
        if new_size > self.data.len() {
            self.data.resize(new_size, 0);
        }
        self.num_states = num_states;
        self.length = length;

        self.data[..new_size].iter_mut().for_each(|v| *v = 0);
    }

    #[inline]
    pub fn get(&self, state_idx: usize, time_idx: usize) -> usize {
        debug_assert!(state_idx < self.num_states);
        debug_assert!(time_idx < self.length);
        self.data[time_idx * self.num_states + state_idx]
    }

    #[inline]
    pub fn set(&mut self, state_idx: usize, time_idx: usize, prev_state_idx: usize) {
        debug_assert!(state_idx < self.num_states);
        debug_assert!(time_idx < self.length);
        debug_assert!(prev_state_idx < self.num_states);
        self.data[time_idx * self.num_states + state_idx] = prev_state_idx;
    }
}
