use std::io::Write;

use anyhow::Result;

use crate::alphabet::Alphabet;

/// A state × time lattice of probabilities.
pub trait DpMatrix {
    fn num_states(&self) -> usize;
    fn length(&self) -> usize;
    fn get(&self, state_idx: usize, time_idx: usize) -> f64;
    fn set(&mut self, state_idx: usize, time_idx: usize, value: f64);
    /// The values of every state at one time step, in state index order.
    fn column(&self, time_idx: usize) -> &[f64];
    fn dump(&self, out: &mut impl Write, states: &Alphabet) -> Result<()> {
        let state_width = states.iter().map(|s| s.len()).max().unwrap_or(0).max(1);
        let column_width = 13;
        let precision = 6;

        // write the time indices
        write!(out, "{}", " ".repeat(state_width + 1))?;
        for time_idx in 0..self.length() {
            write!(out, "{:>w$} ", time_idx, w = column_width)?;
        }
        writeln!(out)?;

        write!(out, "{}", " ".repeat(state_width + 1))?;
        for _ in 0..self.length() {
            write!(out, "   {} ", "-".repeat(column_width - 3))?;
        }
        writeln!(out)?;

        for state_idx in 0..self.num_states() {
            write!(out, "{:>w$} ", states.symbol(state_idx), w = state_width)?;
            for time_idx in 0..self.length() {
                write!(
                    out,
                    "{:>w$.p$e} ",
                    self.get(state_idx, time_idx),
                    w = column_width,
                    p = precision
                )?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;

        Ok(())
    }
}

#[derive(Default, Clone, Debug)]
pub struct DpMatrixFlat {
    pub num_states: usize,
    pub length: usize,
    /// The DP matrix cells as a flat vector.
    //
    // the data is stored one time step after another:
    //     [
    //
    //         v_(0, 0), v_(1, 0), ..., v_(S-1, 0),
    //         v_(0, 1), v_(1, 1), ..., v_(S-1, 1),
    //         ...
    //         v_(0, N-1), v_(1, N-1), ..., v_(S-1, N-1)
    //
    //     ]
    //
    // where:
    //
    //     S:        <num_states>
    //     N:        <length>
    //     v_(s, t): the value for state s at time step t
    //
    pub data: Vec<f64>,
}

impl DpMatrixFlat {
    pub fn new(num_states: usize, length: usize) -> Self {
        DpMatrixFlat {
            num_states,
            length,
            data: vec![0.0; num_states * length],
        }
    }

    /// Reshape the matrix for a new lattice, growing the allocation
    /// if needed, and zero every cell in the new shape.
    pub fn reuse(&mut self, num_states: usize, length: usize) {
        let new_size = num_states * length;
        if new_size > self.data.len() {
            self.data.resize(new_size, 0.0);
        }
        self.num_states = num_states;
        self.length = length;

        self.data[..new_size].iter_mut().for_each(|v| *v = 0.0);
    }
}

impl DpMatrix for DpMatrixFlat {
    fn num_states(&self) -> usize {
        self.num_states
    }

    fn length(&self) -> usize {
        self.length
    }

    #[inline]
    fn get(&self, state_idx: usize, time_idx: usize) -> f64 {
        debug_assert!(state_idx < self.num_states);
        debug_assert!(time_idx < self.length);
        self.data[time_idx * self.num_states + state_idx]
    }

    #[inline]
    fn set(&mut self, state_idx: usize, time_idx: usize, value: f64) {
        debug_assert!(state_idx < self.num_states);
        debug_assert!(time_idx < self.length);
        self.data[time_idx * self.num_states + state_idx] = value;
    }

    #[inline]
    fn column(&self, time_idx: usize) -> &[f64] {
        debug_assert!(time_idx < self.length);
        let start = time_idx * self.num_states;
        &self.data[start..start + self.num_states]
    }
}
