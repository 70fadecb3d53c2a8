mod backpointers;
pub use backpointers::Backpointers;

mod dp_matrix;
pub use dp_matrix::{DpMatrix, DpMatrixFlat};

mod trace;
pub use trace::Trace;
