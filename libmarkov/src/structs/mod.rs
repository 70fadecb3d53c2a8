pub mod model;
pub use model::Model;

pub mod observation;
pub use observation::Observation;

pub mod table;
pub use table::{parse_table, ProbabilityTable, TableRecord};
