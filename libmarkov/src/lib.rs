pub mod alphabet;
pub mod infer;
pub mod structs;
pub mod util;
