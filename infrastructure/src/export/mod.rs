//! Analysis export files

mod design_matrix;

pub use design_matrix::{write_design_matrix, write_json};
