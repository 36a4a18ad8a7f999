pub mod dataset;
pub mod labels;

pub use dataset::*;
pub use labels::*;
