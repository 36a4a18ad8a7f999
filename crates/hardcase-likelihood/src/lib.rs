pub mod class_model;
pub mod kde;

pub use class_model::*;
pub use kde::*;
