pub mod error;
pub mod matrix;

pub use error::{HardnessError, HardnessResult};
pub use matrix::Matrix;
