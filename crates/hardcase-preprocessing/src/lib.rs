pub mod encoder;
pub mod imputer;

pub use encoder::*;
pub use imputer::*;
