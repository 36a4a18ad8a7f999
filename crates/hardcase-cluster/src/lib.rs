pub mod agglomerative;

pub use agglomerative::*;
