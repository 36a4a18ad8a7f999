pub mod distance;
pub mod knn;
pub mod lof;
pub mod mst;

pub use distance::*;
pub use knn::*;
pub use lof::*;
pub use mst::*;
