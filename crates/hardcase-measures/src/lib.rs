pub mod balance;
pub mod geometric;
pub mod interrupt;
pub mod likelihood;
pub mod measure;
pub mod overlap;
pub mod params;
pub mod registry;
pub mod selection;
pub mod structural;
pub mod tree_based;

#[cfg(test)]
pub(crate) mod fixtures;

pub use interrupt::Interrupt;
pub use measure::{DataKind, Measure, MeasureInput, Scores};
pub use params::Params;
pub use registry::{Enrichment, MeasureSuite, Registry};
pub use selection::{quantile, remove_top_percentage};
