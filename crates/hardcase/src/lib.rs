//! # hardcase
//!
//! Instance hardness and data complexity measures for labelled, mixed-type datasets.
//!
//! ## Modules
//!
//! - **core** — `HardnessError`, dense row-major `Matrix`
//! - **data** — typed `Dataset` (numeric, nominal and string columns, class label last), `Labels`
//! - **preprocessing** — `Encoder`: one-hot over declared values, mean / most-frequent imputation
//! - **neighbors** — Euclidean distances, brute-force kNN, minimum spanning tree, local outlier factor
//! - **cluster** — single-linkage agglomerative clustering cut at a distance threshold
//! - **tree** — CART decision tree with leaf ids, depths and per-leaf class histograms
//! - **likelihood** — 1-D kernel density estimation, per-class attribute models
//! - **measures** — the measure `Registry`: N1, N2, KDN, CLOF, DS, DCP, TD, TDWithPruning,
//!   CL, CLD, F2, F3, F4, CB, MV, T1, T2; score-quantile row selection
//!
//! ```no_run
//! use hardcase::data::{Attribute, Dataset, Value};
//! use hardcase::measures::{Interrupt, MeasureSuite, Registry};
//!
//! let ds = Dataset::new(
//!     vec![Attribute::numeric("x"), Attribute::nominal("class", ["a", "b"])],
//!     vec![
//!         vec![Value::from(0.0), Value::from("a")],
//!         vec![Value::from(1.0), Value::from("b")],
//!     ],
//! )?;
//! let suite = MeasureSuite::from_json(r#"{"N1": {}, "MV": {}}"#)?;
//! let enriched = Registry::standard().enrich(&ds, &suite, &Interrupt::new())?;
//! assert!(enriched.failures.is_empty());
//! # Ok::<(), hardcase::core::HardnessError>(())
//! ```

/// Error type and matrix.
pub use hardcase_core as core;

/// Typed datasets and labels.
pub use hardcase_data as data;

/// Dataset encoding.
pub use hardcase_preprocessing as preprocessing;

/// Nearest neighbors, spanning trees and local outlier factor.
pub use hardcase_neighbors as neighbors;

/// Clustering.
pub use hardcase_cluster as cluster;

/// Decision trees.
pub use hardcase_tree as tree;

/// Density estimation.
pub use hardcase_likelihood as likelihood;

/// Complexity measures and their registry.
pub use hardcase_measures as measures;

pub use hardcase_core::{HardnessError, HardnessResult};
pub use hardcase_data::Dataset;
pub use hardcase_measures::{Interrupt, MeasureSuite, Registry, Scores};
