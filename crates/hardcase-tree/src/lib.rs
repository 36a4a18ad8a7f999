pub mod decision_tree;
pub mod leaves;

pub use decision_tree::*;
pub use leaves::*;
