//! Problem decomposition for large instances.
//!
//! - [`ProblemSplitter`] — Groups nearby clusters into independent sub-problems and merges results

mod config;
mod splitter;

pub use config::SplitterConfig;
pub use splitter::{ProblemSplitter, Subproblem};
