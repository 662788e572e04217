//! Labeled dataset construction.
//!
//! Two sources feed the training pipeline:
//!
//! - `synthetic`: clinically plausible draws labeled by a priority-ordered
//!   rule cascade (used when no real dataset file is supplied)
//! - `csv`: file-backed datasets with a binary or multi-level `target` column

pub mod csv;
pub mod synthetic;

pub use csv::*;
pub use synthetic::*;
