//! Artifact persistence.
//!
//! The model store reads/writes the paired classifier + normalization
//! artifact (plus the evaluation report) under a caller-supplied directory.

pub mod artifact;

pub use artifact::*;
