//! `cardiorisk` library crate.
//!
//! The binary (`cardiorisk`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., a future HTTP daemon or notebook bindings)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod eval;
pub mod forest;
pub mod io;
pub mod preprocess;
pub mod report;
pub mod schema;
pub mod scorer;
pub mod service;
pub mod train;
pub mod validate;
