//! Bit-error sweep module
//!
//! Runs one analysis cycle per bit-error count listed in a YAML sweep file
//! and tabulates the collision fraction for each.

pub mod config;
pub mod runner;
pub mod stats;

pub use config::SweepFile;
pub use runner::SweepRunner;
#[allow(unused_imports)]
pub use stats::{SweepResult, SweepRow};
