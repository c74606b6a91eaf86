//! Installation orchestration.

pub mod controller;

pub use controller::{ModeController, Outcome, RunOptions, RunReport};
