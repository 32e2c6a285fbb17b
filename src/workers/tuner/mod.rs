// Package tuner provides the admission-parameter tuning worker.

pub mod counters;
pub mod solver;
pub mod telemetry;
pub mod tuner;

#[cfg(test)]
mod tuner_test;

// Re-export main types
pub use tuner::Tuner;
