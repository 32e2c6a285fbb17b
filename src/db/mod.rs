//! Cache facade and its subsystems.

pub mod admission;
pub mod db;
pub mod stats;
pub mod storage;

// Re-export main types
pub use db::{Cache, Stats};
