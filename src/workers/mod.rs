// Worker functionality for cache maintenance.

pub mod tuner;

// Re-export main types
pub use tuner::Tuner;
