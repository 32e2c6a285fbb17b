//! Request statistics window.

pub mod window;


// Re-export main types
pub use window::{Observation, Window};
