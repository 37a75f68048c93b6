//! Domain layer: errors, engine data and validation outcome.

pub mod engine;
pub mod error;
pub mod outcome;

pub use engine::*;
pub use error::*;
pub use outcome::*;
