//! Domain layer for the merge engine.

pub mod error;
pub mod merge;
pub mod result;

pub use error::*;
pub use merge::*;
pub use result::*;
