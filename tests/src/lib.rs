//! # DagChain Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/   # Merge + validation pipeline end to end
//! │   ├── fixtures.rs
//! │   ├── scenarios.rs
//! │   └── concurrency.rs
//! │
//! └── properties/    # Cross-crate laws checked with proptest
//!     ├── keys.rs
//!     └── signatures.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dagchain-tests
//! cargo test -p dagchain-tests integration::
//! cargo test -p dagchain-tests properties::
//! ```

pub mod integration;
pub mod properties;
