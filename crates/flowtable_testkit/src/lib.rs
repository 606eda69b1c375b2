//! # FlowTable Testkit
//!
//! Test utilities for FlowTable.
//!
//! This crate provides:
//! - Table fixtures for the common schemas used across tests
//! - Property-based test generators using proptest
//! - A one-shot tracing subscriber for test output
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flowtable_testkit::prelude::*;
//!
//! #[test]
//! fn commits_a_row() {
//!     with_keyed_table(None, |t| {
//!         insert_key(t, 1);
//!         t.commit().unwrap();
//!         assert_eq!(t.row_count(), 1);
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
