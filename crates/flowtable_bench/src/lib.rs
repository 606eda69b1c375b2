//! Benchmark support for FlowTable.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
