//! # FlowTable Core
//!
//! In-memory table engine for ETL flows.
//!
//! This crate provides:
//! - Typed columns with defaults, text coercion and primary keys
//! - Rows with a draft/committed split and explicit commit/rollback
//! - Commit-time key uniqueness with all-or-nothing batches
//! - Optional bounded retention with FIFO eviction
//! - A flow model, a context-keyed model registry and record mappings
//!
//! ## Example
//!
//! ```rust,ignore
//! use flowtable_core::{ColumnSpec, FlowConfig, Table, TypeTag};
//!
//! let t = Table::new("t", FlowConfig::new().transactional(true))?;
//! t.add_column(ColumnSpec::new("id", TypeTag::Integer).key())?;
//! t.add_column(ColumnSpec::new("name", TypeTag::String).default("foo"))?;
//!
//! let row = t.new_row()?;
//! row.set_value("id", 1)?;
//! t.commit()?;
//!
//! assert_eq!(t.row_count(), 1);
//! assert_eq!(t.row(0)?.get_value("name")?, Some("foo".into()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod column;
mod config;
mod error;
mod model;
mod registry;
mod row;
mod sequence;
mod stats;
mod table;
mod types;
mod value;

pub use adapter::RecordMapping;
pub use column::{Column, ColumnRef, ColumnSpec};
pub use config::FlowConfig;
pub use error::{FlowError, FlowResult};
pub use model::FlowModel;
pub use registry::{FlowContext, ModelRegistry};
pub use row::{Row, RowStatus};
pub use sequence::BoundedSequence;
pub use stats::{StatsSnapshot, TableStats};
pub use table::{CommitOutcome, KeyTuple, Table};
pub use types::{ColumnId, TableId};
pub use value::{Datum, Decimal, TypeTag, Value, MAX_SCALE};
