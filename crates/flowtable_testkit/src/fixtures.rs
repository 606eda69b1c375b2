//! Table fixtures.
//!
//! Provides ready-made tables for the schemas most tests need.

use flowtable_core::{ColumnSpec, FlowConfig, Row, Table, TypeTag};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; silent by default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Creates a transactional table with `id: Integer` (key) and
/// `name: String` (default `"foo"`).
pub fn keyed_table(max_size: Option<usize>) -> Table {
    let mut config = FlowConfig::new().transactional(true);
    if let Some(n) = max_size {
        config = config.max_size(n);
    }
    let table = Table::new("t", config).expect("Failed to create table");
    table
        .add_column(ColumnSpec::new("id", TypeTag::Integer).key())
        .expect("Failed to add key column");
    table
        .add_column(ColumnSpec::new("name", TypeTag::String).default("foo"))
        .expect("Failed to add name column");
    table
}

/// Creates a non-transactional table with `n: Integer` (default `0`).
pub fn plain_table(max_size: Option<usize>) -> Table {
    let config = match max_size {
        Some(n) => FlowConfig::new().max_size(n),
        None => FlowConfig::new(),
    };
    let table = Table::new("plain", config).expect("Failed to create table");
    table
        .add_column(ColumnSpec::new("n", TypeTag::Integer).default(0))
        .expect("Failed to add column");
    table
}

/// Creates a transactional customer table covering most column types.
pub fn customers_table() -> Table {
    let table = Table::new("customers", FlowConfig::new().transactional(true))
        .expect("Failed to create table");
    let columns = [
        ColumnSpec::new("id", TypeTag::Long).key(),
        ColumnSpec::new("name", TypeTag::String),
        ColumnSpec::new("active", TypeTag::Boolean).default(true),
        ColumnSpec::new("balance", TypeTag::BigDecimal).default("0.00"),
        ColumnSpec::new("joined", TypeTag::Date),
        ColumnSpec::new("tier", TypeTag::Character).default('B'),
        ColumnSpec::new("tags", TypeTag::List),
        ColumnSpec::new("extra", TypeTag::Object).comment("free-form payload"),
    ];
    for spec in columns {
        table.add_column(spec).expect("Failed to add column");
    }
    table
}

/// Queues a row with the given `id` in a [`keyed_table`].
pub fn insert_key(table: &Table, id: i32) -> Row {
    let row = table.new_row().expect("Failed to create row");
    row.set_value("id", id).expect("Failed to set id");
    row
}

/// Runs a test against a fresh [`keyed_table`].
pub fn with_keyed_table<F, R>(max_size: Option<usize>, f: F) -> R
where
    F: FnOnce(&Table) -> R,
{
    init_tracing();
    let table = keyed_table(max_size);
    f(&table)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a [`keyed_table`] holding committed rows with ids `0..count`.
    pub fn populated_table(count: usize, max_size: Option<usize>) -> Table {
        let table = keyed_table(max_size);
        for id in 0..count {
            let id = i32::try_from(id).expect("id out of range");
            insert_key(&table, id);
            table.commit().expect("Failed to commit");
        }
        table
    }

    /// Returns the committed ids of a [`keyed_table`] in row order.
    pub fn committed_ids(table: &Table) -> Vec<i32> {
        table
            .slice_column("id")
            .expect("table has no id column")
            .iter()
            .filter_map(|v| v.datum().as_i32())
            .collect()
    }
}
