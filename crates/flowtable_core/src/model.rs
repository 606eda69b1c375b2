//! Flow model: a named set of tables.

use crate::adapter::RecordMapping;
use crate::column::Column;
use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::row::Row;
use crate::table::Table;
use crate::value::{Datum, Value};
use parking_lot::RwLock;
use tracing::debug;

/// A named set of tables, and the entry point for creating tables, rows
/// and values.
#[derive(Debug, Default)]
pub struct FlowModel {
    /// Tables in creation order.
    flows: RwLock<Vec<Table>>,
}

impl FlowModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table.
    ///
    /// # Errors
    ///
    /// `InvalidName` if the name is blank, `NameAlreadyUsed` if the model
    /// already has a table with this name.
    pub fn new_flow(&self, name: &str, config: FlowConfig) -> FlowResult<Table> {
        let mut flows = self.flows.write();
        if flows.iter().any(|t| t.name() == name) {
            return Err(FlowError::name_already_used(name, "model"));
        }
        let table = Table::new(name, config)?;
        flows.push(table.clone());
        debug!(flow = %name, "flow created");
        Ok(table)
    }

    /// Creates a table with one column per field of `mapping`.
    pub fn new_flow_from<T>(
        &self,
        name: &str,
        config: FlowConfig,
        mapping: &RecordMapping<T>,
    ) -> FlowResult<Table> {
        let table = self.new_flow(name, config)?;
        mapping.define_columns(&table)?;
        Ok(table)
    }

    /// Returns the table with this name.
    #[must_use]
    pub fn flow(&self, name: &str) -> Option<Table> {
        self.flows.read().iter().find(|t| t.name() == name).cloned()
    }

    /// Returns true if a table has this name.
    #[must_use]
    pub fn has_flow(&self, name: &str) -> bool {
        self.flows.read().iter().any(|t| t.name() == name)
    }

    /// Returns the tables in creation order.
    #[must_use]
    pub fn flows(&self) -> Vec<Table> {
        self.flows.read().clone()
    }

    /// Returns the number of tables.
    #[must_use]
    pub fn flow_count(&self) -> usize {
        self.flows.read().len()
    }

    /// Removes a table from the model, returning it.
    pub fn remove_flow(&self, name: &str) -> Option<Table> {
        let mut flows = self.flows.write();
        let index = flows.iter().position(|t| t.name() == name)?;
        Some(flows.remove(index))
    }

    /// Creates a row in the named table.
    ///
    /// # Errors
    ///
    /// `UnknownFlow` if no table has this name.
    pub fn new_row(&self, flow: &str) -> FlowResult<Row> {
        self.require(flow)?.new_row()
    }

    /// Creates a row in the named table and fills it from a record.
    pub fn new_row_from<T>(&self, flow: &str, mapping: &RecordMapping<T>, record: &T) -> FlowResult<Row> {
        let row = self.new_row(flow)?;
        mapping.write_row(record, &row)?;
        Ok(row)
    }

    /// Builds a value for a column.
    pub fn new_value(&self, column: &Column, datum: impl Into<Datum>) -> FlowResult<Value> {
        Value::new(column, datum)
    }

    fn require(&self, flow: &str) -> FlowResult<Table> {
        self.flow(flow).ok_or_else(|| FlowError::UnknownFlow {
            name: flow.to_string(),
        })
    }
}
