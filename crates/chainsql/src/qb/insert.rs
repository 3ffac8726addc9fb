//! INSERT and REPLACE compilation.

use crate::error::{QbError, QbResult};
use crate::qb::builder::QueryBuilder;
use crate::qb::clause::QueryKind;
use crate::qb::param::ParamList;

impl QueryBuilder {
    /// `INSERT|REPLACE INTO t (cols) VALUES (?, ...)[, (?, ...)]`
    ///
    /// Batch rows follow the first row, each bound in column order.
    pub(super) fn build_insert(&self, params: &mut ParamList) -> QbResult<String> {
        let verb = match self.kind {
            QueryKind::Replace => "REPLACE",
            _ => "INSERT",
        };
        if self.values.is_empty() {
            return Err(QbError::config(format!("No data provided for {}", verb)));
        }

        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());
        for (column, value) in &self.values {
            columns.push(column.as_str());
            placeholders.push(params.push(value));
        }

        let mut tuples = Vec::with_capacity(1 + self.batch_rows.len());
        tuples.push(format!("({})", placeholders.join(", ")));
        for row in &self.batch_rows {
            let row: Vec<&str> = row.iter().map(|value| params.push(value)).collect();
            tuples.push(format!("({})", row.join(", ")));
        }

        Ok(format!(
            "{} INTO {} ({}) VALUES {}",
            verb,
            self.table,
            columns.join(", "),
            tuples.join(", ")
        ))
    }
}
