//! DELETE compilation.

use crate::error::QbResult;
use crate::qb::builder::QueryBuilder;
use crate::qb::param::ParamList;

impl QueryBuilder {
    pub(super) fn build_delete(&self, params: &mut ParamList) -> QbResult<String> {
        let mut sql = format!("DELETE FROM {}", self.table);
        if let Some(where_sql) = self.build_where(params)? {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        Ok(sql)
    }
}
