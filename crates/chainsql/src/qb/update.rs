//! UPDATE compilation.

use crate::error::{QbError, QbResult};
use crate::qb::builder::QueryBuilder;
use crate::qb::param::ParamList;

impl QueryBuilder {
    /// `UPDATE t SET c = ?, ... [WHERE]`; SET bindings precede WHERE bindings.
    pub(super) fn build_update(&self, params: &mut ParamList) -> QbResult<String> {
        if self.sets.is_empty() {
            return Err(QbError::config("No data provided for UPDATE"));
        }

        let assignments: Vec<String> = self
            .sets
            .iter()
            .map(|(column, value)| format!("{} = {}", column, params.push(value)))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(", "));
        if let Some(where_sql) = self.build_where(params)? {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use crate::qb::{QueryBuilder, WhereBuilder};
    use crate::value::Value;

    #[test]
    fn test_set_before_where_regardless_of_call_order() {
        let mut qb = QueryBuilder::new();
        qb.update("users")
            .where_eq("id", 5)
            .set("status", "inactive")
            .set("login_count", 0);

        let compiled = qb.compile().unwrap();
        assert_eq!(
            compiled.sql(),
            "UPDATE users SET status = ?, login_count = ? WHERE id = ?"
        );
        assert_eq!(
            compiled.bindings(),
            &[Value::from("inactive"), Value::Int(0), Value::Int(5)]
        );
    }

    #[test]
    fn test_data_merges_assignments() {
        let mut qb = QueryBuilder::new();
        qb.update("users").set("a", 1).set("b", 2);
        qb.data([("a", 10), ("c", 3)]).unwrap();

        let compiled = qb.compile().unwrap();
        assert_eq!(compiled.sql(), "UPDATE users SET a = ?, b = ?, c = ?");
        assert_eq!(
            compiled.bindings(),
            &[Value::Int(10), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn test_missing_assignments() {
        let mut qb = QueryBuilder::new();
        qb.update("users").where_eq("id", 1);
        let err = qb.compile().unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.to_string(), "Configuration error: No data provided for UPDATE");
    }
}
