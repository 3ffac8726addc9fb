//! SELECT compilation.

use crate::error::{QbError, QbResult};
use crate::qb::builder::QueryBuilder;
use crate::qb::clause::QueryKind;
use crate::qb::param::ParamList;

impl QueryBuilder {
    /// `SELECT [DISTINCT] cols FROM t [AS a] [joins] [WHERE] [GROUP BY]
    /// [HAVING] [ORDER BY] [LIMIT] [OFFSET] [UNION [ALL] q]*`
    pub(super) fn build_select(&self, params: &mut ParamList) -> QbResult<String> {
        let mut parts: Vec<String> = vec!["SELECT".to_string()];

        if self.distinct {
            parts.push("DISTINCT".to_string());
        }
        parts.push(self.columns.join(", "));
        parts.push(format!("FROM {}", self.table));

        if let Some(alias) = &self.alias {
            parts.push(format!("AS {}", alias));
        }

        for join in &self.joins {
            parts.push(join.to_sql());
        }

        if let Some(where_sql) = self.build_where(params)? {
            parts.push(where_sql);
        }

        if !self.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by.join(", ")));
        }

        if let Some(having) = &self.having {
            parts.push(format!("HAVING {}", having.build(params)));
        }

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|o| format!("{} {}", o.column, o.direction.as_sql()))
                .collect();
            parts.push(format!("ORDER BY {}", terms.join(", ")));
        }

        if let Some(limit) = self.limit {
            parts.push(format!("LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("OFFSET {}", offset));
        }

        let keyword = if self.union_all { "UNION ALL" } else { "UNION" };
        for union in &self.unions {
            if union.kind != QueryKind::Select {
                return Err(QbError::config(format!(
                    "UNION requires a select query, got {}",
                    union.kind
                )));
            }
            parts.push(format!("{} {}", keyword, union.build_sql(params)?));
        }

        Ok(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use crate::qb::{QueryBuilder, WhereBuilder};
    use crate::value::Value;

    #[test]
    fn test_full_clause_order() {
        let mut qb = QueryBuilder::new();
        qb.select(["u.id", "COUNT(p.id) as posts"])
            .distinct()
            .from_as("users", "u")
            .left_join("posts p", "p.user_id", "=", "u.id")
            .where_eq("u.active", true)
            .group_by(["u.id"])
            .having("COUNT(p.id)", ">", 3)
            .order_by("posts", "desc")
            .unwrap()
            .limit(10)
            .unwrap()
            .offset(20)
            .unwrap();

        let compiled = qb.compile().unwrap();
        assert_eq!(
            compiled.sql(),
            "SELECT DISTINCT u.id, COUNT(p.id) as posts FROM users AS u \
             LEFT JOIN posts p ON p.user_id = u.id WHERE u.active = ? GROUP BY u.id \
             HAVING COUNT(p.id) > ? ORDER BY posts DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(compiled.bindings(), &[Value::Bool(true), Value::Int(3)]);
    }

    #[test]
    fn test_union_bindings_follow_having() {
        let mut archived = QueryBuilder::new();
        archived.from("archived_users").where_eq("year", 2020);

        let mut qb = QueryBuilder::new();
        qb.from("users")
            .where_eq("active", 1)
            .group_by(["role"])
            .having("COUNT(*)", ">=", 2)
            .union(archived);

        let compiled = qb.compile().unwrap();
        assert_eq!(
            compiled.sql(),
            "SELECT * FROM users WHERE active = ? GROUP BY role HAVING COUNT(*) >= ? \
             UNION SELECT * FROM archived_users WHERE year = ?"
        );
        assert_eq!(
            compiled.bindings(),
            &[Value::Int(1), Value::Int(2), Value::Int(2020)]
        );
    }

    #[test]
    fn test_union_member_must_select() {
        let mut other = QueryBuilder::new();
        other.delete("users");

        let mut qb = QueryBuilder::new();
        qb.from("users").union(other);
        assert!(qb.compile().unwrap_err().is_config());
    }

    #[test]
    fn test_cross_join_has_no_condition() {
        let mut qb = QueryBuilder::new();
        qb.from("colors").cross_join("sizes");
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM colors CROSS JOIN sizes");
    }
}
