//! Recording collaborator shared by the execution tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::client::{Connection, Statement};
use crate::error::{QbError, QbResult};
use crate::row::Row;
use crate::value::{ParamKind, Value};

/// Records every prepare/bind and serves canned rows.
#[derive(Default)]
pub(crate) struct MockConnection {
    pub prepared: RefCell<Vec<String>>,
    pub bound: RefCell<Vec<(usize, Value, ParamKind)>>,
    pub rows: Vec<Row>,
    pub affected: u64,
    pub fail_prepare: bool,
    pub fail_execute: bool,
}

pub(crate) struct MockStatement<'c> {
    conn: &'c MockConnection,
    pending: VecDeque<Row>,
    executed: bool,
}

impl MockConnection {
    /// Values bound so far, in bind order.
    pub fn bound_values(&self) -> Vec<Value> {
        self.bound.borrow().iter().map(|(_, v, _)| v.clone()).collect()
    }
}

impl Connection for MockConnection {
    type Statement<'c> = MockStatement<'c>;

    fn prepare(&self, sql: &str) -> QbResult<MockStatement<'_>> {
        if self.fail_prepare {
            return Err(QbError::execution("prepare failed"));
        }
        self.prepared.borrow_mut().push(sql.to_string());
        Ok(MockStatement {
            conn: self,
            pending: VecDeque::new(),
            executed: false,
        })
    }

    fn last_insert_id(&self) -> QbResult<String> {
        Ok("42".to_string())
    }
}

impl Statement for MockStatement<'_> {
    fn bind_value(&mut self, position: usize, value: &Value, kind: ParamKind) -> QbResult<()> {
        self.conn
            .bound
            .borrow_mut()
            .push((position, value.clone(), kind));
        Ok(())
    }

    fn execute(&mut self) -> QbResult<()> {
        if self.conn.fail_execute {
            return Err(QbError::execution("execute failed"));
        }
        self.executed = true;
        self.pending = self.conn.rows.iter().cloned().collect();
        Ok(())
    }

    fn fetch_all(&mut self) -> QbResult<Vec<Row>> {
        Ok(self.pending.drain(..).collect())
    }

    fn fetch(&mut self) -> QbResult<Option<Row>> {
        Ok(self.pending.pop_front())
    }

    fn row_count(&self) -> QbResult<u64> {
        Ok(if self.executed { self.conn.affected } else { 0 })
    }
}
