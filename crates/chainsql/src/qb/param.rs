//! Ordered bind values collected while a query is compiled.

use crate::value::Value;

/// Bind values in placeholder order.
///
/// Every renderer pushes exactly one value for each `?` it writes, so the
/// N-th placeholder of the compiled text always maps to the N-th entry here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    params: Vec<Value>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a value and return the placeholder text for it.
    pub fn push(&mut self, value: &Value) -> &'static str {
        self.params.push(value.clone());
        "?"
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if no value has been pushed.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get the values in placeholder order.
    pub fn as_slice(&self) -> &[Value] {
        &self.params
    }

    /// Consume the list into its values.
    pub fn into_vec(self) -> Vec<Value> {
        self.params
    }
}
