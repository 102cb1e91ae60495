//! Values bound to an operation's parameters.

use std::path::PathBuf;

use super::value::Value;
use crate::naming::to_token;

/// Bound arguments handed to an operation handler, in declaration order.
///
/// Lookups accept either the declared parameter name or its CLI token, so a
/// handler can ask for `"dry_run"` or `"dry-run"` interchangeably.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    entries: Vec<(String, Value)>,
}

impl BoundArgs {
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in parameter declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let token = to_token(name);
        self.entries
            .iter()
            .find(|(declared, _)| declared == name || to_token(declared) == token)
            .map(|(_, value)| value)
    }

    /// Boolean flag value; absent or non-boolean reads as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.get(name).and_then(Value::as_path)
    }
}
