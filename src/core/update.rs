//! Partial updates that only ever touch the fields a caller supplied.
//!
//! Column names come from `&'static str` constants; every value is bound as a
//! positional parameter, never spliced into the SQL text.

use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::error::PostoError;

/// A parameterized `UPDATE` ready to execute
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    sql: String,
    params: Vec<Value>,
}

impl UpdateStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Accumulates `column = ?N` assignments for a single-row update keyed by id.
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    key_column: &'static str,
    assignments: Vec<(&'static str, Value)>,
    /// Bookkeeping columns written alongside, but never counted as fields
    stamps: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str, key_column: &'static str) -> Self {
        Self {
            table,
            key_column,
            assignments: Vec::new(),
            stamps: Vec::new(),
        }
    }

    /// Assign `column` only when a value is present.
    pub fn set_opt<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.assignments.push((column, value.into()));
        }
        self
    }

    pub fn stamp<V: Into<Value>>(mut self, column: &'static str, value: V) -> Self {
        self.stamps.push((column, value.into()));
        self
    }

    pub fn field_count(&self) -> usize {
        self.assignments.len()
    }

    /// Render the statement for the row whose key equals `key`.
    pub fn build(self, key: i64) -> Result<UpdateStatement, PostoError> {
        if self.assignments.is_empty() {
            return Err(PostoError::NoFieldsProvided);
        }

        let mut params = Vec::with_capacity(self.assignments.len() + self.stamps.len() + 1);
        let mut clauses = Vec::with_capacity(params.capacity());
        for (column, value) in self.assignments.into_iter().chain(self.stamps) {
            params.push(value);
            clauses.push(format!("{} = ?{}", column, params.len()));
        }
        params.push(Value::Integer(key));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            self.table,
            clauses.join(", "),
            self.key_column,
            params.len()
        );

        Ok(UpdateStatement { sql, params })
    }
}

/// Sparse edit of a request node; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.method.is_none()
            && self.url.is_none()
            && self.headers.is_none()
            && self.body.is_none()
    }

    /// Build the `UPDATE nodes` statement. Clause order is always
    /// name, method, url, headers, body, then `updated_at`.
    pub fn statement(&self, id: i64) -> Result<UpdateStatement, PostoError> {
        let headers = self
            .headers
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| PostoError::InvalidInput(format!("headers: {}", e)))?;

        UpdateBuilder::new("nodes", "id")
            .set_opt("name", self.name.clone())
            .set_opt("method", self.method.clone())
            .set_opt("url", self.url.clone())
            .set_opt("headers", headers)
            .set_opt("body", self.body.clone())
            .stamp("updated_at", Utc::now().to_rfc3339())
            .build(id)
    }
}
