use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name to value mapping for one procedure session.
///
/// Ordered so that two states with the same entries compare and serialize
/// identically regardless of the order the answers were given in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerState {
    fields: BTreeMap<String, Value>,
}

impl AnswerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for tests and catalog fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// Sets a field. Returns `true` when the stored value actually changed.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> bool {
        let field = field.into();
        let value = value.into();
        if value.is_null() {
            return self.remove(&field);
        }
        match self.fields.get(&field) {
            Some(existing) if *existing == value => false,
            _ => {
                self.fields.insert(field, value);
                true
            }
        }
    }

    /// Removes a field. Returns `true` when something was removed.
    pub fn remove(&mut self, field: &str) -> bool {
        self.fields.remove(field).is_some()
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// A missing or non-boolean field reads as `false`.
    pub fn flag(&self, field: &str) -> bool {
        self.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Copies every entry of `other` over this state. Returns the names of
    /// fields whose value changed.
    pub fn merge(&mut self, other: &AnswerState) -> Vec<String> {
        let mut changed = Vec::new();
        for (field, value) in &other.fields {
            if self.set(field.clone(), value.clone()) {
                changed.push(field.clone());
            }
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for AnswerState {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (field, value) in iter {
            state.set(field, value);
        }
        state
    }
}

/// Parses a `field=value` CLI pair. The value is read as JSON when it parses
/// (`true`, `42`, `"x"`), otherwise kept as a plain string.
pub fn parse_answer_pair(raw: &str) -> anyhow::Result<(String, Value)> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected field=value, got: {raw}"))?;
    let field = field.trim();
    if field.is_empty() {
        anyhow::bail!("answer field name cannot be empty");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}
