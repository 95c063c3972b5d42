use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::HandoffStorage;
use crate::error::{CatalogError, HandoffError};
use crate::procedure::AnswerState;

/// Envelope version written by this build. Payloads carrying any other
/// version are treated as absent.
pub const PAYLOAD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Flag,
    /// Number or numeric text; empty text is a valid "not entered" value.
    Amount,
    Choice(&'static [&'static str]),
    List,
}

impl FieldKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Flag => value.is_boolean(),
            Self::Amount => value.is_number() || value.is_string(),
            Self::Choice(options) => value.as_str().is_some_and(|text| options.contains(&text)),
            Self::List => value.is_array(),
        }
    }

    /// Interprets a raw query parameter. `None` when the text is outside the
    /// field's domain.
    pub fn coerce_query(&self, raw: &str) -> Option<Value> {
        match self {
            Self::Text | Self::Amount => Some(Value::String(raw.to_string())),
            Self::Flag => match raw {
                "1" | "true" | "yes" => Some(Value::Bool(true)),
                "0" | "false" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::Choice(options) => options
                .contains(&raw)
                .then(|| Value::String(raw.to_string())),
            Self::List => Some(Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub default: Value,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, default: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, Value::String(String::new()))
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Flag, Value::Bool(false))
    }

    pub fn amount(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Amount, Value::String(String::new()))
    }

    /// Choices default to unset so branch rules gated on them stay closed.
    pub fn choice(name: impl Into<String>, options: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Choice(options), Value::Null)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::List, Value::Array(Vec::new()))
    }
}

/// Which answers a procedure hands to a second window, and their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct HandoffSchema {
    key: String,
    version: u32,
    fields: Vec<FieldSpec>,
}

impl HandoffSchema {
    pub fn new(
        key: impl Into<String>,
        version: u32,
        fields: Vec<FieldSpec>,
    ) -> Result<Self, CatalogError> {
        let key = key.into();
        for (index, field) in fields.iter().enumerate() {
            if fields[..index].iter().any(|earlier| earlier.name == field.name) {
                return Err(CatalogError::DuplicateHandoffField {
                    key,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self {
            key,
            version,
            fields,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The payload a reader gets when nothing usable is stored.
    pub fn defaults(&self) -> AnswerState {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.default.clone()))
            .collect()
    }

    /// The declared subset of `answers`.
    pub fn project(&self, answers: &AnswerState) -> AnswerState {
        self.fields
            .iter()
            .filter_map(|field| {
                answers
                    .get(&field.name)
                    .map(|value| (field.name.clone(), value.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    written_at: DateTime<Utc>,
    data: Map<String, Value>,
}

/// Typed read/write over a [`HandoffStorage`].
///
/// A handoff is a one-shot parameter pass: the receiving window reads once at
/// startup and later edits on either side are invisible to the other.
#[derive(Clone)]
pub struct HandoffStore {
    storage: Arc<dyn HandoffStorage>,
}

impl HandoffStore {
    pub fn new(storage: Arc<dyn HandoffStorage>) -> Self {
        Self { storage }
    }

    pub fn backend(&self) -> &str {
        self.storage.name()
    }

    /// Replaces whatever is stored under the schema key. Fields outside the
    /// schema are dropped. A declared field whose value does not fit its kind
    /// rejects the whole write.
    pub fn write(&self, schema: &HandoffSchema, payload: &AnswerState) -> Result<(), HandoffError> {
        let mut data = Map::new();
        for (field, value) in payload.iter() {
            let Some(spec) = schema.field(field) else {
                debug!(key = %schema.key(), field = %field, "dropping undeclared handoff field");
                continue;
            };
            if !spec.kind.accepts(value) {
                return Err(HandoffError::FieldKind {
                    key: schema.key().to_string(),
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
            data.insert(field.to_string(), value.clone());
        }

        let envelope = Envelope {
            version: schema.version(),
            written_at: Utc::now(),
            data,
        };
        let serialized =
            serde_json::to_string(&envelope).map_err(|error| HandoffError::Serialize {
                key: schema.key().to_string(),
                message: error.to_string(),
            })?;

        self.storage
            .set(schema.key(), &serialized)
            .map_err(|error| HandoffError::Storage {
                key: schema.key().to_string(),
                message: format!("{error:#}"),
            })
    }

    /// Returns every declared field: the stored value when present and of the
    /// right kind, otherwise the field default. Never fails.
    pub fn read(&self, schema: &HandoffSchema) -> AnswerState {
        let Some(data) = self.read_envelope(schema) else {
            return schema.defaults();
        };

        let mut payload = AnswerState::new();
        for field in schema.fields() {
            let value = match data.get(&field.name) {
                Some(value) if value.is_null() => field.default.clone(),
                Some(value) if field.kind.accepts(value) => value.clone(),
                Some(value) => {
                    warn!(
                        key = %schema.key(),
                        field = %field.name,
                        value = %value,
                        "handoff field has wrong type; using default"
                    );
                    field.default.clone()
                }
                None => field.default.clone(),
            };
            payload.set(field.name.clone(), value);
        }
        payload
    }

    pub fn clear(&self, schema: &HandoffSchema) -> Result<(), HandoffError> {
        self.storage
            .remove(schema.key())
            .map_err(|error| HandoffError::Storage {
                key: schema.key().to_string(),
                message: format!("{error:#}"),
            })
    }

    fn read_envelope(&self, schema: &HandoffSchema) -> Option<Map<String, Value>> {
        let raw = match self.storage.get(schema.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %schema.key(), "no handoff payload stored");
                return None;
            }
            Err(error) => {
                let message = format!("{error:#}");
                warn!(key = %schema.key(), error = %message, "handoff storage unreadable; using defaults");
                return None;
            }
        };

        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(key = %schema.key(), error = %error, "malformed handoff payload; using defaults");
                return None;
            }
        };

        if envelope.version != schema.version() {
            warn!(
                key = %schema.key(),
                stored = envelope.version,
                expected = schema.version(),
                "handoff payload version mismatch; using defaults"
            );
            return None;
        }

        debug!(key = %schema.key(), written_at = %envelope.written_at, "handoff payload loaded");
        Some(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::MemoryStorage;
    use serde_json::json;

    fn schema() -> HandoffSchema {
        HandoffSchema::new(
            "change-consent",
            PAYLOAD_VERSION,
            vec![
                FieldSpec::text("project_id"),
                FieldSpec::amount("change_amount"),
                FieldSpec::flag("agree_terms"),
                FieldSpec::choice("customer_category", &["individual", "corporate"]),
                FieldSpec::list("reform_areas"),
            ],
        )
        .unwrap()
    }

    fn store() -> (Arc<MemoryStorage>, HandoffStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = HandoffStore::new(storage.clone());
        (storage, store)
    }

    #[test]
    fn absent_key_reads_defaults() {
        let (_, store) = store();
        let payload = store.read(&schema());
        assert_eq!(payload.get("project_id"), Some(&json!("")));
        assert_eq!(payload.get("agree_terms"), Some(&json!(false)));
        assert_eq!(payload.get("reform_areas"), Some(&json!([])));
        assert!(!payload.is_set("customer_category"));
    }

    #[test]
    fn write_then_read_returns_present_fields_and_defaults() {
        let (_, store) = store();
        let written = AnswerState::new()
            .with("project_id", "P-1042")
            .with("change_amount", 180_000)
            .with("customer_category", "corporate");
        store.write(&schema(), &written).unwrap();

        let read = store.read(&schema());
        assert_eq!(read.get("project_id"), Some(&json!("P-1042")));
        assert_eq!(read.get("change_amount"), Some(&json!(180_000)));
        assert_eq!(read.get("customer_category"), Some(&json!("corporate")));
        assert_eq!(read.get("agree_terms"), Some(&json!(false)));
    }

    #[test]
    fn write_drops_undeclared_fields() {
        let (storage, store) = store();
        store
            .write(
                &schema(),
                &AnswerState::new().with("project_id", "P-1").with("secret", "x"),
            )
            .unwrap();
        let raw = storage.get("change-consent").unwrap().unwrap();
        assert!(!raw.contains("secret"));
        assert!(!store.read(&schema()).is_set("secret"));
    }

    #[test]
    fn write_overwrites_without_merge() {
        let (_, store) = store();
        store
            .write(&schema(), &AnswerState::new().with("project_id", "P-1").with("agree_terms", true))
            .unwrap();
        store
            .write(&schema(), &AnswerState::new().with("project_id", "P-2"))
            .unwrap();
        let read = store.read(&schema());
        assert_eq!(read.get("project_id"), Some(&json!("P-2")));
        assert_eq!(read.get("agree_terms"), Some(&json!(false)));
    }

    #[test]
    fn write_rejects_values_read_would_discard() {
        let (storage, store) = store();
        let numeric_id = AnswerState::new()
            .with("project_id", 1042)
            .with("customer_category", "corporate");
        let error = store.write(&schema(), &numeric_id).unwrap_err();
        assert!(matches!(
            error,
            HandoffError::FieldKind { ref field, .. } if field == "project_id"
        ));

        let unknown_choice = AnswerState::new()
            .with("project_id", "1042")
            .with("customer_category", "government");
        let error = store.write(&schema(), &unknown_choice).unwrap_err();
        assert_eq!(
            error.to_string(),
            "handoff field customer_category of change-consent holds a value of the wrong kind: \"government\""
        );
        assert!(storage.get("change-consent").unwrap().is_none());
    }

    #[test]
    fn typed_text_answer_round_trips() {
        let (_, store) = store();
        let procedure = crate::catalog::ProcedureKind::ChangeConsent.procedure().unwrap();
        let (field, value) = procedure.parse_answer("project_id=1042").unwrap();
        let written = AnswerState::new()
            .with(field, value)
            .with("customer_name", "Sato");
        assert_round_trip(&store, procedure.handoff(), &written);
    }

    fn assert_round_trip(store: &HandoffStore, schema: &HandoffSchema, written: &AnswerState) {
        store.write(schema, written).unwrap();
        let read = store.read(schema);
        for (field, value) in written.iter() {
            assert_eq!(read.get(field), Some(value), "{field}");
        }
    }

    #[test]
    fn non_json_value_reads_defaults() {
        let (storage, store) = store();
        storage.set("change-consent", "}}} definitely not json").unwrap();
        assert_eq!(store.read(&schema()), schema().defaults());
    }

    #[test]
    fn bare_object_without_envelope_reads_defaults() {
        let (storage, store) = store();
        storage
            .set("change-consent", r#"{"project_id":"P-9"}"#)
            .unwrap();
        assert_eq!(store.read(&schema()), schema().defaults());
    }

    #[test]
    fn version_mismatch_reads_defaults() {
        let (storage, store) = store();
        storage
            .set(
                "change-consent",
                r#"{"version":0,"written_at":"2026-01-01T00:00:00Z","data":{"project_id":"P-3"}}"#,
            )
            .unwrap();
        assert_eq!(store.read(&schema()), schema().defaults());
    }

    #[test]
    fn mistyped_field_defaults_only_that_field() {
        let (storage, store) = store();
        storage
            .set(
                "change-consent",
                r#"{"version":1,"written_at":"2026-01-01T00:00:00Z","data":{"project_id":"P-4","agree_terms":"yes","customer_category":"alien"}}"#,
            )
            .unwrap();
        let read = store.read(&schema());
        assert_eq!(read.get("project_id"), Some(&json!("P-4")));
        assert_eq!(read.get("agree_terms"), Some(&json!(false)));
        assert!(!read.is_set("customer_category"));
    }

    #[test]
    fn clear_removes_payload() {
        let (_, store) = store();
        store
            .write(&schema(), &AnswerState::new().with("project_id", "P-5"))
            .unwrap();
        store.clear(&schema()).unwrap();
        assert_eq!(store.read(&schema()), schema().defaults());
    }

    #[test]
    fn duplicate_schema_field_is_rejected() {
        let error = HandoffSchema::new(
            "dup",
            PAYLOAD_VERSION,
            vec![FieldSpec::text("a"), FieldSpec::flag("a")],
        )
        .unwrap_err();
        assert_eq!(error.to_string(), "handoff schema dup declares field a twice");
    }

    #[test]
    fn project_keeps_declared_subset() {
        let answers = AnswerState::new()
            .with("project_id", "P-6")
            .with("has_signature", true);
        let projected = schema().project(&answers);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected.get("project_id"), Some(&json!("P-6")));
    }

    #[test]
    fn query_coercion_respects_field_domain() {
        assert_eq!(FieldKind::Flag.coerce_query("true"), Some(json!(true)));
        assert_eq!(FieldKind::Flag.coerce_query("maybe"), None);
        assert_eq!(
            FieldKind::Choice(&["standard", "with-supervisor"]).coerce_query("with-supervisor"),
            Some(json!("with-supervisor"))
        );
        assert_eq!(FieldKind::Choice(&["standard"]).coerce_query("other"), None);
        assert_eq!(
            FieldKind::List.coerce_query("kitchen, bath,"),
            Some(json!(["kitchen", "bath"]))
        );
    }
}
