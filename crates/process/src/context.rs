//! Per-instance process context
//!
//! The context is the only channel steps use to talk to each other. Prompt
//! steps write the collected value into one field of `data`, invoke steps
//! may write their result into a declared output field, and terminal steps
//! read the final state.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker for the typed data record carried by a process context
///
/// The record must serialize to a JSON object; its serialized keys are the
/// field names prompt and invoke steps write to.
pub trait ProcessData: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> ProcessData for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Category of a failure captured in [`ProcessContext::last_error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// An invoke operation rejected
    Operation,

    /// An editor failed (not abandonment)
    Editor,

    /// A submitted or returned value did not fit its target field
    FieldWrite,

    /// The engine reached a state that validation should have ruled out
    InvariantViolation,

    /// The instance exceeded the configured number of transitions
    TransitionLimit,
}

/// Failure details surfaced to the error terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human readable message
    pub message: String,

    /// What kind of failure this is
    pub kind: FailureKind,

    /// Step that produced the failure
    pub step_id: String,

    /// Error type/code for programmatic handling
    pub error_type: Option<String>,

    /// Additional error details
    pub details: Option<Value>,
}

impl ErrorInfo {
    /// Create a new error record
    pub fn new(kind: FailureKind, step_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            step_id: step_id.into(),
            error_type: None,
            details: None,
        }
    }

    /// Set the error type
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Add error details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Whether this records an engine invariant violation rather than an
    /// ordinary failure
    pub fn is_invariant_violation(&self) -> bool {
        self.kind == FailureKind::InvariantViolation
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors from reading or writing a context field
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// Process data did not serialize to a JSON object
    #[error("process data must serialize to an object")]
    NotAnObject,

    /// The data record has no such field
    #[error("process data has no field '{0}'")]
    UnknownField(String),

    /// The value does not fit the field's type
    #[error("field '{field}' rejected value: {source}")]
    Rejected {
        field: String,
        source: serde_json::Error,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Mutable data bag threaded through every step of one running instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessContext<D> {
    /// Caller supplied process id
    pub process_id: String,

    /// Typed process data
    pub data: D,

    /// Step the instance is currently at
    pub current_step_id: String,

    /// Last captured failure, if any
    pub last_error: Option<ErrorInfo>,
}

impl<D: ProcessData> ProcessContext<D> {
    /// Create a context seeded with initial data
    pub fn new(process_id: impl Into<String>, data: D) -> Self {
        Self {
            process_id: process_id.into(),
            data,
            current_step_id: String::new(),
            last_error: None,
        }
    }

    /// Read a field of `data` by its serialized name
    pub fn field(&self, field: &str) -> Result<Option<Value>, FieldError> {
        let mut map = data_object(&self.data)?;
        Ok(map.remove(field))
    }

    /// Check whether a field holds a value
    ///
    /// `null` and the empty string count as absent.
    pub fn has_field(&self, field: &str) -> Result<bool, FieldError> {
        Ok(match self.field(field)? {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        })
    }

    /// Replace one field of `data`, leaving every other field untouched
    ///
    /// Fails with [`FieldError::UnknownField`] when `data` has no field by
    /// that name, including when `value` is `null`.
    pub fn write_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        let mut map = data_object(&self.data)?;
        map.insert(field.to_string(), value);

        let mut ignored = Vec::new();
        let updated: D = serde_ignored::deserialize(Value::Object(map), |path| {
            if let serde_ignored::Path::Map { parent, key } = path {
                if matches!(parent, serde_ignored::Path::Root) {
                    ignored.push(key);
                }
            }
        })
        .map_err(|source| FieldError::Rejected {
            field: field.to_string(),
            source,
        })?;

        if ignored.iter().any(|key| key == field) {
            return Err(FieldError::UnknownField(field.to_string()));
        }

        self.data = updated;
        Ok(())
    }

    /// Record a failure
    pub fn set_error(&mut self, error: ErrorInfo) {
        self.last_error = Some(error);
    }
}

fn data_object<D: Serialize>(data: &D) -> Result<Map<String, Value>, FieldError> {
    match serde_json::to_value(data)? {
        Value::Object(map) => Ok(map),
        _ => Err(FieldError::NotAnObject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Data {
        eoa_address: String,
        safe_address: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        amount: Option<u64>,
    }

    fn context() -> ProcessContext<Data> {
        ProcessContext::new(
            "p-1",
            Data {
                eoa_address: "0xA".to_string(),
                safe_address: String::new(),
                amount: None,
            },
        )
    }

    #[test]
    fn test_write_field_changes_only_that_field() {
        let mut ctx = context();
        ctx.write_field("safeAddress", json!("0xB")).unwrap();

        assert_eq!(ctx.data.safe_address, "0xB");
        assert_eq!(ctx.data.eoa_address, "0xA");
        assert_eq!(ctx.data.amount, None);
    }

    #[test]
    fn test_write_optional_field() {
        let mut ctx = context();
        ctx.write_field("amount", json!(42)).unwrap();
        assert_eq!(ctx.data.amount, Some(42));

        ctx.write_field("amount", Value::Null).unwrap();
        assert_eq!(ctx.data.amount, None);
    }

    #[test]
    fn test_write_rejects_mismatched_type() {
        let mut ctx = context();
        let result = ctx.write_field("amount", json!("not a number"));

        assert!(matches!(result, Err(FieldError::Rejected { .. })));
        assert_eq!(ctx.data.amount, None);
    }

    #[test]
    fn test_write_rejects_unknown_field() {
        let mut ctx = context();
        let result = ctx.write_field("nope", json!("x"));

        assert!(matches!(result, Err(FieldError::UnknownField(f)) if f == "nope"));
    }

    #[test]
    fn test_write_null_to_unknown_field_rejected() {
        let mut ctx = context();
        let before = ctx.data.clone();

        let result = ctx.write_field("nope", Value::Null);

        assert!(matches!(result, Err(FieldError::UnknownField(f)) if f == "nope"));
        assert_eq!(ctx.data, before);
    }

    #[test]
    fn test_write_null_to_skipped_optional_field() {
        let mut ctx = context();
        assert_eq!(ctx.field("amount").unwrap(), None);

        ctx.write_field("amount", Value::Null).unwrap();
        assert_eq!(ctx.data.amount, None);
    }

    #[test]
    fn test_has_field() {
        let ctx = context();
        assert!(ctx.has_field("eoaAddress").unwrap());
        assert!(!ctx.has_field("safeAddress").unwrap());
        assert!(!ctx.has_field("amount").unwrap());
    }

    #[test]
    fn test_non_object_data() {
        let ctx = ProcessContext::new("p-1", 5u32);
        assert!(matches!(ctx.field("x"), Err(FieldError::NotAnObject)));
    }

    #[test]
    fn test_error_info_builder() {
        let info = ErrorInfo::new(FailureKind::Operation, "execute", "boom")
            .with_type("GATEWAY")
            .with_details(json!({"code": 7}));

        assert_eq!(info.to_string(), "boom");
        assert_eq!(info.error_type.as_deref(), Some("GATEWAY"));
        assert!(!info.is_invariant_violation());
    }
}
