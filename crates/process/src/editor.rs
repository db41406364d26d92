//! Editor contract
//!
//! An editor is the step-local input widget behind a prompt step. Given its
//! typed parameters and read access to the live context it eventually
//! resolves with a value, or reports that the user abandoned it. The engine
//! never looks at what an editor renders.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::context::{ProcessContext, ProcessData};

/// How an editor resolved
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome<T> {
    /// The user supplied a value
    Submitted(T),

    /// The user did not proceed. This is not an error.
    Abandoned,
}

impl<T> EditorOutcome<T> {
    /// Check if the editor was abandoned
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned)
    }

    /// Map the submitted value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EditorOutcome<U> {
        match self {
            Self::Submitted(value) => EditorOutcome::Submitted(f(value)),
            Self::Abandoned => EditorOutcome::Abandoned,
        }
    }
}

/// Editor failures (distinct from abandonment)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    /// The rendering side went away
    #[error("editor frontend closed")]
    FrontendClosed,

    /// Looking up choices failed
    #[error("choices lookup failed: {0}")]
    Choices(String),

    /// The submitted value could not be encoded
    #[error("failed to encode editor output: {0}")]
    Encoding(String),

    /// Any other editor failure
    #[error("editor failed: {0}")]
    Failed(String),
}

/// A step-local input widget
///
/// # Example
///
/// ```ignore
/// struct ConfirmEditor;
///
/// #[async_trait]
/// impl Editor<MyData> for ConfirmEditor {
///     type Params = String;
///     type Output = bool;
///
///     fn component(&self) -> &str {
///         "confirm"
///     }
///
///     async fn edit(
///         &self,
///         question: &String,
///         ctx: &ProcessContext<MyData>,
///     ) -> Result<EditorOutcome<bool>, EditorError> {
///         Ok(EditorOutcome::Submitted(ask(question).await))
///     }
/// }
/// ```
#[async_trait]
pub trait Editor<D: ProcessData>: Send + Sync + 'static {
    /// Typed parameters this editor accepts
    type Params: Send + Sync + 'static;

    /// Value the editor resolves with
    type Output: Serialize + Send;

    /// Opaque component identifier, used for logging and events
    fn component(&self) -> &str;

    /// Present the editor and wait until it resolves
    async fn edit(
        &self,
        params: &Self::Params,
        ctx: &ProcessContext<D>,
    ) -> Result<EditorOutcome<Self::Output>, EditorError>;
}

/// Type-erased editor bound to its parameters
///
/// Prompt steps hold editors through this trait so one definition can mix
/// editors with different parameter and output types.
#[async_trait]
pub(crate) trait AnyEditor<D>: Send + Sync {
    fn component(&self) -> &str;

    async fn edit_json(
        &self,
        ctx: &ProcessContext<D>,
    ) -> Result<EditorOutcome<Value>, EditorError>;
}

/// Wrapper to implement AnyEditor for any Editor
pub(crate) struct BoundEditor<D: ProcessData, E: Editor<D>> {
    editor: Arc<E>,
    params: E::Params,
    _data: PhantomData<fn() -> D>,
}

impl<D: ProcessData, E: Editor<D>> BoundEditor<D, E> {
    pub(crate) fn new(editor: Arc<E>, params: E::Params) -> Self {
        Self {
            editor,
            params,
            _data: PhantomData,
        }
    }
}

#[async_trait]
impl<D: ProcessData, E: Editor<D>> AnyEditor<D> for BoundEditor<D, E> {
    fn component(&self) -> &str {
        self.editor.component()
    }

    async fn edit_json(
        &self,
        ctx: &ProcessContext<D>,
    ) -> Result<EditorOutcome<Value>, EditorError> {
        match self.editor.edit(&self.params, ctx).await? {
            EditorOutcome::Submitted(value) => serde_json::to_value(value)
                .map(EditorOutcome::Submitted)
                .map_err(|e| EditorError::Encoding(e.to_string())),
            EditorOutcome::Abandoned => Ok(EditorOutcome::Abandoned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Data {
        name: String,
    }

    struct UppercaseEditor;

    #[async_trait]
    impl Editor<Data> for UppercaseEditor {
        type Params = bool;
        type Output = String;

        fn component(&self) -> &str {
            "uppercase"
        }

        async fn edit(
            &self,
            abandon: &bool,
            ctx: &ProcessContext<Data>,
        ) -> Result<EditorOutcome<String>, EditorError> {
            if *abandon {
                return Ok(EditorOutcome::Abandoned);
            }
            Ok(EditorOutcome::Submitted(ctx.data.name.to_uppercase()))
        }
    }

    #[test]
    fn test_outcome_map() {
        let outcome = EditorOutcome::Submitted(2).map(|v| v * 2);
        assert_eq!(outcome, EditorOutcome::Submitted(4));
        assert!(EditorOutcome::<u8>::Abandoned.map(|v| v + 1).is_abandoned());
    }

    #[tokio::test]
    async fn test_bound_editor_encodes_output() {
        let ctx = ProcessContext::new(
            "p-1",
            Data {
                name: "safe".to_string(),
            },
        );
        let bound: BoundEditor<Data, _> = BoundEditor::new(Arc::new(UppercaseEditor), false);

        assert_eq!(bound.component(), "uppercase");
        let outcome = bound.edit_json(&ctx).await.unwrap();
        assert_eq!(outcome, EditorOutcome::Submitted(Value::from("SAFE")));
    }

    #[tokio::test]
    async fn test_bound_editor_passes_abandonment() {
        let ctx = ProcessContext::new(
            "p-1",
            Data {
                name: "safe".to_string(),
            },
        );
        let bound: BoundEditor<Data, _> = BoundEditor::new(Arc::new(UppercaseEditor), true);

        assert!(bound.edit_json(&ctx).await.unwrap().is_abandoned());
    }
}
