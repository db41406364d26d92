//! Step definitions
//!
//! A process is a graph of three step kinds:
//! - [`PromptStep`] renders an editor, writes the value into context, navigates
//! - [`InvokeStep`] runs an asynchronous operation, navigates on completion
//! - [`TerminalStep`] ends the instance in success or error

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::{ProcessContext, ProcessData};
use crate::editor::{AnyEditor, BoundEditor, Editor};
use crate::operation::{AnyOperation, ErasedOperation, Operation};

/// Synchronous action run once when a terminal step is reached
pub type EntryAction<D> = Arc<dyn Fn(&ProcessContext<D>) + Send + Sync>;

/// Step kind, as reported in events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Prompt,
    Invoke,
    Terminal,
}

/// How a terminal step ends the instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalKind {
    Success,
    Error,
}

/// A node in the process graph
pub enum Step<D> {
    Prompt(PromptStep<D>),
    Invoke(InvokeStep<D>),
    Terminal(TerminalStep<D>),
}

impl<D: ProcessData> Step<D> {
    /// Start a prompt step that presents `editor` with `params`
    pub fn prompt<E: Editor<D>>(
        id: impl Into<String>,
        editor: Arc<E>,
        params: E::Params,
    ) -> PromptStep<D> {
        PromptStep {
            id: id.into(),
            field: None,
            editor: Arc::new(BoundEditor::new(editor, params)),
            next: None,
            back: None,
        }
    }

    /// Start an invoke step
    pub fn invoke(id: impl Into<String>) -> InvokeStep<D> {
        InvokeStep {
            id: id.into(),
            src: None,
            on_done: None,
            on_error: None,
            output: None,
        }
    }

    /// Start a success terminal
    pub fn success(id: impl Into<String>) -> TerminalStep<D> {
        TerminalStep {
            id: id.into(),
            kind: TerminalKind::Success,
            entry: None,
        }
    }

    /// Start an error terminal
    pub fn error(id: impl Into<String>) -> TerminalStep<D> {
        TerminalStep {
            id: id.into(),
            kind: TerminalKind::Error,
            entry: None,
        }
    }
}

impl<D> Step<D> {
    /// Step id, unique within its definition
    pub fn id(&self) -> &str {
        match self {
            Step::Prompt(s) => &s.id,
            Step::Invoke(s) => &s.id,
            Step::Terminal(s) => &s.id,
        }
    }

    /// Step kind
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Prompt(_) => StepKind::Prompt,
            Step::Invoke(_) => StepKind::Invoke,
            Step::Terminal(_) => StepKind::Terminal,
        }
    }

    /// Declared outgoing transitions as `(transition name, target id)`
    pub fn transitions(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        match self {
            Step::Prompt(s) => {
                if let Some(next) = &s.next {
                    out.push(("next", next.as_str()));
                }
                if let Some(back) = &s.back {
                    out.push(("back", back.as_str()));
                }
            }
            Step::Invoke(s) => {
                if let Some(on_done) = &s.on_done {
                    out.push(("on_done", on_done.as_str()));
                }
                if let Some(on_error) = &s.on_error {
                    out.push(("on_error", on_error.as_str()));
                }
            }
            Step::Terminal(_) => {}
        }
        out
    }

    /// Check if this is an error terminal
    pub fn is_error_terminal(&self) -> bool {
        matches!(self, Step::Terminal(t) if t.kind == TerminalKind::Error)
    }
}

impl<D> fmt::Debug for Step<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Prompt(s) => s.fmt(f),
            Step::Invoke(s) => s.fmt(f),
            Step::Terminal(s) => s.fmt(f),
        }
    }
}

// =============================================================================
// Prompt
// =============================================================================

/// Renders an editor, writes the submitted value into `data[field]` and
/// navigates to `next`
pub struct PromptStep<D> {
    pub(crate) id: String,
    pub(crate) field: Option<String>,
    pub(crate) editor: Arc<dyn AnyEditor<D>>,
    pub(crate) next: Option<String>,
    pub(crate) back: Option<String>,
}

impl<D> PromptStep<D> {
    /// Field the submitted value is written to
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Step to go to once a value is submitted
    pub fn next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Step to go to when the editor is abandoned
    ///
    /// Without it, abandonment re-presents the same prompt.
    pub fn back(mut self, back: impl Into<String>) -> Self {
        self.back = Some(back.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target_field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn next_step(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn back_step(&self) -> Option<&str> {
        self.back.as_deref()
    }

    /// Component identifier of the bound editor
    pub fn component(&self) -> &str {
        self.editor.component()
    }
}

impl<D> fmt::Debug for PromptStep<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptStep")
            .field("id", &self.id)
            .field("field", &self.field)
            .field("component", &self.editor.component())
            .field("next", &self.next)
            .field("back", &self.back)
            .finish()
    }
}

impl<D> From<PromptStep<D>> for Step<D> {
    fn from(step: PromptStep<D>) -> Self {
        Step::Prompt(step)
    }
}

// =============================================================================
// Invoke
// =============================================================================

/// Runs an asynchronous operation against the context
///
/// On success the result is written to `output` (if declared) and the
/// instance moves to `on_done`. On failure it moves to `on_error`, which
/// defaults to the definition's fatal-error terminal.
pub struct InvokeStep<D> {
    pub(crate) id: String,
    pub(crate) src: Option<Arc<dyn AnyOperation<D>>>,
    pub(crate) on_done: Option<String>,
    pub(crate) on_error: Option<String>,
    pub(crate) output: Option<String>,
}

impl<D: ProcessData> InvokeStep<D> {
    /// Operation to run
    pub fn src<O: Operation<D>>(self, operation: O) -> Self {
        self.src_shared(Arc::new(operation))
    }

    /// Operation to run, shared with other steps or definitions
    pub fn src_shared<O: Operation<D>>(mut self, operation: Arc<O>) -> Self {
        self.src = Some(Arc::new(ErasedOperation::new(operation)));
        self
    }
}

impl<D> InvokeStep<D> {
    /// Step to go to once the operation completes
    pub fn on_done(mut self, target: impl Into<String>) -> Self {
        self.on_done = Some(target.into());
        self
    }

    /// Override the failure target
    pub fn on_error(mut self, target: impl Into<String>) -> Self {
        self.on_error = Some(target.into());
        self
    }

    /// Field the operation result is written to
    pub fn output(mut self, field: impl Into<String>) -> Self {
        self.output = Some(field.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn done_step(&self) -> Option<&str> {
        self.on_done.as_deref()
    }

    pub fn error_step(&self) -> Option<&str> {
        self.on_error.as_deref()
    }

    pub fn output_field(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Name of the bound operation
    pub fn operation(&self) -> Option<&str> {
        self.src.as_ref().map(|op| op.name())
    }
}

impl<D> fmt::Debug for InvokeStep<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokeStep")
            .field("id", &self.id)
            .field("src", &self.operation())
            .field("on_done", &self.on_done)
            .field("on_error", &self.on_error)
            .field("output", &self.output)
            .finish()
    }
}

impl<D> From<InvokeStep<D>> for Step<D> {
    fn from(step: InvokeStep<D>) -> Self {
        Step::Invoke(step)
    }
}

// =============================================================================
// Terminal
// =============================================================================

/// Success or fatal-error sink
pub struct TerminalStep<D> {
    pub(crate) id: String,
    pub(crate) kind: TerminalKind,
    pub(crate) entry: Option<EntryAction<D>>,
}

impl<D> TerminalStep<D> {
    /// Action run exactly once on arrival
    pub fn entry(mut self, action: impl Fn(&ProcessContext<D>) + Send + Sync + 'static) -> Self {
        self.entry = Some(Arc::new(action));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn terminal_kind(&self) -> TerminalKind {
        self.kind
    }

    pub(crate) fn run_entry(&self, ctx: &ProcessContext<D>) {
        if let Some(entry) = &self.entry {
            entry(ctx);
        }
    }
}

impl<D> fmt::Debug for TerminalStep<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalStep")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("entry", &self.entry.is_some())
            .finish()
    }
}

impl<D> From<TerminalStep<D>> for Step<D> {
    fn from(step: TerminalStep<D>) -> Self {
        Step::Terminal(step)
    }
}
