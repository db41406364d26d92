//! # Process Engine
//!
//! A declarative step-graph engine for short, user-facing processes.
//!
//! ## Features
//!
//! - **Three step kinds**: prompts collect a value through an editor, invokes run
//!   an asynchronous operation, terminals end the instance
//! - **Typed context**: each definition declares its own serde data record
//! - **Definition-time validation**: dangling transitions are rejected when the
//!   definition is built
//! - **Uniform error path**: every failure lands in the `"error"` terminal with
//!   `last_error` describing it
//! - **Observers**: pluggable event listeners for every transition
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ProcessExecutor                         │
//! │  (interprets steps, funnels failures, emits events)         │
//! └─────────────────────────────────────────────────────────────┘
//!            │                                   │
//!            ▼                                   ▼
//! ┌──────────────────────────┐     ┌──────────────────────────┐
//! │     Editor (prompt)      │     │   Operation (invoke)     │
//! │  renders, submits value  │     │  async work on context   │
//! └──────────────────────────┘     └──────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_process::prelude::*;
//!
//! let definition = ProcessDefinition::builder("greet")
//!     .initial("ask")
//!     .step(Step::prompt("ask", text_editor, params).field("name").next("save"))
//!     .step(Step::invoke("save").src(SaveName).on_done("done"))
//!     .step(Step::success("done"))
//!     .build()?;
//!
//! let report = ProcessExecutor::new()
//!     .run(&definition, Greeting::default(), StartOptions::new("session-1"))
//!     .await?;
//! ```

pub mod config;
pub mod context;
pub mod definition;
pub mod editor;
pub mod engine;
pub mod observer;
pub mod operation;
pub mod step;

pub use config::EngineConfig;
pub use context::{ErrorInfo, FailureKind, FieldError, ProcessContext, ProcessData};
pub use definition::{DefinitionError, ProcessDefinition, ProcessDefinitionBuilder, ERROR_STEP_ID};
pub use editor::{Editor, EditorError, EditorOutcome};
pub use engine::{ExecutorError, Outcome, ProcessExecutor, ProcessReport, StartOptions};
pub use observer::{
    CompositeObserver, NoopObserver, ProcessEvent, ProcessEventKind, ProcessObserver,
    RecordingObserver,
};
pub use operation::{from_fn, FnOperation, Operation, OperationError, RetryPolicy, Retrying};
pub use step::{InvokeStep, PromptStep, Step, StepKind, TerminalKind, TerminalStep};

/// Prelude for common imports
pub mod prelude {
    pub use crate::context::{ErrorInfo, FailureKind, ProcessContext};
    pub use crate::definition::{DefinitionError, ProcessDefinition};
    pub use crate::editor::{Editor, EditorError, EditorOutcome};
    pub use crate::engine::{Outcome, ProcessExecutor, ProcessReport, StartOptions};
    pub use crate::observer::{ProcessObserver, RecordingObserver};
    pub use crate::operation::{Operation, OperationError, RetryPolicy, Retrying};
    pub use crate::step::Step;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
