//! Process engine
//!
//! The executor interprets a validated [`ProcessDefinition`](crate::ProcessDefinition)
//! one step at a time. Prompt and invoke steps are the only suspension points;
//! everything between them is synchronous for the instance.

mod executor;

pub use executor::{
    ExecutorError, Outcome, OutcomeCallback, ProcessExecutor, ProcessReport, StartOptions,
};
