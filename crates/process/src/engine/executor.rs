//! Process executor
//!
//! The `ProcessExecutor` is responsible for:
//! - Starting instances and guarding against duplicate live instances
//! - Dispatching prompt, invoke and terminal steps
//! - Funnelling failures into the fatal-error terminal
//! - Notifying observers of every transition

use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::context::{ErrorInfo, FailureKind, ProcessContext, ProcessData};
use crate::definition::{ProcessDefinition, ERROR_STEP_ID};
use crate::editor::EditorOutcome;
use crate::observer::{NoopObserver, ProcessEvent, ProcessEventKind, ProcessObserver};
use crate::step::{InvokeStep, PromptStep, Step, TerminalKind};

/// Callback invoked with the final data when an instance finishes
pub type OutcomeCallback<D> = Box<dyn FnOnce(&D) + Send>;

/// Errors from executor operations
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// An instance with the same key is still running
    #[error("process instance {0} is already running")]
    InstanceAlreadyRunning(String),
}

/// How an instance ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// Options for starting an instance
pub struct StartOptions<D> {
    /// Caller-supplied instance id
    pub process_id: String,

    /// Skip the initial prompt when its field already holds a value
    pub skip_if_not_dirty: bool,

    on_success: Option<OutcomeCallback<D>>,
    on_error: Option<OutcomeCallback<D>>,
}

impl<D> StartOptions<D> {
    pub fn new(process_id: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            skip_if_not_dirty: false,
            on_success: None,
            on_error: None,
        }
    }

    pub fn skip_if_not_dirty(mut self, skip: bool) -> Self {
        self.skip_if_not_dirty = skip;
        self
    }

    /// Called once with the final data if the instance reaches a success terminal
    pub fn on_success(mut self, callback: impl FnOnce(&D) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Called once with the final data if the instance reaches an error terminal
    pub fn on_error(mut self, callback: impl FnOnce(&D) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl<D> std::fmt::Debug for StartOptions<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartOptions")
            .field("process_id", &self.process_id)
            .field("skip_if_not_dirty", &self.skip_if_not_dirty)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Result of running an instance to a terminal step
#[derive(Debug)]
pub struct ProcessReport<D> {
    /// `"{process_id}:{definition name}"`
    pub instance_key: String,

    /// Unique id of this run
    pub run_id: Uuid,

    pub outcome: Outcome,

    /// Terminal step the instance stopped at
    pub final_step_id: String,

    /// Final context, including `last_error` on failure
    pub context: ProcessContext<D>,

    /// Number of step transitions taken
    pub transitions: usize,
}

impl<D> ProcessReport<D> {
    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }

    pub fn data(&self) -> &D {
        &self.context.data
    }

    pub fn last_error(&self) -> Option<&ErrorInfo> {
        self.context.last_error.as_ref()
    }

    /// Take the final data
    pub fn into_data(self) -> D {
        self.context.data
    }
}

/// Process executor
///
/// One executor can run any number of instances of any definitions
/// concurrently. Instances share nothing but the observer and the set of
/// live instance keys.
///
/// # Example
///
/// ```ignore
/// let executor = ProcessExecutor::new().with_observer(Arc::new(RecordingObserver::new()));
///
/// let report = executor
///     .run(&definition, data, StartOptions::new("session-1"))
///     .await?;
///
/// assert!(report.succeeded());
/// ```
pub struct ProcessExecutor {
    config: EngineConfig,
    observer: Arc<dyn ProcessObserver>,
    active: Arc<DashMap<String, Uuid>>,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessExecutor {
    /// Create an executor with the default config
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an executor with custom config
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            observer: Arc::new(NoopObserver),
            active: Arc::new(DashMap::new()),
        }
    }

    /// Set the observer notified of process events
    pub fn with_observer(mut self, observer: Arc<dyn ProcessObserver>) -> Self {
        debug!(observer = observer.name(), "process observer attached");
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of instances currently running
    pub fn active_instances(&self) -> usize {
        self.active.len()
    }

    /// Check whether an instance with this key is running
    pub fn is_running(&self, instance_key: &str) -> bool {
        self.active.contains_key(instance_key)
    }

    /// Run an instance of `definition` until it reaches a terminal step
    ///
    /// Fails only when an instance with the same key is already running;
    /// process failures are reported through [`ProcessReport::outcome`].
    #[instrument(
        skip_all,
        fields(process = %definition.name(), process_id = %options.process_id)
    )]
    pub async fn run<D: ProcessData>(
        &self,
        definition: &ProcessDefinition<D>,
        data: D,
        options: StartOptions<D>,
    ) -> Result<ProcessReport<D>, ExecutorError> {
        let instance_key = format!("{}:{}", options.process_id, definition.name());
        let run_id = Uuid::now_v7();
        let _guard = self.claim(&instance_key, run_id)?;

        let StartOptions {
            process_id,
            skip_if_not_dirty,
            on_success,
            on_error,
        } = options;

        info!(instance = %instance_key, %run_id, "starting process instance");

        let mut events = EventSink {
            observer: self.observer.as_ref(),
            instance_key,
            run_id,
            sequence: 0,
        };
        events
            .emit(ProcessEventKind::InstanceStarted {
                definition: definition.name().to_string(),
                version: definition.version(),
                initial_step_id: definition.initial_step_id().to_string(),
            })
            .await;

        let mut ctx = ProcessContext::new(process_id, data);
        let mut current = definition.initial_step_id().to_string();
        let mut transitions = 0usize;

        if skip_if_not_dirty {
            if let Some((field, next)) = skippable_prompt(definition, &ctx) {
                debug!(step_id = %current, %field, "initial field already set, skipping prompt");
                events
                    .emit(ProcessEventKind::PromptSkipped {
                        step_id: current.clone(),
                        field,
                    })
                    .await;
                current = next;
                transitions += 1;
            }
        }

        let (final_step_id, outcome) = loop {
            ctx.current_step_id = current.clone();
            let step = definition.step(&current);
            events
                .emit(ProcessEventKind::StepEntered {
                    step_id: current.clone(),
                    step_kind: step.map(Step::kind),
                })
                .await;

            let Some(step) = step else {
                error!(step_id = %current, "step does not exist");
                ctx.set_error(ErrorInfo::new(
                    FailureKind::InvariantViolation,
                    &current,
                    format!(
                        "step '{}' does not exist in process '{}'",
                        current,
                        definition.name()
                    ),
                ));
                if current == ERROR_STEP_ID {
                    break (current, Outcome::Failed);
                }
                current = ERROR_STEP_ID.to_string();
                transitions += 1;
                continue;
            };

            // reaching a terminal never counts against the limit
            let is_terminal = matches!(step, Step::Terminal(_));
            if transitions >= self.config.max_transitions && !is_terminal {
                warn!(
                    step_id = %current,
                    limit = self.config.max_transitions,
                    "transition limit exceeded"
                );
                ctx.set_error(ErrorInfo::new(
                    FailureKind::TransitionLimit,
                    &current,
                    format!(
                        "transition limit of {} exceeded",
                        self.config.max_transitions
                    ),
                ));
                current = ERROR_STEP_ID.to_string();
                transitions += 1;
                continue;
            }

            let next = match step {
                Step::Prompt(prompt) => dispatch_prompt(prompt, &mut ctx, &mut events).await,
                Step::Invoke(invoke) => dispatch_invoke(invoke, &mut ctx, &mut events).await,
                Step::Terminal(terminal) => {
                    debug!(step_id = %current, kind = ?terminal.kind, "entering terminal step");
                    terminal.run_entry(&ctx);
                    let outcome = match terminal.kind {
                        TerminalKind::Success => Outcome::Succeeded,
                        TerminalKind::Error => Outcome::Failed,
                    };
                    break (current, outcome);
                }
            };

            transitions += 1;
            current = next;
        };

        let callback = match outcome {
            Outcome::Succeeded => on_success,
            Outcome::Failed => on_error,
        };
        if let Some(callback) = callback {
            callback(&ctx.data);
        }

        events
            .emit(ProcessEventKind::InstanceFinished {
                final_step_id: final_step_id.clone(),
                succeeded: outcome == Outcome::Succeeded,
                transitions,
            })
            .await;

        match outcome {
            Outcome::Succeeded => {
                info!(instance = %events.instance_key, %final_step_id, transitions, "process instance succeeded")
            }
            Outcome::Failed => warn!(
                instance = %events.instance_key,
                %final_step_id,
                transitions,
                error = ?ctx.last_error.as_ref().map(|e| e.message.as_str()),
                "process instance failed"
            ),
        }

        Ok(ProcessReport {
            instance_key: events.instance_key,
            run_id,
            outcome,
            final_step_id,
            context: ctx,
            transitions,
        })
    }

    fn claim(&self, instance_key: &str, run_id: Uuid) -> Result<ActiveGuard, ExecutorError> {
        match self.active.entry(instance_key.to_string()) {
            Entry::Occupied(_) => {
                warn!(instance = %instance_key, "instance already running");
                Err(ExecutorError::InstanceAlreadyRunning(
                    instance_key.to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(run_id);
                Ok(ActiveGuard {
                    active: self.active.clone(),
                    key: instance_key.to_string(),
                })
            }
        }
    }
}

/// Releases an instance key when the run ends, even if the run future is dropped
struct ActiveGuard {
    active: Arc<DashMap<String, Uuid>>,
    key: String,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.remove(&self.key);
    }
}

/// Numbers and forwards events for one run
struct EventSink<'a> {
    observer: &'a dyn ProcessObserver,
    instance_key: String,
    run_id: Uuid,
    sequence: u64,
}

impl EventSink<'_> {
    async fn emit(&mut self, kind: ProcessEventKind) {
        let event = ProcessEvent {
            instance_key: self.instance_key.clone(),
            run_id: self.run_id,
            sequence: self.sequence,
            kind,
            at: Utc::now(),
        };
        self.sequence += 1;
        self.observer.on_event(&event).await;
    }
}

/// Field and target of the initial prompt, if it can be skipped
fn skippable_prompt<D: ProcessData>(
    definition: &ProcessDefinition<D>,
    ctx: &ProcessContext<D>,
) -> Option<(String, String)> {
    let Some(Step::Prompt(prompt)) = definition.step(definition.initial_step_id()) else {
        return None;
    };
    let field = prompt.field.as_ref()?;
    let next = prompt.next.as_ref()?;
    ctx.has_field(field)
        .unwrap_or(false)
        .then(|| (field.clone(), next.clone()))
}

/// Target of a transition validation guarantees, or the error terminal
fn required_target<D>(
    ctx: &mut ProcessContext<D>,
    step_id: &str,
    target: Option<&String>,
    transition: &str,
) -> String {
    match target {
        Some(target) => target.clone(),
        None => {
            error!(%step_id, transition, "step has no target for transition");
            ctx.last_error = Some(ErrorInfo::new(
                FailureKind::InvariantViolation,
                step_id,
                format!("step '{step_id}' has no '{transition}' target"),
            ));
            ERROR_STEP_ID.to_string()
        }
    }
}

async fn dispatch_prompt<D: ProcessData>(
    prompt: &PromptStep<D>,
    ctx: &mut ProcessContext<D>,
    events: &mut EventSink<'_>,
) -> String {
    let component = prompt.component().to_string();
    debug!(step_id = %prompt.id, %component, "presenting editor");

    match prompt.editor.edit_json(ctx).await {
        Ok(EditorOutcome::Submitted(value)) => {
            if let Some(field) = &prompt.field {
                if let Err(e) = ctx.write_field(field, value) {
                    warn!(step_id = %prompt.id, %field, error = %e, "failed to write prompt value");
                    ctx.set_error(ErrorInfo::new(
                        FailureKind::FieldWrite,
                        &prompt.id,
                        e.to_string(),
                    ));
                    return ERROR_STEP_ID.to_string();
                }
            }
            events
                .emit(ProcessEventKind::PromptSubmitted {
                    step_id: prompt.id.clone(),
                    component,
                    field: prompt.field.clone(),
                })
                .await;
            required_target(ctx, &prompt.id, prompt.next.as_ref(), "next")
        }
        Ok(EditorOutcome::Abandoned) => {
            let target = prompt.back.clone().unwrap_or_else(|| prompt.id.clone());
            debug!(step_id = %prompt.id, %target, "editor abandoned");
            events
                .emit(ProcessEventKind::PromptAbandoned {
                    step_id: prompt.id.clone(),
                    component,
                    target: target.clone(),
                })
                .await;
            target
        }
        Err(e) => {
            warn!(step_id = %prompt.id, %component, error = %e, "editor failed");
            ctx.set_error(ErrorInfo::new(FailureKind::Editor, &prompt.id, e.to_string()));
            ERROR_STEP_ID.to_string()
        }
    }
}

async fn dispatch_invoke<D: ProcessData>(
    invoke: &InvokeStep<D>,
    ctx: &mut ProcessContext<D>,
    events: &mut EventSink<'_>,
) -> String {
    let Some(operation) = &invoke.src else {
        return required_target(ctx, &invoke.id, None, "src");
    };
    let name = operation.name().to_string();
    debug!(step_id = %invoke.id, operation = %name, "running operation");

    match operation.run_json(ctx).await {
        Ok(value) => {
            if let Some(field) = &invoke.output {
                if let Err(e) = ctx.write_field(field, value) {
                    warn!(step_id = %invoke.id, %field, error = %e, "failed to write operation result");
                    ctx.set_error(ErrorInfo::new(
                        FailureKind::FieldWrite,
                        &invoke.id,
                        e.to_string(),
                    ));
                    return ERROR_STEP_ID.to_string();
                }
            }
            events
                .emit(ProcessEventKind::OperationCompleted {
                    step_id: invoke.id.clone(),
                    operation: name,
                })
                .await;
            required_target(ctx, &invoke.id, invoke.on_done.as_ref(), "on_done")
        }
        Err(e) => {
            let mut info = ErrorInfo::new(FailureKind::Operation, &invoke.id, e.message);
            if let Some(error_type) = e.error_type {
                info = info.with_type(error_type);
            }
            if let Some(details) = e.details {
                info = info.with_details(details);
            }
            warn!(step_id = %invoke.id, operation = %name, error = %info.message, "operation failed");

            ctx.set_error(info.clone());
            events
                .emit(ProcessEventKind::OperationFailed {
                    step_id: invoke.id.clone(),
                    error: info,
                })
                .await;
            invoke
                .on_error
                .clone()
                .unwrap_or_else(|| ERROR_STEP_ID.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{Editor, EditorError};
    use crate::observer::RecordingObserver;
    use crate::operation::{Operation, OperationError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::assert_ok;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Data {
        name: Option<String>,
        result: Option<u32>,
    }

    fn data() -> Data {
        Data {
            name: None,
            result: None,
        }
    }

    /// Editor that replays a scripted list of outcomes
    struct Scripted {
        outcomes: parking_lot::Mutex<Vec<Result<EditorOutcome<serde_json::Value>, EditorError>>>,
    }

    impl Scripted {
        fn new(
            mut outcomes: Vec<Result<EditorOutcome<serde_json::Value>, EditorError>>,
        ) -> Arc<Self> {
            outcomes.reverse();
            Arc::new(Self {
                outcomes: parking_lot::Mutex::new(outcomes),
            })
        }
    }

    #[async_trait]
    impl Editor<Data> for Scripted {
        type Params = ();
        type Output = serde_json::Value;

        fn component(&self) -> &str {
            "scripted"
        }

        async fn edit(
            &self,
            _params: &(),
            _ctx: &ProcessContext<Data>,
        ) -> Result<EditorOutcome<serde_json::Value>, EditorError> {
            self.outcomes
                .lock()
                .pop()
                .unwrap_or(Err(EditorError::FrontendClosed))
        }
    }

    struct Answer(Result<u32, OperationError>);

    #[async_trait]
    impl Operation<Data> for Answer {
        type Output = u32;

        fn name(&self) -> &str {
            "answer"
        }

        async fn run(&self, _ctx: &ProcessContext<Data>) -> Result<u32, OperationError> {
            self.0.clone()
        }
    }

    fn definition(
        editor: Arc<Scripted>,
        answer: Result<u32, OperationError>,
    ) -> ProcessDefinition<Data> {
        ProcessDefinition::builder("test")
            .initial("ask")
            .step(
                Step::<Data>::prompt("ask", editor, ())
                    .field("name")
                    .next("compute"),
            )
            .step(
                Step::<Data>::invoke("compute")
                    .src(Answer(answer))
                    .output("result")
                    .on_done("done"),
            )
            .step(Step::<Data>::success("done"))
            .build()
            .expect("valid definition")
    }

    fn submit(value: &str) -> Result<EditorOutcome<serde_json::Value>, EditorError> {
        Ok(EditorOutcome::Submitted(serde_json::json!(value)))
    }

    #[tokio::test]
    async fn test_happy_path() {
        let observer = Arc::new(RecordingObserver::new());
        let executor = ProcessExecutor::new().with_observer(observer.clone());
        let definition = definition(Scripted::new(vec![submit("ada")]), Ok(42));

        let report = executor
            .run(&definition, data(), StartOptions::new("p-1"))
            .await
            .unwrap();

        assert!(report.succeeded());
        assert_eq!(report.instance_key, "p-1:test");
        assert_eq!(report.final_step_id, "done");
        assert_eq!(report.transitions, 2);
        assert_eq!(
            report.data(),
            &Data {
                name: Some("ada".to_string()),
                result: Some(42),
            }
        );
        assert_eq!(
            observer.step_path("p-1:test"),
            vec!["ask", "compute", "done"]
        );
        assert_eq!(executor.active_instances(), 0);
    }

    #[tokio::test]
    async fn test_events_are_sequenced() {
        let observer = Arc::new(RecordingObserver::new());
        let executor = ProcessExecutor::new().with_observer(observer.clone());
        let definition = definition(Scripted::new(vec![submit("ada")]), Ok(1));

        let report = executor
            .run(&definition, data(), StartOptions::new("p-1"))
            .await
            .unwrap();

        let events = observer.events();
        assert!(events.iter().all(|e| e.run_id == report.run_id));
        let sequences: Vec<u64> = events.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, (0..events.len() as u64).collect::<Vec<_>>());
        assert_eq!(events[0].kind.event_type(), "instance_started");
        assert_eq!(events[events.len() - 1].kind.event_type(), "instance_finished");
    }

    #[tokio::test]
    async fn test_operation_failure_reaches_error_terminal() {
        let definition = definition(
            Scripted::new(vec![submit("ada")]),
            Err(OperationError::new("insufficient balance").with_type("BALANCE")),
        );
        let failed = Arc::new(AtomicUsize::new(0));
        let counter = failed.clone();

        let report = ProcessExecutor::new()
            .run(
                &definition,
                data(),
                StartOptions::new("p-1")
                    .on_success(|_| panic!("success callback must not run"))
                    .on_error(move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .await
            .unwrap();

        assert_eq!(report.outcome, Outcome::Failed);
        assert_eq!(report.final_step_id, ERROR_STEP_ID);
        let error = report.last_error().unwrap();
        assert_eq!(error.kind, FailureKind::Operation);
        assert_eq!(error.step_id, "compute");
        assert_eq!(error.message, "insufficient balance");
        assert_eq!(error.error_type.as_deref(), Some("BALANCE"));
        assert_eq!(report.data().name.as_deref(), Some("ada"));
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_editor_error_reaches_error_terminal() {
        let definition = definition(
            Scripted::new(vec![Err(EditorError::Failed("render".to_string()))]),
            Ok(1),
        );

        let report = ProcessExecutor::new()
            .run(&definition, data(), StartOptions::new("p-1"))
            .await
            .unwrap();

        assert_eq!(report.outcome, Outcome::Failed);
        assert_eq!(report.last_error().unwrap().kind, FailureKind::Editor);
    }

    #[tokio::test]
    async fn test_field_write_failure_reaches_error_terminal() {
        let definition = definition(
            Scripted::new(vec![Ok(EditorOutcome::Submitted(serde_json::json!(7)))]),
            Ok(1),
        );

        let report = ProcessExecutor::new()
            .run(&definition, data(), StartOptions::new("p-1"))
            .await
            .unwrap();

        assert_eq!(report.outcome, Outcome::Failed);
        let error = report.last_error().unwrap();
        assert_eq!(error.kind, FailureKind::FieldWrite);
        assert_eq!(error.step_id, "ask");
        assert_eq!(report.data(), &data());
    }

    #[tokio::test]
    async fn test_abandon_reprompts_same_step() {
        let observer = Arc::new(RecordingObserver::new());
        let definition = definition(
            Scripted::new(vec![
                Ok(EditorOutcome::Abandoned),
                Ok(EditorOutcome::Abandoned),
                submit("ada"),
            ]),
            Ok(1),
        );

        let report = ProcessExecutor::new()
            .with_observer(observer.clone())
            .run(&definition, data(), StartOptions::new("p-1"))
            .await
            .unwrap();

        assert!(report.succeeded());
        assert_eq!(
            observer.step_path("p-1:test"),
            vec!["ask", "ask", "ask", "compute", "done"]
        );
        assert_eq!(observer.count("prompt_abandoned"), 2);
    }

    #[tokio::test]
    async fn test_transition_limit() {
        let definition = definition(
            Scripted::new(vec![Ok(EditorOutcome::Abandoned); 10]),
            Ok(1),
        );
        let executor =
            ProcessExecutor::with_config(EngineConfig::default().with_max_transitions(3));

        let report = executor
            .run(&definition, data(), StartOptions::new("p-1"))
            .await
            .unwrap();

        assert_eq!(report.outcome, Outcome::Failed);
        assert_eq!(report.final_step_id, ERROR_STEP_ID);
        assert_eq!(
            report.last_error().unwrap().kind,
            FailureKind::TransitionLimit
        );
    }

    #[tokio::test]
    async fn test_skip_if_not_dirty() {
        let observer = Arc::new(RecordingObserver::new());
        let definition = definition(Scripted::new(vec![]), Ok(1));
        let seeded = Data {
            name: Some("ada".to_string()),
            result: None,
        };

        let report = ProcessExecutor::new()
            .with_observer(observer.clone())
            .run(
                &definition,
                seeded,
                StartOptions::new("p-1").skip_if_not_dirty(true),
            )
            .await
            .unwrap();

        assert!(report.succeeded());
        assert_eq!(observer.step_path("p-1:test"), vec!["compute", "done"]);
        assert_eq!(observer.count("prompt_skipped"), 1);
    }

    #[tokio::test]
    async fn test_skip_if_not_dirty_prompts_when_field_empty() {
        let definition = definition(Scripted::new(vec![submit("ada")]), Ok(1));
        let seeded = Data {
            name: Some(String::new()),
            result: None,
        };

        let report = ProcessExecutor::new()
            .run(
                &definition,
                seeded,
                StartOptions::new("p-1").skip_if_not_dirty(true),
            )
            .await
            .unwrap();

        assert_eq!(report.data().name.as_deref(), Some("ada"));
    }

    #[test]
    fn test_claim_rejects_duplicate_key() {
        let executor = ProcessExecutor::new();

        let guard = assert_ok!(executor.claim("p-1:test", Uuid::now_v7()));
        assert!(executor.is_running("p-1:test"));
        assert!(matches!(
            executor.claim("p-1:test", Uuid::now_v7()),
            Err(ExecutorError::InstanceAlreadyRunning(key)) if key == "p-1:test"
        ));

        drop(guard);
        assert!(!executor.is_running("p-1:test"));
        assert_ok!(executor.claim("p-1:test", Uuid::now_v7()));
    }
}
