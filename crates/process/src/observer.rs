// Process Observers
//
// Observers receive a stream of process events for every instance the
// executor runs. They are notified inline, so implementations should be fast;
// heavier processing belongs in a spawned task.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ErrorInfo;
use crate::step::StepKind;

// ============================================================================
// Events
// ============================================================================

/// Event emitted while an instance runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEvent {
    /// Instance key (`"{process_id}:{definition name}"`)
    pub instance_key: String,

    /// Unique id of this run
    pub run_id: Uuid,

    /// Position of the event within the run, starting at 0
    pub sequence: u64,

    /// What happened
    pub kind: ProcessEventKind,

    /// When it happened
    pub at: DateTime<Utc>,
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessEventKind {
    InstanceStarted {
        definition: String,
        version: u32,
        initial_step_id: String,
    },
    StepEntered {
        step_id: String,
        step_kind: Option<StepKind>,
    },
    PromptSkipped {
        step_id: String,
        field: String,
    },
    PromptSubmitted {
        step_id: String,
        component: String,
        field: Option<String>,
    },
    PromptAbandoned {
        step_id: String,
        component: String,
        target: String,
    },
    OperationCompleted {
        step_id: String,
        operation: String,
    },
    OperationFailed {
        step_id: String,
        error: ErrorInfo,
    },
    InstanceFinished {
        final_step_id: String,
        succeeded: bool,
        transitions: usize,
    },
}

impl ProcessEventKind {
    /// Event type name, matching the serialized tag
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::InstanceStarted { .. } => "instance_started",
            Self::StepEntered { .. } => "step_entered",
            Self::PromptSkipped { .. } => "prompt_skipped",
            Self::PromptSubmitted { .. } => "prompt_submitted",
            Self::PromptAbandoned { .. } => "prompt_abandoned",
            Self::OperationCompleted { .. } => "operation_completed",
            Self::OperationFailed { .. } => "operation_failed",
            Self::InstanceFinished { .. } => "instance_finished",
        }
    }
}

// ============================================================================
// ProcessObserver Trait
// ============================================================================

/// Trait for receiving process events
///
/// # Example
///
/// ```ignore
/// struct StepCounter(AtomicU64);
///
/// #[async_trait]
/// impl ProcessObserver for StepCounter {
///     async fn on_event(&self, event: &ProcessEvent) {
///         if let ProcessEventKind::StepEntered { .. } = event.kind {
///             self.0.fetch_add(1, Ordering::Relaxed);
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait ProcessObserver: Send + Sync {
    /// Called for every event, in order
    async fn on_event(&self, event: &ProcessEvent);

    /// Human-readable name for logging/debugging
    fn name(&self) -> &'static str {
        "ProcessObserver"
    }
}

// ============================================================================
// NoopObserver
// ============================================================================

/// Observer that ignores every event
#[derive(Debug, Clone, Default)]
pub struct NoopObserver;

#[async_trait]
impl ProcessObserver for NoopObserver {
    async fn on_event(&self, _event: &ProcessEvent) {}

    fn name(&self) -> &'static str {
        "NoopObserver"
    }
}

// ============================================================================
// CompositeObserver
// ============================================================================

/// Observer that forwards events to several observers
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ProcessObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ProcessObserver>>) -> Self {
        Self { observers }
    }

    /// Add an observer
    pub fn add(&mut self, observer: Arc<dyn ProcessObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[async_trait]
impl ProcessObserver for CompositeObserver {
    async fn on_event(&self, event: &ProcessEvent) {
        for observer in &self.observers {
            observer.on_event(event).await;
        }
    }

    fn name(&self) -> &'static str {
        "CompositeObserver"
    }
}

// ============================================================================
// RecordingObserver
// ============================================================================

/// Observer that keeps every event in memory
///
/// Mostly useful in tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProcessEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far
    pub fn events(&self) -> Vec<ProcessEvent> {
        self.events.lock().clone()
    }

    /// Events recorded for one instance
    pub fn events_for(&self, instance_key: &str) -> Vec<ProcessEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.instance_key == instance_key)
            .cloned()
            .collect()
    }

    /// Step ids entered by one instance, in order
    pub fn step_path(&self, instance_key: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.instance_key == instance_key)
            .filter_map(|e| match &e.kind {
                ProcessEventKind::StepEntered { step_id, .. } => Some(step_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded events of the given type
    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind.event_type() == event_type)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl ProcessObserver for RecordingObserver {
    async fn on_event(&self, event: &ProcessEvent) {
        self.events.lock().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "RecordingObserver"
    }
}

// ============================================================================
// Tests
// ============================================================================
