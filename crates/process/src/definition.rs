//! Process definitions and definition-time validation
//!
//! A definition is built once and validated before any instance runs:
//! every transition must resolve to a step in the same definition, every
//! invoke needs an operation, and the fatal-error terminal always exists.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{error, warn};

use crate::context::{ProcessContext, ProcessData};
use crate::step::Step;

/// Id of the conventional fatal-error terminal every definition provides
pub const ERROR_STEP_ID: &str = "error";

/// Errors detected while validating a definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// No steps were declared
    #[error("process definition '{0}' has no steps")]
    NoSteps(String),

    /// A step was declared with an empty id
    #[error("step id must not be empty")]
    EmptyStepId,

    /// Two steps share an id
    #[error("duplicate step id: {0}")]
    DuplicateStep(String),

    /// No initial step was set
    #[error("initial step not set")]
    MissingInitialStep,

    /// The initial step does not exist
    #[error("initial step '{0}' does not exist")]
    UnknownInitialStep(String),

    /// A step is missing a required part
    #[error("step '{step}' is missing required '{field}'")]
    MissingField { step: String, field: &'static str },

    /// A transition points at a step that does not exist
    #[error("step '{from}' references unknown step '{to}' via '{transition}'")]
    DanglingTransition {
        from: String,
        to: String,
        transition: &'static str,
    },

    /// The fatal-error id was used by a step that is not an error terminal
    #[error("step id '{0}' is reserved for the fatal-error terminal")]
    ReservedStepId(String),
}

/// A validated, named and versioned graph of steps
pub struct ProcessDefinition<D> {
    pub(crate) name: String,
    pub(crate) version: u32,
    pub(crate) initial_step_id: String,
    pub(crate) steps: HashMap<String, Step<D>>,
    pub(crate) order: Vec<String>,
}

impl<D: ProcessData> ProcessDefinition<D> {
    /// Start building a definition
    pub fn builder(name: impl Into<String>) -> ProcessDefinitionBuilder<D> {
        ProcessDefinitionBuilder {
            name: name.into(),
            version: 1,
            initial_step_id: None,
            steps: Vec::new(),
        }
    }
}

impl<D> ProcessDefinition<D> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn initial_step_id(&self) -> &str {
        &self.initial_step_id
    }

    /// Id of the fatal-error terminal
    pub fn error_step_id(&self) -> &str {
        ERROR_STEP_ID
    }

    /// Look up a step by id
    pub fn step(&self, id: &str) -> Option<&Step<D>> {
        self.steps.get(id)
    }

    /// Step ids in declaration order (the synthesized error terminal last)
    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Number of steps, including the fatal-error terminal
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<D> std::fmt::Debug for ProcessDefinition<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessDefinition")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("initial_step_id", &self.initial_step_id)
            .field("steps", &self.order)
            .finish()
    }
}

/// Builder for [`ProcessDefinition`]
///
/// # Example
///
/// ```ignore
/// let definition = ProcessDefinition::builder("fundSafeFromEoa")
///     .initial("info")
///     .step(Step::prompt("info", viewer, params).next("execute"))
///     .step(Step::invoke("execute").src(transfer).on_done("success"))
///     .step(Step::success("success"))
///     .build()?;
/// ```
pub struct ProcessDefinitionBuilder<D> {
    name: String,
    version: u32,
    initial_step_id: Option<String>,
    steps: Vec<Step<D>>,
}

impl<D: ProcessData> ProcessDefinitionBuilder<D> {
    /// Set the definition version
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the initial step
    pub fn initial(mut self, step_id: impl Into<String>) -> Self {
        self.initial_step_id = Some(step_id.into());
        self
    }

    /// Add a step
    pub fn step(mut self, step: impl Into<Step<D>>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Validate and build the definition
    pub fn build(self) -> Result<ProcessDefinition<D>, DefinitionError> {
        let ProcessDefinitionBuilder {
            name,
            version,
            initial_step_id,
            steps: declared,
        } = self;

        if declared.is_empty() {
            return Err(DefinitionError::NoSteps(name));
        }

        let mut steps = HashMap::with_capacity(declared.len() + 1);
        let mut order = Vec::with_capacity(declared.len() + 1);

        for step in declared {
            let id = step.id().to_string();
            if id.is_empty() {
                return Err(DefinitionError::EmptyStepId);
            }
            if id == ERROR_STEP_ID && !step.is_error_terminal() {
                return Err(DefinitionError::ReservedStepId(id));
            }
            check_required(&step)?;
            if steps.contains_key(&id) {
                return Err(DefinitionError::DuplicateStep(id));
            }
            order.push(id.clone());
            steps.insert(id, step);
        }

        if !steps.contains_key(ERROR_STEP_ID) {
            let sink = Step::<D>::error(ERROR_STEP_ID).entry(report_fatal_error::<D>);
            order.push(ERROR_STEP_ID.to_string());
            steps.insert(ERROR_STEP_ID.to_string(), sink.into());
        }

        let initial_step_id = initial_step_id.ok_or(DefinitionError::MissingInitialStep)?;
        if !steps.contains_key(&initial_step_id) {
            return Err(DefinitionError::UnknownInitialStep(initial_step_id));
        }

        for id in &order {
            let step = &steps[id];
            for (transition, target) in step.transitions() {
                if !steps.contains_key(target) {
                    return Err(DefinitionError::DanglingTransition {
                        from: id.clone(),
                        to: target.to_string(),
                        transition,
                    });
                }
            }
        }

        let definition = ProcessDefinition {
            name,
            version,
            initial_step_id,
            steps,
            order,
        };

        for id in unreachable_steps(&definition) {
            warn!(process = %definition.name, step_id = %id, "step is unreachable from the initial step");
        }

        Ok(definition)
    }
}

fn check_required<D>(step: &Step<D>) -> Result<(), DefinitionError> {
    let missing = |field| DefinitionError::MissingField {
        step: step.id().to_string(),
        field,
    };

    match step {
        Step::Prompt(prompt) => {
            if prompt.next.is_none() {
                return Err(missing("navigation.next"));
            }
            if prompt.field.as_deref() == Some("") {
                return Err(missing("field"));
            }
        }
        Step::Invoke(invoke) => {
            if invoke.src.is_none() {
                return Err(missing("src"));
            }
            if invoke.on_done.is_none() {
                return Err(missing("on_done"));
            }
            if invoke.output.as_deref() == Some("") {
                return Err(missing("output"));
            }
        }
        Step::Terminal(_) => {}
    }
    Ok(())
}

/// Steps that cannot be reached from the initial step
///
/// Invoke steps implicitly reach the fatal-error terminal.
fn unreachable_steps<D>(definition: &ProcessDefinition<D>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([definition.initial_step_id.as_str()]);

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        let Some(step) = definition.steps.get(id) else {
            continue;
        };
        for (_, target) in step.transitions() {
            queue.push_back(target);
        }
        if matches!(step, Step::Invoke(_)) {
            queue.push_back(ERROR_STEP_ID);
        }
    }

    definition
        .order
        .iter()
        .filter(|id| id.as_str() != ERROR_STEP_ID && !seen.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Default entry of the synthesized fatal-error terminal
fn report_fatal_error<D>(ctx: &ProcessContext<D>) {
    match &ctx.last_error {
        Some(err) => error!(
            process_id = %ctx.process_id,
            step_id = %err.step_id,
            kind = ?err.kind,
            error = %err.message,
            "process failed"
        ),
        None => error!(process_id = %ctx.process_id, "process failed without error details"),
    }
}
