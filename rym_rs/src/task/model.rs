//! Task descriptors: task types, their operations and parameters.
//!
//! Nothing here is discovered by reflection. A task library registers each
//! task type explicitly through [`TaskType::builder`], which captures a
//! zero-argument factory (`T::default`) and type-erased operation handlers.

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio_util::sync::CancellationToken;

use super::args::BoundArgs;
use super::value::{ParamKind, Value};
use crate::naming::to_token;

/// Upcast helper so operation handlers can recover the concrete task type.
pub trait AsAny: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A task instance. One is created per invocation and dropped right after.
pub trait Task: AsAny {
    /// Receives the dispatch context before the operation runs.
    fn attach(&mut self, _ctx: TaskContext) {}

    /// Called exactly once after the operation returns, fails or panics.
    fn dispose(&mut self) {}
}

/// Per-dispatch context handed to every fresh task instance.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    /// Cancelled by the launcher on interrupt. Tasks decide how to react.
    pub cancellation: CancellationToken,
    pub debug: bool,
    pub trace: bool,
}

impl TaskContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

pub type TaskFactory = Arc<dyn Fn() -> Box<dyn Task> + Send + Sync>;
pub type OperationHandler =
    Arc<dyn Fn(&mut dyn Task, &BoundArgs) -> Result<()> + Send + Sync>;

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
    description: Option<String>,
}

impl Parameter {
    /// Mandatory parameter: must be given by name or by position.
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            description: None,
        }
    }

    /// Optional parameter seeded with `default` until supplied by name.
    pub fn optional(name: impl Into<String>, kind: ParamKind, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default.into()),
            description: None,
        }
    }

    /// Boolean switch, `false` unless given.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::required(name, ParamKind::Bool)
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> String {
        to_token(&self.name)
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Booleans never need a value, so they are never mandatory.
    pub fn is_mandatory(&self) -> bool {
        self.default.is_none() && self.kind != ParamKind::Bool
    }

    /// Value present before any token is parsed.
    pub fn seed(&self) -> Option<Value> {
        match (&self.default, self.kind) {
            (Some(value), _) => Some(value.clone()),
            (None, ParamKind::Bool) => Some(Value::Bool(false)),
            (None, _) => None,
        }
    }
}

/// An invocable operation of a task type.
#[derive(Clone)]
pub struct Operation {
    name: String,
    description: Option<String>,
    parameters: Vec<Parameter>,
    inherited: bool,
    handler: OperationHandler,
}

impl Operation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> String {
        to_token(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Mandatory parameters in declaration order.
    pub fn mandatory(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_mandatory())
    }

    /// Shared from a common base rather than declared by the owning type.
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn invoke(&self, instance: &mut dyn Task, args: &BoundArgs) -> Result<()> {
        (self.handler)(instance, args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("inherited", &self.inherited)
            .finish_non_exhaustive()
    }
}

/// A registered task type: its name, factory and operations.
#[derive(Clone)]
pub struct TaskType {
    name: String,
    description: Option<String>,
    factory: TaskFactory,
    operations: Vec<Operation>,
}

impl TaskType {
    pub fn builder<T: Task + Default>(name: impl Into<String>) -> TaskTypeBuilder<T> {
        TaskTypeBuilder {
            name: name.into(),
            description: None,
            operations: Vec::new(),
            _task: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> String {
        to_token(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Create a fresh instance through the zero-argument factory.
    pub fn instantiate(&self) -> Box<dyn Task> {
        (self.factory)()
    }
}

impl fmt::Debug for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskType")
            .field("name", &self.name)
            .field("operations", &self.operations)
            .finish_non_exhaustive()
    }
}

/// Operation declaration for a concrete task type `T`.
pub struct OperationDef<T> {
    name: String,
    description: Option<String>,
    parameters: Vec<Parameter>,
    inherited: bool,
    handler: Arc<dyn Fn(&mut T, &BoundArgs) -> Result<()> + Send + Sync>,
}

impl<T: Task> OperationDef<T> {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut T, &BoundArgs) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            inherited: false,
            handler: Arc::new(handler),
        }
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Mark as provided by a shared base. Inherited operations are not indexed.
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    fn erase(self) -> Operation {
        let handler = self.handler;
        let erased: OperationHandler = Arc::new(move |instance: &mut dyn Task, args: &BoundArgs| {
            let task = instance
                .as_any_mut()
                .downcast_mut::<T>()
                .ok_or_else(|| anyhow!("task instance is not a {}", type_name::<T>()))?;
            handler(task, args)
        });
        Operation {
            name: self.name,
            description: self.description,
            parameters: self.parameters,
            inherited: self.inherited,
            handler: erased,
        }
    }
}

/// Builder returned by [`TaskType::builder`].
pub struct TaskTypeBuilder<T> {
    name: String,
    description: Option<String>,
    operations: Vec<Operation>,
    _task: PhantomData<fn() -> T>,
}

impl<T: Task + Default> TaskTypeBuilder<T> {
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn operation(mut self, def: OperationDef<T>) -> Self {
        self.operations.push(def.erase());
        self
    }

    pub fn build(self) -> TaskType {
        TaskType {
            name: self.name,
            description: self.description,
            factory: Arc::new(|| Box::new(T::default()) as Box<dyn Task>),
            operations: self.operations,
        }
    }
}
