//! Task model: what the dispatcher resolves and invokes.
//!
//! - `value`: parameter kinds and bound values
//! - `args`: [`BoundArgs`] passed to operation handlers
//! - `model`: [`Task`], [`TaskType`], [`Operation`], [`Parameter`] and builders
//! - `registry`: [`ModuleLoader`] seam and the in-process [`StaticModules`]

mod args;
mod model;
mod registry;
mod value;

pub use args::BoundArgs;
pub use model::{
    AsAny, Operation, OperationDef, OperationHandler, Parameter, Task, TaskContext, TaskFactory,
    TaskType, TaskTypeBuilder,
};
pub use registry::{LoadRequest, ModuleLoader, StaticModules};
pub use value::{ParamKind, Value};
pub(crate) use value::parse_bool;
