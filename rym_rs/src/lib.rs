//! # rym
//!
//! **Rake-style task runner core** - exposes the operations of registered task
//! types as command-line actions.
//!
//! A task library registers task types, each with a zero-argument factory and
//! a list of operations. The dispatcher maps an argument vector such as
//! `rym deploy rollback --to=v1.2 prod` onto one operation, binds the remaining
//! tokens to its parameters and hands back an action that instantiates the
//! task and runs it.
//!
//! ## Features
//!
//! - **Name mapping** - `ReadFile` is invoked as `read-file`
//! - **Named and positional binding** - `--arg=value`, `--arg value` or plain
//!   positional values, with defaults and typed conversion
//! - **Default operation** - `rym build` runs `Build::execute`
//! - **Generated help** - `rym help` lists every operation, `rym help build`
//!   describes one
//! - **Scoped disposal** - every task instance is disposed after its run,
//!   even when the operation fails or panics
//!
//! ## Library Usage
//!
//! ```rust
//! use rym::cli::{DispatchConfig, Dispatcher, OptionSet, Resolution};
//! use rym::task::{BoundArgs, OperationDef, ParamKind, Parameter, Task, TaskType};
//!
//! #[derive(Default)]
//! struct Greet;
//! impl Task for Greet {}
//!
//! let types = vec![
//!     TaskType::builder::<Greet>("Greet")
//!         .operation(
//!             OperationDef::new("Execute", |_: &mut Greet, args: &BoundArgs| {
//!                 println!("hello {}", args.string("name").unwrap_or("world"));
//!                 Ok(())
//!             })
//!             .param(Parameter::required("name", ParamKind::String)),
//!         )
//!         .build(),
//! ];
//!
//! let dispatcher = Dispatcher::new(&types, DispatchConfig::default(), &OptionSet::new());
//! let args = vec!["greet".to_string(), "rym".to_string()];
//! match dispatcher.dispatch(&args).unwrap() {
//!     Resolution::Runnable(action) => action.run().unwrap(),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! rym help                   # List every task operation
//! rym help echo              # Describe one task
//! rym echo "hello"           # Run the default operation
//! rym env show --name=HOME   # Run a named operation
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Task descriptors, bound arguments and the module loader seam.
pub mod task;

/// Identifier to command-line token conversion.
pub mod naming;

/// Option parsing, binding, dispatch and help.
pub mod cli;

// ============================================================================
// Launcher Support
// ============================================================================

pub mod config;
pub mod interrupt;
pub mod logging;
pub mod output;
pub mod procfile;

pub use cli::{Action, DispatchConfig, Dispatcher, Resolution};
pub use task::{BoundArgs, OperationDef, ParamKind, Parameter, Task, TaskContext, TaskType};
