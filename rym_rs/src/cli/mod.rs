//! Command-line resolution: from raw tokens to an invoked task operation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        User Input (argv)                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Entry point (root options)                  │
//! │   rym.toml → Rymfile → command line     --debug --work-dir ...  │
//! └────────────────────────────────┬────────────────────────────────┘
//!                                  │ residue
//!                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Dispatcher                            │
//! │  ┌──────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │  HelpCheck   │ → │ TypeSelect /    │ → │ ParameterBinder │   │
//! │  │  "help"      │   │ OperationSelect │   │ named+positional│   │
//! │  └──────────────┘   │   (TaskIndex)   │   └─────────────────┘   │
//! │                     └─────────────────┘                         │
//! └────────────────────────────────┬────────────────────────────────┘
//!                                  │
//!                                  ▼
//!        Runnable(Action) | HelpRequested | NotFound | BindingFailed
//! ```
//!
//! # Module Structure
//!
//! - [`options`] - option schema and parser with positional residue
//! - [`binder`] - binds tokens to operation parameters
//! - [`index`] - `(task, operation)` lookup table
//! - [`dispatch`] - the resolution state machine and [`Action`]
//! - [`help`] - short and long help rendering
//! - [`entrypoint`] - shared launcher body for binaries

pub mod binder;
pub mod dispatch;
pub mod entrypoint;
pub mod help;
mod help_texts;
pub mod helpers;
pub mod index;
pub mod options;

pub use binder::{BindError, bind, option_schema};
pub use dispatch::{
    Action, BindingFailure, DispatchConfig, Dispatcher, HELP_TOKEN, HelpRequest, NotFound,
    Resolution,
};
pub use entrypoint::{EntryOptions, RootArgs, root_options, run, run_with_args};
pub use help::HelpRenderer;
pub use helpers::{ColorMode, parse_color_mode};
pub use index::{IndexEntry, IndexError, TaskIndex};
pub use options::{OptionError, OptionMatch, OptionSet, OptionSpec, ParsedOptions, ValueMode};
