//! Resolution of an argument vector into a runnable action.
//!
//! ```text
//! Start → HelpCheck → TypeSelect → OperationSelect → Bind
//!       → Runnable | HelpRequested | NotFound | BindingFailed
//! ```
//!
//! Every stage is synchronous. A dispatch builds its own [`TaskIndex`] and
//! keeps no state between calls, so dispatching the same tokens twice gives
//! the same resolution.

use std::fmt;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::binder::{BindError, bind};
use super::help::HelpRenderer;
use super::index::{IndexEntry, IndexError, TaskIndex};
use super::options::OptionSet;
use crate::naming::to_token;
use crate::task::{BoundArgs, Operation, Task, TaskContext, TaskType, Value};

/// Reserved first token that switches the dispatcher into help mode.
pub const HELP_TOKEN: &str = "help";

/// Settings of one dispatcher, passed explicitly rather than read from
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Program name shown in help and error messages.
    pub program: String,
    /// Operation reachable without an operation token. `None` disables it.
    pub default_operation: Option<String>,
    /// Operation names never exposed, compared by token.
    pub ignored_operations: Vec<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            program: "rym".to_string(),
            default_operation: Some("execute".to_string()),
            ignored_operations: vec!["dispose".to_string()],
        }
    }
}

/// Terminal outcome of [`Dispatcher::dispatch`].
#[derive(Debug)]
pub enum Resolution<'r> {
    Runnable(Action<'r>),
    HelpRequested(HelpRequest),
    NotFound(NotFound),
    BindingFailed(BindingFailure),
}

impl Resolution<'_> {
    /// Short variant name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Runnable(_) => "runnable",
            Resolution::HelpRequested(_) => "help",
            Resolution::NotFound(_) => "not-found",
            Resolution::BindingFailed(_) => "binding-failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpRequest {
    /// Rendered help text.
    pub text: String,
    /// `"<type> <operation>"` when a specific operation was described.
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    /// The non-blank input tokens, space-joined.
    pub attempted: String,
    pub program: String,
    /// Closest known invocation, if any is near enough.
    pub suggestion: Option<String>,
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task {} not found, try '{} help' to show all possible tasks",
            self.attempted, self.program
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nDid you mean: {} {}?", self.program, suggestion)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindingFailure {
    pub error: BindError,
    /// Long help of the resolved operation.
    pub usage: String,
}

impl fmt::Display for BindingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.usage.trim_end(), self.error)
    }
}

/// A resolved and bound operation, ready to run.
pub struct Action<'r> {
    task: &'r TaskType,
    operation: &'r Operation,
    args: BoundArgs,
    context: TaskContext,
}

impl<'r> Action<'r> {
    pub fn task(&self) -> &'r TaskType {
        self.task
    }

    pub fn operation(&self) -> &'r Operation {
        self.operation
    }

    pub fn args(&self) -> &BoundArgs {
        &self.args
    }

    /// Bound values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.args.values()
    }

    /// Token cancelled by whoever supervises the run.
    pub fn cancellation(&self) -> CancellationToken {
        self.context.cancellation.clone()
    }

    /// Instantiate the task type, invoke the operation and dispose the
    /// instance. Invocation errors are returned as they are.
    pub fn run(self) -> Result<()> {
        debug!(
            task = self.task.name(),
            operation = self.operation.name(),
            "invoking operation"
        );
        let mut guard = DisposeGuard {
            instance: self.task.instantiate(),
        };
        guard.instance.attach(self.context);
        self.operation.invoke(guard.instance.as_mut(), &self.args)
    }
}

impl fmt::Debug for Action<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("task", &self.task.name())
            .field("operation", &self.operation.name())
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Disposes the instance when dropped, including during unwinding.
struct DisposeGuard {
    instance: Box<dyn Task>,
}

impl Drop for DisposeGuard {
    fn drop(&mut self) {
        self.instance.dispose();
    }
}

/// Resolves argument vectors against a fixed set of task types.
#[derive(Debug, Clone)]
pub struct Dispatcher<'r> {
    types: &'r [TaskType],
    config: DispatchConfig,
    root_options: OptionSet,
    debug: bool,
    trace: bool,
}

impl<'r> Dispatcher<'r> {
    /// `root_options` is only used to render help.
    pub fn new(types: &'r [TaskType], config: DispatchConfig, root_options: &OptionSet) -> Self {
        Self {
            types,
            config,
            root_options: root_options.clone(),
            debug: false,
            trace: false,
        }
    }

    /// Verbosity flags forwarded to each task through its [`TaskContext`].
    pub fn with_verbosity(mut self, debug: bool, trace: bool) -> Self {
        self.debug = debug;
        self.trace = trace;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn dispatch(&self, args: &[String]) -> Result<Resolution<'r>, IndexError> {
        let tokens: Vec<&str> = args
            .iter()
            .map(String::as_str)
            .filter(|token| !token.trim().is_empty())
            .collect();
        let index = TaskIndex::build(self.types, &self.config)?;
        let help = HelpRenderer::new(&index, &self.root_options, &self.config.program);

        let (help_mode, rest) = match tokens.split_first() {
            None => (true, &tokens[..]),
            Some((&HELP_TOKEN, rest)) => (true, rest),
            Some(_) => (false, &tokens[..]),
        };

        let Some((&type_token, tail)) = rest.split_first() else {
            debug!("no task selector, rendering task list");
            return Ok(Resolution::HelpRequested(HelpRequest {
                text: help.short_help(),
                target: None,
            }));
        };

        let peeked = tail.first().copied();
        let Some((entry, consumed)) = select(&index, type_token, peeked) else {
            if help_mode {
                debug!(task = type_token, "help target not found, rendering task list");
                return Ok(Resolution::HelpRequested(HelpRequest {
                    text: help.short_help(),
                    target: None,
                }));
            }
            let attempted = tokens.join(" ");
            debug!(attempted = %attempted, "no matching operation");
            return Ok(Resolution::NotFound(NotFound {
                suggestion: index.suggest(type_token, peeked),
                attempted,
                program: self.config.program.clone(),
            }));
        };

        let operands = if consumed { &tail[1..] } else { tail };
        debug!(
            task = %entry.task_token,
            operation = %entry.operation_token,
            default = !consumed,
            operands = operands.len(),
            "operation selected"
        );

        if help_mode {
            return Ok(Resolution::HelpRequested(HelpRequest {
                text: help.long_help(entry),
                target: Some(format!("{} {}", entry.task_token, entry.operation_token)),
            }));
        }

        let operands: Vec<String> = operands.iter().map(|s| s.to_string()).collect();
        match bind(entry.operation.parameters(), &operands) {
            Ok(args) => Ok(Resolution::Runnable(Action {
                task: entry.task,
                operation: entry.operation,
                args,
                context: TaskContext {
                    cancellation: CancellationToken::new(),
                    debug: self.debug,
                    trace: self.trace,
                },
            })),
            Err(error) => {
                debug!(%error, "binding failed");
                Ok(Resolution::BindingFailed(BindingFailure {
                    error,
                    usage: help.long_help(entry),
                }))
            }
        }
    }
}

/// Match on the peeked token in token form first, then the default operation.
/// Flags are never operation selectors. The flag in the result tells whether
/// the peeked token was consumed.
fn select<'i, 'r>(
    index: &'i TaskIndex<'r>,
    type_token: &str,
    peeked: Option<&str>,
) -> Option<(&'i IndexEntry<'r>, bool)> {
    peeked
        .filter(|token| !token.starts_with('-'))
        .map(to_token)
        .filter(|token| !token.is_empty())
        .and_then(|token| index.lookup(type_token, &token))
        .map(|entry| (entry, true))
        .or_else(|| index.lookup(type_token, "").map(|entry| (entry, false)))
}

#[cfg(test)]
mod tests {
    use std::panic::AssertUnwindSafe;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::task::{OperationDef, ParamKind, Parameter};

    static RUNS: AtomicUsize = AtomicUsize::new(0);
    static DISPOSALS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Build {
        context: Option<TaskContext>,
    }

    impl Task for Build {
        fn attach(&mut self, ctx: TaskContext) {
            self.context = Some(ctx);
        }

        fn dispose(&mut self) {
            DISPOSALS.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn build_type() -> TaskType {
        TaskType::builder::<Build>("Build")
            .operation(OperationDef::new("Execute", |_: &mut Build, _| {
                RUNS.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .operation(
                OperationDef::new("Package", |_: &mut Build, args| {
                    anyhow::ensure!(args.integer("arg1") == Some(1), "bad arg1");
                    Ok(())
                })
                .param(Parameter::required("arg1", ParamKind::Integer))
                .param(Parameter::required("arg2", ParamKind::String)),
            )
            .operation(OperationDef::new("Fail", |_: &mut Build, _| {
                anyhow::bail!("boom")
            }))
            .operation(OperationDef::new("Verbose", |task: &mut Build, _| {
                let ctx = task.context.as_ref().ok_or_else(|| anyhow::anyhow!("detached"))?;
                anyhow::ensure!(ctx.debug, "debug flag not forwarded");
                Ok(())
            }))
            .build()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn dispatcher(types: &[TaskType]) -> Dispatcher<'_> {
        Dispatcher::new(types, DispatchConfig::default(), &OptionSet::new())
    }

    #[test]
    fn test_operation_token_selects_operation() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types)
            .dispatch(&args(&["build", "package", "1", "x"]))
            .unwrap();
        match resolution {
            Resolution::Runnable(action) => {
                assert_eq!(action.operation().name(), "Package");
                assert_eq!(action.args().string("arg2"), Some("x"));
                action.run().unwrap();
            }
            other => panic!("expected runnable, got {:?}", other),
        }
    }

    #[test]
    fn test_operation_selector_is_matched_in_token_form() {
        let types = vec![build_type()];
        let dispatcher = dispatcher(&types);
        for selector in ["Package", "PACKAGE", "package"] {
            let resolution = dispatcher
                .dispatch(&args(&["build", selector, "1", "x"]))
                .unwrap();
            let Resolution::Runnable(action) = resolution else {
                panic!("{} did not select Package: {:?}", selector, resolution);
            };
            assert_eq!(action.operation().name(), "Package");
            assert_eq!(action.args().string("arg2"), Some("x"));
        }
    }

    #[test]
    fn test_flag_is_never_an_operation_selector() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types)
            .dispatch(&args(&["build", "--package"]))
            .unwrap();
        // Falls back to the default, which takes no operands.
        assert!(
            matches!(resolution, Resolution::BindingFailed(_)),
            "{:?}",
            resolution
        );
    }

    #[test]
    fn test_type_only_runs_default() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types).dispatch(&args(&["build"])).unwrap();
        let Resolution::Runnable(action) = resolution else {
            panic!("expected runnable");
        };
        assert_eq!(action.operation().name(), "Execute");
    }

    #[test]
    fn test_unknown_operation_token_falls_back_to_default_as_operand() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types)
            .dispatch(&args(&["build", "extra"]))
            .unwrap();
        // "extra" is an operand of the default operation, which takes none.
        match resolution {
            Resolution::BindingFailed(failure) => {
                assert_eq!(
                    failure.error,
                    BindError::Arity {
                        expected: 0,
                        actual: 1
                    }
                );
            }
            other => panic!("expected binding failure, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_tokens_are_dropped() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types)
            .dispatch(&args(&["", "build", "  ", "package", "1", "\t", "x"]))
            .unwrap();
        assert_eq!(resolution.kind(), "runnable");
    }

    #[test]
    fn test_not_found_message() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types)
            .dispatch(&args(&["biuld", "now"]))
            .unwrap();
        let Resolution::NotFound(not_found) = resolution else {
            panic!("expected not found");
        };
        assert_eq!(not_found.attempted, "biuld now");
        let message = not_found.to_string();
        assert!(message.contains("Task biuld now not found"));
        assert!(message.contains("'rym help'"));
        assert!(message.contains("Did you mean: rym build?"));
    }

    #[test]
    fn test_without_default_type_only_is_not_found() {
        let types = vec![build_type()];
        let config = DispatchConfig {
            default_operation: None,
            ..DispatchConfig::default()
        };
        let resolution = Dispatcher::new(&types, config, &OptionSet::new())
            .dispatch(&args(&["build"]))
            .unwrap();
        assert_eq!(resolution.kind(), "not-found");
    }

    #[test]
    fn test_help_never_binds() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types)
            .dispatch(&args(&["help", "build", "package"]))
            .unwrap();
        let Resolution::HelpRequested(request) = resolution else {
            panic!("expected help");
        };
        assert_eq!(request.target.as_deref(), Some("build package"));
        assert!(request.text.contains("rym build package {arg1} {arg2}"));
    }

    #[test]
    fn test_help_for_unknown_target_lists_everything() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types)
            .dispatch(&args(&["help", "nothing"]))
            .unwrap();
        let Resolution::HelpRequested(request) = resolution else {
            panic!("expected help");
        };
        assert!(request.target.is_none());
        assert!(request.text.contains("Tasks:"));
    }

    #[test]
    fn test_binding_failure_carries_usage() {
        let types = vec![build_type()];
        let resolution = dispatcher(&types)
            .dispatch(&args(&["build", "package", "1"]))
            .unwrap();
        let Resolution::BindingFailed(failure) = resolution else {
            panic!("expected binding failure");
        };
        assert!(failure.usage.contains("--arg1=INTEGER"));
        let rendered = failure.to_string();
        assert!(rendered.contains("expected 2"));
    }

    #[test]
    fn test_run_disposes_on_success_and_failure() {
        let types = vec![build_type()];
        let dispatcher = dispatcher(&types);

        let before = DISPOSALS.load(Ordering::SeqCst);
        let runs = RUNS.load(Ordering::SeqCst);
        let Resolution::Runnable(action) = dispatcher.dispatch(&args(&["build"])).unwrap() else {
            panic!("expected runnable");
        };
        action.run().unwrap();
        assert!(RUNS.load(Ordering::SeqCst) > runs);

        let Resolution::Runnable(action) =
            dispatcher.dispatch(&args(&["build", "fail"])).unwrap()
        else {
            panic!("expected runnable");
        };
        let err = action.run().unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(DISPOSALS.load(Ordering::SeqCst) >= before + 2);
    }

    #[test]
    fn test_dispose_runs_on_panic() {
        static PANIC_DISPOSALS: AtomicUsize = AtomicUsize::new(0);

        #[derive(Default)]
        struct Fragile;
        impl Task for Fragile {
            fn dispose(&mut self) {
                PANIC_DISPOSALS.fetch_add(1, Ordering::SeqCst);
            }
        }

        let types = vec![
            TaskType::builder::<Fragile>("Fragile")
                .operation(OperationDef::new("Execute", |_: &mut Fragile, _| {
                    panic!("handler panicked")
                }))
                .build(),
        ];
        let Resolution::Runnable(action) = dispatcher(&types)
            .dispatch(&args(&["fragile"]))
            .unwrap()
        else {
            panic!("expected runnable");
        };
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| action.run()));
        assert!(outcome.is_err());
        assert_eq!(PANIC_DISPOSALS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_context_is_attached() {
        let types = vec![build_type()];
        let Resolution::Runnable(action) = dispatcher(&types)
            .with_verbosity(true, false)
            .dispatch(&args(&["build", "verbose"]))
            .unwrap()
        else {
            panic!("expected runnable");
        };
        assert!(!action.cancellation().is_cancelled());
        action.run().unwrap();
    }

    #[test]
    fn test_each_dispatch_gets_its_own_token() {
        let types = vec![build_type()];
        let dispatcher = dispatcher(&types);
        let Resolution::Runnable(first) = dispatcher.dispatch(&args(&["build"])).unwrap() else {
            panic!("expected runnable");
        };
        let Resolution::Runnable(second) = dispatcher.dispatch(&args(&["build"])).unwrap() else {
            panic!("expected runnable");
        };
        first.cancellation().cancel();
        assert!(!second.cancellation().is_cancelled());
    }

    #[test]
    fn test_duplicate_operations_fail_dispatch() {
        let types = vec![
            TaskType::builder::<Build>("Build")
                .operation(OperationDef::new("Run", |_: &mut Build, _| Ok(())))
                .operation(OperationDef::new("run", |_: &mut Build, _| Ok(())))
                .build(),
        ];
        let err = dispatcher(&types).dispatch(&args(&["build"])).unwrap_err();
        assert!(matches!(err, IndexError::DuplicateOperation { .. }));
    }
}
