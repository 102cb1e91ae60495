use std::any::Any;
use std::panic;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use rym::cli::entrypoint::{EntryOptions, run};
use rym::task::{
    BoundArgs, OperationDef, ParamKind, Parameter, StaticModules, Task, TaskContext, TaskType,
};

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = <dyn Any>::downcast_ref::<&str>(payload)
            .is_some_and(|s| s.contains("Broken pipe"))
            || <dyn Any>::downcast_ref::<String>(payload)
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            // Quietly exit when downstream closes the pipe (e.g. piping to `head`).
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

fn main() -> ExitCode {
    install_broken_pipe_handler();

    let modules = builtin_tasks();
    run(&EntryOptions {
        binary_name: "rym",
        version: env!("CARGO_PKG_VERSION"),
        about: Some(ABOUT),
        loader: &modules,
    })
}

const ABOUT: &str = "rym - run task operations from the command line";

fn builtin_tasks() -> StaticModules {
    StaticModules::new()
        .with(echo_task())
        .with(env_task())
        .with(wait_task())
        .with(fail_task())
}

// ============================================================================
// echo
// ============================================================================

#[derive(Default)]
struct Echo;

impl Task for Echo {}

impl Echo {
    fn execute(&mut self, args: &BoundArgs) -> Result<()> {
        let mut message = args.string("message").unwrap_or_default().to_string();
        if args.flag("upper") {
            message = message.to_uppercase();
        }
        for _ in 0..args.integer("times").unwrap_or(1) {
            println!("{}", message);
        }
        Ok(())
    }
}

fn echo_task() -> TaskType {
    TaskType::builder::<Echo>("Echo")
        .describe("Print text")
        .operation(
            OperationDef::new("Execute", Echo::execute)
                .describe("print a message")
                .param(Parameter::required("message", ParamKind::String))
                .param(Parameter::flag("upper").describe("Print in upper case"))
                .param(
                    Parameter::optional("times", ParamKind::Integer, 1)
                        .describe("How many times to print"),
                ),
        )
        .build()
}

// ============================================================================
// env
// ============================================================================

#[derive(Default)]
struct Env;

impl Task for Env {}

impl Env {
    fn show(&mut self, args: &BoundArgs) -> Result<()> {
        let name = args.string("name").unwrap_or_default();
        let value =
            std::env::var(name).with_context(|| format!("Variable {} is not set", name))?;
        println!("{}", value);
        Ok(())
    }

    fn working_dir(&mut self, _args: &BoundArgs) -> Result<()> {
        let dir = std::env::current_dir().context("Cannot read the working directory")?;
        println!("{}", dir.display());
        Ok(())
    }
}

fn env_task() -> TaskType {
    TaskType::builder::<Env>("Env")
        .describe("Inspect the process environment")
        .operation(
            OperationDef::new("Show", Env::show)
                .describe("print an environment variable")
                .param(Parameter::required("name", ParamKind::String)),
        )
        .operation(
            OperationDef::new("WorkingDir", Env::working_dir)
                .describe("print the directory tasks run in"),
        )
        .build()
}

// ============================================================================
// wait
// ============================================================================

#[derive(Default)]
struct Wait {
    context: TaskContext,
}

impl Task for Wait {
    fn attach(&mut self, ctx: TaskContext) {
        self.context = ctx;
    }

    fn dispose(&mut self) {
        if self.context.debug {
            eprintln!("wait: disposed");
        }
    }
}

impl Wait {
    fn execute(&mut self, args: &BoundArgs) -> Result<()> {
        let seconds = args.float("seconds").unwrap_or(1.0).max(0.0);
        let deadline = Instant::now() + Duration::from_secs_f64(seconds);
        while Instant::now() < deadline {
            if self.context.is_cancelled() {
                println!("cancelled");
                return Ok(());
            }
            thread::sleep(Duration::from_millis(20));
        }
        println!("done");
        Ok(())
    }
}

fn wait_task() -> TaskType {
    TaskType::builder::<Wait>("Wait")
        .describe("Sleep until a deadline or an interrupt")
        .operation(
            OperationDef::new("Execute", Wait::execute)
                .describe("wait, stopping early on Ctrl-C")
                .param(
                    Parameter::optional("seconds", ParamKind::Float, 1.0)
                        .describe("How long to wait"),
                ),
        )
        .build()
}

// ============================================================================
// fail
// ============================================================================

#[derive(Default)]
struct Fail;

impl Task for Fail {}

impl Fail {
    fn execute(&mut self, args: &BoundArgs) -> Result<()> {
        let reason = args.string("reason").unwrap_or("no reason given");
        Err(anyhow::anyhow!("{}", reason)).context("Task fail gave up")
    }

    fn bail(&mut self, _args: &BoundArgs) -> Result<()> {
        bail!("bailed out")
    }
}

fn fail_task() -> TaskType {
    TaskType::builder::<Fail>("Fail")
        .describe("Always fails; exercises error reporting")
        .operation(
            OperationDef::new("Execute", Fail::execute)
                .describe("fail with a reason")
                .param(Parameter::optional("reason", ParamKind::String, "no reason given")),
        )
        .operation(OperationDef::new("Bail", Fail::bail).describe("fail without context"))
        .build()
}
