//! Ctrl-C handling while a task runs.
//!
//! The first interrupt cancels the task's [`CancellationToken`]; what that
//! means is up to the task. A second interrupt exits the process.

use std::io;
use std::thread::JoinHandle;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::output;

/// Exit status used when the user interrupts twice.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Background thread translating Ctrl-C into cancellation.
pub struct InterruptWatcher {
    done: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl InterruptWatcher {
    /// Start watching; `token` is cancelled on the first interrupt.
    pub fn spawn(token: CancellationToken) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let done = CancellationToken::new();
        let finished = done.clone();
        let handle = std::thread::Builder::new()
            .name("rym-interrupt".to_string())
            .spawn(move || runtime.block_on(watch(token, finished)))?;
        Ok(Self {
            done,
            handle: Some(handle),
        })
    }

    /// Stop watching and wait for the thread.
    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.done.cancel();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("interrupt watcher panicked");
        }
    }
}

impl Drop for InterruptWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn watch(token: CancellationToken, done: CancellationToken) {
    tokio::select! {
        _ = done.cancelled() => return,
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("cannot listen for interrupts: {}", e);
                return;
            }
        }
    }
    debug!("interrupt received, cancelling task");
    output::warning("Interrupted, waiting for the task to stop (press Ctrl-C again to exit)");
    token.cancel();

    tokio::select! {
        _ = done.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if result.is_ok() {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_without_interrupt_leaves_token_alone() {
        let token = CancellationToken::new();
        let watcher = InterruptWatcher::spawn(token.clone()).unwrap();
        watcher.finish();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_drop_stops_the_thread() {
        let token = CancellationToken::new();
        {
            let _watcher = InterruptWatcher::spawn(token.clone()).unwrap();
        }
        assert!(!token.is_cancelled());
    }
}
