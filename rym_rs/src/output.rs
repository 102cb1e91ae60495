//! Terminal messages printed by the launcher.

use console::style;

/// Print a warning message (yellow).
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), message);
}

/// Print a failed task or launcher error in red: the cause chain on one
/// line, or the full report with `trace`.
pub fn error(err: &anyhow::Error, trace: bool) {
    eprintln!("{}", style(render_error(err, trace)).red());
}

pub(crate) fn render_error(err: &anyhow::Error, trace: bool) -> String {
    if trace {
        format!("{:?}", err)
    } else {
        format!("{:#}", err)
    }
}
