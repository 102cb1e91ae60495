//! Short (all tasks) and long (one operation) help.

use super::binder::option_schema;
use super::help_texts::*;
use super::index::{IndexEntry, TaskIndex};
use super::options::OptionSet;

/// Renders help for the entries of one [`TaskIndex`].
pub struct HelpRenderer<'a, 'r> {
    index: &'a TaskIndex<'r>,
    root_options: &'a OptionSet,
    program: &'a str,
}

impl<'a, 'r> HelpRenderer<'a, 'r> {
    pub fn new(index: &'a TaskIndex<'r>, root_options: &'a OptionSet, program: &'a str) -> Self {
        Self {
            index,
            root_options,
            program,
        }
    }

    /// Root options, every indexed operation (one line each) and the
    /// parameter forms.
    pub fn short_help(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.substitute(HELP_HEADER));
        out.push('\n');
        out.push_str(&self.root_options.format_descriptions());
        out.push_str(&self.substitute(HELP_TASKS));
        out.push('\n');
        for entry in self.index.entries() {
            out.push_str(&self.describe(entry));
            out.push('\n');
        }
        out.push('\n');
        out.push_str(HELP_FOOTER);
        out.push('\n');
        out
    }

    /// One operation with its flag table. The default operation also lists
    /// its siblings.
    pub fn long_help(&self, entry: &IndexEntry<'_>) -> String {
        let mut out = self.describe(entry);
        out.push('\n');
        out.push_str(&option_schema(entry.operation.parameters()).format_descriptions());

        if entry.is_default {
            let siblings: Vec<String> = self
                .index
                .siblings(entry)
                .map(|sibling| self.describe(sibling))
                .collect();
            if !siblings.is_empty() {
                out.push('\n');
                out.push_str(SIBLINGS_HEADER);
                out.push('\n');
                for line in siblings {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }
        out
    }

    /// `  <program> <type> [<operation>] {mandatory}...  # description`
    ///
    /// The operation token is left out for the default operation.
    pub fn describe(&self, entry: &IndexEntry<'_>) -> String {
        let mut line = format!("  {} {}", self.program, entry.task_token);
        if !entry.is_default {
            line.push(' ');
            line.push_str(&entry.operation_token);
        }
        for parameter in entry.operation.mandatory() {
            line.push_str(&format!(" {{{}}}", parameter.token()));
        }
        if let Some(description) = entry.operation.description() {
            line.push_str("  # ");
            line.push_str(description);
        }
        line
    }

    fn substitute(&self, text: &str) -> String {
        text.replace("{program}", self.program)
    }
}
