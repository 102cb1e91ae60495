//! Static fragments of the help output.
//!
//! `{program}` is replaced with the configured program name.

pub(super) const HELP_HEADER: &str = "Usage: [OPTIONS] [TASK] [SUBTASK] [PARAMETERS]
For detail information about task - '{program} help {TASK} [SUBTASK]'
Options:";

pub(super) const HELP_TASKS: &str = "Tasks:
  {program} help [TASK] [SUBTASK] # show details information about task or subtask";

pub(super) const HELP_FOOTER: &str = "Parameters:
  task accepts parameters in forms described below:
    positional - TASK PARAMETER1 PARAMETER2
    named - TASK --PARAMETER-NAME1=PARAMETER1 --PARAMETER-NAME2=PARAMETER2
    or mixed TASK --PARAMETER-NAME1=PARAMETER1 PARAMETER2
    value in curly braces is mandatory - {PARAMETER1}
    value in square braces is optional - [PARAMETER1]";

pub(super) const SIBLINGS_HEADER: &str = "Other operations:";
