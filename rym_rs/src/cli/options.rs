//! Option schema and parser.
//!
//! An [`OptionSet`] is a list of named flags. Parsing walks the tokens once:
//! recognised flags become [`OptionMatch`]es, everything else lands in the
//! positional residue in its original order. Unknown flags are residue too,
//! so a root parser can strip its own options and hand the rest on.
//!
//! Accepted forms:
//!
//! ```text
//! --name            switch (also --name+ / --name- to force on/off)
//! --name=value      optional or required value
//! --name:value      optional or required value
//! --name value      required value only
//! -n value          single-dash prefix works for every form
//! --                everything after is residue
//! ```

use std::fmt::Write as _;

use thiserror::Error;

use crate::task::parse_bool;

/// Column where option descriptions start.
const DESCRIPTION_COLUMN: usize = 29;

/// How a flag takes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// No value: `--force`.
    Switch,
    /// Attached value only, may be omitted: `--depth=3` or `--depth`.
    Optional,
    /// Value required, attached or as the next token.
    Required,
}

/// One flag of an [`OptionSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    names: Vec<String>,
    mode: ValueMode,
    value_name: String,
    description: String,
}

impl OptionSpec {
    /// `names` is a `|`-separated alias list, e.g. `"h|help"`.
    pub fn switch(names: &str, description: impl Into<String>) -> Self {
        Self::new(names, ValueMode::Switch, "", description)
    }

    pub fn optional(names: &str, value_name: &str, description: impl Into<String>) -> Self {
        Self::new(names, ValueMode::Optional, value_name, description)
    }

    pub fn required(names: &str, value_name: &str, description: impl Into<String>) -> Self {
        Self::new(names, ValueMode::Required, value_name, description)
    }

    fn new(names: &str, mode: ValueMode, value_name: &str, description: impl Into<String>) -> Self {
        Self {
            names: names
                .split('|')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect(),
            mode,
            value_name: value_name.to_uppercase(),
            description: description.into(),
        }
    }

    /// Longest alias; used as the canonical name.
    pub fn name(&self) -> &str {
        self.names
            .iter()
            .max_by_key(|n| n.len())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn mode(&self) -> ValueMode {
        self.mode
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn answers_to(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Left column of the description table, e.g. `  -f, --procfile=VALUE`.
    fn prototype(&self) -> String {
        let mut shorts = self.names.iter().filter(|n| n.chars().count() == 1);
        let longs: Vec<&String> = self.names.iter().filter(|n| n.chars().count() > 1).collect();

        let mut line = String::from("  ");
        match shorts.next() {
            Some(short) if !longs.is_empty() => {
                let _ = write!(line, "-{}, ", short);
            }
            Some(short) => {
                let _ = write!(line, "-{}", short);
            }
            None => line.push_str("    "),
        }
        let long_list: Vec<String> = longs.iter().map(|l| format!("--{}", l)).collect();
        line.push_str(&long_list.join(", "));

        let value_name = if self.value_name.is_empty() {
            "VALUE"
        } else {
            self.value_name.as_str()
        };
        match self.mode {
            ValueMode::Switch => {}
            ValueMode::Optional => {
                let _ = write!(line, "[={}]", value_name);
            }
            ValueMode::Required => {
                let _ = write!(line, "={}", value_name);
            }
        }
        line
    }
}

/// A flag recognised during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMatch {
    /// Position of the spec in its [`OptionSet`].
    pub index: usize,
    /// Canonical name of the spec.
    pub name: String,
    /// Raw value: `None` for bare switches and omitted optional values,
    /// `"+"`/`"-"` for forced switches.
    pub value: Option<String>,
}

impl OptionMatch {
    /// Interpret the match as a switch state.
    pub fn switch_state(&self) -> Result<bool, String> {
        match self.value.as_deref() {
            None | Some("+") => Ok(true),
            Some("-") => Ok(false),
            Some(raw) => parse_bool(raw),
        }
    }
}

/// Result of [`OptionSet::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    pub matches: Vec<OptionMatch>,
    /// Unrecognised tokens, in input order.
    pub residue: Vec<String>,
}

impl ParsedOptions {
    pub fn is_set(&self, name: &str) -> bool {
        self.matches
            .iter()
            .rev()
            .find(|m| m.name == name)
            .is_some_and(|m| m.switch_state().unwrap_or(true))
    }

    /// Last value given for `name`.
    pub fn last(&self, name: &str) -> Option<&str> {
        self.matches
            .iter()
            .rev()
            .filter(|m| m.name == name)
            .find_map(|m| m.value.as_deref())
    }

    /// Every value given for `name`, in order.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|m| m.name == name)
            .filter_map(|m| m.value.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("Missing required value for option '--{option}'")]
    MissingValue { option: String },
}

/// An ordered set of flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    specs: Vec<OptionSpec>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, spec: OptionSpec) -> Self {
        self.add(spec);
        self
    }

    /// Append a spec, returning its index.
    pub fn add(&mut self, spec: OptionSpec) -> usize {
        self.specs.push(spec);
        self.specs.len() - 1
    }

    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|spec| spec.answers_to(name))
    }

    pub fn parse<I, S>(&self, tokens: I) -> Result<ParsedOptions, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut parsed = ParsedOptions::default();
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;

            if token == "--" {
                parsed.residue.extend(tokens[i..].iter().cloned());
                break;
            }

            let Some(body) = flag_body(token) else {
                parsed.residue.push(token.clone());
                continue;
            };

            let (name, attached) = split_attached(body);

            if let Some(index) = self.lookup(name) {
                let spec = &self.specs[index];
                let value = match spec.mode {
                    ValueMode::Switch | ValueMode::Optional => attached.map(str::to_string),
                    ValueMode::Required => match attached {
                        Some(value) => Some(value.to_string()),
                        None => {
                            let next = tokens.get(i).cloned().ok_or_else(|| {
                                OptionError::MissingValue {
                                    option: spec.name().to_string(),
                                }
                            })?;
                            i += 1;
                            Some(next)
                        }
                    },
                };
                parsed.matches.push(OptionMatch {
                    index,
                    name: spec.name().to_string(),
                    value,
                });
                continue;
            }

            // --flag+ / --flag- forcing a switch on or off
            if attached.is_none()
                && let Some((stripped, sign)) = split_sign(name)
                && let Some(index) = self.lookup(stripped)
                && self.specs[index].mode == ValueMode::Switch
            {
                parsed.matches.push(OptionMatch {
                    index,
                    name: self.specs[index].name().to_string(),
                    value: Some(sign.to_string()),
                });
                continue;
            }

            parsed.residue.push(token.clone());
        }

        Ok(parsed)
    }

    /// Render the option table, one spec per line.
    pub fn format_descriptions(&self) -> String {
        let mut out = String::new();
        for spec in &self.specs {
            let prototype = spec.prototype();
            out.push_str(&prototype);
            if !spec.description.is_empty() {
                let width = prototype.chars().count();
                if width < DESCRIPTION_COLUMN {
                    out.push_str(&" ".repeat(DESCRIPTION_COLUMN - width));
                } else {
                    out.push('\n');
                    out.push_str(&" ".repeat(DESCRIPTION_COLUMN));
                }
                out.push_str(&spec.description);
            }
            out.push('\n');
        }
        out
    }
}

/// Strip the `--` or `-` prefix. Bare `-` and non-flags yield `None`.
fn flag_body(token: &str) -> Option<&str> {
    let body = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))?;
    if body.is_empty() { None } else { Some(body) }
}

/// `name=value` / `name:value` → (`name`, `Some(value)`).
fn split_attached(body: &str) -> (&str, Option<&str>) {
    match body.find(['=', ':']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    }
}

/// `debug+` → (`debug`, `+`). The name before the sign must be non-empty.
fn split_sign(name: &str) -> Option<(&str, &str)> {
    name.strip_suffix('+')
        .map(|stripped| (stripped, "+"))
        .or_else(|| name.strip_suffix('-').map(|stripped| (stripped, "-")))
        .filter(|(stripped, _)| !stripped.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OptionSet {
        OptionSet::new()
            .with(OptionSpec::switch("debug", "Verbose diagnostics"))
            .with(OptionSpec::required("f|procfile", "path", "Task definition file"))
            .with(OptionSpec::optional("depth", "integer", "Depth limit"))
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_tokens_become_residue_in_order() {
        let parsed = sample()
            .parse(args(&["build", "--debug", "--unknown", "fast"]))
            .unwrap();
        assert!(parsed.is_set("debug"));
        assert_eq!(parsed.residue, args(&["build", "--unknown", "fast"]));
    }

    #[test]
    fn test_required_value_forms() {
        let set = sample();
        for form in [
            args(&["--procfile=Rymfile"]),
            args(&["--procfile:Rymfile"]),
            args(&["--procfile", "Rymfile"]),
            args(&["-f", "Rymfile"]),
        ] {
            let parsed = set.parse(form).unwrap();
            assert_eq!(parsed.last("procfile"), Some("Rymfile"));
            assert!(parsed.residue.is_empty());
        }
    }

    #[test]
    fn test_required_value_missing_at_end() {
        let err = sample().parse(args(&["--procfile"])).unwrap_err();
        assert_eq!(
            err,
            OptionError::MissingValue {
                option: "procfile".into()
            }
        );
    }

    #[test]
    fn test_optional_value_never_consumes_next_token() {
        let parsed = sample().parse(args(&["--depth", "5"])).unwrap();
        assert_eq!(parsed.matches.len(), 1);
        assert_eq!(parsed.matches[0].value, None);
        assert_eq!(parsed.residue, args(&["5"]));

        let parsed = sample().parse(args(&["--depth=5"])).unwrap();
        assert_eq!(parsed.last("depth"), Some("5"));
    }

    #[test]
    fn test_forced_switch_states() {
        let parsed = sample().parse(args(&["--debug-"])).unwrap();
        assert!(!parsed.is_set("debug"));
        let parsed = sample().parse(args(&["--debug+"])).unwrap();
        assert!(parsed.is_set("debug"));
        let parsed = sample().parse(args(&["--debug=false"])).unwrap();
        assert!(!parsed.is_set("debug"));
    }

    #[test]
    fn test_double_dash_ends_flags() {
        let parsed = sample()
            .parse(args(&["--debug", "--", "--procfile", "x"]))
            .unwrap();
        assert!(parsed.is_set("debug"));
        assert_eq!(parsed.residue, args(&["--procfile", "x"]));
        assert!(parsed.last("procfile").is_none());
    }

    #[test]
    fn test_bare_dash_and_negative_numbers_are_residue() {
        let parsed = sample().parse(args(&["-", "-5"])).unwrap();
        assert_eq!(parsed.residue, args(&["-", "-5"]));
    }

    #[test]
    fn test_non_ascii_flags_are_residue() {
        let parsed = sample()
            .parse(args(&["--café", "-é", "--naïve-", "--debug"]))
            .unwrap();
        assert!(parsed.is_set("debug"));
        assert_eq!(parsed.residue, args(&["--café", "-é", "--naïve-"]));
    }

    #[test]
    fn test_sign_suffix_needs_a_name() {
        assert_eq!(split_sign("debug+"), Some(("debug", "+")));
        assert_eq!(split_sign("café-"), Some(("café", "-")));
        assert_eq!(split_sign("é"), None);
        assert_eq!(split_sign("-"), None);
    }

    #[test]
    fn test_all_values_are_kept() {
        let parsed = sample()
            .parse(args(&["-f", "a", "--procfile=b"]))
            .unwrap();
        assert_eq!(parsed.all("procfile"), vec!["a", "b"]);
        assert_eq!(parsed.last("procfile"), Some("b"));
    }

    #[test]
    fn test_format_descriptions() {
        let text = sample().format_descriptions();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("      --debug"));
        assert!(lines[0].ends_with("Verbose diagnostics"));
        assert!(lines[1].starts_with("  -f, --procfile=PATH"));
        assert!(lines[2].starts_with("      --depth[=INTEGER]"));
        assert_eq!(lines[1].find("Task definition file"), Some(DESCRIPTION_COLUMN));
    }
}
