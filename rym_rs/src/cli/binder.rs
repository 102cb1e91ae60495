//! Binding command-line tokens to operation parameters.
//!
//! Every parameter is addressable by name (`--arg1=1`, `--arg1 1`). Mandatory
//! parameters the named pass left empty take the positional residue, in
//! declaration order. Switches never take a positional slot.

use thiserror::Error;
use tracing::trace;

use super::options::{OptionError, OptionMatch, OptionSet, OptionSpec, ValueMode};
use crate::task::{BoundArgs, ParamKind, Parameter, Value};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error(
        "Mandatory parameters are not filled: expected {expected} positional argument(s), got {actual}"
    )]
    Arity { expected: usize, actual: usize },

    #[error("Cannot convert '{token}' to {kind} for parameter '{parameter}': {reason}")]
    Conversion {
        parameter: String,
        token: String,
        kind: ParamKind,
        reason: String,
    },

    #[error("Missing required value for option '--{option}'")]
    MissingValue { option: String },

    #[error("Missing required parameter(s): {}", .parameters.join(", "))]
    MissingRequired { parameters: Vec<String> },
}

impl From<OptionError> for BindError {
    fn from(err: OptionError) -> Self {
        match err {
            OptionError::MissingValue { option } => BindError::MissingValue { option },
        }
    }
}

/// Flag schema for `parameters`, one spec per parameter in the same order.
pub fn option_schema(parameters: &[Parameter]) -> OptionSet {
    let mut schema = OptionSet::new();
    for parameter in parameters {
        let token = parameter.token();
        let kind = parameter.kind().name();
        let mut description = parameter.description().unwrap_or_default().to_string();
        if let Some(default) = parameter.default_value() {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(&format!("(default: {})", default));
        }
        let spec = if parameter.kind() == ParamKind::Bool {
            OptionSpec::switch(&token, description)
        } else if parameter.is_mandatory() {
            OptionSpec::required(&token, kind, description)
        } else {
            OptionSpec::optional(&token, kind, description)
        };
        schema.add(spec);
    }
    schema
}

/// Bind `tokens` to `parameters`.
pub fn bind(parameters: &[Parameter], tokens: &[String]) -> Result<BoundArgs, BindError> {
    let schema = option_schema(parameters);
    let mut values: Vec<Option<Value>> = parameters.iter().map(Parameter::seed).collect();

    let parsed = schema.parse(tokens.iter().cloned())?;
    for matched in &parsed.matches {
        let parameter = &parameters[matched.index];
        if let Some(value) = named_value(parameter, schema.specs()[matched.index].mode(), matched)? {
            trace!(parameter = parameter.name(), %value, "bound by flag");
            values[matched.index] = Some(value);
        }
    }

    let mut residue = parsed.residue;
    if residue.len() > unfilled(parameters, &values).len() {
        bind_by_name(parameters, &mut values, &mut residue)?;
    }

    let unfilled = unfilled(parameters, &values);
    if residue.len() != unfilled.len() {
        return Err(BindError::Arity {
            expected: unfilled.len(),
            actual: residue.len(),
        });
    }

    for (index, raw) in unfilled.into_iter().zip(residue) {
        let parameter = &parameters[index];
        let value = convert(parameter, &raw)?;
        trace!(parameter = parameter.name(), %value, "bound by position");
        values[index] = Some(value);
    }

    let missing: Vec<String> = parameters
        .iter()
        .zip(&values)
        .filter(|(parameter, value)| parameter.is_mandatory() && value.is_none())
        .map(|(parameter, _)| parameter.token())
        .collect();
    if !missing.is_empty() {
        return Err(BindError::MissingRequired {
            parameters: missing,
        });
    }

    Ok(BoundArgs::new(
        parameters
            .iter()
            .zip(values)
            .filter_map(|(parameter, value)| value.map(|v| (parameter.name().to_string(), v)))
            .collect(),
    ))
}

/// Value carried by a flag match; `None` keeps the seeded value.
fn named_value(
    parameter: &Parameter,
    mode: ValueMode,
    matched: &OptionMatch,
) -> Result<Option<Value>, BindError> {
    if parameter.kind() == ParamKind::Bool {
        return matched
            .switch_state()
            .map(|state| Some(Value::Bool(state)))
            .map_err(|reason| BindError::Conversion {
                parameter: parameter.token(),
                token: matched.value.clone().unwrap_or_default(),
                kind: ParamKind::Bool,
                reason,
            });
    }
    match (&matched.value, mode) {
        (None, ValueMode::Optional) => Ok(None),
        (None, _) => Err(BindError::MissingValue {
            option: parameter.token(),
        }),
        (Some(raw), _) => convert(parameter, raw).map(Some),
    }
}

/// Indices of mandatory parameters still without a value, in declaration order.
fn unfilled(parameters: &[Parameter], values: &[Option<Value>]) -> Vec<usize> {
    parameters
        .iter()
        .enumerate()
        .filter(|(index, parameter)| parameter.is_mandatory() && values[*index].is_none())
        .map(|(index, _)| index)
        .collect()
}

/// Consume `name value` pairs from a residue that is longer than the
/// number of unfilled parameters.
fn bind_by_name(
    parameters: &[Parameter],
    values: &mut [Option<Value>],
    residue: &mut Vec<String>,
) -> Result<(), BindError> {
    let mut j = 0;
    while j + 1 < residue.len() && residue.len() > unfilled(parameters, values).len() {
        let target = parameters.iter().enumerate().position(|(index, parameter)| {
            parameter.is_mandatory() && values[index].is_none() && parameter.token() == residue[j]
        });
        match target {
            Some(index) => {
                let raw = residue.remove(j + 1);
                residue.remove(j);
                let value = convert(&parameters[index], &raw)?;
                trace!(parameter = parameters[index].name(), %value, "bound by name");
                values[index] = Some(value);
            }
            None => j += 1,
        }
    }
    Ok(())
}

fn convert(parameter: &Parameter, raw: &str) -> Result<Value, BindError> {
    parameter
        .kind()
        .parse(raw)
        .map_err(|reason| BindError::Conversion {
            parameter: parameter.token(),
            token: raw.to_string(),
            kind: parameter.kind(),
            reason,
        })
}
