//! Parameter kinds and the values bound to them.

use std::fmt;
use std::path::PathBuf;

/// Semantic type of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    String,
    Integer,
    Float,
    Path,
}

impl ParamKind {
    /// Placeholder shown in option descriptions (`--name=VALUE`).
    pub fn name(&self) -> &'static str {
        match self {
            ParamKind::Bool => "bool",
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Float => "float",
            ParamKind::Path => "path",
        }
    }

    /// Convert a raw command-line token into a value of this kind.
    pub fn parse(&self, raw: &str) -> Result<Value, String> {
        match self {
            ParamKind::Bool => parse_bool(raw).map(Value::Bool),
            ParamKind::String => Ok(Value::String(raw.to_string())),
            ParamKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| e.to_string()),
            ParamKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| e.to_string()),
            ParamKind::Path => Ok(Value::Path(PathBuf::from(raw))),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    String(String),
    Integer(i64),
    Float(f64),
    Path(PathBuf),
}

impl Value {
    pub fn kind(&self) -> ParamKind {
        match self {
            Value::Bool(_) => ParamKind::Bool,
            Value::String(_) => ParamKind::String,
            Value::Integer(_) => ParamKind::Integer,
            Value::Float(_) => ParamKind::Float,
            Value::Path(_) => ParamKind::Path,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Path(p) => p.to_str(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<PathBuf> {
        match self {
            Value::Path(p) => Some(p.clone()),
            Value::String(s) => Some(PathBuf::from(s)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Value::Path(value)
    }
}

/// Parse a boolean token.
pub(crate) fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!(
            "'{}' is not a boolean. Use: true, false, yes, no, on, off, 1 or 0.",
            raw
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(ParamKind::Integer.parse("42"), Ok(Value::Integer(42)));
        assert_eq!(ParamKind::Integer.parse(" -7 "), Ok(Value::Integer(-7)));
        assert!(ParamKind::Integer.parse("forty-two").is_err());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(ParamKind::Float.parse("1.5"), Ok(Value::Float(1.5)));
        assert!(ParamKind::Float.parse("x").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(matches!(parse_bool("yes"), Ok(true)));
        assert!(matches!(parse_bool("TRUE"), Ok(true)));
        assert!(matches!(parse_bool("0"), Ok(false)));
        assert!(matches!(parse_bool("off"), Ok(false)));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_string_and_path_accept_anything() {
        assert_eq!(
            ParamKind::String.parse("--odd"),
            Ok(Value::String("--odd".into()))
        );
        assert_eq!(
            ParamKind::Path.parse("src/lib.rs"),
            Ok(Value::Path(PathBuf::from("src/lib.rs")))
        );
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(3).as_i64(), Some(3));
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("a").as_str(), Some("a"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("a").as_bool(), None);
        assert_eq!(Value::from(2.5).kind(), ParamKind::Float);
    }
}
