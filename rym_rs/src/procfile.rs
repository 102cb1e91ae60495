//! Task definition file (`Rymfile`).
//!
//! Each non-comment line is a root option without its leading dashes:
//!
//! ```text
//! # run everything from the build tree
//! work-dir=build
//! debug
//! ```

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ConfigError;

pub const DEFAULT_PROCFILE: &str = "Rymfile";

static COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#").unwrap());

/// Turn file contents into root option tokens.
///
/// Comment and blank lines are skipped; every other line is trimmed and
/// prefixed with `--`.
pub fn parse(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !COMMENT_REGEX.is_match(line))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("--{}", line))
        .collect()
}

/// Read and parse `path`. A missing file yields `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<Vec<String>>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(parse(&contents)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let contents = "# shared defaults\n\ndebug\n   # indented comment\n  work-dir=build  \n";
        assert_eq!(parse(contents), vec!["--debug", "--work-dir=build"]);
    }

    #[test]
    fn test_hash_inside_a_line_is_kept() {
        assert_eq!(parse("type-filter=^C#"), vec!["--type-filter=^C#"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load(&dir.path().join(DEFAULT_PROCFILE)).unwrap(), None);
    }

    #[test]
    fn test_load_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_PROCFILE);
        std::fs::write(&path, "trace\n").unwrap();
        assert_eq!(load(&path).unwrap(), Some(vec!["--trace".to_string()]));
    }
}
