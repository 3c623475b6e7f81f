use super::require_path;
use crate::action::{common_accessors, Action, ActionCommon};
use crate::error::Result;
use crate::failure::{ActionFailure, ValidationFailure};
use crate::outcome::Outcome;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// FileExists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    File,
    Dir,
}

#[derive(Debug, Clone)]
pub struct FileExists {
    common: ActionCommon,
    path: PathBuf,
    kind: Option<PathKind>,
}

impl FileExists {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            common: ActionCommon::new(),
            path: path.into(),
            kind: None,
        }
    }

    pub fn of_kind(mut self, kind: PathKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

impl Action for FileExists {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "file_exists"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "path", &self.path)
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        let found = match self.kind {
            None => self.path.exists(),
            Some(PathKind::File) => self.path.is_file(),
            Some(PathKind::Dir) => self.path.is_dir(),
        };
        outcome.set_result(found);
        Ok(())
    }

    fn describe(&self) -> String {
        match self.kind {
            None => format!("{} exists", self.path.display()),
            Some(PathKind::File) => format!("{} is a file", self.path.display()),
            Some(PathKind::Dir) => format!("{} is a directory", self.path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// FileContains
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileContains {
    common: ActionCommon,
    path: PathBuf,
    pattern: String,
}

impl FileContains {
    pub fn new(path: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            common: ActionCommon::new(),
            path: path.into(),
            pattern: pattern.into(),
        }
    }
}

impl Action for FileContains {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "file_contains"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "path", &self.path)?;
        Regex::new(&self.pattern)
            .map(|_| ())
            .map_err(|e| ValidationFailure::new(self, format!("Invalid pattern: {e}")))
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        outcome.set_result(false);
        if !self.path.is_file() {
            return Err(ActionFailure::new(self, "File does not exist.").into());
        }
        let text = std::fs::read_to_string(&self.path)?;
        let re = Regex::new(&self.pattern)?;
        outcome.set_result(re.is_match(&text));
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} matches /{}/", self.path.display(), self.pattern)
    }
}

// ---------------------------------------------------------------------------
// CompareValues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    Equals,
    NotEquals,
    /// Substring for strings, element for arrays, key for objects.
    Contains,
}

#[derive(Debug, Clone)]
pub struct CompareValues {
    common: ActionCommon,
    left: Value,
    right: Value,
    comparison: Comparison,
}

impl CompareValues {
    pub fn new(left: impl Into<Value>, right: impl Into<Value>) -> Self {
        Self {
            common: ActionCommon::new(),
            left: left.into(),
            right: right.into(),
            comparison: Comparison::Equals,
        }
    }

    pub fn comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }
}

impl Action for CompareValues {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "compare_values"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        if self.comparison == Comparison::Contains {
            let usable = match (&self.left, &self.right) {
                (Value::String(_), Value::String(_)) => true,
                (Value::Array(_), _) => true,
                (Value::Object(_), Value::String(_)) => true,
                _ => false,
            };
            if !usable {
                return Err(ValidationFailure::new(
                    self,
                    "'contains' needs a string, array or object on the left.",
                ));
            }
        }
        Ok(())
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        let matched = match self.comparison {
            Comparison::Equals => self.left == self.right,
            Comparison::NotEquals => self.left != self.right,
            Comparison::Contains => match (&self.left, &self.right) {
                (Value::String(haystack), Value::String(needle)) => {
                    haystack.contains(needle.as_str())
                }
                (Value::Array(items), needle) => items.contains(needle),
                (Value::Object(map), Value::String(key)) => map.contains_key(key),
                _ => false,
            },
        };
        outcome.set_result(matched);
        Ok(())
    }

    fn describe(&self) -> String {
        let op = match self.comparison {
            Comparison::Equals => "equals",
            Comparison::NotEquals => "differs from",
            Comparison::Contains => "contains",
        };
        format!("{} {op} {}", self.left, self.right)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
