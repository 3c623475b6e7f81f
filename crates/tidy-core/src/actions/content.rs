//! Reads and edits of structured content (JSON, YAML, line lists).
//!
//! Content is held as a `serde_json::Value` whatever the on-disk format.
//! Locations inside it are JSON pointers (`/servers/0/port`); the empty
//! pointer addresses the whole document.

use super::require_path;
use crate::action::{common_accessors, validate_tree, Action, ActionCommon};
use crate::error::{Result, TidyError};
use crate::failure::{ActionFailure, ValidationFailure};
use crate::io;
use crate::outcome::Outcome;
use crate::pipeline::{thread_content, ContentEdit};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ContentFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    Json,
    Yaml,
    /// One string per line.
    Lines,
}

impl ContentFormat {
    /// Guess from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(ContentFormat::Json),
            "yaml" | "yml" => Some(ContentFormat::Yaml),
            "txt" | "list" => Some(ContentFormat::Lines),
            _ => None,
        }
    }

    /// Blank text parses to `null` in every format.
    pub fn parse(self, text: &str) -> Result<Value> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        match self {
            ContentFormat::Json => Ok(serde_json::from_str(text)?),
            ContentFormat::Yaml => Ok(serde_yaml::from_str(text)?),
            ContentFormat::Lines => Ok(Value::Array(
                text.lines().map(|line| Value::String(line.to_string())).collect(),
            )),
        }
    }

    pub fn render(self, value: &Value) -> Result<String> {
        match self {
            ContentFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
            ContentFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            ContentFormat::Lines => {
                let lines: Vec<String> = match value {
                    Value::Null => Vec::new(),
                    Value::Array(items) => items.iter().map(line_text).collect(),
                    other => vec![line_text(other)],
                };
                if lines.is_empty() {
                    Ok(String::new())
                } else {
                    Ok(format!("{}\n", lines.join("\n")))
                }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentFormat::Json => "json",
            ContentFormat::Yaml => "yaml",
            ContentFormat::Lines => "lines",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn line_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn resolve_format(explicit: Option<ContentFormat>, path: &Path) -> ContentFormat {
    explicit
        .or_else(|| ContentFormat::from_path(path))
        .unwrap_or(ContentFormat::Lines)
}

// ---------------------------------------------------------------------------
// Pointers
// ---------------------------------------------------------------------------

/// Split a JSON pointer into unescaped reference tokens.
pub fn pointer_tokens(pointer: &str) -> Result<Vec<String>> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(TidyError::InvalidPointer(pointer.to_string()));
    };
    Ok(rest
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect())
}

fn pointer_label(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}

/// Array index for `token` in an array of length `len`; `-` and `len`
/// address the slot after the last element.
fn array_slot(token: &str, len: usize) -> Option<usize> {
    if token == "-" {
        return Some(len);
    }
    token.parse::<usize>().ok().filter(|&index| index <= len)
}

/// Mutable reference to the value at `tokens`, creating objects along the
/// way. `None` when the path runs through a scalar or an out-of-range
/// array index.
fn slot_mut<'a>(root: &'a mut Value, tokens: &[String]) -> Option<&'a mut Value> {
    let mut current = root;
    for token in tokens {
        if current.is_null() {
            *current = Value::Object(Default::default());
        }
        current = match { current } {
            Value::Object(map) => map.entry(token.clone()).or_insert(Value::Null),
            Value::Array(items) => {
                let index = array_slot(token, items.len())?;
                if index == items.len() {
                    items.push(Value::Null);
                }
                &mut items[index]
            }
            _ => return None,
        };
    }
    Some(current)
}

fn remove_at(root: &mut Value, tokens: &[String]) -> bool {
    let Some((last, parents)) = tokens.split_last() else {
        let had_content = !root.is_null();
        *root = Value::Null;
        return had_content;
    };
    let mut current = root;
    for token in parents {
        let next = match { current } {
            Value::Object(map) => map.get_mut(token),
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return false,
        }
    }
    match current {
        Value::Object(map) => map.remove(last).is_some(),
        Value::Array(items) => match last.parse::<usize>() {
            Ok(index) if index < items.len() => {
                items.remove(index);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// ReadValue
// ---------------------------------------------------------------------------

/// Reads a JSON or YAML file and takes the value at a pointer as result.
#[derive(Debug, Clone)]
pub struct ReadValue {
    common: ActionCommon,
    path: PathBuf,
    pointer: String,
    format: Option<ContentFormat>,
}

impl ReadValue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            common: ActionCommon::new(),
            path: path.into(),
            pointer: String::new(),
            format: None,
        }
    }

    pub fn pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = pointer.into();
        self
    }

    pub fn format(mut self, format: ContentFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl Action for ReadValue {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "read_value"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "path", &self.path)?;
        pointer_tokens(&self.pointer)
            .map(|_| ())
            .map_err(|e| ValidationFailure::new(self, e.to_string()))
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        outcome.set_result(Value::Null);
        let Some(text) = io::read_if_exists(&self.path)? else {
            return Err(ActionFailure::new(self, "File does not exist.").into());
        };
        let document = resolve_format(self.format, &self.path).parse(&text)?;
        let found = document.pointer(&self.pointer).cloned().unwrap_or(Value::Null);
        outcome.set_result(found);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Read {} from {}", pointer_label(&self.pointer), self.path.display())
    }
}

// ---------------------------------------------------------------------------
// ValueEdit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Set { value: Value },
    Remove,
    /// Push onto the array at the pointer, creating it when absent.
    Append { value: Value },
    /// Regex replace in the string, or every string of the array, at the
    /// pointer.
    Replace { pattern: String, with: String },
}

/// One edit applied to content fed in by its owner. The result is the
/// edited content.
#[derive(Debug, Clone)]
pub struct ValueEdit {
    common: ActionCommon,
    pointer: String,
    op: EditOp,
    input: Value,
}

impl ValueEdit {
    pub fn new(pointer: impl Into<String>, op: EditOp) -> Self {
        Self {
            common: ActionCommon::new(),
            pointer: pointer.into(),
            op,
            input: Value::Null,
        }
    }

    pub fn set(pointer: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(pointer, EditOp::Set { value: value.into() })
    }

    pub fn remove(pointer: impl Into<String>) -> Self {
        Self::new(pointer, EditOp::Remove)
    }

    pub fn append(pointer: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(pointer, EditOp::Append { value: value.into() })
    }

    pub fn replace(
        pointer: impl Into<String>,
        pattern: impl Into<String>,
        with: impl Into<String>,
    ) -> Self {
        Self::new(
            pointer,
            EditOp::Replace {
                pattern: pattern.into(),
                with: with.into(),
            },
        )
    }

    pub fn op(&self) -> &EditOp {
        &self.op
    }

    fn edit(&self, content: &mut Value) -> Result<std::result::Result<(), String>> {
        let tokens = pointer_tokens(&self.pointer)?;
        let at = pointer_label(&self.pointer);
        match &self.op {
            EditOp::Set { value } => match slot_mut(content, &tokens) {
                Some(slot) => *slot = value.clone(),
                None => return Ok(Err(format!("Cannot set a value at {at}."))),
            },
            EditOp::Remove => {
                if !remove_at(content, &tokens) {
                    return Ok(Err(format!("Nothing to remove at {at}.")));
                }
            }
            EditOp::Append { value } => match slot_mut(content, &tokens) {
                Some(slot) => {
                    if slot.is_null() {
                        *slot = Value::Array(Vec::new());
                    }
                    match slot {
                        Value::Array(items) => items.push(value.clone()),
                        _ => return Ok(Err(format!("Value at {at} is not a list."))),
                    }
                }
                None => return Ok(Err(format!("Cannot append at {at}."))),
            },
            EditOp::Replace { pattern, with } => {
                let re = Regex::new(pattern)?;
                let replace = |s: &mut String| {
                    let replaced = re.replace_all(s.as_str(), with.as_str()).into_owned();
                    *s = replaced;
                };
                match slot_mut(content, &tokens) {
                    Some(Value::String(s)) => replace(s),
                    Some(Value::Array(items)) => {
                        for item in items.iter_mut() {
                            if let Value::String(s) = item {
                                replace(s);
                            }
                        }
                    }
                    _ => return Ok(Err(format!("Value at {at} is not text."))),
                }
            }
        }
        Ok(Ok(()))
    }
}

impl Action for ValueEdit {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "value_edit"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        pointer_tokens(&self.pointer).map_err(|e| ValidationFailure::new(self, e.to_string()))?;
        if let EditOp::Replace { pattern, .. } = &self.op {
            Regex::new(pattern)
                .map_err(|e| ValidationFailure::new(self, format!("Invalid pattern: {e}")))?;
        }
        Ok(())
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        let mut content = self.input.clone();
        if let Err(message) = self.edit(&mut content)? {
            return Err(ActionFailure::new(self, message).into());
        }
        outcome.set_result(content);
        Ok(())
    }

    /// Edited content may legitimately be falsy (`{}`, `[]`); success is
    /// the absence of failures.
    fn validate_result(&self, outcome: &Outcome) -> bool {
        outcome.result().is_some() && outcome.failures().is_empty()
    }

    fn describe(&self) -> String {
        let at = pointer_label(&self.pointer);
        match &self.op {
            EditOp::Set { value } => format!("Set {at} to {value}"),
            EditOp::Remove => format!("Remove {at}"),
            EditOp::Append { value } => format!("Append {value} to {at}"),
            EditOp::Replace { pattern, with } => {
                format!("Replace /{pattern}/ with '{with}' at {at}")
            }
        }
    }
}

impl ContentEdit for ValueEdit {
    fn feed(&mut self, content: Value) {
        self.input = content;
    }
}

// ---------------------------------------------------------------------------
// EditStructuredFile
// ---------------------------------------------------------------------------

/// Parses a file, threads it through its edits and writes the result back
/// when it changed.
#[derive(Debug, Clone)]
pub struct EditStructuredFile {
    common: ActionCommon,
    path: PathBuf,
    format: Option<ContentFormat>,
    create: bool,
    edits: Vec<ValueEdit>,
}

impl EditStructuredFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            common: ActionCommon::new(),
            path: path.into(),
            format: None,
            create: false,
            edits: Vec::new(),
        }
    }

    pub fn format(mut self, format: ContentFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Start from empty content when the file is missing.
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn edit(mut self, edit: ValueEdit) -> Self {
        self.edits.push(edit);
        self
    }

    pub fn push_edit(&mut self, edit: ValueEdit) {
        self.edits.push(edit);
    }

    fn resolved_format(&self) -> ContentFormat {
        resolve_format(self.format, &self.path)
    }
}

impl Action for EditStructuredFile {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "edit_structured_file"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "path", &self.path)?;
        if self.edits.is_empty() {
            return Err(ValidationFailure::new(self, "At least one edit is required."));
        }
        for edit in &self.edits {
            validate_tree(edit)?;
        }
        Ok(())
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        outcome.set_result(false);
        let format = self.resolved_format();
        let existing = io::read_if_exists(&self.path)?;
        if existing.is_none() && !self.create {
            return Err(ActionFailure::new(self, "File does not exist.").into());
        }
        let original = match &existing {
            Some(text) => format.parse(text)?,
            None => Value::Null,
        };

        let threaded = thread_content(self, outcome, &self.edits, original.clone())?;

        if existing.is_none() || threaded.content != original {
            let text = format.render(&threaded.content)?;
            io::atomic_write(&self.path, text.as_bytes())?;
            tracing::debug!(path = %self.path.display(), %format, "content written");
        }
        outcome.set_result(threaded.all_succeeded());
        Ok(())
    }

    fn describe(&self) -> String {
        let mut lines = vec![format!(
            "Edit {} as {}",
            self.path.display(),
            self.resolved_format()
        )];
        for edit in &self.edits {
            lines.push(format!("  - {}", edit.describe()));
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeStatus;
    use crate::pipeline::CONTENT_EDITS_FAILED;
    use serde_json::json;
    use tempfile::TempDir;

    fn edited(edit: ValueEdit, input: Value) -> Outcome {
        let mut edit = edit;
        edit.feed(input);
        edit.run().unwrap()
    }

    #[test]
    fn pointer_tokens_unescape() {
        assert_eq!(pointer_tokens("").unwrap(), Vec::<String>::new());
        assert_eq!(pointer_tokens("/a~1b/c~0d").unwrap(), vec!["a/b", "c~d"]);
        assert!(matches!(pointer_tokens("a"), Err(TidyError::InvalidPointer(_))));
    }

    #[test]
    fn formats_parse_and_render() {
        assert_eq!(ContentFormat::Json.parse("  \n").unwrap(), Value::Null);
        assert_eq!(ContentFormat::Yaml.parse("a: 1\n").unwrap(), json!({"a": 1}));
        assert_eq!(ContentFormat::Lines.parse("a\nb\n").unwrap(), json!(["a", "b"]));
        assert_eq!(ContentFormat::Lines.render(&json!(["a", 1])).unwrap(), "a\n1\n");
        assert_eq!(ContentFormat::Lines.render(&json!([])).unwrap(), "");
        assert_eq!(ContentFormat::Json.render(&json!({"a": 1})).unwrap(), "{\n  \"a\": 1\n}\n");
        assert_eq!(
            ContentFormat::from_path(Path::new("x/config.yml")),
            Some(ContentFormat::Yaml)
        );
        assert_eq!(ContentFormat::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let outcome = edited(ValueEdit::set("/server/port", 8080), json!(null));
        assert_eq!(outcome.result(), Some(&json!({"server": {"port": 8080}})));
    }

    #[test]
    fn set_addresses_array_slots() {
        let outcome = edited(ValueEdit::set("/1", "B"), json!(["a", "b"]));
        assert_eq!(outcome.result(), Some(&json!(["a", "B"])));
        let outcome = edited(ValueEdit::set("/-", "c"), json!(["a"]));
        assert_eq!(outcome.result(), Some(&json!(["a", "c"])));
    }

    #[test]
    fn set_through_a_scalar_fails() {
        let outcome = edited(ValueEdit::set("/a/b", 1), json!({"a": 5}));
        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        assert_eq!(outcome.failures()[0].message(), "Cannot set a value at /a/b.");
    }

    #[test]
    fn remove_deletes_keys_and_elements() {
        let outcome = edited(ValueEdit::remove("/a"), json!({"a": 1, "b": 2}));
        assert_eq!(outcome.result(), Some(&json!({"b": 2})));
        let outcome = edited(ValueEdit::remove("/list/0"), json!({"list": [1, 2]}));
        assert_eq!(outcome.result(), Some(&json!({"list": [2]})));
        let outcome = edited(ValueEdit::remove("/missing"), json!({}));
        assert_eq!(outcome.failures()[0].message(), "Nothing to remove at /missing.");
    }

    #[test]
    fn append_creates_the_list() {
        let outcome = edited(ValueEdit::append("/plugins", "lint"), json!({}));
        assert_eq!(outcome.result(), Some(&json!({"plugins": ["lint"]})));
        let outcome = edited(ValueEdit::append("/name", "x"), json!({"name": "app"}));
        assert_eq!(outcome.failures()[0].message(), "Value at /name is not a list.");
    }

    #[test]
    fn replace_rewrites_text_and_lists() {
        let outcome = edited(
            ValueEdit::replace("/url", "http:", "https:"),
            json!({"url": "http://x"}),
        );
        assert_eq!(outcome.result(), Some(&json!({"url": "https://x"})));
        let outcome = edited(ValueEdit::replace("", "^#\\s*", ""), json!(["# a", "b", 3]));
        assert_eq!(outcome.result(), Some(&json!(["a", "b", 3])));
    }

    #[test]
    fn emptied_content_still_counts_as_success() {
        let edit = ValueEdit::remove("/a");
        let mut fed = edit.clone();
        fed.feed(json!({"a": 1}));
        let outcome = fed.run().unwrap();
        assert_eq!(outcome.result(), Some(&json!({})));
        assert!(edit.validate_result(&outcome));
    }

    #[test]
    fn value_edit_validates_pointer_and_pattern() {
        assert!(ValueEdit::set("nope", 1).validate_instance().is_err());
        assert!(ValueEdit::replace("/a", "(", "").validate_instance().is_err());
    }

    #[test]
    fn read_value_resolves_pointer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(&path, r#"{"mode": "prod", "ports": [80, 443]}"#).unwrap();

        let outcome = ReadValue::new(&path).pointer("/ports/1").run().unwrap();
        assert_eq!(outcome.result(), Some(&json!(443)));
        let outcome = ReadValue::new(&path).pointer("/absent").run().unwrap();
        assert_eq!(outcome.result(), Some(&json!(null)));
        assert!(outcome.failures().is_empty());
    }

    #[test]
    fn read_value_reads_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings");
        std::fs::write(&path, "mode: dev\n").unwrap();
        let outcome = ReadValue::new(&path)
            .format(ContentFormat::Yaml)
            .pointer("/mode")
            .run()
            .unwrap();
        assert_eq!(outcome.result(), Some(&json!("dev")));
    }

    #[test]
    fn read_value_on_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let outcome = ReadValue::new(dir.path().join("x.json")).run().unwrap();
        assert_eq!(outcome.failures()[0].message(), "File does not exist.");
    }

    #[test]
    fn edit_structured_file_applies_edits_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, r#"{"name": "app", "scripts": {}}"#).unwrap();

        let action = EditStructuredFile::new(&path)
            .edit(ValueEdit::set("/scripts/test", "cargo test"))
            .edit(ValueEdit::append("/keywords", "cli"))
            .edit(ValueEdit::remove("/name"));
        let outcome = action.run().unwrap();

        assert_eq!(outcome.result(), Some(&json!(true)));
        assert_eq!(outcome.nested().len(), 3);
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"scripts": {"test": "cargo test"}, "keywords": ["cli"]}));
    }

    #[test]
    fn failed_edit_is_recorded_and_others_still_apply() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "a: 1\n").unwrap();

        let action = EditStructuredFile::new(&path)
            .edit(ValueEdit::remove("/missing"))
            .edit(ValueEdit::set("/b", 2));
        let outcome = action.run().unwrap();

        assert_eq!(outcome.result(), Some(&json!(false)));
        let failure = &outcome.failures()[0];
        assert_eq!(failure.message(), CONTENT_EDITS_FAILED);
        assert_eq!(failure.children()[0].message(), "Nothing to remove at /missing.");
        let written: Value =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn fatal_edit_file_raises_on_failed_edit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        let action = EditStructuredFile::new(&path)
            .edit(ValueEdit::remove("/missing"))
            .fatal(true);
        assert!(matches!(action.run(), Err(TidyError::Action(_))));
    }

    #[test]
    fn missing_file_needs_create() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitignore.txt");

        let outcome = EditStructuredFile::new(&path)
            .edit(ValueEdit::append("", "target/"))
            .run()
            .unwrap();
        assert_eq!(outcome.failures()[0].message(), "File does not exist.");
        assert!(!path.exists());

        EditStructuredFile::new(&path)
            .create(true)
            .edit(ValueEdit::append("", "target/"))
            .run()
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "target/\n");
    }

    #[test]
    fn requires_an_edit() {
        let action = EditStructuredFile::new("x.json");
        assert!(matches!(action.run(), Err(TidyError::Validation(_))));
    }

    #[test]
    fn describe_lists_edits() {
        let action = EditStructuredFile::new("app.json")
            .edit(ValueEdit::set("/a", 1))
            .edit(ValueEdit::remove(""));
        assert_eq!(action.describe(), "Edit app.json as json\n  - Set /a to 1\n  - Remove /");
    }
}
