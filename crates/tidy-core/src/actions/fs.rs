use super::require_path;
use crate::action::{common_accessors, Action, ActionCommon};
use crate::error::Result;
use crate::failure::{ActionFailure, ValidationFailure};
use crate::io;
use crate::outcome::Outcome;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MakeDirectory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MakeDirectory {
    common: ActionCommon,
    path: PathBuf,
    recursive: bool,
}

impl MakeDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            common: ActionCommon::new(),
            path: path.into(),
            recursive: true,
        }
    }

    /// Whether missing parent directories are created too. Defaults to true.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

impl Action for MakeDirectory {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "make_directory"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "path", &self.path)
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        if self.path.exists() {
            outcome.set_result(false);
            return Err(ActionFailure::new(self, "Directory already exists.").into());
        }
        if self.recursive {
            io::ensure_dir(&self.path)?;
        } else {
            std::fs::create_dir(&self.path)?;
        }
        outcome.set_result(true);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Make directory {}", self.path.display())
    }
}

// ---------------------------------------------------------------------------
// RemoveFile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RemoveFile {
    common: ActionCommon,
    path: PathBuf,
}

impl RemoveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            common: ActionCommon::new(),
            path: path.into(),
        }
    }
}

impl Action for RemoveFile {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "remove_file"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "path", &self.path)
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        if !self.path.is_file() {
            outcome.set_result(false);
            return Err(ActionFailure::new(self, "File does not exist.").into());
        }
        std::fs::remove_file(&self.path)?;
        outcome.set_result(true);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Remove file {}", self.path.display())
    }
}

// ---------------------------------------------------------------------------
// CopyFile / MoveFile
// ---------------------------------------------------------------------------

/// Shared preconditions for actions that take a source file to a target.
fn check_transfer(
    action: &dyn Action,
    source: &Path,
    target: &Path,
    overwrite: bool,
) -> Result<()> {
    if !source.is_file() {
        return Err(ActionFailure::new(action, "Source file does not exist.").into());
    }
    if target.exists() && !overwrite {
        return Err(ActionFailure::new(action, "Target already exists.").into());
    }
    if let Some(parent) = target.parent() {
        io::ensure_dir(parent)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CopyFile {
    common: ActionCommon,
    source: PathBuf,
    target: PathBuf,
    overwrite: bool,
}

impl CopyFile {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            common: ActionCommon::new(),
            source: source.into(),
            target: target.into(),
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

impl Action for CopyFile {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "copy_file"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "source", &self.source)?;
        require_path(self, "target", &self.target)
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        outcome.set_result(false);
        check_transfer(self, &self.source, &self.target, self.overwrite)?;
        std::fs::copy(&self.source, &self.target)?;
        outcome.set_result(true);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Copy {} to {}", self.source.display(), self.target.display())
    }
}

#[derive(Debug, Clone)]
pub struct MoveFile {
    common: ActionCommon,
    source: PathBuf,
    target: PathBuf,
    overwrite: bool,
}

impl MoveFile {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            common: ActionCommon::new(),
            source: source.into(),
            target: target.into(),
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

impl Action for MoveFile {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "move_file"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "source", &self.source)?;
        require_path(self, "target", &self.target)
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        outcome.set_result(false);
        check_transfer(self, &self.source, &self.target, self.overwrite)?;
        if let Err(e) = std::fs::rename(&self.source, &self.target) {
            // rename cannot cross file systems; fall back to copy + remove.
            tracing::debug!(error = %e, "rename failed, copying instead");
            std::fs::copy(&self.source, &self.target)?;
            std::fs::remove_file(&self.source)?;
        }
        outcome.set_result(true);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Move {} to {}", self.source.display(), self.target.display())
    }
}

// ---------------------------------------------------------------------------
// WriteFile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WriteFile {
    common: ActionCommon,
    path: PathBuf,
    content: String,
    overwrite: bool,
}

impl WriteFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            common: ActionCommon::new(),
            path: path.into(),
            content: content.into(),
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

impl Action for WriteFile {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "write_file"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        require_path(self, "path", &self.path)
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        if self.overwrite {
            io::atomic_write(&self.path, self.content.as_bytes())?;
            outcome.set_result(true);
            return Ok(());
        }
        if !io::write_if_missing(&self.path, self.content.as_bytes())? {
            outcome.set_result(false);
            return Err(ActionFailure::new(self, "File already exists.").into());
        }
        outcome.set_result(true);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Write {} bytes to {}", self.content.len(), self.path.display())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TidyError;
    use crate::flow::ForEach;
    use crate::outcome::OutcomeStatus;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn make_directory_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b");
        let outcome = MakeDirectory::new(&path).run().unwrap();
        assert!(path.is_dir());
        assert_eq!(outcome.result(), Some(&json!(true)));
    }

    #[test]
    fn make_directory_without_parents_fails_on_missing_parent() {
        let dir = TempDir::new().unwrap();
        let action = MakeDirectory::new(dir.path().join("a/b")).recursive(false);
        let outcome = action.run().unwrap();
        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn make_directory_on_existing_path_is_absorbed() {
        let dir = TempDir::new().unwrap();
        let outcome = MakeDirectory::new(dir.path()).run().unwrap();
        assert_eq!(outcome.result(), Some(&json!(false)));
        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(outcome.failures()[0].message(), "Directory already exists.");
    }

    #[test]
    fn make_directory_on_existing_path_raises_when_fatal() {
        let dir = TempDir::new().unwrap();
        let err = MakeDirectory::new(dir.path()).fatal(true).run().unwrap_err();
        match err {
            TidyError::Action(failure) => {
                assert_eq!(failure.message(), "Directory already exists.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_path_is_invalid() {
        let err = MakeDirectory::new("").run().unwrap_err();
        assert!(matches!(err, TidyError::Validation(_)));
    }

    #[test]
    fn remove_file_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let outcome = RemoveFile::new(dir.path().join("nope")).run().unwrap();
        assert_eq!(outcome.failures()[0].message(), "File does not exist.");
        assert_eq!(outcome.result(), Some(&json!(false)));
    }

    #[test]
    fn loop_of_removals_stops_at_missing_file() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.log");
        let third = dir.path().join("third.log");
        std::fs::write(&first, "1").unwrap();
        std::fs::write(&third, "3").unwrap();

        let each = ForEach::new()
            .then(&RemoveFile::new(&first))
            .then(&RemoveFile::new(dir.path().join("second.log")).fatal(true))
            .then(&RemoveFile::new(&third));

        assert!(matches!(each.run(), Err(TidyError::Action(_))));
        assert!(!first.exists());
        assert!(third.exists());
    }

    #[test]
    fn copy_file_refuses_to_overwrite_by_default() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.txt");
        let target = dir.path().join("b.txt");
        std::fs::write(&source, "new").unwrap();
        std::fs::write(&target, "old").unwrap();

        let outcome = CopyFile::new(&source, &target).run().unwrap();
        assert_eq!(outcome.failures()[0].message(), "Target already exists.");
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "old");

        let outcome = CopyFile::new(&source, &target).overwrite(true).run().unwrap();
        assert_eq!(outcome.result(), Some(&json!(true)));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn copy_file_creates_target_directory() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, "x").unwrap();
        let target = dir.path().join("nested/dir/a.txt");
        CopyFile::new(&source, &target).fatal(true).run().unwrap();
        assert!(target.is_file());
        assert!(source.is_file());
    }

    #[test]
    fn move_file_moves() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app.log");
        let target = dir.path().join("archive/app.log");
        std::fs::write(&source, "log").unwrap();
        let outcome = MoveFile::new(&source, &target).run().unwrap();
        assert_eq!(outcome.result(), Some(&json!(true)));
        assert!(!source.exists());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "log");
    }

    #[test]
    fn move_file_without_source_fails() {
        let dir = TempDir::new().unwrap();
        let action = MoveFile::new(dir.path().join("gone"), dir.path().join("t")).fatal(true);
        assert!(action.run().is_err());
    }

    #[test]
    fn write_file_respects_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        WriteFile::new(&path, "one").run().unwrap();
        let outcome = WriteFile::new(&path, "two").run().unwrap();
        assert_eq!(outcome.failures()[0].message(), "File already exists.");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");

        WriteFile::new(&path, "two").overwrite(true).run().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }
}
