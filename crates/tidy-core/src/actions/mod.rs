//! Built-in leaf actions.
//!
//! - [`fs`]: directory and file mutations.
//! - [`check`]: predicates over the file system and plain values.
//! - [`content`]: structured content reads and edits.

pub mod check;
pub mod content;
pub mod fs;

pub use check::{CompareValues, Comparison, FileContains, FileExists, PathKind};
pub use content::{ContentFormat, EditOp, EditStructuredFile, ReadValue, ValueEdit};
pub use fs::{CopyFile, MakeDirectory, MoveFile, RemoveFile, WriteFile};

use crate::action::Action;
use crate::failure::ValidationFailure;
use std::path::Path;

pub(crate) fn require_path(
    action: &dyn Action,
    field: &str,
    path: &Path,
) -> std::result::Result<(), ValidationFailure> {
    if path.as_os_str().is_empty() {
        return Err(ValidationFailure::new(action, format!("'{field}' must not be empty.")));
    }
    Ok(())
}
