pub mod check;
pub mod describe;
pub mod run;

use crate::root;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tidy_core::{ActionFailure, Plan, TidyError, ValidationFailure};

// ---------------------------------------------------------------------------
// RunExit: typed non-zero exit codes (no std::process::exit in command code)
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum RunExit {
    Invalid(ValidationFailure),
    Aborted(ActionFailure),
}

impl RunExit {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunExit::Invalid(_) => 2,
            RunExit::Aborted(_) => 3,
        }
    }

    /// Sort an engine error into a typed exit, or a plain error (exit 1).
    pub fn classify(err: TidyError) -> anyhow::Error {
        match err {
            TidyError::Validation(invalid) => RunExit::Invalid(invalid).into(),
            TidyError::Action(failure) => RunExit::Aborted(failure).into(),
            other => other.into(),
        }
    }
}

impl std::fmt::Display for RunExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunExit::Invalid(invalid) => write!(f, "plan is invalid: {invalid}"),
            RunExit::Aborted(failure) => write!(f, "plan aborted\n{}", failure.render()),
        }
    }
}

impl std::error::Error for RunExit {}

// ---------------------------------------------------------------------------
// Plan loading
// ---------------------------------------------------------------------------

pub struct LoadedPlan {
    pub plan: Plan,
    pub root: PathBuf,
}

pub fn load_plan(path: &Path, explicit_root: Option<&Path>) -> anyhow::Result<LoadedPlan> {
    let plan =
        Plan::load(path).with_context(|| format!("failed to load plan {}", path.display()))?;
    let root = root::resolve_root(explicit_root, path);
    tracing::debug!(plan = plan.display_name(), root = %root.display(), "plan loaded");
    Ok(LoadedPlan { plan, root })
}
