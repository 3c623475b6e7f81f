//! The action lifecycle: validate, before-hooks, apply, result check,
//! after-hooks.
//!
//! Severity decides what happens to a failure raised by `apply`:
//!
//! | level              | apply raises          | negative result |
//! |--------------------|-----------------------|-----------------|
//! | `NON_CRITICAL`     | recorded              | ignored         |
//! | `SUCCESS_REQUIRED` | recorded              | raised          |
//! | `FATAL`            | raised                | ignored         |
//! | `CRITICAL`         | raised                | raised          |
//!
//! A failure that reaches `apply` from a child action is raised regardless
//! of the parent's flags when its tree holds a critical failure.

use crate::action::{validate_tree, Action};
use crate::error::{Result, TidyError};
use crate::failure::ActionFailure;
use crate::outcome::{Outcome, OutcomeStatus};

pub const POSITIVE_RESULT_EXPECTED: &str = "Positive result expected.";
pub const NESTED_ACTION_FAILED: &str = "Nested action failed.";

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn run(action: &dyn Action) -> Result<Outcome> {
    validate_tree(action)?;

    let mut outcome = Outcome::new(action);
    tracing::debug!(
        kind = action.kind(),
        severity = %action.severity(),
        "running {}",
        action.describe()
    );

    run_hooks(action, HookStage::Before, &mut outcome)?;

    if let Err(err) = action.apply(&mut outcome) {
        absorb_or_raise(action, &mut outcome, err)?;
    }

    if action.severity().success_required && !action.validate_result(&outcome) {
        let mut raised = ActionFailure::new(action, POSITIVE_RESULT_EXPECTED);
        for absorbed in outcome.failures() {
            raised.push_child(absorbed.clone());
        }
        return Err(raised.into());
    }

    run_hooks(action, HookStage::After, &mut outcome)?;

    tracing::debug!(kind = action.kind(), status = %outcome.status(), "finished");
    Ok(outcome)
}

/// Record `failure` on `outcome` unless `action` is fatal, in which case
/// it is raised.
pub fn dispose(action: &dyn Action, outcome: &mut Outcome, failure: ActionFailure) -> Result<()> {
    if action.severity().fatal {
        return Err(failure.into());
    }
    tracing::warn!(kind = action.kind(), "{}", failure.render());
    outcome.add_failure(failure);
    Ok(())
}

fn absorb_or_raise(action: &dyn Action, outcome: &mut Outcome, err: TidyError) -> Result<()> {
    let failure = match err {
        TidyError::Validation(invalid) => return Err(invalid.into()),
        TidyError::Action(failure) => failure,
        other => ActionFailure::new(action, other.to_string()),
    };

    if failure.raised_by(action) {
        return dispose(action, outcome, failure);
    }

    let escalate = failure.is_critical();
    let failure = ActionFailure::new(action, NESTED_ACTION_FAILED).with_child(failure);
    if escalate {
        return Err(failure.into());
    }
    dispose(action, outcome, failure)
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookStage {
    Before,
    After,
}

impl HookStage {
    fn hooks(self, action: &dyn Action) -> &[Box<dyn Action>] {
        match self {
            HookStage::Before => action.common().before_actions(),
            HookStage::After => action.common().after_actions(),
        }
    }

    fn record(self, outcome: &mut Outcome, hook: Outcome) {
        match self {
            HookStage::Before => outcome.add_pre_run_failure(hook),
            HookStage::After => outcome.add_post_run_failure(hook),
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            HookStage::Before => "Before-action failed.",
            HookStage::After => "After-action failed.",
        }
    }
}

fn run_hooks(parent: &dyn Action, stage: HookStage, outcome: &mut Outcome) -> Result<()> {
    for hook in stage.hooks(parent) {
        match hook.run() {
            Ok(done) => {
                if done.status() != OutcomeStatus::Success || !hook.validate_result(&done) {
                    tracing::debug!(kind = hook.kind(), stage = ?stage, "hook did not succeed");
                    stage.record(outcome, done);
                }
            }
            Err(TidyError::Action(failure)) => {
                let mut done = Outcome::new(hook.as_ref());
                done.add_failure(failure.clone());
                stage.record(outcome, done);
                if hook.severity().is_critical() {
                    let raised =
                        ActionFailure::new(parent, stage.failure_message()).with_child(failure);
                    return Err(raised.into());
                }
                tracing::warn!(kind = hook.kind(), stage = ?stage, "{}", failure.render());
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
