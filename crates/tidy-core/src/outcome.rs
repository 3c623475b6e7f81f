//! The record of one action execution.

use crate::action::Action;
use crate::failure::ActionFailure;
use crate::severity::SeverityLevel;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Truthiness
// ---------------------------------------------------------------------------

/// Whether a result value counts as positive: `null`, `false`, `0`, `""`,
/// `"0"`, `[]` and `{}` are negative, everything else is positive.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// ---------------------------------------------------------------------------
// OutcomeStatus
// ---------------------------------------------------------------------------

/// "Has direct failures?" crossed with "has failed pre-run hooks?" crossed
/// with "has failed post-run hooks?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    SuccessWithPreRunFailures,
    SuccessWithPostRunFailures,
    SuccessWithHookFailures,
    Failed,
    FailedWithPreRunFailures,
    FailedWithPostRunFailures,
    FailedWithHookFailures,
}

impl OutcomeStatus {
    pub fn from_flags(failed: bool, pre_run: bool, post_run: bool) -> Self {
        match (failed, pre_run, post_run) {
            (false, false, false) => OutcomeStatus::Success,
            (false, true, false) => OutcomeStatus::SuccessWithPreRunFailures,
            (false, false, true) => OutcomeStatus::SuccessWithPostRunFailures,
            (false, true, true) => OutcomeStatus::SuccessWithHookFailures,
            (true, false, false) => OutcomeStatus::Failed,
            (true, true, false) => OutcomeStatus::FailedWithPreRunFailures,
            (true, false, true) => OutcomeStatus::FailedWithPostRunFailures,
            (true, true, true) => OutcomeStatus::FailedWithHookFailures,
        }
    }

    /// The apply step recorded no failure (hooks may still have failed).
    pub fn is_success(self) -> bool {
        matches!(
            self,
            OutcomeStatus::Success
                | OutcomeStatus::SuccessWithPreRunFailures
                | OutcomeStatus::SuccessWithPostRunFailures
                | OutcomeStatus::SuccessWithHookFailures
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::SuccessWithPreRunFailures => "success_with_pre_run_failures",
            OutcomeStatus::SuccessWithPostRunFailures => "success_with_post_run_failures",
            OutcomeStatus::SuccessWithHookFailures => "success_with_hook_failures",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::FailedWithPreRunFailures => "failed_with_pre_run_failures",
            OutcomeStatus::FailedWithPostRunFailures => "failed_with_post_run_failures",
            OutcomeStatus::FailedWithHookFailures => "failed_with_hook_failures",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Created at the start of `run()`, filled in during that call and handed
/// back to the caller. Holds its own copy of the action so later changes to
/// the live action do not alter a recorded outcome.
#[derive(Debug, Clone)]
pub struct Outcome {
    action: Box<dyn Action>,
    result: Option<Value>,
    failures: Vec<ActionFailure>,
    pre_run_failures: Vec<Outcome>,
    post_run_failures: Vec<Outcome>,
    nested: Vec<Outcome>,
}

impl Outcome {
    pub fn new(action: &dyn Action) -> Self {
        Self {
            action: action.clone_box(),
            result: None,
            failures: Vec::new(),
            pre_run_failures: Vec::new(),
            post_run_failures: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn action(&self) -> &dyn Action {
        self.action.as_ref()
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, value: impl Into<Value>) {
        self.result = Some(value.into());
    }

    /// Truthiness of the result; an unset result is negative.
    pub fn is_positive(&self) -> bool {
        self.result.as_ref().map(is_truthy).unwrap_or(false)
    }

    pub fn failures(&self) -> &[ActionFailure] {
        &self.failures
    }

    pub fn add_failure(&mut self, failure: ActionFailure) {
        self.failures.push(failure);
    }

    pub fn pre_run_failures(&self) -> &[Outcome] {
        &self.pre_run_failures
    }

    pub fn add_pre_run_failure(&mut self, hook: Outcome) {
        self.pre_run_failures.push(hook);
    }

    pub fn post_run_failures(&self) -> &[Outcome] {
        &self.post_run_failures
    }

    pub fn add_post_run_failure(&mut self, hook: Outcome) {
        self.post_run_failures.push(hook);
    }

    /// Outcomes of child actions run by a composite, in execution order.
    pub fn nested(&self) -> &[Outcome] {
        &self.nested
    }

    pub fn add_nested(&mut self, child: Outcome) {
        self.nested.push(child);
    }

    pub fn status(&self) -> OutcomeStatus {
        OutcomeStatus::from_flags(
            !self.failures.is_empty(),
            !self.pre_run_failures.is_empty(),
            !self.post_run_failures.is_empty(),
        )
    }

    /// Walks direct failures, failed hooks and nested outcomes. A failed
    /// hook counts as a failing action in its own right.
    pub fn has_critical_failures(&self) -> bool {
        let failed_hook_is_critical = |hook: &Outcome| {
            hook.action.severity().is_critical() || hook.has_critical_failures()
        };
        self.failures.iter().any(ActionFailure::is_critical)
            || self.pre_run_failures.iter().any(failed_hook_is_critical)
            || self.post_run_failures.iter().any(failed_hook_is_critical)
            || self.nested.iter().any(Outcome::has_critical_failures)
    }

    pub fn report(&self) -> OutcomeReport {
        OutcomeReport {
            kind: self.action.kind().to_string(),
            description: self.action.describe(),
            severity: self.action.severity().level(),
            status: self.status(),
            result: self.result.clone(),
            failures: self.failures.clone(),
            pre_run_failures: self.pre_run_failures.iter().map(Outcome::report).collect(),
            post_run_failures: self.post_run_failures.iter().map(Outcome::report).collect(),
            nested: self.nested.iter().map(Outcome::report).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutcomeReport
// ---------------------------------------------------------------------------

/// Serializable view of an outcome tree.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReport {
    pub kind: String,
    pub description: String,
    pub severity: SeverityLevel,
    pub status: OutcomeStatus,
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ActionFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_run_failures: Vec<OutcomeReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_run_failures: Vec<OutcomeReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<OutcomeReport>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
