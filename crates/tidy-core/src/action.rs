//! The action contract.
//!
//! Every unit of work implements [`Action`]: it validates its own
//! configuration, applies its effect to an [`Outcome`], judges its result and
//! describes itself. Severity flags and hook lists live in an embedded
//! [`ActionCommon`] rather than in shared base state.
//!
//! `run()` is provided by the trait and delegates to [`crate::runtime::run`],
//! which owns the lifecycle (validate, before-hooks, apply, after-hooks).

use crate::error::Result;
use crate::failure::ValidationFailure;
use crate::outcome::Outcome;
use crate::runtime;
use crate::severity::Severity;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ActionId
// ---------------------------------------------------------------------------

/// Identity assigned when an action is constructed. Plain clones keep it;
/// adopted copies get a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ActionId(Uuid);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// ActionCommon
// ---------------------------------------------------------------------------

/// State shared by every action: identity, severity and hooks.
#[derive(Debug, Clone)]
pub struct ActionCommon {
    id: ActionId,
    severity: Severity,
    before: Vec<Box<dyn Action>>,
    after: Vec<Box<dyn Action>>,
}

impl ActionCommon {
    pub fn new() -> Self {
        Self {
            id: ActionId::new(),
            severity: Severity::NON_CRITICAL,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn renew_id(&mut self) {
        self.id = ActionId::new();
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    pub fn set_fatal(&mut self, fatal: bool) {
        self.severity.fatal = fatal;
    }

    pub fn set_success_required(&mut self, success_required: bool) {
        self.severity.success_required = success_required;
    }

    pub fn add_before_action(&mut self, action: Box<dyn Action>) {
        self.before.push(action);
    }

    pub fn add_after_action(&mut self, action: Box<dyn Action>) {
        self.after.push(action);
    }

    pub fn before_actions(&self) -> &[Box<dyn Action>] {
        &self.before
    }

    pub fn after_actions(&self) -> &[Box<dyn Action>] {
        &self.after
    }
}

impl Default for ActionCommon {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

pub trait Action: ActionClone + fmt::Debug + Send + Sync {
    /// Stable snake_case name of the action type, e.g. `make_directory`.
    fn kind(&self) -> &'static str;

    fn common(&self) -> &ActionCommon;

    fn common_mut(&mut self) -> &mut ActionCommon;

    /// Structural checks on the action's configuration. Always raises on a
    /// breach, whatever the severity flags say.
    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure>;

    /// Perform the effect and record the result on `outcome`.
    fn apply(&self, outcome: &mut Outcome) -> Result<()>;

    /// Whether the recorded result counts as the positive case.
    fn validate_result(&self, outcome: &Outcome) -> bool {
        outcome.is_positive()
    }

    /// Human-readable description. Must not fail and must be callable
    /// before validation.
    fn describe(&self) -> String;

    fn severity(&self) -> Severity {
        self.common().severity()
    }

    fn run(&self) -> Result<Outcome> {
        runtime::run(self.as_action())
    }

    // -----------------------------------------------------------------------
    // Builder helpers
    // -----------------------------------------------------------------------

    fn fatal(mut self, fatal: bool) -> Self
    where
        Self: Sized,
    {
        self.common_mut().set_fatal(fatal);
        self
    }

    fn success_required(mut self, success_required: bool) -> Self
    where
        Self: Sized,
    {
        self.common_mut().set_success_required(success_required);
        self
    }

    fn with_severity(mut self, severity: Severity) -> Self
    where
        Self: Sized,
    {
        self.common_mut().set_severity(severity);
        self
    }

    fn before<A: Action + 'static>(mut self, hook: A) -> Self
    where
        Self: Sized,
    {
        self.common_mut().add_before_action(Box::new(hook));
        self
    }

    fn after<A: Action + 'static>(mut self, hook: A) -> Self
    where
        Self: Sized,
    {
        self.common_mut().add_after_action(Box::new(hook));
        self
    }
}

/// Object-safe cloning for boxed actions.
pub trait ActionClone {
    fn clone_box(&self) -> Box<dyn Action>;

    fn as_action(&self) -> &dyn Action;
}

impl<T> ActionClone for T
where
    T: Action + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn Action> {
        Box::new(self.clone())
    }

    fn as_action(&self) -> &dyn Action {
        self
    }
}

impl Clone for Box<dyn Action> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

macro_rules! common_accessors {
    () => {
        fn common(&self) -> &$crate::action::ActionCommon {
            &self.common
        }

        fn common_mut(&mut self) -> &mut $crate::action::ActionCommon {
            &mut self.common
        }
    };
}

pub(crate) use common_accessors;

// ---------------------------------------------------------------------------
// Adoption
// ---------------------------------------------------------------------------

/// Copy `action` and rewrite the copy's severity with `force`.
///
/// Composites adopt their children through this function, so the instance
/// the caller passed in keeps its own flags and can be reused elsewhere.
/// The copy gets a fresh id, so it never shares one with the composite
/// holding it.
pub fn adopt(action: &dyn Action, force: impl FnOnce(Severity) -> Severity) -> Box<dyn Action> {
    let mut copy = action.clone_box();
    let severity = force(copy.severity());
    copy.common_mut().set_severity(severity);
    copy.common_mut().renew_id();
    copy
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// `validate_instance()` of `action` and, recursively, of its hooks.
///
/// Composites validate their children through this function.
pub fn validate_tree(action: &dyn Action) -> std::result::Result<(), ValidationFailure> {
    action.validate_instance()?;
    let common = action.common();
    for hook in common.before_actions().iter().chain(common.after_actions()) {
        validate_tree(hook.as_ref())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Descriptions
// ---------------------------------------------------------------------------

/// `describe()` plus the action's hooks, indented beneath it.
pub fn describe_tree(action: &dyn Action) -> String {
    let mut lines = vec![action.describe()];
    for hook in action.common().before_actions() {
        lines.push(format!("  before: {}", indent_tail(&describe_tree(hook.as_ref()))));
    }
    for hook in action.common().after_actions() {
        lines.push(format!("  after: {}", indent_tail(&describe_tree(hook.as_ref()))));
    }
    lines.join("\n")
}

/// Indent every line of `text` by two spaces.
pub(crate) fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent every line but the first, for text that follows a label.
pub(crate) fn indent_tail(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default().to_string();
    lines.fold(first, |mut acc, line| {
        acc.push_str("\n  ");
        acc.push_str(line);
        acc
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{call_log, Probe};

    #[test]
    fn builder_sets_flags_independently() {
        let log = call_log();
        let probe = Probe::new("p", &log).fatal(true);
        assert_eq!(probe.severity(), Severity::FATAL);
        let probe = probe.success_required(true);
        assert_eq!(probe.severity(), Severity::CRITICAL);
        let probe = probe.fatal(false);
        assert_eq!(probe.severity(), Severity::SUCCESS_REQUIRED);
    }

    #[test]
    fn adopt_leaves_the_original_untouched() {
        let log = call_log();
        let original = Probe::new("p", &log).success_required(true);
        let adopted = adopt(&original, |_| Severity::FATAL);
        assert_eq!(original.severity(), Severity::SUCCESS_REQUIRED);
        assert_eq!(adopted.severity(), Severity::FATAL);
        assert_ne!(adopted.common().id(), original.common().id());
        assert_eq!(original.clone().common().id(), original.common().id());
    }

    #[test]
    fn validate_tree_reaches_nested_hooks() {
        let log = call_log();
        let hook = Probe::new("hook", &log).after(Probe::new("deep", &log).invalid());
        let probe = Probe::new("main", &log).before(hook);
        assert!(probe.validate_instance().is_ok());
        let err = validate_tree(&probe).unwrap_err();
        assert_eq!(err.message, "Probe marked invalid.");
    }

    #[test]
    fn boxed_clone_copies_hooks_deeply() {
        let log = call_log();
        let action: Box<dyn Action> =
            Box::new(Probe::new("p", &log).before(Probe::new("hook", &log)));
        let mut copy = action.clone();
        copy.common_mut().set_fatal(true);
        let late: Box<dyn Action> = Box::new(Probe::new("late", &log));
        copy.common_mut().add_after_action(late);
        assert_eq!(action.common().after_actions().len(), 0);
        assert_eq!(copy.common().before_actions().len(), 1);
        assert!(!action.severity().fatal);
    }

    #[test]
    fn describe_tree_lists_hooks() {
        let log = call_log();
        let probe = Probe::new("main", &log)
            .before(Probe::new("setup", &log))
            .after(Probe::new("cleanup", &log));
        assert_eq!(
            describe_tree(&probe),
            "Probe 'main'\n  before: Probe 'setup'\n  after: Probe 'cleanup'"
        );
    }

    #[test]
    fn indent_helpers() {
        assert_eq!(indent("a\nb"), "  a\n  b");
        assert_eq!(indent_tail("a\nb"), "a\n  b");
    }
}
