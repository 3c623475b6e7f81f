//! Structured failures raised by actions.
//!
//! [`ValidationFailure`] reports a configuration breach and is never subject
//! to severity. [`ActionFailure`] reports an operational failure and forms a
//! tree: a composite attaches the failures of the parts that caused it as
//! children.

use crate::action::{Action, ActionId};
use crate::severity::Severity;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// FailureOrigin
// ---------------------------------------------------------------------------

/// Snapshot of the action a failure originated from.
///
/// Taken when the failure is created so later changes to the live action
/// never rewrite a recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureOrigin {
    pub id: ActionId,
    pub kind: String,
    pub description: String,
    pub severity: Severity,
}

impl FailureOrigin {
    pub fn of(action: &dyn Action) -> Self {
        Self {
            id: action.common().id(),
            kind: action.kind().to_string(),
            description: action.describe(),
            severity: action.severity(),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionFailure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, Serialize)]
#[error("{}: {}", .origin.kind, .message)]
pub struct ActionFailure {
    origin: FailureOrigin,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ActionFailure>,
}

impl ActionFailure {
    pub fn new(action: &dyn Action, message: impl Into<String>) -> Self {
        Self {
            origin: FailureOrigin::of(action),
            message: message.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: ActionFailure) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: ActionFailure) {
        self.children.push(child);
    }

    pub fn origin(&self) -> &FailureOrigin {
        &self.origin
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn children(&self) -> &[ActionFailure] {
        &self.children
    }

    /// Whether `action` (or a plain clone of it) created this failure.
    pub fn raised_by(&self, action: &dyn Action) -> bool {
        self.origin.id == action.common().id()
    }

    /// True when this failure or any descendant originates from a fatal or
    /// success-required action.
    pub fn is_critical(&self) -> bool {
        self.origin.severity.is_critical()
            || self.children.iter().any(ActionFailure::is_critical)
    }

    /// Multi-line rendering of the failure tree, two spaces per level.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.to_string());
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationFailure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid {kind} action: {message}")]
pub struct ValidationFailure {
    pub kind: String,
    pub description: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(action: &dyn Action, message: impl Into<String>) -> Self {
        Self {
            kind: action.kind().to_string(),
            description: action.describe(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
