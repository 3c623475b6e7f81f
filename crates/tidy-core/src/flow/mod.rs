//! Control-flow composites built on the runtime.
//!
//! Each composite adopts copies of its children with forced severities, so
//! an error inside any part aborts the composite while a negative result
//! stays ordinary control flow.

pub mod branch;
pub mod sequence;
pub mod switch;

pub use branch::IfElse;
pub use sequence::ForEach;
pub use switch::{Switch, SwitchExpression};

use crate::severity::Severity;

/// Conditions, cases, switch expressions and loop members: abort on error,
/// accept a negative result.
pub(crate) fn control_severity(_: Severity) -> Severity {
    Severity::FATAL
}

/// Branch bodies: abort on error, keep their own `success_required`.
pub(crate) fn branch_body_severity(severity: Severity) -> Severity {
    Severity::new(true, severity.success_required)
}
