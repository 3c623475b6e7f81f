pub mod action;
pub mod actions;
pub mod error;
pub mod failure;
pub mod flow;
pub mod io;
pub mod outcome;
pub mod pipeline;
pub mod plan;
pub mod runtime;
pub mod severity;

#[cfg(test)]
mod testing;

pub use action::{adopt, describe_tree, validate_tree, Action, ActionCommon, ActionId};
pub use error::{Result, TidyError};
pub use failure::{ActionFailure, ValidationFailure};
pub use outcome::{is_truthy, Outcome, OutcomeReport, OutcomeStatus};
pub use plan::Plan;
pub use severity::{Severity, SeverityLevel};
