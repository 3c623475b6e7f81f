//! Threads in-memory content through a chain of edit actions.
//!
//! Each edit is fed the current content, run, and if its result is
//! positive the content it produced becomes the input of the next edit.
//! Failed edits are skipped over and collected; once the pass is over they
//! are folded into one failure of the owning action and disposed of by the
//! owner's severity.

use crate::action::Action;
use crate::error::Result;
use crate::failure::ActionFailure;
use crate::outcome::Outcome;
use crate::runtime::{self, POSITIVE_RESULT_EXPECTED};
use serde_json::Value;

pub const CONTENT_EDITS_FAILED: &str = "Content edits failed.";

/// An action that operates on content handed to it by its owner.
pub trait ContentEdit: Action + Clone + 'static {
    /// Replace the content the next run will operate on.
    fn feed(&mut self, content: Value);

    /// The content produced by a successful run.
    fn edited(&self, outcome: &Outcome) -> Option<Value> {
        outcome.result().cloned()
    }
}

/// What a pipeline pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Threaded {
    pub content: Value,
    /// Number of edits whose result was negative.
    pub failed: usize,
}

impl Threaded {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Run `edits` in order over `content` on behalf of `owner`.
///
/// Every edit outcome is attached to `outcome` as a nested outcome. An edit
/// that raises ends the pass and the error propagates to the owner's
/// runtime, which applies the nested-failure rule.
pub fn thread_content<E: ContentEdit>(
    owner: &dyn Action,
    outcome: &mut Outcome,
    edits: &[E],
    content: Value,
) -> Result<Threaded> {
    let mut content = content;
    let mut failed: Vec<ActionFailure> = Vec::new();
    let mut failed_count = 0;

    for edit in edits {
        let mut edit = edit.clone();
        edit.feed(content.clone());
        let done = edit.run()?;

        if edit.validate_result(&done) {
            if let Some(next) = edit.edited(&done) {
                content = next;
            }
        } else {
            failed_count += 1;
            if done.failures().is_empty() {
                failed.push(ActionFailure::new(&edit, POSITIVE_RESULT_EXPECTED));
            } else {
                failed.extend(done.failures().iter().cloned());
            }
            tracing::debug!(kind = edit.kind(), "content edit did not apply");
        }
        outcome.add_nested(done);
    }

    if !failed.is_empty() {
        let mut failure = ActionFailure::new(owner, CONTENT_EDITS_FAILED);
        for child in failed {
            failure.push_child(child);
        }
        runtime::dispose(owner, outcome, failure)?;
    }

    Ok(Threaded {
        content,
        failed: failed_count,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{common_accessors, ActionCommon};
    use crate::error::TidyError;
    use crate::failure::ValidationFailure;
    use crate::testing::{call_log, Probe};
    use serde_json::json;

    /// Appends a suffix to string content; anything else is an error.
    #[derive(Debug, Clone)]
    struct Suffix {
        common: ActionCommon,
        suffix: String,
        content: Value,
        negative: bool,
    }

    impl Suffix {
        fn new(suffix: &str) -> Self {
            Self {
                common: ActionCommon::new(),
                suffix: suffix.to_string(),
                content: Value::Null,
                negative: false,
            }
        }

        fn negative(mut self) -> Self {
            self.negative = true;
            self
        }
    }

    impl Action for Suffix {
        common_accessors!();

        fn kind(&self) -> &'static str {
            "suffix"
        }

        fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
            Ok(())
        }

        fn apply(&self, outcome: &mut Outcome) -> Result<()> {
            if self.negative {
                outcome.set_result("");
                return Ok(());
            }
            match &self.content {
                Value::String(s) => {
                    outcome.set_result(format!("{s}{}", self.suffix));
                    Ok(())
                }
                _ => Err(ActionFailure::new(self, "Content is not text.").into()),
            }
        }

        fn describe(&self) -> String {
            format!("Append '{}'", self.suffix)
        }
    }

    impl ContentEdit for Suffix {
        fn feed(&mut self, content: Value) {
            self.content = content;
        }
    }

    #[test]
    fn threads_content_through_every_edit() {
        let log = call_log();
        let owner = Probe::new("owner", &log);
        let mut outcome = Outcome::new(&owner);
        let edits = [Suffix::new("b"), Suffix::new("c")];
        let threaded = thread_content(&owner, &mut outcome, &edits, json!("a")).unwrap();
        assert_eq!(threaded.content, json!("abc"));
        assert!(threaded.all_succeeded());
        assert_eq!(outcome.nested().len(), 2);
        assert!(outcome.failures().is_empty());
    }

    #[test]
    fn failed_edit_is_skipped_and_recorded() {
        let log = call_log();
        let owner = Probe::new("owner", &log);
        let mut outcome = Outcome::new(&owner);
        let edits = [Suffix::new("b"), Suffix::new("x").negative(), Suffix::new("c")];
        let threaded = thread_content(&owner, &mut outcome, &edits, json!("a")).unwrap();
        assert_eq!(threaded.content, json!("abc"));
        assert_eq!(threaded.failed, 1);

        let failure = &outcome.failures()[0];
        assert_eq!(failure.message(), CONTENT_EDITS_FAILED);
        assert_eq!(failure.children().len(), 1);
        assert_eq!(failure.children()[0].message(), POSITIVE_RESULT_EXPECTED);
    }

    #[test]
    fn absorbed_edit_failures_become_children() {
        let log = call_log();
        let owner = Probe::new("owner", &log);
        let mut outcome = Outcome::new(&owner);
        let edits = [Suffix::new("b"), Suffix::new("c")];
        let threaded = thread_content(&owner, &mut outcome, &edits, json!(1)).unwrap();
        assert_eq!(threaded.failed, 2);
        assert_eq!(threaded.content, json!(1));
        let children = outcome.failures()[0].children();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.message() == "Content is not text."));
    }

    #[test]
    fn fatal_owner_raises_collected_failures() {
        let log = call_log();
        let owner = Probe::new("owner", &log).fatal(true);
        let mut outcome = Outcome::new(&owner);
        let edits = [Suffix::new("x").negative()];
        let err = thread_content(&owner, &mut outcome, &edits, json!("a")).unwrap_err();
        match err {
            TidyError::Action(failure) => {
                assert_eq!(failure.message(), CONTENT_EDITS_FAILED);
                assert!(failure.raised_by(&owner));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn raising_edit_ends_the_pass() {
        let log = call_log();
        let owner = Probe::new("owner", &log);
        let mut outcome = Outcome::new(&owner);
        let edits = [Suffix::new("b").fatal(true), Suffix::new("c")];
        let err = thread_content(&owner, &mut outcome, &edits, json!(null)).unwrap_err();
        assert!(matches!(err, TidyError::Action(_)));
        assert!(outcome.nested().is_empty());
    }
}
