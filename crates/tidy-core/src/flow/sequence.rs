use super::control_severity;
use crate::action::{
    adopt, common_accessors, describe_tree, indent, validate_tree, Action, ActionCommon,
};
use crate::error::Result;
use crate::failure::ValidationFailure;
use crate::outcome::Outcome;

/// Runs its actions in order and stops at the first error.
///
/// Members are adopted as fatal copies: a member that fails aborts the loop
/// and the remaining members never run. A negative member result is
/// recorded in its nested outcome and the loop carries on.
#[derive(Debug, Clone, Default)]
pub struct ForEach {
    common: ActionCommon,
    actions: Vec<Box<dyn Action>>,
}

impl ForEach {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, action: &dyn Action) -> Self {
        self.push(action);
        self
    }

    pub fn push(&mut self, action: &dyn Action) {
        self.actions.push(adopt(action, control_severity));
    }

    pub fn actions(&self) -> &[Box<dyn Action>] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Action for ForEach {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "foreach"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        if self.actions.is_empty() {
            return Err(ValidationFailure::new(self, "At least one action is required."));
        }
        for action in &self.actions {
            validate_tree(action.as_ref())?;
        }
        Ok(())
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        for (index, action) in self.actions.iter().enumerate() {
            tracing::trace!(index, kind = action.kind(), "foreach member");
            let done = action.run()?;
            outcome.add_nested(done);
        }
        outcome.set_result(true);
        Ok(())
    }

    fn describe(&self) -> String {
        let mut lines = vec![format!("For each of {} actions", self.actions.len())];
        for action in &self.actions {
            lines.push(indent(&format!("- {}", describe_tree(action.as_ref()))));
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
