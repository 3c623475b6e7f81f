use super::{branch_body_severity, control_severity};
use crate::action::{
    adopt, common_accessors, describe_tree, indent, indent_tail, validate_tree, Action,
    ActionCommon,
};
use crate::error::Result;
use crate::failure::ValidationFailure;
use crate::outcome::Outcome;

/// A condition and the action it guards.
#[derive(Debug, Clone)]
pub struct Branch {
    pub condition: Box<dyn Action>,
    pub then: Box<dyn Action>,
}

/// if / elseif / else.
///
/// Conditions are independent tests: every condition is evaluated and every
/// one that passes fires its action. The result is the `validate_result` of
/// the last action that ran. The fallback runs only when no condition
/// passed.
#[derive(Debug, Clone, Default)]
pub struct IfElse {
    common: ActionCommon,
    branches: Vec<Branch>,
    otherwise: Option<Box<dyn Action>>,
}

impl IfElse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(mut self, condition: &dyn Action, then: &dyn Action) -> Self {
        self.add_branch(condition, then);
        self
    }

    pub fn otherwise(mut self, action: &dyn Action) -> Self {
        self.set_otherwise(action);
        self
    }

    pub fn add_branch(&mut self, condition: &dyn Action, then: &dyn Action) {
        self.branches.push(Branch {
            condition: adopt(condition, control_severity),
            then: adopt(then, branch_body_severity),
        });
    }

    pub fn set_otherwise(&mut self, action: &dyn Action) {
        self.otherwise = Some(adopt(action, branch_body_severity));
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn otherwise_action(&self) -> Option<&dyn Action> {
        self.otherwise.as_deref()
    }
}

impl Action for IfElse {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "if"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        if self.branches.is_empty() {
            return Err(ValidationFailure::new(
                self,
                "At least one condition is required.",
            ));
        }
        for branch in &self.branches {
            validate_tree(branch.condition.as_ref())?;
            validate_tree(branch.then.as_ref())?;
        }
        if let Some(otherwise) = &self.otherwise {
            validate_tree(otherwise.as_ref())?;
        }
        Ok(())
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        let mut result = None;

        for branch in &self.branches {
            let checked = branch.condition.run()?;
            let passed = branch.condition.validate_result(&checked);
            outcome.add_nested(checked);
            if passed {
                let done = branch.then.run()?;
                result = Some(branch.then.validate_result(&done));
                outcome.add_nested(done);
            }
        }

        if result.is_none() {
            if let Some(otherwise) = &self.otherwise {
                let done = otherwise.run()?;
                result = Some(otherwise.validate_result(&done));
                outcome.add_nested(done);
            }
        }

        outcome.set_result(result.unwrap_or(false));
        Ok(())
    }

    fn describe(&self) -> String {
        let mut lines = vec!["If".to_string()];
        for branch in &self.branches {
            let condition = describe_tree(branch.condition.as_ref());
            let then = describe_tree(branch.then.as_ref());
            lines.push(format!("  when: {}", indent_tail(&condition)));
            lines.push(indent(&format!("  then: {}", indent_tail(&then))));
        }
        if let Some(otherwise) = &self.otherwise {
            let otherwise = describe_tree(otherwise.as_ref());
            lines.push(format!("  otherwise: {}", indent_tail(&otherwise)));
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
