use super::control_severity;
use crate::action::{
    adopt, common_accessors, describe_tree, indent, indent_tail, validate_tree, Action,
    ActionCommon,
};
use crate::error::Result;
use crate::failure::ValidationFailure;
use crate::outcome::Outcome;
use serde_json::Value;

/// The value a switch compares its cases against.
#[derive(Debug, Clone)]
pub enum SwitchExpression {
    Value(Value),
    /// Run the action and switch on its result.
    Action(Box<dyn Action>),
}

impl SwitchExpression {
    fn describe(&self) -> String {
        match self {
            SwitchExpression::Value(value) => value.to_string(),
            SwitchExpression::Action(action) => describe_tree(action.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Case {
    pub value: Value,
    pub action: Box<dyn Action>,
}

/// switch / case / default.
///
/// Cases match on strict equality (same JSON type and value) and there is
/// no fallthrough suppression: every matching case runs, in registration
/// order, and the last one to run supplies the result.
#[derive(Debug, Clone)]
pub struct Switch {
    common: ActionCommon,
    expression: SwitchExpression,
    cases: Vec<Case>,
    default: Option<Box<dyn Action>>,
}

impl Switch {
    pub fn on_value(value: impl Into<Value>) -> Self {
        Self::with_expression(SwitchExpression::Value(value.into()))
    }

    pub fn on_action(action: &dyn Action) -> Self {
        Self::with_expression(SwitchExpression::Action(adopt(action, control_severity)))
    }

    fn with_expression(expression: SwitchExpression) -> Self {
        Self {
            common: ActionCommon::new(),
            expression,
            cases: Vec::new(),
            default: None,
        }
    }

    pub fn case(mut self, value: impl Into<Value>, action: &dyn Action) -> Self {
        self.add_case(value, action);
        self
    }

    pub fn default_action(mut self, action: &dyn Action) -> Self {
        self.set_default(action);
        self
    }

    pub fn add_case(&mut self, value: impl Into<Value>, action: &dyn Action) {
        self.cases.push(Case {
            value: value.into(),
            action: adopt(action, control_severity),
        });
    }

    pub fn set_default(&mut self, action: &dyn Action) {
        self.default = Some(adopt(action, control_severity));
    }

    pub fn expression(&self) -> &SwitchExpression {
        &self.expression
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    fn resolve(&self, outcome: &mut Outcome) -> Result<Value> {
        match &self.expression {
            SwitchExpression::Value(value) => Ok(value.clone()),
            SwitchExpression::Action(action) => {
                let done = action.run()?;
                let value = done.result().cloned().unwrap_or(Value::Null);
                outcome.add_nested(done);
                Ok(value)
            }
        }
    }
}

fn is_empty_expression(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl Action for Switch {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "switch"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        if self.cases.is_empty() && self.default.is_none() {
            return Err(ValidationFailure::new(
                self,
                "At least one case or a default action is required.",
            ));
        }
        match &self.expression {
            SwitchExpression::Value(value) if is_empty_expression(value) => {
                return Err(ValidationFailure::new(self, "Switch expression must not be empty."));
            }
            SwitchExpression::Value(Value::Object(_)) => {
                return Err(ValidationFailure::new(
                    self,
                    "Switch expression must be a plain value or an action.",
                ));
            }
            SwitchExpression::Value(_) => {}
            SwitchExpression::Action(action) => validate_tree(action.as_ref())?,
        }
        for case in &self.cases {
            if case.value.is_object() {
                return Err(ValidationFailure::new(
                    self,
                    format!("Case value must not be an object, got {}.", case.value),
                ));
            }
            validate_tree(case.action.as_ref())?;
        }
        if let Some(default) = &self.default {
            validate_tree(default.as_ref())?;
        }
        Ok(())
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        let subject = self.resolve(outcome)?;
        let mut matched = false;

        for case in self.cases.iter().filter(|case| case.value == subject) {
            matched = true;
            let done = case.action.run()?;
            if let Some(value) = done.result() {
                outcome.set_result(value.clone());
            }
            outcome.add_nested(done);
        }

        if !matched {
            if let Some(default) = &self.default {
                let done = default.run()?;
                if let Some(value) = done.result() {
                    outcome.set_result(value.clone());
                }
                outcome.add_nested(done);
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        let mut lines = vec![format!("Switch on {}", indent_tail(&self.expression.describe()))];
        for case in &self.cases {
            lines.push(format!("  case {}:", case.value));
            lines.push(indent(&indent(&describe_tree(case.action.as_ref()))));
        }
        if let Some(default) = &self.default {
            lines.push("  default:".to_string());
            lines.push(indent(&indent(&describe_tree(default.as_ref()))));
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
