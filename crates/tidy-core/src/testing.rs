//! Scriptable action for exercising the runtime in tests.

use crate::action::{common_accessors, Action, ActionCommon};
use crate::error::Result;
use crate::failure::{ActionFailure, ValidationFailure};
use crate::outcome::Outcome;
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[derive(Debug, Clone)]
enum Behaviour {
    Return(Value),
    Fail(String),
    IoError(String),
    Run(Box<dyn Action>),
    CountPreRunFailures,
}

/// Appends its name to a shared log when applied, then does whatever it
/// was scripted to do.
#[derive(Debug, Clone)]
pub struct Probe {
    common: ActionCommon,
    name: String,
    log: CallLog,
    behaviour: Behaviour,
    valid: bool,
}

impl Probe {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            common: ActionCommon::new(),
            name: name.to_string(),
            log: Arc::clone(log),
            behaviour: Behaviour::Return(Value::Bool(true)),
            valid: true,
        }
    }

    pub fn returning(mut self, value: Value) -> Self {
        self.behaviour = Behaviour::Return(value);
        self
    }

    /// Sets the result to `false` and raises a failure of its own.
    pub fn failing(mut self, message: &str) -> Self {
        self.behaviour = Behaviour::Fail(message.to_string());
        self
    }

    pub fn io_error(mut self, message: &str) -> Self {
        self.behaviour = Behaviour::IoError(message.to_string());
        self
    }

    /// Runs `child` during apply and adopts its result.
    pub fn running(mut self, child: &dyn Action) -> Self {
        self.behaviour = Behaviour::Run(child.clone_box());
        self
    }

    /// Sets the result to the number of failed before-hooks seen by apply.
    pub fn inspecting_pre_run_failures(mut self) -> Self {
        self.behaviour = Behaviour::CountPreRunFailures;
        self
    }

    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }
}

impl Action for Probe {
    common_accessors!();

    fn kind(&self) -> &'static str {
        "probe"
    }

    fn validate_instance(&self) -> std::result::Result<(), ValidationFailure> {
        if !self.valid {
            return Err(ValidationFailure::new(self, "Probe marked invalid."));
        }
        Ok(())
    }

    fn apply(&self, outcome: &mut Outcome) -> Result<()> {
        self.log.lock().unwrap().push(self.name.clone());
        match &self.behaviour {
            Behaviour::Return(value) => outcome.set_result(value.clone()),
            Behaviour::Fail(message) => {
                outcome.set_result(false);
                return Err(ActionFailure::new(self, message.clone()).into());
            }
            Behaviour::IoError(message) => {
                return Err(std::io::Error::other(message.clone()).into());
            }
            Behaviour::Run(child) => {
                let done = child.run()?;
                outcome.set_result(done.result().cloned().unwrap_or(Value::Null));
                outcome.add_nested(done);
            }
            Behaviour::CountPreRunFailures => {
                let seen = outcome.pre_run_failures().len();
                outcome.set_result(seen);
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Probe '{}'", self.name)
    }
}
