use super::{load_plan, RunExit};
use crate::output::{print_json, render_outcome};
use std::path::Path;
use tidy_core::{Action, ActionFailure, Outcome, OutcomeStatus, TidyError};

pub fn run(plan_path: &Path, explicit_root: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let loaded = load_plan(plan_path, explicit_root)?;
    let action = loaded.plan.root_action(&loaded.root);

    let outcome = match action.run() {
        Ok(outcome) => outcome,
        Err(TidyError::Action(failure)) if json => {
            #[derive(serde::Serialize)]
            struct Aborted<'a> {
                plan: &'a str,
                status: &'static str,
                failure: &'a ActionFailure,
            }
            print_json(&Aborted {
                plan: loaded.plan.display_name(),
                status: "aborted",
                failure: &failure,
            })?;
            return Err(RunExit::Aborted(failure).into());
        }
        Err(e) => return Err(RunExit::classify(e)),
    };

    let report = outcome.report();
    if json {
        print_json(&report)?;
        return Ok(());
    }

    print!("{}", render_outcome(&report));
    if has_recorded_failures(&outcome) {
        println!(
            "\nPlan '{}' finished with recorded failures.",
            loaded.plan.display_name()
        );
    } else {
        println!("\nPlan '{}' finished.", loaded.plan.display_name());
    }
    Ok(())
}

/// Absorbed failures or failed hooks anywhere in the tree.
fn has_recorded_failures(outcome: &Outcome) -> bool {
    outcome.status() != OutcomeStatus::Success
        || outcome.nested().iter().any(has_recorded_failures)
}
