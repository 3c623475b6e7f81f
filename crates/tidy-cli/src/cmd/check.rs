use super::{load_plan, RunExit};
use crate::output::{headline, print_json, print_table};
use serde::Serialize;
use std::path::Path;
use tidy_core::{validate_tree, Action, SeverityLevel};

#[derive(Serialize)]
struct CheckedAction {
    kind: &'static str,
    severity: SeverityLevel,
    description: String,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    plan: &'a str,
    valid: bool,
    actions: Vec<CheckedAction>,
}

/// Load and validate a plan without running anything.
pub fn run(plan_path: &Path, explicit_root: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let loaded = load_plan(plan_path, explicit_root)?;
    let root = loaded.plan.root_action(&loaded.root);
    validate_tree(&root).map_err(RunExit::Invalid)?;

    let actions: Vec<CheckedAction> = root
        .actions()
        .iter()
        .map(|action| CheckedAction {
            kind: action.kind(),
            severity: action.severity().level(),
            description: action.describe(),
        })
        .collect();

    if json {
        return print_json(&CheckOutput {
            plan: loaded.plan.display_name(),
            valid: true,
            actions,
        });
    }

    let rows = actions
        .iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                a.kind.to_string(),
                a.severity.to_string(),
                headline(&a.description).to_string(),
            ]
        })
        .collect();
    print_table(&["#", "TYPE", "SEVERITY", "DESCRIPTION"], rows);
    println!(
        "\nPlan '{}' is valid ({} actions).",
        loaded.plan.display_name(),
        actions.len()
    );
    Ok(())
}
