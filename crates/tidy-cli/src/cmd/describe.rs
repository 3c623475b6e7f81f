use super::load_plan;
use crate::output::print_json;
use std::path::Path;
use tidy_core::describe_tree;

pub fn run(plan_path: &Path, explicit_root: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let loaded = load_plan(plan_path, explicit_root)?;
    let root = loaded.plan.root_action(&loaded.root);
    let description = describe_tree(&root);

    if json {
        #[derive(serde::Serialize)]
        struct DescribeOutput<'a> {
            plan: &'a str,
            root: String,
            description: &'a str,
        }
        return print_json(&DescribeOutput {
            plan: loaded.plan.display_name(),
            root: loaded.root.display().to_string(),
            description: &description,
        });
    }

    println!("Plan '{}'", loaded.plan.display_name());
    println!("{description}");
    Ok(())
}
