//! Plan files: YAML documents describing an action graph.
//!
//! ```yaml
//! version: 1
//! name: rotate-logs
//! actions:
//!   - type: make_directory
//!     path: archive
//!   - type: if
//!     branches:
//!       - when: { type: file_exists, path: app.log }
//!         then: { type: move_file, source: app.log, target: archive/app.log }
//! ```
//!
//! Every action accepts the common keys `fatal`, `success_required`,
//! `before` and `after`. Relative paths resolve against the plan root.

use crate::action::Action;
use crate::actions::{
    CompareValues, Comparison, ContentFormat, CopyFile, EditOp, EditStructuredFile, FileContains,
    FileExists, MakeDirectory, MoveFile, PathKind, ReadValue, RemoveFile, ValueEdit, WriteFile,
};
use crate::error::{Result, TidyError};
use crate::flow::{ForEach, IfElse, Switch};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const PLAN_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub actions: Vec<ActionSpec>,
}

fn default_version() -> u32 {
    PLAN_VERSION
}

fn default_true() -> bool {
    true
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TidyError::PlanNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self> {
        let plan: Plan = serde_yaml::from_str(data)?;
        if plan.version != PLAN_VERSION {
            return Err(TidyError::UnsupportedPlanVersion(plan.version));
        }
        Ok(plan)
    }

    /// The plan's actions as one sequence, paths resolved against `root`.
    pub fn root_action(&self, root: &Path) -> ForEach {
        let mut each = ForEach::new();
        for spec in &self.actions {
            each.push(spec.build(root).as_ref());
        }
        each
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("plan")
    }
}

// ---------------------------------------------------------------------------
// ActionSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    #[serde(default)]
    pub fatal: bool,
    #[serde(default)]
    pub success_required: bool,
    #[serde(default)]
    pub before: Vec<ActionSpec>,
    #[serde(default)]
    pub after: Vec<ActionSpec>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    MakeDirectory {
        path: PathBuf,
        #[serde(default = "default_true")]
        recursive: bool,
    },
    RemoveFile {
        path: PathBuf,
    },
    CopyFile {
        source: PathBuf,
        target: PathBuf,
        #[serde(default)]
        overwrite: bool,
    },
    MoveFile {
        source: PathBuf,
        target: PathBuf,
        #[serde(default)]
        overwrite: bool,
    },
    WriteFile {
        path: PathBuf,
        #[serde(default)]
        content: String,
        #[serde(default)]
        overwrite: bool,
    },
    FileExists {
        path: PathBuf,
        #[serde(default)]
        kind: Option<PathKind>,
    },
    FileContains {
        path: PathBuf,
        pattern: String,
    },
    CompareValues {
        left: Value,
        right: Value,
        #[serde(default)]
        comparison: Comparison,
    },
    ReadValue {
        path: PathBuf,
        #[serde(default)]
        pointer: String,
        #[serde(default)]
        format: Option<ContentFormat>,
    },
    EditStructuredFile {
        path: PathBuf,
        #[serde(default)]
        format: Option<ContentFormat>,
        #[serde(default)]
        create: bool,
        edits: Vec<EditSpec>,
    },
    If {
        branches: Vec<BranchSpec>,
        #[serde(default)]
        otherwise: Option<Box<ActionSpec>>,
    },
    Switch {
        expression: ExpressionSpec,
        #[serde(default)]
        cases: Vec<CaseSpec>,
        #[serde(default)]
        default: Option<Box<ActionSpec>>,
    },
    Foreach {
        actions: Vec<ActionSpec>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchSpec {
    pub when: ActionSpec,
    pub then: ActionSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaseSpec {
    pub value: Value,
    pub action: ActionSpec,
}

/// `{ action: {...} }` switches on an action's result, anything else is a
/// literal value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpressionSpec {
    Action { action: Box<ActionSpec> },
    Value(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditSpec {
    #[serde(default)]
    pub pointer: String,
    #[serde(default)]
    pub fatal: bool,
    #[serde(default)]
    pub success_required: bool,
    #[serde(flatten)]
    pub op: EditOp,
}

impl EditSpec {
    fn build(&self) -> ValueEdit {
        ValueEdit::new(self.pointer.clone(), self.op.clone())
            .fatal(self.fatal)
            .success_required(self.success_required)
    }
}

/// Join relative paths onto `root`. Empty paths stay empty so validation
/// rejects them.
fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

impl ActionSpec {
    /// Compile into a live action. Structural problems surface later, from
    /// `validate_instance`.
    pub fn build(&self, root: &Path) -> Box<dyn Action> {
        let mut action = self.kind.build(root);
        let common = action.common_mut();
        common.set_fatal(self.fatal);
        common.set_success_required(self.success_required);
        for hook in &self.before {
            common.add_before_action(hook.build(root));
        }
        for hook in &self.after {
            common.add_after_action(hook.build(root));
        }
        action
    }
}

impl ActionKind {
    fn build(&self, root: &Path) -> Box<dyn Action> {
        match self {
            ActionKind::MakeDirectory { path, recursive } => {
                Box::new(MakeDirectory::new(resolve(root, path)).recursive(*recursive))
            }
            ActionKind::RemoveFile { path } => Box::new(RemoveFile::new(resolve(root, path))),
            ActionKind::CopyFile {
                source,
                target,
                overwrite,
            } => Box::new(
                CopyFile::new(resolve(root, source), resolve(root, target)).overwrite(*overwrite),
            ),
            ActionKind::MoveFile {
                source,
                target,
                overwrite,
            } => Box::new(
                MoveFile::new(resolve(root, source), resolve(root, target)).overwrite(*overwrite),
            ),
            ActionKind::WriteFile {
                path,
                content,
                overwrite,
            } => Box::new(
                WriteFile::new(resolve(root, path), content.clone()).overwrite(*overwrite),
            ),
            ActionKind::FileExists { path, kind } => {
                let action = FileExists::new(resolve(root, path));
                match kind {
                    Some(kind) => Box::new(action.of_kind(*kind)),
                    None => Box::new(action),
                }
            }
            ActionKind::FileContains { path, pattern } => {
                Box::new(FileContains::new(resolve(root, path), pattern.clone()))
            }
            ActionKind::CompareValues {
                left,
                right,
                comparison,
            } => Box::new(CompareValues::new(left.clone(), right.clone()).comparison(*comparison)),
            ActionKind::ReadValue {
                path,
                pointer,
                format,
            } => {
                let action = ReadValue::new(resolve(root, path)).pointer(pointer.clone());
                match format {
                    Some(format) => Box::new(action.format(*format)),
                    None => Box::new(action),
                }
            }
            ActionKind::EditStructuredFile {
                path,
                format,
                create,
                edits,
            } => {
                let mut action = EditStructuredFile::new(resolve(root, path)).create(*create);
                if let Some(format) = format {
                    action = action.format(*format);
                }
                for edit in edits {
                    action.push_edit(edit.build());
                }
                Box::new(action)
            }
            ActionKind::If {
                branches,
                otherwise,
            } => {
                let mut action = IfElse::new();
                for branch in branches {
                    let when = branch.when.build(root);
                    let then = branch.then.build(root);
                    action.add_branch(when.as_ref(), then.as_ref());
                }
                if let Some(otherwise) = otherwise {
                    action.set_otherwise(otherwise.build(root).as_ref());
                }
                Box::new(action)
            }
            ActionKind::Switch {
                expression,
                cases,
                default,
            } => {
                let mut action = match expression {
                    ExpressionSpec::Action { action } => {
                        Switch::on_action(action.build(root).as_ref())
                    }
                    ExpressionSpec::Value(value) => Switch::on_value(value.clone()),
                };
                for case in cases {
                    action.add_case(case.value.clone(), case.action.build(root).as_ref());
                }
                if let Some(default) = default {
                    action.set_default(default.build(root).as_ref());
                }
                Box::new(action)
            }
            ActionKind::Foreach { actions } => {
                let mut each = ForEach::new();
                for spec in actions {
                    each.push(spec.build(root).as_ref());
                }
                Box::new(each)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
