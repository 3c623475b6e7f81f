use std::path::{Path, PathBuf};

/// Resolve the directory relative plan paths are anchored to.
///
/// Priority:
/// 1. `--root` flag / `TIDY_ROOT` env var (passed in as `explicit`)
/// 2. The directory containing the plan file
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>, plan: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    if let Some(parent) = plan.parent().filter(|p| !p.as_os_str().is_empty()) {
        return parent.to_path_buf();
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()), Path::new("/plans/tidy.yaml"));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn plan_directory_is_the_default() {
        let result = resolve_root(None, Path::new("/plans/nightly/tidy.yaml"));
        assert_eq!(result, PathBuf::from("/plans/nightly"));
    }

    #[test]
    fn bare_plan_name_uses_cwd() {
        let result = resolve_root(None, Path::new("tidy.yaml"));
        assert_eq!(result, std::env::current_dir().unwrap());
    }
}
