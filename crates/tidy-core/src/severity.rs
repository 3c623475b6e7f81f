//! Failure severity: the `(fatal, success_required)` pair.
//!
//! The two flags stay independent because composites force one without the
//! other (branch conditions are `fatal` but never `success_required`). The
//! four combinations are named by the associated constants and by
//! [`SeverityLevel`]; there is no fifth state.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Severity {
    /// A failure raised while applying the action propagates out of `run()`.
    pub fatal: bool,
    /// A negative result is promoted to a raised failure.
    pub success_required: bool,
}

impl Severity {
    pub const NON_CRITICAL: Severity = Severity::new(false, false);
    pub const SUCCESS_REQUIRED: Severity = Severity::new(false, true);
    pub const FATAL: Severity = Severity::new(true, false);
    pub const CRITICAL: Severity = Severity::new(true, true);

    pub const fn new(fatal: bool, success_required: bool) -> Self {
        Self {
            fatal,
            success_required,
        }
    }

    pub fn level(self) -> SeverityLevel {
        match (self.fatal, self.success_required) {
            (false, false) => SeverityLevel::NonCritical,
            (false, true) => SeverityLevel::SuccessRequired,
            (true, false) => SeverityLevel::Fatal,
            (true, true) => SeverityLevel::Critical,
        }
    }

    /// True for every level except `NON_CRITICAL`. A failing action with a
    /// critical severity makes the whole failure tree critical.
    pub fn is_critical(self) -> bool {
        self.fatal || self.success_required
    }
}

impl From<SeverityLevel> for Severity {
    fn from(level: SeverityLevel) -> Self {
        match level {
            SeverityLevel::NonCritical => Severity::NON_CRITICAL,
            SeverityLevel::SuccessRequired => Severity::SUCCESS_REQUIRED,
            SeverityLevel::Fatal => Severity::FATAL,
            SeverityLevel::Critical => Severity::CRITICAL,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.level().fmt(f)
    }
}

// ---------------------------------------------------------------------------
// SeverityLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    NonCritical,
    SuccessRequired,
    Fatal,
    Critical,
}

impl SeverityLevel {
    pub fn all() -> &'static [SeverityLevel] {
        &[
            SeverityLevel::NonCritical,
            SeverityLevel::SuccessRequired,
            SeverityLevel::Fatal,
            SeverityLevel::Critical,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityLevel::NonCritical => "non_critical",
            SeverityLevel::SuccessRequired => "success_required",
            SeverityLevel::Fatal => "fatal",
            SeverityLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_levels_cover_every_flag_combination() {
        let mut seen = Vec::new();
        for fatal in [false, true] {
            for success_required in [false, true] {
                let level = Severity::new(fatal, success_required).level();
                assert!(!seen.contains(&level), "{level} mapped twice");
                seen.push(level);
            }
        }
        assert_eq!(seen.len(), SeverityLevel::all().len());
    }

    #[test]
    fn level_roundtrips_through_flags() {
        for &level in SeverityLevel::all() {
            assert_eq!(Severity::from(level).level(), level);
        }
    }

    #[test]
    fn only_non_critical_is_not_critical() {
        assert!(!Severity::NON_CRITICAL.is_critical());
        assert!(Severity::SUCCESS_REQUIRED.is_critical());
        assert!(Severity::FATAL.is_critical());
        assert!(Severity::CRITICAL.is_critical());
    }

    #[test]
    fn default_is_non_critical() {
        assert_eq!(Severity::default(), Severity::NON_CRITICAL);
        assert_eq!(Severity::default().to_string(), "non_critical");
    }
}
