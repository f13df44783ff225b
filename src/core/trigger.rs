//! Pipeline triggers

/// Condition that schedules a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Run on every change detected in the bound VCS root
    VcsChange {
        /// Branch filter rules (`+:main`, `-:release/*`); empty means all branches
        branch_filter: Vec<String>,
    },
    /// Run on a cron schedule
    Schedule { cron: String },
    /// Run only when requested by a user
    Manual,
}

impl Trigger {
    pub const NAMES: &'static [&'static str] = &["vcs", "schedule", "manual"];

    pub fn kind(&self) -> &'static str {
        match self {
            Trigger::VcsChange { .. } => "vcs",
            Trigger::Schedule { .. } => "schedule",
            Trigger::Manual => "manual",
        }
    }
}

/// Split a cron expression into its fields if it has a plausible shape
///
/// Accepts five fields (minute-first), six (with seconds) or seven (with year).
pub fn cron_fields(expr: &str) -> Option<Vec<&str>> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    (5..=7).contains(&fields.len()).then_some(fields)
}
