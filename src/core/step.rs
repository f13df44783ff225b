//! Step domain model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The kind of executable unit a step is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Inline shell script
    Shell,
    /// Build-tool runner provided by the CI server (e.g. a Unity runner)
    CustomTool,
}

impl StepKind {
    pub const NAMES: &'static [&'static str] = &["shell", "custom-tool"];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Shell => "shell",
            StepKind::CustomTool => "custom-tool",
        }
    }

    /// Parameters a step of this kind cannot run without
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            StepKind::Shell => &["script"],
            StepKind::CustomTool => &[],
        }
    }
}

impl FromStr for StepKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shell" => Ok(StepKind::Shell),
            "custom-tool" => Ok(StepKind::CustomTool),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step in a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Step identifier, unique within its pipeline
    pub id: String,

    /// Human-readable step name
    pub name: Option<String>,

    pub kind: StepKind,

    /// Runner name for custom-tool steps, when it differs from the id
    pub tool: Option<String>,

    /// Parameters passed to the runner
    pub params: BTreeMap<String, String>,
}

impl Step {
    /// Runner type the CI server dispatches this step to
    pub fn runner(&self) -> &str {
        match self.kind {
            StepKind::Shell => "simpleRunner",
            StepKind::CustomTool => self.tool.as_deref().unwrap_or(&self.id),
        }
    }

    /// Get a parameter value
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Required parameters that are absent or blank
    pub fn missing_params(&self) -> Vec<&'static str> {
        self.kind
            .required_params()
            .iter()
            .copied()
            .filter(|name| self.param(name).map_or(true, |value| value.trim().is_empty()))
            .collect()
    }
}
