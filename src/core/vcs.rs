//! VCS roots and pipeline checkout bindings

use std::fmt;
use std::str::FromStr;

/// Token used in configuration to refer to the root holding the settings
pub const SETTINGS_ROOT_TOKEN: &str = "$settings";

/// Reference from a pipeline (or feature) to a VCS root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VcsRootRef {
    /// The root the project settings themselves are checked out from
    Settings,
    /// A root declared by id in the project context
    Named(String),
}

impl VcsRootRef {
    /// Parse a reference as written in configuration
    pub fn parse(value: &str) -> Self {
        if value == SETTINGS_ROOT_TOKEN {
            VcsRootRef::Settings
        } else {
            VcsRootRef::Named(value.to_string())
        }
    }
}

impl fmt::Display for VcsRootRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsRootRef::Settings => f.write_str(SETTINGS_ROOT_TOKEN),
            VcsRootRef::Named(id) => f.write_str(id),
        }
    }
}

/// Where sources are checked out before the steps run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutMode {
    /// The CI server checks out and ships sources to the agent
    ServerSide,
    /// The build agent checks out the sources itself
    #[default]
    AgentSide,
}

impl CheckoutMode {
    pub const NAMES: &'static [&'static str] = &["server-side", "agent-side"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::ServerSide => "server-side",
            CheckoutMode::AgentSide => "agent-side",
        }
    }
}

impl FromStr for CheckoutMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server-side" => Ok(CheckoutMode::ServerSide),
            "agent-side" => Ok(CheckoutMode::AgentSide),
            _ => Err(()),
        }
    }
}

/// Binding of a pipeline to the VCS root it builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsBinding {
    pub root: VcsRootRef,
    pub checkout_mode: CheckoutMode,
}

/// Version control system behind a root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    Git,
    Perforce,
}

impl VcsKind {
    pub const NAMES: &'static [&'static str] = &["git", "perforce"];

    pub fn as_str(&self) -> &'static str {
        match self {
            VcsKind::Git => "git",
            VcsKind::Perforce => "perforce",
        }
    }
}

impl FromStr for VcsKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git" => Ok(VcsKind::Git),
            "perforce" => Ok(VcsKind::Perforce),
            _ => Err(()),
        }
    }
}

/// A declared VCS root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsRoot {
    pub id: String,
    pub kind: VcsKind,
    /// Repository URL (git) or server port (perforce)
    pub url: String,
    /// Branch (git) or stream (perforce)
    pub branch: Option<String>,
}
