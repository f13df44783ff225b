//! Build features attached to a pipeline

use crate::core::vcs::VcsRootRef;

/// Extra behaviour the CI server applies around a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    /// Collect CPU/memory/disk statistics on the agent
    Perfmon,
    /// Report build status back to a code-review service
    CommitStatusPublisher(CommitStatusPublisher),
}

impl Feature {
    pub const NAMES: &'static [&'static str] = &["perfmon", "commit-status-publisher"];

    pub fn kind(&self) -> &'static str {
        match self {
            Feature::Perfmon => "perfmon",
            Feature::CommitStatusPublisher(_) => "commit-status-publisher",
        }
    }
}

/// Publishes (commit, status, build URL) to an external service on completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatusPublisher {
    /// Root whose commits the statuses are attached to
    pub vcs_root: VcsRootRef,
    pub publisher: Publisher,
}

/// Service a commit status is published to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publisher {
    Swarm(SwarmPublisher),
}

impl Publisher {
    pub const NAMES: &'static [&'static str] = &["swarm"];

    pub fn kind(&self) -> &'static str {
        match self {
            Publisher::Swarm(_) => "swarm",
        }
    }
}

/// Helix Swarm code-review server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwarmPublisher {
    pub server_url: String,
    pub username: String,
    /// Token or a reference to a stored credential
    pub token: String,
    /// Also leave a review comment on build start and finish
    pub comment_on_events: bool,
}

impl SwarmPublisher {
    pub fn has_http_url(&self) -> bool {
        self.server_url.starts_with("http://") || self.server_url.starts_with("https://")
    }
}
