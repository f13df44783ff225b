//! Project: the explicit configuration context plus its pipelines

use crate::core::{
    pipeline::PipelineDefinition,
    vcs::{VcsRoot, VcsRootRef},
};

/// Context every pipeline in a project is resolved against
///
/// Carries what a settings script would otherwise read from ambient global
/// state, such as which root holds the settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectContext {
    /// Settings DSL version the project targets (e.g. "2024.03")
    pub version: Option<String>,

    /// Id of the declared root the settings are stored in
    pub settings_root: Option<String>,

    pub vcs_roots: Vec<VcsRoot>,
}

impl ProjectContext {
    /// Find a declared root by id
    pub fn vcs_root(&self, id: &str) -> Option<&VcsRoot> {
        self.vcs_roots.iter().find(|r| r.id == id)
    }

    /// Resolve a reference to a declared root
    pub fn resolve(&self, reference: &VcsRootRef) -> Option<&VcsRoot> {
        match reference {
            VcsRootRef::Settings => self.settings_root.as_deref().and_then(|id| self.vcs_root(id)),
            VcsRootRef::Named(id) => self.vcs_root(id),
        }
    }

    /// Whether a root is the settings root
    pub fn is_settings_root(&self, id: &str) -> bool {
        self.settings_root.as_deref() == Some(id)
    }
}

/// A set of pipelines sharing one context
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Project {
    pub context: ProjectContext,
    pub pipelines: Vec<PipelineDefinition>,
}

impl Project {
    /// Get a pipeline by name
    pub fn pipeline(&self, name: &str) -> Option<&PipelineDefinition> {
        self.pipelines.iter().find(|p| p.name == name)
    }
}
