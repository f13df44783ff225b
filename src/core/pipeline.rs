//! Pipeline domain model

use crate::core::{
    artifact::ArtifactRule,
    feature::Feature,
    step::Step,
    trigger::Trigger,
    vcs::{VcsBinding, VcsRootRef},
};

/// A pipeline definition
///
/// Built once when configuration is loaded and never mutated afterwards;
/// a reload produces fresh values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDefinition {
    /// Pipeline name, never empty
    pub name: String,

    pub description: Option<String>,

    /// VCS root the pipeline checks out
    pub vcs: Option<VcsBinding>,

    /// Steps in execution order
    pub steps: Vec<Step>,

    pub triggers: Vec<Trigger>,

    pub features: Vec<Feature>,

    /// Artifact rules in the order they are applied
    pub artifact_rules: Vec<ArtifactRule>,
}

impl PipelineDefinition {
    /// Get the first step with the given ID
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Every VCS root reference in the pipeline, keyed by the field holding it
    pub fn vcs_references(&self) -> Vec<(String, &VcsRootRef)> {
        let mut refs = Vec::new();

        if let Some(binding) = &self.vcs {
            refs.push(("vcs.root".to_string(), &binding.root));
        }

        for (index, feature) in self.features.iter().enumerate() {
            if let Feature::CommitStatusPublisher(publisher) = feature {
                refs.push((format!("features[{}].vcs_root", index), &publisher.vcs_root));
            }
        }

        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feature::{CommitStatusPublisher, Publisher, SwarmPublisher};
    use crate::core::vcs::CheckoutMode;

    #[test]
    fn test_vcs_references_include_publisher_root() {
        let pipeline = PipelineDefinition {
            name: "Run Tests".to_string(),
            description: None,
            vcs: Some(VcsBinding {
                root: VcsRootRef::Settings,
                checkout_mode: CheckoutMode::AgentSide,
            }),
            steps: vec![],
            triggers: vec![],
            features: vec![
                Feature::Perfmon,
                Feature::CommitStatusPublisher(CommitStatusPublisher {
                    vcs_root: VcsRootRef::Named("helix".to_string()),
                    publisher: Publisher::Swarm(SwarmPublisher {
                        server_url: "http://helix-swarm:8085/".to_string(),
                        username: "reviewer".to_string(),
                        token: "secret".to_string(),
                        comment_on_events: true,
                    }),
                }),
            ],
            artifact_rules: vec![],
        };

        let refs = pipeline.vcs_references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].0, "vcs.root");
        assert_eq!(refs[1].0, "features[1].vcs_root");
        assert_eq!(refs[1].1, &VcsRootRef::Named("helix".to_string()));
    }
}
