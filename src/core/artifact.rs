//! Artifact publishing rules

use std::fmt;

/// Pattern describing which build outputs to archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRule {
    /// Source path pattern, relative to the checkout directory
    pub source: String,

    /// Target archive or directory; `None` publishes at the artifact root
    pub destination: Option<String>,

    /// Whether the rule removes matches from an earlier inclusion
    pub exclude: bool,
}

impl ArtifactRule {
    /// Parse the compact rule form `[+:|-:]source [=> destination]`
    pub fn parse(rule: &str) -> Result<Self, String> {
        let rule = rule.trim();
        let (exclude, rest) = if let Some(rest) = rule.strip_prefix("-:") {
            (true, rest)
        } else if let Some(rest) = rule.strip_prefix("+:") {
            (false, rest)
        } else {
            (false, rule)
        };

        let (source, destination) = match rest.split_once("=>") {
            Some((source, destination)) => {
                let destination = destination.trim();
                if destination.is_empty() {
                    return Err(format!("rule '{}' has an empty destination after '=>'", rule));
                }
                (source.trim(), Some(destination.to_string()))
            }
            None => (rest.trim(), None),
        };

        if source.is_empty() {
            return Err(format!("rule '{}' has no source pattern", rule));
        }

        Ok(ArtifactRule {
            source: source.to_string(),
            destination,
            exclude,
        })
    }
}

impl fmt::Display for ArtifactRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exclude {
            f.write_str("-:")?;
        }
        f.write_str(&self.source)?;
        if let Some(destination) = &self.destination {
            write!(f, " => {}", destination)?;
        }
        Ok(())
    }
}
