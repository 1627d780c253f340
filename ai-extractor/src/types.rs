use serde::{Deserialize, Serialize};
use std::fmt;

/// The only cloud platforms the extraction schema accepts
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudPlatform {
    #[serde(rename = "AWS")]
    Aws,
    #[serde(rename = "Azure")]
    Azure,
    #[serde(rename = "GCP")]
    Gcp,
}

impl CloudPlatform {
    /// Lenient parse of whatever spelling the model emitted.
    /// Anything outside the three-vendor vocabulary is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        if normalized.contains("aws") || normalized.contains("amazon") {
            return Some(CloudPlatform::Aws);
        }
        if normalized.contains("azure") || normalized.contains("microsoft") {
            return Some(CloudPlatform::Azure);
        }
        if normalized.contains("gcp") || normalized.contains("google") {
            return Some(CloudPlatform::Gcp);
        }
        None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudPlatform::Aws => "AWS",
            CloudPlatform::Azure => "Azure",
            CloudPlatform::Gcp => "GCP",
        }
    }
}

impl fmt::Display for CloudPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The requirements of a job post or the skill set of a resume,
/// extracted through the OpenAI api from the raw description text
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RequirementSet {
    pub technical_skills_and_tools: Vec<String>,
    pub cloud_platforms: Vec<CloudPlatform>,
    pub certifications: Vec<String>,
}
