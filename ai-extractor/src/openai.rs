use async_openai::{types::*, Client};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::api::DataExtractor;
use crate::types::{CloudPlatform, RequirementSet};
use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Caps on how much raw text is forwarded to the model
pub const POSTING_TEXT_LIMIT: usize = 9_000;
pub const RESUME_TEXT_LIMIT: usize = 12_000;

const PROMPT_BASE: &str = r#"
Your task is to analyze the description of a job posting or a resume.
Report your findings as structured JSON, you are only allowed to respond in raw JSON.
Your JSON always respects the JSON standard and deserializes into the provided struct.
DO NOT make up data that is not explicitly present in the provided context.

Your JSON deserializes into the following struct:
"""
pub struct RequirementSet {
    technical_skills_and_tools: Vec<String>,
    cloud_platforms: Vec<String>,
    certifications: Vec<String>,
}
"""
- cloud_platforms may only contain these values: ["AWS", "Azure", "GCP"], and only when explicitly mentioned
- keep entries short (1-6 words), no duplicates
- if a category is not mentioned, keep its list empty
Data:
"""
"#;

/// The wire form of the model reply, before the cloud platform
/// vocabulary is enforced
#[derive(Deserialize, Debug, Default)]
struct RawExtraction {
    #[serde(default)]
    technical_skills_and_tools: Vec<String>,
    #[serde(default)]
    cloud_platforms: Vec<String>,
    #[serde(default)]
    certifications: Vec<String>,
}

impl From<RawExtraction> for RequirementSet {
    fn from(raw: RawExtraction) -> Self {
        let mut cloud_platforms = Vec::new();
        for value in raw.cloud_platforms {
            match CloudPlatform::parse(&value) {
                Some(platform) if !cloud_platforms.contains(&platform) => {
                    cloud_platforms.push(platform)
                }
                Some(_) => {}
                None => log::warn!("dropping unknown cloud platform '{}'", value),
            }
        }
        RequirementSet {
            technical_skills_and_tools: raw.technical_skills_and_tools,
            cloud_platforms,
            certifications: raw.certifications,
        }
    }
}

fn parse_response(content: &str) -> Result<RequirementSet> {
    let raw: RawExtraction = match serde_json::from_str(content) {
        Ok(raw) => raw,
        Err(_) => {
            // models occasionally wrap the JSON in markdown fences or prose
            lazy_static! {
                static ref JSON_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
            }
            let candidate = JSON_RE
                .find(content)
                .ok_or_else(|| Error::MalformedResponse(content.to_owned()))?;
            serde_json::from_str(candidate.as_str())
                .map_err(|_| Error::MalformedResponse(content.to_owned()))?
        }
    };
    Ok(raw.into())
}

/// Truncate to a character count without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct OpenAiExtractor {
    client: Client,
    model: String,
}

impl OpenAiExtractor {
    /// Reads `OPENAI_API_KEY` and the optional `OPENAI_MODEL` override.
    /// Fails before any request is made when the key is absent.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| Error::MissingApiKey)?;
        if api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_owned());
        Ok(Self::new(api_key, model))
    }

    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new().with_api_key(api_key),
            model,
        }
    }
}

#[async_trait]
impl DataExtractor<RequirementSet> for OpenAiExtractor {
    type E = Error;

    async fn extract(&self, text: &str) -> Result<RequirementSet> {
        let mut prompt = PROMPT_BASE.to_owned();
        prompt.push_str(text);
        prompt.push_str("\n\"\"\"");
        log::debug!("Prompt: {}", prompt);
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestMessageArgs::default()
                    .role(Role::System)
                    .content("You are a helpful assistant.")
                    .build()?,
                ChatCompletionRequestMessageArgs::default()
                    .role(Role::User)
                    .content(prompt)
                    .build()?,
            ])
            .build()?;
        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .last()
            .map(|choice| choice.message.content.clone())
            .ok_or(Error::EmptyResponse)?;
        log::debug!("OpenAI response: {}", content);
        parse_response(&content)
    }
}
