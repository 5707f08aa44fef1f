//! Anthropic-backed semantic provider.
//!
//! Sends the subject profile (plus the optional rule-engine context line) to
//! the Messages API and expects a single JSON object back. Parsing is
//! deliberately strict here; coercion of out-of-range values is the
//! adapter's job, not the provider's.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vetter_core::Subject;

use super::{
    secrets::{ApiCredential, CredentialSource},
    ProviderError, SemanticPayload, SemanticProvider,
};

/// Environment variable holding the API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const SYSTEM_PROMPT: &str = r#"You assess whether a submitted business profile is legitimate or fraudulent.

You are given the declared attributes of one profile. Respond with a single
JSON object and nothing else:

{
  "score": 0-100,            // 100 = clearly legitimate, 0 = clearly fraudulent
  "confidence": 0-100,       // how well the attributes support your score
  "reasoning": "one short paragraph",
  "recommendation": "approve" | "flag" | "review"
}

Ground every judgment in the attributes you were given. If the attributes are
too sparse to judge, say so in the reasoning and lower the confidence rather
than guessing."#;

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 500,
            temperature: 0.0,
            base_url: "https://api.anthropic.com/v1".to_string(),
        }
    }
}

/// Semantic provider backed by the Anthropic Messages API.
pub struct AnthropicProvider {
    credential: ApiCredential,
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("credential", &self.credential)
            .field("model", &self.config.model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, config: AnthropicConfig) -> Self {
        Self {
            credential: ApiCredential::new(
                api_key,
                CredentialSource::Programmatic,
                "Anthropic API key",
            ),
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env(config: AnthropicConfig) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(ANTHROPIC_API_KEY_ENV, "Anthropic API key")?;
        Ok(Self {
            credential,
            config,
            client: reqwest::Client::new(),
        })
    }

    fn build_prompt(subject: &Subject, rule_context: Option<&str>) -> String {
        let mut prompt = format!(
            "Profile to assess:\n\
             - name: {}\n\
             - company: {}\n\
             - email: {}\n\
             - phone: {}\n\
             - role: {}\n\
             - industry: {}\n\
             - website: {}\n",
            field(&subject.full_name),
            field(&subject.company_name),
            opt_field(subject.contact.email.as_deref()),
            opt_field(subject.contact.phone.as_deref()),
            opt_field(subject.role.as_deref()),
            opt_field(subject.industry.as_deref()),
            opt_field(subject.website.as_deref()),
        );
        if let Some(ctx) = rule_context {
            prompt.push_str("\nDeterministic pre-screen: ");
            prompt.push_str(ctx);
            prompt.push('\n');
        }
        prompt
    }

    async fn send_once(&self, request: &MessagesRequest) -> Result<String, ProviderError> {
        // The credential is exposed only here, at the point of use.
        let response = self
            .client
            .post(format!("{}/messages", self.config.base_url))
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl SemanticProvider for AnthropicProvider {
    async fn assess(
        &self,
        subject: &Subject,
        rule_context: Option<&str>,
    ) -> Result<SemanticPayload, ProviderError> {
        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: Self::build_prompt(subject, rule_context),
            }],
            temperature: if self.config.temperature == 0.0 {
                None
            } else {
                Some(self.config.temperature)
            },
        };

        let content = (|| self.send_once(&request))
            .retry(ExponentialBuilder::default().with_max_times(2))
            .when(|e: &ProviderError| matches!(e, ProviderError::RateLimited { .. }))
            .await?;

        parse_payload(&content)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Extract the first JSON object from the model output and parse it.
fn parse_payload(content: &str) -> Result<SemanticPayload, ProviderError> {
    let start = content
        .find('{')
        .ok_or_else(|| ProviderError::ParseError("no JSON object in response".to_string()))?;
    let end = content
        .rfind('}')
        .ok_or_else(|| ProviderError::ParseError("unterminated JSON object".to_string()))?;

    serde_json::from_str(&content[start..=end])
        .map_err(|e| ProviderError::ParseError(e.to_string()))
}

fn field(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "(not provided)"
    } else {
        trimmed
    }
}

fn opt_field(value: Option<&str>) -> &str {
    value.map(field).unwrap_or("(not provided)")
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}
