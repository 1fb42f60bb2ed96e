pub mod error;
pub mod prompt;
pub mod types;
pub mod util;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};

use naturecard_common::Config;

pub use error::{CardError, Result};
pub use prompt::build_prompt;
pub use types::{CardRequest, CardText};

use types::{ChatRequest, ChatResponse, WireMessage};

const TEMPERATURE: f32 = 0.8;
const MAX_TOKENS: u32 = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Writes card text through an OpenAI-compatible chat completions gateway.
#[derive(Clone)]
pub struct CardWriter {
    http: reqwest::Client,
    base_url: String,
    token: String,
    model: String,
    retry_delay: Duration,
}

impl CardWriter {
    pub fn new(base_url: &str, token: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            model: model.to_string(),
            retry_delay: RETRY_DELAY,
        }
    }

    /// `None` when no gateway token is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        config.card_generation_enabled().then(|| {
            Self::new(
                &config.llm_gateway_url,
                &config.llm_gateway_token,
                &config.llm_model,
            )
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| CardError::Network(format!("invalid gateway token: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Single attempt: prompt, call, extract, parse.
    pub async fn generate(&self, request: &CardRequest) -> Result<CardText> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![WireMessage::user(build_prompt(request))],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(model = %self.model, species = %request.scientific_name, "Card generation request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CardError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let chat: ChatResponse = serde_json::from_str(&text)?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(CardError::EmptyResponse)?;

        parse_card(&content)
    }

    /// [`Self::generate`], retried once after a short delay.
    pub async fn generate_with_retry(&self, request: &CardRequest) -> Result<CardText> {
        match self.generate(request).await {
            Ok(card) => Ok(card),
            Err(e) => {
                warn!(error = %e, species = %request.scientific_name, "Card generation failed, retrying once");
                tokio::time::sleep(self.retry_delay).await;
                self.generate(request).await
            }
        }
    }
}

/// Parse card text out of a raw model reply.
pub fn parse_card(content: &str) -> Result<CardText> {
    let json = util::extract_json_object(content)
        .ok_or_else(|| CardError::Format("no JSON object in response".to_string()))?;
    Ok(serde_json::from_str(json)?)
}
