use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::core::Insight;
use crate::download::post_json;
use crate::error::{Result, UltradownError};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Env var holding the API key
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Narrow capability seam: structured text generation given a prompt and a
/// response schema. Lets callers swap or stub the AI service in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text constrained to `schema`; returns the raw response text,
    /// which the caller parses as JSON.
    async fn generate(&self, prompt: &str, schema: Value) -> Result<String>;
}

/// Google Gemini REST client
pub struct GeminiClient {
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| UltradownError::MissingApiKey(API_KEY_VAR.to_string()))?;
        Ok(Self::new(api_key))
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, schema: Value) -> Result<String> {
        let body = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });
        let response: GenerateResponse = post_json(&self.endpoint(), &body).await?;
        response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| UltradownError::GeneratorError("Empty generation response".to_string()))
    }
}

fn insight_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {"type": "STRING"},
            "tags": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": ["summary", "tags"]
    })
}

/// Produce a one-sentence summary and 3-5 tags for a video title.
///
/// Any failure (invalid key, network, malformed response) degrades to `None`.
/// Never retried.
pub async fn fetch_insights(generator: &dyn TextGenerator, title: &str) -> Option<Insight> {
    let prompt = format!(
        "Phân tích tiêu đề video sau và trả về tóm tắt ngắn gọn bằng tiếng Việt (1 câu) \
         và 3-5 hashtags liên quan nhất.\nTiêu đề: \"{title}\""
    );
    let text = match generator.generate(&prompt, insight_schema()).await {
        Ok(text) => text,
        Err(e) => {
            debug!("Insight generation failed: {e}");
            return None;
        }
    };
    match serde_json::from_str::<Insight>(&text) {
        Ok(insight) => Some(insight),
        Err(e) => {
            debug!("Insight response was not valid JSON: {e}");
            None
        }
    }
}
