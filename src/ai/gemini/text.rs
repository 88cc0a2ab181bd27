use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::ai::{StructuredOutput, TextGenerationService};
use crate::models::{GenerationRequest, TextResult};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Schema-constrained text generation against a Gemini model.
pub struct GeminiTextClient {
    http: GeminiHttpClient,
}

impl GeminiTextClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, client),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    /// Send `prompt` with a JSON response schema and validate the reply as `T`.
    pub async fn generate_structured<T: StructuredOutput>(&self, prompt: String) -> Result<T> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(T::response_schema()),
                ..Default::default()
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let payload = Self::extract_text(&response).ok_or_else(|| {
            Error::InvalidResponse(format!(
                "no text in response (finish reason: {})",
                response.first_finish_reason().unwrap_or("unknown")
            ))
        })?;

        T::from_payload(&payload)
    }

    /// Concatenate every text part of the first candidate.
    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        let text: String = response
            .first_parts()
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiTextClient);

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<TextResult> {
        tracing::debug!(
            "Requesting text plan from {} (style: {}, background: {})",
            self.http.model(),
            request.style,
            request.has_background
        );

        let result: TextResult = self
            .generate_structured(prompts::text_generation_prompt(request))
            .await?;

        tracing::info!(
            "Text plan ready: prompt {} chars, {} keywords",
            result.english_prompt.len(),
            result.keywords.len()
        );

        Ok(result)
    }
}
