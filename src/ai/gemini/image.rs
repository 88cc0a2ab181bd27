use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::ai::{mime, ImageGenerationService};
use crate::{data_uri, Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;

pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
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
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiImageClient);

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                ..Default::default()
            },
        };

        let gemini_response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let image_data = gemini_response
            .first_parts()
            .iter()
            .find_map(|p| match p {
                Part::InlineData { inline_data } if !inline_data.data.trim().is_empty() => {
                    Some(inline_data)
                }
                _ => None,
            })
            .ok_or_else(|| {
                tracing::warn!(
                    "Gemini returned no inline image (finish reason: {})",
                    gemini_response.first_finish_reason().unwrap_or("unknown")
                );
                Error::NoImageProduced
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&image_data.data)
            .map_err(|e| Error::AiProvider(format!("Failed to decode Gemini base64 image: {}", e)))?;

        let mime_type = if image_data.mime_type.is_empty() {
            mime::detect_image_mime(&bytes)
        } else {
            image_data.mime_type.as_str()
        };

        tracing::debug!(
            "Gemini returned image with mime_type: {} ({} bytes)",
            mime_type,
            bytes.len()
        );

        Ok(data_uri::from_base64(mime_type, &image_data.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use base64::Engine as _;
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

    fn make_client(server: &MockServer) -> GeminiImageClient {
        GeminiImageClient::new("key".to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    fn inline_response(mime_type: &str, data: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": mime_type, "data": data } }
                    ]
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_image_returns_data_uri() {
        let server = MockServer::start().await;

        let b64 = base64::engine::general_purpose::STANDARD.encode([0x89, 0x50, 0x4E, 0x47]);

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(inline_response("image/png", &b64)))
            .mount(&server)
            .await;

        let uri = make_client(&server).generate_image("a cat").await.unwrap();
        assert_eq!(uri, format!("data:image/png;base64,{}", b64));
    }

    #[tokio::test]
    async fn test_request_asks_for_image_modality_with_prompt_only() {
        let server = MockServer::start().await;

        let b64 = base64::engine::general_purpose::STANDARD.encode([0x00]);

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"responseModalities\":[\"IMAGE\"]"))
            .and(body_string_contains("\"text\":\"a watercolor fox\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(inline_response("image/png", &b64)))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .generate_image("a watercolor fox")
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&received[0].body);
        assert!(!body.contains("responseSchema"));
    }

    #[tokio::test]
    async fn test_missing_mime_type_is_sniffed() {
        let server = MockServer::start().await;

        let b64 = base64::engine::general_purpose::STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]);

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "inlineData": { "data": b64 } }] }
                }]
            })))
            .mount(&server)
            .await;

        let uri = make_client(&server).generate_image("a cat").await.unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_text_only_response_is_no_image_produced() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::text_response("I can't draw that")),
            )
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("a cat").await.unwrap_err();
        assert!(matches!(err, Error::NoImageProduced));
        assert_eq!(err.to_string(), "No image was generated.");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_no_image_produced() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("a cat").await.unwrap_err();
        assert!(matches!(err, Error::NoImageProduced));
    }

    #[tokio::test]
    async fn test_empty_inline_data_is_no_image_produced() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(inline_response("image/png", "")))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("a cat").await.unwrap_err();
        assert!(matches!(err, Error::NoImageProduced));
    }

    #[tokio::test]
    async fn test_empty_inline_part_is_skipped_for_later_one() {
        let server = MockServer::start().await;

        let b64 = base64::engine::general_purpose::STANDARD.encode([0x89, 0x50, 0x4E, 0x47]);

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            { "inlineData": { "mimeType": "image/png", "data": "" } },
                            { "inlineData": { "mimeType": "image/png", "data": b64 } }
                        ]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let uri = make_client(&server).generate_image("a cat").await.unwrap();
        assert_eq!(uri, format!("data:image/png;base64,{}", b64));
    }

    #[tokio::test]
    async fn test_first_inline_image_wins() {
        let server = MockServer::start().await;

        let first = base64::engine::general_purpose::STANDARD.encode([0x89, 0x50, 0x4E, 0x47]);
        let second = base64::engine::general_purpose::STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]);

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            { "text": "Two takes" },
                            { "inlineData": { "mimeType": "image/png", "data": first } },
                            { "inlineData": { "mimeType": "image/jpeg", "data": second } }
                        ]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let uri = make_client(&server).generate_image("a cat").await.unwrap();
        assert_eq!(uri, format!("data:image/png;base64,{}", first));
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("a cat").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_generate_image_rejects_invalid_base64() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(inline_response("image/png", "!!!invalid-base64!!!")),
            )
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("a cat").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
