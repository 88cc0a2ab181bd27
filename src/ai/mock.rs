use super::{ImageGenerationService, TextGenerationService};
use crate::data_uri;
use crate::models::{GenerationRequest, TextResult};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tiny valid 1x1 PNG returned by [`MockImageClient`] by default.
pub const MOCK_PNG: [u8; 69] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
    0x41, // IDAT chunk
    0x54, 0x08, 0xD7, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00, 0x18, 0xDD,
    0x8D, 0xB0, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND chunk
    0xAE, 0x42, 0x60, 0x82,
];

/// Failure a mock can be scripted to return. `Error` is not `Clone`, so mocks
/// keep this recipe and build a fresh error per call.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Provider(String),
    InvalidResponse(String),
    NoImage,
    EmptyMessage,
}

impl MockFailure {
    fn to_error(&self) -> Error {
        match self {
            MockFailure::Provider(message) => Error::AiProvider(message.clone()),
            MockFailure::InvalidResponse(detail) => Error::InvalidResponse(detail.clone()),
            MockFailure::NoImage => Error::NoImageProduced,
            MockFailure::EmptyMessage => Error::AiProvider(String::new()),
        }
    }
}

#[derive(Debug, Clone)]
struct Scripted<T> {
    outcome: std::result::Result<T, MockFailure>,
    delay: Option<Duration>,
}

/// Picks the scripted reply for the `count`-th call (1-based), cycling.
fn pick<T: Clone>(script: &[Scripted<T>], count: usize) -> Option<Scripted<T>> {
    if script.is_empty() {
        None
    } else {
        Some(script[(count - 1) % script.len()].clone())
    }
}

async fn play<T>(reply: Scripted<T>) -> Result<T> {
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    reply.outcome.map_err(|failure| failure.to_error())
}

#[derive(Clone)]
pub struct MockTextClient {
    responses: Arc<Mutex<Vec<Scripted<TextResult>>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_text_response(self, response: TextResult) -> Self {
        self.push(Ok(response), None)
    }

    pub fn with_delayed_text_response(self, response: TextResult, delay: Duration) -> Self {
        self.push(Ok(response), Some(delay))
    }

    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.push(Err(failure), None)
    }

    fn push(self, outcome: std::result::Result<TextResult, MockFailure>, delay: Option<Duration>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted { outcome, delay });
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Default plan derived from the request.
    pub fn default_text(request: &GenerationRequest) -> TextResult {
        TextResult {
            planning_intention: format!("{} 콘셉트의 스톡 이미지", request.subject.trim()),
            english_prompt: format!("{}, {} style", request.subject.trim(), request.style),
            keywords: vec!["stock".to_string(), request.style.name().to_string()],
        }
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<TextResult> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.requests.lock().unwrap().push(request.clone());

        let reply = pick(&self.responses.lock().unwrap(), count);
        match reply {
            Some(reply) => play(reply).await,
            None => Ok(Self::default_text(request)),
        }
    }
}

#[derive(Clone)]
pub struct MockImageClient {
    responses: Arc<Mutex<Vec<Scripted<String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Script a reply carrying `bytes` as a data URI of `mime_type`.
    pub fn with_image_response(self, mime_type: &str, bytes: &[u8]) -> Self {
        self.push(Ok(data_uri::from_bytes(mime_type, bytes)), None)
    }

    pub fn with_delayed_image_response(self, mime_type: &str, bytes: &[u8], delay: Duration) -> Self {
        self.push(Ok(data_uri::from_bytes(mime_type, bytes)), Some(delay))
    }

    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.push(Err(failure), None)
    }

    fn push(self, outcome: std::result::Result<String, MockFailure>, delay: Option<Duration>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted { outcome, delay });
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.prompts.lock().unwrap().push(prompt.to_string());

        let reply = pick(&self.responses.lock().unwrap(), count);
        match reply {
            Some(reply) => play(reply).await,
            None => Ok(data_uri::from_bytes("image/png", &MOCK_PNG)),
        }
    }
}
