//! Orchestration of one generation cycle: validate, plan the text, render the
//! image, publish the resulting state.

use crate::ai::{GeminiImageClient, GeminiTextClient, ImageGenerationService, TextGenerationService};
use crate::models::{Config, GeneratedContent, GenerationRequest};
use crate::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{error, info, warn};

pub const EMPTY_SUBJECT_MESSAGE: &str = "Please enter a subject.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Immutable snapshot of the controller, consumed by the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    /// Nothing in flight. Carries the validation message of a rejected trigger.
    Idle { error: Option<String> },
    Loading,
    Success(GeneratedContent),
    Failed(String),
}

impl Default for GenerationState {
    fn default() -> Self {
        GenerationState::Idle { error: None }
    }
}

impl GenerationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, GenerationState::Loading)
    }

    pub fn content(&self) -> Option<&GeneratedContent> {
        match self {
            GenerationState::Success(content) => Some(content),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenerationState::Idle { error } => error.as_deref(),
            GenerationState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Injectable service bundle used to construct [`Generator`] in tests/harnesses.
pub struct GeneratorServices {
    pub text: Box<dyn TextGenerationService>,
    pub image: Box<dyn ImageGenerationService>,
}

/// Sequences text then image generation and publishes state snapshots.
///
/// Overlapping triggers follow a latest-wins rule: each trigger takes a cycle
/// ticket, and a cycle that completes after a newer trigger started drops its
/// outcome instead of overwriting the newer one.
pub struct Generator {
    text: Box<dyn TextGenerationService>,
    image: Box<dyn ImageGenerationService>,
    state: watch::Sender<GenerationState>,
    latest_cycle: AtomicU64,
}

impl Generator {
    /// Build a generator from concrete service dependencies.
    pub fn with_services(services: GeneratorServices) -> Self {
        let (state, _) = watch::channel(GenerationState::default());
        Self {
            text: services.text,
            image: services.image,
            state,
            latest_cycle: AtomicU64::new(0),
        }
    }

    /// Construct Gemini-backed services from configuration.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        info!("Text provider: Gemini (model: {})", config.text_model);
        let text = GeminiTextClient::new_with_client(
            config.api_key.clone(),
            config.text_model.clone(),
            http_client.clone(),
        )
        .with_timeout(config.timeout);

        info!("Image provider: Gemini (model: {})", config.image_model);
        let image = GeminiImageClient::new_with_client(
            config.api_key.clone(),
            config.image_model.clone(),
            http_client,
        )
        .with_timeout(config.timeout);

        Self::with_services(GeneratorServices {
            text: Box::new(text),
            image: Box::new(image),
        })
    }

    /// Receiver notified on every published state change.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> GenerationState {
        self.state.borrow().clone()
    }

    /// Run one full generation cycle for `request`.
    ///
    /// Returns the state this cycle published, or the current state when a
    /// newer trigger superseded it.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationState {
        let cycle = self.latest_cycle.fetch_add(1, Ordering::SeqCst) + 1;

        if request.subject.trim().is_empty() {
            warn!("[cycle {}] Rejected trigger: empty subject", cycle);
            return self.publish(
                cycle,
                GenerationState::Idle {
                    error: Some(EMPTY_SUBJECT_MESSAGE.to_string()),
                },
            );
        }

        info!(
            "[cycle {}] Generating '{}' (style: {}, background: {})",
            cycle,
            request.subject.trim(),
            request.style,
            request.has_background
        );
        self.publish(cycle, GenerationState::Loading);

        let next = match self.run_cycle(cycle, request).await {
            Ok(content) => {
                info!("[cycle {}] Generation succeeded", cycle);
                GenerationState::Success(content)
            }
            Err(e) => {
                error!("[cycle {}] Generation failed: {}", cycle, e);
                GenerationState::Failed(failure_message(&e))
            }
        };

        self.publish(cycle, next)
    }

    async fn run_cycle(&self, cycle: u64, request: &GenerationRequest) -> Result<GeneratedContent> {
        let text = self.text.generate_text(request).await?;
        info!(
            "[cycle {}] Generated prompt ({} chars): {}",
            cycle,
            text.english_prompt.len(),
            text.english_prompt
        );

        let image_url = self.image.generate_image(&text.english_prompt).await?;
        info!("[cycle {}] Generated image ({} chars of data URI)", cycle, image_url.len());

        Ok(GeneratedContent::new(text, image_url))
    }

    /// Store `next` unless a newer cycle has started; returns the current state.
    fn publish(&self, cycle: u64, next: GenerationState) -> GenerationState {
        let published = self.state.send_if_modified(|current| {
            if self.latest_cycle.load(Ordering::SeqCst) != cycle {
                return false;
            }
            *current = next;
            true
        });

        if !published {
            warn!("[cycle {}] Superseded by a newer trigger, dropping outcome", cycle);
        }
        self.state()
    }
}

/// User-facing message for a failed cycle.
pub fn failure_message(error: &Error) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
