//! Data models and structures
//!
//! Defines the generation request, the text and image results produced by the
//! AI services, the drawing style catalog, and runtime configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DrawingStyle {
    #[default]
    Photorealistic,
    Watercolor,
    OilPainting,
    PencilSketch,
    FlatIllustration,
    #[serde(rename = "render-3d")]
    Render3d,
    Anime,
    PixelArt,
    LineArt,
    Vector,
}

impl DrawingStyle {
    /// Full catalog in display order. The first entry is the default.
    pub const ALL: [DrawingStyle; 10] = [
        DrawingStyle::Photorealistic,
        DrawingStyle::Watercolor,
        DrawingStyle::OilPainting,
        DrawingStyle::PencilSketch,
        DrawingStyle::FlatIllustration,
        DrawingStyle::Render3d,
        DrawingStyle::Anime,
        DrawingStyle::PixelArt,
        DrawingStyle::LineArt,
        DrawingStyle::Vector,
    ];

    /// Human-readable label, also the text embedded in generation prompts.
    pub fn label(&self) -> &'static str {
        match self {
            DrawingStyle::Photorealistic => "Photorealistic",
            DrawingStyle::Watercolor => "Watercolor",
            DrawingStyle::OilPainting => "Oil Painting",
            DrawingStyle::PencilSketch => "Pencil Sketch",
            DrawingStyle::FlatIllustration => "Flat Illustration",
            DrawingStyle::Render3d => "3D Render",
            DrawingStyle::Anime => "Anime",
            DrawingStyle::PixelArt => "Pixel Art",
            DrawingStyle::LineArt => "Line Art",
            DrawingStyle::Vector => "Vector Art",
        }
    }

    /// Kebab-case name accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            DrawingStyle::Photorealistic => "photorealistic",
            DrawingStyle::Watercolor => "watercolor",
            DrawingStyle::OilPainting => "oil-painting",
            DrawingStyle::PencilSketch => "pencil-sketch",
            DrawingStyle::FlatIllustration => "flat-illustration",
            DrawingStyle::Render3d => "render-3d",
            DrawingStyle::Anime => "anime",
            DrawingStyle::PixelArt => "pixel-art",
            DrawingStyle::LineArt => "line-art",
            DrawingStyle::Vector => "vector",
        }
    }
}

impl fmt::Display for DrawingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DrawingStyle {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let needle = input.trim();
        DrawingStyle::ALL
            .into_iter()
            .find(|style| {
                style.name().eq_ignore_ascii_case(needle)
                    || style.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| Error::Validation(format!("Unknown drawing style '{}'", input)))
    }
}

/// One user-triggered generation. Built fresh for every trigger.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub subject: String,
    pub style: DrawingStyle,
    pub has_background: bool,
}

impl GenerationRequest {
    pub fn new(subject: impl Into<String>, style: DrawingStyle, has_background: bool) -> Self {
        Self {
            subject: subject.into(),
            style,
            has_background,
        }
    }
}

/// Structured output of the text generation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextResult {
    pub planning_intention: String,
    pub english_prompt: String,
    pub keywords: Vec<String>,
}

/// Text result combined with the image generated from its English prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    #[serde(flatten)]
    pub text: TextResult,
    /// `data:<mime>;base64,<payload>`
    pub image_url: String,
}

impl GeneratedContent {
    pub fn new(text: TextResult, image_url: String) -> Self {
        Self { text, image_url }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        allow_missing_dotenv(dotenvy::dotenv().map(|_| ()))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| Error::Config("GEMINI_API_KEY (or API_KEY) not set".to_string()))?;

        let timeout = match non_empty("GENERATION_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!(
                        "GENERATION_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key,
            text_model: non_empty("TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: non_empty("IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            timeout,
        })
    }
}

/// A missing `.env` is fine; one that exists but does not parse is not.
fn allow_missing_dotenv(loaded: std::result::Result<(), dotenvy::Error>) -> Result<()> {
    match loaded {
        Err(e) if e.not_found() => Ok(()),
        other => other.map_err(Error::from),
    }
}
