//! Saving generated images (and their planning notes) to disk.

use crate::ai::mime;
use crate::data_uri::DataUri;
use crate::models::{DrawingStyle, GeneratedContent, GenerationRequest};
use crate::Result;
use chrono::{DateTime, Utc};
use image::ImageFormat;
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const MAX_SLUG_CHARS: usize = 30;
pub const FALLBACK_STEM: &str = "generated-image";

/// Lowercased, hyphen-separated file stem derived from a subject.
///
/// Punctuation is dropped, whitespace and hyphen runs collapse to one hyphen,
/// and the result is capped at [`MAX_SLUG_CHARS`] characters.
pub fn slugify(subject: &str) -> String {
    let mut slug = String::new();
    let mut pending_hyphen = false;

    for c in subject.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }

    let capped: String = slug.chars().take(MAX_SLUG_CHARS).collect();
    capped.trim_end_matches('-').to_string()
}

/// `<slug>.png`, or `generated-image.png` when nothing usable is left.
pub fn filename(subject: &str) -> String {
    format!("{}.png", stem(subject))
}

fn stem(subject: &str) -> String {
    let slug = slugify(subject);
    if slug.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        slug
    }
}

/// Decode the content's data URI and write it as a PNG into `dir`.
///
/// Payloads that are not PNG by their magic bytes are transcoded, whatever
/// media type the URI declares. The directory is created when missing.
pub fn save_png(content: &GeneratedContent, subject: &str, dir: &Path) -> Result<PathBuf> {
    let payload = DataUri::parse(&content.image_url)?;

    let png_bytes = if mime::sniff_image_mime(&payload.bytes) == Some(mime::PNG) {
        payload.bytes
    } else {
        tracing::info!("Transcoding {} image to PNG", payload.mime_type);
        let decoded = image::load_from_memory(&payload.bytes)?;
        let mut bytes = Vec::new();
        decoded.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        bytes
    };

    fs::create_dir_all(dir)?;
    let path = dir.join(filename(subject));
    fs::write(&path, &png_bytes)?;
    tracing::info!("Saved image ({} bytes) to {}", png_bytes.len(), path.display());

    Ok(path)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata<'a> {
    subject: &'a str,
    style: DrawingStyle,
    style_label: &'a str,
    has_background: bool,
    planning_intention: &'a str,
    english_prompt: &'a str,
    keywords: &'a [String],
    image_file: String,
    generated_at: DateTime<Utc>,
}

/// Write the text half of a result as `<slug>.json` next to the image.
pub fn save_metadata(
    content: &GeneratedContent,
    request: &GenerationRequest,
    dir: &Path,
) -> Result<PathBuf> {
    let metadata = Metadata {
        subject: request.subject.trim(),
        style: request.style,
        style_label: request.style.label(),
        has_background: request.has_background,
        planning_intention: &content.text.planning_intention,
        english_prompt: &content.text.english_prompt,
        keywords: &content.text.keywords,
        image_file: filename(&request.subject),
        generated_at: Utc::now(),
    };

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", stem(&request.subject)));
    fs::write(&path, serde_json::to_string_pretty(&metadata)?)?;
    tracing::info!("Saved metadata to {}", path.display());

    Ok(path)
}
