//! Terminal rendering of generator state snapshots.

use crate::app::GenerationState;
use crate::data_uri::DataUri;
use crate::models::{DrawingStyle, GeneratedContent, GenerationRequest};
use image::ImageReader;
use std::fmt::Write as _;
use std::io::Cursor;

pub const LOADING_TEXT: &str = "Generating your masterpiece...";
pub const PLACEHOLDER_TEXT: &str = "Your generated content will appear here.";

/// Render the form summary followed by the panel for `state`.
pub fn render(state: &GenerationState, form: &GenerationRequest) -> String {
    let mut out = render_form(form);
    out.push('\n');

    match state {
        GenerationState::Loading => {
            out.push_str(LOADING_TEXT);
            out.push('\n');
        }
        GenerationState::Idle { error } => {
            match error {
                Some(message) => {
                    let _ = writeln!(out, "Error: {}", message);
                }
                None => {
                    out.push_str(PLACEHOLDER_TEXT);
                    out.push('\n');
                }
            }
        }
        GenerationState::Failed(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
        GenerationState::Success(content) => {
            out.push_str(&render_content(content, form.has_background));
        }
    }

    out
}

fn render_form(form: &GenerationRequest) -> String {
    format!(
        "Subject:    {}\nStyle:      {}\nBackground: {}\n",
        form.subject.trim(),
        form.style,
        if form.has_background { "yes" } else { "no" }
    )
}

/// Result panel: image summary, planning intention, English prompt, keywords.
pub fn render_content(content: &GeneratedContent, has_background: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "== Image ==");
    let _ = writeln!(out, "{}", image_summary(&content.image_url));
    if !has_background {
        let _ = writeln!(out, "transparent background (checkerboard)");
    }

    let _ = writeln!(out, "\n== Planning Intention ==");
    let _ = writeln!(out, "{}", content.text.planning_intention);

    let _ = writeln!(out, "\n== English Prompt ==");
    let _ = writeln!(out, "{}", content.text.english_prompt);

    let _ = writeln!(out, "\n== Keywords ==");
    if content.text.keywords.is_empty() {
        let _ = writeln!(out, "(none)");
    } else {
        let chips: Vec<String> = content
            .text
            .keywords
            .iter()
            .map(|keyword| format!("[{}]", keyword))
            .collect();
        let _ = writeln!(out, "{}", chips.join(" "));
    }

    out
}

fn image_summary(image_url: &str) -> String {
    let image = match DataUri::parse(image_url) {
        Ok(image) => image,
        Err(e) => return format!("unreadable image ({})", e),
    };

    let dimensions = ImageReader::new(Cursor::new(&image.bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());

    match dimensions {
        Some((width, height)) => format!(
            "{} {}x{} ({} bytes)",
            image.mime_type,
            width,
            height,
            image.bytes.len()
        ),
        None => format!("{} ({} bytes)", image.mime_type, image.bytes.len()),
    }
}

/// Style catalog listing for `--list-styles`.
pub fn render_styles() -> String {
    let mut out = String::new();
    for (index, style) in DrawingStyle::ALL.iter().enumerate() {
        let default_marker = if index == 0 { " (default)" } else { "" };
        let _ = writeln!(out, "{:<18} {}{}", style.name(), style.label(), default_marker);
    }
    out
}
