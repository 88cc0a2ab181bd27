use crate::models::GenerationRequest;

pub const TEXT_GENERATION: &str = include_str!("../data/prompts/text_generation.txt");
pub const BACKGROUND_DETAILED: &str = include_str!("../data/prompts/background_detailed.txt");
pub const BACKGROUND_TRANSPARENT: &str =
    include_str!("../data/prompts/background_transparent.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// The template is scanned once, so substituted values are emitted verbatim
/// even when they contain placeholder syntax. Unknown placeholders are kept.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let key = &after_open[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => {
                result.push_str("{{");
                result.push_str(key);
                result.push_str("}}");
            }
        }
        rest = &after_open[end + 2..];
    }

    result.push_str(rest);
    result
}

/// Background clause for the English prompt. Exactly one of the two variants.
pub fn background_instruction(has_background: bool) -> &'static str {
    if has_background {
        BACKGROUND_DETAILED
    } else {
        BACKGROUND_TRANSPARENT
    }
}

/// Full instruction sent to the text model for one request.
pub fn text_generation_prompt(request: &GenerationRequest) -> String {
    render(
        TEXT_GENERATION,
        &[
            ("subject", request.subject.trim()),
            ("style", request.style.label()),
            (
                "background",
                if request.has_background { "Yes" } else { "No" },
            ),
            (
                "background_instruction",
                background_instruction(request.has_background),
            ),
        ],
    )
}
