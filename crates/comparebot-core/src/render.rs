use crate::errors::SourceError;
use crate::model::Label;

/// Renders a source failure as a markdown block for `label`'s section.
///
/// A bot-reported error whose payload is a JSON object with a `text` field is
/// shown as that text. Anything else falls back to the full error chain in a
/// code block.
pub fn render_failure(label: &Label, error: &SourceError) -> String {
    if let Some(text) = bot_error_text(error) {
        return format!("**Error from {label}**: {text}");
    }
    let trace = format!("{:?}", anyhow::Error::new(error.clone()));
    format!("**Error from {label}**:\n```{trace}```")
}

fn bot_error_text(error: &SourceError) -> Option<String> {
    let SourceError::Bot { cause, .. } = error else {
        return None;
    };
    let payload: serde_json::Value = serde_json::from_str(cause.message()).ok()?;
    payload
        .as_object()?
        .get("text")?
        .as_str()
        .map(ToOwned::to_owned)
}
