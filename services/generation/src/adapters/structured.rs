//! services/generation/src/adapters/structured.rs
//!
//! Shared machinery for structured generation calls: prompt templates carry a
//! format-instructions block describing the expected JSON object, and the
//! model reply is deserialized against the declared schema struct. A reply
//! that cannot be parsed is a `SchemaViolation` and is never retried;
//! transport-level failures are retried with bounded exponential backoff.

use async_openai::{config::OpenAIConfig, types::chat::CreateChatCompletionRequest, Client};
use courseforge_core::ports::{PortError, PortResult};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

/// Total attempts for one chat completion, counting the first.
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Upper bound on caller-supplied titles interpolated into prompts.
const MAX_TITLE_CHARS: usize = 200;

/// Renders the formatting-instructions block appended to every structured
/// prompt. `schema` is a JSON object literal whose values describe each field.
pub(crate) fn format_instructions(schema: &str) -> String {
    format!(
        "Respond with a single JSON object matching the following schema, where each value \
         describes the expected content of that field. Output only the JSON object, optionally \
         inside a ```json code block, with no other text.\n```json\n{schema}\n```"
    )
}

/// Sends a chat completion and returns the text of the first choice.
///
/// Transport failures are retried up to `MAX_ATTEMPTS` times in total. Once a
/// reply arrives its content is returned as-is; whether it satisfies the
/// declared schema is the caller's concern.
pub(crate) async fn complete(
    client: &Client<OpenAIConfig>,
    request: CreateChatCompletionRequest,
) -> PortResult<String> {
    let mut delay = RETRY_BASE_DELAY;
    let mut attempt = 1;
    let response = loop {
        match client.chat().create(request.clone()).await {
            Ok(response) => break response,
            Err(e) if attempt < MAX_ATTEMPTS => {
                warn!(
                    "Chat completion attempt {}/{} failed, retrying in {:?}: {}",
                    attempt, MAX_ATTEMPTS, delay, e
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        }
    };

    if let Some(choice) = response.choices.into_iter().next() {
        if let Some(content) = choice.message.content {
            Ok(content)
        } else {
            Err(PortError::Unexpected(
                "Chat completion response contained no text content.".to_string(),
            ))
        }
    } else {
        Err(PortError::Unexpected(
            "Chat completion returned no choices in its response.".to_string(),
        ))
    }
}

/// Deserializes a model reply against the declared schema struct.
///
/// Models frequently wrap their JSON in a code fence or lead with prose, so
/// the outermost `{...}` span is extracted before parsing. Any mismatch maps
/// to `SchemaViolation` and propagates to the caller unchanged.
pub(crate) fn parse_structured<T: DeserializeOwned>(raw: &str) -> PortResult<T> {
    let json = extract_json_object(raw).ok_or_else(|| {
        PortError::SchemaViolation(format!("no JSON object found in model output: {raw}"))
    })?;
    serde_json::from_str(json).map_err(|e| PortError::SchemaViolation(e.to_string()))
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| &raw[start..=end])
}

/// Truncates a caller-supplied title before it is interpolated into a prompt.
/// Titles only ever feed the model, so this is a size bound, not sanitization.
pub(crate) fn clamp_title(title: &str) -> &str {
    match title.char_indices().nth(MAX_TITLE_CHARS) {
        Some((idx, _)) => &title[..idx],
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Shape {
        summary: String,
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "Here you go:\n```json\n{\"summary\": \"short\"}\n```";
        let shape: Shape = parse_structured(raw).unwrap();
        assert_eq!(shape.summary, "short");
    }

    #[test]
    fn parses_bare_json() {
        let shape: Shape = parse_structured("{\"summary\": \"bare\"}").unwrap();
        assert_eq!(shape.summary, "bare");
    }

    #[test]
    fn missing_field_is_schema_violation() {
        let err = parse_structured::<Shape>("{\"other\": 1}").unwrap_err();
        assert!(matches!(err, PortError::SchemaViolation(_)));
    }

    #[test]
    fn no_json_at_all_is_schema_violation() {
        let err = parse_structured::<Shape>("I cannot answer that.").unwrap_err();
        assert!(matches!(err, PortError::SchemaViolation(_)));
    }

    #[test]
    fn clamp_title_respects_char_boundaries() {
        let long = "é".repeat(300);
        let clamped = clamp_title(&long);
        assert_eq!(clamped.chars().count(), 200);

        assert_eq!(clamp_title("Recursion"), "Recursion");
    }
}
