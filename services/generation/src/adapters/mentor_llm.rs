//! services/generation/src/adapters/mentor_llm.rs
//!
//! This module contains the adapter for the voice-mentor conversational LLM.
//! It implements the `MentorChatService` port from the `core` crate.

const SYSTEM_TEMPLATE: &str = r#"You are an AI capable of generating a voice chat response for the given messages and voice mentor details - {voiceMentorDescription}. Please provide a perfect voice chat response for the given messages and voice mentor details with only english language.

Please provide the response in a nice way containing commas and other symbols since it is a voice chat response and we have a Text To Speech model on the other end. Don't include giving '**' for bold purposes, rather use commas, exclamations and other symbols."#;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use courseforge_core::{
    domain::ChatTurn,
    ports::{MentorChatService, PortError, PortResult},
};
use regex::Regex;

use super::structured::complete;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `MentorChatService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct GroqMentorAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqMentorAdapter {
    /// Creates a new `GroqMentorAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Strips Markdown bold emphasis that leaks through despite the prompt.
    /// The reply is spoken by a TTS model, so asterisks must not survive.
    fn strip_emphasis(text: &str) -> String {
        let bold = Regex::new(r"\*\*(.*?)\*\*").unwrap();
        let unwrapped = bold.replace_all(text, "$1");
        unwrapped.replace("**", "")
    }
}

//=========================================================================================
// `MentorChatService` Trait Implementation
//=========================================================================================

#[async_trait]
impl MentorChatService for GroqMentorAdapter {
    /// Replies to the transcribed utterance. Conversational context is
    /// reconstructed statelessly per call: the prior turns are converted into
    /// an alternating user/assistant message sequence behind the persona
    /// system prompt.
    async fn reply(
        &self,
        persona_description: &str,
        history: &[ChatTurn],
        utterance: &str,
    ) -> PortResult<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(history.len() * 2 + 2);

        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_TEMPLATE.replace("{voiceMentorDescription}", persona_description))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        );

        for turn in history {
            messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.sender.as_str())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            );
            messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.response.as_str())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(utterance)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let raw = complete(&self.client, request).await?;
        Ok(Self::strip_emphasis(raw.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::GroqMentorAdapter;

    #[test]
    fn strips_bold_emphasis_pairs() {
        let cleaned = GroqMentorAdapter::strip_emphasis("That is **very** important, truly!");
        assert_eq!(cleaned, "That is very important, truly!");
    }

    #[test]
    fn strips_stray_emphasis_markers() {
        let cleaned = GroqMentorAdapter::strip_emphasis("Well** that settles it.");
        assert_eq!(cleaned, "Well that settles it.");
    }
}
