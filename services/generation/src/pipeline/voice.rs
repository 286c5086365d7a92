//! services/generation/src/pipeline/voice.rs
//!
//! The voice-chat pipeline: transcribe the audio clip, then produce a
//! mentor reply conditioned on the persona and the prior turns. Context is
//! reconstructed statelessly per call; the caller supplies the full history
//! every time.

use courseforge_core::{
    domain::ChatTurn,
    ports::{MentorChatService, PortResult, SpeechToTextService},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Only the most recent turns are fed back to the model.
const HISTORY_WINDOW: usize = 20;

pub struct VoiceChatPipeline {
    stt: Arc<dyn SpeechToTextService>,
    mentor: Arc<dyn MentorChatService>,
}

impl VoiceChatPipeline {
    pub fn new(stt: Arc<dyn SpeechToTextService>, mentor: Arc<dyn MentorChatService>) -> Self {
        Self { stt, mentor }
    }

    /// Runs one voice-chat turn. A transcription failure propagates
    /// immediately; no partial reply is produced.
    pub async fn respond(
        &self,
        history: &[ChatTurn],
        audio_clip: &[u8],
        persona_description: &str,
    ) -> PortResult<ChatTurn> {
        let utterance = self.stt.transcribe_audio(audio_clip).await?;
        info!("Transcribed voice input: '{}'", utterance);

        let recent = if history.len() > HISTORY_WINDOW {
            &history[history.len() - HISTORY_WINDOW..]
        } else {
            history
        };

        let response = self
            .mentor
            .reply(persona_description, recent, &utterance)
            .await?;

        Ok(ChatTurn {
            sender: utterance,
            response,
            id: Uuid::new_v4().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockMentor, MockStt};
    use courseforge_core::ports::PortError;
    use std::sync::atomic::Ordering;

    fn history(len: usize) -> Vec<ChatTurn> {
        (0..len)
            .map(|i| ChatTurn {
                sender: format!("question {i}"),
                response: format!("answer {i}"),
                id: i.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn reply_carries_the_transcribed_utterance() {
        let pipeline = VoiceChatPipeline::new(
            Arc::new(MockStt::transcribing()),
            Arc::new(MockMentor::new()),
        );

        let turn = pipeline
            .respond(&history(3), &[0u8; 64], "a patient algorithms mentor")
            .await
            .unwrap();

        assert_eq!(turn.sender, "How does recursion terminate?");
        assert!(!turn.response.is_empty());
        assert!(!turn.id.is_empty());
    }

    #[tokio::test]
    async fn history_is_truncated_to_the_window() {
        let mentor = Arc::new(MockMentor::new());
        let pipeline = VoiceChatPipeline::new(Arc::new(MockStt::transcribing()), mentor.clone());

        pipeline
            .respond(&history(35), &[0u8; 64], "a patient algorithms mentor")
            .await
            .unwrap();

        assert_eq!(mentor.seen_history_len.load(Ordering::SeqCst), 20);
    }

    #[tokio::test]
    async fn transcription_failure_prevents_the_chat_call() {
        let mentor = Arc::new(MockMentor::new());
        let pipeline = VoiceChatPipeline::new(Arc::new(MockStt::failing()), mentor.clone());

        let err = pipeline
            .respond(&history(2), &[0u8; 64], "a patient algorithms mentor")
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::Transcription(_)));
        assert_eq!(mentor.calls.load(Ordering::SeqCst), 0);
    }
}
