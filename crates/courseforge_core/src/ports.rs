//! crates/courseforge_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the generation pipelines.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete model provider and lookup APIs.

use crate::domain::{ChapterBundle, ChapterRef, ChatTurn, Difficulty, Mcq, QuizQuestion, Roadmap};
use async_trait::async_trait;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (model
/// provider, search APIs, database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The model returned content that does not fit the declared output
    /// schema. Never retried; the caller must not debit credits for it.
    #[error("Model output failed schema validation: {0}")]
    SchemaViolation(String),
    /// The speech-to-text service returned non-success.
    #[error("Audio transcription failed: {0}")]
    Transcription(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Chapter-level structured generation.
///
/// `generate_chapter_bundle` is the optimized single-call path; the remaining
/// methods are the fine-grained calls of the legacy multi-call path.
#[async_trait]
pub trait ChapterContentService: Send + Sync {
    /// Produces all per-chapter content in one structured call, given the
    /// chapter title plus the full course outline for coherence.
    async fn generate_chapter_bundle(
        &self,
        chapter_title: &str,
        course_title: &str,
        course_outline: &[ChapterRef],
    ) -> PortResult<ChapterBundle>;

    /// Proposes the 3 subtopics covering a chapter.
    async fn generate_subtopics(&self, chapter_title: &str) -> PortResult<Vec<String>>;

    /// Produces a ~50-word simplified explanation of one subtopic.
    async fn explain_subtopic(&self, subtopic: &str) -> PortResult<String>;

    /// Produces a video search query for an educational video on the chapter.
    async fn generate_video_query(&self, chapter_title: &str) -> PortResult<String>;

    /// Produces one multiple-choice question from a subtopic explanation.
    /// The returned `question_id` is a placeholder; the pipeline assigns ids.
    async fn generate_mcq(&self, subtopic_explanation: &str) -> PortResult<Mcq>;

    /// Summarizes a video transcript in 250 words or less.
    async fn summarize_transcript(&self, transcript: &str) -> PortResult<String>;
}

/// Course-level structured generation: the description and the image search
/// term apply to the course as a whole, not to a single chapter.
#[async_trait]
pub trait CourseMetaService: Send + Sync {
    /// Produces a ~90-character description of the course.
    async fn generate_description(&self, course_title: &str) -> PortResult<String>;

    /// Produces a single-word image search term for the course.
    async fn generate_image_search_term(&self, course_title: &str) -> PortResult<String>;
}

#[async_trait]
pub trait RoadmapService: Send + Sync {
    /// Produces a hierarchical topic/subtopic roadmap in one structured call.
    async fn generate_roadmap(&self, roadmap_title: &str) -> PortResult<Roadmap>;
}

#[async_trait]
pub trait QuizGenerationService: Send + Sync {
    /// Produces exactly `count` quiz questions from a course title and a
    /// content excerpt.
    async fn generate_quiz(
        &self,
        course_title: &str,
        content: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> PortResult<Vec<QuizQuestion>>;
}

#[async_trait]
pub trait MentorChatService: Send + Sync {
    /// Produces a conversational reply to `utterance`, conditioned on the
    /// mentor persona and the prior turns. The reply is plain prose suitable
    /// for text-to-speech.
    async fn reply(
        &self,
        persona_description: &str,
        history: &[ChatTurn],
        utterance: &str,
    ) -> PortResult<String>;
}

#[async_trait]
pub trait SpeechToTextService: Send + Sync {
    /// Transcribes a slice of audio data into text.
    async fn transcribe_audio(&self, audio_data: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait VideoSearchService: Send + Sync {
    /// Resolves a search query to an embeddable video id. Zero results is a
    /// valid terminal state, not an error.
    async fn find_video(&self, query: &str) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// Fetches the captions of a video as plain text. Degrades to an empty
    /// string on any failure; the signature makes the silent-degradation
    /// contract explicit.
    async fn fetch_transcript(&self, video_id: &str) -> String;
}

#[async_trait]
pub trait ImageSearchService: Send + Sync {
    /// Resolves a search term to an image URL. Zero results resolves to
    /// `None`, not an error.
    async fn find_image(&self, term: &str) -> PortResult<Option<String>>;
}

/// The per-user credit balance, the only cross-request shared resource.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    async fn balance(&self, user_id: Uuid) -> PortResult<u32>;

    /// Atomically debits `amount` if (and only if) the balance covers it.
    /// Returns whether the debit was applied. The conditional decrement must
    /// be a single atomic operation so concurrent requests cannot both pass
    /// a stale sufficiency check.
    async fn try_debit(&self, user_id: Uuid, amount: u32) -> PortResult<bool>;
}
