//! crates/courseforge_core/src/domain.rs
//!
//! Defines the pure, core data structures for the generation pipelines.
//! These structs are transient request/response shapes; persistence is the
//! job of an external content store, so nothing here carries storage ids.

use serde::{Deserialize, Serialize};

/// One chapter entry of a course outline, as supplied by the caller.
///
/// The full outline is passed to each chapter's generation call so the model
/// can keep chapters coherent and avoid duplicating content across them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRef {
    pub id: u32,
    pub title: String,
}

/// Which chapter-generation strategy the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    /// One LLM call per content piece, looping over subtopics. The historical
    /// baseline; issues O(chapters x subtopics) model calls.
    Legacy,
    /// One comprehensive LLM call per chapter; issues O(chapters) model calls.
    Optimized,
}

/// The model-proposed chapter content before external lookups are resolved:
/// `youtube_search_query` and `image_search_term` are still search terms,
/// not concrete video ids / image URLs.
#[derive(Debug, Clone)]
pub struct ChapterBundle {
    pub subtopics: Vec<String>,
    pub subtopic_explanations: Vec<String>,
    pub youtube_search_query: String,
    pub course_description: String,
    pub image_search_term: String,
    pub mcqs: Vec<Mcq>,
}

/// Fully assembled content for one chapter of a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterContent {
    pub title: String,
    /// Exactly 3 subtopics covering the chapter.
    pub subtopics: Vec<String>,
    /// One ~50-word explanation per subtopic.
    pub subtopic_explanations: Vec<String>,
    pub youtube_search_query: String,
    /// `None` when the video search returned no embeddable result.
    pub video_id: Option<String>,
    /// Transcript summary; empty when no transcript was available.
    pub summary: String,
    /// ~90-character course description.
    pub description: String,
    pub image_search_term: String,
    /// `None` when no image was resolved (empty course title or empty search result).
    pub image_url: Option<String>,
    /// One multiple-choice question per subtopic.
    pub mcqs: Vec<Mcq>,
}

/// A single multiple-choice question.
///
/// `question_id` is assigned by the pipeline, sequentially from 1 within a
/// generation batch, so ids are unique and monotonically increasing even
/// when the model numbers its own output inconsistently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mcq {
    pub question_id: u32,
    pub question: String,
    /// Exactly 4 options.
    pub options: Vec<String>,
    /// Must match one of `options`.
    pub answer: String,
}

/// A hierarchical learning roadmap for a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    pub title: String,
    pub topics: Vec<RoadmapTopic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapTopic {
    pub title: String,
    pub subtopics: Vec<String>,
}

/// One completed voice-chat exchange: the transcribed user utterance and the
/// mentor's reply. History is an ordered sequence, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: String,
    pub response: String,
    pub id: String,
}

/// Difficulty of a generated quiz; drives both question count and credit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A single quiz question with an indexed answer and an explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    /// Exactly 4 options.
    pub options: Vec<String>,
    /// Index of the correct option, 0-3.
    pub correct_answer: usize,
    pub explanation: String,
}
