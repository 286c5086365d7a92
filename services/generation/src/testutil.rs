//! services/generation/src/testutil.rs
//!
//! In-memory implementations of the core ports for the pipeline and action
//! tests. Call counters use atomics so tests can assert how many external
//! calls a pipeline issued (or that it issued none at all).

use async_trait::async_trait;
use courseforge_core::domain::{
    ChapterBundle, ChapterRef, ChatTurn, Difficulty, Mcq, QuizQuestion, Roadmap, RoadmapTopic,
};
use courseforge_core::ports::{
    ChapterContentService, CourseMetaService, ImageSearchService, MentorChatService, PortError,
    PortResult, QuizGenerationService, RoadmapService, SpeechToTextService, TranscriptService,
    VideoSearchService,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) fn sample_mcq(question_id: u32, subject: &str) -> Mcq {
    Mcq {
        question_id,
        question: format!("What best describes {subject}?"),
        options: vec![
            "Option A".to_string(),
            "Option B".to_string(),
            "Option C".to_string(),
            "Option D".to_string(),
        ],
        answer: "Option B".to_string(),
    }
}

pub(crate) fn sample_bundle(chapter_title: &str) -> ChapterBundle {
    let subtopics: Vec<String> = (1..=3)
        .map(|i| format!("{chapter_title} concept {i}"))
        .collect();
    ChapterBundle {
        subtopic_explanations: subtopics
            .iter()
            .map(|s| format!("A simplified fifty-word explanation of {s}."))
            .collect(),
        mcqs: subtopics
            .iter()
            .enumerate()
            .map(|(i, s)| sample_mcq(i as u32 + 1, s))
            .collect(),
        subtopics,
        youtube_search_query: format!("{chapter_title} full tutorial"),
        course_description: "Learn the subject step by step, from the basics through the advanced material.".to_string(),
        image_search_term: "learning".to_string(),
    }
}

//=========================================================================================
// Chapter / course meta LLM doubles
//=========================================================================================

#[derive(Default)]
pub(crate) struct MockContentLlm {
    pub bundle_calls: AtomicUsize,
    pub legacy_calls: AtomicUsize,
    pub summarize_calls: AtomicUsize,
    /// Outline length the last bundle call received.
    pub last_outline_len: AtomicUsize,
    /// When set, every bundle call returns this instead of the sample.
    pub bundle_override: Mutex<Option<ChapterBundle>>,
}

impl MockContentLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(bundle: ChapterBundle) -> Self {
        let mock = Self::default();
        *mock.bundle_override.lock().unwrap() = Some(bundle);
        mock
    }
}

#[async_trait]
impl ChapterContentService for MockContentLlm {
    async fn generate_chapter_bundle(
        &self,
        chapter_title: &str,
        _course_title: &str,
        course_outline: &[ChapterRef],
    ) -> PortResult<ChapterBundle> {
        self.bundle_calls.fetch_add(1, Ordering::SeqCst);
        self.last_outline_len
            .store(course_outline.len(), Ordering::SeqCst);
        if let Some(bundle) = self.bundle_override.lock().unwrap().clone() {
            return Ok(bundle);
        }
        Ok(sample_bundle(chapter_title))
    }

    async fn generate_subtopics(&self, chapter_title: &str) -> PortResult<Vec<String>> {
        self.legacy_calls.fetch_add(1, Ordering::SeqCst);
        Ok((1..=3)
            .map(|i| format!("{chapter_title} concept {i}"))
            .collect())
    }

    async fn explain_subtopic(&self, subtopic: &str) -> PortResult<String> {
        self.legacy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("A simplified fifty-word explanation of {subtopic}."))
    }

    async fn generate_video_query(&self, chapter_title: &str) -> PortResult<String> {
        self.legacy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{chapter_title} full tutorial"))
    }

    async fn generate_mcq(&self, subtopic_explanation: &str) -> PortResult<Mcq> {
        self.legacy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(sample_mcq(0, subtopic_explanation))
    }

    async fn summarize_transcript(&self, transcript: &str) -> PortResult<String> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Summary of: {transcript}"))
    }
}

#[derive(Default)]
pub(crate) struct MockCourseMeta {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CourseMetaService for MockCourseMeta {
    async fn generate_description(&self, course_title: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("A course about {course_title}, from first principles to working fluency."))
    }

    async fn generate_image_search_term(&self, _course_title: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("study".to_string())
    }
}

//=========================================================================================
// Lookup doubles
//=========================================================================================

pub(crate) struct MockVideoSearch {
    pub result: Option<String>,
    pub calls: AtomicUsize,
}

impl MockVideoSearch {
    pub fn found(video_id: &str) -> Self {
        Self {
            result: Some(video_id.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VideoSearchService for MockVideoSearch {
    async fn find_video(&self, _query: &str) -> PortResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

pub(crate) struct MockTranscripts {
    pub text: String,
}

impl MockTranscripts {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    /// Models the silent-degradation contract: a failed fetch is an empty
    /// string, indistinguishable from a video without captions.
    pub fn unavailable() -> Self {
        Self {
            text: String::new(),
        }
    }
}

#[async_trait]
impl TranscriptService for MockTranscripts {
    async fn fetch_transcript(&self, _video_id: &str) -> String {
        self.text.clone()
    }
}

pub(crate) struct MockImageSearch {
    pub result: Option<String>,
    pub calls: AtomicUsize,
}

impl MockImageSearch {
    pub fn found(url: &str) -> Self {
        Self {
            result: Some(url.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageSearchService for MockImageSearch {
    async fn find_image(&self, _term: &str) -> PortResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

//=========================================================================================
// Roadmap / quiz / voice doubles
//=========================================================================================

#[derive(Default)]
pub(crate) struct MockRoadmapLlm {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub override_roadmap: Mutex<Option<Roadmap>>,
}

impl MockRoadmapLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_roadmap(roadmap: Roadmap) -> Self {
        let mock = Self::default();
        *mock.override_roadmap.lock().unwrap() = Some(roadmap);
        mock
    }
}

#[async_trait]
impl RoadmapService for MockRoadmapLlm {
    async fn generate_roadmap(&self, roadmap_title: &str) -> PortResult<Roadmap> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PortError::SchemaViolation(
                "mock model reply did not parse".to_string(),
            ));
        }
        if let Some(roadmap) = self.override_roadmap.lock().unwrap().clone() {
            return Ok(roadmap);
        }
        Ok(Roadmap {
            title: roadmap_title.to_string(),
            topics: vec![
                RoadmapTopic {
                    title: "Foundations".to_string(),
                    subtopics: vec!["Syntax".to_string(), "Tooling".to_string()],
                },
                RoadmapTopic {
                    title: "Practice".to_string(),
                    subtopics: vec!["Projects".to_string()],
                },
            ],
        })
    }
}

#[derive(Default)]
pub(crate) struct MockQuizLlm {
    pub calls: AtomicUsize,
    /// When set, produce this many questions instead of the requested count.
    pub produce: Option<usize>,
    /// When set, emit this answer index on every question.
    pub answer_index: Option<usize>,
}

impl MockQuizLlm {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizGenerationService for MockQuizLlm {
    async fn generate_quiz(
        &self,
        course_title: &str,
        _content: &str,
        _difficulty: Difficulty,
        count: usize,
    ) -> PortResult<Vec<QuizQuestion>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let produce = self.produce.unwrap_or(count);
        Ok((0..produce)
            .map(|i| QuizQuestion {
                question: format!("Question {i} about {course_title}?"),
                options: vec![
                    "Option A".to_string(),
                    "Option B".to_string(),
                    "Option C".to_string(),
                    "Option D".to_string(),
                ],
                correct_answer: self.answer_index.unwrap_or(i % 4),
                explanation: "Because the material says so.".to_string(),
            })
            .collect())
    }
}

pub(crate) struct MockStt {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MockStt {
    pub fn transcribing() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechToTextService for MockStt {
    async fn transcribe_audio(&self, _audio_data: &[u8]) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PortError::Transcription("mock endpoint returned 500".to_string()));
        }
        Ok("How does recursion terminate?".to_string())
    }
}

#[derive(Default)]
pub(crate) struct MockMentor {
    pub calls: AtomicUsize,
    pub seen_history_len: AtomicUsize,
}

impl MockMentor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MentorChatService for MockMentor {
    async fn reply(
        &self,
        _persona_description: &str,
        history: &[ChatTurn],
        _utterance: &str,
    ) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_history_len.store(history.len(), Ordering::SeqCst);
        Ok("Every recursive call needs a base case, or it never stops!".to_string())
    }
}
