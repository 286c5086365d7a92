//! services/generation/src/pipeline/chapter.rs
//!
//! The chapter/course orchestrator. Composes the structured-generation ports
//! with the external lookup ports into one pipeline, behind two
//! interchangeable strategies: the optimized single-call path and the legacy
//! multi-call path. Both produce the same `ChapterContent` shape and pass the
//! same invariant validation.

use courseforge_core::{
    domain::{ChapterContent, ChapterRef, GenerationStrategy, Mcq},
    ports::{
        ChapterContentService, CourseMetaService, ImageSearchService, PortError, PortResult,
        TranscriptService, VideoSearchService,
    },
};
use std::sync::Arc;
use tracing::{debug, info};

/// Every chapter is covered by exactly this many subtopics, and carries one
/// explanation and one MCQ per subtopic.
pub(crate) const SUBTOPIC_COUNT: usize = 3;
pub(crate) const MCQ_OPTION_COUNT: usize = 4;

//=========================================================================================
// The Pipeline
//=========================================================================================

pub struct ChapterPipeline {
    content: Arc<dyn ChapterContentService>,
    meta: Arc<dyn CourseMetaService>,
    videos: Arc<dyn VideoSearchService>,
    transcripts: Arc<dyn TranscriptService>,
    images: Arc<dyn ImageSearchService>,
    strategy: GenerationStrategy,
}

impl ChapterPipeline {
    pub fn new(
        content: Arc<dyn ChapterContentService>,
        meta: Arc<dyn CourseMetaService>,
        videos: Arc<dyn VideoSearchService>,
        transcripts: Arc<dyn TranscriptService>,
        images: Arc<dyn ImageSearchService>,
        strategy: GenerationStrategy,
    ) -> Self {
        Self {
            content,
            meta,
            videos,
            transcripts,
            images,
            strategy,
        }
    }

    /// Generates one chapter. MCQ ids are assigned sequentially from 1.
    pub async fn generate_chapter(
        &self,
        chapter_title: &str,
        course_title: &str,
        all_chapters: &[ChapterRef],
    ) -> PortResult<ChapterContent> {
        let mut content = self
            .generate_chapter_content(chapter_title, course_title, all_chapters)
            .await?;
        let mut next_question_id = 1;
        renumber_mcqs(&mut content.mcqs, &mut next_question_id);
        Ok(content)
    }

    /// Generates every chapter of a course, strictly sequentially: one
    /// chapter's full pipeline completes before the next begins, which bounds
    /// concurrent external-API load. MCQ ids increase monotonically across
    /// the whole batch.
    pub async fn generate_course(
        &self,
        chapters: &[ChapterRef],
        course_title: &str,
    ) -> PortResult<Vec<ChapterContent>> {
        let mut generated = Vec::with_capacity(chapters.len());
        let mut next_question_id = 1;
        for chapter in chapters {
            info!("Generating chapter '{}'", chapter.title);
            let mut content = self
                .generate_chapter_content(&chapter.title, course_title, chapters)
                .await?;
            renumber_mcqs(&mut content.mcqs, &mut next_question_id);
            generated.push(content);
        }
        Ok(generated)
    }

    /// Standalone course-level description, independent of any chapter.
    pub async fn generate_course_description(&self, course_title: &str) -> PortResult<String> {
        self.meta.generate_description(course_title).await
    }

    /// Standalone course-level image: term generation plus lookup.
    pub async fn generate_course_image(&self, course_title: &str) -> PortResult<Option<String>> {
        let term = self.meta.generate_image_search_term(course_title).await?;
        debug!("Image search term for '{}': '{}'", course_title, term);
        self.images.find_image(&term).await
    }

    async fn generate_chapter_content(
        &self,
        chapter_title: &str,
        course_title: &str,
        all_chapters: &[ChapterRef],
    ) -> PortResult<ChapterContent> {
        match self.strategy {
            GenerationStrategy::Optimized => {
                self.generate_optimized(chapter_title, course_title, all_chapters)
                    .await
            }
            GenerationStrategy::Legacy => self.generate_legacy(chapter_title, course_title).await,
        }
    }

    /// One comprehensive model call, then external resolution. Video and
    /// image lookups have no data dependency and run concurrently; the
    /// transcript summary runs strictly after the video resolves.
    async fn generate_optimized(
        &self,
        chapter_title: &str,
        course_title: &str,
        all_chapters: &[ChapterRef],
    ) -> PortResult<ChapterContent> {
        // An empty outline still has to yield a well-formed prompt.
        let fallback = [ChapterRef {
            id: 1,
            title: chapter_title.to_string(),
        }];
        let outline = if all_chapters.is_empty() {
            &fallback[..]
        } else {
            all_chapters
        };

        let bundle = self
            .content
            .generate_chapter_bundle(chapter_title, course_title, outline)
            .await?;
        validate_bundle_shape(
            bundle.subtopics.len(),
            bundle.subtopic_explanations.len(),
            bundle.mcqs.len(),
        )?;
        for mcq in &bundle.mcqs {
            validate_mcq(mcq)?;
        }

        let (video_id, image_url) = tokio::join!(
            self.videos.find_video(&bundle.youtube_search_query),
            self.resolve_image(course_title, &bundle.image_search_term),
        );
        let video_id = video_id?;
        let image_url = image_url?;
        let summary = self.resolve_summary(video_id.as_deref()).await?;

        Ok(ChapterContent {
            title: chapter_title.to_string(),
            subtopics: bundle.subtopics,
            subtopic_explanations: bundle.subtopic_explanations,
            youtube_search_query: bundle.youtube_search_query,
            video_id,
            summary,
            description: bundle.course_description,
            image_search_term: bundle.image_search_term,
            image_url,
            mcqs: bundle.mcqs,
        })
    }

    /// The historical multi-call path: one model call per content piece,
    /// looping over subtopics, everything sequential.
    async fn generate_legacy(
        &self,
        chapter_title: &str,
        course_title: &str,
    ) -> PortResult<ChapterContent> {
        let subtopics = self.content.generate_subtopics(chapter_title).await?;
        if subtopics.len() != SUBTOPIC_COUNT {
            return Err(PortError::SchemaViolation(format!(
                "expected {} subtopics, model produced {}",
                SUBTOPIC_COUNT,
                subtopics.len()
            )));
        }

        let mut subtopic_explanations = Vec::with_capacity(subtopics.len());
        for subtopic in &subtopics {
            subtopic_explanations.push(self.content.explain_subtopic(subtopic).await?);
        }

        let youtube_search_query = self.content.generate_video_query(chapter_title).await?;
        let video_id = self.videos.find_video(&youtube_search_query).await?;
        let summary = self.resolve_summary(video_id.as_deref()).await?;

        let description = self.meta.generate_description(course_title).await?;
        let image_search_term = self.meta.generate_image_search_term(course_title).await?;
        let image_url = self.resolve_image(course_title, &image_search_term).await?;

        let mut mcqs = Vec::with_capacity(subtopic_explanations.len());
        for explanation in &subtopic_explanations {
            let mcq = self.content.generate_mcq(explanation).await?;
            validate_mcq(&mcq)?;
            mcqs.push(mcq);
        }

        Ok(ChapterContent {
            title: chapter_title.to_string(),
            subtopics,
            subtopic_explanations,
            youtube_search_query,
            video_id,
            summary,
            description,
            image_search_term,
            image_url,
            mcqs,
        })
    }

    /// Image lookup is tied to a course: with no course title there is
    /// nothing to attach the image to, so resolution is skipped.
    async fn resolve_image(
        &self,
        course_title: &str,
        image_search_term: &str,
    ) -> PortResult<Option<String>> {
        if course_title.is_empty() {
            return Ok(None);
        }
        self.images.find_image(image_search_term).await
    }

    /// Transcript and summary resolution. "No video" and "no transcript" are
    /// valid terminal states: the summary stays empty and no summarization
    /// call is made.
    async fn resolve_summary(&self, video_id: Option<&str>) -> PortResult<String> {
        let Some(video_id) = video_id else {
            return Ok(String::new());
        };
        let transcript = self.transcripts.fetch_transcript(video_id).await;
        if transcript.is_empty() {
            debug!("No transcript for video '{}', skipping summary", video_id);
            return Ok(String::new());
        }
        self.content.summarize_transcript(&transcript).await
    }
}

//=========================================================================================
// Invariant Validation
//=========================================================================================

fn validate_bundle_shape(
    subtopics: usize,
    explanations: usize,
    mcqs: usize,
) -> PortResult<()> {
    if subtopics != SUBTOPIC_COUNT {
        return Err(PortError::SchemaViolation(format!(
            "expected {SUBTOPIC_COUNT} subtopics, model produced {subtopics}"
        )));
    }
    if explanations != subtopics {
        return Err(PortError::SchemaViolation(format!(
            "{subtopics} subtopics but {explanations} explanations"
        )));
    }
    if mcqs != subtopics {
        return Err(PortError::SchemaViolation(format!(
            "{subtopics} subtopics but {mcqs} MCQs"
        )));
    }
    Ok(())
}

/// An MCQ whose answer is not among its options is unusable for grading, so
/// the pipeline rejects it rather than repairing it.
fn validate_mcq(mcq: &Mcq) -> PortResult<()> {
    if mcq.options.len() != MCQ_OPTION_COUNT {
        return Err(PortError::SchemaViolation(format!(
            "MCQ '{}' has {} options instead of {}",
            mcq.question,
            mcq.options.len(),
            MCQ_OPTION_COUNT
        )));
    }
    let answer = mcq.answer.trim();
    if !mcq.options.iter().any(|option| option.trim() == answer) {
        return Err(PortError::SchemaViolation(format!(
            "MCQ '{}' answer is not among its options",
            mcq.question
        )));
    }
    Ok(())
}

fn renumber_mcqs(mcqs: &mut [Mcq], next_question_id: &mut u32) {
    for mcq in mcqs {
        mcq.question_id = *next_question_id;
        *next_question_id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        sample_bundle, MockContentLlm, MockCourseMeta, MockImageSearch, MockTranscripts,
        MockVideoSearch,
    };
    use std::sync::atomic::Ordering;

    fn outline() -> Vec<ChapterRef> {
        vec![
            ChapterRef {
                id: 1,
                title: "Recursion".to_string(),
            },
            ChapterRef {
                id: 2,
                title: "Sorting".to_string(),
            },
        ]
    }

    struct Fixture {
        content: Arc<MockContentLlm>,
        meta: Arc<MockCourseMeta>,
        videos: Arc<MockVideoSearch>,
        transcripts: Arc<MockTranscripts>,
        images: Arc<MockImageSearch>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                content: Arc::new(MockContentLlm::new()),
                meta: Arc::new(MockCourseMeta::default()),
                videos: Arc::new(MockVideoSearch::found("vid123")),
                transcripts: Arc::new(MockTranscripts::with_text("a transcript of the video")),
                images: Arc::new(MockImageSearch::found("https://images.example/small.jpg")),
            }
        }

        fn pipeline(&self, strategy: GenerationStrategy) -> ChapterPipeline {
            ChapterPipeline::new(
                self.content.clone(),
                self.meta.clone(),
                self.videos.clone(),
                self.transcripts.clone(),
                self.images.clone(),
                strategy,
            )
        }
    }

    #[tokio::test]
    async fn optimized_chapter_keeps_cardinalities_aligned() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        let chapter = pipeline
            .generate_chapter("Recursion", "Data Structures", &outline())
            .await
            .unwrap();

        assert_eq!(chapter.subtopics.len(), 3);
        assert_eq!(chapter.subtopic_explanations.len(), chapter.subtopics.len());
        assert_eq!(chapter.mcqs.len(), chapter.subtopics.len());
        assert_eq!(
            chapter.mcqs.iter().map(|m| m.question_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(chapter.video_id.as_deref(), Some("vid123"));
        assert!(chapter.summary.starts_with("Summary of:"));
        assert!(chapter.image_url.is_some());
        // Coherence: the sibling chapter's domain must not leak in verbatim.
        assert!(chapter.subtopics.iter().all(|s| s != "Sorting"));
        assert_eq!(fx.content.bundle_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.content.legacy_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_image_result_resolves_to_none() {
        let mut fx = Fixture::new();
        fx.images = Arc::new(MockImageSearch::empty());
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        let chapter = pipeline
            .generate_chapter("Recursion", "Data Structures", &outline())
            .await
            .unwrap();

        assert_eq!(chapter.image_url, None);
        assert_eq!(fx.images.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_video_is_a_valid_terminal_state() {
        let mut fx = Fixture::new();
        fx.videos = Arc::new(MockVideoSearch::empty());
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        let chapter = pipeline
            .generate_chapter("Recursion", "Data Structures", &outline())
            .await
            .unwrap();

        assert_eq!(chapter.video_id, None);
        assert_eq!(chapter.summary, "");
        assert_eq!(fx.content.summarize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unavailable_transcript_skips_the_summary_call() {
        let mut fx = Fixture::new();
        fx.transcripts = Arc::new(MockTranscripts::unavailable());
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        let chapter = pipeline
            .generate_chapter("Recursion", "Data Structures", &outline())
            .await
            .unwrap();

        assert_eq!(chapter.video_id.as_deref(), Some("vid123"));
        assert_eq!(chapter.summary, "");
        assert_eq!(fx.content.summarize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_course_title_skips_image_resolution() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        let chapter = pipeline
            .generate_chapter("Recursion", "", &outline())
            .await
            .unwrap();

        assert_eq!(chapter.image_url, None);
        assert_eq!(fx.images.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_outline_defaults_to_the_current_chapter() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        pipeline
            .generate_chapter("Recursion", "Data Structures", &[])
            .await
            .unwrap();

        assert_eq!(fx.content.last_outline_len.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn mismatched_explanation_count_is_rejected() {
        let mut bundle = sample_bundle("Recursion");
        bundle.subtopic_explanations.pop();
        let fx = Fixture {
            content: Arc::new(MockContentLlm::with_bundle(bundle)),
            ..Fixture::new()
        };
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        let err = pipeline
            .generate_chapter("Recursion", "Data Structures", &outline())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn answer_outside_options_is_rejected() {
        let mut bundle = sample_bundle("Recursion");
        bundle.mcqs[1].answer = "Option Z".to_string();
        let fx = Fixture {
            content: Arc::new(MockContentLlm::with_bundle(bundle)),
            ..Fixture::new()
        };
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        let err = pipeline
            .generate_chapter("Recursion", "Data Structures", &outline())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn question_ids_increase_across_the_whole_course() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(GenerationStrategy::Optimized);

        let chapters = pipeline
            .generate_course(&outline(), "Data Structures")
            .await
            .unwrap();

        let ids: Vec<u32> = chapters
            .iter()
            .flat_map(|c| c.mcqs.iter().map(|m| m.question_id))
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn legacy_strategy_produces_the_same_shape() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(GenerationStrategy::Legacy);

        let chapter = pipeline
            .generate_chapter("Recursion", "Data Structures", &outline())
            .await
            .unwrap();

        assert_eq!(chapter.subtopics.len(), 3);
        assert_eq!(chapter.subtopic_explanations.len(), 3);
        assert_eq!(chapter.mcqs.len(), 3);
        assert_eq!(
            chapter.mcqs.iter().map(|m| m.question_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(chapter.video_id.is_some());
        assert!(!chapter.description.is_empty());
        // 1 subtopics + 3 explanations + 1 video query + 3 MCQs
        assert_eq!(fx.content.legacy_calls.load(Ordering::SeqCst), 8);
        assert_eq!(fx.content.bundle_calls.load(Ordering::SeqCst), 0);
    }
}
