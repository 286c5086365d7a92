//! services/generation/src/actions.rs
//!
//! The credit-gated entry points of the service. Every costed action follows
//! the same protocol: read the balance and short-circuit before ANY external
//! call if it does not cover the cost, run the pipeline, then debit
//! atomically only after success. A failed generation never consumes
//! credits.

use crate::error::GenerationError;
use crate::pipeline::{
    credit_cost, quiz_content_excerpt, ChapterPipeline, QuizPipeline, RoadmapPipeline,
    VoiceChatPipeline,
};
use courseforge_core::{
    domain::{ChapterContent, ChapterRef, ChatTurn, Difficulty, QuizQuestion, Roadmap},
    ports::CreditLedger,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const ROADMAP_CREDIT_COST: u32 = 25;
pub const COURSE_BASE_COST: u32 = 50;
pub const COURSE_EXTRA_CHAPTER_COST: u32 = 25;

/// Voice usage is metered at 0.5 credits per second, billed in 10-second
/// ticks driven by the caller.
pub const VOICE_TICK_SECONDS: u32 = 10;
pub const VOICE_TICK_COST: u32 = 5;

/// Cost of generating a whole course: the first chapter plus a reduced rate
/// for each additional one.
pub fn course_credit_cost(chapter_count: usize) -> u32 {
    let extra = chapter_count.saturating_sub(1) as u32;
    COURSE_BASE_COST + extra * COURSE_EXTRA_CHAPTER_COST
}

pub struct GenerationActions {
    ledger: Arc<dyn CreditLedger>,
    chapters: ChapterPipeline,
    roadmaps: RoadmapPipeline,
    quizzes: QuizPipeline,
    voice: VoiceChatPipeline,
}

impl GenerationActions {
    pub fn new(
        ledger: Arc<dyn CreditLedger>,
        chapters: ChapterPipeline,
        roadmaps: RoadmapPipeline,
        quizzes: QuizPipeline,
        voice: VoiceChatPipeline,
    ) -> Self {
        Self {
            ledger,
            chapters,
            roadmaps,
            quizzes,
            voice,
        }
    }

    /// Generates every chapter of a course, charging
    /// `50 + (chapters - 1) * 25` credits.
    pub async fn create_course(
        &self,
        user_id: Uuid,
        course_title: &str,
        chapters: &[ChapterRef],
    ) -> Result<Vec<ChapterContent>, GenerationError> {
        let cost = course_credit_cost(chapters.len());
        self.ensure_credits(user_id, cost).await?;

        let generated = self.chapters.generate_course(chapters, course_title).await?;

        self.settle(user_id, cost).await?;
        info!(
            "Generated course '{}' with {} chapters for user {}",
            course_title,
            generated.len(),
            user_id
        );
        Ok(generated)
    }

    /// Generates a learning roadmap, charging a fixed 25 credits.
    pub async fn create_roadmap(
        &self,
        user_id: Uuid,
        roadmap_title: &str,
    ) -> Result<Roadmap, GenerationError> {
        self.ensure_credits(user_id, ROADMAP_CREDIT_COST).await?;

        let roadmap = self.roadmaps.generate(roadmap_title).await?;

        self.settle(user_id, ROADMAP_CREDIT_COST).await?;
        Ok(roadmap)
    }

    /// Generates a quiz from course content, charging 10/20/30 credits for
    /// easy/medium/hard.
    pub async fn create_quiz(
        &self,
        user_id: Uuid,
        course_title: &str,
        content: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<QuizQuestion>, GenerationError> {
        let cost = credit_cost(difficulty);
        self.ensure_credits(user_id, cost).await?;

        let questions = self
            .quizzes
            .generate(course_title, content, difficulty)
            .await?;

        self.settle(user_id, cost).await?;
        Ok(questions)
    }

    /// Renders the content excerpt the quiz prompt consumes: the first
    /// chapters' titles and subtopics.
    pub fn quiz_content(&self, chapters: &[ChapterContent]) -> String {
        quiz_content_excerpt(chapters)
    }

    /// Runs one voice-chat turn. Not debited here: voice usage is metered
    /// time-based through `meter_voice_usage`, driven by the caller.
    pub async fn voice_chat_turn(
        &self,
        prior_turns: &[ChatTurn],
        audio_clip: &[u8],
        persona_description: &str,
    ) -> Result<ChatTurn, GenerationError> {
        Ok(self
            .voice
            .respond(prior_turns, audio_clip, persona_description)
            .await?)
    }

    /// Debits one voice tick (10 seconds at 0.5 credits/second) and returns
    /// the remaining balance.
    pub async fn meter_voice_usage(&self, user_id: Uuid) -> Result<u32, GenerationError> {
        self.ensure_credits(user_id, VOICE_TICK_COST).await?;
        self.settle(user_id, VOICE_TICK_COST).await?;
        Ok(self.ledger.balance(user_id).await?)
    }

    /// The up-front sufficiency check. Short-circuits the whole pipeline
    /// before any external call is made.
    async fn ensure_credits(&self, user_id: Uuid, required: u32) -> Result<(), GenerationError> {
        let available = self.ledger.balance(user_id).await?;
        if available < required {
            warn!(
                "User {} has {} credits, needs {}",
                user_id, available, required
            );
            return Err(GenerationError::InsufficientCredits {
                required,
                available,
            });
        }
        Ok(())
    }

    /// The post-success debit. `try_debit` is atomic, so a concurrent action
    /// that drained the balance in the meantime surfaces here instead of
    /// driving the ledger below zero.
    async fn settle(&self, user_id: Uuid, amount: u32) -> Result<(), GenerationError> {
        if !self.ledger.try_debit(user_id, amount).await? {
            let available = self.ledger.balance(user_id).await?;
            return Err(GenerationError::InsufficientCredits {
                required: amount,
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryLedger;
    use crate::testutil::{
        MockContentLlm, MockCourseMeta, MockImageSearch, MockMentor, MockQuizLlm, MockRoadmapLlm,
        MockStt, MockTranscripts, MockVideoSearch,
    };
    use courseforge_core::domain::GenerationStrategy;
    use std::sync::atomic::Ordering;

    struct Fixture {
        ledger: Arc<InMemoryLedger>,
        roadmap_llm: Arc<MockRoadmapLlm>,
        quiz_llm: Arc<MockQuizLlm>,
        user: Uuid,
    }

    impl Fixture {
        fn new(credits: u32) -> Self {
            let ledger = Arc::new(InMemoryLedger::new());
            let user = Uuid::new_v4();
            ledger.grant(user, credits);
            Self {
                ledger,
                roadmap_llm: Arc::new(MockRoadmapLlm::new()),
                quiz_llm: Arc::new(MockQuizLlm::new()),
                user,
            }
        }

        fn actions(&self) -> GenerationActions {
            let chapters = ChapterPipeline::new(
                Arc::new(MockContentLlm::new()),
                Arc::new(MockCourseMeta::default()),
                Arc::new(MockVideoSearch::found("vid123")),
                Arc::new(MockTranscripts::with_text("a transcript")),
                Arc::new(MockImageSearch::found("https://images.example/small.jpg")),
                GenerationStrategy::Optimized,
            );
            GenerationActions::new(
                self.ledger.clone(),
                chapters,
                RoadmapPipeline::new(self.roadmap_llm.clone()),
                QuizPipeline::new(self.quiz_llm.clone()),
                VoiceChatPipeline::new(
                    Arc::new(MockStt::transcribing()),
                    Arc::new(MockMentor::new()),
                ),
            )
        }

        async fn balance(&self) -> u32 {
            use courseforge_core::ports::CreditLedger as _;
            self.ledger.balance(self.user).await.unwrap()
        }
    }

    #[tokio::test]
    async fn insufficient_credits_short_circuits_before_any_model_call() {
        let fx = Fixture::new(10);
        let err = fx
            .actions()
            .create_roadmap(fx.user, "Backend Development")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::InsufficientCredits {
                required: 25,
                available: 10
            }
        ));
        assert_eq!(fx.roadmap_llm.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.balance().await, 10);
    }

    #[tokio::test]
    async fn successful_roadmap_debits_exactly_its_cost() {
        let fx = Fixture::new(30);
        let roadmap = fx
            .actions()
            .create_roadmap(fx.user, "Backend Development")
            .await
            .unwrap();

        assert_eq!(roadmap.title, "Backend Development");
        assert_eq!(fx.balance().await, 5);
    }

    #[tokio::test]
    async fn failed_generation_never_consumes_credits() {
        let mut fx = Fixture::new(100);
        fx.roadmap_llm = Arc::new(MockRoadmapLlm::failing());

        let err = fx
            .actions()
            .create_roadmap(fx.user, "Backend Development")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Port(_)));
        assert_eq!(fx.balance().await, 100);
    }

    #[tokio::test]
    async fn hard_quiz_costs_thirty_and_returns_fifteen_questions() {
        let fx = Fixture::new(30);
        let questions = fx
            .actions()
            .create_quiz(fx.user, "Data Structures", "excerpt", Difficulty::Hard)
            .await
            .unwrap();

        assert_eq!(questions.len(), 15);
        assert_eq!(fx.balance().await, 0);
    }

    #[tokio::test]
    async fn course_cost_scales_with_chapter_count() {
        assert_eq!(course_credit_cost(1), 50);
        assert_eq!(course_credit_cost(3), 100);

        let fx = Fixture::new(100);
        let chapters = vec![
            ChapterRef {
                id: 1,
                title: "Recursion".to_string(),
            },
            ChapterRef {
                id: 2,
                title: "Sorting".to_string(),
            },
            ChapterRef {
                id: 3,
                title: "Hashing".to_string(),
            },
        ];
        let generated = fx
            .actions()
            .create_course(fx.user, "Data Structures", &chapters)
            .await
            .unwrap();

        assert_eq!(generated.len(), 3);
        assert_eq!(fx.balance().await, 0);
    }

    #[tokio::test]
    async fn voice_turn_is_not_debited_but_the_meter_is() {
        let fx = Fixture::new(12);
        let actions = fx.actions();

        let turn = actions
            .voice_chat_turn(&[], &[0u8; 64], "a patient algorithms mentor")
            .await
            .unwrap();
        assert!(!turn.response.is_empty());
        assert_eq!(fx.balance().await, 12);

        let remaining = actions.meter_voice_usage(fx.user).await.unwrap();
        assert_eq!(remaining, 7);

        let remaining = actions.meter_voice_usage(fx.user).await.unwrap();
        assert_eq!(remaining, 2);

        let err = actions.meter_voice_usage(fx.user).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InsufficientCredits { required: 5, .. }
        ));
    }
}
