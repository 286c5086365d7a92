//! services/generation/src/bootstrap.rs
//!
//! Builds the full adapter stack from configuration. Downstream callers
//! (server actions, jobs, the smoke binary) get one `GenerationActions`
//! value and never touch the concrete adapters.

use crate::actions::GenerationActions;
use crate::adapters::{
    GroqChapterAdapter, GroqCourseMetaAdapter, GroqMentorAdapter, GroqQuizAdapter,
    GroqRoadmapAdapter, GroqSttAdapter, PostgresLedgerAdapter, UnsplashAdapter, YoutubeAdapter,
};
use crate::config::Config;
use crate::error::GenerationError;
use crate::pipeline::{ChapterPipeline, QuizPipeline, RoadmapPipeline, VoiceChatPipeline};
use async_openai::{config::OpenAIConfig, Client};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber with the configured level.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connects the ledger database and wires every adapter into the actions.
pub async fn build_actions(config: &Config) -> Result<GenerationActions, GenerationError> {
    info!("Connecting to ledger database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let ledger = Arc::new(PostgresLedgerAdapter::new(pool));
    info!("Running ledger migrations...");
    ledger.run_migrations().await?;

    let groq_config = OpenAIConfig::new()
        .with_api_key(config.groq_api_key.clone())
        .with_api_base(config.groq_api_base.clone());
    let groq_client = Client::with_config(groq_config);
    let http = reqwest::Client::new();

    let chapter_llm = Arc::new(GroqChapterAdapter::new(
        groq_client.clone(),
        config.chat_model.clone(),
    ));
    let course_llm = Arc::new(GroqCourseMetaAdapter::new(
        groq_client.clone(),
        config.chat_model.clone(),
    ));
    let youtube = Arc::new(YoutubeAdapter::new(
        http.clone(),
        config.youtube_api_key.clone(),
    ));
    let unsplash = Arc::new(UnsplashAdapter::new(
        http,
        config.unsplash_access_key.clone(),
    ));

    let chapters = ChapterPipeline::new(
        chapter_llm,
        course_llm,
        youtube.clone(),
        youtube,
        unsplash,
        config.strategy,
    );
    let roadmaps = RoadmapPipeline::new(Arc::new(GroqRoadmapAdapter::new(
        groq_client.clone(),
        config.chat_model.clone(),
    )));
    let quizzes = QuizPipeline::new(Arc::new(GroqQuizAdapter::new(
        groq_client.clone(),
        config.chat_model.clone(),
    )));
    let voice = VoiceChatPipeline::new(
        Arc::new(GroqSttAdapter::new(
            groq_client.clone(),
            config.stt_model.clone(),
        )),
        Arc::new(GroqMentorAdapter::new(
            groq_client,
            config.chat_model.clone(),
        )),
    );

    Ok(GenerationActions::new(
        ledger, chapters, roadmaps, quizzes, voice,
    ))
}
