//! services/generation/src/adapters/quiz_llm.rs
//!
//! This module contains the adapter for quiz generation. It implements the
//! `QuizGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use courseforge_core::{
    domain::{Difficulty, QuizQuestion},
    ports::{PortError, PortResult, QuizGenerationService},
};
use serde::Deserialize;

use super::structured::{clamp_title, complete, format_instructions, parse_structured};

const QUIZ_TEMPLATE: &str = r#"You are an expert quiz creator. Generate {count} quiz questions about: {courseTitle}

Course Content: {content}

Create clear, educational quiz questions with 4 options each and include explanations.
Difficulty level: {difficulty}

{formatInstructions}"#;

const QUIZ_SCHEMA: &str = r#"{
  "questions": "array of exactly {count} objects: {\"question\": string - the quiz question, \"options\": array of 4 answer options, \"correctAnswer\": number - index of the correct answer (0-3), \"explanation\": string - explanation of the correct answer}"
}"#;

/// An adapter that implements `QuizGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct GroqQuizAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqQuizAdapter {
    /// Creates a new `GroqQuizAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[derive(Deserialize)]
struct QuizWire {
    questions: Vec<QuizQuestionWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizQuestionWire {
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: String,
}

impl QuizQuestionWire {
    fn to_domain(self) -> QuizQuestion {
        QuizQuestion {
            question: self.question,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
        }
    }
}

#[async_trait]
impl QuizGenerationService for GroqQuizAdapter {
    async fn generate_quiz(
        &self,
        course_title: &str,
        content: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> PortResult<Vec<QuizQuestion>> {
        let difficulty_str = match difficulty {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };

        let count_str = count.to_string();
        let prompt = QUIZ_TEMPLATE
            .replace("{count}", &count_str)
            .replace("{courseTitle}", clamp_title(course_title))
            .replace("{content}", content)
            .replace("{difficulty}", difficulty_str)
            .replace(
                "{formatInstructions}",
                &format_instructions(&QUIZ_SCHEMA.replace("{count}", &count_str)),
            );

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let raw = complete(&self.client, request).await?;
        let quiz = parse_structured::<QuizWire>(&raw)?;
        Ok(quiz
            .questions
            .into_iter()
            .map(QuizQuestionWire::to_domain)
            .collect())
    }
}
