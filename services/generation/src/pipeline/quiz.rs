//! services/generation/src/pipeline/quiz.rs
//!
//! The quiz pipeline: one structured generation call producing a fixed
//! number of questions for the requested difficulty. There is no meaningful
//! partial result for a quiz, so any shape mismatch fails loudly.

use courseforge_core::{
    domain::{ChapterContent, Difficulty, QuizQuestion},
    ports::{PortError, PortResult, QuizGenerationService},
};
use std::sync::Arc;

use super::chapter::MCQ_OPTION_COUNT;

/// How many chapters of the course feed the content excerpt.
const EXCERPT_CHAPTERS: usize = 3;

/// Questions generated per difficulty.
pub fn question_count(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 5,
        Difficulty::Medium => 10,
        Difficulty::Hard => 15,
    }
}

/// Credits debited per difficulty.
pub fn credit_cost(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 10,
        Difficulty::Medium => 20,
        Difficulty::Hard => 30,
    }
}

/// Renders the content excerpt fed to the quiz prompt: the first chapters'
/// titles and subtopics, one line each.
pub fn quiz_content_excerpt(chapters: &[ChapterContent]) -> String {
    chapters
        .iter()
        .take(EXCERPT_CHAPTERS)
        .map(|chapter| format!("{}: {}", chapter.title, chapter.subtopics.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct QuizPipeline {
    llm: Arc<dyn QuizGenerationService>,
}

impl QuizPipeline {
    pub fn new(llm: Arc<dyn QuizGenerationService>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        course_title: &str,
        content: &str,
        difficulty: Difficulty,
    ) -> PortResult<Vec<QuizQuestion>> {
        let count = question_count(difficulty);
        let questions = self
            .llm
            .generate_quiz(course_title, content, difficulty, count)
            .await?;
        validate_quiz(&questions, count)?;
        Ok(questions)
    }
}

fn validate_quiz(questions: &[QuizQuestion], expected: usize) -> PortResult<()> {
    if questions.len() != expected {
        return Err(PortError::SchemaViolation(format!(
            "expected {} quiz questions, model produced {}",
            expected,
            questions.len()
        )));
    }
    for question in questions {
        if question.options.len() != MCQ_OPTION_COUNT {
            return Err(PortError::SchemaViolation(format!(
                "quiz question '{}' has {} options instead of {}",
                question.question,
                question.options.len(),
                MCQ_OPTION_COUNT
            )));
        }
        if question.correct_answer >= question.options.len() {
            return Err(PortError::SchemaViolation(format!(
                "quiz question '{}' has answer index {} out of range",
                question.question, question.correct_answer
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sample_bundle, MockQuizLlm};

    fn chapter(title: &str) -> ChapterContent {
        let bundle = sample_bundle(title);
        ChapterContent {
            title: title.to_string(),
            subtopics: bundle.subtopics,
            subtopic_explanations: bundle.subtopic_explanations,
            youtube_search_query: bundle.youtube_search_query,
            video_id: None,
            summary: String::new(),
            description: bundle.course_description,
            image_search_term: bundle.image_search_term,
            image_url: None,
            mcqs: bundle.mcqs,
        }
    }

    #[tokio::test]
    async fn hard_difficulty_yields_fifteen_questions() {
        let pipeline = QuizPipeline::new(Arc::new(MockQuizLlm::new()));
        let questions = pipeline
            .generate("Data Structures", "excerpt", Difficulty::Hard)
            .await
            .unwrap();

        assert_eq!(questions.len(), 15);
        for question in &questions {
            assert_eq!(question.options.len(), 4);
            assert!(question.correct_answer <= 3);
        }
    }

    #[tokio::test]
    async fn short_count_fails_loudly() {
        let llm = MockQuizLlm {
            produce: Some(7),
            ..MockQuizLlm::new()
        };
        let pipeline = QuizPipeline::new(Arc::new(llm));

        let err = pipeline
            .generate("Data Structures", "excerpt", Difficulty::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn answer_index_out_of_range_fails_loudly() {
        let llm = MockQuizLlm {
            answer_index: Some(4),
            ..MockQuizLlm::new()
        };
        let pipeline = QuizPipeline::new(Arc::new(llm));

        let err = pipeline
            .generate("Data Structures", "excerpt", Difficulty::Easy)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::SchemaViolation(_)));
    }

    #[test]
    fn excerpt_covers_only_the_first_three_chapters() {
        let chapters: Vec<ChapterContent> = ["Recursion", "Sorting", "Hashing", "Graphs"]
            .iter()
            .map(|t| chapter(t))
            .collect();

        let excerpt = quiz_content_excerpt(&chapters);
        let lines: Vec<&str> = excerpt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Recursion: "));
        assert!(!excerpt.contains("Graphs"));
    }
}
