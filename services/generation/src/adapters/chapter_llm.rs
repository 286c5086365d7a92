//! services/generation/src/adapters/chapter_llm.rs
//!
//! This module contains the adapter for chapter-level content generation.
//! It implements the `ChapterContentService` port from the `core` crate
//! against Groq's OpenAI-compatible chat endpoint, covering both the
//! comprehensive single-call schema and the fine-grained legacy calls.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use courseforge_core::{
    domain::{ChapterBundle, ChapterRef, Mcq},
    ports::{ChapterContentService, PortError, PortResult},
};
use serde::Deserialize;

use super::structured::{clamp_title, complete, format_instructions, parse_structured};

const COMPREHENSIVE_TEMPLATE: &str = r#"You are an expert AI educator and course designer. Generate comprehensive educational content for a course in a single response.

Course Title: {courseTitle}
All Chapters in This Course:
{chaptersContext}

Current Chapter to Generate: {chapterTitle}

Please generate content for the current chapter that:
1. Is coherent with the overall course progression
2. Doesn't duplicate content from other chapters
3. Complements and builds upon other chapters logically

Please provide:
1. 3 subtopics that comprehensively cover the chapter (unique and distinct from other chapters)
2. Simplified 50-word explanations for each subtopic (exactly around 50 words each)
3. A detailed YouTube search query that will find an informative educational video
4. A course description (exactly 90 characters) that describes the whole course
5. A single-word Unsplash search term for a course image
6. An MCQ question for each subtopic with 4 options and the correct answer

{formatInstructions}"#;

const COMPREHENSIVE_SCHEMA: &str = r#"{
  "subtopics": "array of 3 strings - the main subtopics that cover the chapter",
  "subtopicExplanations": "array of strings - a simplified 50-word explanation for each subtopic, in order",
  "youtubeSearchQuery": "string - detailed YouTube search query for an educational video on this topic",
  "courseDescription": "string - exactly 90 character description of the course",
  "imageSearchTerm": "string - single word search term for an Unsplash image for this course",
  "mcqs": "array of objects, one per subtopic: {\"questionId\": number, \"question\": string, \"options\": array of 4 strings, \"answer\": string matching one of the options}"
}"#;

const SUBTOPICS_TEMPLATE: &str = r#"Please create an array of 3 subtopics which covers the whole topic {chapter}.
{formatInstructions}"#;

const SUBTOPICS_SCHEMA: &str = r#"{
  "subtopics": "array of 3 strings - the subtopics covering the topic"
}"#;

const EXPLANATION_TEMPLATE: &str = "Please create an easiest explanation of the topic {topic} in most simplified way, the explanation should be exactly around 50 words.";

const VIDEO_QUERY_TEMPLATE: &str = "Please provide a detailed youtube search query for the topic {topic} that can be used to find an informative educational video. The query should give an educational informative course in youtube. The provided response should only contain a single search query and should not contain any other information.";

const MCQ_TEMPLATE: &str = r#"You are an AI capable of generating multiple choice question(mcq) using the given subtopic content. Please provide a single mcq question with 4 options and the correct answer. The question should be based on the subtopic content - {subtopicExplanation} and should be the most important question from the content given.
Please provide the question, an array of answers and the correct answer in the format mentioned in the formatting instructions, please don't include any other starting reference or any other information.
{formatInstructions}"#;

const MCQ_SCHEMA: &str = r#"{
  "mcq": {
    "questionId": "number - sequential id for the question",
    "question": "string - the MCQ question",
    "options": "array of 4 strings - the answer options",
    "answer": "string - the correct answer, matching one of the options"
  }
}"#;

const SUMMARY_TEMPLATE: &str = r#"You are an AI capable of summarising a youtube transcript, summarise in 250 words or less and do not talk of the sponsors or anything unrelated to the main topic, also do not introduce what the summary is about. Here is the transcript: {transcript}. In the result, directly start with the summary, please do not include any other reference or any information.
{formatInstructions}"#;

const SUMMARY_SCHEMA: &str = r#"{
  "summary": "string - the summary of the transcript"
}"#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChapterContentService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct GroqChapterAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqChapterAdapter {
    /// Creates a new `GroqChapterAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn user_request(&self, prompt: String) -> PortResult<CreateChatCompletionRequest> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// "Impure" Wire Structs
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterBundleWire {
    subtopics: Vec<String>,
    subtopic_explanations: Vec<String>,
    youtube_search_query: String,
    course_description: String,
    image_search_term: String,
    mcqs: Vec<McqWire>,
}

impl ChapterBundleWire {
    fn to_domain(self) -> ChapterBundle {
        ChapterBundle {
            subtopics: self.subtopics,
            subtopic_explanations: self.subtopic_explanations,
            youtube_search_query: self.youtube_search_query,
            course_description: self.course_description,
            image_search_term: self.image_search_term,
            mcqs: self.mcqs.into_iter().map(McqWire::to_domain).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct McqWire {
    // The model numbers its own output; the pipeline reassigns ids.
    #[serde(default)]
    question_id: u32,
    question: String,
    options: Vec<String>,
    answer: String,
}

impl McqWire {
    fn to_domain(self) -> Mcq {
        Mcq {
            question_id: self.question_id,
            question: self.question,
            options: self.options,
            answer: self.answer,
        }
    }
}

#[derive(Deserialize)]
struct SubtopicsWire {
    subtopics: Vec<String>,
}

#[derive(Deserialize)]
struct McqEnvelopeWire {
    mcq: McqWire,
}

#[derive(Deserialize)]
struct SummaryWire {
    summary: String,
}

//=========================================================================================
// `ChapterContentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChapterContentService for GroqChapterAdapter {
    /// Produces all per-chapter content in a single structured call, with the
    /// full course outline in the prompt for cross-chapter coherence.
    async fn generate_chapter_bundle(
        &self,
        chapter_title: &str,
        course_title: &str,
        course_outline: &[ChapterRef],
    ) -> PortResult<ChapterBundle> {
        let chapters_context = course_outline
            .iter()
            .enumerate()
            .map(|(idx, ch)| format!("{}. {}", idx + 1, ch.title))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = COMPREHENSIVE_TEMPLATE
            .replace("{courseTitle}", clamp_title(course_title))
            .replace("{chaptersContext}", &chapters_context)
            .replace("{chapterTitle}", clamp_title(chapter_title))
            .replace(
                "{formatInstructions}",
                &format_instructions(COMPREHENSIVE_SCHEMA),
            );

        let raw = complete(&self.client, self.user_request(prompt)?).await?;
        Ok(parse_structured::<ChapterBundleWire>(&raw)?.to_domain())
    }

    async fn generate_subtopics(&self, chapter_title: &str) -> PortResult<Vec<String>> {
        let prompt = SUBTOPICS_TEMPLATE
            .replace("{chapter}", clamp_title(chapter_title))
            .replace(
                "{formatInstructions}",
                &format_instructions(SUBTOPICS_SCHEMA),
            );

        let raw = complete(&self.client, self.user_request(prompt)?).await?;
        Ok(parse_structured::<SubtopicsWire>(&raw)?.subtopics)
    }

    /// Plain-text completion; the explanation has no structure to validate.
    async fn explain_subtopic(&self, subtopic: &str) -> PortResult<String> {
        let prompt = EXPLANATION_TEMPLATE.replace("{topic}", clamp_title(subtopic));
        let raw = complete(&self.client, self.user_request(prompt)?).await?;
        Ok(raw.trim().to_string())
    }

    /// Plain-text completion; the reply is the search query itself.
    async fn generate_video_query(&self, chapter_title: &str) -> PortResult<String> {
        let prompt = VIDEO_QUERY_TEMPLATE.replace("{topic}", clamp_title(chapter_title));
        let raw = complete(&self.client, self.user_request(prompt)?).await?;
        Ok(raw.trim().trim_matches('"').to_string())
    }

    async fn generate_mcq(&self, subtopic_explanation: &str) -> PortResult<Mcq> {
        let prompt = MCQ_TEMPLATE
            .replace("{subtopicExplanation}", subtopic_explanation)
            .replace("{formatInstructions}", &format_instructions(MCQ_SCHEMA));

        let raw = complete(&self.client, self.user_request(prompt)?).await?;
        Ok(parse_structured::<McqEnvelopeWire>(&raw)?.mcq.to_domain())
    }

    async fn summarize_transcript(&self, transcript: &str) -> PortResult<String> {
        let prompt = SUMMARY_TEMPLATE
            .replace("{transcript}", transcript)
            .replace("{formatInstructions}", &format_instructions(SUMMARY_SCHEMA));

        let raw = complete(&self.client, self.user_request(prompt)?).await?;
        Ok(parse_structured::<SummaryWire>(&raw)?.summary)
    }
}
