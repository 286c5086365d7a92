//! services/generation/src/adapters/course_llm.rs
//!
//! This module contains the adapter for course-level metadata generation
//! (description and image search term). It implements the `CourseMetaService`
//! port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use courseforge_core::ports::{CourseMetaService, PortError, PortResult};
use serde::Deserialize;

use super::structured::{clamp_title, complete, format_instructions, parse_structured};

const DESCRIPTION_TEMPLATE: &str = r#"You are an AI capable of generating a course description.
Please provide a good description for a course about {courseTitle}. The description should be exactly of 90 characters.
{formatInstructions}"#;

const DESCRIPTION_SCHEMA: &str = r#"{
  "description": "string - the description of the course"
}"#;

const IMAGE_TERM_TEMPLATE: &str = r#"You are an AI capable of finding the most relevant image for a course.
Please provide a good image search term for the title of a course about {courseTitle}. This search term will be fed into the unsplash API, so make sure it is a good search term that will return good results. The search term should be a single word which fits best for the course title.
{formatInstructions}"#;

const IMAGE_TERM_SCHEMA: &str = r#"{
  "imageSearchTerm": "string - single search term for the image"
}"#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CourseMetaService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct GroqCourseMetaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqCourseMetaAdapter {
    /// Creates a new `GroqCourseMetaAdapter`.
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

#[derive(Deserialize)]
struct DescriptionWire {
    description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageTermWire {
    image_search_term: String,
}

//=========================================================================================
// `CourseMetaService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CourseMetaService for GroqCourseMetaAdapter {
    async fn generate_description(&self, course_title: &str) -> PortResult<String> {
        let prompt = DESCRIPTION_TEMPLATE
            .replace("{courseTitle}", clamp_title(course_title))
            .replace(
                "{formatInstructions}",
                &format_instructions(DESCRIPTION_SCHEMA),
            );

        let raw = complete(&self.client, self.user_request(prompt)?).await?;
        Ok(parse_structured::<DescriptionWire>(&raw)?.description)
    }

    async fn generate_image_search_term(&self, course_title: &str) -> PortResult<String> {
        let prompt = IMAGE_TERM_TEMPLATE
            .replace("{courseTitle}", clamp_title(course_title))
            .replace(
                "{formatInstructions}",
                &format_instructions(IMAGE_TERM_SCHEMA),
            );

        let raw = complete(&self.client, self.user_request(prompt)?).await?;
        Ok(parse_structured::<ImageTermWire>(&raw)?.image_search_term)
    }
}
