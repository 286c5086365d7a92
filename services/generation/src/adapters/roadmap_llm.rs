//! services/generation/src/adapters/roadmap_llm.rs
//!
//! This module contains the adapter for roadmap generation. It implements
//! the `RoadmapService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use courseforge_core::{
    domain::{Roadmap, RoadmapTopic},
    ports::{PortError, PortResult, RoadmapService},
};
use serde::Deserialize;

use super::structured::{clamp_title, complete, format_instructions, parse_structured};

const ROADMAP_TEMPLATE: &str = r#"You are an AI capable of generating a roadmap for the roadmap title {roadmapTitle}.
Please provide a perfect industry standard up to date roadmap for the given roadmap title. The roadmap should contain the topics and subtopics related to the roadmap title. The roadmap should be in the format mentioned in the formatting instructions.
{formatInstructions}"#;

const ROADMAP_SCHEMA: &str = r#"{
  "title": "string - the title of the roadmap",
  "topics": "array of objects: {\"title\": string - the title of the topic, \"subtopics\": array of strings - the subtopics of the topic}"
}"#;

/// An adapter that implements `RoadmapService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct GroqRoadmapAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqRoadmapAdapter {
    /// Creates a new `GroqRoadmapAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[derive(Deserialize)]
struct RoadmapWire {
    title: String,
    topics: Vec<RoadmapTopicWire>,
}

#[derive(Deserialize)]
struct RoadmapTopicWire {
    title: String,
    subtopics: Vec<String>,
}

impl RoadmapWire {
    fn to_domain(self) -> Roadmap {
        Roadmap {
            title: self.title,
            topics: self
                .topics
                .into_iter()
                .map(|t| RoadmapTopic {
                    title: t.title,
                    subtopics: t.subtopics,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl RoadmapService for GroqRoadmapAdapter {
    async fn generate_roadmap(&self, roadmap_title: &str) -> PortResult<Roadmap> {
        let prompt = ROADMAP_TEMPLATE
            .replace("{roadmapTitle}", clamp_title(roadmap_title))
            .replace("{formatInstructions}", &format_instructions(ROADMAP_SCHEMA));

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
        Ok(parse_structured::<RoadmapWire>(&raw)?.to_domain())
    }
}
