//! services/generation/src/pipeline/roadmap.rs
//!
//! The roadmap pipeline: one structured generation call, no external
//! lookups, plus shape validation of the produced topic tree.

use courseforge_core::{
    domain::Roadmap,
    ports::{PortError, PortResult, RoadmapService},
};
use std::sync::Arc;
use tracing::info;

pub struct RoadmapPipeline {
    llm: Arc<dyn RoadmapService>,
}

impl RoadmapPipeline {
    pub fn new(llm: Arc<dyn RoadmapService>) -> Self {
        Self { llm }
    }

    /// Generates a roadmap for an arbitrary subject title. A topic without a
    /// title or without subtopics makes the whole roadmap unusable, so the
    /// result is rejected rather than partially returned.
    pub async fn generate(&self, roadmap_title: &str) -> PortResult<Roadmap> {
        let roadmap = self.llm.generate_roadmap(roadmap_title).await?;
        validate_roadmap(&roadmap)?;
        info!(
            "Generated roadmap '{}' with {} topics",
            roadmap.title,
            roadmap.topics.len()
        );
        Ok(roadmap)
    }
}

fn validate_roadmap(roadmap: &Roadmap) -> PortResult<()> {
    if roadmap.topics.is_empty() {
        return Err(PortError::SchemaViolation(
            "roadmap has no topics".to_string(),
        ));
    }
    for topic in &roadmap.topics {
        if topic.title.trim().is_empty() {
            return Err(PortError::SchemaViolation(
                "roadmap topic has an empty title".to_string(),
            ));
        }
        if topic.subtopics.is_empty() {
            return Err(PortError::SchemaViolation(format!(
                "roadmap topic '{}' has no subtopics",
                topic.title
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockRoadmapLlm;
    use courseforge_core::domain::RoadmapTopic;

    #[tokio::test]
    async fn well_formed_roadmap_passes_through() {
        let pipeline = RoadmapPipeline::new(Arc::new(MockRoadmapLlm::new()));
        let roadmap = pipeline.generate("Backend Development").await.unwrap();

        assert_eq!(roadmap.title, "Backend Development");
        assert!(!roadmap.topics.is_empty());
        for topic in &roadmap.topics {
            assert!(!topic.title.trim().is_empty());
            assert!(!topic.subtopics.is_empty());
        }
    }

    #[tokio::test]
    async fn topic_without_subtopics_is_rejected() {
        let roadmap = Roadmap {
            title: "Backend Development".to_string(),
            topics: vec![RoadmapTopic {
                title: "Databases".to_string(),
                subtopics: vec![],
            }],
        };
        let pipeline = RoadmapPipeline::new(Arc::new(MockRoadmapLlm::with_roadmap(roadmap)));

        let err = pipeline.generate("Backend Development").await.unwrap_err();
        assert!(matches!(err, PortError::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn roadmap_without_topics_is_rejected() {
        let roadmap = Roadmap {
            title: "Backend Development".to_string(),
            topics: vec![],
        };
        let pipeline = RoadmapPipeline::new(Arc::new(MockRoadmapLlm::with_roadmap(roadmap)));

        let err = pipeline.generate("Backend Development").await.unwrap_err();
        assert!(matches!(err, PortError::SchemaViolation(_)));
    }
}
