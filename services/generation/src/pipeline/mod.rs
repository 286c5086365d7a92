pub mod chapter;
pub mod quiz;
pub mod roadmap;
pub mod voice;

pub use chapter::ChapterPipeline;
pub use quiz::{credit_cost, question_count, quiz_content_excerpt, QuizPipeline};
pub use roadmap::RoadmapPipeline;
pub use voice::VoiceChatPipeline;
