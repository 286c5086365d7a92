pub mod chapter_llm;
pub mod course_llm;
pub mod ledger;
pub mod mentor_llm;
pub mod quiz_llm;
pub mod roadmap_llm;
pub mod stt;
pub(crate) mod structured;
pub mod unsplash;
pub mod youtube;

pub use chapter_llm::GroqChapterAdapter;
pub use course_llm::GroqCourseMetaAdapter;
pub use ledger::{InMemoryLedger, PostgresLedgerAdapter};
pub use mentor_llm::GroqMentorAdapter;
pub use quiz_llm::GroqQuizAdapter;
pub use roadmap_llm::GroqRoadmapAdapter;
pub use stt::GroqSttAdapter;
pub use unsplash::UnsplashAdapter;
pub use youtube::YoutubeAdapter;
