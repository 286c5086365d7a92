pub mod domain;
pub mod ports;

pub use domain::{
    ChapterBundle, ChapterContent, ChapterRef, ChatTurn, Difficulty, GenerationStrategy, Mcq,
    QuizQuestion, Roadmap, RoadmapTopic,
};
pub use ports::{
    ChapterContentService, CourseMetaService, CreditLedger, ImageSearchService, MentorChatService,
    PortError, PortResult, QuizGenerationService, RoadmapService, SpeechToTextService,
    TranscriptService, VideoSearchService,
};
