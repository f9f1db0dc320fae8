#![forbid(unsafe_code)]

pub mod error;
pub mod http_source;
pub mod image_fetcher;
pub mod question_source;
pub mod quiz_service;

pub use quiz_core::Clock;

pub use error::{CorpusLoadError, QuestionFetchError};
pub use http_source::HttpQuestionSource;
pub use image_fetcher::{
    HttpImageFetcher, ImageEvent, ImageFetcher, ImageProbe, ScriptedImageFetcher,
};
pub use question_source::{CorpusSelector, InMemoryQuestionSource, QuestionSource};
pub use quiz_service::QuizService;
