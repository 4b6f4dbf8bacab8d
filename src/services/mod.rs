pub mod answer_store;
pub mod extraction_service;
pub mod manual_parser;
pub mod search_service;

pub use answer_store::AnswerStore;
pub use extraction_service::ExtractionService;
pub use manual_parser::ManualParser;
pub use search_service::{SearchHit, SearchService};
