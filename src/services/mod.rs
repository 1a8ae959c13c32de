pub mod document_reader;
pub mod document_writer;
pub mod llm_service;

pub use document_writer::DocumentWriter;
pub use llm_service::LlmService;
