pub mod input_file;
pub mod log_entry;
pub mod pipeline_state;
pub mod provider;
pub mod question;

pub use input_file::{DocumentKind, FileRole, InputFile};
pub use log_entry::{LogEntry, Stage};
pub use pipeline_state::PipelineState;
pub use provider::Provider;
pub use question::{Progress, Question, QuestionStatus};
