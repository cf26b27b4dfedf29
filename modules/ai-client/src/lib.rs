pub mod error;
pub mod gemini;
pub mod retry;
pub mod schema;
pub mod tool;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use gemini::Gemini;
pub use retry::RetryPolicy;
pub use schema::StructuredOutput;
pub use tool::{DynTool, Tool, ToolDefinition, ToolWrapper};
pub use traits::{Agent, Message, MessageRole, OutputBuilder, PromptBuilder};
pub use util::truncate_to_char_boundary;
