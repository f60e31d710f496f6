pub mod content;
pub mod message;
pub mod response_format;
pub mod tool;

pub use content::Content;
pub use message::Message;
pub use response_format::{JsonSchemaFormat, ResponseFormat};
pub use tool::{FunctionDefinition, Tool};
