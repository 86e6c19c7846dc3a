pub mod definition;
pub mod error;
pub mod types;

pub use definition::AgentDefinition;
pub use error::AgentError;
pub use types::{Conversation, Message, Role};
