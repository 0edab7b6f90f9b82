mod history;
mod variables;

pub use history::ConversationHistory;
pub use variables::ContextVariables;
