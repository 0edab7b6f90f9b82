pub mod error;
pub mod constants;
pub mod llm;
pub mod tools;
pub mod context;
pub mod config;
pub mod agent;

// Re-export key types
pub use error::SwarmError;
pub use agent::{Agent, Delim, Response, Roster, RunOptions, Swarm, SwarmEvent};
pub use llm::{ChatRequest, LlmClient, LlmResponse, Message, Role, StreamEvent, ToolCall};
pub use tools::{
    AgentFunction, Args, FunctionDefinition, FunctionResult, FunctionTool, Handoff, ParamKind,
    RetryPolicy, WithRetry,
};
pub use context::{ContextVariables, ConversationHistory};
pub use config::Settings;
