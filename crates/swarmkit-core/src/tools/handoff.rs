use crate::context::ContextVariables;
use crate::error::SwarmError;
use crate::tools::{AgentFunction, Args, FunctionResult};
use serde_json::Value;

/// A function that transfers the conversation to another agent.
pub struct Handoff {
    name: String,
    description: String,
    target: String,
    message: Option<String>,
}

impl Handoff {
    /// `name` is the function name the model calls, `target` the agent name.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            name: name.into(),
            description: format!("Transfer the conversation to the {target}."),
            target,
            message: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Text returned to the model instead of the default handoff payload.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait::async_trait]
impl AgentFunction for Handoff {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": [],
        })
    }

    async fn execute(
        &self,
        _args: Args,
        _context: &ContextVariables,
    ) -> Result<FunctionResult, SwarmError> {
        tracing::debug!(function = %self.name, target = %self.target, "handoff requested");
        let result = FunctionResult::handoff(&self.target);
        Ok(match &self.message {
            Some(message) => FunctionResult {
                value: message.clone(),
                ..result
            },
            None => result,
        })
    }
}
