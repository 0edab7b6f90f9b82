use crate::context::ContextVariables;
use crate::error::SwarmError;
use crate::tools::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Outcome of an agent function call.
///
/// `value` goes back to the model as the tool message. A set `agent` asks the
/// run loop to hand the conversation to that agent, and `context_variables`
/// are merged into the shared context once the call completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionResult {
    pub value: String,
    pub agent: Option<String>,
    pub context_variables: ContextVariables,
}

impl FunctionResult {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// A result that only transfers control.
    pub fn handoff(agent: impl Into<String>) -> Self {
        let agent = agent.into();
        Self {
            value: serde_json::json!({ "assistant": agent }).to_string(),
            agent: Some(agent),
            context_variables: ContextVariables::new(),
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context_variables.set(key, value);
        self
    }

    pub fn with_context_variables(mut self, vars: ContextVariables) -> Self {
        self.context_variables.update(vars);
        self
    }
}

impl From<String> for FunctionResult {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for FunctionResult {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A callable exposed to the model by an agent.
///
/// The context is handed to every call but is never part of the schema the
/// model sees.
#[async_trait::async_trait]
pub trait AgentFunction: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;

    async fn execute(
        &self,
        args: Args,
        context: &ContextVariables,
    ) -> Result<FunctionResult, SwarmError>;

    fn to_definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
