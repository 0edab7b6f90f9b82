use crate::constants::models;
use crate::context::ContextVariables;
use crate::llm::ToolChoice;
use crate::tools::{AgentFunction, FunctionDefinition};
use std::fmt;
use std::sync::Arc;

pub type InstructionsFn = Arc<dyn Fn(&ContextVariables) -> String + Send + Sync>;

/// System prompt of an agent, fixed or computed from the context each turn.
#[derive(Clone)]
pub enum Instructions {
    Static(String),
    Dynamic(InstructionsFn),
}

impl Instructions {
    pub fn resolve(&self, context: &ContextVariables) -> String {
        match self {
            Instructions::Static(text) => text.clone(),
            Instructions::Dynamic(f) => f(context),
        }
    }
}

impl Default for Instructions {
    fn default() -> Self {
        Instructions::Static("You are a helpful agent.".to_string())
    }
}

impl fmt::Debug for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instructions::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Instructions::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A named configuration of model, instructions and functions.
#[derive(Clone)]
pub struct Agent {
    pub name: String,
    pub model: String,
    pub instructions: Instructions,
    pub functions: Vec<Arc<dyn AgentFunction>>,
    pub tool_choice: Option<ToolChoice>,
    pub parallel_tool_calls: bool,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: models::DEFAULT_MODEL.to_string(),
            instructions: Instructions::default(),
            functions: Vec::new(),
            tool_choice: None,
            parallel_tool_calls: true,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Instructions::Static(instructions.into());
        self
    }

    pub fn with_dynamic_instructions(
        mut self,
        f: impl Fn(&ContextVariables) -> String + Send + Sync + 'static,
    ) -> Self {
        self.instructions = Instructions::Dynamic(Arc::new(f));
        self
    }

    pub fn with_function(mut self, function: impl AgentFunction + 'static) -> Self {
        self.functions.push(Arc::new(function));
        self
    }

    pub fn with_shared_function(mut self, function: Arc<dyn AgentFunction>) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }

    pub fn function(&self, name: &str) -> Option<&Arc<dyn AgentFunction>> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.functions.iter().map(|f| f.to_definition()).collect()
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("instructions", &self.instructions)
            .field(
                "functions",
                &self.functions.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field("parallel_tool_calls", &self.parallel_tool_calls)
            .finish()
    }
}
