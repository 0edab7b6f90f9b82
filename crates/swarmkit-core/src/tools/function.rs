use crate::context::ContextVariables;
use crate::error::SwarmError;
use crate::tools::{AgentFunction, Args, FunctionResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    StringArray,
}

impl ParamKind {
    fn schema(self) -> Value {
        match self {
            ParamKind::String => serde_json::json!({ "type": "string" }),
            ParamKind::Integer => serde_json::json!({ "type": "integer" }),
            ParamKind::Number => serde_json::json!({ "type": "number" }),
            ParamKind::Boolean => serde_json::json!({ "type": "boolean" }),
            ParamKind::StringArray => serde_json::json!({
                "type": "array",
                "items": { "type": "string" }
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
    pub allowed: Vec<String>,
}

type Handler = Arc<
    dyn Fn(Args, ContextVariables) -> BoxFuture<'static, Result<FunctionResult, SwarmError>>
        + Send
        + Sync,
>;

/// An agent function assembled from a parameter list and a closure.
///
/// ```ignore
/// let greet = FunctionTool::new("greet", "Greet someone by name")
///     .string("name", "Who to greet")
///     .handler(|args, _ctx| Ok(format!("Hello, {}!", args.str("name")?)));
/// ```
pub struct FunctionTool {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
    handler: Handler,
}

impl FunctionTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> FunctionToolBuilder {
        FunctionToolBuilder {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }
}

pub struct FunctionToolBuilder {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
}

impl FunctionToolBuilder {
    pub fn param(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
            description: description.into(),
            required,
            allowed: Vec::new(),
        });
        self
    }

    pub fn string(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::String, description, true)
    }

    pub fn opt_string(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::String, description, false)
    }

    pub fn integer(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::Integer, description, true)
    }

    pub fn opt_integer(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::Integer, description, false)
    }

    pub fn number(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::Number, description, true)
    }

    pub fn opt_number(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::Number, description, false)
    }

    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::Boolean, description, true)
    }

    pub fn string_list(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::StringArray, description, true)
    }

    pub fn opt_string_list(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(name, ParamKind::StringArray, description, false)
    }

    /// Restrict the most recently added parameter to a fixed set of values.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(last) = self.params.last_mut() {
            last.allowed = values.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Finish with a synchronous handler.
    pub fn handler<F, R>(self, f: F) -> FunctionTool
    where
        F: Fn(&Args, &ContextVariables) -> Result<R, SwarmError> + Send + Sync + 'static,
        R: Into<FunctionResult>,
    {
        self.build(Arc::new(move |args: Args, ctx: ContextVariables| {
            let result: Result<FunctionResult, SwarmError> = f(&args, &ctx).map(Into::into);
            futures::future::ready(result).boxed()
        }))
    }

    /// Finish with an async handler. The handler receives a snapshot of the context.
    pub fn async_handler<F, Fut, R>(self, f: F) -> FunctionTool
    where
        F: Fn(Args, ContextVariables) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, SwarmError>> + Send + 'static,
        R: Into<FunctionResult>,
    {
        self.build(Arc::new(move |args: Args, ctx: ContextVariables| {
            let fut = f(args, ctx);
            async move { fut.await.map(Into::<FunctionResult>::into) }.boxed()
        }))
    }

    fn build(self, handler: Handler) -> FunctionTool {
        FunctionTool {
            name: self.name,
            description: self.description,
            params: self.params,
            handler,
        }
    }
}

#[async_trait::async_trait]
impl AgentFunction for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for p in &self.params {
            let mut schema = p.kind.schema();
            if !p.description.is_empty() {
                schema["description"] = Value::String(p.description.clone());
            }
            if !p.allowed.is_empty() {
                schema["enum"] = Value::from(p.allowed.clone());
            }
            properties.insert(p.name.clone(), schema);
            if p.required {
                required.push(Value::String(p.name.clone()));
            }
        }

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    async fn execute(
        &self,
        args: Args,
        context: &ContextVariables,
    ) -> Result<FunctionResult, SwarmError> {
        for p in self.params.iter().filter(|p| p.required) {
            if !args.contains(&p.name) {
                return Err(SwarmError::invalid_argument(
                    &p.name,
                    "missing required argument",
                ));
            }
        }
        (self.handler)(args, context.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_lists_required_params_only() {
        let tool = FunctionTool::new("add_item", "Add an item")
            .string("item", "Item name")
            .opt_integer("quantity", "How many")
            .string("size", "Size")
            .one_of(["small", "large"])
            .handler(|_, _| Ok("ok"));

        let schema = tool.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["item", "size"]));
        assert_eq!(schema["properties"]["quantity"]["type"], "integer");
        assert_eq!(schema["properties"]["size"]["enum"], json!(["small", "large"]));
    }

    #[tokio::test]
    async fn test_missing_required_argument_rejected_before_handler() {
        let tool = FunctionTool::new("echo", "Echo")
            .string("text", "")
            .handler(|args, _| Ok(args.str("text")?.to_string()));

        let err = tool
            .execute(Args::default(), &ContextVariables::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SwarmError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_async_handler_sees_context() {
        let tool = FunctionTool::new("whoami", "")
            .async_handler(|_, ctx| async move {
                Ok::<_, SwarmError>(ctx.get_str("user").unwrap_or("anonymous").to_string())
            });

        let mut ctx = ContextVariables::new();
        ctx.set("user", "Ada");
        let result = tool.execute(Args::default(), &ctx).await.unwrap();
        assert_eq!(result.value, "Ada");
    }
}
