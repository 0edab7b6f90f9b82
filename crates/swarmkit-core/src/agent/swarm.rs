use crate::agent::{Agent, Roster};
use crate::constants::{defaults, limits};
use crate::context::ContextVariables;
use crate::error::SwarmError;
use crate::llm::{ChatRequest, LlmClient, Message, StreamEvent, ToolCall};
use crate::tools::{Args, FunctionResult};
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::Instrument;

/// Marks the boundaries of one streamed assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Start,
    End,
}

/// Events emitted during a run - the interface between the loop and the REPL.
#[derive(Debug, Clone, PartialEq)]
pub enum SwarmEvent {
    TurnStarted { turn: usize, agent: String },
    Delim(Delim),
    TextDelta { sender: String, text: String },
    ToolStart { name: String },
    ToolResult { name: String, success: bool, summary: String },
    Handoff { from: String, to: String },
    Complete { turns: usize },
    Error(String),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Replaces every agent's model for this run.
    pub model_override: Option<String>,
    pub stream: bool,
    pub max_turns: usize,
    /// When false the loop stops at the first tool request without running it.
    pub execute_tools: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            model_override: None,
            stream: false,
            max_turns: defaults::MAX_TURNS,
            execute_tools: true,
        }
    }
}

impl RunOptions {
    pub fn with_model_override(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_execute_tools(mut self, execute: bool) -> Self {
        self.execute_tools = execute;
        self
    }
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct Response {
    /// Messages produced during the run, excluding the input history.
    pub messages: Vec<Message>,
    /// Name of the agent active when the run ended.
    pub agent: String,
    pub context_variables: ContextVariables,
}

impl Response {
    /// Last assistant message with text, if any.
    pub fn reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::llm::Role::Assistant && !m.content.is_empty())
    }
}

/// Outcome of all tool calls of a single assistant message.
struct ToolBatch {
    messages: Vec<Message>,
    context_variables: ContextVariables,
    agent: Option<String>,
}

pub struct Swarm {
    client: Arc<dyn LlmClient>,
}

impl Swarm {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub async fn run(
        &self,
        roster: &Roster,
        agent: &str,
        messages: Vec<Message>,
        context_variables: ContextVariables,
        options: RunOptions,
    ) -> Result<Response, SwarmError> {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        self.run_with_events(roster, agent, messages, context_variables, options, tx)
            .await
    }

    /// Run the loop from `agent`, emitting SwarmEvents through the channel.
    pub async fn run_with_events(
        &self,
        roster: &Roster,
        agent: &str,
        messages: Vec<Message>,
        context_variables: ContextVariables,
        options: RunOptions,
        event_tx: UnboundedSender<SwarmEvent>,
    ) -> Result<Response, SwarmError> {
        let span = tracing::debug_span!("run", run_id = %uuid::Uuid::new_v4(), agent);
        self.run_loop(roster, agent, messages, context_variables, options, &event_tx)
            .instrument(span)
            .await
            .inspect_err(|e| {
                let _ = event_tx.send(SwarmEvent::Error(e.to_string()));
            })
    }

    async fn run_loop(
        &self,
        roster: &Roster,
        agent: &str,
        messages: Vec<Message>,
        mut context: ContextVariables,
        options: RunOptions,
        event_tx: &UnboundedSender<SwarmEvent>,
    ) -> Result<Response, SwarmError> {
        let mut active = roster.require(agent)?;
        let mut history = messages;
        let init_len = history.len();
        let mut turns = 0;

        loop {
            if turns >= options.max_turns {
                tracing::warn!(max_turns = options.max_turns, "turn limit reached, ending run");
                break;
            }
            turns += 1;
            let _ = event_tx.send(SwarmEvent::TurnStarted {
                turn: turns,
                agent: active.name.clone(),
            });

            let request = build_request(&active, &history, &context, &options);
            tracing::debug!(turn = turns, agent = %active.name, model = %request.model, "requesting completion");

            let message = if options.stream {
                self.stream_turn(&request, &active.name, event_tx).await?
            } else {
                self.client.chat(&request).await?.message
            }
            .with_sender(active.name.clone());

            let tool_calls = message.tool_calls.clone().unwrap_or_default();
            history.push(message);

            if tool_calls.is_empty() || !options.execute_tools {
                tracing::debug!(turn = turns, "no tool calls, ending run");
                break;
            }

            let batch = execute_tool_calls(&active, &tool_calls, &context, event_tx).await;
            history.extend(batch.messages);
            context.update(batch.context_variables);

            if let Some(next) = batch.agent {
                let next = roster.require(&next)?;
                tracing::debug!(from = %active.name, to = %next.name, "handoff");
                let _ = event_tx.send(SwarmEvent::Handoff {
                    from: active.name.clone(),
                    to: next.name.clone(),
                });
                active = next;
            }
        }

        let _ = event_tx.send(SwarmEvent::Complete { turns });

        Ok(Response {
            messages: history.split_off(init_len),
            agent: active.name.clone(),
            context_variables: context,
        })
    }

    async fn stream_turn(
        &self,
        request: &ChatRequest,
        sender: &str,
        event_tx: &UnboundedSender<SwarmEvent>,
    ) -> Result<Message, SwarmError> {
        let mut stream = self.client.chat_stream(request).await?;
        let _ = event_tx.send(SwarmEvent::Delim(Delim::Start));

        let mut content = String::new();
        // index -> (id, name, arguments)
        let mut calls: BTreeMap<usize, (String, String, String)> = BTreeMap::new();

        while let Some(event) = stream.next().await {
            match event {
                StreamEvent::TextDelta(delta) => {
                    content.push_str(&delta);
                    let _ = event_tx.send(SwarmEvent::TextDelta {
                        sender: sender.to_string(),
                        text: delta,
                    });
                }
                StreamEvent::ToolCallStart { index, id, name } => {
                    calls.insert(index, (id, name, String::new()));
                }
                StreamEvent::ToolCallDelta {
                    index,
                    arguments_delta,
                } => {
                    if let Some((_, _, args)) = calls.get_mut(&index) {
                        args.push_str(&arguments_delta);
                    }
                }
                StreamEvent::ToolCallEnd { .. } => {}
                StreamEvent::Usage(usage) => {
                    tracing::debug!(
                        input = usage.input_tokens,
                        output = usage.output_tokens,
                        "token usage"
                    );
                }
                StreamEvent::Done => break,
                StreamEvent::Error(err) => return Err(SwarmError::Llm(err)),
            }
        }

        let _ = event_tx.send(SwarmEvent::Delim(Delim::End));

        let tool_calls: Vec<ToolCall> = calls
            .into_values()
            .map(|(id, name, args)| ToolCall::new(id, name, args))
            .collect();

        Ok(if tool_calls.is_empty() {
            Message::assistant(content)
        } else {
            Message::assistant_with_tools(content, tool_calls)
        })
    }
}

fn build_request(
    agent: &Agent,
    history: &[Message],
    context: &ContextVariables,
    options: &RunOptions,
) -> ChatRequest {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::system(agent.instructions.resolve(context)));
    messages.extend(history.iter().cloned());

    let model = options
        .model_override
        .clone()
        .unwrap_or_else(|| agent.model.clone());

    let mut request = ChatRequest::new(model, messages).with_tools(agent.definitions());
    request.tool_choice = agent.tool_choice.clone();
    request.parallel_tool_calls = agent.parallel_tool_calls;
    request
}

async fn execute_tool_calls(
    agent: &Agent,
    tool_calls: &[ToolCall],
    context: &ContextVariables,
    event_tx: &UnboundedSender<SwarmEvent>,
) -> ToolBatch {
    for call in tool_calls {
        let _ = event_tx.send(SwarmEvent::ToolStart {
            name: call.function.name.clone(),
        });
    }

    let outcomes: Vec<(bool, FunctionResult)> = if agent.parallel_tool_calls {
        futures::future::join_all(tool_calls.iter().map(|c| execute_tool(agent, c, context))).await
    } else {
        let mut outcomes = Vec::with_capacity(tool_calls.len());
        for call in tool_calls {
            outcomes.push(execute_tool(agent, call, context).await);
        }
        outcomes
    };

    let mut batch = ToolBatch {
        messages: Vec::with_capacity(tool_calls.len()),
        context_variables: ContextVariables::new(),
        agent: None,
    };

    for (call, (success, result)) in tool_calls.iter().zip(outcomes) {
        let name = &call.function.name;
        let _ = event_tx.send(SwarmEvent::ToolResult {
            name: name.clone(),
            success,
            summary: truncate_str(&result.value, limits::TOOL_SUMMARY_CHARS),
        });

        batch
            .messages
            .push(Message::tool_result(&call.id, name, result.value));
        batch.context_variables.update(result.context_variables);
        if result.agent.is_some() {
            batch.agent = result.agent;
        }
    }

    batch
}

/// Run one call. Failures become the tool message the model sees.
async fn execute_tool(
    agent: &Agent,
    call: &ToolCall,
    context: &ContextVariables,
) -> (bool, FunctionResult) {
    let name = &call.function.name;

    let Some(function) = agent.function(name) else {
        tracing::debug!(function = %name, agent = %agent.name, "unknown function");
        return (false, FunctionResult::new(format!("Error: Tool {name} not found.")));
    };

    let args = match call
        .parse_arguments()
        .map_err(SwarmError::from)
        .and_then(Args::from_value)
    {
        Ok(args) => args,
        Err(e) => {
            return (
                false,
                FunctionResult::new(format!("Error: Failed to parse arguments for {name}: {e}")),
            )
        }
    };

    tracing::debug!(function = %name, "executing function");
    match function.execute(args, context).await {
        Ok(result) => (true, result),
        Err(e) => {
            tracing::debug!(function = %name, error = %e, "function failed");
            (false, FunctionResult::new(format!("Error: {e}")))
        }
    }
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
