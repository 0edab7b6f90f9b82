use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swarmkit_core::{
    Agent, ChatRequest, ContextVariables, Delim, FunctionResult, FunctionTool, Handoff,
    LlmClient, LlmResponse, Message, Role, Roster, RunOptions, StreamEvent, Swarm, SwarmError,
    SwarmEvent, ToolCall,
};
use tokio::sync::mpsc::unbounded_channel;

/// Mock LLM that replays scripted replies and records every request.
#[derive(Default)]
struct MockLlm {
    replies: Mutex<VecDeque<Message>>,
    streams: Mutex<VecDeque<Vec<StreamEvent>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockLlm {
    fn new(replies: Vec<Message>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    fn streaming(streams: Vec<Vec<StreamEvent>>) -> Self {
        Self {
            streams: Mutex::new(streams.into()),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlm {
    async fn chat(&self, request: &ChatRequest) -> Result<LlmResponse, SwarmError> {
        self.requests.lock().unwrap().push(request.clone());
        let message = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Message::assistant("(no more replies)"));
        Ok(LlmResponse {
            message,
            usage: None,
        })
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<UnboundedReceiver<StreamEvent>, SwarmError> {
        self.requests.lock().unwrap().push(request.clone());
        let events = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![StreamEvent::Done]);

        let (tx, rx) = unbounded();
        for event in events {
            tx.unbounded_send(event).unwrap();
        }
        Ok(rx)
    }
}

/// LLM that always fails.
struct FailingLlm;

#[async_trait::async_trait]
impl LlmClient for FailingLlm {
    async fn chat(&self, _request: &ChatRequest) -> Result<LlmResponse, SwarmError> {
        Err(SwarmError::Llm("OpenAI API error (500): boom".into()))
    }

    async fn chat_stream(
        &self,
        _request: &ChatRequest,
    ) -> Result<UnboundedReceiver<StreamEvent>, SwarmError> {
        Err(SwarmError::Llm("OpenAI API error (500): boom".into()))
    }
}

fn tool_reply(calls: Vec<ToolCall>) -> Message {
    Message::assistant_with_tools("", calls)
}

fn echo_tool() -> FunctionTool {
    FunctionTool::new("echo", "Echoes input")
        .string("text", "Text to echo")
        .handler(|args, _| Ok(format!("echo: {}", args.str("text")?)))
}

fn swarm_with(mock: MockLlm) -> (Swarm, Arc<Mutex<Vec<ChatRequest>>>) {
    let requests = mock.requests.clone();
    (Swarm::new(Arc::new(mock)), requests)
}

#[tokio::test]
async fn test_simple_text_response() {
    let (swarm, requests) = swarm_with(MockLlm::new(vec![Message::assistant("Hello")]));
    let roster = Roster::new().with(Agent::new("Helper").with_instructions("Be brief."));

    let response = swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("Hi")],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.messages.len(), 1);
    assert_eq!(response.messages[0].content, "Hello");
    assert_eq!(response.messages[0].sender.as_deref(), Some("Helper"));
    assert_eq!(response.agent, "Helper");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert_eq!(requests[0].messages[0].content, "Be brief.");
    assert_eq!(requests[0].messages[1].content, "Hi");
    assert_eq!(requests[0].model, "gpt-4o");
}

#[tokio::test]
async fn test_tool_call_then_reply() {
    let (swarm, requests) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![ToolCall::new("call_1", "echo", r#"{"text": "hello"}"#)]),
        Message::assistant("Done!"),
    ]));
    let roster = Roster::new().with(Agent::new("Helper").with_function(echo_tool()));

    let response = swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("Echo hello")],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.messages.len(), 3);
    assert!(response.messages[0].has_tool_calls());
    assert_eq!(response.messages[1].role, Role::Tool);
    assert_eq!(response.messages[1].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(response.messages[1].content, "echo: hello");
    assert_eq!(response.reply().unwrap().content, "Done!");

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].tools.len(), 1);
    assert_eq!(requests[0].tools[0].name, "echo");
    // second request carries the tool result
    assert_eq!(requests[1].messages.last().unwrap().role, Role::Tool);
}

#[tokio::test]
async fn test_unknown_tool_reported_to_model() {
    let (swarm, _) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![ToolCall::new("c1", "launch_rocket", "{}")]),
        Message::assistant("Sorry"),
    ]));
    let roster = Roster::new().with(Agent::new("Helper"));

    let response = swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("go")],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.messages[1].content, "Error: Tool launch_rocket not found.");
    assert_eq!(response.messages[1].tool_name.as_deref(), Some("launch_rocket"));
}

#[tokio::test]
async fn test_function_errors_do_not_abort_run() {
    let failing = FunctionTool::new("fail", "Always fails")
        .handler(|_, _| Err::<String, _>(SwarmError::function("fail", "Intentional error")));
    let (swarm, _) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![
            ToolCall::new("c1", "fail", "{}"),
            ToolCall::new("c2", "echo", "not json"),
            ToolCall::new("c3", "echo", "{}"),
        ]),
        Message::assistant("Handled"),
    ]));
    let roster = Roster::new().with(
        Agent::new("Helper")
            .with_function(failing)
            .with_function(echo_tool()),
    );

    let response = swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("go")],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap();

    let tool_messages: Vec<&str> = response
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(tool_messages.len(), 3);
    assert!(tool_messages[0].starts_with("Error: "));
    assert!(tool_messages[0].contains("Intentional error"));
    assert!(tool_messages[1].starts_with("Error: Failed to parse arguments for echo"));
    assert!(tool_messages[2].contains("missing required argument"));
    assert_eq!(response.reply().unwrap().content, "Handled");
}

#[tokio::test]
async fn test_handoff_switches_agent_and_instructions() {
    let (swarm, requests) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![ToolCall::new("c1", "transfer_to_sales", "{}")]),
        Message::assistant("Sales here"),
    ]));
    let roster = Roster::new()
        .with(
            Agent::new("Triage Agent")
                .with_instructions("Route the user.")
                .with_function(Handoff::new("transfer_to_sales", "Sales Agent")),
        )
        .with(Agent::new("Sales Agent").with_instructions("Sell things."));

    let (tx, mut rx) = unbounded_channel();
    let response = swarm
        .run_with_events(
            &roster,
            "Triage Agent",
            vec![Message::user("I want to buy")],
            ContextVariables::new(),
            RunOptions::default(),
            tx,
        )
        .await
        .unwrap();

    assert_eq!(response.agent, "Sales Agent");
    assert_eq!(response.messages[1].content, r#"{"assistant":"Sales Agent"}"#);
    assert_eq!(response.messages[2].sender.as_deref(), Some("Sales Agent"));

    let requests = requests.lock().unwrap();
    assert_eq!(requests[1].messages[0].content, "Sell things.");
    assert!(requests[1].tools.is_empty());

    let mut saw_handoff = false;
    while let Ok(event) = rx.try_recv() {
        if let SwarmEvent::Handoff { from, to } = event {
            assert_eq!(from, "Triage Agent");
            assert_eq!(to, "Sales Agent");
            saw_handoff = true;
        }
    }
    assert!(saw_handoff);
}

#[tokio::test]
async fn test_last_handoff_in_a_turn_wins() {
    let (swarm, _) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![
            ToolCall::new("c1", "to_a", "{}"),
            ToolCall::new("c2", "to_b", "{}"),
        ]),
        Message::assistant("B speaking"),
    ]));
    let roster = Roster::new()
        .with(
            Agent::new("Router")
                .with_function(Handoff::new("to_a", "A"))
                .with_function(Handoff::new("to_b", "B")),
        )
        .with(Agent::new("A"))
        .with(Agent::new("B"));

    let response = swarm
        .run(
            &roster,
            "Router",
            vec![Message::user("help")],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.agent, "B");
}

#[tokio::test]
async fn test_handoff_to_unregistered_agent_is_error() {
    let (swarm, _) = swarm_with(MockLlm::new(vec![tool_reply(vec![ToolCall::new(
        "c1", "to_ghost", "{}",
    )])]));
    let roster =
        Roster::new().with(Agent::new("Router").with_function(Handoff::new("to_ghost", "Ghost")));

    let err = swarm
        .run(
            &roster,
            "Router",
            vec![Message::user("help")],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SwarmError::UnknownAgent(name) if name == "Ghost"));
}

#[tokio::test]
async fn test_unknown_starting_agent_is_error() {
    let (swarm, _) = swarm_with(MockLlm::new(vec![]));
    let err = swarm
        .run(
            &Roster::new(),
            "Nobody",
            vec![],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SwarmError::UnknownAgent(_)));
}

#[tokio::test]
async fn test_context_updates_merge_and_reach_dynamic_instructions() {
    let remember = FunctionTool::new("remember_name", "Store the user's name")
        .string("name", "The name")
        .handler(|args, _| {
            Ok(FunctionResult::new("Saved").with_context("user_name", args.str("name")?))
        });
    let (swarm, requests) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![ToolCall::new("c1", "remember_name", r#"{"name":"Ada"}"#)]),
        Message::assistant("Nice to meet you"),
    ]));
    let roster = Roster::new().with(
        Agent::new("Helper")
            .with_dynamic_instructions(|ctx| {
                format!("User: {}", ctx.get_str("user_name").unwrap_or("unknown"))
            })
            .with_function(remember),
    );

    let response = swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("I'm Ada")],
            ContextVariables::new().with("visits", 1),
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.context_variables.get_str("user_name"), Some("Ada"));
    assert_eq!(response.context_variables.get_i64("visits"), Some(1));

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].messages[0].content, "User: unknown");
    assert_eq!(requests[1].messages[0].content, "User: Ada");

    // context never appears in the advertised schema
    let params = &requests[0].tools[0].parameters;
    assert_eq!(params["required"], json!(["name"]));
}

#[tokio::test]
async fn test_max_turns_ends_run_without_error() {
    let (swarm, requests) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![ToolCall::new("c1", "echo", r#"{"text":"1"}"#)]),
        tool_reply(vec![ToolCall::new("c2", "echo", r#"{"text":"2"}"#)]),
        Message::assistant("never reached"),
    ]));
    let roster = Roster::new().with(Agent::new("Helper").with_function(echo_tool()));

    let response = swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("loop")],
            ContextVariables::new(),
            RunOptions::default().with_max_turns(2),
        )
        .await
        .unwrap();

    assert_eq!(requests.lock().unwrap().len(), 2);
    assert_eq!(response.messages.len(), 4);
    assert!(response.reply().is_none());
}

#[tokio::test]
async fn test_execute_tools_false_stops_at_tool_request() {
    let (swarm, _) = swarm_with(MockLlm::new(vec![tool_reply(vec![ToolCall::new(
        "c1",
        "echo",
        r#"{"text":"x"}"#,
    )])]));
    let roster = Roster::new().with(Agent::new("Helper").with_function(echo_tool()));

    let response = swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("x")],
            ContextVariables::new(),
            RunOptions::default().with_execute_tools(false),
        )
        .await
        .unwrap();

    assert_eq!(response.messages.len(), 1);
    assert!(response.messages[0].has_tool_calls());
}

#[tokio::test]
async fn test_model_override_reaches_client() {
    let (swarm, requests) = swarm_with(MockLlm::new(vec![Message::assistant("ok")]));
    let roster = Roster::new().with(Agent::new("Helper").with_model("gpt-4o"));

    swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("x")],
            ContextVariables::new(),
            RunOptions::default().with_model_override("gpt-4o-mini"),
        )
        .await
        .unwrap();

    assert_eq!(requests.lock().unwrap()[0].model, "gpt-4o-mini");
}

#[tokio::test(start_paused = true)]
async fn test_parallel_calls_run_concurrently_and_keep_order() {
    let slow = |name: &'static str, ms: u64| {
        FunctionTool::new(name, "slow lookup").async_handler(move |_, _| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, SwarmError>(format!("{name} done"))
        })
    };
    let (swarm, requests) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![
            ToolCall::new("c1", "flights", "{}"),
            ToolCall::new("c2", "hotels", "{}"),
        ]),
        Message::assistant("All checked"),
    ]));
    let roster = Roster::new().with(
        Agent::new("Planner")
            .with_function(slow("flights", 300))
            .with_function(slow("hotels", 100)),
    );

    let started = tokio::time::Instant::now();
    let response = swarm
        .run(
            &roster,
            "Planner",
            vec![Message::user("plan")],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(response.messages[1].content, "flights done");
    assert_eq!(response.messages[2].content, "hotels done");
    assert!(requests.lock().unwrap()[0].parallel_tool_calls);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_calls_when_parallel_disabled() {
    let slow = |name: &'static str| {
        FunctionTool::new(name, "").async_handler(move |_, _| async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, SwarmError>(name)
        })
    };
    let (swarm, requests) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![
            ToolCall::new("c1", "a", "{}"),
            ToolCall::new("c2", "b", "{}"),
        ]),
        Message::assistant("done"),
    ]));
    let roster = Roster::new().with(
        Agent::new("Worker")
            .with_parallel_tool_calls(false)
            .with_function(slow("a"))
            .with_function(slow("b")),
    );

    let started = tokio::time::Instant::now();
    swarm
        .run(
            &roster,
            "Worker",
            vec![Message::user("go")],
            ContextVariables::new(),
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(400));
    assert!(!requests.lock().unwrap()[0].parallel_tool_calls);
}

#[tokio::test]
async fn test_streaming_emits_deltas_between_delimiters() {
    let (swarm, _) = swarm_with(MockLlm::streaming(vec![
        vec![
            StreamEvent::ToolCallStart {
                index: 0,
                id: "c1".into(),
                name: "echo".into(),
            },
            StreamEvent::ToolCallDelta {
                index: 0,
                arguments_delta: r#"{"text":"#.into(),
            },
            StreamEvent::ToolCallDelta {
                index: 0,
                arguments_delta: r#""hi"}"#.into(),
            },
            StreamEvent::ToolCallEnd { index: 0 },
            StreamEvent::Done,
        ],
        vec![
            StreamEvent::TextDelta("Once ".into()),
            StreamEvent::TextDelta("upon a time".into()),
            StreamEvent::Done,
        ],
    ]));
    let roster = Roster::new().with(Agent::new("Storyteller").with_function(echo_tool()));

    let (tx, mut rx) = unbounded_channel();
    let response = swarm
        .run_with_events(
            &roster,
            "Storyteller",
            vec![Message::user("tell me a story")],
            ContextVariables::new(),
            RunOptions::default().with_stream(true),
            tx,
        )
        .await
        .unwrap();

    assert_eq!(response.messages[1].content, "echo: hi");
    assert_eq!(response.reply().unwrap().content, "Once upon a time");

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    let text: String = events
        .iter()
        .filter_map(|e| match e {
            SwarmEvent::TextDelta { sender, text } => {
                assert_eq!(sender, "Storyteller");
                Some(text.as_str())
            }
            _ => None,
        })
        .collect();
    assert_eq!(text, "Once upon a time");
    let delims = events
        .iter()
        .filter(|e| matches!(e, SwarmEvent::Delim(_)))
        .count();
    assert_eq!(delims, 4);
    assert_eq!(events.first(), Some(&SwarmEvent::TurnStarted { turn: 1, agent: "Storyteller".into() }));
    assert!(events.contains(&SwarmEvent::Delim(Delim::End)));
    assert_eq!(events.last(), Some(&SwarmEvent::Complete { turns: 2 }));
}

#[tokio::test]
async fn test_stream_error_propagates() {
    let (swarm, _) = swarm_with(MockLlm::streaming(vec![vec![
        StreamEvent::TextDelta("partial".into()),
        StreamEvent::Error("connection reset".into()),
    ]]));
    let roster = Roster::new().with(Agent::new("Helper"));

    let err = swarm
        .run(
            &roster,
            "Helper",
            vec![Message::user("x")],
            ContextVariables::new(),
            RunOptions::default().with_stream(true),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_llm_error_propagation_emits_error_event() {
    let swarm = Swarm::new(Arc::new(FailingLlm));
    let roster = Roster::new().with(Agent::new("Helper"));

    let (tx, mut rx) = unbounded_channel();
    let result = swarm
        .run_with_events(
            &roster,
            "Helper",
            vec![Message::user("x")],
            ContextVariables::new(),
            RunOptions::default(),
            tx,
        )
        .await;

    assert!(matches!(result, Err(SwarmError::Llm(_))));
    let mut saw_error = false;
    while let Ok(event) = rx.try_recv() {
        if let SwarmEvent::Error(msg) = event {
            assert!(msg.contains("500"));
            saw_error = true;
        }
    }
    assert!(saw_error);
}

#[tokio::test]
async fn test_tool_events_report_success_and_failure() {
    let (swarm, _) = swarm_with(MockLlm::new(vec![
        tool_reply(vec![
            ToolCall::new("c1", "echo", r#"{"text":"a"}"#),
            ToolCall::new("c2", "missing", "{}"),
        ]),
        Message::assistant("ok"),
    ]));
    let roster = Roster::new().with(Agent::new("Helper").with_function(echo_tool()));

    let (tx, mut rx) = unbounded_channel();
    swarm
        .run_with_events(
            &roster,
            "Helper",
            vec![Message::user("x")],
            ContextVariables::new(),
            RunOptions::default(),
            tx,
        )
        .await
        .unwrap();

    let mut results = Vec::new();
    let mut starts = 0;
    while let Ok(event) = rx.try_recv() {
        match event {
            SwarmEvent::ToolStart { .. } => starts += 1,
            SwarmEvent::ToolResult { name, success, .. } => results.push((name, success)),
            _ => {}
        }
    }
    assert_eq!(starts, 2);
    assert_eq!(
        results,
        vec![("echo".to_string(), true), ("missing".to_string(), false)]
    );
}
