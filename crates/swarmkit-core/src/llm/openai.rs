use crate::constants::{endpoints, models};
use crate::error::SwarmError;
use crate::llm::traits::*;
use crate::tools::FunctionDefinition;
use futures::channel::mpsc;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    default_model: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            default_model: models::DEFAULT_MODEL.to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
        }
    }

    /// Model used when a request leaves its model empty.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, endpoints::CHAT_COMPLETIONS_PATH)
    }

    pub(crate) fn request_body(&self, request: &ChatRequest, stream: bool) -> Value {
        let model = if request.model.is_empty() {
            self.default_model.as_str()
        } else {
            request.model.as_str()
        };

        let mut body = serde_json::json!({
            "model": model,
            "messages": request.messages.iter().map(to_wire_message).collect::<Vec<_>>(),
        });

        if !request.tools.is_empty() {
            body["tools"] = Value::Array(build_tool_defs(&request.tools));
            body["parallel_tool_calls"] = Value::Bool(request.parallel_tool_calls);
            if let Some(ref choice) = request.tool_choice {
                body["tool_choice"] = choice.to_value();
            }
        }

        if stream {
            body["stream"] = Value::Bool(true);
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }

        body
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, SwarmError> {
        tracing::debug!(url = %self.url(), model = %body["model"], "chat completion request");

        let response = self
            .client
            .post(self.url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SwarmError::Llm(format!(
                "OpenAI API error ({}): {}",
                status, text
            )));
        }

        Ok(response)
    }
}

fn build_tool_defs(tools: &[FunctionDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            serde_json::json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                }
            })
        })
        .collect()
}

/// Translate a history message into the chat-completions wire shape.
/// The `sender` annotation is local bookkeeping and never leaves the process.
pub(crate) fn to_wire_message(m: &Message) -> Value {
    match m.role {
        Role::Tool => serde_json::json!({
            "role": "tool",
            "tool_call_id": m.tool_call_id.clone().unwrap_or_default(),
            "content": m.content,
        }),
        Role::Assistant if m.has_tool_calls() => {
            let tcs: Vec<Value> = m
                .tool_calls
                .iter()
                .flatten()
                .map(|tc| {
                    serde_json::json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.function.name,
                            "arguments": tc.function.arguments,
                        }
                    })
                })
                .collect();
            let content = if m.content.is_empty() {
                Value::Null
            } else {
                Value::String(m.content.clone())
            };
            serde_json::json!({
                "role": "assistant",
                "content": content,
                "tool_calls": tcs,
            })
        }
        _ => serde_json::json!({
            "role": m.role,
            "content": m.content,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAIToolCall>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub(crate) fn parse_response(text: &str) -> Result<LlmResponse, SwarmError> {
    let api_response: OpenAIResponse = serde_json::from_str(text)
        .map_err(|e| SwarmError::Llm(format!("Failed to parse response: {e}")))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| SwarmError::Llm("No response from API".into()))?;

    let content = choice.message.content.unwrap_or_default();

    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            call_type: tc.call_type,
            function: FunctionCall {
                name: tc.function.name,
                arguments: tc.function.arguments,
            },
        })
        .collect();

    let message = if tool_calls.is_empty() {
        Message::assistant(content)
    } else {
        Message::assistant_with_tools(content, tool_calls)
    };

    Ok(LlmResponse {
        message,
        usage: api_response.usage.map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }),
    })
}

/// Incremental decoder for the server-sent-event body of a streamed completion.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    open_calls: BTreeSet<usize>,
    done: bool,
}

impl SseDecoder {
    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a raw chunk; returns every event completed by it.
    /// Bytes are only decoded once their line is complete, so a character
    /// split across chunks survives.
    pub(crate) fn feed(&mut self, chunk: impl AsRef<[u8]>) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk.as_ref());
        let mut events = Vec::new();

        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw[..line_end]);
            let line = line.trim();

            if self.done {
                continue;
            }
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();

            if data == "[DONE]" {
                events.extend(self.finish());
                continue;
            }

            if let Ok(event) = serde_json::from_str::<Value>(data) {
                self.decode_event(&event, &mut events);
            }
        }

        events
    }

    /// Close any tool calls still open, in call order, then signal completion.
    pub(crate) fn finish(&mut self) -> Vec<StreamEvent> {
        if self.done {
            return Vec::new();
        }
        self.done = true;
        let mut events: Vec<StreamEvent> = std::mem::take(&mut self.open_calls)
            .into_iter()
            .map(|index| StreamEvent::ToolCallEnd { index })
            .collect();
        events.push(StreamEvent::Done);
        events
    }

    fn decode_event(&mut self, event: &Value, events: &mut Vec<StreamEvent>) {
        // With include_usage the final chunk carries usage and an empty choices list.
        if let Some(usage) = event.get("usage").filter(|u| !u.is_null()) {
            let input = usage.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0) as u32;
            let output = usage
                .get("completion_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            if input > 0 || output > 0 {
                events.push(StreamEvent::Usage(Usage {
                    input_tokens: input,
                    output_tokens: output,
                }));
            }
        }

        let Some(delta) = event
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(|c| c.get("delta"))
        else {
            return;
        };

        if let Some(content) = delta.get("content").and_then(Value::as_str) {
            if !content.is_empty() {
                events.push(StreamEvent::TextDelta(content.to_string()));
            }
        }

        let Some(tool_calls) = delta.get("tool_calls").and_then(Value::as_array) else {
            return;
        };

        for tc in tool_calls {
            let index = tc.get("index").and_then(Value::as_u64).unwrap_or(0) as usize;
            let func = tc.get("function");

            if let Some(id) = tc.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()) {
                let name = func
                    .and_then(|f| f.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                self.open_calls.insert(index);
                events.push(StreamEvent::ToolCallStart {
                    index,
                    id: id.to_string(),
                    name: name.to_string(),
                });
            }

            if let Some(args) = func
                .and_then(|f| f.get("arguments"))
                .and_then(Value::as_str)
                .filter(|a| !a.is_empty())
            {
                events.push(StreamEvent::ToolCallDelta {
                    index,
                    arguments_delta: args.to_string(),
                });
            }
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(&self, request: &ChatRequest) -> Result<LlmResponse, SwarmError> {
        let body = self.request_body(request, false);
        let response = self.send(&body).await?;
        let response_text = response.text().await?;
        parse_response(&response_text)
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<mpsc::UnboundedReceiver<StreamEvent>, SwarmError> {
        let body = self.request_body(request, true);
        let response = self.send(&body).await?;

        let (tx, rx) = mpsc::unbounded();

        let mut stream = response.bytes_stream();
        tokio::spawn(async move {
            use futures::StreamExt;
            let mut decoder = SseDecoder::default();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.unbounded_send(StreamEvent::Error(e.to_string()));
                        return;
                    }
                };

                for event in decoder.feed(&chunk) {
                    let _ = tx.unbounded_send(event);
                }
                if decoder.is_done() {
                    return;
                }
            }

            for event in decoder.finish() {
                let _ = tx.unbounded_send(event);
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_message_strips_sender() {
        let msg = Message::assistant("hi").with_sender("Sales Agent");
        let wire = to_wire_message(&msg);
        assert_eq!(wire["role"], "assistant");
        assert_eq!(wire["content"], "hi");
        assert!(wire.get("sender").is_none());
    }

    #[test]
    fn test_wire_message_tool_result() {
        let msg = Message::tool_result("call_9", "lookup", "42");
        let wire = to_wire_message(&msg);
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_9");
        assert_eq!(wire["content"], "42");
    }

    #[test]
    fn test_wire_message_tool_calls_with_empty_content() {
        let msg = Message::assistant_with_tools("", vec![ToolCall::new("c1", "f", "{}")]);
        let wire = to_wire_message(&msg);
        assert!(wire["content"].is_null());
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "f");
    }

    #[test]
    fn test_request_body_model_and_tools() {
        let client = OpenAIClient::new("k").with_model("fallback");
        let tool = FunctionDefinition {
            name: "f".into(),
            description: "d".into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        };
        let mut request = ChatRequest::new("", vec![Message::user("x")]).with_tools(vec![tool]);
        request.parallel_tool_calls = false;
        request.tool_choice = Some(ToolChoice::Required);

        let body = client.request_body(&request, false);
        assert_eq!(body["model"], "fallback");
        assert_eq!(body["tools"][0]["function"]["name"], "f");
        assert_eq!(body["parallel_tool_calls"], false);
        assert_eq!(body["tool_choice"], "required");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_request_body_without_tools_omits_parallel_flag() {
        let client = OpenAIClient::new("k");
        let request = ChatRequest::new("gpt-4o-mini", vec![Message::user("x")]);
        let body = client.request_body(&request, true);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert!(body.get("tools").is_none());
        assert!(body.get("parallel_tool_calls").is_none());
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let text = r#"{
            "choices": [{"message": {"content": null, "tool_calls": [
                {"id": "call_1", "type": "function", "function": {"name": "get_time", "arguments": "{}"}}
            ]}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3}
        }"#;
        let response = parse_response(text).unwrap();
        assert!(response.message.has_tool_calls());
        assert_eq!(response.message.content, "");
        assert_eq!(response.usage.unwrap().output_tokens, 3);
    }

    #[test]
    fn test_parse_response_without_choices_is_error() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(err.to_string().contains("No response"));
    }

    #[test]
    fn test_sse_decoder_text_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        let mut events = decoder.feed("data: {\"choices\":[{\"delta\":{\"content\":\"Hel");
        assert!(events.is_empty());
        events.extend(decoder.feed("lo\"}}]}\n\ndata: [DONE]\n"));
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta("Hello".into()), StreamEvent::Done]
        );
        assert!(decoder.is_done());
    }

    #[test]
    fn test_sse_decoder_character_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"café 🚀\"}}]}\n".as_bytes();
        let accent = line.iter().position(|&b| b == 0xC3).unwrap();
        let rocket = line.iter().position(|&b| b == 0xF0).unwrap();

        let mut events = decoder.feed(&line[..accent + 1]);
        events.extend(decoder.feed(&line[accent + 1..rocket + 2]));
        assert!(events.is_empty());
        events.extend(decoder.feed(&line[rocket + 2..]));
        assert_eq!(events, vec![StreamEvent::TextDelta("café 🚀".into())]);
    }

    #[test]
    fn test_sse_decoder_tool_arguments_split_inside_character() {
        let mut decoder = SseDecoder::default();
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[",
            "{\"index\":0,\"id\":\"a\",\"function\":{\"name\":\"f\",\"arguments\":\"{\\\"city\\\":\\\"Zürich\\\"}\"}}",
            "]}}]}\n",
            "data: [DONE]\n"
        )
        .as_bytes();
        let mut events = Vec::new();
        for byte in body.chunks(1) {
            events.extend(decoder.feed(byte));
        }
        assert_eq!(
            events[1],
            StreamEvent::ToolCallDelta { index: 0, arguments_delta: "{\"city\":\"Zürich\"}".into() }
        );
        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }

    #[test]
    fn test_sse_decoder_tool_calls_closed_in_index_order() {
        let mut decoder = SseDecoder::default();
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[",
            "{\"index\":1,\"id\":\"b\",\"function\":{\"name\":\"g\",\"arguments\":\"\"}},",
            "{\"index\":0,\"id\":\"a\",\"function\":{\"name\":\"f\",\"arguments\":\"{\\\"x\\\":\"}}",
            "]}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"1}\"}}]}}]}\n",
            "data: [DONE]\n"
        );
        let events = decoder.feed(body);
        assert_eq!(
            events,
            vec![
                StreamEvent::ToolCallStart { index: 1, id: "b".into(), name: "g".into() },
                StreamEvent::ToolCallStart { index: 0, id: "a".into(), name: "f".into() },
                StreamEvent::ToolCallDelta { index: 0, arguments_delta: "{\"x\":".into() },
                StreamEvent::ToolCallDelta { index: 0, arguments_delta: "1}".into() },
                StreamEvent::ToolCallEnd { index: 0 },
                StreamEvent::ToolCallEnd { index: 1 },
                StreamEvent::Done,
            ]
        );
    }

    #[test]
    fn test_sse_decoder_usage_chunk() {
        let mut decoder = SseDecoder::default();
        let events = decoder
            .feed("data: {\"choices\":[],\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":7}}\n");
        assert_eq!(
            events,
            vec![StreamEvent::Usage(Usage { input_tokens: 5, output_tokens: 7 })]
        );
    }

    #[test]
    fn test_sse_decoder_finish_without_done_marker() {
        let mut decoder = SseDecoder::default();
        decoder.feed("data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"a\",\"function\":{\"name\":\"f\"}}]}}]}\n");
        assert_eq!(
            decoder.finish(),
            vec![StreamEvent::ToolCallEnd { index: 0 }, StreamEvent::Done]
        );
        assert!(decoder.finish().is_empty());
    }
}
