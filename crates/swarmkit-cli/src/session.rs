//! One interactive conversation with an example: history, context and the
//! active agent carried from turn to turn.

use crate::demos::{Intake, Scenario};
use std::sync::Arc;
use std::time::{Duration, Instant};
use swarmkit_core::constants::defaults;
use swarmkit_core::{
    ContextVariables, ConversationHistory, LlmClient, Message, RunOptions, Swarm, SwarmError,
    SwarmEvent,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

/// What happened during one turn, for the REPL to print.
#[derive(Debug, Clone, Default)]
pub struct TurnReport {
    /// Lines produced before the run, e.g. by a pre-assessment hook.
    pub notes: Vec<String>,
    /// Set when the turn ended on a different agent.
    pub transferred_to: Option<String>,
    /// Sender and text of the final assistant message.
    pub reply: Option<(String, String)>,
    pub elapsed: Duration,
}

pub struct ChatSession {
    swarm: Swarm,
    scenario: Scenario,
    history: ConversationHistory,
    context: ContextVariables,
    agent: String,
    options: RunOptions,
}

impl ChatSession {
    pub fn new(scenario: Scenario, client: Arc<dyn LlmClient>) -> Self {
        let options = RunOptions::default().with_stream(scenario.stream);
        Self {
            swarm: Swarm::new(client),
            history: ConversationHistory::new(),
            context: scenario.context.clone(),
            agent: scenario.start.clone(),
            scenario,
            options,
        }
    }

    /// Replace the run options. Streaming stays on for examples that stream.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        let stream = options.stream || self.scenario.stream;
        self.options = options.with_stream(stream);
        self
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn agent_name(&self) -> &str {
        &self.agent
    }

    pub fn context(&self) -> &ContextVariables {
        &self.context
    }

    pub fn history(&self) -> &[Message] {
        self.history.messages()
    }

    pub fn intake(&self) -> Option<&Intake> {
        self.scenario.intake.as_ref()
    }

    /// Store the answer to the intake question. Blank answers are ignored.
    pub fn answer_intake(&mut self, answer: &str) {
        let answer = answer.trim();
        if answer.is_empty() {
            return;
        }
        if let Some(key) = self.scenario.intake.as_ref().map(|i| i.key.clone()) {
            self.context.set(key, answer);
            self.history.add_user_message(answer);
        }
    }

    pub fn is_exit(input: &str) -> bool {
        input.trim().eq_ignore_ascii_case(defaults::EXIT_KEYWORD)
    }

    /// The model the active agent runs on, after any session override.
    pub fn active_model(&self) -> String {
        self.model_of(&self.agent)
    }

    fn model_of(&self, agent: &str) -> String {
        match &self.options.model_override {
            Some(model) => model.clone(),
            None => self
                .scenario
                .roster
                .get(agent)
                .map(|a| a.model.clone())
                .unwrap_or_default(),
        }
    }

    pub fn set_model_override(&mut self, model: Option<String>) {
        self.options.model_override = model;
    }

    pub fn model_override(&self) -> Option<&str> {
        self.options.model_override.as_deref()
    }

    /// Every agent of the example with the model it will run on.
    pub fn agents(&self) -> Vec<(String, String)> {
        self.scenario
            .roster
            .names()
            .iter()
            .map(|name| (name.clone(), self.model_of(name)))
            .collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Status line shown while a turn runs, if the example shows one.
    pub fn thinking_line(&self) -> Option<String> {
        if !self.scenario.show_thinking {
            return None;
        }
        if let Some(line) = &self.scenario.thinking {
            return Some(line.clone());
        }
        if self.scenario.show_model {
            return Some(format!(
                "{} ({}) is processing...",
                self.agent,
                self.active_model()
            ));
        }
        Some(format!("{} is thinking...", self.agent))
    }

    /// Announcement for a handoff to `agent`.
    pub fn transfer_line(&self, agent: &str) -> String {
        if self.scenario.show_model {
            format!("Switched to {agent} ({})", self.model_of(agent))
        } else {
            format!("Transferred to {agent}!")
        }
    }

    /// Run one user turn from the active agent.
    ///
    /// The user message stays in the history even when the run fails, so the
    /// next turn sees it.
    pub async fn handle_turn(
        &mut self,
        input: &str,
        events: Option<UnboundedSender<SwarmEvent>>,
    ) -> Result<TurnReport, SwarmError> {
        let started = Instant::now();
        let mut report = TurnReport::default();

        if let Some(hook) = self.scenario.hook.clone() {
            report.notes = hook
                .before_turn(&self.swarm, &self.options, input, &mut self.context)
                .await;
        }

        self.history.add_user_message(input);
        let events = events.unwrap_or_else(|| unbounded_channel().0);
        let response = self
            .swarm
            .run_with_events(
                &self.scenario.roster,
                &self.agent,
                self.history.to_vec(),
                self.context.clone(),
                self.options.clone(),
                events,
            )
            .await?;

        if let Some(reply) = response.reply() {
            let sender = reply.sender.clone().unwrap_or_else(|| response.agent.clone());
            report.reply = Some((sender, reply.content.clone()));
        }
        if response.agent != self.agent {
            tracing::debug!(from = %self.agent, to = %response.agent, "active agent changed");
            report.transferred_to = Some(response.agent.clone());
            self.agent = response.agent;
        }
        self.history.extend(response.messages);
        self.context = response.context_variables;
        report.elapsed = started.elapsed();
        Ok(report)
    }
}
