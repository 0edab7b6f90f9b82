//! Interactive chat REPL over a [`ChatSession`], with persistent input history.

use crate::commands::{handle_command, CommandResult};
use crate::session::{ChatSession, TurnReport};
use anyhow::Result;
use rustyline::error::ReadlineError;
use std::io::Write;
use std::path::PathBuf;
use swarmkit_core::constants::paths;
use swarmkit_core::{Delim, Message, Role, SwarmError, SwarmEvent};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

const PROMPT: &str = "You: ";

pub struct ChatRepl {
    session: ChatSession,
    editor: rustyline::DefaultEditor,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(session: ChatSession) -> Result<Self> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let history_path = history_file_path();
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }
        Ok(Self {
            session,
            editor,
            history_path,
        })
    }

    /// Run until the user types `exit`, `/quit` or sends EOF.
    pub async fn run(&mut self) -> Result<()> {
        for line in &self.session.scenario().banner {
            println!("{line}");
        }
        println!();

        if let Some(prompt) = self.session.intake().map(|i| i.prompt.clone()) {
            match self.editor.readline(&prompt) {
                Ok(answer) => self.session.answer_intake(&answer),
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    self.farewell();
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(&line);
                    if ChatSession::is_exit(&line) {
                        self.farewell();
                        break;
                    }
                    match handle_command(&line) {
                        CommandResult::NotACommand => self.turn(&line).await,
                        CommandResult::Quit => {
                            self.farewell();
                            break;
                        }
                        other => self.apply(other),
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    self.farewell();
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.save_history();
        Ok(())
    }

    async fn turn(&mut self, input: &str) {
        if let Some(line) = self.session.thinking_line() {
            println!("\n{line}");
        }

        let (tx, rx) = unbounded_channel();
        let printer = tokio::spawn(print_stream(rx));
        let outcome = tokio::select! {
            result = self.session.handle_turn(input, Some(tx)) => result,
            _ = tokio::signal::ctrl_c() => Err(SwarmError::Cancelled),
        };
        let streamed = printer.await.unwrap_or(false);

        match outcome {
            Ok(report) => self.show_report(&report, streamed),
            Err(SwarmError::Cancelled) => println!("\nCancelled.\n"),
            Err(e) => {
                tracing::debug!(error = ?e, "turn failed");
                eprintln!("\nError: {e}");
                println!("Please try again.\n");
            }
        }
    }

    fn show_report(&self, report: &TurnReport, streamed: bool) {
        for note in &report.notes {
            println!("{note}");
        }
        if let Some(agent) = &report.transferred_to {
            println!("\n{}", self.session.transfer_line(agent));
        }
        if !streamed {
            if let Some((sender, content)) = &report.reply {
                println!("\n{sender}: {content}");
            }
        }
        if self.session.scenario().show_timing {
            println!("Processing time: {:.2} seconds", report.elapsed.as_secs_f64());
        }
        println!();
    }

    fn apply(&mut self, command: CommandResult) {
        match command {
            CommandResult::Message(text) => println!("{text}"),
            CommandResult::Clear => {
                self.session.clear_history();
                println!("Conversation history cleared.");
            }
            CommandResult::ModelChanged(model) => {
                println!("Every agent now runs on {model}.");
                self.session.set_model_override(Some(model));
            }
            CommandResult::ModelReset => {
                self.session.set_model_override(None);
                println!("Model override removed; agents use their own models.");
            }
            CommandResult::ShowModel => match self.session.model_override() {
                Some(model) => println!("Model: {model} (override)"),
                None => println!("Model: {}", self.session.active_model()),
            },
            CommandResult::ShowAgent => println!(
                "Active agent: {} ({})",
                self.session.agent_name(),
                self.session.active_model()
            ),
            CommandResult::ShowAgents => {
                for (name, model) in self.session.agents() {
                    let marker = if name == self.session.agent_name() { "*" } else { " " };
                    println!("{marker} {name} ({model})");
                }
            }
            CommandResult::ShowContext => {
                let context = self.session.context();
                if context.is_empty() {
                    println!("No context variables.");
                } else {
                    let pretty = serde_json::to_string_pretty(&context.to_value())
                        .unwrap_or_else(|e| format!("<unprintable context: {e}>"));
                    println!("{pretty}");
                }
            }
            CommandResult::ShowHistory => {
                let history = self.session.history();
                if history.is_empty() {
                    println!("No messages yet.");
                }
                for message in history {
                    println!("{}", describe(message));
                }
            }
            CommandResult::Quit | CommandResult::NotACommand => {}
        }
    }

    fn farewell(&self) {
        println!("\n{}", self.session.scenario().farewell);
    }

    fn save_history(&mut self) {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }
    }
}

/// Resolve the history file path at `~/.config/swarmkit/history`.
fn history_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(paths::CONFIG_DIR).join(paths::HISTORY_FILE))
}

/// One line per history entry for `/history`.
pub fn describe(message: &Message) -> String {
    match message.role {
        Role::User => format!("You: {}", message.content),
        Role::System => format!("[system] {}", message.content),
        Role::Tool => format!(
            "  [{}] {}",
            message.tool_name.as_deref().unwrap_or("tool"),
            message.content
        ),
        Role::Assistant => {
            let sender = message.sender.as_deref().unwrap_or("Assistant");
            match &message.tool_calls {
                Some(calls) if !calls.is_empty() => {
                    let names: Vec<&str> = calls.iter().map(|c| c.function.name.as_str()).collect();
                    format!("{sender}: (calls {})", names.join(", "))
                }
                _ => format!("{sender}: {}", message.content),
            }
        }
    }
}

/// Print streamed text as it arrives, prefixed by its sender.
/// Returns whether any text was printed.
async fn print_stream(mut rx: UnboundedReceiver<SwarmEvent>) -> bool {
    let mut printer = StreamPrinter::default();
    let mut stdout = std::io::stdout();
    while let Some(event) = rx.recv().await {
        printer.write_event(&event, &mut stdout).ok();
    }
    printer.close(&mut stdout).ok();
    printer.printed
}

/// Lays out streamed deltas, one line per assistant message.
#[derive(Debug, Default)]
struct StreamPrinter {
    printed: bool,
    line_open: bool,
}

impl StreamPrinter {
    fn write_event(&mut self, event: &SwarmEvent, out: &mut impl Write) -> std::io::Result<()> {
        match event {
            SwarmEvent::TextDelta { sender, text } => {
                if !self.line_open {
                    write!(out, "\n{sender}: ")?;
                    self.line_open = true;
                    self.printed = true;
                }
                write!(out, "{text}")?;
                out.flush()?;
            }
            SwarmEvent::Delim(Delim::End) => self.close(out)?,
            SwarmEvent::ToolStart { name } => tracing::debug!(tool = %name, "tool started"),
            SwarmEvent::ToolResult {
                name,
                success,
                summary,
            } => tracing::debug!(tool = %name, success, summary = %summary, "tool finished"),
            SwarmEvent::Handoff { from, to } => tracing::debug!(%from, %to, "handoff"),
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        if self.line_open {
            writeln!(out)?;
            self.line_open = false;
        }
        Ok(())
    }
}
