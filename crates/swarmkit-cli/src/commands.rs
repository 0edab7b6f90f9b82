/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Clear the conversation history.
    Clear,
    /// End the session.
    Quit,
    /// Override the model for every agent in this session.
    ModelChanged(String),
    /// Drop the session model override.
    ModelReset,
    /// Show the model the active agent runs on.
    ShowModel,
    /// Show the active agent.
    ShowAgent,
    /// List the agents of the running example.
    ShowAgents,
    /// Dump the context variables.
    ShowContext,
    /// Print the conversation history.
    ShowHistory,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/clear" => CommandResult::Clear,

        "/model" => match arg {
            "" => CommandResult::ShowModel,
            "default" | "reset" => CommandResult::ModelReset,
            name => CommandResult::ModelChanged(name.to_string()),
        },
        "/agent" => CommandResult::ShowAgent,
        "/agents" => CommandResult::ShowAgents,
        "/context" | "/ctx" => CommandResult::ShowContext,
        "/history" => CommandResult::ShowHistory,
        "/version" => CommandResult::Message(format!("swarmkit v{}", env!("CARGO_PKG_VERSION"))),

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ swarmkit commands ────────────────────────────────────────────╮

  CONVERSATION
    /clear                    Clear conversation history
    /history                  Show the conversation so far
    /context, /ctx            Show context variables

  AGENTS & MODELS
    /agent                    Show the active agent
    /agents                   List the agents in this example
    /model                    Show the active model
    /model <name>             Run every agent on <name>
    /model default            Drop the model override

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          End the session (or type 'exit')

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
