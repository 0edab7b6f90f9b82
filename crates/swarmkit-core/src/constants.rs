/// swarmkit: centralized constants.
/// Model names, endpoints and limits live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    /// Capable model used by most agents.
    pub const DEFAULT_MODEL: &str = "gpt-4o";
    /// Cheaper, faster model for triage and simple tasks.
    pub const FAST_MODEL: &str = "gpt-4o-mini";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
    pub const MAX_TURNS: usize = 25;
    pub const EXIT_KEYWORD: &str = "exit";
}

// ─── Resource Limits ──────────────────────────────────────────────────────────

pub mod limits {
    /// Longest tool result echoed back through `SwarmEvent::ToolResult`.
    pub const TOOL_SUMMARY_CHARS: usize = 200;
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "swarmkit";
    pub const CONFIG_FILE: &str = "config.toml";
    /// REPL input history, next to the config file.
    pub const HISTORY_FILE: &str = "history";
}
