use crate::demos::{Models, Scenario};
use swarmkit_core::{Agent, FunctionTool, Handoff, Roster};

const BASIC: &str = "Basic Processor";
const ADVANCED: &str = "Advanced Processor";

const DELEGATED: &str = "This function will be handled by the model.";

pub fn scenario(models: &Models) -> Scenario {
    let basic = Agent::new(BASIC)
        .with_model(&models.fast)
        .with_instructions(
            "You are a basic text processor.
You handle simple tasks like keyword extraction and sentiment analysis.
Keep responses brief and to the point.",
        )
        .with_function(text_task("extract_keywords", "Extract key words from a text.", "The text to analyze"))
        .with_function(text_task("analyze_sentiment", "Analyze the sentiment of a text.", "The text to analyze"))
        .with_function(
            Handoff::new("transfer_to_advanced", ADVANCED)
                .with_description("Transfer to the advanced agent for complex tasks.")
                .with_message("Transferring to advanced processor for complex task..."),
        );

    let advanced = Agent::new(ADVANCED)
        .with_model(&models.default)
        .with_instructions(
            "You are an advanced text processor.
You handle complex tasks like summarization and translation.
Provide detailed and accurate responses.",
        )
        .with_function(text_task("summarize_text", "Summarize a piece of text.", "The text to summarize"))
        .with_function(
            FunctionTool::new("translate_text", "Translate text to another language.")
                .string("text", "The text to translate")
                .string("target_language", "The target language")
                .handler(|_, _| Ok(DELEGATED)),
        )
        .with_function(
            Handoff::new("transfer_to_basic", BASIC)
                .with_description("Transfer to the basic agent for simple tasks.")
                .with_message("Transferring to basic processor for simple task..."),
        );

    Scenario::new(Roster::new().with(basic).with(advanced), BASIC)
        .with_banner([
            "Multi-Model Processing System started! Type 'exit' to end.",
            "Available tasks:",
            "Basic tasks (fast model):\n- Keyword extraction\n- Sentiment analysis",
            "Advanced tasks (powerful model):\n- Text summarization\n- Translation",
        ])
        .with_farewell("Ending session...")
        .showing_model()
}

/// The work happens in the model; the function only marks the task.
fn text_task(name: &str, description: &str, text_description: &str) -> FunctionTool {
    FunctionTool::new(name, description)
        .string("text", text_description)
        .handler(|_, _| Ok(DELEGATED))
}
