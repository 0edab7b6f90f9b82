use crate::demos::{Models, Scenario};
use serde_json::{json, Value};
use swarmkit_core::{Agent, ContextVariables, FunctionResult, FunctionTool, Roster};

const AGENT: &str = "Personal Support Agent";

fn issues(ctx: &ContextVariables) -> Vec<String> {
    ctx.get_array("previous_issues")
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn instructions(ctx: &ContextVariables) -> String {
    let previous = issues(ctx);
    let previous = if previous.is_empty() {
        "None".to_string()
    } else {
        previous.join(", ")
    };
    format!(
        "You are a Personal Support Agent for {}.
Preferred Language: {}
Previous Issues: {previous}

Tailor your responses based on the customer's preferences and history.
Be proactive in suggesting solutions based on previous interactions.",
        ctx.get_str("customer_name").unwrap_or("valued customer"),
        ctx.get_str("preferred_language").unwrap_or("English"),
    )
}

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_dynamic_instructions(instructions)
        .with_function(update_preferences())
        .with_function(add_issue())
        .with_function(get_customer_profile());

    let context = ContextVariables::new()
        .with("customer_name", "Guest")
        .with("preferred_language", "English")
        .with("previous_issues", json!([]));

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_context(context)
        .with_banner([
            "Personal Support System Initialized!",
            "Available commands:",
            "- Update preferences (e.g., 'I prefer Spanish')",
            "- Report issue (e.g., 'I had a problem with login')",
            "- View profile (e.g., 'Show my profile')",
            "- Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for using our Personal Support! Goodbye!")
        .quiet()
}

fn update_preferences() -> FunctionTool {
    FunctionTool::new("update_preferences", "Update customer preferences")
        .string("preference_type", "Type of preference to update")
        .string("value", "New value for the preference")
        .handler(|args, _| {
            let key = args.str("preference_type")?;
            let value = args.str("value")?;
            Ok(FunctionResult::new(format!("Updated {key} to: {value}")).with_context(key, value))
        })
}

fn add_issue() -> FunctionTool {
    FunctionTool::new("add_issue", "Add a new issue to customer history")
        .string("issue", "New issue to add")
        .handler(|args, ctx| {
            let issue = args.str("issue")?;
            let mut history = issues(ctx);
            history.push(issue.to_string());
            Ok(FunctionResult::new(format!("Added issue to history: {issue}"))
                .with_context("previous_issues", history))
        })
}

fn get_customer_profile() -> FunctionTool {
    FunctionTool::new("get_customer_profile", "Get customer profile summary").handler(|_, ctx| {
        let previous = issues(ctx);
        let previous = if previous.is_empty() {
            "None".to_string()
        } else {
            previous.join(", ")
        };
        Ok(format!(
            "Customer Name: {}\nPreferred Language: {}\nPrevious Issues: {previous}",
            ctx.get_str("customer_name").unwrap_or("Not set"),
            ctx.get_str("preferred_language").unwrap_or("Not set"),
        ))
    })
}
