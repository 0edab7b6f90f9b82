use crate::demos::{Models, Scenario};
use swarmkit_core::{Agent, Roster};

pub const AGENT: &str = "Basic Helper";

pub fn scenario(models: &Models) -> Scenario {
    let helper = Agent::new(AGENT).with_model(&models.default).with_instructions(
        "You are a helpful and friendly AI assistant. Keep your responses concise and clear.",
    );

    Scenario::new(Roster::new().with(helper), AGENT)
        .with_banner(["Chat started! Type 'exit' to end the conversation."])
}
