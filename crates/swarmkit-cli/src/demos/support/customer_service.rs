use crate::demos::{Models, Scenario};
use swarmkit_core::{Agent, Roster};

const AGENT: &str = "Customer Service Rep";

pub fn scenario(models: &Models) -> Scenario {
    let rep = Agent::new(AGENT).with_model(&models.default).with_instructions(
        "You are a friendly and professional customer service representative.
Your goal is to help customers with their inquiries in a polite and efficient manner.
Always maintain a positive tone and be solution-oriented.",
    );

    Scenario::new(Roster::new().with(rep), AGENT)
        .with_banner([
            "Customer Service Chat Initialized!",
            "Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for chatting! Goodbye!")
        .quiet()
}
