mod basic_chat;
mod data_processor;
mod department_handoff;
mod rpg_game;
mod shopping_cart;
mod storyteller;
mod task_executor;
mod text_processor;
mod utility_helper;
mod virtual_company;

use super::{Category, Demo};

pub fn demos() -> Vec<Demo> {
    use Category::General;
    vec![
        Demo::new("basic-chat", "Simple chat agent", General, basic_chat::scenario),
        Demo::new(
            "utility-helper",
            "Function calling: time, calculator and weather",
            General,
            utility_helper::scenario,
        ),
        Demo::new(
            "shopping-cart",
            "Context variables: a shopping cart",
            General,
            shopping_cart::scenario,
        ),
        Demo::new(
            "department-handoff",
            "Agent handoff between support, sales and technical",
            General,
            department_handoff::scenario,
        ),
        Demo::new(
            "storyteller",
            "Streaming: an interactive adventure",
            General,
            storyteller::scenario,
        ),
        Demo::new(
            "data-processor",
            "Parallel tool calls over sensor data",
            General,
            data_processor::scenario,
        ),
        Demo::new(
            "text-processor",
            "Model override: basic and advanced processors",
            General,
            text_processor::scenario,
        ),
        Demo::new(
            "task-executor",
            "Error handling: retrying flaky tasks",
            General,
            task_executor::scenario,
        ),
        Demo::new("rpg-game", "Advanced context: a text RPG", General, rpg_game::scenario),
        Demo::new(
            "virtual-company",
            "Multi-agent workflow: a virtual company",
            General,
            virtual_company::scenario,
        ),
    ]
}
