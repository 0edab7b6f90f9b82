use crate::demos::{Models, Scenario};
use serde_json::{json, Value};
use swarmkit_core::{Agent, ContextVariables, FunctionResult, FunctionTool, Roster};

const AGENT: &str = "Storyteller";

struct CharacterClass {
    name: &'static str,
    health: i64,
    inventory: [&'static str; 2],
}

static CLASSES: [CharacterClass; 3] = [
    CharacterClass {
        name: "warrior",
        health: 120,
        inventory: ["sword", "shield"],
    },
    CharacterClass {
        name: "mage",
        health: 80,
        inventory: ["staff", "spellbook"],
    },
    CharacterClass {
        name: "rogue",
        health: 100,
        inventory: ["dagger", "lockpicks"],
    },
];

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_instructions(
            "You are an interactive storyteller.
Create an engaging fantasy adventure story based on the user's character.
After each story segment, provide 3 choices (A, B, C) for the user to choose from.
Use the character's stats and inventory in the story.
Make the story adapt to the user's choices.
Keep each story segment concise but engaging.",
        )
        .with_function(create_character())
        .with_function(make_choice())
        .with_function(get_character_status());

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_context(initial_context())
        .with_banner([
            "Interactive Storyteller started! Type 'exit' to end.",
            "First, create your character with: create character [name] [class]",
            "Available classes: warrior, mage, rogue",
        ])
        .with_thinking_line("Storyteller is weaving the tale...")
        .with_farewell("Ending story...")
        .streaming()
}

fn initial_context() -> ContextVariables {
    ContextVariables::new()
        .with("current_chapter", 1)
        .with("character_name", "")
        .with("character_class", "")
        .with("health", 100)
        .with("inventory", json!([]))
}

fn create_character() -> FunctionTool {
    FunctionTool::new("create_character", "Create a new character for the story.")
        .string("name", "Character name")
        .string("character_class", "Type of character (warrior, mage, rogue)")
        .handler(|args, _| {
            let name = args.str("name")?;
            let class = args.str("character_class")?;
            let key = class.to_lowercase();

            let Some(info) = CLASSES.iter().find(|c| c.name == key) else {
                let names: Vec<&str> = CLASSES.iter().map(|c| c.name).collect();
                return Ok(FunctionResult::new(format!(
                    "Invalid class. Choose from: {}",
                    names.join(", ")
                )));
            };

            let value = format!(
                "Character created: {name} the {class}\nHealth: {}\nInventory: {}",
                info.health,
                info.inventory.join(", ")
            );
            Ok(FunctionResult::new(value)
                .with_context("character_name", name)
                .with_context("character_class", key)
                .with_context("health", info.health)
                .with_context("inventory", json!(info.inventory)))
        })
}

fn make_choice() -> FunctionTool {
    FunctionTool::new("make_choice", "Make a choice in the story.")
        .string("choice", "The choice made (A, B, or C)")
        .handler(|args, _| Ok(format!("You chose option {}.", args.str("choice")?)))
}

fn get_character_status() -> FunctionTool {
    FunctionTool::new(
        "get_character_status",
        "Get the current status of the character.",
    )
    .handler(|_, ctx| {
        let inventory: Vec<&str> = ctx
            .get_array("inventory")
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        Ok(format!(
            "\nCharacter Status:\nName: {}\nClass: {}\nHealth: {}\nInventory: {}\n",
            ctx.get_str("character_name").unwrap_or("Not created"),
            ctx.get_str("character_class").unwrap_or("Not created"),
            ctx.get_i64("health").unwrap_or(0),
            inventory.join(", ")
        ))
    })
}
