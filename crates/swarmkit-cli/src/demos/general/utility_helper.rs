use crate::demos::{format_number, Models, Scenario};
use rand::seq::SliceRandom;
use rand::Rng;
use swarmkit_core::{Agent, FunctionTool, Roster};

const AGENT: &str = "Utility Helper";

const CONDITIONS: [&str; 4] = ["Sunny", "Cloudy", "Rainy", "Windy"];

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_instructions(
            "You are a helpful assistant with access to various utility functions.
You can:
1. Tell the current time
2. Perform basic calculations
3. Check weather (simulated)

Use these functions when appropriate in conversation.
Always explain what you're doing before using a function.",
        )
        .with_function(get_current_time())
        .with_function(calculate())
        .with_function(get_fake_weather());

    Scenario::new(Roster::new().with(agent), AGENT).with_banner([
        "Utility Agent Chat started! Type 'exit' to end.",
        "Try asking about:\n- Current time\n- Math calculations\n- Weather in any city",
    ])
}

fn get_current_time() -> FunctionTool {
    FunctionTool::new("get_current_time", "Get the current time in a readable format.")
        .handler(|_, _| Ok(chrono::Local::now().format("%I:%M %p").to_string()))
}

pub(crate) fn calculate() -> FunctionTool {
    FunctionTool::new("calculate", "Perform basic mathematical operations.")
        .string("operation", "One of 'add', 'subtract', 'multiply', 'divide'")
        .number("x", "First number")
        .number("y", "Second number")
        .handler(|args, _| {
            let operation = args.str("operation")?;
            let x = args.f64("x")?;
            let y = args.f64("y")?;

            let result = match operation.to_lowercase().as_str() {
                "add" => x + y,
                "subtract" => x - y,
                "multiply" => x * y,
                "divide" if y == 0.0 => return Ok("Error: Cannot divide by zero".to_string()),
                "divide" => x / y,
                _ => return Ok(format!("Error: Unknown operation '{operation}'")),
            };

            Ok(format!(
                "Result of {operation}({}, {}) = {}",
                format_number(x),
                format_number(y),
                format_number(result)
            ))
        })
}

fn get_fake_weather() -> FunctionTool {
    FunctionTool::new("get_fake_weather", "Get simulated weather information for a city.")
        .string("city", "Name of the city")
        .handler(|args, _| {
            let city = args.str("city")?;
            let mut rng = rand::thread_rng();
            let temp = rng.gen_range(0..=35);
            let condition = CONDITIONS.choose(&mut rng).copied().unwrap_or("Sunny");
            Ok(format!("Weather in {city}: {condition}, {temp}°C"))
        })
}
