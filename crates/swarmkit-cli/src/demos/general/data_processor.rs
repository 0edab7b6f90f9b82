use crate::demos::{Models, Scenario};
use std::time::Duration;
use swarmkit_core::{Agent, Args, ContextVariables, FunctionTool, Roster, SwarmError};

const AGENT: &str = "Data Processor";

/// Simulated cost of each analysis.
const PROCESSING_DELAY: Duration = Duration::from_secs(1);

static SAMPLE_DATA: [(&str, [f64; 10]); 3] = [
    (
        "temperature",
        [20.0, 22.0, 21.0, 23.0, 22.0, 24.0, 23.0, 25.0, 24.0, 26.0],
    ),
    (
        "humidity",
        [45.0, 48.0, 47.0, 46.0, 45.0, 44.0, 46.0, 47.0, 48.0, 49.0],
    ),
    (
        "pressure",
        [
            1013.0, 1014.0, 1012.0, 1011.0, 1013.0, 1015.0, 1014.0, 1012.0, 1011.0, 1010.0,
        ],
    ),
];

fn series(metric: &str) -> Option<&'static [f64; 10]> {
    SAMPLE_DATA
        .iter()
        .find(|(name, _)| *name == metric)
        .map(|(_, values)| values)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_instructions(
            "You are a data processing assistant.
You can analyze multiple metrics in parallel using the available functions.
When asked about multiple metrics, use parallel tool calls for efficiency.
Always explain the results in a clear and concise way.
Use get_available_metrics() if user needs to know what metrics are available.",
        )
        .with_function(metric_tool(
            "calculate_average",
            "Calculate the average value for a metric.",
            |metric, values| format!("Average {metric}: {:.2}", mean(values)),
        ))
        .with_function(metric_tool(
            "find_peak_value",
            "Find the peak value for a metric.",
            |metric, values| {
                let peak = values.iter().copied().fold(f64::MIN, f64::max);
                format!("Peak {metric}: {peak}")
            },
        ))
        .with_function(metric_tool(
            "calculate_trend",
            "Calculate the trend for a metric.",
            |metric, values| {
                let (first, second) = values.split_at(values.len() / 2);
                let (first, second) = (mean(first), mean(second));
                let trend = if second > first {
                    "increasing"
                } else if second < first {
                    "decreasing"
                } else {
                    "stable"
                };
                format!("{} trend: {trend}", capitalize(metric))
            },
        ))
        .with_function(get_available_metrics())
        .with_parallel_tool_calls(true);

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_banner([
            "Data Processing System started! Type 'exit' to end.",
            "Try asking about:\n- Average values\n- Peak values\n- Trends\nFor multiple metrics at once!",
        ])
        .with_thinking_line("Processing data...")
        .with_farewell("Ending session...")
        .timed()
}

/// A function taking one `metric` argument that sleeps before analysing it.
fn metric_tool(
    name: &str,
    description: &str,
    analyse: fn(&str, &[f64]) -> String,
) -> FunctionTool {
    FunctionTool::new(name, description)
        .string(
            "metric",
            "The metric to analyze (temperature, humidity, pressure)",
        )
        .async_handler(move |args: Args, _ctx: ContextVariables| process(args, analyse))
}

async fn process(args: Args, analyse: fn(&str, &[f64]) -> String) -> Result<String, SwarmError> {
    let metric = args.str("metric")?;
    let Some(values) = series(metric) else {
        return Ok(format!("Error: Metric '{metric}' not found"));
    };
    tokio::time::sleep(PROCESSING_DELAY).await;
    Ok(analyse(metric, values))
}

fn get_available_metrics() -> FunctionTool {
    FunctionTool::new("get_available_metrics", "List all available metrics.").handler(|_, _| {
        let names: Vec<&str> = SAMPLE_DATA.iter().map(|(name, _)| *name).collect();
        Ok(format!("Available metrics: {}", names.join(", ")))
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
