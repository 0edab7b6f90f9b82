use crate::demos::{format_number, Models, Scenario};
use rand::Rng;
use std::time::Duration;
use swarmkit_core::{Agent, Args, FunctionTool, RetryPolicy, Roster, SwarmError, WithRetry};

const AGENT: &str = "Error Handler";
const MAX_RETRIES: u32 = 3;

struct TaskProfile {
    name: &'static str,
    success_rate: f64,
    retry_delay: Duration,
}

static TASKS: [TaskProfile; 3] = [
    TaskProfile {
        name: "process_data",
        success_rate: 0.7,
        retry_delay: Duration::from_millis(1000),
    },
    TaskProfile {
        name: "validate_input",
        success_rate: 0.9,
        retry_delay: Duration::from_millis(500),
    },
    TaskProfile {
        name: "generate_report",
        success_rate: 0.8,
        retry_delay: Duration::from_millis(1500),
    },
];

fn profile(task_name: &str) -> Option<&'static TaskProfile> {
    TASKS.iter().find(|t| t.name == task_name)
}

/// Unknown tasks always fail.
fn simulate_task_execution(task_name: &str) -> bool {
    profile(task_name).is_some_and(|t| rand::thread_rng().gen::<f64>() < t.success_rate)
}

fn retrying(function: FunctionTool) -> WithRetry<FunctionTool> {
    let policy = RetryPolicy {
        max_attempts: MAX_RETRIES,
        delay: Duration::from_secs(1),
    };
    WithRetry::new(function, policy).with_delay_fn(|args: &Args| {
        args.opt_str("task_name")
            .ok()
            .flatten()
            .and_then(profile)
            .map(|t| t.retry_delay)
    })
}

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_instructions(
            "You are a robust task execution agent.
You handle tasks that may fail and implement retry strategies.
When a task fails:
1. Inform the user about the failure
2. Explain the retry strategy
3. Suggest alternatives if available

Always monitor task success rates and adapt your approach accordingly.
Use simpler tasks when multiple failures occur.",
        )
        .with_function(retrying(process_data()))
        .with_function(retrying(validate_input()))
        .with_function(retrying(generate_report()))
        .with_function(list_available_tasks());

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_banner([
            "Robust Task Executor started! Type 'exit' to end.",
            "Try:\n- Processing data\n- Validating input\n- Generating reports",
            "Note: Tasks may fail randomly to demonstrate error handling",
        ])
        .with_thinking_line("Executing task...")
        .with_farewell("Ending session...")
}

fn process_data() -> FunctionTool {
    FunctionTool::new("process_data", "Process some data with error simulation.")
        .string("task_name", "Name of the task")
        .string("data", "Data to process")
        .handler(|args, _| {
            let data = args.str("data")?;
            if !simulate_task_execution(args.str("task_name")?) {
                return Err(SwarmError::Other(format!("Failed to process data: {data}")));
            }
            Ok(format!("Successfully processed data: {data}"))
        })
}

fn validate_input() -> FunctionTool {
    FunctionTool::new("validate_input", "Validate input data with error simulation.")
        .string("task_name", "Name of the task")
        .string("input_data", "Data to validate")
        .handler(|args, _| {
            let input = args.str("input_data")?;
            if !simulate_task_execution(args.str("task_name")?) {
                return Err(SwarmError::Other(format!("Failed to validate input: {input}")));
            }
            Ok(format!("Input validated successfully: {input}"))
        })
}

fn generate_report() -> FunctionTool {
    FunctionTool::new("generate_report", "Generate a report with error simulation.")
        .string("task_name", "Name of the task")
        .string("report_type", "Type of report to generate")
        .handler(|args, _| {
            let report_type = args.str("report_type")?;
            if !simulate_task_execution(args.str("task_name")?) {
                return Err(SwarmError::Other(format!(
                    "Failed to generate {report_type} report"
                )));
            }
            Ok(format!("Generated {report_type} report successfully"))
        })
}

fn list_available_tasks() -> FunctionTool {
    FunctionTool::new(
        "list_available_tasks",
        "List all available tasks and their success rates.",
    )
    .handler(|_, _| {
        let lines: Vec<String> = TASKS
            .iter()
            .map(|t| {
                format!(
                    "{}: {}% success rate",
                    t.name,
                    format_number((t.success_rate * 100.0).round())
                )
            })
            .collect();
        Ok(format!("Available tasks:\n{}", lines.join("\n")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing::call;
    use serde_json::json;
    use swarmkit_core::{AgentFunction, ContextVariables};

    #[tokio::test]
    async fn test_list_available_tasks() {
        let r = call(&list_available_tasks(), json!({}), &ContextVariables::new()).await;
        assert_eq!(
            r.value,
            "Available tasks:\nprocess_data: 70.0% success rate\nvalidate_input: 90.0% success rate\ngenerate_report: 80.0% success rate"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_task_exhausts_retries() {
        let function = retrying(generate_report());
        assert_eq!(function.name(), "generate_report");

        let started = tokio::time::Instant::now();
        let r = call(
            &function,
            json!({"task_name": "mystery", "report_type": "sales"}),
            &ContextVariables::new(),
        )
        .await;

        assert_eq!(r.value, "Failed after 3 retries: Failed to generate sales report");
        // default delay between each of the three attempts
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn test_retry_delay_follows_task_profile() {
        assert_eq!(
            profile("generate_report").map(|t| t.retry_delay),
            Some(Duration::from_millis(1500))
        );
        assert!(profile("mystery").is_none());
        assert!(!simulate_task_execution("mystery"));
    }
}
