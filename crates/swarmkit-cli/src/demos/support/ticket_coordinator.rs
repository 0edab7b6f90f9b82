use crate::demos::{now_stamp, Models, Scenario, TurnHook};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use swarmkit_core::{
    Agent, ContextVariables, FunctionTool, Message, Role, Roster, RunOptions, Swarm, SwarmError,
};

const COORDINATOR: &str = "Support Coordinator";
const ASSESSOR: &str = "Priority Assessor";
const ROUTER: &str = "Department Router";

const PRIORITY_KEYWORDS: [(&str, &str); 6] = [
    ("urgent", "high"),
    ("emergency", "high"),
    ("broken", "high"),
    ("bug", "medium"),
    ("question", "low"),
    ("help", "low"),
];

const DEPARTMENT_KEYWORDS: [(&str, &str); 6] = [
    ("password", "security"),
    ("login", "security"),
    ("payment", "billing"),
    ("charge", "billing"),
    ("bug", "technical"),
    ("error", "technical"),
];

const STATUSES: [&str; 5] = ["new", "in_progress", "pending", "resolved", "closed"];

fn assess(description: &str) -> &'static str {
    let description = description.to_lowercase();
    PRIORITY_KEYWORDS
        .iter()
        .find(|(keyword, _)| description.contains(keyword))
        .map(|(_, priority)| *priority)
        .unwrap_or("medium")
}

fn route(description: &str) -> &'static str {
    let description = description.to_lowercase();
    DEPARTMENT_KEYWORDS
        .iter()
        .find(|(keyword, _)| description.contains(keyword))
        .map(|(_, department)| *department)
        .unwrap_or("general")
}

#[derive(Debug, Clone)]
struct Ticket {
    description: String,
    customer_email: String,
    status: String,
    created_at: String,
    priority: String,
    department: String,
}

#[derive(Debug, Default)]
struct Desk {
    counter: u32,
    tickets: BTreeMap<String, Ticket>,
}

#[derive(Debug, Clone, Default)]
struct Shared(Arc<Mutex<Desk>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Desk> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn scenario(models: &Models) -> Scenario {
    build(models, Shared::default())
}

fn build(models: &Models, desk: Shared) -> Scenario {
    let coordinator = Agent::new(COORDINATOR)
        .with_model(&models.default)
        .with_instructions(
            "You are a Support Coordinator managing customer support tickets.
Handle ticket creation, status updates, and coordinate with assessment and routing specialists.
Use the available functions to manage tickets efficiently.",
        )
        .with_function(create_ticket(desk.clone()))
        .with_function(get_ticket_status(desk.clone()))
        .with_function(update_ticket_status(desk));

    Scenario::new(Roster::new().with(coordinator), COORDINATOR)
        .with_banner([
            "Support Ticket System Initialized!",
            "Available commands:",
            "- Create ticket (e.g., 'I need help with login issues')",
            "- Check status (e.g., 'What's the status of TICK0001?')",
            "- Update status (e.g., 'Mark TICK0001 as resolved')",
            "Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for using our Support System! Goodbye!")
        .with_hook(Triage::new(models))
        .quiet()
}

/// Assesses priority and department on the fast model before a ticket request
/// reaches the coordinator.
struct Triage {
    roster: Roster,
}

impl Triage {
    fn new(models: &Models) -> Self {
        let assessor = Agent::new(ASSESSOR)
            .with_model(&models.fast)
            .with_instructions(
                "You are a Priority Assessment Specialist.
Quickly evaluate support tickets and determine their priority level.
Use the assess_priority function to evaluate ticket descriptions.",
            )
            .with_function(assess_priority());
        let router = Agent::new(ROUTER)
            .with_model(&models.fast)
            .with_instructions(
                "You are a Department Routing Specialist.
Quickly determine which department should handle each ticket.
Use the route_to_department function to evaluate ticket descriptions.",
            )
            .with_function(route_to_department());
        Self {
            roster: Roster::new().with(assessor).with(router),
        }
    }

    fn is_ticket_request(input: &str) -> bool {
        let input = input.to_lowercase();
        input.contains("help") || input.contains("issue")
    }

    /// Runs one specialist on the bare input and reads the value after `": "`
    /// from its tool result, or from its reply when it answered directly.
    async fn ask(
        &self,
        swarm: &Swarm,
        options: &RunOptions,
        agent: &str,
        function: &str,
        input: &str,
    ) -> Result<String, SwarmError> {
        let options = RunOptions::default().with_max_turns(options.max_turns);
        let response = swarm
            .run(
                &self.roster,
                agent,
                vec![Message::user(input)],
                ContextVariables::new(),
                options,
            )
            .await?;
        let tool_output = response
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Tool && m.tool_name.as_deref() == Some(function));
        let text = tool_output
            .or_else(|| response.reply())
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        text.split_once(": ")
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SwarmError::Other(format!("{agent} returned no assessment")))
    }

    async fn assess_into(
        &self,
        swarm: &Swarm,
        options: &RunOptions,
        input: &str,
        lines: &mut Vec<String>,
        context: &mut ContextVariables,
    ) -> Result<(), SwarmError> {
        let priority = self
            .ask(swarm, options, ASSESSOR, "assess_priority", input)
            .await?;
        lines.push(format!("Priority Assessment: {priority}"));
        context.set("assessed_priority", priority);

        let department = self
            .ask(swarm, options, ROUTER, "route_to_department", input)
            .await?;
        lines.push(format!("Department Assignment: {department}"));
        context.set("assigned_department", department);
        Ok(())
    }
}

#[async_trait::async_trait]
impl TurnHook for Triage {
    async fn before_turn(
        &self,
        swarm: &Swarm,
        options: &RunOptions,
        input: &str,
        context: &mut ContextVariables,
    ) -> Vec<String> {
        context.remove("assessed_priority");
        context.remove("assigned_department");
        if !Self::is_ticket_request(input) {
            return Vec::new();
        }

        let mut lines = Vec::new();
        if let Err(e) = self
            .assess_into(swarm, options, input, &mut lines, context)
            .await
        {
            tracing::warn!(error = %e, "ticket assessment failed");
            lines.push(format!("Warning: Assessment error: {e}"));
            lines.push("Proceeding with default values...".to_string());
        }
        lines
    }
}

fn assess_priority() -> FunctionTool {
    FunctionTool::new(
        "assess_priority",
        "Assess ticket priority based on description",
    )
    .string("description", "Ticket description")
    .handler(|args, _| {
        Ok(format!(
            "Assessed priority: {}",
            assess(args.str("description")?)
        ))
    })
}

fn route_to_department() -> FunctionTool {
    FunctionTool::new(
        "route_to_department",
        "Route ticket to appropriate department",
    )
    .string("description", "Ticket description")
    .handler(|args, _| Ok(format!("Routed to: {}", route(args.str("description")?))))
}

fn create_ticket(desk: Shared) -> FunctionTool {
    FunctionTool::new("create_ticket", "Create a new support ticket")
        .string("description", "Ticket description")
        .string("customer_email", "Customer's email")
        .handler(move |args, ctx| {
            let email = args.str("customer_email")?;
            tracing::info!(customer = email, "creating ticket");
            let mut desk = desk.lock();
            desk.counter += 1;
            let id = format!("TICK{:04}", desk.counter);
            desk.tickets.insert(
                id.clone(),
                Ticket {
                    description: args.str("description")?.to_string(),
                    customer_email: email.to_string(),
                    status: "new".to_string(),
                    created_at: now_stamp(),
                    priority: ctx
                        .get_str("assessed_priority")
                        .unwrap_or("medium")
                        .to_string(),
                    department: ctx
                        .get_str("assigned_department")
                        .unwrap_or("general")
                        .to_string(),
                },
            );
            Ok(format!("Created ticket {id}"))
        })
}

fn get_ticket_status(desk: Shared) -> FunctionTool {
    FunctionTool::new("get_ticket_status", "Get ticket status")
        .string("ticket_id", "Ticket ID to check")
        .handler(move |args, _| {
            let id = args.str("ticket_id")?;
            let desk = desk.lock();
            let Some(ticket) = desk.tickets.get(id) else {
                return Ok(format!("Ticket {id} not found"));
            };
            tracing::debug!(
                ticket = id,
                customer = %ticket.customer_email,
                description = %ticket.description,
                "ticket lookup"
            );
            Ok(format!(
                "Ticket {id}:\nStatus: {}\nPriority: {}\nDepartment: {}\nCreated: {}",
                ticket.status, ticket.priority, ticket.department, ticket.created_at
            ))
        })
}

fn update_ticket_status(desk: Shared) -> FunctionTool {
    FunctionTool::new("update_ticket_status", "Update ticket status")
        .string("ticket_id", "Ticket ID to update")
        .string("new_status", "New status value")
        .handler(move |args, _| {
            let id = args.str("ticket_id")?;
            let status = args.str("new_status")?;
            let mut desk = desk.lock();
            let Some(ticket) = desk.tickets.get_mut(id) else {
                return Ok(format!(
                    "Error updating ticket status: Ticket {id} not found"
                ));
            };
            if !STATUSES.contains(&status) {
                return Ok(format!(
                    "Error updating ticket status: Invalid status. Must be one of: {}",
                    STATUSES.join(", ")
                ));
            }
            ticket.status = status.to_string();
            Ok(format!("Updated ticket {id} status to: {status}"))
        })
}
