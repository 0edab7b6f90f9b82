use crate::demos::{now_stamp, Models, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use swarmkit_core::{
    Agent, ContextVariables, FunctionResult, FunctionTool, Handoff, Roster, SwarmError,
};

const KNOWLEDGE: &str = "Knowledge Base Agent";
const TICKETS: &str = "Ticket Support Agent";
const CHAT: &str = "Live Chat Agent";

const STATUSES: [&str; 5] = ["open", "in_progress", "pending", "resolved", "closed"];

struct Article {
    category: &'static str,
    id: &'static str,
    title: &'static str,
    content: &'static str,
    tags: [&'static str; 3],
}

static KNOWLEDGE_BASE: [Article; 6] = [
    Article {
        category: "account",
        id: "password_reset",
        title: "How to Reset Your Password",
        content: "1. Go to the login page\n2. Click 'Forgot Password'\n3. Enter your email\n4. Follow the instructions in the email",
        tags: ["account", "password", "login"],
    },
    Article {
        category: "account",
        id: "account_deletion",
        title: "How to Delete Your Account",
        content: "1. Go to Account Settings\n2. Scroll to bottom\n3. Click 'Delete Account'\n4. Confirm deletion",
        tags: ["account", "deletion", "privacy"],
    },
    Article {
        category: "billing",
        id: "refund_policy",
        title: "Refund Policy",
        content: "- 30-day money-back guarantee\n- Full refund for unused services\n- Contact billing support for processing",
        tags: ["billing", "refund", "payment"],
    },
    Article {
        category: "billing",
        id: "payment_methods",
        title: "Accepted Payment Methods",
        content: "We accept:\n- Credit/Debit Cards\n- PayPal\n- Bank Transfer",
        tags: ["billing", "payment", "methods"],
    },
    Article {
        category: "technical",
        id: "system_requirements",
        title: "System Requirements",
        content: "Minimum Requirements:\n- 4GB RAM\n- 2GHz Processor\n- 10GB Free Space",
        tags: ["technical", "requirements", "specs"],
    },
    Article {
        category: "technical",
        id: "api_documentation",
        title: "API Documentation",
        content: "API Base URL: api.example.com\nAuthentication: Bearer token\nRate Limit: 100 requests/minute",
        tags: ["technical", "api", "development"],
    },
];

impl Article {
    fn mentions(&self, term: &str) -> bool {
        self.content.to_lowercase().contains(term)
            || self.title.to_lowercase().contains(term)
            || self.tags.join(" ").contains(term)
    }
}

#[derive(Debug, Clone)]
struct TicketUpdate {
    timestamp: String,
    message: String,
}

#[derive(Debug, Clone)]
struct Ticket {
    customer_email: String,
    subject: String,
    description: String,
    priority: String,
    status: String,
    created_at: String,
    updates: Vec<TicketUpdate>,
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

/// A live chat transcript, kept in the context under `chat_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatSession {
    customer_name: String,
    start_time: String,
    messages: Vec<ChatLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatLine {
    timestamp: String,
    sender: String,
    message: String,
}

impl ChatLine {
    fn now(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: now_stamp(),
            sender: sender.into(),
            message: message.into(),
        }
    }
}

fn chat_session(ctx: &ContextVariables) -> Result<Option<ChatSession>, SwarmError> {
    match ctx.get("chat_session") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
    }
}

pub fn scenario(models: &Models) -> Scenario {
    build(models, Shared::default())
}

fn build(models: &Models, desk: Shared) -> Scenario {
    let to_knowledge = || {
        Handoff::new("transfer_to_knowledge_base", KNOWLEDGE)
            .with_description("Transfer to knowledge base agent")
            .with_message("Transferring to knowledge base...")
    };
    let to_tickets = || {
        Handoff::new("transfer_to_ticket_support", TICKETS)
            .with_description("Transfer to ticket support agent")
            .with_message("Transferring to ticket support...")
    };
    let to_chat = || {
        Handoff::new("transfer_to_live_chat", CHAT)
            .with_description("Transfer to live chat agent")
            .with_message("Transferring to live chat...")
    };

    let knowledge = Agent::new(KNOWLEDGE)
        .with_model(&models.fast)
        .with_instructions(
            "You are a Knowledge Base Specialist.
Help customers find relevant articles and information.
Use the search and retrieval functions to find answers quickly.",
        )
        .with_function(search_knowledge_base())
        .with_function(get_article())
        .with_function(to_tickets())
        .with_function(to_chat());

    let tickets = Agent::new(TICKETS)
        .with_model(&models.default)
        .with_instructions(
            "You are a Ticket Support Specialist.
Handle ticket creation, updates, and status changes.
Ensure proper documentation of all customer interactions.",
        )
        .with_function(create_ticket(desk.clone()))
        .with_function(update_ticket(desk.clone()))
        .with_function(get_ticket_details(desk))
        .with_function(to_knowledge())
        .with_function(to_chat());

    let chat = Agent::new(CHAT)
        .with_model(&models.default)
        .with_instructions(
            "You are a Live Chat Support Agent.
Provide real-time assistance to customers.
Maintain a friendly and helpful tone throughout the conversation.",
        )
        .with_function(start_chat_session())
        .with_function(add_chat_message())
        .with_function(end_chat_session())
        .with_function(to_knowledge())
        .with_function(to_tickets());

    let roster = Roster::new().with(knowledge).with(tickets).with(chat);
    Scenario::new(roster, KNOWLEDGE)
        .with_banner([
            "Customer Support Platform Initialized!",
            "Available services:",
            "1. Knowledge Base",
            "   - Search articles (e.g., 'Search for password reset')",
            "   - View article (e.g., 'Show me the refund policy')",
            "2. Ticket Support",
            "   - Create ticket (e.g., 'I need help with billing')",
            "   - Check status (e.g., 'What's the status of TICK0001?')",
            "3. Live Chat",
            "   - Start chat (e.g., 'I want to chat with support')",
            "Type 'exit' to end the session",
        ])
        .with_farewell("Thank you for using our support platform! Goodbye!")
        .quiet()
}

fn search_knowledge_base() -> FunctionTool {
    FunctionTool::new("search_knowledge_base", "Search the knowledge base for articles")
        .string("query", "Search query")
        .handler(|args, _| {
            let query = args.str("query")?.to_lowercase();
            tracing::info!(query = %query, "searching knowledge base");
            let hits: Vec<String> = KNOWLEDGE_BASE
                .iter()
                .filter(|article| query.split_whitespace().any(|term| article.mentions(term)))
                .map(|article| format!("[{}] {}", article.category.to_uppercase(), article.title))
                .collect();
            if hits.is_empty() {
                return Ok("No relevant articles found.".to_string());
            }
            Ok(format!("Found relevant articles:\n{}", hits.join("\n")))
        })
}

fn get_article() -> FunctionTool {
    FunctionTool::new("get_article", "Get a specific knowledge base article")
        .string("category", "Article category")
        .string("article_id", "Article ID")
        .handler(|args, _| {
            let category = args.str("category")?;
            let id = args.str("article_id")?;
            Ok(KNOWLEDGE_BASE
                .iter()
                .find(|a| a.category == category && a.id == id)
                .map(|a| {
                    format!(
                        "Title: {}\n\nContent:\n{}\n\nTags: {}",
                        a.title,
                        a.content,
                        a.tags.join(", ")
                    )
                })
                .unwrap_or_else(|| "Article not found.".to_string()))
        })
}

fn create_ticket(desk: Shared) -> FunctionTool {
    FunctionTool::new("create_ticket", "Create a support ticket")
        .string("customer_email", "Customer's email")
        .string("subject", "Ticket subject")
        .string("description", "Ticket description")
        .opt_string("priority", "Ticket priority")
        .handler(move |args, _| {
            let mut desk = desk.lock();
            desk.counter += 1;
            let id = format!("TICK{:04}", desk.counter);
            let ticket = Ticket {
                customer_email: args.str("customer_email")?.to_string(),
                subject: args.str("subject")?.to_string(),
                description: args.str("description")?.to_string(),
                priority: args.opt_str("priority")?.unwrap_or("medium").to_string(),
                status: "open".to_string(),
                created_at: now_stamp(),
                updates: Vec::new(),
            };
            tracing::info!(ticket = %id, customer = %ticket.customer_email, "ticket created");
            desk.tickets.insert(id.clone(), ticket);
            Ok(FunctionResult::new(format!("Created ticket {id}"))
                .with_context("current_ticket_id", id))
        })
}

fn update_ticket(desk: Shared) -> FunctionTool {
    FunctionTool::new("update_ticket", "Update a support ticket")
        .string("ticket_id", "Ticket to update")
        .string("update_text", "Update message")
        .opt_string("new_status", "Optional new status")
        .one_of(STATUSES)
        .handler(move |args, _| {
            let id = args.str("ticket_id")?;
            let mut desk = desk.lock();
            let Some(ticket) = desk.tickets.get_mut(id) else {
                return Ok(format!("Ticket {id} not found"));
            };
            let status = args.opt_str("new_status")?.filter(|s| !s.is_empty());
            if let Some(status) = status {
                if !STATUSES.contains(&status) {
                    return Ok(format!(
                        "Invalid status. Must be one of: {}",
                        STATUSES.join(", ")
                    ));
                }
                ticket.status = status.to_string();
            }
            ticket.updates.push(TicketUpdate {
                timestamp: now_stamp(),
                message: args.str("update_text")?.to_string(),
            });
            Ok(format!("Updated ticket {id}"))
        })
}

fn get_ticket_details(desk: Shared) -> FunctionTool {
    FunctionTool::new("get_ticket_details", "Get detailed ticket information")
        .string("ticket_id", "Ticket to view")
        .handler(move |args, _| {
            let id = args.str("ticket_id")?;
            let desk = desk.lock();
            let Some(ticket) = desk.tickets.get(id) else {
                return Ok(format!("Ticket {id} not found"));
            };
            let mut lines = vec![
                format!("Ticket {id}:"),
                format!("Subject: {}", ticket.subject),
                format!("Status: {}", ticket.status),
                format!("Priority: {}", ticket.priority),
                format!("Created: {}", ticket.created_at),
                "\nDescription:".to_string(),
                ticket.description.clone(),
                "\nUpdates:".to_string(),
            ];
            lines.extend(
                ticket
                    .updates
                    .iter()
                    .map(|u| format!("[{}] {}", u.timestamp, u.message)),
            );
            Ok(lines.join("\n"))
        })
}

fn start_chat_session() -> FunctionTool {
    FunctionTool::new("start_chat_session", "Start a live chat session")
        .string("customer_name", "Customer's name")
        .string("initial_message", "Initial chat message")
        .handler(|args, _| {
            let customer = args.str("customer_name")?;
            let session = ChatSession {
                customer_name: customer.to_string(),
                start_time: now_stamp(),
                messages: vec![ChatLine::now(customer, args.str("initial_message")?)],
            };
            Ok(
                FunctionResult::new(format!("Started chat session with {customer}"))
                    .with_context("chat_session", serde_json::to_value(&session)?),
            )
        })
}

fn add_chat_message() -> FunctionTool {
    FunctionTool::new("add_chat_message", "Add a message to the chat session")
        .string("message", "Chat message")
        .boolean("is_customer", "Whether the message is from the customer")
        .handler(|args, ctx| {
            let Some(mut session) = chat_session(ctx)? else {
                return Ok(FunctionResult::new("No active chat session"));
            };
            let sender = if args.opt_bool("is_customer")?.unwrap_or(true) {
                session.customer_name.clone()
            } else {
                "Support Agent".to_string()
            };
            session
                .messages
                .push(ChatLine::now(sender.clone(), args.str("message")?));
            Ok(FunctionResult::new(format!("Added message from {sender}"))
                .with_context("chat_session", serde_json::to_value(&session)?))
        })
}

fn end_chat_session() -> FunctionTool {
    FunctionTool::new("end_chat_session", "End the current chat session").handler(|_, ctx| {
        let Some(session) = chat_session(ctx)? else {
            return Ok(FunctionResult::new("No active chat session"));
        };
        tracing::info!(
            customer = %session.customer_name,
            started = %session.start_time,
            messages = session.messages.len(),
            "chat session ended"
        );
        // A null entry clears the session once merged into the shared context.
        Ok(
            FunctionResult::new(format!("Ended chat session with {}", session.customer_name))
                .with_context("chat_session", serde_json::Value::Null),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing::call;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_matches_any_term() {
        let ctx = ContextVariables::new();
        let r = call(&search_knowledge_base(), json!({"query": "password reset"}), &ctx).await;
        assert_eq!(r.value, "Found relevant articles:\n[ACCOUNT] How to Reset Your Password");

        let r = call(&search_knowledge_base(), json!({"query": "PAYMENT"}), &ctx).await;
        assert_eq!(
            r.value,
            "Found relevant articles:\n[BILLING] Refund Policy\n[BILLING] Accepted Payment Methods"
        );

        let r = call(&search_knowledge_base(), json!({"query": "quantum"}), &ctx).await;
        assert_eq!(r.value, "No relevant articles found.");
    }

    #[tokio::test]
    async fn test_get_article() {
        let ctx = ContextVariables::new();
        let args = json!({"category": "technical", "article_id": "api_documentation"});
        let r = call(&get_article(), args, &ctx).await;
        assert!(r.value.starts_with("Title: API Documentation\n\nContent:\nAPI Base URL"));
        assert!(r.value.ends_with("Tags: technical, api, development"));

        let args = json!({"category": "billing", "article_id": "api_documentation"});
        let r = call(&get_article(), args, &ctx).await;
        assert_eq!(r.value, "Article not found.");
    }

    #[tokio::test]
    async fn test_ticket_lifecycle() {
        let desk = Shared::default();
        let ctx = ContextVariables::new();
        let args = json!({
            "customer_email": "a@example.com",
            "subject": "Refund",
            "description": "Charged twice"
        });
        let r = call(&create_ticket(desk.clone()), args, &ctx).await;
        assert_eq!(r.value, "Created ticket TICK0001");
        assert_eq!(r.context_variables.get_str("current_ticket_id"), Some("TICK0001"));

        let update = update_ticket(desk.clone());
        let r = call(&update, json!({"ticket_id": "TICK0001", "update_text": "x", "new_status": "done"}), &ctx).await;
        assert_eq!(
            r.value,
            "Invalid status. Must be one of: open, in_progress, pending, resolved, closed"
        );
        let r = call(&update, json!({"ticket_id": "TICK0001", "update_text": "Refund issued", "new_status": "resolved"}), &ctx).await;
        assert_eq!(r.value, "Updated ticket TICK0001");
        let r = call(&update, json!({"ticket_id": "TICK0404", "update_text": "?"}), &ctx).await;
        assert_eq!(r.value, "Ticket TICK0404 not found");

        let r = call(&get_ticket_details(desk.clone()), json!({"ticket_id": "TICK0001"}), &ctx).await;
        assert!(r.value.starts_with("Ticket TICK0001:\nSubject: Refund\nStatus: resolved\nPriority: medium\n"));
        assert!(r.value.contains("\n\nDescription:\nCharged twice\n\nUpdates:\n["));
        assert!(r.value.ends_with("] Refund issued"));
        assert_eq!(desk.lock().tickets["TICK0001"].updates.len(), 1);
    }

    #[tokio::test]
    async fn test_chat_session_flow() {
        let mut ctx = ContextVariables::new();
        let r = call(&add_chat_message(), json!({"message": "hi", "is_customer": true}), &ctx).await;
        assert_eq!(r.value, "No active chat session");

        let args = json!({"customer_name": "Dana", "initial_message": "Hello?"});
        let r = call(&start_chat_session(), args, &ctx).await;
        assert_eq!(r.value, "Started chat session with Dana");
        ctx.update(r.context_variables);

        let r = call(&add_chat_message(), json!({"message": "How can I help?", "is_customer": false}), &ctx).await;
        assert_eq!(r.value, "Added message from Support Agent");
        ctx.update(r.context_variables);
        let r = call(&add_chat_message(), json!({"message": "My login fails", "is_customer": true}), &ctx).await;
        assert_eq!(r.value, "Added message from Dana");
        ctx.update(r.context_variables);
        assert_eq!(chat_session(&ctx).unwrap().unwrap().messages.len(), 3);

        let r = call(&end_chat_session(), json!({}), &ctx).await;
        assert_eq!(r.value, "Ended chat session with Dana");
        ctx.update(r.context_variables);
        assert!(chat_session(&ctx).unwrap().is_none());

        let r = call(&end_chat_session(), json!({}), &ctx).await;
        assert_eq!(r.value, "No active chat session");
    }
}
