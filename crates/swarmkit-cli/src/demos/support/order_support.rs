use crate::demos::{Models, Scenario};
use rand::seq::SliceRandom;
use swarmkit_core::{Agent, FunctionTool, Roster};

const AGENT: &str = "Order Support Agent";

struct OrderRecord {
    id: &'static str,
    status: &'static str,
    tracking: Option<&'static str>,
    date: &'static str,
}

static ORDERS: [OrderRecord; 3] = [
    OrderRecord {
        id: "ORD123",
        status: "shipped",
        tracking: Some("TRK789"),
        date: "2024-03-15",
    },
    OrderRecord {
        id: "ORD456",
        status: "processing",
        tracking: None,
        date: "2024-03-18",
    },
    OrderRecord {
        id: "ORD789",
        status: "delivered",
        tracking: Some("TRK456"),
        date: "2024-03-10",
    },
];

const TRACKING_STATES: [&str; 5] = [
    "warehouse",
    "in transit",
    "local facility",
    "out for delivery",
    "delivered",
];

fn order(id: &str) -> Option<&'static OrderRecord> {
    ORDERS.iter().find(|o| o.id == id)
}

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_instructions(
            "You are an Order Support Agent who can help customers check their order status and track shipments.
Use the available functions to assist customers with their inquiries.
Always verify order numbers before checking status or tracking.",
        )
        .with_function(check_order_status())
        .with_function(track_shipment());

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_banner([
            "Order Support System Initialized!",
            "Available commands:",
            "- Check order status (e.g., 'What's the status of order ORD123?')",
            "- Track shipment (e.g., 'Track my order ORD123')",
            "- Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for using our Order Support! Goodbye!")
        .quiet()
}

fn check_order_status() -> FunctionTool {
    FunctionTool::new("check_order_status", "Check the status of an order")
        .string("order_id", "The order ID to check")
        .handler(|args, _| {
            let id = args.str("order_id")?;
            Ok(match order(id) {
                Some(o) => format!(
                    "Order {id} is currently {}. Order date: {}",
                    o.status, o.date
                ),
                None => format!("Order {id} not found in our system."),
            })
        })
}

fn track_shipment() -> FunctionTool {
    FunctionTool::new("track_shipment", "Track a shipment for an order")
        .string("order_id", "The order ID to track")
        .handler(|args, _| {
            let id = args.str("order_id")?;
            let Some(o) = order(id) else {
                return Ok(format!("Order {id} not found in our system."));
            };
            let Some(tracking) = o.tracking else {
                return Ok(format!("Order {id} doesn't have tracking information yet."));
            };
            let state = TRACKING_STATES
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or("in transit");
            Ok(format!(
                "Tracking number {tracking} for order {id} - Status: {state}"
            ))
        })
}
