mod customer_service;
mod order_support;
mod personal_support;
mod product_specialist;
mod restaurant;
mod shopping_assistant;
mod support_platform;
mod support_triage;
mod ticket_coordinator;
mod travel_advisor;

use super::{Category, Demo};

pub fn demos() -> Vec<Demo> {
    use Category::Support;
    vec![
        Demo::new(
            "customer-service",
            "Customer service representative",
            Support,
            customer_service::scenario,
        ),
        Demo::new(
            "order-support",
            "Function calling: order status and shipment tracking",
            Support,
            order_support::scenario,
        ),
        Demo::new(
            "personal-support",
            "Context variables: preferences and issue history",
            Support,
            personal_support::scenario,
        ),
        Demo::new(
            "support-triage",
            "Agent handoff: triage to technical or billing",
            Support,
            support_triage::scenario,
        ),
        Demo::new(
            "product-specialist",
            "Streaming: product details and comparisons",
            Support,
            product_specialist::scenario,
        ),
        Demo::new(
            "travel-advisor",
            "Parallel tool calls: flights, hotels and cars",
            Support,
            travel_advisor::scenario,
        ),
        Demo::new(
            "ticket-coordinator",
            "Model override: fast-model triage before ticketing",
            Support,
            ticket_coordinator::scenario,
        ),
        Demo::new(
            "shopping-assistant",
            "Advanced context: preferences, cart and checkout",
            Support,
            shopping_assistant::scenario,
        ),
        Demo::new(
            "restaurant",
            "Multi-agent workflow: order taking, kitchen and delivery",
            Support,
            restaurant::scenario,
        ),
        Demo::new(
            "support-platform",
            "Complete platform: knowledge base, tickets and live chat",
            Support,
            support_platform::scenario,
        ),
    ]
}
