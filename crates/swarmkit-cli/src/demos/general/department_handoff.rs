use crate::demos::{Models, Scenario};
use rand::seq::SliceRandom;
use swarmkit_core::{Agent, FunctionTool, Handoff, Roster};

const SUPPORT: &str = "Support Agent";
const SALES: &str = "Sales Agent";
const TECH: &str = "Technical Agent";

const ORDER_STATUSES: [&str; 4] = ["Processing", "Shipped", "Delivered", "Pending"];

const PRODUCTS: [(&str, &str); 3] = [
    ("laptop", "High-performance laptop with 16GB RAM, 512GB SSD"),
    ("phone", "Latest smartphone with 5G capability"),
    ("tablet", "10-inch tablet with retina display"),
];

const FAQS: [(&str, &str); 3] = [
    (
        "wifi",
        "1. Restart your device\n2. Check WiFi settings\n3. Reset network settings",
    ),
    (
        "battery",
        "1. Check power settings\n2. Update firmware\n3. Contact support if issue persists",
    ),
    (
        "update",
        "1. Go to Settings\n2. Check for Updates\n3. Install available updates",
    ),
];

pub fn scenario(models: &Models) -> Scenario {
    let to_support = || {
        Handoff::new("transfer_to_support", SUPPORT)
            .with_description("Transfer the conversation to the support agent.")
            .with_message("Transferring you to our support team...")
    };
    let to_sales = || {
        Handoff::new("transfer_to_sales", SALES)
            .with_description("Transfer the conversation to the sales agent.")
            .with_message("Transferring you to our sales team...")
    };
    let to_tech = || {
        Handoff::new("transfer_to_tech", TECH)
            .with_description("Transfer the conversation to the technical support agent.")
            .with_message("Transferring you to our technical support team...")
    };

    let support = Agent::new(SUPPORT)
        .with_model(&models.default)
        .with_instructions(
            "You are a customer support agent.
You handle general inquiries and can check order status.
If the query is about sales or technical issues, transfer to the appropriate agent.",
        )
        .with_function(check_order_status())
        .with_function(to_sales())
        .with_function(to_tech());

    let sales = Agent::new(SALES)
        .with_model(&models.default)
        .with_instructions(
            "You are a sales agent.
You provide product information and handle sales inquiries.
If the query is about support or technical issues, transfer to the appropriate agent.",
        )
        .with_function(get_product_info())
        .with_function(to_support())
        .with_function(to_tech());

    let tech = Agent::new(TECH)
        .with_model(&models.default)
        .with_instructions(
            "You are a technical support agent.
You handle technical issues and provide troubleshooting steps.
If the query is about sales or general support, transfer to the appropriate agent.",
        )
        .with_function(technical_faq())
        .with_function(to_support())
        .with_function(to_sales());

    Scenario::new(Roster::new().with(support).with(sales).with(tech), SUPPORT).with_banner([
        "Customer Service System started! Type 'exit' to end.",
        "You can ask about:\n- Order status\n- Product information\n- Technical support",
    ])
}

fn check_order_status() -> FunctionTool {
    FunctionTool::new("check_order_status", "Check the status of an order.")
        .string("order_id", "The order ID to check")
        .handler(|args, _| {
            let order_id = args.str("order_id")?;
            let status = ORDER_STATUSES
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or("Processing");
            Ok(format!("Order {order_id} status: {status}"))
        })
}

fn get_product_info() -> FunctionTool {
    FunctionTool::new("get_product_info", "Get information about a product.")
        .string("product_name", "Name of the product")
        .handler(|args, _| {
            let name = args.str("product_name")?;
            let key = name.to_lowercase();
            Ok(PRODUCTS
                .iter()
                .find(|(product, _)| *product == key)
                .map(|(_, info)| info.to_string())
                .unwrap_or_else(|| format!("Product '{name}' not found.")))
        })
}

fn technical_faq() -> FunctionTool {
    FunctionTool::new("technical_faq", "Get technical support for common issues.")
        .string("issue", "The technical issue description")
        .handler(|args, _| {
            let issue = args.str("issue")?;
            let lowered = issue.to_lowercase();
            Ok(FAQS
                .iter()
                .find(|(keyword, _)| lowered.contains(keyword))
                .map(|(_, solution)| format!("Solution for {issue}:\n{solution}"))
                .unwrap_or_else(|| {
                    "No specific solution found. Please contact technical support.".to_string()
                }))
        })
}
