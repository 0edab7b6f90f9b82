use crate::demos::{Models, Scenario};
use swarmkit_core::{Agent, FunctionTool, Handoff, Roster};

const TRIAGE: &str = "Support Triage";
const TECH: &str = "Tech Support";
const BILLING: &str = "Billing Support";

const TROUBLESHOOTING: [(&str, &str); 3] = [
    (
        "login",
        "1. Clear browser cache\n2. Reset password\n3. Check email verification",
    ),
    (
        "performance",
        "1. Check internet connection\n2. Clear browser cache\n3. Try incognito mode",
    ),
    (
        "error",
        "1. Screenshot the error\n2. Note the error code\n3. Try again in 5 minutes",
    ),
];

const INVOICES: [(&str, &str); 3] = [
    ("INV001", "Paid"),
    ("INV002", "Pending"),
    ("INV003", "Overdue"),
];

pub fn scenario(models: &Models) -> Scenario {
    let tech = Agent::new(TECH)
        .with_model(&models.default)
        .with_instructions(
            "You are a Technical Support Specialist.
Focus on resolving technical issues and system-related problems.
Use the available diagnostic and troubleshooting tools.",
        )
        .with_function(check_system_status())
        .with_function(troubleshoot_issue());

    let billing = Agent::new(BILLING)
        .with_model(&models.default)
        .with_instructions(
            "You are a Billing Support Specialist.
Handle all payment, invoice, and refund related queries.
Ensure accurate processing of financial transactions.",
        )
        .with_function(check_payment_status())
        .with_function(process_refund());

    let triage = Agent::new(TRIAGE)
        .with_model(&models.default)
        .with_instructions(
            "You are the initial Support Triage Agent.
Determine if the customer needs technical or billing support.
Transfer to the appropriate department using the available functions.
For technical issues: transfer_to_tech_support()
For billing issues: transfer_to_billing_support()",
        )
        .with_function(
            Handoff::new("transfer_to_tech_support", TECH)
                .with_description("Transfer the conversation to technical support")
                .with_message("Transferring to Technical Support..."),
        )
        .with_function(
            Handoff::new("transfer_to_billing_support", BILLING)
                .with_description("Transfer the conversation to billing support")
                .with_message("Transferring to Billing Support..."),
        );

    let roster = Roster::new().with(triage).with(tech).with(billing);
    Scenario::new(roster, TRIAGE)
        .with_banner([
            "Customer Support System Initialized!",
            "Available departments:",
            "- Technical Support (system issues, troubleshooting)",
            "- Billing Support (payments, refunds, invoices)",
            "Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for using our support system! Goodbye!")
        .quiet()
}

fn check_system_status() -> FunctionTool {
    FunctionTool::new("check_system_status", "Check the status of various systems").handler(
        |_, _| {
            tracing::info!("checking system status");
            Ok("All systems operational: Website (✓) | Database (✓) | API (✓)")
        },
    )
}

fn troubleshoot_issue() -> FunctionTool {
    FunctionTool::new("troubleshoot_issue", "Provide troubleshooting steps")
        .string("issue_type", "Type of issue to troubleshoot")
        .handler(|args, _| {
            let issue = args.str("issue_type")?.to_lowercase();
            tracing::info!(issue = %issue, "looking up troubleshooting steps");
            Ok(TROUBLESHOOTING
                .iter()
                .find(|(kind, _)| *kind == issue)
                .map(|(_, steps)| *steps)
                .unwrap_or("No specific steps available for this issue."))
        })
}

fn check_payment_status() -> FunctionTool {
    FunctionTool::new("check_payment_status", "Check payment status")
        .string("invoice_id", "Invoice ID to check")
        .handler(|args, _| {
            let id = args.str("invoice_id")?;
            let status = INVOICES
                .iter()
                .find(|(invoice, _)| *invoice == id)
                .map(|(_, status)| *status)
                .unwrap_or("Not Found");
            Ok(format!("Invoice {id} status: {status}"))
        })
}

fn process_refund() -> FunctionTool {
    FunctionTool::new("process_refund", "Process a refund request")
        .string("order_id", "Order ID to refund")
        .handler(|args, _| {
            let id = args.str("order_id")?;
            tracing::info!(order = id, "processing refund");
            Ok(format!(
                "Refund initiated for order {id}. Please allow 3-5 business days for processing."
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing::call;
    use serde_json::json;
    use swarmkit_core::ContextVariables;

    #[tokio::test]
    async fn test_troubleshooting_is_case_insensitive() {
        let ctx = ContextVariables::new();
        let r = call(&troubleshoot_issue(), json!({"issue_type": "LOGIN"}), &ctx).await;
        assert!(r.value.starts_with("1. Clear browser cache"));

        let r = call(&troubleshoot_issue(), json!({"issue_type": "billing"}), &ctx).await;
        assert_eq!(r.value, "No specific steps available for this issue.");
    }

    #[tokio::test]
    async fn test_payment_status() {
        let ctx = ContextVariables::new();
        let r = call(&check_payment_status(), json!({"invoice_id": "INV003"}), &ctx).await;
        assert_eq!(r.value, "Invoice INV003 status: Overdue");
        let r = call(&check_payment_status(), json!({"invoice_id": "INV999"}), &ctx).await;
        assert_eq!(r.value, "Invoice INV999 status: Not Found");
    }

    #[tokio::test]
    async fn test_triage_hands_off_with_message() {
        let scenario = scenario(&Models::default());
        let triage = scenario.roster.require(TRIAGE).unwrap();
        let handoff = triage.function("transfer_to_billing_support").unwrap();
        let r = call(handoff.as_ref(), json!({}), &scenario.context).await;
        assert_eq!(r.value, "Transferring to Billing Support...");
        assert_eq!(r.agent.as_deref(), Some(BILLING));
    }
}
