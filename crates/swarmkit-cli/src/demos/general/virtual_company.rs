use crate::demos::{Models, Scenario};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use swarmkit_core::{Agent, ContextVariables, FunctionResult, FunctionTool, Handoff, Roster};

const RECEPTIONIST: &str = "Receptionist";
const SALES: &str = "Sales Agent";
const SUPPORT: &str = "Support Agent";
const TECHNICAL: &str = "Technical Agent";
const MANAGEMENT: &str = "Management Agent";

const PRIORITIES: [&str; 3] = ["low", "medium", "high"];

#[derive(Debug, Clone)]
struct Product {
    price: f64,
    stock: i64,
    category: &'static str,
}

#[derive(Debug, Clone)]
struct Order {
    product: String,
    quantity: i64,
    total_price: f64,
    status: &'static str,
    customer_name: String,
}

#[derive(Debug, Clone)]
struct Ticket {
    issue: String,
    priority: String,
    status: &'static str,
    customer_name: String,
    assigned_to: Option<String>,
}

/// In-memory company records shared by every agent's functions.
#[derive(Debug)]
struct Company {
    products: BTreeMap<&'static str, Product>,
    /// Department name to its staff; the front of the queue gets the next ticket.
    employees: Vec<(&'static str, VecDeque<&'static str>)>,
    orders: BTreeMap<i64, Order>,
    tickets: BTreeMap<i64, Ticket>,
}

impl Default for Company {
    fn default() -> Self {
        let product = |price, stock, category| Product {
            price,
            stock,
            category,
        };
        Self {
            products: BTreeMap::from([
                ("laptop", product(999.99, 50, "electronics")),
                ("smartphone", product(599.99, 100, "electronics")),
                ("desk", product(299.99, 30, "furniture")),
                ("chair", product(199.99, 45, "furniture")),
            ]),
            employees: vec![
                ("sales", VecDeque::from(["John", "Alice"])),
                ("support", VecDeque::from(["Bob", "Carol"])),
                ("technical", VecDeque::from(["Dave", "Eve"])),
                ("management", VecDeque::from(["Frank"])),
            ],
            orders: BTreeMap::new(),
            tickets: BTreeMap::new(),
        }
    }
}

impl Company {
    fn staff_mut(&mut self, department: &str) -> Option<&mut VecDeque<&'static str>> {
        self.employees
            .iter_mut()
            .find(|(name, _)| *name == department)
            .map(|(_, staff)| staff)
    }
}

#[derive(Debug, Clone, Default)]
struct Shared(Arc<Mutex<Company>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Company> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn customer(ctx: &ContextVariables) -> String {
    ctx.get_str("customer_name").unwrap_or("Unknown").to_string()
}

pub fn scenario(models: &Models) -> Scenario {
    build(models, Shared::default())
}

fn build(models: &Models, company: Shared) -> Scenario {
    let to_sales = || {
        Handoff::new("transfer_to_sales", SALES)
            .with_description("Transfer to sales department.")
            .with_message("Transferring to sales...")
    };
    let to_support = || {
        Handoff::new("transfer_to_support", SUPPORT)
            .with_description("Transfer to support department.")
            .with_message("Transferring to support...")
    };
    let to_technical = || {
        Handoff::new("transfer_to_technical", TECHNICAL)
            .with_description("Transfer to technical department.")
            .with_message("Transferring to technical support...")
    };
    let to_management = || {
        Handoff::new("transfer_to_management", MANAGEMENT)
            .with_description("Transfer to management.")
            .with_message("Transferring to management...")
    };
    let to_receptionist = || {
        Handoff::new("transfer_to_receptionist", RECEPTIONIST)
            .with_description("Transfer back to receptionist.")
            .with_message("Transferring back to reception...")
    };

    let receptionist = Agent::new(RECEPTIONIST)
        .with_model(&models.fast)
        .with_instructions(
            "You are the company receptionist.
You handle initial customer contact and direct them to appropriate departments.
For sales inquiries -> Sales Agent
For support issues -> Support Agent
For technical questions -> Technical Agent
For management issues -> Management Agent

Always be polite and professional.",
        )
        .with_function(to_sales())
        .with_function(to_support())
        .with_function(to_technical())
        .with_function(to_management());

    let sales = Agent::new(SALES)
        .with_model(&models.default)
        .with_instructions(
            "You are a sales agent.
Handle product inquiries and orders.
Always check product availability before creating orders.
Suggest related products when appropriate.",
        )
        .with_function(check_product_info(&company))
        .with_function(create_order(&company))
        .with_function(check_order_status(&company))
        .with_function(to_support())
        .with_function(to_management())
        .with_function(to_receptionist());

    let support = Agent::new(SUPPORT)
        .with_model(&models.default)
        .with_instructions(
            "You are a support agent.
Handle customer issues and create support tickets.
Prioritize tickets appropriately:
- High: System down, critical features not working
- Medium: Important issues affecting work
- Low: Minor issues, cosmetic problems",
        )
        .with_function(create_support_ticket(&company))
        .with_function(check_ticket_status(&company))
        .with_function(to_technical())
        .with_function(to_management())
        .with_function(to_receptionist());

    let technical = Agent::new(TECHNICAL)
        .with_model(&models.default)
        .with_instructions(
            "You are a technical support specialist.
Handle complex technical issues and provide detailed solutions.
Explain technical concepts in an understandable way.",
        )
        .with_function(check_ticket_status(&company))
        .with_function(assign_ticket(&company))
        .with_function(to_support())
        .with_function(to_management())
        .with_function(to_receptionist());

    let management = Agent::new(MANAGEMENT)
        .with_model(&models.default)
        .with_instructions(
            "You are a management representative.
Handle escalated issues and department oversight.
Monitor department performance and resource allocation.",
        )
        .with_function(get_department_status(&company))
        .with_function(assign_ticket(&company))
        .with_function(to_sales())
        .with_function(to_support())
        .with_function(to_technical())
        .with_function(to_receptionist());

    let roster = Roster::new()
        .with(receptionist)
        .with(sales)
        .with(support)
        .with(technical)
        .with(management);

    Scenario::new(roster, RECEPTIONIST)
        .with_context(ContextVariables::new().with("customer_name", ""))
        .with_banner([
            "Virtual Company System started! Type 'exit' to end.",
            "You're speaking with our receptionist.",
            "Available departments:\n- Sales\n- Support\n- Technical Support\n- Management",
        ])
        .with_intake("Receptionist: Welcome! May I have your name? ", "customer_name")
        .with_farewell("Ending session...")
}

fn check_product_info(company: &Shared) -> FunctionTool {
    let company = company.clone();
    FunctionTool::new("check_product_info", "Get information about a product.")
        .string("product_name", "Name of the product")
        .handler(move |args, _| {
            let name = args.str("product_name")?;
            let company = company.lock();
            Ok(match company.products.get(name) {
                Some(p) => format!(
                    "\nProduct: {name}\nPrice: ${}\nStock: {} units\nCategory: {}\n",
                    p.price, p.stock, p.category
                ),
                None => format!("Product '{name}' not found."),
            })
        })
}

fn create_order(company: &Shared) -> FunctionTool {
    let company = company.clone();
    FunctionTool::new("create_order", "Create a new order.")
        .string("product_name", "Name of the product")
        .integer("quantity", "Quantity to order")
        .handler(move |args, ctx| {
            let name = args.str("product_name")?;
            let quantity = args.i64("quantity")?;
            let mut company = company.lock();

            let Some(product) = company.products.get_mut(name) else {
                return Ok(FunctionResult::new(format!("Product '{name}' not found.")));
            };
            if quantity <= 0 {
                return Ok(FunctionResult::new("Quantity must be positive."));
            }
            if quantity > product.stock {
                return Ok(FunctionResult::new(format!(
                    "Insufficient stock. Only {} units available.",
                    product.stock
                )));
            }

            product.stock -= quantity;
            let total_price = product.price * quantity as f64;
            let order_id = company.orders.len() as i64 + 1;
            company.orders.insert(
                order_id,
                Order {
                    product: name.to_string(),
                    quantity,
                    total_price,
                    status: "pending",
                    customer_name: customer(ctx),
                },
            );

            Ok(FunctionResult::new(format!(
                "Order created successfully!\nOrder ID: {order_id}\nTotal: ${total_price:.2}"
            ))
            .with_context("last_order_id", order_id))
        })
}

fn check_order_status(company: &Shared) -> FunctionTool {
    let company = company.clone();
    FunctionTool::new("check_order_status", "Check the status of an order.")
        .integer("order_id", "The order ID to check")
        .handler(move |args, _| {
            let order_id = args.i64("order_id")?;
            let company = company.lock();
            Ok(match company.orders.get(&order_id) {
                Some(o) => format!(
                    "\nOrder ID: {order_id}\nProduct: {}\nQuantity: {}\nTotal Price: ${:.2}\nStatus: {}\nCustomer: {}\n",
                    o.product, o.quantity, o.total_price, o.status, o.customer_name
                ),
                None => format!("Order {order_id} not found."),
            })
        })
}

fn create_support_ticket(company: &Shared) -> FunctionTool {
    let company = company.clone();
    FunctionTool::new("create_support_ticket", "Create a new support ticket.")
        .string("issue", "Description of the issue")
        .string("priority", "Ticket priority (low, medium, high)")
        .handler(move |args, ctx| {
            let issue = args.str("issue")?;
            let priority = args.str("priority")?;
            let normalized = priority.to_lowercase();
            if !PRIORITIES.contains(&normalized.as_str()) {
                return Ok(FunctionResult::new(
                    "Invalid priority. Use: low, medium, or high",
                ));
            }

            let mut company = company.lock();
            let ticket_id = company.tickets.len() as i64 + 1;
            company.tickets.insert(
                ticket_id,
                Ticket {
                    issue: issue.to_string(),
                    priority: normalized,
                    status: "open",
                    customer_name: customer(ctx),
                    assigned_to: None,
                },
            );

            Ok(FunctionResult::new(format!(
                "Support ticket created.\nTicket ID: {ticket_id}\nPriority: {priority}"
            ))
            .with_context("last_ticket_id", ticket_id))
        })
}

fn check_ticket_status(company: &Shared) -> FunctionTool {
    let company = company.clone();
    FunctionTool::new("check_ticket_status", "Check the status of a support ticket.")
        .integer("ticket_id", "The ticket ID to check")
        .handler(move |args, _| {
            let ticket_id = args.i64("ticket_id")?;
            let company = company.lock();
            Ok(match company.tickets.get(&ticket_id) {
                Some(t) => format!(
                    "\nTicket ID: {ticket_id}\nIssue: {}\nPriority: {}\nStatus: {}\nCustomer: {}\nAssigned to: {}\n",
                    t.issue,
                    t.priority,
                    t.status,
                    t.customer_name,
                    t.assigned_to.as_deref().unwrap_or("Unassigned")
                ),
                None => format!("Ticket {ticket_id} not found."),
            })
        })
}

fn assign_ticket(company: &Shared) -> FunctionTool {
    let company = company.clone();
    FunctionTool::new("assign_ticket", "Assign a ticket to a department.")
        .integer("ticket_id", "The ticket ID to assign")
        .string("department", "Department to assign to")
        .handler(move |args, _| {
            let ticket_id = args.i64("ticket_id")?;
            let department = args.str("department")?;
            let mut company = company.lock();

            if !company.tickets.contains_key(&ticket_id) {
                return Ok(format!("Ticket {ticket_id} not found."));
            }
            let Some(staff) = company.staff_mut(department) else {
                return Ok(format!("Department '{department}' not found."));
            };

            // round-robin
            let Some(assignee) = staff.pop_front() else {
                return Ok(format!("Department '{department}' has no staff."));
            };
            staff.push_back(assignee);

            if let Some(ticket) = company.tickets.get_mut(&ticket_id) {
                ticket.assigned_to = Some(assignee.to_string());
            }
            Ok(format!(
                "Ticket {ticket_id} assigned to {assignee} from {department} department."
            ))
        })
}

fn get_department_status(company: &Shared) -> FunctionTool {
    let company = company.clone();
    FunctionTool::new("get_department_status", "Get the status of a department.")
        .string("department", "Name of the department")
        .handler(move |args, _| {
            let department = args.str("department")?;
            let company = company.lock();
            let Some((_, staff)) = company.employees.iter().find(|(name, _)| *name == department)
            else {
                return Ok(format!("Department '{department}' not found."));
            };

            let active = company
                .tickets
                .values()
                .filter(|t| {
                    t.assigned_to
                        .as_deref()
                        .is_some_and(|who| staff.iter().any(|s| *s == who))
                })
                .count();
            let names: Vec<&str> = staff.iter().copied().collect();

            Ok(format!(
                "\nDepartment: {department}\nEmployees: {}\nActive tickets: {active}\n",
                names.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing::call;
    use serde_json::json;

    fn functions() -> (Shared, Scenario) {
        let company = Shared::default();
        let scenario = build(&Models::default(), company.clone());
        (company, scenario)
    }

    async fn invoke(
        scenario: &Scenario,
        agent: &str,
        function: &str,
        args: serde_json::Value,
        ctx: &ContextVariables,
    ) -> FunctionResult {
        let agent = scenario.roster.require(agent).unwrap();
        call(agent.function(function).unwrap().as_ref(), args, ctx).await
    }

    #[tokio::test]
    async fn test_order_reduces_stock_and_records_customer() {
        let (company, scenario) = functions();
        let ctx = ContextVariables::new().with("customer_name", "Dana");

        let r = invoke(
            &scenario,
            SALES,
            "create_order",
            json!({"product_name": "desk", "quantity": 2}),
            &ctx,
        )
        .await;
        assert_eq!(r.value, "Order created successfully!\nOrder ID: 1\nTotal: $599.98");
        assert_eq!(r.context_variables.get_i64("last_order_id"), Some(1));
        assert_eq!(company.lock().products["desk"].stock, 28);

        let r = invoke(&scenario, SALES, "check_order_status", json!({"order_id": 1}), &ctx).await;
        assert!(r.value.contains("Customer: Dana\n"));

        let r = invoke(
            &scenario,
            SALES,
            "create_order",
            json!({"product_name": "desk", "quantity": 29}),
            &ctx,
        )
        .await;
        assert_eq!(r.value, "Insufficient stock. Only 28 units available.");
    }

    #[tokio::test]
    async fn test_blank_customer_name_is_kept_as_given() {
        let (_company, scenario) = functions();
        let ctx = scenario.context.clone();
        assert_eq!(ctx.get_str("customer_name"), Some(""));

        invoke(
            &scenario,
            SALES,
            "create_order",
            json!({"product_name": "desk", "quantity": 1}),
            &ctx,
        )
        .await;
        let r = invoke(&scenario, SALES, "check_order_status", json!({"order_id": 1}), &ctx).await;
        assert!(r.value.contains("Customer: \n"));
    }

    #[tokio::test]
    async fn test_ticket_assignment_round_robin() {
        let (_company, scenario) = functions();
        let ctx = ContextVariables::new();

        for _ in 0..2 {
            let r = invoke(
                &scenario,
                SUPPORT,
                "create_support_ticket",
                json!({"issue": "VPN down", "priority": "High"}),
                &ctx,
            )
            .await;
            assert!(r.value.starts_with("Support ticket created."));
        }

        let first = invoke(
            &scenario,
            TECHNICAL,
            "assign_ticket",
            json!({"ticket_id": 1, "department": "technical"}),
            &ctx,
        )
        .await;
        let second = invoke(
            &scenario,
            MANAGEMENT,
            "assign_ticket",
            json!({"ticket_id": 2, "department": "technical"}),
            &ctx,
        )
        .await;
        assert_eq!(first.value, "Ticket 1 assigned to Dave from technical department.");
        assert_eq!(second.value, "Ticket 2 assigned to Eve from technical department.");

        let status = invoke(
            &scenario,
            MANAGEMENT,
            "get_department_status",
            json!({"department": "technical"}),
            &ctx,
        )
        .await;
        assert_eq!(
            status.value,
            "\nDepartment: technical\nEmployees: Dave, Eve\nActive tickets: 2\n"
        );

        let ticket = invoke(&scenario, SUPPORT, "check_ticket_status", json!({"ticket_id": 1}), &ctx).await;
        assert!(ticket.value.contains("Priority: high\n"));
        assert!(ticket.value.contains("Customer: Unknown\n"));
        assert!(ticket.value.contains("Assigned to: Dave\n"));
    }

    #[tokio::test]
    async fn test_invalid_priority_and_department() {
        let (_company, scenario) = functions();
        let ctx = ContextVariables::new();
        let r = invoke(
            &scenario,
            SUPPORT,
            "create_support_ticket",
            json!({"issue": "x", "priority": "urgent"}),
            &ctx,
        )
        .await;
        assert_eq!(r.value, "Invalid priority. Use: low, medium, or high");

        let r = invoke(
            &scenario,
            MANAGEMENT,
            "assign_ticket",
            json!({"ticket_id": 9, "department": "sales"}),
            &ctx,
        )
        .await;
        assert_eq!(r.value, "Ticket 9 not found.");
    }

    #[test]
    fn test_receptionist_uses_fast_model_and_asks_name() {
        let (_company, scenario) = functions();
        assert_eq!(scenario.roster.get(RECEPTIONIST).unwrap().model, "gpt-4o-mini");
        assert_eq!(scenario.intake.unwrap().key, "customer_name");
    }
}
