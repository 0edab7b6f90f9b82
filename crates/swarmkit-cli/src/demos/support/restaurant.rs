use crate::demos::{format_number, now_stamp, Models, Scenario};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use swarmkit_core::{Agent, ContextVariables, FunctionResult, FunctionTool, Handoff, Roster};

const ORDER_TAKER: &str = "Order Taker";
const KITCHEN: &str = "Kitchen Manager";
const DELIVERY: &str = "Delivery Coordinator";

const DRIVERS: [&str; 4] = ["John", "Sarah", "Mike", "Lisa"];
const ROUTE: [&str; 4] = [
    "Leaving restaurant",
    "On main street",
    "Near destination",
    "Arriving soon",
];

#[derive(Debug)]
struct MenuItem {
    id: &'static str,
    name: &'static str,
    price: f64,
    prep_time: u32,
}

const fn item(id: &'static str, name: &'static str, price: f64, prep_time: u32) -> MenuItem {
    MenuItem {
        id,
        name,
        price,
        prep_time,
    }
}

static MENU: [(&str, [MenuItem; 3]); 3] = [
    (
        "appetizers",
        [
            item("spring_rolls", "Spring Rolls", 6.99, 10),
            item("salad", "Garden Salad", 7.99, 5),
            item("soup", "Soup of the Day", 5.99, 8),
        ],
    ),
    (
        "main_courses",
        [
            item("pasta", "Fettuccine Alfredo", 14.99, 20),
            item("steak", "Grilled Ribeye", 24.99, 25),
            item("fish", "Grilled Salmon", 19.99, 18),
        ],
    ),
    (
        "desserts",
        [
            item("cake", "Chocolate Cake", 6.99, 5),
            item("ice_cream", "Ice Cream Sundae", 5.99, 3),
            item("pie", "Apple Pie", 6.99, 5),
        ],
    ),
];

fn menu_item(id: &str) -> Option<&'static MenuItem> {
    MENU.iter()
        .flat_map(|(_, items)| items.iter())
        .find(|i| i.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    New,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Preparing => "preparing",
            Status::Ready => "ready",
            Status::OutForDelivery => "out_for_delivery",
            Status::Delivered => "delivered",
        }
    }
}

#[derive(Debug)]
struct Order {
    customer_name: String,
    items: Vec<&'static MenuItem>,
    special_instructions: String,
    total: f64,
    status: Status,
    estimated_prep_time: u32,
    created_at: String,
    driver: Option<&'static str>,
}

#[derive(Debug)]
struct Restaurant {
    counter: u32,
    orders: BTreeMap<String, Order>,
    /// Progress roll in `0..=100`; a full roll completes the current stage.
    roll: fn() -> u32,
}

impl Default for Restaurant {
    fn default() -> Self {
        Self {
            counter: 0,
            orders: BTreeMap::new(),
            roll: || rand::thread_rng().gen_range(0..=100),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Shared(Arc<Mutex<Restaurant>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Restaurant> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn current_order<'a>(
    restaurant: &'a mut Restaurant,
    ctx: &ContextVariables,
) -> Option<(String, &'a mut Order)> {
    let id = ctx.get_str("current_order_id")?;
    let order = restaurant.orders.get_mut(id)?;
    Some((id.to_string(), order))
}

pub fn scenario(models: &Models) -> Scenario {
    build(models, Shared::default())
}

fn build(models: &Models, restaurant: Shared) -> Scenario {
    let to_order_taker = || {
        Handoff::new("transfer_to_order_taker", ORDER_TAKER)
            .with_description("Transfer back to order taker")
            .with_message("Transferring to order taker...")
    };

    let order_taker = Agent::new(ORDER_TAKER)
        .with_model(&models.default)
        .with_instructions(
            "You are a friendly Order Taker at our restaurant.
Help customers view the menu and place their orders.
Make sure to get all necessary details including special instructions.",
        )
        .with_function(view_menu())
        .with_function(create_order(restaurant.clone()))
        .with_function(check_order_status(restaurant.clone()))
        .with_function(
            Handoff::new("transfer_to_kitchen", KITCHEN)
                .with_description("Transfer to kitchen manager")
                .with_message("Transferring to kitchen..."),
        );

    let kitchen = Agent::new(KITCHEN)
        .with_model(&models.fast)
        .with_instructions(
            "You are the Kitchen Manager coordinating food preparation.
Monitor order preparation and update status regularly.
Ensure proper timing and coordination of all dishes.",
        )
        .with_function(start_preparation(restaurant.clone()))
        .with_function(update_preparation_status(restaurant.clone()))
        .with_function(
            Handoff::new("transfer_to_delivery", DELIVERY)
                .with_description("Transfer to delivery coordinator")
                .with_message("Transferring to delivery..."),
        )
        .with_function(to_order_taker());

    let delivery = Agent::new(DELIVERY)
        .with_model(&models.fast)
        .with_instructions(
            "You are the Delivery Coordinator managing order deliveries.
Assign drivers and track delivery progress.
Keep customers informed about their delivery status.",
        )
        .with_function(assign_delivery(restaurant.clone()))
        .with_function(track_delivery(restaurant))
        .with_function(to_order_taker());

    let roster = Roster::new().with(order_taker).with(kitchen).with(delivery);
    Scenario::new(roster, ORDER_TAKER)
        .with_banner([
            "Restaurant Ordering System Initialized!",
            "Available commands:",
            "- View menu (e.g., 'Show me the menu')",
            "- Place order (e.g., 'I want to order pasta and salad')",
            "- Check status (e.g., 'What's the status of my order?')",
            "Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for dining with us! Goodbye!")
        .quiet()
}

fn view_menu() -> FunctionTool {
    FunctionTool::new("view_menu", "View the restaurant menu").handler(|_, _| {
        let mut lines = vec!["Restaurant Menu:".to_string()];
        for (category, items) in &MENU {
            lines.push(format!("\n{}:", category.to_uppercase()));
            lines.extend(
                items
                    .iter()
                    .map(|i| format!("- {}: ${} ({})", i.name, format_number(i.price), i.id)),
            );
        }
        Ok(lines.join("\n"))
    })
}

fn create_order(restaurant: Shared) -> FunctionTool {
    FunctionTool::new("create_order", "Create a new order")
        .string("customer_name", "Name of the customer")
        .string_list("items", "List of item IDs to order")
        .opt_string("special_instructions", "Special preparation instructions")
        .handler(move |args, _| {
            let customer = args.str("customer_name")?;
            let mut items = Vec::new();
            for id in args.str_list("items")? {
                match menu_item(&id) {
                    Some(found) => items.push(found),
                    None => return Ok(FunctionResult::new(format!("Item {id} not found in menu"))),
                }
            }
            let total: f64 = items.iter().map(|i| i.price).sum();

            let mut restaurant = restaurant.lock();
            restaurant.counter += 1;
            let id = format!("ORD{:04}", restaurant.counter);
            restaurant.orders.insert(
                id.clone(),
                Order {
                    customer_name: customer.to_string(),
                    estimated_prep_time: items.iter().map(|i| i.prep_time).sum(),
                    items,
                    special_instructions: args
                        .opt_str("special_instructions")?
                        .unwrap_or_default()
                        .to_string(),
                    total,
                    status: Status::New,
                    created_at: now_stamp(),
                    driver: None,
                },
            );
            tracing::info!(order = %id, customer, "order created");
            Ok(FunctionResult::new(format!(
                "Created order {id} for {customer}. Total: ${total:.2}"
            ))
            .with_context("current_order_id", id))
        })
}

fn check_order_status(restaurant: Shared) -> FunctionTool {
    FunctionTool::new("check_order_status", "Check the status of an order")
        .string("order_id", "Order ID to check")
        .handler(move |args, _| {
            let id = args.str("order_id")?;
            let restaurant = restaurant.lock();
            let Some(order) = restaurant.orders.get(id) else {
                return Ok(format!("Order {id} not found"));
            };
            let names: Vec<&str> = order.items.iter().map(|i| i.name).collect();
            let mut status = format!(
                "Order {id} Status:\nCustomer: {}\nStatus: {}\nCreated: {}\nItems: {}\nTotal: ${:.2}",
                order.customer_name,
                order.status.as_str(),
                order.created_at,
                names.join(", "),
                order.total
            );
            if !order.special_instructions.is_empty() {
                status.push_str(&format!(
                    "\nSpecial instructions: {}",
                    order.special_instructions
                ));
            }
            Ok(status)
        })
}

fn start_preparation(restaurant: Shared) -> FunctionTool {
    FunctionTool::new("start_preparation", "Start preparing an order").handler(move |_, ctx| {
        let mut restaurant = restaurant.lock();
        let Some((id, order)) = current_order(&mut restaurant, ctx) else {
            return Ok("No valid order to prepare".to_string());
        };
        if order.status != Status::New {
            return Ok(format!("Order {id} is already {}", order.status.as_str()));
        }
        order.status = Status::Preparing;
        Ok(format!(
            "Started preparing order {id}. Estimated time: {} minutes",
            order.estimated_prep_time
        ))
    })
}

fn update_preparation_status(restaurant: Shared) -> FunctionTool {
    FunctionTool::new("update_preparation_status", "Update preparation status")
        .string("status_update", "Status update message")
        .handler(move |args, ctx| {
            let note = args.str("status_update")?;
            let mut restaurant = restaurant.lock();
            let progress = (restaurant.roll)();
            let Some((id, order)) = current_order(&mut restaurant, ctx) else {
                return Ok("No valid order to update".to_string());
            };
            if !matches!(order.status, Status::Preparing | Status::Ready) {
                return Ok(format!("Order {id} is not being prepared"));
            }
            if progress >= 100 {
                order.status = Status::Ready;
                return Ok(format!("Order {id} is ready for delivery!"));
            }
            Ok(format!(
                "Order {id} preparation progress: {progress}% - {note}"
            ))
        })
}

fn assign_delivery(restaurant: Shared) -> FunctionTool {
    FunctionTool::new("assign_delivery", "Assign order for delivery").handler(move |_, ctx| {
        let mut restaurant = restaurant.lock();
        let Some((id, order)) = current_order(&mut restaurant, ctx) else {
            return Ok("No valid order to deliver".to_string());
        };
        if order.status != Status::Ready {
            return Ok(format!("Order {id} is not ready for delivery"));
        }
        let driver = DRIVERS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DRIVERS[0]);
        order.status = Status::OutForDelivery;
        order.driver = Some(driver);
        Ok(format!("Order {id} assigned to driver {driver}"))
    })
}

fn track_delivery(restaurant: Shared) -> FunctionTool {
    FunctionTool::new("track_delivery", "Track delivery status").handler(move |_, ctx| {
        let mut restaurant = restaurant.lock();
        let progress = (restaurant.roll)();
        let Some((id, order)) = current_order(&mut restaurant, ctx) else {
            return Ok("No valid order to track".to_string());
        };
        if !matches!(order.status, Status::OutForDelivery | Status::Delivered) {
            return Ok(format!("Order {id} is not out for delivery"));
        }
        if progress >= 100 {
            order.status = Status::Delivered;
            return Ok(format!("Order {id} has been delivered!"));
        }
        let location = ROUTE[(progress as usize / 25).min(ROUTE.len() - 1)];
        Ok(format!(
            "Order {id} - Driver {} is {location}",
            order.driver.unwrap_or("unassigned")
        ))
    })
}
