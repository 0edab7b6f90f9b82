use crate::demos::{format_number, now_stamp, Models, Scenario};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swarmkit_core::{Agent, ContextVariables, FunctionResult, FunctionTool, Roster, SwarmError};

const AGENT: &str = "Shopping Assistant";

struct Product {
    id: &'static str,
    name: &'static str,
    price: f64,
}

static CATALOG: [(&str, [Product; 3]); 2] = [
    (
        "electronics",
        [
            Product { id: "smartphone", name: "SmartPhone X12", price: 899.99 },
            Product { id: "laptop", name: "LaptopPro X1", price: 1299.99 },
            Product { id: "headphones", name: "AudioMax Pro", price: 199.99 },
        ],
    ),
    (
        "clothing",
        [
            Product { id: "jacket", name: "Winter Comfort Jacket", price: 89.99 },
            Product { id: "sneakers", name: "SportFlex Shoes", price: 79.99 },
            Product { id: "jeans", name: "Classic Fit Jeans", price: 59.99 },
        ],
    ),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    favorite_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sizes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    budget_range: Option<String>,
}

impl Preferences {
    /// Highest price a recommendation may have.
    fn max_price(&self) -> f64 {
        match self.budget_range.as_deref().map(str::to_lowercase).as_deref() {
            Some("low") => 100.0,
            Some("medium") => 500.0,
            _ => f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CartItem {
    product_id: String,
    name: String,
    price: f64,
    quantity: i64,
    total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Purchase {
    date: String,
    items: Vec<CartItem>,
    total: f64,
}

fn load<T: DeserializeOwned + Default>(ctx: &ContextVariables, key: &str) -> Result<T, SwarmError> {
    match ctx.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(SwarmError::from),
    }
}

fn store<T: Serialize>(value: &T) -> Result<Value, SwarmError> {
    serde_json::to_value(value).map_err(SwarmError::from)
}

fn cart_total(cart: &[CartItem]) -> f64 {
    cart.iter().map(|item| item.total).sum()
}

fn instructions(ctx: &ContextVariables) -> String {
    let prefs: Preferences = load(ctx, "preferences").unwrap_or_default();
    let cart: Vec<CartItem> = load(ctx, "shopping_cart").unwrap_or_default();
    let history: Vec<Purchase> = load(ctx, "purchase_history").unwrap_or_default();
    let categories = if prefs.favorite_categories.is_empty() {
        "Not set".to_string()
    } else {
        prefs.favorite_categories.join(", ")
    };
    format!(
        "You are a Personalized Shopping Assistant.

Customer Preferences:
- Favorite Categories: {categories}
- Size Preferences: {}
- Style Preferences: {}
- Budget Range: {}

Current Cart: {} items
Purchase History: {} previous purchases

Tailor your recommendations based on the customer's preferences and history.
Be mindful of their budget range when making suggestions.",
        prefs.sizes.as_deref().unwrap_or("Not set"),
        prefs.style.as_deref().unwrap_or("Not set"),
        prefs.budget_range.as_deref().unwrap_or("Not set"),
        cart.len(),
        history.len(),
    )
}

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_dynamic_instructions(instructions)
        .with_function(update_preferences())
        .with_function(add_to_cart())
        .with_function(view_cart())
        .with_function(get_recommendations())
        .with_function(checkout());

    let context = ContextVariables::new()
        .with("preferences", serde_json::json!({}))
        .with("shopping_cart", serde_json::json!([]))
        .with("purchase_history", serde_json::json!([]));

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_context(context)
        .with_banner([
            "Shopping Assistant Initialized!",
            "Available commands:",
            "- Update preferences (e.g., 'I prefer casual style and medium budget')",
            "- View products (e.g., 'Show me recommendations')",
            "- Manage cart (e.g., 'Add laptop to cart', 'Show my cart')",
            "- Checkout (e.g., 'I want to checkout')",
            "Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for shopping with us! Goodbye!")
        .quiet()
}

fn update_preferences() -> FunctionTool {
    FunctionTool::new("update_preferences", "Update customer preferences")
        .opt_string("category", "Favorite category")
        .opt_string("size", "Size preference")
        .opt_string("style", "Style preference")
        .opt_string("budget", "Budget range")
        .handler(|args, ctx| {
            let mut prefs: Preferences = load(ctx, "preferences")?;
            let given = |name| args.opt_str(name).map(|v| v.filter(|s| !s.is_empty()));
            if let Some(category) = given("category")? {
                if !prefs.favorite_categories.iter().any(|c| c == category) {
                    prefs.favorite_categories.push(category.to_string());
                }
            }
            if let Some(size) = given("size")? {
                prefs.sizes = Some(size.to_string());
            }
            if let Some(style) = given("style")? {
                prefs.style = Some(style.to_string());
            }
            if let Some(budget) = given("budget")? {
                prefs.budget_range = Some(budget.to_string());
            }
            let pretty = serde_json::to_string_pretty(&prefs)?;
            Ok(FunctionResult::new(format!("Updated preferences:\n{pretty}"))
                .with_context("preferences", store(&prefs)?))
        })
}

fn add_to_cart() -> FunctionTool {
    FunctionTool::new("add_to_cart", "Add product to shopping cart")
        .string("product_id", "Product to add")
        .opt_integer("quantity", "Quantity to add")
        .handler(|args, ctx| {
            let id = args.str("product_id")?;
            let quantity = args.opt_i64("quantity")?.unwrap_or(1);
            let Some(product) = CATALOG
                .iter()
                .flat_map(|(_, products)| products.iter())
                .find(|p| p.id == id)
            else {
                return Ok(FunctionResult::new(format!("Product {id} not found")));
            };

            let mut cart: Vec<CartItem> = load(ctx, "shopping_cart")?;
            cart.push(CartItem {
                product_id: id.to_string(),
                name: product.name.to_string(),
                price: product.price,
                quantity,
                total: product.price * quantity as f64,
            });
            Ok(
                FunctionResult::new(format!("Added {quantity}x {} to cart", product.name))
                    .with_context("shopping_cart", store(&cart)?),
            )
        })
}

fn view_cart() -> FunctionTool {
    FunctionTool::new("view_cart", "View current shopping cart").handler(|_, ctx| {
        let cart: Vec<CartItem> = load(ctx, "shopping_cart")?;
        if cart.is_empty() {
            return Ok("Your cart is empty".to_string());
        }
        let mut lines = vec!["Your Shopping Cart:".to_string()];
        lines.extend(cart.iter().map(|item| {
            format!(
                "- {}x {} (${} each)",
                item.quantity,
                item.name,
                format_number(item.price)
            )
        }));
        lines.push(format!("\nTotal: ${:.2}", cart_total(&cart)));
        Ok(lines.join("\n"))
    })
}

fn get_recommendations() -> FunctionTool {
    FunctionTool::new(
        "get_recommendations",
        "Get personalized product recommendations",
    )
    .handler(|_, ctx| {
        let prefs: Preferences = load(ctx, "preferences")?;
        let max_price = prefs.max_price();
        let categories: Vec<String> = if prefs.favorite_categories.is_empty() {
            CATALOG.iter().map(|(name, _)| name.to_string()).collect()
        } else {
            prefs
                .favorite_categories
                .iter()
                .map(|c| c.to_lowercase())
                .collect()
        };

        let picks: Vec<String> = categories
            .iter()
            .filter_map(|category| CATALOG.iter().find(|(name, _)| name == category))
            .flat_map(|(_, products)| products.iter())
            .filter(|p| p.price <= max_price)
            .map(|p| format!("- {}: ${} ({})", p.name, format_number(p.price), p.id))
            .collect();

        if picks.is_empty() {
            return Ok("No recommendations found matching your preferences".to_string());
        }
        Ok(format!("Recommended for you:\n{}", picks.join("\n")))
    })
}

fn checkout() -> FunctionTool {
    FunctionTool::new(
        "checkout",
        "Process checkout and update purchase history",
    )
    .handler(|_, ctx| {
        let cart: Vec<CartItem> = load(ctx, "shopping_cart")?;
        if cart.is_empty() {
            return Ok(FunctionResult::new("Cannot checkout with empty cart"));
        }
        let total = cart_total(&cart);
        let mut history: Vec<Purchase> = load(ctx, "purchase_history")?;
        history.push(Purchase {
            date: now_stamp(),
            items: cart,
            total,
        });
        Ok(
            FunctionResult::new(format!("Checkout completed! Total paid: ${total:.2}"))
                .with_context("purchase_history", store(&history)?)
                .with_context("shopping_cart", Value::Array(Vec::new())),
        )
    })
}
