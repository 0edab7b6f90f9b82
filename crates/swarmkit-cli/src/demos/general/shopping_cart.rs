use crate::demos::{Models, Scenario};
use serde_json::{Map, Value};
use swarmkit_core::{Agent, ContextVariables, FunctionResult, FunctionTool, Roster};

const AGENT: &str = "Shopping Assistant";

const PRODUCTS: [(&str, f64); 5] = [
    ("laptop", 999.99),
    ("phone", 599.99),
    ("headphones", 99.99),
    ("tablet", 299.99),
    ("smartwatch", 199.99),
];

fn price(item: &str) -> Option<f64> {
    PRODUCTS.iter().find(|(name, _)| *name == item).map(|(_, p)| *p)
}

fn cart(ctx: &ContextVariables) -> Map<String, Value> {
    ctx.get_object("cart").cloned().unwrap_or_default()
}

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_instructions(
            "You are a helpful shopping assistant.
You can help users:
1. View available products
2. Add items to their cart
3. Remove items from their cart
4. View their cart

Always confirm actions and show the cart after modifications.
Be helpful and suggest related items when appropriate.",
        )
        .with_function(list_products())
        .with_function(add_to_cart())
        .with_function(remove_from_cart())
        .with_function(view_cart());

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_context(ContextVariables::new().with("cart", Map::new()))
        .with_banner([
            "Shopping Assistant started! Type 'exit' to end.",
            "Try:\n- View products\n- Add items to cart\n- Remove items\n- View cart",
        ])
}

fn view_cart() -> FunctionTool {
    FunctionTool::new("view_cart", "View the current items in the shopping cart.").handler(
        |_, ctx| {
            let cart = cart(ctx);
            if cart.is_empty() {
                return Ok("Your cart is empty.".to_string());
            }

            let mut total = 0.0;
            let mut lines = vec!["Cart Contents:".to_string()];
            for (item, qty) in &cart {
                let qty = qty.as_i64().unwrap_or(0);
                let cost = price(item).unwrap_or(0.0) * qty as f64;
                total += cost;
                lines.push(format!("{item} (x{qty}) - ${cost:.2}"));
            }
            lines.push(format!("Total: ${total:.2}"));
            Ok(lines.join("\n"))
        },
    )
}

fn add_to_cart() -> FunctionTool {
    FunctionTool::new("add_to_cart", "Add an item to the shopping cart.")
        .string("item", "Name of the product")
        .opt_integer("quantity", "Number of items to add")
        .handler(|args, ctx| {
            let item = args.str("item")?;
            let quantity = args.opt_i64("quantity")?.unwrap_or(1);
            let key = item.to_lowercase();
            if price(&key).is_none() {
                return Ok(FunctionResult::new(format!(
                    "Error: Product '{item}' not found in our catalog."
                )));
            }

            let mut cart = cart(ctx);
            let current = cart.get(&key).and_then(Value::as_i64).unwrap_or(0);
            cart.insert(key.clone(), Value::from(current + quantity));

            Ok(FunctionResult::new(format!("Added {quantity} {key}(s) to cart."))
                .with_context("cart", cart))
        })
}

fn remove_from_cart() -> FunctionTool {
    FunctionTool::new("remove_from_cart", "Remove an item from the shopping cart.")
        .string("item", "Name of the product")
        .opt_integer("quantity", "Number of items to remove")
        .handler(|args, ctx| {
            let item = args.str("item")?.to_lowercase();
            let quantity = args.opt_i64("quantity")?.unwrap_or(1);

            let mut cart = cart(ctx);
            let Some(current) = cart.get(&item).and_then(Value::as_i64) else {
                return Ok(FunctionResult::new(format!(
                    "Error: '{item}' not found in your cart."
                )));
            };

            let message = if quantity >= current {
                cart.remove(&item);
                format!("Removed all {item}(s) from cart.")
            } else {
                cart.insert(item.clone(), Value::from(current - quantity));
                format!("Removed {quantity} {item}(s) from cart.")
            };

            Ok(FunctionResult::new(message).with_context("cart", cart))
        })
}

fn list_products() -> FunctionTool {
    FunctionTool::new("list_products", "List all available products and their prices.").handler(
        |_, _| {
            let lines: Vec<String> = PRODUCTS
                .iter()
                .map(|(item, price)| format!("{}: ${price:.2}", title_case(item)))
                .collect();
            Ok(format!("Available Products:\n{}", lines.join("\n")))
        },
    )
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing::call;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_then_view_cart() {
        let mut ctx = ContextVariables::new().with("cart", Map::new());

        let r = call(&add_to_cart(), json!({"item": "Laptop", "quantity": 2}), &ctx).await;
        assert_eq!(r.value, "Added 2 laptop(s) to cart.");
        ctx.update(r.context_variables);

        let r = call(&add_to_cart(), json!({"item": "phone"}), &ctx).await;
        ctx.update(r.context_variables);
        assert_eq!(ctx.get("cart"), Some(&json!({"laptop": 2, "phone": 1})));

        let r = call(&view_cart(), json!({}), &ctx).await;
        assert_eq!(
            r.value,
            "Cart Contents:\nlaptop (x2) - $1999.98\nphone (x1) - $599.99\nTotal: $2599.97"
        );
    }

    #[tokio::test]
    async fn test_unknown_product_leaves_cart_untouched() {
        let ctx = ContextVariables::new();
        let r = call(&add_to_cart(), json!({"item": "toaster"}), &ctx).await;
        assert_eq!(r.value, "Error: Product 'toaster' not found in our catalog.");
        assert!(r.context_variables.is_empty());

        let r = call(&view_cart(), json!({}), &ctx).await;
        assert_eq!(r.value, "Your cart is empty.");
    }

    #[tokio::test]
    async fn test_remove_partial_and_all() {
        let ctx = ContextVariables::new().with("cart", json!({"tablet": 3}));

        let r = call(&remove_from_cart(), json!({"item": "tablet"}), &ctx).await;
        assert_eq!(r.value, "Removed 1 tablet(s) from cart.");
        assert_eq!(r.context_variables.get("cart"), Some(&json!({"tablet": 2})));

        let r = call(&remove_from_cart(), json!({"item": "tablet", "quantity": 5}), &ctx).await;
        assert_eq!(r.value, "Removed all tablet(s) from cart.");
        assert_eq!(r.context_variables.get("cart"), Some(&json!({})));

        let r = call(&remove_from_cart(), json!({"item": "phone"}), &ctx).await;
        assert_eq!(r.value, "Error: 'phone' not found in your cart.");
    }

    #[tokio::test]
    async fn test_list_products() {
        let r = call(&list_products(), json!({}), &ContextVariables::new()).await;
        assert!(r.value.starts_with("Available Products:\nLaptop: $999.99"));
        assert!(r.value.ends_with("Smartwatch: $199.99"));
    }
}
