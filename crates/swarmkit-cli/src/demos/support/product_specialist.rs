use crate::demos::{format_number, Models, Scenario};
use swarmkit_core::{Agent, FunctionTool, Roster};

const AGENT: &str = "Product Specialist";

struct Product {
    id: &'static str,
    name: &'static str,
    price: f64,
    specs: [(&'static str, &'static str); 4],
    features: [&'static str; 4],
}

static PRODUCTS: [Product; 2] = [
    Product {
        id: "laptop-pro",
        name: "LaptopPro X1",
        price: 1299.99,
        specs: [
            ("cpu", "Intel i7 12th Gen"),
            ("ram", "16GB DDR4"),
            ("storage", "512GB SSD"),
            ("display", "15.6\" 4K OLED"),
        ],
        features: [
            "Backlit Keyboard",
            "Fingerprint Reader",
            "Thunderbolt 4",
            "Wi-Fi 6E",
        ],
    },
    Product {
        id: "smartphone-x",
        name: "SmartPhone X12",
        price: 899.99,
        specs: [
            ("cpu", "Snapdragon 8 Gen 2"),
            ("ram", "8GB"),
            ("storage", "256GB"),
            ("display", "6.7\" AMOLED 120Hz"),
        ],
        features: [
            "5G Compatible",
            "Wireless Charging",
            "IP68 Water Resistant",
            "Triple Camera System",
        ],
    },
];

fn product(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

impl Product {
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.specs.iter().any(|(key, value)| {
                key.contains(query) || value.to_lowercase().contains(query)
            })
            || self
                .features
                .iter()
                .any(|f| f.to_lowercase().contains(query))
    }
}

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_instructions(
            "You are a Product Specialist with deep knowledge of our product catalog.
Help customers find and compare products, and provide detailed information about specifications and features.
Use the available functions to search and retrieve product information.",
        )
        .with_function(get_product_info())
        .with_function(compare_products())
        .with_function(search_products());

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_banner([
            "Product Information System Initialized!",
            "Available commands:",
            "- Get product info (e.g., 'Tell me about laptop-pro')",
            "- Compare products (e.g., 'Compare laptop-pro and smartphone-x')",
            "- Search products (e.g., 'Search for laptops')",
            "Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for using our Product Information System! Goodbye!")
        .streaming()
        .quiet()
}

fn get_product_info() -> FunctionTool {
    FunctionTool::new("get_product_info", "Get detailed product information")
        .string("product_id", "ID of the product to look up")
        .handler(|args, _| {
            let id = args.str("product_id")?;
            let Some(p) = product(id) else {
                return Ok(format!("Product {id} not found in our catalog."));
            };
            let mut lines = vec![
                format!("Product: {}", p.name),
                format!("Price: ${}", format_number(p.price)),
                "\nSpecifications:".to_string(),
            ];
            lines.extend(
                p.specs
                    .iter()
                    .map(|(k, v)| format!("- {}: {v}", k.to_uppercase())),
            );
            lines.push("\nFeatures:".to_string());
            lines.extend(p.features.iter().map(|f| format!("- {f}")));
            Ok(lines.join("\n"))
        })
}

fn compare_products() -> FunctionTool {
    FunctionTool::new("compare_products", "Compare two products")
        .string("product_id1", "First product ID")
        .string("product_id2", "Second product ID")
        .handler(|args, _| {
            let (Some(a), Some(b)) = (
                product(args.str("product_id1")?),
                product(args.str("product_id2")?),
            ) else {
                return Ok("One or both products not found.".to_string());
            };
            let mut lines = vec![
                format!("Comparing {} vs {}", a.name, b.name),
                "\nPrice:".to_string(),
                format!("{}: ${}", a.name, format_number(a.price)),
                format!("{}: ${}", b.name, format_number(b.price)),
                "\nSpecifications Comparison:".to_string(),
            ];
            for ((key, left), (_, right)) in a.specs.iter().zip(b.specs.iter()) {
                lines.push(format!("{}:", key.to_uppercase()));
                lines.push(format!("- {}: {left}", a.name));
                lines.push(format!("- {}: {right}", b.name));
            }
            Ok(lines.join("\n"))
        })
}

fn search_products() -> FunctionTool {
    FunctionTool::new("search_products", "Search products by keyword")
        .string("query", "Search query")
        .handler(|args, _| {
            let query = args.str("query")?.to_lowercase();
            let hits: Vec<String> = PRODUCTS
                .iter()
                .filter(|p| p.matches(&query))
                .map(|p| format!("- {} (ID: {})", p.name, p.id))
                .collect();
            if hits.is_empty() {
                return Ok("No products found matching your query.".to_string());
            }
            Ok(format!("Found products:\n{}", hits.join("\n")))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing::call;
    use serde_json::json;
    use swarmkit_core::ContextVariables;

    #[tokio::test]
    async fn test_product_info_lists_specs_and_features() {
        let ctx = ContextVariables::new();
        let r = call(&get_product_info(), json!({"product_id": "laptop-pro"}), &ctx).await;
        assert!(r.value.starts_with("Product: LaptopPro X1\nPrice: $1299.99\n\nSpecifications:"));
        assert!(r.value.contains("- CPU: Intel i7 12th Gen"));
        assert!(r.value.ends_with("- Wi-Fi 6E"));

        let r = call(&get_product_info(), json!({"product_id": "tablet"}), &ctx).await;
        assert_eq!(r.value, "Product tablet not found in our catalog.");
    }

    #[tokio::test]
    async fn test_compare_products() {
        let ctx = ContextVariables::new();
        let args = json!({"product_id1": "laptop-pro", "product_id2": "smartphone-x"});
        let r = call(&compare_products(), args, &ctx).await;
        assert!(r.value.starts_with("Comparing LaptopPro X1 vs SmartPhone X12"));
        assert!(r.value.contains("RAM:\n- LaptopPro X1: 16GB DDR4\n- SmartPhone X12: 8GB"));

        let args = json!({"product_id1": "laptop-pro", "product_id2": "nope"});
        let r = call(&compare_products(), args, &ctx).await;
        assert_eq!(r.value, "One or both products not found.");
    }

    #[tokio::test]
    async fn test_search_matches_names_specs_and_features() {
        let ctx = ContextVariables::new();
        let r = call(&search_products(), json!({"query": "Laptop"}), &ctx).await;
        assert_eq!(r.value, "Found products:\n- LaptopPro X1 (ID: laptop-pro)");

        let r = call(&search_products(), json!({"query": "wireless"}), &ctx).await;
        assert_eq!(r.value, "Found products:\n- SmartPhone X12 (ID: smartphone-x)");

        let r = call(&search_products(), json!({"query": "storage"}), &ctx).await;
        assert!(r.value.contains("laptop-pro") && r.value.contains("smartphone-x"));

        let r = call(&search_products(), json!({"query": "toaster"}), &ctx).await;
        assert_eq!(r.value, "No products found matching your query.");
    }
}
