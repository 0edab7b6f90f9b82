use crate::demos::{format_number, Models, Scenario};
use swarmkit_core::{Agent, FunctionTool, Roster};

const AGENT: &str = "Travel Advisor";
const DEFAULT_MAX_PRICE: f64 = 1000.0;

struct Flight {
    airline: &'static str,
    price: f64,
    duration: &'static str,
}

struct Hotel {
    name: &'static str,
    price: f64,
    rating: f64,
}

struct Car {
    kind: &'static str,
    price: f64,
    company: &'static str,
}

static FLIGHTS: [(&str, [Flight; 2]); 2] = [
    (
        "NYC-LAX",
        [
            Flight { airline: "SkyHigh", price: 299.99, duration: "5h 30m" },
            Flight { airline: "CoastAir", price: 349.99, duration: "5h 45m" },
        ],
    ),
    (
        "LAX-NYC",
        [
            Flight { airline: "SkyHigh", price: 319.99, duration: "5h 45m" },
            Flight { airline: "CoastAir", price: 329.99, duration: "6h" },
        ],
    ),
];

static HOTELS: [(&str, [Hotel; 2]); 2] = [
    (
        "NYC",
        [
            Hotel { name: "Grand Plaza", price: 199.99, rating: 4.5 },
            Hotel { name: "City View", price: 149.99, rating: 4.0 },
        ],
    ),
    (
        "LAX",
        [
            Hotel { name: "Beach Resort", price: 249.99, rating: 4.7 },
            Hotel { name: "Sunset Hotel", price: 179.99, rating: 4.2 },
        ],
    ),
];

static CARS: [(&str, [Car; 2]); 2] = [
    (
        "NYC",
        [
            Car { kind: "Economy", price: 45.99, company: "SpeedRent" },
            Car { kind: "SUV", price: 89.99, company: "LuxDrive" },
        ],
    ),
    (
        "LAX",
        [
            Car { kind: "Economy", price: 49.99, company: "SpeedRent" },
            Car { kind: "SUV", price: 94.99, company: "LuxDrive" },
        ],
    ),
];

fn lookup<'a, T>(table: &'a [(&str, T)], key: &str) -> Option<&'a T> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
}

fn flights(from: &str, to: &str) -> String {
    let route = format!("{from}-{to}");
    let Some(found) = lookup(&FLIGHTS, &route) else {
        return format!("No flights found for route {from} to {to}");
    };
    let mut lines = vec![format!(
        "Found {} flights from {from} to {to}:",
        found.len()
    )];
    lines.extend(found.iter().map(|f| {
        format!(
            "- {}: ${} ({})",
            f.airline,
            format_number(f.price),
            f.duration
        )
    }));
    lines.join("\n")
}

fn hotels(city: &str, max_price: f64) -> String {
    let Some(found) = lookup(&HOTELS, city) else {
        return format!("No hotels found in {city}");
    };
    let within: Vec<&Hotel> = found.iter().filter(|h| h.price <= max_price).collect();
    let mut lines = vec![format!("Found {} hotels in {city}:", within.len())];
    lines.extend(within.iter().map(|h| {
        format!(
            "- {}: ${}/night ({}★)",
            h.name,
            format_number(h.price),
            format_number(h.rating)
        )
    }));
    lines.join("\n")
}

fn car_rentals(city: &str, kind: &str) -> String {
    let Some(found) = lookup(&CARS, city) else {
        return format!("No car rentals found in {city}");
    };
    let kind = kind.to_lowercase();
    let matching: Vec<&Car> = found
        .iter()
        .filter(|c| kind == "all" || c.kind.to_lowercase() == kind)
        .collect();
    let mut lines = vec![format!("Found {} car rentals in {city}:", matching.len())];
    lines.extend(matching.iter().map(|c| {
        format!("- {} {}: ${}/day", c.company, c.kind, format_number(c.price))
    }));
    lines.join("\n")
}

pub fn scenario(models: &Models) -> Scenario {
    let agent = Agent::new(AGENT)
        .with_model(&models.default)
        .with_instructions(
            "You are a Travel Advisor helping customers plan their trips.
Use the available functions to check flights, hotels, and car rentals.
You can check multiple services in parallel for faster responses.
For complete trip planning, use get_travel_package to check everything at once.",
        )
        .with_function(check_flights())
        .with_function(check_hotels())
        .with_function(check_car_rentals())
        .with_function(get_travel_package())
        .with_parallel_tool_calls(true);

    Scenario::new(Roster::new().with(agent), AGENT)
        .with_banner([
            "Travel Planning System Initialized!",
            "Available services:",
            "- Check flights (NYC-LAX, LAX-NYC)",
            "- Check hotels (NYC, LAX)",
            "- Check car rentals (NYC, LAX)",
            "- Get complete travel packages",
            "Type 'exit' to end the conversation",
        ])
        .with_farewell("Thank you for using our Travel Planning System! Goodbye!")
        .quiet()
}

fn check_flights() -> FunctionTool {
    FunctionTool::new("check_flights", "Check flight availability")
        .string("from_city", "Departure city")
        .string("to_city", "Arrival city")
        .handler(|args, _| Ok(flights(args.str("from_city")?, args.str("to_city")?)))
}

fn check_hotels() -> FunctionTool {
    FunctionTool::new("check_hotels", "Check hotel availability")
        .string("city", "City to search in")
        .opt_number("max_price", "Maximum price per night")
        .handler(|args, _| {
            let max_price = args.opt_f64("max_price")?.unwrap_or(DEFAULT_MAX_PRICE);
            Ok(hotels(args.str("city")?, max_price))
        })
}

fn check_car_rentals() -> FunctionTool {
    FunctionTool::new("check_car_rentals", "Check car rental availability")
        .string("city", "City to search in")
        .opt_string("car_type", "Type of car (Economy, SUV, or all)")
        .handler(|args, _| {
            let kind = args.opt_str("car_type")?.unwrap_or("all");
            Ok(car_rentals(args.str("city")?, kind))
        })
}

fn get_travel_package() -> FunctionTool {
    FunctionTool::new(
        "get_travel_package",
        "Get complete travel package information",
    )
    .string("from_city", "Departure city")
    .string("to_city", "Destination city")
    .handler(|args, _| {
        let from = args.str("from_city")?;
        let to = args.str("to_city")?;
        Ok([
            "Complete Travel Package Information:".to_string(),
            "\nFLIGHTS:".to_string(),
            flights(from, to),
            "\nHOTELS:".to_string(),
            hotels(to, DEFAULT_MAX_PRICE),
            "\nCAR RENTALS:".to_string(),
            car_rentals(to, "all"),
        ]
        .join("\n"))
    })
}
