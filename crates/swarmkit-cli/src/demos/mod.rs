//! The example scenarios. Each one wires mock business functions into a
//! roster of agents and describes how the REPL should present it.

pub mod general;
pub mod support;

use std::fmt;
use std::sync::Arc;
use swarmkit_core::{ContextVariables, RunOptions, Roster, Swarm};

/// Model names handed to scenario builders, taken from `Settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Models {
    pub default: String,
    pub fast: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            default: swarmkit_core::constants::models::DEFAULT_MODEL.to_string(),
            fast: swarmkit_core::constants::models::FAST_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    General,
    Support,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::General => f.write_str("general"),
            Category::Support => f.write_str("customer service"),
        }
    }
}

/// A question asked once before the chat loop starts.
#[derive(Debug, Clone)]
pub struct Intake {
    pub prompt: String,
    /// Context key the answer is stored under.
    pub key: String,
}

/// Runs before each turn with the user's input and may adjust the context.
///
/// Returns lines to show the user. Failures are reported as lines too; a hook
/// never prevents the turn from running.
#[async_trait::async_trait]
pub trait TurnHook: Send + Sync {
    async fn before_turn(
        &self,
        swarm: &Swarm,
        options: &RunOptions,
        input: &str,
        context: &mut ContextVariables,
    ) -> Vec<String>;
}

/// Everything a chat session needs to run one example.
pub struct Scenario {
    pub roster: Roster,
    pub start: String,
    pub context: ContextVariables,
    pub banner: Vec<String>,
    pub farewell: String,
    /// Replaces the default "<agent> is thinking..." line.
    pub thinking: Option<String>,
    pub show_thinking: bool,
    pub stream: bool,
    pub show_model: bool,
    pub show_timing: bool,
    pub intake: Option<Intake>,
    pub hook: Option<Arc<dyn TurnHook>>,
}

impl Scenario {
    pub fn new(roster: Roster, start: impl Into<String>) -> Self {
        Self {
            roster,
            start: start.into(),
            context: ContextVariables::new(),
            banner: Vec::new(),
            farewell: "Ending chat...".to_string(),
            thinking: None,
            show_thinking: true,
            stream: false,
            show_model: false,
            show_timing: false,
            intake: None,
            hook: None,
        }
    }

    pub fn with_context(mut self, context: ContextVariables) -> Self {
        self.context = context;
        self
    }

    pub fn with_banner<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banner = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_farewell(mut self, farewell: impl Into<String>) -> Self {
        self.farewell = farewell.into();
        self
    }

    pub fn with_thinking_line(mut self, line: impl Into<String>) -> Self {
        self.thinking = Some(line.into());
        self
    }

    /// Skip the status line printed before each turn.
    pub fn quiet(mut self) -> Self {
        self.show_thinking = false;
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn showing_model(mut self) -> Self {
        self.show_model = true;
        self
    }

    pub fn timed(mut self) -> Self {
        self.show_timing = true;
        self
    }

    pub fn with_intake(mut self, prompt: impl Into<String>, key: impl Into<String>) -> Self {
        self.intake = Some(Intake {
            prompt: prompt.into(),
            key: key.into(),
        });
        self
    }

    pub fn with_hook(mut self, hook: impl TurnHook + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }
}

/// Catalogue entry for one example.
#[derive(Clone, Copy)]
pub struct Demo {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    build: fn(&Models) -> Scenario,
}

impl Demo {
    pub const fn new(
        id: &'static str,
        title: &'static str,
        category: Category,
        build: fn(&Models) -> Scenario,
    ) -> Self {
        Self {
            id,
            title,
            category,
            build,
        }
    }

    pub fn build(&self, models: &Models) -> Scenario {
        (self.build)(models)
    }
}

impl fmt::Debug for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Demo")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("category", &self.category)
            .finish()
    }
}

pub fn catalog() -> Vec<Demo> {
    let mut demos = general::demos();
    demos.extend(support::demos());
    demos
}

pub fn find(id: &str) -> Option<Demo> {
    catalog().into_iter().find(|d| d.id == id)
}

/// Format a float the way the example output shows numbers: whole values
/// keep one decimal place.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}

pub(crate) fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let demos = catalog();
        assert_eq!(demos.len(), 20);
        let ids: HashSet<_> = demos.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), demos.len());
    }

    #[test]
    fn test_every_scenario_starts_with_a_registered_agent() {
        let models = Models::default();
        for demo in catalog() {
            let scenario = demo.build(&models);
            assert!(
                scenario.roster.contains(&scenario.start),
                "{} starts with unknown agent {}",
                demo.id,
                scenario.start
            );
        }
    }

    #[tokio::test]
    async fn test_every_transfer_targets_a_registered_agent() {
        let models = Models::default();
        for demo in catalog() {
            let scenario = demo.build(&models);
            for name in scenario.roster.names() {
                let agent = scenario.roster.require(name).unwrap();
                for function in &agent.functions {
                    assert_eq!(function.parameters_schema()["type"], "object");
                    if !function.name().starts_with("transfer_to") {
                        continue;
                    }
                    let result = function
                        .execute(swarmkit_core::Args::default(), &scenario.context)
                        .await
                        .unwrap();
                    let target = result.agent.unwrap();
                    assert!(
                        scenario.roster.contains(&target),
                        "{}: {} hands off to unknown agent {target}",
                        demo.id,
                        function.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(8.0), "8.0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-3.0), "-3.0");
    }
}
