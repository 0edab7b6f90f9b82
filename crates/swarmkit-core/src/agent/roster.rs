use crate::agent::Agent;
use crate::error::SwarmError;
use std::collections::HashMap;
use std::sync::Arc;

/// The agents of one scenario, addressed by name.
///
/// Handoffs name their target, so agents may refer to each other freely.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    agents: HashMap<String, Arc<Agent>>,
    order: Vec<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, agent: Agent) -> Self {
        self.register(agent);
        self
    }

    /// Add an agent, replacing any agent of the same name.
    pub fn register(&mut self, agent: Agent) -> Arc<Agent> {
        let agent = Arc::new(agent);
        if self
            .agents
            .insert(agent.name.clone(), agent.clone())
            .is_none()
        {
            self.order.push(agent.name.clone());
        }
        agent
    }

    pub fn get(&self, name: &str) -> Option<Arc<Agent>> {
        self.agents.get(name).cloned()
    }

    pub fn require(&self, name: &str) -> Result<Arc<Agent>, SwarmError> {
        self.get(name)
            .ok_or_else(|| SwarmError::UnknownAgent(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Agent names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
