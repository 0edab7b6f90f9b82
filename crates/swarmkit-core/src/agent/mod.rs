mod agent;
mod roster;
mod swarm;

pub use agent::{Agent, Instructions, InstructionsFn};
pub use roster::Roster;
pub use swarm::{Delim, Response, RunOptions, Swarm, SwarmEvent};
