
mod prompt;
mod router;

pub use router::{AgentSettings, AgentState, RoutingAgent};
