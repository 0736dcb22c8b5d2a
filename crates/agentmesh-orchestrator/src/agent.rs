use agentmesh_core::{MeshResult, RequestContext};
use agentmesh_events::EventQueue;
use agentmesh_registry::AgentSkill;
use async_trait::async_trait;

/// The single seam between the orchestrator and a concrete worker.
///
/// `execute` is expected to place at most one terminal event (a response or
/// an error) on the supplied queue before returning; the orchestrator
/// drains exactly one. Internal failures surface as an `Err`, which the
/// orchestrator records as a failed outcome without halting the other
/// agents. There is no cancellation: once awaited, a hung `execute` stalls
/// its slot.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The agent's readable name, used in outcome records.
    fn name(&self) -> &str;

    /// The skills this agent advertises.
    fn skills(&self) -> &[AgentSkill];

    /// Runs the agent against the request, enqueueing its terminal event.
    async fn execute(&self, context: &RequestContext, queue: &EventQueue) -> MeshResult<()>;
}
