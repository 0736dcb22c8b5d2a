use crate::agent::Agent;
use agentmesh_core::ProcessedData;
use std::sync::Arc;

/// Decides, per agent, whether the conditional strategy invokes it.
pub type AgentPredicate = Arc<dyn Fn(&dyn Agent, &ProcessedData) -> bool + Send + Sync>;

/// How the orchestrator drives the agent list.
#[derive(Clone)]
pub enum Strategy {
    /// One agent at a time, in list order; a failure does not halt the rest.
    Sequential,
    /// All agents concurrently; results arrive in completion order.
    Parallel,
    /// The full agent set repeated up to `max_iterations` times,
    /// iteration-major; stops early after an iteration with a failure.
    Loop {
        /// Upper bound on iterations.
        max_iterations: usize,
    },
    /// List order, but each agent runs only if the predicate says so;
    /// ruled-out agents are recorded as skipped without being invoked.
    Conditional {
        /// The per-agent gate.
        predicate: AgentPredicate,
    },
}

impl Strategy {
    /// A loop strategy with the default iteration bound (5).
    pub fn loop_default() -> Self {
        Strategy::Loop { max_iterations: 5 }
    }

    /// A conditional strategy from any suitable closure.
    pub fn conditional<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Agent, &ProcessedData) -> bool + Send + Sync + 'static,
    {
        Strategy::Conditional {
            predicate: Arc::new(predicate),
        }
    }

    /// The strategy's wire name. Request ids use the shorter per-strategy
    /// prefixes (`seq`, `par`, `loop`, `cond`).
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Parallel => "parallel",
            Strategy::Loop { .. } => "loop",
            Strategy::Conditional { .. } => "conditional",
        }
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Sequential => f.write_str("Sequential"),
            Strategy::Parallel => f.write_str("Parallel"),
            Strategy::Loop { max_iterations } => f
                .debug_struct("Loop")
                .field("max_iterations", max_iterations)
                .finish(),
            Strategy::Conditional { .. } => f.write_str("Conditional"),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
