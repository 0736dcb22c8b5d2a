use crate::agent::Agent;
use crate::outcome::{AgentOutcome, OutcomeStatus};
use crate::strategy::{AgentPredicate, Strategy};
use agentmesh_core::{MeshResult, ProcessedData, RequestContext};
use agentmesh_events::queue::DEFAULT_CAPACITY;
use agentmesh_events::EventQueue;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Tunables for the [`Orchestrator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Iteration bound used by [`Orchestrator::loop_strategy`].
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Capacity of the fresh event queue built per invocation.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_max_iterations() -> usize {
    5
}

fn default_queue_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Drives a list of agents through one execution strategy against one
/// processed input.
///
/// For every (agent, iteration) attempt it builds a fresh
/// [`RequestContext`] and a fresh [`EventQueue`], awaits the agent, drains
/// at most one event, and emits one [`AgentOutcome`]. Failures are isolated
/// per attempt; nothing is retried and nothing can be cancelled once
/// awaited.
#[derive(Debug, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// An orchestrator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An orchestrator with the given configuration.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// A loop strategy bounded by the configured `max_iterations`.
    pub fn loop_strategy(&self) -> Strategy {
        Strategy::Loop {
            max_iterations: self.config.max_iterations,
        }
    }

    /// Runs every agent per the strategy and returns one outcome per
    /// (agent, iteration) attempt.
    ///
    /// Ordering: list order for Sequential/Conditional, completion order
    /// for Parallel, iteration-major for Loop.
    pub async fn orchestrate(
        &self,
        agents: &[Arc<dyn Agent>],
        input: &ProcessedData,
        strategy: Strategy,
    ) -> MeshResult<Vec<AgentOutcome>> {
        info!(
            agent_count = agents.len(),
            strategy = %strategy,
            "orchestration started"
        );

        let outcomes = match strategy {
            Strategy::Sequential => self.run_sequential(agents, input).await,
            Strategy::Parallel => self.run_parallel(agents, input).await,
            Strategy::Loop { max_iterations } => {
                self.run_loop(agents, input, max_iterations).await
            }
            Strategy::Conditional { predicate } => {
                self.run_conditional(agents, input, &predicate).await
            }
        };

        info!(outcome_count = outcomes.len(), "orchestration complete");
        Ok(outcomes)
    }

    /// One invocation: fresh context, fresh queue, at most one drained
    /// event.
    async fn invoke(
        agent: &dyn Agent,
        input: &ProcessedData,
        prefix: &str,
        queue_capacity: usize,
        iteration: Option<usize>,
    ) -> AgentOutcome {
        let mut context = RequestContext::generated(input.text.as_str(), prefix);
        if let Some(iteration) = iteration {
            context.set_metadata("iteration", json!(iteration));
        }
        let queue = EventQueue::new(queue_capacity);

        let outcome = match agent.execute(&context, &queue).await {
            Ok(()) => match queue.get().await {
                Some(event) => AgentOutcome::completed(agent.name(), event),
                None => AgentOutcome::no_response(agent.name()),
            },
            Err(e) => {
                error!(agent = %agent.name(), error = %e, "agent execution failed");
                AgentOutcome::failed(agent.name(), e.to_string())
            }
        };

        match iteration {
            Some(iteration) => outcome.with_iteration(iteration),
            None => outcome,
        }
    }

    async fn run_sequential(
        &self,
        agents: &[Arc<dyn Agent>],
        input: &ProcessedData,
    ) -> Vec<AgentOutcome> {
        let mut outcomes = Vec::with_capacity(agents.len());
        for agent in agents {
            outcomes
                .push(Self::invoke(agent.as_ref(), input, "seq", self.config.queue_capacity, None).await);
        }
        outcomes
    }

    async fn run_parallel(
        &self,
        agents: &[Arc<dyn Agent>],
        input: &ProcessedData,
    ) -> Vec<AgentOutcome> {
        let mut set = JoinSet::new();
        for agent in agents {
            let agent = Arc::clone(agent);
            let input = input.clone();
            let capacity = self.config.queue_capacity;
            set.spawn(async move { Self::invoke(agent.as_ref(), &input, "par", capacity, None).await });
        }

        // Completion order, not list order. Each spawned task resolves to
        // an outcome on its own, so one agent's failure cannot cancel the
        // others.
        let mut outcomes = Vec::with_capacity(agents.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(error = %e, "parallel agent task aborted");
                    outcomes.push(AgentOutcome::failed("unknown", format!("task aborted: {e}")));
                }
            }
        }
        outcomes
    }

    async fn run_loop(
        &self,
        agents: &[Arc<dyn Agent>],
        input: &ProcessedData,
        max_iterations: usize,
    ) -> Vec<AgentOutcome> {
        let mut outcomes = Vec::new();
        for iteration in 0..max_iterations {
            let mut iteration_outcomes = Vec::with_capacity(agents.len());
            for agent in agents {
                iteration_outcomes.push(
                    Self::invoke(
                        agent.as_ref(),
                        input,
                        "loop",
                        self.config.queue_capacity,
                        Some(iteration),
                    )
                    .await,
                );
            }

            let failed = iteration_outcomes
                .iter()
                .any(|o| o.status == OutcomeStatus::Failed);
            outcomes.extend(iteration_outcomes);

            if failed {
                info!(iteration, "loop stopped early after failed iteration");
                break;
            }
        }
        outcomes
    }

    async fn run_conditional(
        &self,
        agents: &[Arc<dyn Agent>],
        input: &ProcessedData,
        predicate: &AgentPredicate,
    ) -> Vec<AgentOutcome> {
        let mut outcomes = Vec::with_capacity(agents.len());
        for agent in agents {
            if predicate(agent.as_ref(), input) {
                outcomes.push(
                    Self::invoke(agent.as_ref(), input, "cond", self.config.queue_capacity, None)
                        .await,
                );
            } else {
                outcomes.push(AgentOutcome::skipped(agent.name()));
            }
        }
        outcomes
    }
}
