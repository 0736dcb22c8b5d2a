//! Strategy behavior through the public API, with scripted agents.

use agentmesh_core::{MeshError, MeshResult, Payload, ProcessedData, RequestContext};
use agentmesh_events::{Event, EventQueue};
use agentmesh_orchestrator::{Agent, AgentOutcome, Orchestrator, OutcomeStatus, Strategy};
use agentmesh_registry::{AgentCard, AgentRegistry, AgentSkill};
use agentmesh_tasks::TaskManager;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a scripted agent does on each `execute`.
enum Behavior {
    /// Enqueue a response event.
    Respond(serde_json::Value),
    /// Return an orchestration error.
    Fail(String),
    /// Return Ok without enqueueing anything.
    Silent,
    /// Respond until the nth call (0-based), then fail.
    FailFromCall(usize),
}

struct ScriptedAgent {
    name: String,
    skills: Vec<AgentSkill>,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl ScriptedAgent {
    fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            skills: Vec::new(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_skill(mut self, skill: AgentSkill) -> Self {
        self.skills.push(skill);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn skills(&self) -> &[AgentSkill] {
        &self.skills
    }

    async fn execute(&self, context: &RequestContext, queue: &EventQueue) -> MeshResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Respond(value) => {
                queue.put(Event::new("response", value.clone())).await;
                Ok(())
            }
            Behavior::Fail(message) => Err(MeshError::Orchestration(message.clone())),
            Behavior::Silent => Ok(()),
            Behavior::FailFromCall(n) => {
                if call >= *n {
                    return Err(MeshError::Orchestration(format!(
                        "{} failed on request {}",
                        self.name, context.request_id
                    )));
                }
                queue
                    .put(Event::new("response", json!({"call": call})))
                    .await;
                Ok(())
            }
        }
    }
}

fn by_agent<'a>(outcomes: &'a [AgentOutcome], name: &str) -> Vec<&'a AgentOutcome> {
    outcomes.iter().filter(|o| o.agent == name).collect()
}

#[tokio::test]
async fn parallel_isolates_one_failure() {
    let a = Arc::new(ScriptedAgent::new("a", Behavior::Respond(json!({"n": 1}))));
    let b = Arc::new(ScriptedAgent::new("b", Behavior::Fail("backend down".into())));
    let c = Arc::new(ScriptedAgent::new("c", Behavior::Respond(json!({"n": 3}))));
    let agents: Vec<Arc<dyn Agent>> = vec![a.clone(), b.clone(), c.clone()];

    let outcomes = Orchestrator::new()
        .orchestrate(&agents, &ProcessedData::new("go", "text"), Strategy::Parallel)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 1);
    assert_eq!(c.calls(), 1);

    let failed: Vec<_> = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].agent, "b");
    assert_eq!(failed[0].error.as_deref(), Some("backend down"));

    // Completion order is not guaranteed, but every agent reports.
    let mut names: Vec<&str> = outcomes.iter().map(|o| o.agent.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn silent_agent_reports_no_response() {
    let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(ScriptedAgent::new("mute", Behavior::Silent))];

    let outcomes = Orchestrator::new()
        .orchestrate(&agents, &ProcessedData::new("go", "text"), Strategy::Sequential)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, OutcomeStatus::NoResponse);
    assert!(outcomes[0].response.is_none());
    assert!(outcomes[0].error.is_none());
}

#[tokio::test]
async fn loop_runs_full_bound_without_failure() {
    let a = Arc::new(ScriptedAgent::new("a", Behavior::Respond(json!("ok"))));
    let agents: Vec<Arc<dyn Agent>> = vec![a.clone()];

    let outcomes = Orchestrator::new()
        .orchestrate(
            &agents,
            &ProcessedData::new("go", "text"),
            Strategy::Loop { max_iterations: 3 },
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(a.calls(), 3);
    let iterations: Vec<Option<usize>> = outcomes.iter().map(|o| o.iteration).collect();
    assert_eq!(iterations, vec![Some(0), Some(1), Some(2)]);
}

#[tokio::test]
async fn loop_finishes_failing_iteration_then_stops() {
    // "steady" keeps responding; "flaky" responds on iteration 0 and fails
    // from iteration 1 on.
    let steady = Arc::new(ScriptedAgent::new("steady", Behavior::Respond(json!("ok"))));
    let flaky = Arc::new(ScriptedAgent::new("flaky", Behavior::FailFromCall(1)));
    let agents: Vec<Arc<dyn Agent>> = vec![steady.clone(), flaky.clone()];

    let outcomes = Orchestrator::new()
        .orchestrate(
            &agents,
            &ProcessedData::new("go", "text"),
            Strategy::Loop { max_iterations: 5 },
        )
        .await
        .unwrap();

    // Two full iterations: the failing one still runs to its end, and no
    // third begins.
    assert_eq!(outcomes.len(), 4);
    assert_eq!(steady.calls(), 2);
    assert_eq!(flaky.calls(), 2);

    let flaky_outcomes = by_agent(&outcomes, "flaky");
    assert_eq!(flaky_outcomes[0].status, OutcomeStatus::Completed);
    assert_eq!(flaky_outcomes[0].iteration, Some(0));
    assert_eq!(flaky_outcomes[1].status, OutcomeStatus::Failed);
    assert_eq!(flaky_outcomes[1].iteration, Some(1));

    // The steady agent still ran in the failing iteration.
    let steady_outcomes = by_agent(&outcomes, "steady");
    assert_eq!(steady_outcomes[1].status, OutcomeStatus::Completed);
    assert_eq!(steady_outcomes[1].iteration, Some(1));
}

#[tokio::test]
async fn conditional_gates_on_input() {
    let terrestrial = Arc::new(
        ScriptedAgent::new("terrestrial", Behavior::Respond(json!("route planned")))
            .with_skill(AgentSkill::new("skill.route", "route", "").with_keyword("fleet")),
    );
    let maritime = Arc::new(
        ScriptedAgent::new("maritime", Behavior::Respond(json!("berth planned")))
            .with_skill(AgentSkill::new("skill.vessel", "vessel", "").with_keyword("port")),
    );
    let agents: Vec<Arc<dyn Agent>> = vec![terrestrial.clone(), maritime.clone()];

    let input = ProcessedData::new("optimize the fleet schedule", "text");
    let strategy = Strategy::conditional(|agent, data| {
        agent.skills().iter().any(|skill| {
            skill
                .keywords
                .iter()
                .any(|keyword| data.text.contains(keyword.as_str()))
        })
    });

    let outcomes = Orchestrator::new()
        .orchestrate(&agents, &input, strategy)
        .await
        .unwrap();

    assert_eq!(outcomes[0].agent, "terrestrial");
    assert_eq!(outcomes[0].status, OutcomeStatus::Completed);
    assert_eq!(outcomes[1].agent, "maritime");
    assert_eq!(outcomes[1].status, OutcomeStatus::Skipped);
    assert_eq!(maritime.calls(), 0);
}

/// End to end: registry selection picks the relevant card, the matching
/// agent runs sequentially, and its outcome drives the task lifecycle.
#[tokio::test]
async fn selection_orchestration_and_task_lifecycle() {
    let mut registry = AgentRegistry::new();
    registry.register_agent(
        AgentCard::new("terrestrial", "Terrestrial Planner").with_skill(
            AgentSkill::new("skill.route", "route", "Plans road routes").with_keyword("route"),
        ),
    );
    registry.register_agent(
        AgentCard::new("maritime", "Maritime Planner")
            .with_skill(AgentSkill::new("skill.vessel", "vessel", "").with_keyword("port")),
    );

    let input = ProcessedData::new("plan a route from A to B", "text");
    let selected = registry.select_relevant_agents(&input);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, "terrestrial");

    let agents: Vec<Arc<dyn Agent>> = selected
        .iter()
        .map(|card| {
            Arc::new(ScriptedAgent::new(
                &card.id,
                Behavior::Respond(json!({"distance_km": 650})),
            )) as Arc<dyn Agent>
        })
        .collect();

    let outcomes = Orchestrator::new()
        .orchestrate(&agents, &input, Strategy::Sequential)
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 1);

    let mut manager = TaskManager::new();
    let mut input_data = Payload::new();
    input_data.insert("text".to_string(), json!(input.text));
    let task = manager
        .create_task("ctx-1", "skill.route", input_data, None)
        .unwrap();
    manager.start_task(&task.task_id).unwrap();

    let outcome = &outcomes[0];
    let task = match outcome.status {
        OutcomeStatus::Completed => {
            let mut output = Payload::new();
            output.insert(
                "response".to_string(),
                outcome.response.clone().unwrap_or(json!(null)),
            );
            manager.complete_task(&task.task_id, output).unwrap()
        }
        _ => manager
            .fail_task(
                &task.task_id,
                outcome.error.clone().unwrap_or_else(|| "no response".to_string()),
            )
            .unwrap(),
    };

    let output_data = task.output_data.as_ref().unwrap();
    assert_eq!(
        output_data.get("response"),
        Some(&json!({"distance_km": 650}))
    );

    let stats = manager.task_statistics();
    assert_eq!(stats.total_tasks, 1);
    assert_eq!(stats.status_counts.get("completed"), Some(&1));
}
