use crate::card::AgentCard;
use agentmesh_core::{Payload, ProcessedData};
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default age past which a registry entry is considered stale.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Optional constraints for [`AgentRegistry::discover_agents`].
///
/// Each clause must hold in full when present: all required skills must be
/// among the card's skill names, and every metadata pair must match
/// exactly. An absent clause is vacuously true.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryQuery {
    /// Skill names the card must all advertise.
    pub skills: Option<Vec<String>>,
    /// Metadata key/value pairs the card must all match exactly.
    pub metadata: Option<Payload>,
}

impl DiscoveryQuery {
    /// An empty query, matching every card.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a skill name.
    pub fn require_skill(mut self, name: impl Into<String>) -> Self {
        self.skills.get_or_insert_with(Vec::new).push(name.into());
        self
    }

    /// Requires an exact metadata match.
    pub fn require_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(Payload::new)
            .insert(key.into(), value);
        self
    }
}

/// Counts a hosting layer can read off the registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    /// Cards currently registered.
    pub total_agents: usize,
    /// Configured TTL in seconds.
    pub ttl_seconds: u64,
}

#[derive(Debug)]
struct Entry {
    card: AgentCard,
    last_seen: Instant,
}

/// Capability-indexed store of reachable agents.
///
/// Expiry is pull-based: nothing ages out until a caller runs
/// [`cleanup_expired_agents`](AgentRegistry::cleanup_expired_agents).
#[derive(Debug)]
pub struct AgentRegistry {
    agents: HashMap<String, Entry>,
    ttl: Duration,
}

impl AgentRegistry {
    /// Creates a registry with the default 300 s TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a registry with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            agents: HashMap::new(),
            ttl,
        }
    }

    /// Stores a card by id, overwriting any existing one, and stamps its
    /// `last_seen`.
    pub fn register_agent(&mut self, card: AgentCard) {
        info!(agent_id = %card.id, name = %card.name, "agent registered");
        self.agents.insert(
            card.id.clone(),
            Entry {
                card,
                last_seen: Instant::now(),
            },
        );
    }

    /// Removes a card. Returns false if the id was unknown.
    pub fn unregister_agent(&mut self, agent_id: &str) -> bool {
        let removed = self.agents.remove(agent_id).is_some();
        if removed {
            info!(agent_id = %agent_id, "agent unregistered");
        }
        removed
    }

    /// Refreshes a card's `last_seen` without re-submitting it. Returns
    /// false if the id is unknown.
    pub fn touch(&mut self, agent_id: &str) -> bool {
        match self.agents.get_mut(agent_id) {
            Some(entry) => {
                entry.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Every card matching the query; an absent query matches everything.
    /// Results are ordered by agent id.
    pub fn discover_agents(&self, query: Option<&DiscoveryQuery>) -> Vec<AgentCard> {
        let mut matches: Vec<AgentCard> = self
            .agents
            .values()
            .filter(|entry| Self::matches_query(&entry.card, query))
            .map(|entry| entry.card.clone())
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(matched = matches.len(), "discovery query evaluated");
        matches
    }

    fn matches_query(card: &AgentCard, query: Option<&DiscoveryQuery>) -> bool {
        let Some(query) = query else {
            return true;
        };

        if let Some(required_skills) = &query.skills {
            let advertised: Vec<&str> = card.skills.iter().map(|s| s.name.as_str()).collect();
            if !required_skills
                .iter()
                .all(|required| advertised.contains(&required.as_str()))
            {
                return false;
            }
        }

        if let Some(required_metadata) = &query.metadata {
            for (key, value) in required_metadata {
                if card.metadata.get(key) != Some(value) {
                    return false;
                }
            }
        }

        true
    }

    /// Looks up a card by id.
    pub fn get_agent_by_id(&self, agent_id: &str) -> Option<&AgentCard> {
        self.agents.get(agent_id).map(|entry| &entry.card)
    }

    /// Every registered card, ordered by agent id.
    pub fn list_all_agents(&self) -> Vec<&AgentCard> {
        let mut cards: Vec<&AgentCard> = self.agents.values().map(|entry| &entry.card).collect();
        cards.sort_by(|a, b| a.id.cmp(&b.id));
        cards
    }

    /// Unregisters every card whose `last_seen` is older than the TTL.
    /// Returns the removed ids.
    pub fn cleanup_expired_agents(&mut self) -> Vec<String> {
        let expired: Vec<String> = self
            .agents
            .iter()
            .filter(|(_, entry)| entry.last_seen.elapsed() > self.ttl)
            .map(|(id, _)| id.clone())
            .collect();

        for agent_id in &expired {
            self.unregister_agent(agent_id);
        }

        if !expired.is_empty() {
            info!(expired = expired.len(), "expired agents cleaned up");
        }
        expired
    }

    /// Selects the agents relevant to a processed input, per the relevance
    /// rule on [`AgentCard::is_relevant_to`]. Distinct from
    /// [`discover_agents`](Self::discover_agents): this feeds orchestration,
    /// not capability queries.
    pub fn select_relevant_agents(&self, input: &ProcessedData) -> Vec<AgentCard> {
        let mut relevant: Vec<AgentCard> = self
            .agents
            .values()
            .filter(|entry| entry.card.is_relevant_to(input))
            .map(|entry| entry.card.clone())
            .collect();
        relevant.sort_by(|a, b| a.id.cmp(&b.id));

        info!(selected = relevant.len(), "relevant agents selected");
        relevant
    }

    /// Current counts.
    pub fn registry_stats(&self) -> RegistryStats {
        RegistryStats {
            total_agents: self.agents.len(),
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Number of registered cards.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
