use agentmesh_core::{Payload, ProcessedData};
use serde::{Deserialize, Serialize};

/// One advertised capability of an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSkill {
    /// Unique skill identifier (e.g. `"skill.route"`).
    pub id: String,
    /// Human-readable skill name, also matched against input text by the
    /// relevance rule.
    pub name: String,
    /// What the skill does.
    pub description: String,
    /// Extra trigger words for the relevance rule.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Declared input shape. Opaque to the core.
    #[serde(default)]
    pub input_schema: serde_json::Value,
    /// Declared output shape. Opaque to the core.
    #[serde(default)]
    pub output_schema: serde_json::Value,
}

impl AgentSkill {
    /// Creates a skill with empty keywords and null schemas.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            keywords: Vec::new(),
            input_schema: serde_json::Value::Null,
            output_schema: serde_json::Value::Null,
        }
    }

    /// Adds a relevance keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Sets the declared input and output shapes.
    pub fn with_schemas(
        mut self,
        input_schema: serde_json::Value,
        output_schema: serde_json::Value,
    ) -> Self {
        self.input_schema = input_schema;
        self.output_schema = output_schema;
        self
    }
}

/// An agent's registry entry: identity, advertised skills, and metadata.
///
/// Unique by `id`; re-registering the same id overwrites the stored card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    /// Unique agent identifier.
    pub id: String,
    /// Human-readable agent name.
    pub name: String,
    /// What the agent does.
    #[serde(default)]
    pub description: String,
    /// The agent's advertised skills.
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
    /// Arbitrary key-value metadata. The relevance rule reads the
    /// `supported_input_types` key (an array of strings) from here.
    #[serde(default)]
    pub metadata: Payload,
    /// Where the agent can be reached, when it is remote.
    pub endpoint: Option<String>,
}

impl AgentCard {
    /// Creates a card with no skills, metadata, or endpoint.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            skills: Vec::new(),
            metadata: Payload::new(),
            endpoint: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: AgentSkill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// The relevance rule used to select agents for orchestration.
    ///
    /// Relevant when any skill name or keyword occurs as a substring of the
    /// input's text (case-insensitive), or when the input's declared type
    /// is listed in the card's `supported_input_types` metadata.
    pub fn is_relevant_to(&self, input: &ProcessedData) -> bool {
        let text = input.text.to_lowercase();

        for skill in &self.skills {
            let name = skill.name.to_lowercase();
            if !name.is_empty() && text.contains(&name) {
                return true;
            }
            for keyword in &skill.keywords {
                let keyword = keyword.to_lowercase();
                if !keyword.is_empty() && text.contains(&keyword) {
                    return true;
                }
            }
        }

        self.supported_input_types()
            .any(|supported| supported == input.kind)
    }

    fn supported_input_types(&self) -> impl Iterator<Item = &str> {
        self.metadata
            .get("supported_input_types")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str())
    }
}
