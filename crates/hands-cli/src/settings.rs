use hands_client::agent_server::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "openhands/claude-sonnet-4-5-20250929";

/// Service and model settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `OPENHANDS_BASE_URL`
    pub base_url: String,
    /// `OPENHANDS_API_KEY`; unset or empty means no key is sent.
    pub api_key: Option<String>,
    /// `LLM_MODEL`
    pub model: String,
    /// `LLM_API_KEY`
    pub llm_api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            llm_api_key: String::new(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup("OPENHANDS_BASE_URL").unwrap_or(defaults.base_url),
            api_key: lookup("OPENHANDS_API_KEY").filter(|key| !key.is_empty()),
            model: lookup("LLM_MODEL").unwrap_or(defaults.model),
            llm_api_key: lookup("LLM_API_KEY").unwrap_or(defaults.llm_api_key),
        }
    }
}
