use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;

/// Execution phase reported by the remote agent.
///
/// The server may introduce new values at any time; those are kept verbatim
/// in [`AgentStatus::Other`] instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentStatus {
    Idle,
    Running,
    Paused,
    WaitingForConfirmation,
    Finished,
    Error,
    Stuck,
    Other(String),
}

impl AgentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "idle" => AgentStatus::Idle,
            "running" => AgentStatus::Running,
            "paused" => AgentStatus::Paused,
            "waiting_for_confirmation" => AgentStatus::WaitingForConfirmation,
            "finished" => AgentStatus::Finished,
            "error" => AgentStatus::Error,
            "stuck" => AgentStatus::Stuck,
            other => AgentStatus::Other(other.to_string()),
        }
    }

    /// Raw wire value.
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Running => "running",
            AgentStatus::Paused => "paused",
            AgentStatus::WaitingForConfirmation => "waiting_for_confirmation",
            AgentStatus::Finished => "finished",
            AgentStatus::Error => "error",
            AgentStatus::Stuck => "stuck",
            AgentStatus::Other(raw) => raw,
        }
    }

    /// Human-readable description; unknown values pass through unchanged.
    pub fn describe(&self) -> &str {
        match self {
            AgentStatus::Idle => "Idle - Waiting for input",
            AgentStatus::Running => "Running - Agent is working...",
            AgentStatus::Paused => "Paused - Execution paused",
            AgentStatus::WaitingForConfirmation => "Awaiting Confirmation",
            AgentStatus::Finished => "Finished - Task completed",
            AgentStatus::Error => "Error - Task failed",
            AgentStatus::Stuck => "Stuck - Agent needs help",
            AgentStatus::Other(raw) => raw,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, AgentStatus::Running)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(AgentStatus::parse(s))
    }
}

impl Serialize for AgentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AgentStatus::parse(&raw))
    }
}

/// Anything that can report the remote agent's current status on demand.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Query the current raw status value.
    async fn agent_status(&self) -> Result<String>;
}
