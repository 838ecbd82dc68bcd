use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Order in which pending records are picked for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    /// Oldest capture first.
    #[default]
    Fifo,
    /// Newest capture first.
    Lifo,
    /// Captures from the current calendar day first, oldest first within each group.
    Priority,
}

impl SyncStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStrategy::Fifo => "fifo",
            SyncStrategy::Lifo => "lifo",
            SyncStrategy::Priority => "priority",
        }
    }
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(SyncStrategy::Fifo),
            "lifo" => Ok(SyncStrategy::Lifo),
            "priority" => Ok(SyncStrategy::Priority),
            other => Err(format!("Unknown sync strategy: {other}")),
        }
    }
}
