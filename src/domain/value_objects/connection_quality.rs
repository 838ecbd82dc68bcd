use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const EXCELLENT_BELOW: Duration = Duration::from_millis(100);
const GOOD_BELOW: Duration = Duration::from_millis(300);
const POOR_BELOW: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionQuality {
    Excellent,
    Good,
    Poor,
    Offline,
}

impl ConnectionQuality {
    /// Classifies a successful health probe by its round-trip time.
    pub fn from_round_trip(rtt: Duration) -> Self {
        if rtt < EXCELLENT_BELOW {
            ConnectionQuality::Excellent
        } else if rtt < GOOD_BELOW {
            ConnectionQuality::Good
        } else if rtt < POOR_BELOW {
            ConnectionQuality::Poor
        } else {
            ConnectionQuality::Offline
        }
    }

    pub fn is_usable(&self) -> bool {
        !matches!(self, ConnectionQuality::Offline)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionQuality::Excellent => "excellent",
            ConnectionQuality::Good => "good",
            ConnectionQuality::Poor => "poor",
            ConnectionQuality::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
