use crate::application::ports::{Clock, HealthProbe};
use crate::domain::value_objects::ConnectionQuality;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEvent {
    pub at: DateTime<Utc>,
    pub is_online: bool,
    pub quality: ConnectionQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_trip_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSnapshot {
    pub is_online: bool,
    pub quality: ConnectionQuality,
    pub last_probe_at: Option<DateTime<Utc>>,
    pub last_round_trip_ms: Option<u64>,
    pub history: Vec<ConnectionEvent>,
}

#[derive(Debug)]
struct ConnectionState {
    is_online: bool,
    quality: ConnectionQuality,
    last_probe_at: Option<DateTime<Utc>>,
    last_round_trip_ms: Option<u64>,
    history: VecDeque<ConnectionEvent>,
}

/// Best-effort view of whether the attendance API can be reached.
///
/// The history is kept for diagnostics only.
pub struct ConnectionMonitor {
    probe: Arc<dyn HealthProbe>,
    clock: Arc<dyn Clock>,
    history_limit: usize,
    state: Mutex<ConnectionState>,
}

impl ConnectionMonitor {
    pub fn new(probe: Arc<dyn HealthProbe>, clock: Arc<dyn Clock>, history_limit: usize) -> Self {
        Self {
            probe,
            clock,
            history_limit: history_limit.max(1),
            state: Mutex::new(ConnectionState {
                is_online: true,
                quality: ConnectionQuality::Good,
                last_probe_at: None,
                last_round_trip_ms: None,
                history: VecDeque::new(),
            }),
        }
    }

    pub fn is_online(&self) -> bool {
        self.state().is_online
    }

    pub fn quality(&self) -> ConnectionQuality {
        self.state().quality
    }

    /// Online per the platform signal and not marked unreachable by the last probe.
    pub fn is_effectively_online(&self) -> bool {
        let state = self.state();
        state.is_online && state.quality.is_usable()
    }

    /// Probes the health endpoint once. Failures resolve to `Offline`.
    pub async fn test_connection(&self) -> ConnectionQuality {
        let started = Instant::now();
        let result = self.probe.probe().await;
        let elapsed = started.elapsed();

        let (quality, round_trip_ms) = match result {
            Ok(()) => {
                let ms = elapsed.as_millis().min(u128::from(u64::MAX)) as u64;
                (ConnectionQuality::from_round_trip(elapsed), Some(ms))
            }
            Err(err) => {
                tracing::debug!(
                    target: "offline::connection",
                    error = %err,
                    "health probe failed"
                );
                (ConnectionQuality::Offline, None)
            }
        };

        let now = self.clock.now();
        let mut state = self.state();
        state.last_probe_at = Some(now);
        state.last_round_trip_ms = round_trip_ms;
        if state.quality != quality {
            tracing::info!(
                target: "offline::connection",
                from = %state.quality,
                to = %quality,
                round_trip_ms,
                "connection quality changed"
            );
        }
        state.quality = quality;
        let is_online = state.is_online;
        self.push_history(
            &mut state,
            ConnectionEvent {
                at: now,
                is_online,
                quality,
                round_trip_ms,
            },
        );
        quality
    }

    /// Applies a platform online/offline signal.
    ///
    /// Returns `true` only for a transition from offline to online.
    pub fn set_online_status(&self, online: bool) -> bool {
        let now = self.clock.now();
        let mut state = self.state();
        let was_online = state.is_online;
        state.is_online = online;

        if !online {
            state.quality = ConnectionQuality::Offline;
        } else if state.quality == ConnectionQuality::Offline {
            // Provisional until the next probe.
            state.quality = ConnectionQuality::Good;
        }

        if was_online != online {
            tracing::info!(
                target: "offline::connection",
                online,
                quality = %state.quality,
                "online status changed"
            );
            let quality = state.quality;
            self.push_history(
                &mut state,
                ConnectionEvent {
                    at: now,
                    is_online: online,
                    quality,
                    round_trip_ms: None,
                },
            );
        }

        !was_online && online
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        let state = self.state();
        ConnectionSnapshot {
            is_online: state.is_online,
            quality: state.quality,
            last_probe_at: state.last_probe_at,
            last_round_trip_ms: state.last_round_trip_ms,
            history: state.history.iter().cloned().collect(),
        }
    }

    fn push_history(&self, state: &mut ConnectionState, event: ConnectionEvent) {
        if state.history.len() >= self.history_limit {
            state.history.pop_front();
        }
        state.history.push_back(event);
    }

    fn state(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
