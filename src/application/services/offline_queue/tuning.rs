use crate::shared::config::SyncConfig;
use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use std::time::Duration;

/// Timing knobs that come from configuration and are not persisted with the queue.
#[derive(Debug, Clone, Copy)]
pub struct SyncTuning {
    pub max_record_age: chrono::Duration,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    pub item_delay: Duration,
    pub poor_connection_item_delay: Duration,
    /// Offset used to decide what "today" means for the priority strategy.
    /// `None` follows the system time zone, resolved at each selection.
    pub calendar_offset: Option<FixedOffset>,
}

impl SyncTuning {
    /// The calendar offset in force at `now`, so DST changes are picked up.
    pub fn calendar_offset_at(&self, now: DateTime<Utc>) -> FixedOffset {
        self.calendar_offset
            .unwrap_or_else(|| Local.offset_from_utc_datetime(&now.naive_utc()).fix())
    }
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            max_record_age: chrono::Duration::hours(24),
            backoff_base: Duration::from_secs(1),
            backoff_max: Duration::from_secs(60),
            item_delay: Duration::from_millis(100),
            poor_connection_item_delay: Duration::from_millis(500),
            calendar_offset: None,
        }
    }
}

impl From<&SyncConfig> for SyncTuning {
    fn from(config: &SyncConfig) -> Self {
        Self {
            max_record_age: chrono::Duration::hours(config.max_record_age_hours as i64),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_max: Duration::from_millis(config.backoff_max_ms),
            item_delay: Duration::from_millis(config.item_delay_ms),
            poor_connection_item_delay: Duration::from_millis(config.poor_connection_item_delay_ms),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_offset_wins_over_the_system_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let tuning = SyncTuning {
            calendar_offset: Some(tokyo),
            ..SyncTuning::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 29, 1, 30, 0).unwrap();

        assert_eq!(tuning.calendar_offset_at(now), tokyo);
    }

    #[test]
    fn system_zone_is_resolved_for_the_given_instant() {
        let tuning = SyncTuning::default();
        for now in [
            Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap(),
        ] {
            let expected = Local.offset_from_utc_datetime(&now.naive_utc()).fix();
            assert_eq!(tuning.calendar_offset_at(now), expected);
        }
    }
}
