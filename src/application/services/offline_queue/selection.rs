use crate::domain::entities::OfflineAttendanceRecord;
use crate::domain::value_objects::{AttendanceRecordId, SyncStrategy};
use chrono::{DateTime, FixedOffset, Utc};
use std::cmp::Reverse;

/// Picks up to `limit` records accepted by `eligible`, in strategy order.
pub fn select_batch<F>(
    pending: &[OfflineAttendanceRecord],
    strategy: SyncStrategy,
    now: DateTime<Utc>,
    calendar_offset: FixedOffset,
    limit: usize,
    eligible: F,
) -> Vec<AttendanceRecordId>
where
    F: Fn(&OfflineAttendanceRecord) -> bool,
{
    let mut candidates: Vec<&OfflineAttendanceRecord> =
        pending.iter().filter(|record| eligible(record)).collect();

    match strategy {
        SyncStrategy::Fifo => candidates.sort_by_key(|record| record.captured_at()),
        SyncStrategy::Lifo => candidates.sort_by_key(|record| Reverse(record.captured_at())),
        SyncStrategy::Priority => {
            let today = now.with_timezone(&calendar_offset).date_naive();
            candidates.sort_by_key(|record| {
                let captured_today =
                    record.captured_at().with_timezone(&calendar_offset).date_naive() == today;
                (!captured_today, record.captured_at())
            });
        }
    }

    candidates
        .into_iter()
        .take(limit)
        .map(|record| record.id().clone())
        .collect()
}
