use crate::application::ports::{SyncNotice, SyncNotifier};

/// Surfaces queue notices through the log. Hosts with a UI plug in their own notifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl SyncNotifier for TracingNotifier {
    fn notify(&self, notice: SyncNotice) {
        match notice {
            SyncNotice::Synced { record_id } => {
                tracing::info!(target: "offline::notice", %record_id, "attendance synced");
            }
            SyncNotice::DeadLettered {
                record_id,
                reason,
                message,
            } => {
                tracing::warn!(
                    target: "offline::notice",
                    %record_id,
                    %reason,
                    error = %message,
                    "attendance needs attention"
                );
            }
            SyncNotice::BatchCompleted {
                synced_count,
                failed_count,
            } if synced_count > 0 || failed_count > 0 => {
                tracing::info!(
                    target: "offline::notice",
                    synced_count,
                    failed_count,
                    "attendance sync finished"
                );
            }
            SyncNotice::BatchCompleted { .. } => {}
        }
    }
}
