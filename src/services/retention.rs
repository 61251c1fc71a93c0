use chrono::{DateTime, Days, Months, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::RetentionConfig;
use crate::database::models::ContentKind;
use crate::database::Stores;

/// Outcome of one sweep over every content type
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub run_id: Uuid,
    pub ran_at: DateTime<Utc>,
    /// Rows soft deleted strictly before this instant were eligible
    pub threshold: DateTime<Utc>,
    pub purged: HashMap<ContentKind, u64>,
    pub failures: HashMap<ContentKind, String>,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.purged.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Permanently removes soft-deleted content once it is older than the retention window
pub struct RetentionSweeper {
    stores: Stores,
    window: Months,
}

impl RetentionSweeper {
    pub fn new(stores: Stores, config: &RetentionConfig) -> Self {
        Self {
            stores,
            window: Months::new(config.window_months),
        }
    }

    /// `now` minus the window in calendar months, clamped at the earliest representable instant
    pub fn threshold(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(self.window).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub async fn sweep(&self) -> SweepReport {
        self.sweep_at(Utc::now()).await
    }

    /// Purge each content type independently. A failing type is logged and reported; the
    /// next scheduled run retries it since its rows are still there.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        let run_id = Uuid::new_v4();
        let threshold = self.threshold(now);
        let mut purged = HashMap::new();
        let mut failures = HashMap::new();

        for kind in ContentKind::ALL {
            match self.stores.purge_deleted_before(kind, threshold).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Retention sweep {}: purged {} {} rows", run_id, count, kind);
                    }
                    purged.insert(kind, count);
                }
                Err(e) => {
                    error!("Retention sweep {}: failed to purge {} rows: {}", run_id, kind, e);
                    failures.insert(kind, e.to_string());
                }
            }
        }

        let report = SweepReport {
            run_id,
            ran_at: now,
            threshold,
            purged,
            failures,
        };
        info!(
            "Retention sweep {} finished: {} rows purged, {} failures, threshold {}",
            run_id,
            report.total(),
            report.failures.len(),
            threshold
        );
        report
    }

    /// Run forever, firing once a day at `run_at` UTC
    pub fn spawn_daily(self: Arc<Self>, run_at: NaiveTime) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = next_run_after(now, run_at);
                let wait = (next - now).to_std().unwrap_or_default();
                info!("Next retention sweep at {}", next);
                tokio::time::sleep(wait).await;
                self.sweep_guarded_at(Utc::now()).await;
            }
        })
    }

    /// Run one sweep on its own task so a panic is logged instead of ending the schedule
    pub async fn sweep_guarded_at(self: &Arc<Self>, now: DateTime<Utc>) -> Option<SweepReport> {
        let sweeper = Arc::clone(self);
        match tokio::spawn(async move { sweeper.sweep_at(now).await }).await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Retention sweep aborted: {}", e);
                None
            }
        }
    }
}

/// First occurrence of `run_at` strictly after `now`
pub fn next_run_after(now: DateTime<Utc>, run_at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(run_at).and_utc();
    if today > now {
        today
    } else {
        today + Days::new(1)
    }
}
