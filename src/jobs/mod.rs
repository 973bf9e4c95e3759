//! Scheduled Jobs
//!
//! Background jobs for the daily installment lifecycle: the status sweep
//! that advances installments to Due/Late, and the upcoming-installment
//! scan that logs notification lines.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::interval;
use uuid::Uuid;

/// Default look-ahead window for upcoming-installment notifications
pub const DEFAULT_HORIZON_DAYS: i64 = 3;

// =========================================================================
// Installment status sweep
// =========================================================================

/// Advance installment statuses based on their due dates.
/// - Pending installments due today become Due
/// - Pending/Due installments past their due date become Late
///
/// Paid installments are never touched. Returns the number of rows changed;
/// running the sweep twice on the same day changes nothing the second time.
pub async fn update_installment_statuses(
    pool: &PgPool,
    today: NaiveDate,
) -> Result<u64, JobError> {
    let due_today = sqlx::query(
        r#"
        UPDATE installments
        SET status = 'Due', updated_at = NOW()
        WHERE due_date = $1 AND status = 'Pending'
        "#,
    )
    .bind(today)
    .execute(pool)
    .await?
    .rows_affected();

    let overdue = sqlx::query(
        r#"
        UPDATE installments
        SET status = 'Late', updated_at = NOW()
        WHERE due_date < $1 AND status IN ('Pending', 'Due')
        "#,
    )
    .bind(today)
    .execute(pool)
    .await?
    .rows_affected();

    let total = due_today + overdue;
    if total > 0 {
        tracing::info!(
            due_today = due_today,
            overdue = overdue,
            "Installment status sweep updated {} row(s)",
            total
        );
    }

    Ok(total)
}

// =========================================================================
// Upcoming-installment scan
// =========================================================================

/// A pending installment due exactly at the notification horizon
#[derive(Debug, Clone)]
pub struct UpcomingInstallment {
    pub installment_id: Uuid,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub user_email: String,
    pub merchant_email: String,
}

/// Find pending installments due in exactly `horizon_days` days, joined
/// with the plan's user and merchant identity. Read-only.
pub async fn find_upcoming(
    pool: &PgPool,
    today: NaiveDate,
    horizon_days: i64,
) -> Result<Vec<UpcomingInstallment>, JobError> {
    let target = today + ChronoDuration::days(horizon_days);

    let rows: Vec<(Uuid, NaiveDate, Decimal, String, String)> = sqlx::query_as(
        r#"
        SELECT i.id, i.due_date, i.amount, u.email, m.email
        FROM installments i
        JOIN payment_plans p ON p.id = i.plan_id
        JOIN users u ON u.id = p.user_id
        JOIN users m ON m.id = p.merchant_id
        WHERE i.due_date = $1 AND i.status = 'Pending'
        "#,
    )
    .bind(target)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(installment_id, due_date, amount, user_email, merchant_email)| UpcomingInstallment {
                installment_id,
                due_date,
                amount,
                user_email,
                merchant_email,
            },
        )
        .collect())
}

/// Scan for upcoming installments and emit one notification log line per
/// hit. Returns the number found.
pub async fn check_upcoming_installments(
    pool: &PgPool,
    today: NaiveDate,
    horizon_days: i64,
) -> Result<u64, JobError> {
    let upcoming = find_upcoming(pool, today, horizon_days).await?;

    for entry in &upcoming {
        tracing::info!(
            installment_id = %entry.installment_id,
            user = %entry.user_email,
            merchant = %entry.merchant_email,
            amount = %entry.amount,
            due_date = %entry.due_date,
            "UPCOMING INSTALLMENT NOTIFICATION: user {} has an installment of {} due in {} days (due date: {})",
            entry.user_email,
            entry.amount,
            horizon_days,
            entry.due_date
        );
    }

    Ok(upcoming.len() as u64)
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for the job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval for the status sweep (default: daily)
    pub sweep_interval: Duration,
    /// Interval for the upcoming-installment scan (default: daily)
    pub notify_interval: Duration,
    /// Look-ahead window for notifications (default: 3 days)
    pub upcoming_horizon_days: i64,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(86400),
            notify_interval: Duration::from_secs(86400),
            upcoming_horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

/// Job Scheduler - runs the periodic installment lifecycle tasks
pub struct JobScheduler {
    pool: PgPool,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    /// Create a new job scheduler with default cadences
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            config: JobSchedulerConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(pool: PgPool, config: JobSchedulerConfig) -> Self {
        Self { pool, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop. A failed tick is logged and retried on the
    /// next tick, which is safe because both jobs are idempotent.
    async fn run(&self) {
        tracing::info!("Job scheduler started");

        let mut sweep_interval = interval(self.config.sweep_interval);
        let mut notify_interval = interval(self.config.notify_interval);

        loop {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    let today = Utc::now().date_naive();
                    if let Err(e) = update_installment_statuses(&self.pool, today).await {
                        tracing::error!(error = %e, "Installment status sweep failed");
                    }
                }
                _ = notify_interval.tick() => {
                    let today = Utc::now().date_naive();
                    if let Err(e) = check_upcoming_installments(
                        &self.pool,
                        today,
                        self.config.upcoming_horizon_days,
                    ).await {
                        tracing::error!(error = %e, "Upcoming installment check failed");
                    }
                }
            }
        }
    }

    /// Run both jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let today = Utc::now().date_naive();

        match update_installment_statuses(&self.pool, today).await {
            Ok(count) => report.statuses_updated = count,
            Err(e) => report.errors.push(format!("Status sweep: {}", e)),
        }

        match check_upcoming_installments(&self.pool, today, self.config.upcoming_horizon_days)
            .await
        {
            Ok(count) => report.upcoming_notified = count,
            Err(e) => report.errors.push(format!("Upcoming check: {}", e)),
        }

        report.completed_at = Utc::now();
        report
    }
}

/// Report from running the lifecycle jobs
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub statuses_updated: u64,
    pub upcoming_notified: u64,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_scheduler_config_default() {
        let config = JobSchedulerConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(86400));
        assert_eq!(config.notify_interval, Duration::from_secs(86400));
        assert_eq!(config.upcoming_horizon_days, 3);
    }

    #[test]
    fn test_horizon_target_date() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 26).unwrap();
        let target = today + ChronoDuration::days(DEFAULT_HORIZON_DAYS);
        assert_eq!(target, NaiveDate::from_ymd_opt(2025, 4, 29).unwrap());
    }

    #[test]
    fn test_horizon_crosses_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 29).unwrap();
        let target = today + ChronoDuration::days(3);
        assert_eq!(target, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
    }

    #[test]
    fn test_sweep_report_default() {
        let report = SweepReport::default();
        assert_eq!(report.statuses_updated, 0);
        assert_eq!(report.upcoming_notified, 0);
        assert!(report.errors.is_empty());
    }
}
