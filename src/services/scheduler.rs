//! Daily schedule loop
//!
//! A sleep-until-next-tick scheduler: each run fires at UTC midnight.
//! Missed windows are not replayed, and a failed run does not stop the
//! loop - the next window gets a fresh attempt.

use chrono::{DateTime, Days, NaiveTime, Utc};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

/// Next UTC midnight strictly after the given instant
pub fn next_daily_run(after: DateTime<Utc>) -> DateTime<Utc> {
    let next_day = after.date_naive() + Days::new(1);
    next_day.and_time(NaiveTime::MIN).and_utc()
}

/// Run the job at every UTC midnight, forever
pub async fn run_daily<E, F, Fut>(mut job: F) -> anyhow::Result<()>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    loop {
        let next = next_daily_run(Utc::now());
        let wait = (next - Utc::now()).to_std().unwrap_or_default();
        // Whole seconds read better in the log line
        let wait = Duration::from_secs(wait.as_secs());

        info!(
            "Next run at {} (sleeping {})",
            next.format("%Y-%m-%d %H:%M:%S UTC"),
            humantime::format_duration(wait)
        );
        tokio::time::sleep(wait).await;

        if let Err(e) = job().await {
            error!("Scheduled run failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_run_from_midday() {
        let after = Utc.with_ymd_and_hms(2025, 3, 5, 13, 45, 10).unwrap();
        let next = next_daily_run(after);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_next_run_is_strictly_after_midnight() {
        let midnight = Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap();
        let next = next_daily_run(midnight);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_next_run_rolls_over_month_end() {
        let after = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let next = next_daily_run(after);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    }
}
