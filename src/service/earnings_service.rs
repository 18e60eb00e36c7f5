// service/earnings_service.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{db::DBClient, statsdb::StatsExt, walletdb::WalletExt},
    models::statsmodel::EarningsRow,
    service::error::ServiceError,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EarningsPeriod {
    #[default]
    Week,
    Month,
}

impl EarningsPeriod {
    /// First day of the bucket `at` falls in. Weeks start on Monday.
    pub fn bucket_start(&self, at: DateTime<Utc>) -> NaiveDate {
        let date = at.date_naive();
        match self {
            EarningsPeriod::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            EarningsPeriod::Month => date.with_day(1).unwrap_or(date),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct EarningsBucket {
    pub period_start: Option<NaiveDate>,
    pub shifts: i64,
    pub minutes: i64,
    pub gross_cents: i64,
    pub fee_cents: i64,
    pub net_cents: i64,
}

impl EarningsBucket {
    fn add(&mut self, row: &EarningsRow) {
        self.shifts += 1;
        self.minutes += row.worked_minutes();
        self.gross_cents += row.amount_cents;
        self.fee_cents += row.fee_cents;
        self.net_cents += row.amount_cents - row.fee_cents;
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EarningsTotals {
    pub totals: EarningsBucket,
    pub buckets: Vec<EarningsBucket>,
}

/// Folds completed bookings into overall totals plus per-period buckets,
/// oldest bucket first.
pub fn summarize(rows: &[EarningsRow], period: EarningsPeriod) -> EarningsTotals {
    let mut totals = EarningsBucket::default();
    let mut buckets: BTreeMap<NaiveDate, EarningsBucket> = BTreeMap::new();

    for row in rows {
        totals.add(row);
        let start = period.bucket_start(row.completed_at);
        buckets
            .entry(start)
            .or_insert_with(|| EarningsBucket {
                period_start: Some(start),
                ..Default::default()
            })
            .add(row);
    }

    EarningsTotals {
        totals,
        buckets: buckets.into_values().collect(),
    }
}

fn hours(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

/// Net cents per hour worked, if any time was worked.
pub fn effective_hourly_rate(net_cents: i64, minutes: i64) -> Option<i64> {
    if minutes <= 0 {
        return None;
    }
    Some((net_cents * 60 + minutes / 2) / minutes)
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerEarningsSummary {
    pub worker_id: Uuid,
    pub period: EarningsPeriod,
    pub total_earned_cents: i64,
    pub gross_cents: i64,
    pub fees_cents: i64,
    pub pending_balance_cents: i64,
    pub available_balance_cents: i64,
    pub completed_shifts: i64,
    pub total_hours: f64,
    pub average_hourly_rate_cents: Option<i64>,
    pub buckets: Vec<EarningsBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusinessSpendSummary {
    pub business_id: Uuid,
    pub period: EarningsPeriod,
    pub total_spend_cents: i64,
    pub fees_cents: i64,
    pub completed_shifts: i64,
    pub hours_booked: f64,
    pub buckets: Vec<EarningsBucket>,
}

#[derive(Debug, Clone)]
pub struct EarningsService {
    db_client: Arc<DBClient>,
}

impl EarningsService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn worker_summary(
        &self,
        worker_id: Uuid,
        period: EarningsPeriod,
        since: Option<DateTime<Utc>>,
    ) -> Result<WorkerEarningsSummary, ServiceError> {
        let rows = self.db_client.get_worker_earnings_rows(worker_id, since).await?;
        let wallet = self.db_client.get_wallet(worker_id).await?;
        let EarningsTotals { totals, buckets } = summarize(&rows, period);

        Ok(WorkerEarningsSummary {
            worker_id,
            period,
            total_earned_cents: totals.net_cents,
            gross_cents: totals.gross_cents,
            fees_cents: totals.fee_cents,
            pending_balance_cents: wallet.as_ref().map(|w| w.pending_balance).unwrap_or(0),
            available_balance_cents: wallet.as_ref().map(|w| w.available_balance).unwrap_or(0),
            completed_shifts: totals.shifts,
            total_hours: hours(totals.minutes),
            average_hourly_rate_cents: effective_hourly_rate(totals.net_cents, totals.minutes),
            buckets,
        })
    }

    pub async fn business_summary(
        &self,
        business_id: Uuid,
        period: EarningsPeriod,
        since: Option<DateTime<Utc>>,
    ) -> Result<BusinessSpendSummary, ServiceError> {
        let rows = self.db_client.get_business_spend_rows(business_id, since).await?;
        let EarningsTotals { totals, buckets } = summarize(&rows, period);

        Ok(BusinessSpendSummary {
            business_id,
            period,
            total_spend_cents: totals.gross_cents,
            fees_cents: totals.fee_cents,
            completed_shifts: totals.shifts,
            hours_booked: hours(totals.minutes),
            buckets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(completed_at: DateTime<Utc>, amount_cents: i64, minutes: i64) -> EarningsRow {
        let starts_at = completed_at - Duration::minutes(minutes);
        EarningsRow {
            amount_cents,
            fee_cents: amount_cents / 10,
            starts_at,
            ends_at: completed_at,
            checked_in_at: None,
            checked_out_at: None,
            completed_at,
        }
    }

    #[test]
    fn week_buckets_start_on_monday() {
        // 2026-10-17 is a Saturday
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 18, 0, 0).unwrap();
        assert_eq!(
            EarningsPeriod::Week.bucket_start(at),
            NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
        );
        assert_eq!(
            EarningsPeriod::Month.bucket_start(at),
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
        );
    }

    #[test]
    fn rows_are_grouped_and_totalled() {
        let rows = vec![
            row(Utc.with_ymd_and_hms(2026, 9, 30, 17, 0, 0).unwrap(), 16000, 480),
            row(Utc.with_ymd_and_hms(2026, 10, 2, 17, 0, 0).unwrap(), 8000, 240),
            row(Utc.with_ymd_and_hms(2026, 10, 14, 17, 0, 0).unwrap(), 4000, 120),
        ];

        let weekly = summarize(&rows, EarningsPeriod::Week);
        assert_eq!(weekly.totals.shifts, 3);
        assert_eq!(weekly.totals.gross_cents, 28000);
        assert_eq!(weekly.totals.net_cents, 25200);
        assert_eq!(weekly.totals.minutes, 840);
        assert_eq!(weekly.buckets.len(), 2);
        assert_eq!(weekly.buckets[0].shifts, 2);

        let monthly = summarize(&rows, EarningsPeriod::Month);
        assert_eq!(monthly.buckets.len(), 2);
        assert_eq!(
            monthly.buckets[0].period_start,
            NaiveDate::from_ymd_opt(2026, 9, 1)
        );
        assert_eq!(monthly.buckets[1].net_cents, 10800);
    }

    #[test]
    fn hourly_rate_and_hours() {
        assert_eq!(effective_hourly_rate(14400, 480), Some(1800));
        assert_eq!(effective_hourly_rate(1000, 0), None);
        assert_eq!(hours(90), 1.5);
        assert_eq!(hours(100), 1.67);
    }

    #[test]
    fn empty_history_is_all_zero() {
        let summary = summarize(&[], EarningsPeriod::Month);
        assert_eq!(summary.totals, EarningsBucket::default());
        assert!(summary.buckets.is_empty());
    }
}
