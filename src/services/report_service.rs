use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::error::{AppError, AppResult};
use crate::models::PaymentStats;
use crate::policy::{require_role, Action, Actor};
use crate::store::RentalStore;

/// Half-open `[start, end)` range of payment dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn first_of_month(year: i32, month: u32) -> AppResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Internal(format!("invalid month {}-{}", year, month)))
}

pub fn month_window(now: DateTime<Utc>) -> AppResult<Window> {
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    Ok(Window {
        start: first_of_month(now.year(), now.month())?,
        end: first_of_month(next_year, next_month)?,
    })
}

pub fn year_window(now: DateTime<Utc>) -> AppResult<Window> {
    Ok(Window {
        start: first_of_month(now.year(), 1)?,
        end: first_of_month(now.year() + 1, 1)?,
    })
}

pub struct ReportService;

impl ReportService {
    pub async fn payment_stats(store: &dyn RentalStore, actor: &Actor) -> AppResult<PaymentStats> {
        require_role(actor, Action::ViewPaymentStats)?;
        Self::payment_stats_at(store, Utc::now()).await
    }

    pub async fn payment_stats_at(
        store: &dyn RentalStore,
        now: DateTime<Utc>,
    ) -> AppResult<PaymentStats> {
        let month = month_window(now)?;
        let year = year_window(now)?;

        let monthly_revenue = store.paid_total(month.start, month.end).await?;
        let yearly_revenue = store.paid_total(year.start, year.end).await?;
        let payment_methods = store.paid_by_method().await?;

        Ok(PaymentStats {
            monthly_revenue,
            yearly_revenue,
            payment_methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use rust_decimal::Decimal;
    use tokio_test::assert_ok;
    use uuid::Uuid;

    #[test]
    fn december_month_window_rolls_into_next_year() {
        let now = Utc.with_ymd_and_hms(2024, 12, 15, 10, 0, 0).unwrap();
        let window = month_window(now).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn year_window_covers_calendar_year() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        let window = year_window(now).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn empty_ledger_reports_zero() {
        let store = InMemoryStore::new();
        let stats = assert_ok!(ReportService::payment_stats_at(&store, Utc::now()).await);
        assert_eq!(stats.monthly_revenue, Decimal::ZERO);
        assert_eq!(stats.yearly_revenue, Decimal::ZERO);
        assert!(stats.payment_methods.is_empty());
    }

    #[tokio::test]
    async fn tenants_cannot_view_stats() {
        let store = InMemoryStore::new();
        let result = ReportService::payment_stats(&store, &Actor::tenant(Uuid::new_v4())).await;
        assert!(matches!(result, Err(AppError::ForbiddenWith(_))));
    }
}
