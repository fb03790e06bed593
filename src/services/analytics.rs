use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    errors::ServiceError,
    repositories::{order_repository::SaleRow, OrderRepository},
    services::db_error,
};

/// Delivered revenue of one dealer over three trailing windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub today: Decimal,
    pub week: Decimal,
    pub month: Decimal,
}

/// Sums sales into the today / 7-day / 30-day windows ending at `today`.
///
/// Windows compare UTC calendar dates, so a sale placed at 00:01 on the seventh day back
/// still counts toward the week.
pub fn tally_sales(sales: &[SaleRow], today: NaiveDate) -> SalesSummary {
    let week_start = today - Duration::days(7);
    let month_start = month_window_start(today).date_naive();

    sales.iter().fold(SalesSummary::default(), |mut acc, sale| {
        let day = sale.created_at.date_naive();
        if day == today {
            acc.today += sale.total_amount;
        }
        if day >= week_start {
            acc.week += sale.total_amount;
        }
        if day >= month_start {
            acc.month += sale.total_amount;
        }
        acc
    })
}

/// Midnight UTC at the start of the 30-day window; older sales never count.
pub fn month_window_start(today: NaiveDate) -> DateTime<Utc> {
    (today - Duration::days(30)).and_time(NaiveTime::MIN).and_utc()
}

#[derive(Clone)]
pub struct AnalyticsService {
    orders: OrderRepository,
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            orders: OrderRepository::new(db),
        }
    }

    #[instrument(skip(self))]
    pub async fn dealer_sales(&self, dealer_id: i32) -> Result<SalesSummary, ServiceError> {
        let today = Utc::now().date_naive();
        let sales = self
            .orders
            .delivered_sales_for_dealer(dealer_id, month_window_start(today))
            .await
            .map_err(db_error("Failed to load dealer sales"))?;

        let summary = tally_sales(&sales, today);
        info!(orders = sales.len(), month = %summary.month, "sales analytics computed");
        Ok(summary)
    }
}
