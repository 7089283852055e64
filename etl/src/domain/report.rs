//! Revenue report over the analytical store

use crate::data::error::DataError;
use crate::data::traits::AnalyticalStore;
use crate::data::types::{DailyRollup, GenderRevenue};

/// All-time revenue with its gender split and the daily rollups
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueReport {
    pub total: f64,
    pub by_gender: Vec<GenderRevenue>,
    pub daily: Vec<DailyRollup>,
}

pub async fn revenue_report(store: &dyn AnalyticalStore) -> Result<RevenueReport, DataError> {
    let total = store.revenue_total().await?;
    let by_gender = store.revenue_by_gender().await?;
    let daily = store.daily_rollups().await?;

    Ok(RevenueReport {
        total,
        by_gender,
        daily,
    })
}

/// Revenue of one gender value; the empty string selects rows without gender
pub async fn gender_revenue(
    store: &dyn AnalyticalStore,
    gender: &str,
) -> Result<GenderRevenue, DataError> {
    let revenue = store.revenue_for_gender(gender).await?;
    Ok(GenderRevenue {
        gender: gender.to_string(),
        revenue,
    })
}
