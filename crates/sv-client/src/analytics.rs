//! Analytics endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use sv_core::{CoreError, DailyActivity, DashboardData, Granularity};

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /analytics/dashboard`: the dashboard payload.
    pub async fn dashboard(&self) -> ClientResult<DashboardData> {
        self.http
            .get_json("/analytics/dashboard", &Self::no_params())
            .await
    }

    /// `GET /analytics/trends`: daily activity within a date range.
    pub async fn trends(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> ClientResult<Vec<DailyActivity>> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct RawTrends {
            trends: Option<Vec<DailyActivity>>,
            items: Option<Vec<DailyActivity>>,
        }

        let mut params = Self::no_params();
        params.insert("start_date".into(), start.format("%Y-%m-%d").to_string());
        params.insert("end_date".into(), end.format("%Y-%m-%d").to_string());
        params.insert("granularity".into(), granularity.as_str().to_string());

        let value = self.http.get_value("/analytics/trends", &params).await?;
        let raw: RawTrends = serde_json::from_value(value)
            .map_err(|e| CoreError::malformed(format!("trend data: {e}")))?;
        Ok(raw.trends.or(raw.items).unwrap_or_default())
    }
}
