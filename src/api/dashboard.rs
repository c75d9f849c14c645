//! Dashboard counters.

use super::ApiClient;
use crate::error::Result;
use crate::models::DashboardSummary;

pub async fn summary(api: &ApiClient) -> Result<DashboardSummary> {
    api.get_data("dashboard/summary").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{self, Reply};

    #[tokio::test]
    async fn test_summary_tolerates_missing_counters() {
        let server = mock::serve(vec![Reply::json(
            200,
            r#"{"data":{"total_employees":40,"active_employees":38,"present_today":30}}"#,
        )])
        .await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let summary = summary(&api).await.unwrap();
        assert_eq!(summary.active_employees, 38);
        assert_eq!(summary.late_today, 0);
        assert!(server.requests().await[0].starts_with("GET /api/v1/dashboard/summary "));
    }
}
