//! Leave-request review endpoints.

use tracing::info;

use super::{ApiClient, ReviewNote};
use crate::error::{AppError, Result};
use crate::models::{LeaveRequest, Page};
use crate::table::TableQuery;

/// Leave requests; filter on `status` to get one tab.
pub async fn list(api: &ApiClient, query: &TableQuery) -> Result<Page<LeaveRequest>> {
    api.get_query("leave-requests", &query.to_query_pairs()).await
}

pub async fn approve(api: &ApiClient, id: i64, note: Option<&str>) -> Result<LeaveRequest> {
    let request: LeaveRequest = api
        .post_data(&format!("leave-requests/{id}/approve"), &ReviewNote::new(note))
        .await?;
    info!("Approved leave request {} for {}", id, request.employee_name);
    Ok(request)
}

/// Reject a request; a note explaining why is required.
pub async fn reject(api: &ApiClient, id: i64, note: &str) -> Result<LeaveRequest> {
    if note.trim().is_empty() {
        return Err(AppError::validation("A note is required to reject a leave request"));
    }
    let request: LeaveRequest = api
        .post_data(&format!("leave-requests/{id}/reject"), &ReviewNote::new(Some(note)))
        .await?;
    info!("Rejected leave request {} for {}", id, request.employee_name);
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{self, Reply};
    use crate::models::ApprovalStatus;

    const APPROVED: &str = r#"{"data":{"id":3,"employee_id":1,"employee_name":"Budi","leave_type":"annual",
        "start_date":"2026-10-20","end_date":"2026-10-22","status":"approved",
        "created_at":"2026-10-01T02:00:00Z"}}"#;

    #[tokio::test]
    async fn test_approve_without_note_sends_empty_object() {
        let server = mock::serve(vec![Reply::json(200, APPROVED)]).await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let request = approve(&api, 3, Some("  ")).await.unwrap();
        assert_eq!(request.status, ApprovalStatus::Approved);
        assert_eq!(request.days(), 3);

        let raw = &server.requests().await[0];
        assert!(raw.starts_with("POST /api/v1/leave-requests/3/approve "));
        assert!(raw.ends_with("{}"));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let server = mock::serve(vec![Reply::json(
            200,
            r#"{"data":[],"meta":{"page":1,"per_page":10,"total":0}}"#,
        )])
        .await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let mut query = TableQuery::default();
        query.set_filter("status", Some(ApprovalStatus::Pending.key()));
        let page = list(&api, &query).await.unwrap();

        assert!(page.data.is_empty());
        assert!(server.requests().await[0].contains("status=pending"));
    }
}
