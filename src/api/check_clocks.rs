//! Check-clock (attendance) endpoints.

use tracing::info;

use super::{ApiClient, ReviewNote};
use crate::error::{AppError, Result};
use crate::models::{CheckClock, CreateCheckClock, Page};
use crate::table::{PageInfo, TableQuery};

/// Page size used when walking every page.
const LIST_ALL_PAGE_SIZE: usize = 100;

pub async fn list(api: &ApiClient, query: &TableQuery) -> Result<Page<CheckClock>> {
    api.get_query("check-clocks", &query.to_query_pairs()).await
}

/// Every entry matching the query's search, filters and sort, walking all pages.
pub async fn list_all(api: &ApiClient, query: &TableQuery) -> Result<Vec<CheckClock>> {
    let mut query = query.clone();
    query.page = 0;
    query.page_size = LIST_ALL_PAGE_SIZE;
    let mut all = Vec::new();

    loop {
        let page = list(api, &query).await?;
        let info = PageInfo::from_meta(&page.meta);
        let fetched = page.data.len();
        all.extend(page.data);

        if fetched == 0 || !info.has_next() {
            break;
        }
        query.page = info.page + 1;
    }

    info!("Fetched {} check-clock entries", all.len());
    Ok(all)
}

/// Record a manual check-clock entry.
pub async fn create(api: &ApiClient, data: &CreateCheckClock) -> Result<CheckClock> {
    data.validate()?;
    api.post_data("check-clocks", data).await
}

pub async fn approve(api: &ApiClient, id: i64) -> Result<CheckClock> {
    let record: CheckClock = api
        .post_data(&format!("check-clocks/{id}/approve"), &ReviewNote::new(None))
        .await?;
    info!("Approved check-clock {} for {}", id, record.employee_name);
    Ok(record)
}

/// Reject an entry; a reason is required.
pub async fn reject(api: &ApiClient, id: i64, note: &str) -> Result<CheckClock> {
    if note.trim().is_empty() {
        return Err(AppError::validation("A reason is required to reject an entry"));
    }
    let record: CheckClock = api
        .post_data(&format!("check-clocks/{id}/reject"), &ReviewNote::new(Some(note)))
        .await?;
    info!("Rejected check-clock {} for {}", id, record.employee_name);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{self, Reply};
    use crate::models::ApprovalStatus;

    const RECORD: &str = r#"{"data":{"id":5,"employee_id":1,"employee_name":"Siti","date":"2026-10-19",
        "check_type":"attendance","clock_in":"08:05:00","clock_out":"17:00:00","approval":"rejected",
        "note":"Outside office"}}"#;

    #[tokio::test]
    async fn test_reject_sends_note() {
        let server = mock::serve(vec![Reply::json(200, RECORD)]).await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let record = reject(&api, 5, "  Outside office ").await.unwrap();
        assert_eq!(record.approval, ApprovalStatus::Rejected);

        let request = &server.requests().await[0];
        assert!(request.starts_with("POST /api/v1/check-clocks/5/reject "));
        assert!(request.ends_with(r#"{"note":"Outside office"}"#));
    }

    fn entry_json(id: i64) -> String {
        format!(
            r#"{{"id":{id},"employee_id":1,"employee_name":"Siti","date":"2026-10-19","check_type":"attendance",
            "approval":"pending"}}"#
        )
    }

    #[tokio::test]
    async fn test_list_all_walks_pages_with_filters() {
        let first = format!(
            r#"{{"data":[{},{}],"meta":{{"page":1,"per_page":100,"total":103}}}}"#,
            entry_json(1),
            entry_json(2)
        );
        let second = format!(r#"{{"data":[{}],"meta":{{"page":2,"per_page":100,"total":103}}}}"#, entry_json(3));
        let server = mock::serve(vec![Reply::json(200, &first), Reply::json(200, &second)]).await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let mut query = TableQuery::new(10);
        query.set_filter("approval", Some("pending"));
        query.page = 4;

        let all = list_all(&api, &query).await.unwrap();
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let requests = server.requests().await;
        assert!(requests[0].starts_with("GET /api/v1/check-clocks?page=1&per_page=100&approval=pending "));
        assert!(requests[1].starts_with("GET /api/v1/check-clocks?page=2&per_page=100&approval=pending "));
    }

    #[tokio::test]
    async fn test_reject_requires_note() {
        let api = ApiClient::new(&crate::config::ApiConfig::default()).unwrap();
        let err = reject(&api, 5, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
