//! Employee endpoints.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiClient;
use crate::error::Result;
use crate::models::{CreateEmployee, Employee, Page, UpdateEmployee};
use crate::table::{PageInfo, TableQuery};

/// Page size used when walking every page.
const LIST_ALL_PAGE_SIZE: usize = 100;

/// Failure of one entry in a bulk create, by position in the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub index: usize,
    pub message: String,
}

/// Outcome of a bulk create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    pub created: usize,
    #[serde(default)]
    pub failed: Vec<BulkFailure>,
}

#[derive(Serialize)]
struct BulkRequest<'a> {
    employees: &'a [CreateEmployee],
}

/// One page of employees matching the table query.
pub async fn list(api: &ApiClient, query: &TableQuery) -> Result<Page<Employee>> {
    api.get_query("employees", &query.to_query_pairs()).await
}

/// Every employee, walking all pages.
pub async fn list_all(api: &ApiClient) -> Result<Vec<Employee>> {
    let mut query = TableQuery::new(LIST_ALL_PAGE_SIZE);
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

    Ok(all)
}

pub async fn get(api: &ApiClient, id: i64) -> Result<Employee> {
    api.get_data(&format!("employees/{id}")).await
}

pub async fn create(api: &ApiClient, data: &CreateEmployee) -> Result<Employee> {
    let employee: Employee = api.post_data("employees", data).await?;
    info!("Created employee {} ({})", employee.employee_code, employee.full_name());
    Ok(employee)
}

pub async fn update(api: &ApiClient, id: i64, data: &UpdateEmployee) -> Result<Employee> {
    api.patch_data(&format!("employees/{id}"), data).await
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<()> {
    api.delete(&format!("employees/{id}")).await?;
    info!("Deleted employee {}", id);
    Ok(())
}

/// Create many employees in one request.
pub async fn bulk_create(api: &ApiClient, employees: &[CreateEmployee]) -> Result<BulkResult> {
    let result: BulkResult = api.post_data("employees/bulk", &BulkRequest { employees }).await?;
    info!(
        "Bulk import: {} created, {} failed",
        result.created,
        result.failed.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{self, Reply};

    fn employee_json(id: i64) -> String {
        format!(
            r#"{{"id":{id},"employee_code":"EMP-{id:03}","first_name":"Staff{id}","email":"s{id}@example.com",
            "nik":"32012345678900{id:02}","gender":"female","position":"Staff","join_date":"2024-01-01"}}"#
        )
    }

    #[tokio::test]
    async fn test_list_sends_table_query() {
        let body = format!(r#"{{"data":[{}],"meta":{{"page":2,"per_page":20,"total":21}}}}"#, employee_json(21));
        let server = mock::serve(vec![Reply::json(200, &body)]).await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let mut query = TableQuery::new(20);
        query.set_search("staff");
        query.set_filter("status", Some("active"));
        query.page = 1;

        let page = list(&api, &query).await.unwrap();
        assert_eq!(page.data[0].employee_code, "EMP-021");
        assert_eq!(page.meta.total, 21);

        let request = &server.requests().await[0];
        assert!(request.starts_with("GET /api/v1/employees?page=2&per_page=20&search=staff&status=active "));
    }

    #[tokio::test]
    async fn test_list_all_walks_pages() {
        let first = format!(
            r#"{{"data":[{},{}],"meta":{{"page":1,"per_page":2,"total":3}}}}"#,
            employee_json(1),
            employee_json(2)
        );
        let second = format!(r#"{{"data":[{}],"meta":{{"page":2,"per_page":2,"total":3}}}}"#, employee_json(3));
        let server = mock::serve(vec![Reply::json(200, &first), Reply::json(200, &second)]).await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let all = list_all(&api).await.unwrap();
        assert_eq!(all.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(server.requests().await[1].contains("page=2"));
    }

    #[tokio::test]
    async fn test_bulk_create_posts_employees() {
        let server = mock::serve(vec![Reply::json(
            201,
            r#"{"data":{"created":1,"failed":[{"index":1,"message":"email taken"}]}}"#,
        )])
        .await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let result = bulk_create(&api, &[]).await.unwrap();
        assert_eq!(result.created, 1);
        assert_eq!(result.failed[0].index, 1);

        let request = &server.requests().await[0];
        assert!(request.starts_with("POST /api/v1/employees/bulk "));
        assert!(request.ends_with(r#"{"employees":[]}"#));
    }

    #[tokio::test]
    async fn test_get_missing_employee() {
        let server = mock::serve(vec![Reply::json(404, r#"{"message":"Employee not found"}"#)]).await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let err = get(&api, 99).await.unwrap_err();
        assert!(matches!(err, crate::AppError::NotFound(_)));
    }
}
