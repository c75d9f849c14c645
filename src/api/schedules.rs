//! Work-schedule template and assignment endpoints.

use tracing::info;

use super::ApiClient;
use crate::error::Result;
use crate::models::{AssignSchedule, CreateWorkSchedule, ScheduleAssignment, WorkSchedule};
use crate::schedule::validate_schedule;

pub async fn list(api: &ApiClient) -> Result<Vec<WorkSchedule>> {
    api.get_data("work-schedules").await
}

pub async fn get(api: &ApiClient, id: i64) -> Result<WorkSchedule> {
    api.get_data(&format!("work-schedules/{id}")).await
}

pub async fn create(api: &ApiClient, data: &CreateWorkSchedule) -> Result<WorkSchedule> {
    validate_schedule(data)?;
    let schedule: WorkSchedule = api.post_data("work-schedules", data).await?;
    info!("Created work schedule '{}'", schedule.name);
    Ok(schedule)
}

pub async fn update(api: &ApiClient, id: i64, data: &CreateWorkSchedule) -> Result<WorkSchedule> {
    validate_schedule(data)?;
    api.put_data(&format!("work-schedules/{id}"), data).await
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<()> {
    api.delete(&format!("work-schedules/{id}")).await?;
    info!("Deleted work schedule {}", id);
    Ok(())
}

/// Assignments of every schedule, including closed ones.
pub async fn list_assignments(api: &ApiClient) -> Result<Vec<ScheduleAssignment>> {
    api.get_data("work-schedules/assignments").await
}

/// Assign a schedule to employees. The backend closes each employee's
/// previous open assignment the day before `effective_from`.
pub async fn assign(api: &ApiClient, data: &AssignSchedule) -> Result<Vec<ScheduleAssignment>> {
    let created: Vec<ScheduleAssignment> = api
        .post_data(&format!("work-schedules/{}/assign", data.schedule_id), data)
        .await?;
    info!(
        "Assigned schedule {} to {} employees from {}",
        data.schedule_id,
        created.len(),
        data.effective_from
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{self, Reply};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_assign_posts_to_schedule() {
        let server = mock::serve(vec![Reply::json(
            201,
            r#"{"data":[{"id":9,"employee_id":4,"schedule_id":2,"effective_from":"2026-11-01"}]}"#,
        )])
        .await;
        let api = ApiClient::new(&server.config("t")).unwrap();

        let data = AssignSchedule {
            schedule_id: 2,
            employee_ids: vec![4],
            effective_from: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        };
        let created = assign(&api, &data).await.unwrap();
        assert_eq!(created[0].effective_until, None);
        assert!(server.requests().await[0].starts_with("POST /api/v1/work-schedules/2/assign "));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_schedule_locally() {
        let api = ApiClient::new(&crate::config::ApiConfig::default()).unwrap();
        let err = create(&api, &CreateWorkSchedule::default()).await.unwrap_err();
        assert!(matches!(err, crate::AppError::Validation(_)));
    }
}
