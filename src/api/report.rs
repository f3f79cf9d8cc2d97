use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::report::{self, GroupStats};
use crate::service::storage::SqlStorage;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportQuery {
    /// Day to report on (YYYY-MM-DD), defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryQuery {
    /// Number of most recent records to include, defaults to 30.
    pub limit: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct DailyReportResponse {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub groups: Vec<GroupStats>,
}

fn storage_error(e: sqlx::Error) -> actix_web::Error {
    tracing::error!(error = %e, "Report query failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// Daily summary report
#[utoipa::path(
    get,
    path = "/api/v1/reports/daily",
    params(
        ("date", Query, description = "Day to report on (YYYY-MM-DD), defaults to today")
    ),
    responses(
        (status = 200, description = "Per class/section attendance summary", body = DailyReportResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn daily(
    storage: web::Data<SqlStorage>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let groups = report::daily_report(storage.get_ref(), date)
        .await
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(DailyReportResponse { date, groups }))
}

/// Student attendance history
#[utoipa::path(
    get,
    path = "/api/v1/reports/students/{student_id}",
    params(
        ("student_id", Path, description = "Student ID"),
        ("limit", Query, description = "Most recent records to include, defaults to 30")
    ),
    responses(
        (status = 200, description = "Recent records plus attendance rate over the returned window"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn student_history(
    storage: web::Data<SqlStorage>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let student_id = path.into_inner();
    let limit = query.limit.unwrap_or(30).clamp(1, 365);

    let history = report::student_history(storage.get_ref(), &student_id, limit)
        .await
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "student_id": student_id,
        "records": history.records,
        "attendance_rate": history.attendance_rate
    })))
}

/// System statistics
#[utoipa::path(
    get,
    path = "/api/v1/reports/stats",
    responses(
        (status = 200, description = "Whole-system counters", body = crate::service::report::SystemStats),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn stats(storage: web::Data<SqlStorage>) -> actix_web::Result<impl Responder> {
    let stats = report::system_stats(storage.get_ref(), Local::now().date_naive())
        .await
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(stats))
}
