use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceSource, Status};
use crate::service::geofence::GeoPoint;
use crate::service::marking::{AppMarkingService, MarkContext, MarkError};
use crate::service::policy::current_period;
use crate::service::storage::{SqlStorage, Storage};

/// Decoded QR payload as produced by the student QR cards.
#[derive(Deserialize, ToSchema)]
pub struct QrScanRequest {
    #[schema(example = "STU-1001")]
    pub student_id: String,
    /// Epoch seconds embedded at QR generation time; informational only.
    #[schema(example = "1767600000", nullable = true)]
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "attendance")]
    pub payload_type: String,
    #[schema(example = "tab-frontdesk", nullable = true)]
    pub device_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ManualMarkRequest {
    #[schema(example = "STU-1001")]
    pub student_id: String,
    #[schema(example = "Late")]
    pub status: Status,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = "STU-1001")]
    pub student_id: String,
    #[schema(example = 23.8103, nullable = true)]
    pub latitude: Option<f64>,
    #[schema(example = 90.4125, nullable = true)]
    pub longitude: Option<f64>,
    #[schema(example = "phone-0412", nullable = true)]
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceQuery {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    /// Present | Absent | Late
    pub status: Option<String>,
}

/// Shared rejection mapping for all three marking channels.
fn marked_response(
    result: Result<AttendanceRecord, MarkError>,
) -> actix_web::Result<HttpResponse> {
    match result {
        Ok(record) => {
            let period = current_period(record.timestamp);
            Ok(HttpResponse::Ok().json(json!({
                "message": "Attendance marked",
                "period": period,
                "record": record
            })))
        }
        Err(e @ MarkError::UnknownStudent(_)) => Ok(HttpResponse::NotFound().json(json!({
            "message": e.to_string()
        }))),
        Err(e @ MarkError::DuplicateAttendance { .. }) => {
            Ok(HttpResponse::BadRequest().json(json!({
                "message": e.to_string()
            })))
        }
        Err(e @ (MarkError::OutsideAttendanceWindow | MarkError::OutsideGeofence)) => {
            Ok(HttpResponse::Forbidden().json(json!({
                "message": e.to_string()
            })))
        }
        Err(MarkError::Storage(e)) => {
            tracing::error!(error = %e, "Attendance write failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// QR scan endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/scan",
    request_body = QrScanRequest,
    responses(
        (status = 200, description = "Attendance marked", body = Object, example = json!({
            "message": "Attendance marked"
        })),
        (status = 400, description = "Not an attendance QR code, or already marked today"),
        (status = 403, description = "Outside the attendance window"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn scan(
    service: web::Data<AppMarkingService>,
    payload: web::Json<QrScanRequest>,
) -> actix_web::Result<impl Responder> {
    if payload.payload_type != "attendance" {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Not an attendance QR code"
        })));
    }

    let ctx = MarkContext {
        device_id: payload.device_id.clone(),
        ..MarkContext::default()
    };
    let result = service
        .mark_attendance(
            &payload.student_id,
            AttendanceSource::QRScan,
            Status::Present,
            ctx,
        )
        .await;

    marked_response(result)
}

/// Manual entry endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/mark",
    request_body = ManualMarkRequest,
    responses(
        (status = 200, description = "Attendance marked", body = Object, example = json!({
            "message": "Attendance marked"
        })),
        (status = 400, description = "Already marked today"),
        (status = 403, description = "Outside the attendance window"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn mark(
    service: web::Data<AppMarkingService>,
    payload: web::Json<ManualMarkRequest>,
) -> actix_web::Result<impl Responder> {
    let result = service
        .mark_attendance(
            &payload.student_id,
            AttendanceSource::Manual,
            payload.status,
            MarkContext::default(),
        )
        .await;

    marked_response(result)
}

/// Geofenced check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in", body = Object, example = json!({
            "message": "Attendance marked"
        })),
        (status = 400, description = "Already marked today"),
        (status = 403, description = "Outside the school premises or attendance window"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    service: web::Data<AppMarkingService>,
    payload: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    // a half-resolved fix is treated the same as no fix at all
    let location = match (payload.latitude, payload.longitude) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };

    let ctx = MarkContext {
        location,
        device_id: payload.device_id.clone(),
        ..MarkContext::default()
    };
    let result = service
        .mark_attendance(
            &payload.student_id,
            AttendanceSource::Geofenced,
            Status::Present,
            ctx,
        )
        .await;

    marked_response(result)
}

/// Day listing endpoint
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(
        ("date", Query, description = "Day to list (YYYY-MM-DD), defaults to today"),
        ("status", Query, description = "Filter by status: Present | Absent | Late")
    ),
    responses(
        (status = 200, description = "Attendance records for the day"),
        (status = 400, description = "Unknown status filter"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_for_day(
    storage: web::Data<SqlStorage>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    let status_filter = match query.status.as_deref() {
        Some(raw) => match Status::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Invalid status. Allowed: Present, Absent, Late"
                })));
            }
        },
        None => None,
    };

    let mut records = storage.list_attendance(date).await.map_err(|e| {
        tracing::error!(error = %e, %date, "Failed to list attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Some(status) = status_filter {
        records.retain(|r| r.status == status.as_ref());
    }

    Ok(HttpResponse::Ok().json(json!({
        "date": date,
        "count": records.len(),
        "data": records
    })))
}
