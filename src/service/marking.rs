use chrono::{Local, NaiveDate, NaiveDateTime};
use derive_more::Display;
use tracing::{info, warn};

use crate::model::attendance::{AttendanceRecord, AttendanceSource, NewAttendance, Status};
use crate::service::geofence::{Geofence, GeoPoint};
use crate::service::notify::{GuardianLogNotifier, Notifier};
use crate::service::policy::AttendanceWindow;
use crate::service::storage::{AppendError, SqlStorage, Storage};

/// Expected, user-facing rejection outcomes plus the one fatal case.
#[derive(Debug, Display)]
pub enum MarkError {
    #[display(fmt = "Student {} not found", _0)]
    UnknownStudent(String),

    #[display(fmt = "Attendance already marked for {} on {}", student_id, date)]
    DuplicateAttendance {
        student_id: String,
        date: NaiveDate,
    },

    #[display(fmt = "Current time is outside the attendance window")]
    OutsideAttendanceWindow,

    #[display(fmt = "Device location is outside the school premises")]
    OutsideGeofence,

    #[display(fmt = "Storage error: {}", _0)]
    Storage(sqlx::Error),
}

impl std::error::Error for MarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MarkError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for MarkError {
    fn from(e: sqlx::Error) -> Self {
        MarkError::Storage(e)
    }
}

/// Per-call context: device location, device identifier, and an optional
/// wall-clock override (tests, delayed sync).
#[derive(Debug, Default, Clone)]
pub struct MarkContext {
    pub location: Option<GeoPoint>,
    pub device_id: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

/// Orchestrates one attendance marking: existence check, duplicate check,
/// policy gates, ledger append, guardian notification.
pub struct MarkingService<S, N> {
    storage: S,
    notifier: N,
    window: Option<AttendanceWindow>,
    geofence: Option<Geofence>,
}

/// Concrete wiring used by the HTTP layer.
pub type AppMarkingService = MarkingService<SqlStorage, GuardianLogNotifier>;

impl<S: Storage, N: Notifier> MarkingService<S, N> {
    pub fn new(storage: S, notifier: N) -> Self {
        Self {
            storage,
            notifier,
            window: None,
            geofence: None,
        }
    }

    pub fn with_window(mut self, window: AttendanceWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_geofence(mut self, geofence: Geofence) -> Self {
        self.geofence = Some(geofence);
        self
    }

    /// Marks attendance for one student. Exactly one ledger append on
    /// success; no state change on any rejection.
    pub async fn mark_attendance(
        &self,
        student_id: &str,
        source: AttendanceSource,
        status: Status,
        ctx: MarkContext,
    ) -> Result<AttendanceRecord, MarkError> {
        let now = ctx
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local());
        let today = now.date();

        let student = self
            .storage
            .find_student(student_id)
            .await?
            .ok_or_else(|| MarkError::UnknownStudent(student_id.to_string()))?;

        if self.storage.has_attendance_on(student_id, today).await? {
            return Err(MarkError::DuplicateAttendance {
                student_id: student_id.to_string(),
                date: today,
            });
        }

        if let Some(window) = &self.window {
            if !window.contains(now) {
                return Err(MarkError::OutsideAttendanceWindow);
            }
        }

        if let Some(fence) = &self.geofence {
            if source.requires_geofence() && !fence.contains(ctx.location) {
                return Err(MarkError::OutsideGeofence);
            }
        }

        let record = self
            .storage
            .append_attendance(&NewAttendance {
                student_id: student.student_id.clone(),
                date: today,
                timestamp: now,
                status,
                source,
                location: ctx.location.map(|p| p.as_location()),
                device_id: ctx.device_id,
            })
            .await
            .map_err(|e| match e {
                // lost a race with a concurrent marker for the same day
                AppendError::Duplicate => MarkError::DuplicateAttendance {
                    student_id: student_id.to_string(),
                    date: today,
                },
                AppendError::Storage(e) => MarkError::Storage(e),
            })?;

        info!(
            student_id = %record.student_id,
            date = %record.date,
            status = %record.status,
            source = %record.source,
            "Attendance marked"
        );

        if let Err(e) = self.notifier.notify(&student, status, now) {
            warn!(error = %e, student_id = %student.student_id, "Guardian notification failed");
        }

        Ok(record)
    }
}
