use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Attendance status as stored in the ledger.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
pub enum Status {
    Present,
    Absent,
    Late,
}

/// Channel through which an attendance event was captured.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
pub enum AttendanceSource {
    QRScan,
    Manual,
    Geofenced,
}

impl AttendanceSource {
    /// Only geofenced check-ins are gated on the device location.
    pub fn requires_geofence(&self) -> bool {
        matches!(self, AttendanceSource::Geofenced)
    }
}

/// One row of the append-only attendance ledger.
///
/// Status and source are kept as text, same as the ledger column; the typed
/// enums above are the write-side vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "student_id": "STU-1001",
        "date": "2026-01-05",
        "timestamp": "2026-01-05T08:42:10",
        "status": "Present",
        "source": "QRScan",
        "location": "23.8103,90.4125",
        "device_id": "tab-frontdesk"
    })
)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "STU-1001")]
    pub student_id: String,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-01-05T08:42:10", value_type = String, format = "date-time")]
    pub timestamp: NaiveDateTime,

    #[schema(example = "Present")]
    pub status: String,

    #[schema(example = "QRScan")]
    pub source: String,

    #[schema(example = "23.8103,90.4125", nullable = true)]
    pub location: Option<String>,

    #[schema(example = "tab-frontdesk", nullable = true)]
    pub device_id: Option<String>,
}

/// Ledger append payload, before the row id exists.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub student_id: String,
    pub date: NaiveDate,
    pub timestamp: NaiveDateTime,
    pub status: Status,
    pub source: AttendanceSource,
    pub location: Option<String>,
    pub device_id: Option<String>,
}
