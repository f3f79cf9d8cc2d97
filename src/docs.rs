use crate::api::attendance::{AttendanceQuery, CheckInRequest, ManualMarkRequest, QrScanRequest};
use crate::api::class_group::CreateClassGroup;
use crate::api::report::{DailyReportResponse, HistoryQuery, ReportQuery};
use crate::api::student::{CreateStudent, StudentListResponse, StudentQuery};
use crate::model::attendance::{AttendanceRecord, AttendanceSource, Status};
use crate::model::class_group::ClassGroup;
use crate::model::student::Student;
use crate::service::report::{GroupStats, SystemStats};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Attendance Management API",
        version = "1.0.0",
        description = r#"
## School Attendance Management Service (SAMS)

This API powers a single-school attendance system designed to run on a
phone-class device at the front desk.

### Key Features
- **Student Registry**
  - Register students, list and search, update contact/photo
- **Attendance Capture**
  - QR-card scans, manual entry, geofenced check-ins
  - One record per student per day, enforced
  - Configurable attendance window (default 08:00-15:00)
- **Reports**
  - Daily per class/section summaries
  - Per-student history with attendance rate
  - System statistics

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::student::create_student,
        crate::api::student::list_students,
        crate::api::student::get_student,
        crate::api::student::update_student,

        crate::api::attendance::scan,
        crate::api::attendance::mark,
        crate::api::attendance::check_in,
        crate::api::attendance::list_for_day,

        crate::api::report::daily,
        crate::api::report::student_history,
        crate::api::report::stats,

        crate::api::class_group::create_class,
        crate::api::class_group::list_classes
    ),
    components(
        schemas(
            Student,
            CreateStudent,
            StudentQuery,
            StudentListResponse,
            AttendanceRecord,
            AttendanceSource,
            Status,
            QrScanRequest,
            ManualMarkRequest,
            CheckInRequest,
            AttendanceQuery,
            ReportQuery,
            HistoryQuery,
            DailyReportResponse,
            GroupStats,
            SystemStats,
            ClassGroup,
            CreateClassGroup
        )
    ),
    tags(
        (name = "Student", description = "Student registry APIs"),
        (name = "Attendance", description = "Attendance capture APIs"),
        (name = "Report", description = "Reporting APIs"),
        (name = "Class", description = "Class reference data APIs"),
    )
)]
pub struct ApiDoc;
