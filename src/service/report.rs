use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, Status};
use crate::service::storage::{Storage, StudentFilter};

/// Per (class, section) attendance summary for one day.
///
/// Students with no record for the day count toward neither present nor
/// absent; they only raise `total_students`. Late rows are likewise outside
/// both buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GroupStats {
    #[schema(example = "10")]
    pub class_name: String,
    #[schema(example = "A")]
    pub section: String,
    #[schema(example = 32)]
    pub total_students: i64,
    #[schema(example = 29)]
    pub present_count: i64,
    #[schema(example = 2)]
    pub absent_count: i64,
}

/// One student's recent ledger window plus the present-fraction over
/// exactly that window.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentHistory {
    pub records: Vec<AttendanceRecord>,
    #[schema(example = 0.93)]
    pub attendance_rate: f64,
}

/// Whole-system counters shown on the operator dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStats {
    #[schema(example = 420)]
    pub total_students: i64,
    #[schema(example = 12)]
    pub total_classes: i64,
    #[schema(example = 396)]
    pub todays_records: i64,
}

/// Left-joins the registered students against one day's ledger rows and
/// groups by (class, section). Output order follows the group key.
pub async fn daily_report<S: Storage>(
    storage: &S,
    day: NaiveDate,
) -> Result<Vec<GroupStats>, sqlx::Error> {
    let students = storage.list_students(&StudentFilter::default()).await?;
    let records = storage.list_attendance(day).await?;

    let status_by_student: HashMap<&str, &str> = records
        .iter()
        .map(|r| (r.student_id.as_str(), r.status.as_str()))
        .collect();

    let mut groups: BTreeMap<(String, String), GroupStats> = BTreeMap::new();
    for student in &students {
        let key = (student.class_name.clone(), student.section.clone());
        let entry = groups.entry(key).or_insert_with(|| GroupStats {
            class_name: student.class_name.clone(),
            section: student.section.clone(),
            total_students: 0,
            present_count: 0,
            absent_count: 0,
        });
        entry.total_students += 1;
        match status_by_student.get(student.student_id.as_str()) {
            Some(status) if *status == Status::Present.as_ref() => entry.present_count += 1,
            Some(status) if *status == Status::Absent.as_ref() => entry.absent_count += 1,
            _ => {}
        }
    }

    Ok(groups.into_values().collect())
}

/// Most recent `limit` records for one student, newest first. The rate is a
/// fraction of the *returned* window, not the student's entire history.
pub async fn student_history<S: Storage>(
    storage: &S,
    student_id: &str,
    limit: u32,
) -> Result<StudentHistory, sqlx::Error> {
    let records = storage.student_attendance(student_id, limit).await?;
    let present = records
        .iter()
        .filter(|r| r.status == Status::Present.as_ref())
        .count();
    let attendance_rate = if records.is_empty() {
        0.0
    } else {
        present as f64 / records.len() as f64
    };
    Ok(StudentHistory {
        records,
        attendance_rate,
    })
}

pub async fn system_stats<S: Storage>(
    storage: &S,
    today: NaiveDate,
) -> Result<SystemStats, sqlx::Error> {
    Ok(SystemStats {
        total_students: storage.count_students().await?,
        total_classes: storage.count_classes().await?,
        todays_records: storage.count_attendance_on(today).await?,
    })
}
