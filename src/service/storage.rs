use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::model::attendance::{AttendanceRecord, NewAttendance};
use crate::model::student::Student;

/// Append failure, separated so a lost duplicate race is distinguishable
/// from the storage being unavailable.
#[derive(Debug)]
pub enum AppendError {
    Duplicate,
    Storage(sqlx::Error),
}

#[derive(Debug, Default, Clone)]
pub struct StudentFilter {
    pub class_name: Option<String>,
    pub section: Option<String>,
}

/// Ledger and reference-data access used by the attendance core.
///
/// The production implementation is [`SqlStorage`]; tests substitute an
/// in-memory stub.
pub trait Storage {
    async fn find_student(&self, student_id: &str) -> Result<Option<Student>, sqlx::Error>;

    async fn has_attendance_on(
        &self,
        student_id: &str,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error>;

    /// Appends one ledger row. The UNIQUE (student_id, date) constraint is
    /// the final arbiter for concurrent markers.
    async fn append_attendance(
        &self,
        record: &NewAttendance,
    ) -> Result<AttendanceRecord, AppendError>;

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, sqlx::Error>;

    async fn list_attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, sqlx::Error>;

    /// Records for one student, most recent date first, truncated to `limit`.
    async fn student_attendance(
        &self,
        student_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error>;

    async fn count_students(&self) -> Result<i64, sqlx::Error>;

    async fn count_classes(&self) -> Result<i64, sqlx::Error>;

    async fn count_attendance_on(&self, date: NaiveDate) -> Result<i64, sqlx::Error>;
}

#[derive(Clone)]
pub struct SqlStorage {
    pool: SqlitePool,
}

impl SqlStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl Storage for SqlStorage {
    async fn find_student(&self, student_id: &str) -> Result<Option<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, name, class_name, section, guardian_email, photo_path, created_at
            FROM students
            WHERE student_id = ?
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn has_attendance_on(
        &self,
        student_id: &str,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attendance WHERE student_id = ? AND date = ? LIMIT 1)",
        )
        .bind(student_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await
    }

    async fn append_attendance(
        &self,
        record: &NewAttendance,
    ) -> Result<AttendanceRecord, AppendError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO attendance (student_id, date, timestamp, status, source, location, device_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&record.student_id)
        .bind(record.date)
        .bind(record.timestamp)
        .bind(record.status.as_ref())
        .bind(record.source.as_ref())
        .bind(&record.location)
        .bind(&record.device_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppendError::Duplicate,
            _ => AppendError::Storage(e),
        })?;

        Ok(AttendanceRecord {
            id,
            student_id: record.student_id.clone(),
            date: record.date,
            timestamp: record.timestamp,
            status: record.status.to_string(),
            source: record.source.to_string(),
            location: record.location.clone(),
            device_id: record.device_id.clone(),
        })
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, sqlx::Error> {
        let mut sql = String::from(
            r#"
            SELECT student_id, name, class_name, section, guardian_email, photo_path, created_at
            FROM students
            WHERE 1=1
            "#,
        );
        if filter.class_name.is_some() {
            sql.push_str(" AND class_name = ?");
        }
        if filter.section.is_some() {
            sql.push_str(" AND section = ?");
        }
        sql.push_str(" ORDER BY class_name, section, name");

        let mut query = sqlx::query_as::<_, Student>(&sql);
        if let Some(class_name) = &filter.class_name {
            query = query.bind(class_name);
        }
        if let Some(section) = &filter.section {
            query = query.bind(section);
        }

        query.fetch_all(&self.pool).await
    }

    async fn list_attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, student_id, date, timestamp, status, source, location, device_id
            FROM attendance
            WHERE date = ?
            ORDER BY timestamp
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
    }

    async fn student_attendance(
        &self,
        student_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, student_id, date, timestamp, status, source, location, device_id
            FROM attendance
            WHERE student_id = ?
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(student_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_students(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await
    }

    async fn count_classes(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT class_name) FROM students")
            .fetch_one(&self.pool)
            .await
    }

    async fn count_attendance_on(&self, date: NaiveDate) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE date = ?")
            .bind(date)
            .fetch_one(&self.pool)
            .await
    }
}

#[cfg(test)]
pub mod testutil {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;
    use crate::model::attendance::{AttendanceSource, Status};
    use chrono::NaiveDateTime;

    /// In-memory [`Storage`] stub for service-level tests.
    pub struct MemoryStorage {
        pub students: Mutex<Vec<Student>>,
        pub records: Mutex<Vec<AttendanceRecord>>,
        next_id: AtomicI64,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self {
                students: Mutex::new(Vec::new()),
                records: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
            }
        }

        pub fn with_students(students: Vec<Student>) -> Self {
            let storage = Self::new();
            *storage.students.lock().unwrap() = students;
            storage
        }

        /// Seeds a historical ledger row directly, bypassing the service.
        pub fn seed_record(
            &self,
            student_id: &str,
            date: NaiveDate,
            timestamp: NaiveDateTime,
            status: Status,
        ) {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.records.lock().unwrap().push(AttendanceRecord {
                id,
                student_id: student_id.to_string(),
                date,
                timestamp,
                status: status.to_string(),
                source: AttendanceSource::Manual.to_string(),
                location: None,
                device_id: None,
            });
        }

        pub fn student(student_id: &str, name: &str, class_name: &str, section: &str) -> Student {
            Student {
                student_id: student_id.to_string(),
                name: name.to_string(),
                class_name: class_name.to_string(),
                section: section.to_string(),
                guardian_email: None,
                photo_path: None,
                created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            }
        }
    }

    impl Storage for MemoryStorage {
        async fn find_student(&self, student_id: &str) -> Result<Option<Student>, sqlx::Error> {
            Ok(self
                .students
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.student_id == student_id)
                .cloned())
        }

        async fn has_attendance_on(
            &self,
            student_id: &str,
            date: NaiveDate,
        ) -> Result<bool, sqlx::Error> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .any(|r| r.student_id == student_id && r.date == date))
        }

        async fn append_attendance(
            &self,
            record: &NewAttendance,
        ) -> Result<AttendanceRecord, AppendError> {
            let mut records = self.records.lock().unwrap();
            if records
                .iter()
                .any(|r| r.student_id == record.student_id && r.date == record.date)
            {
                return Err(AppendError::Duplicate);
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let row = AttendanceRecord {
                id,
                student_id: record.student_id.clone(),
                date: record.date,
                timestamp: record.timestamp,
                status: record.status.to_string(),
                source: record.source.to_string(),
                location: record.location.clone(),
                device_id: record.device_id.clone(),
            };
            records.push(row.clone());
            Ok(row)
        }

        async fn list_students(
            &self,
            filter: &StudentFilter,
        ) -> Result<Vec<Student>, sqlx::Error> {
            Ok(self
                .students
                .lock()
                .unwrap()
                .iter()
                .filter(|s| {
                    filter
                        .class_name
                        .as_ref()
                        .is_none_or(|c| &s.class_name == c)
                        && filter.section.as_ref().is_none_or(|sec| &s.section == sec)
                })
                .cloned()
                .collect())
        }

        async fn list_attendance(
            &self,
            date: NaiveDate,
        ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.date == date)
                .cloned()
                .collect())
        }

        async fn student_attendance(
            &self,
            student_id: &str,
            limit: u32,
        ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
            let mut records: Vec<AttendanceRecord> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.student_id == student_id)
                .cloned()
                .collect();
            records.sort_by(|a, b| b.date.cmp(&a.date));
            records.truncate(limit as usize);
            Ok(records)
        }

        async fn count_students(&self) -> Result<i64, sqlx::Error> {
            Ok(self.students.lock().unwrap().len() as i64)
        }

        async fn count_classes(&self) -> Result<i64, sqlx::Error> {
            let students = self.students.lock().unwrap();
            let mut classes: Vec<&str> = students.iter().map(|s| s.class_name.as_str()).collect();
            classes.sort_unstable();
            classes.dedup();
            Ok(classes.len() as i64)
        }

        async fn count_attendance_on(&self, date: NaiveDate) -> Result<i64, sqlx::Error> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.date == date)
                .count() as i64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::model::attendance::{AttendanceSource, Status};
    use chrono::NaiveDate;

    async fn seeded_storage() -> SqlStorage {
        let pool = db::test_pool().await;
        sqlx::query(
            r#"
            INSERT INTO students (student_id, name, class_name, section, created_at)
            VALUES ('STU-1', 'Ayesha Rahman', '10', 'A', '2026-01-01 09:00:00')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        SqlStorage::new(pool)
    }

    fn new_attendance(student_id: &str, date: NaiveDate) -> NewAttendance {
        NewAttendance {
            student_id: student_id.to_string(),
            date,
            timestamp: date.and_hms_opt(8, 30, 0).unwrap(),
            status: Status::Present,
            source: AttendanceSource::QRScan,
            location: None,
            device_id: Some("tab-frontdesk".to_string()),
        }
    }

    #[tokio::test]
    async fn append_then_lookup_round_trip() {
        let storage = seeded_storage().await;
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        assert!(!storage.has_attendance_on("STU-1", day).await.unwrap());

        let record = storage
            .append_attendance(&new_attendance("STU-1", day))
            .await
            .unwrap();
        assert_eq!(record.student_id, "STU-1");
        assert_eq!(record.status, "Present");
        assert_eq!(record.source, "QRScan");

        assert!(storage.has_attendance_on("STU-1", day).await.unwrap());
        let rows = storage.list_attendance(day).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, record.id);
    }

    #[tokio::test]
    async fn second_append_same_day_hits_unique_constraint() {
        let storage = seeded_storage().await;
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        storage
            .append_attendance(&new_attendance("STU-1", day))
            .await
            .unwrap();
        let err = storage
            .append_attendance(&new_attendance("STU-1", day))
            .await
            .unwrap_err();
        assert!(matches!(err, AppendError::Duplicate));

        assert_eq!(storage.count_attendance_on(day).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn history_is_most_recent_first_and_truncated() {
        let storage = seeded_storage().await;
        for day in 1..=5 {
            let date = NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
            storage
                .append_attendance(&new_attendance("STU-1", date))
                .await
                .unwrap();
        }

        let history = storage.student_attendance("STU-1", 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(history[1].date, NaiveDate::from_ymd_opt(2026, 1, 4).unwrap());
    }

    #[tokio::test]
    async fn unknown_student_is_none() {
        let storage = seeded_storage().await;
        assert!(storage.find_student("NOPE").await.unwrap().is_none());
        assert!(storage.find_student("STU-1").await.unwrap().is_some());
    }
}
