use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::model::attendance::Status;
use crate::model::student::Student;

/// Guardian notification sink. Fire-and-forget: the marking service logs a
/// failure and moves on, the ledger row is never rolled back.
pub trait Notifier {
    fn notify(&self, student: &Student, status: Status, timestamp: NaiveDateTime) -> Result<()>;
}

/// Default sink: emits the notification into the structured log. The actual
/// mail transport lives outside this service.
pub struct GuardianLogNotifier;

impl Notifier for GuardianLogNotifier {
    fn notify(&self, student: &Student, status: Status, timestamp: NaiveDateTime) -> Result<()> {
        match &student.guardian_email {
            Some(email) => info!(
                student_id = %student.student_id,
                guardian = %email,
                status = %status,
                %timestamp,
                "Guardian notification queued"
            ),
            None => debug!(
                student_id = %student.student_id,
                "No guardian email on file, skipping notification"
            ),
        }
        Ok(())
    }
}
