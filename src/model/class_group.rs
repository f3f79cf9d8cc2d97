use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Read-only reference data used for report grouping.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ClassGroup {
    #[schema(example = "C-10A")]
    pub class_id: String,

    #[schema(example = "Class 10 - Section A")]
    pub class_name: String,

    #[schema(example = "T-07", nullable = true)]
    pub teacher_id: Option<String>,

    #[schema(example = "Sat-Thu 08:00-15:00", nullable = true)]
    pub schedule: Option<String>,
}
