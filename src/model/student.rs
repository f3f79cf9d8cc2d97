use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "student_id": "STU-1001",
        "name": "Ayesha Rahman",
        "class_name": "10",
        "section": "A",
        "guardian_email": "guardian@example.com",
        "photo_path": "photos/STU-1001.jpg",
        "created_at": "2026-01-05T09:12:00"
    })
)]
pub struct Student {
    #[schema(example = "STU-1001")]
    pub student_id: String,

    #[schema(example = "Ayesha Rahman")]
    pub name: String,

    #[schema(example = "10")]
    pub class_name: String,

    #[schema(example = "A")]
    pub section: String,

    #[schema(example = "guardian@example.com", nullable = true)]
    pub guardian_email: Option<String>,

    #[schema(example = "photos/STU-1001.jpg", nullable = true)]
    pub photo_path: Option<String>,

    #[schema(example = "2026-01-05T09:12:00", value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}
