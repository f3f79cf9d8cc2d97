use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::model::class_group::ClassGroup;

#[derive(Deserialize, ToSchema)]
pub struct CreateClassGroup {
    #[schema(example = "C-10A")]
    pub class_id: String,
    #[schema(example = "Class 10 - Section A")]
    pub class_name: String,
    #[schema(example = "T-07", nullable = true)]
    pub teacher_id: Option<String>,
    #[schema(example = "Sat-Thu 08:00-15:00", nullable = true)]
    pub schedule: Option<String>,
}

/// Create Class
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    request_body = CreateClassGroup,
    responses(
        (status = 200, description = "Class created", body = Object, example = json!({
            "message": "Class created successfully"
        })),
        (status = 409, description = "Class ID already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Class"
)]
pub async fn create_class(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateClassGroup>,
) -> impl Responder {
    let result = sqlx::query(
        r#"
        INSERT INTO classes (class_id, class_name, teacher_id, schedule)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&payload.class_id)
    .bind(&payload.class_name)
    .bind(&payload.teacher_id)
    .bind(&payload.schedule)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({
            "message": "Class created successfully"
        })),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return HttpResponse::Conflict().json(json!({
                        "message": "Class ID already exists"
                    }));
                }
            }

            error!(error = %e, "Failed to create class");
            HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }))
        }
    }
}

/// List Classes
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    responses(
        (status = 200, description = "All classes", body = [ClassGroup]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Class"
)]
pub async fn list_classes(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let classes = sqlx::query_as::<_, ClassGroup>(
        "SELECT class_id, class_name, teacher_id, schedule FROM classes ORDER BY class_id",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to list classes");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(classes))
}
