use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::model::student::Student;
use crate::utils::db_utils::{build_update_sql, execute_update};

/// Contact and photo are the only mutable fields after registration.
const UPDATABLE_COLUMNS: &[&str] = &["guardian_email", "photo_path"];

fn default_section() -> String {
    "A".to_string()
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateStudent {
    #[schema(example = "STU-1001")]
    pub student_id: String,
    #[schema(example = "Ayesha Rahman")]
    pub name: String,
    #[schema(example = "10")]
    pub class_name: String,
    #[serde(default = "default_section")]
    #[schema(example = "A")]
    pub section: String,
    #[schema(example = "guardian@example.com", format = "email", nullable = true)]
    pub guardian_email: Option<String>,
    #[schema(example = "photos/STU-1001.jpg", nullable = true)]
    pub photo_path: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StudentQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub class_name: Option<String>,
    pub section: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StudentListResponse {
    pub data: Vec<Student>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 420)]
    pub total: i64,
}

/// Register Student
#[utoipa::path(
    post,
    path = "/api/v1/students",
    request_body = CreateStudent,
    responses(
        (status = 200, description = "Student registered", body = Object, example = json!({
            "message": "Student registered successfully"
        })),
        (status = 409, description = "Student ID already exists", body = Object, example = json!({
            "message": "Student ID already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Student"
)]
pub async fn create_student(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateStudent>,
) -> impl Responder {
    let result = sqlx::query(
        r#"
        INSERT INTO students
        (student_id, name, class_name, section, guardian_email, photo_path, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.student_id)
    .bind(&payload.name)
    .bind(&payload.class_name)
    .bind(&payload.section)
    .bind(&payload.guardian_email)
    .bind(&payload.photo_path)
    .bind(Local::now().naive_local())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({
            "message": "Student registered successfully"
        })),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return HttpResponse::Conflict().json(json!({
                        "message": "Student ID already exists"
                    }));
                }
            }

            error!(error = %e, "Failed to register student");
            HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, contact the system admin"
            }))
        }
    }
}

/// List Students
#[utoipa::path(
    get,
    path = "/api/v1/students",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("class_name", Query, description = "Filter by class"),
        ("section", Query, description = "Filter by section"),
        ("search", Query, description = "Search by name or student ID")
    ),
    responses(
        (status = 200, description = "Paginated student list", body = StudentListResponse)
    ),
    tag = "Student"
)]
pub async fn list_students(
    pool: web::Data<SqlitePool>,
    query: web::Query<StudentQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(class_name) = &query.class_name {
        conditions.push("class_name = ?");
        bindings.push(class_name.clone());
    }

    if let Some(section) = &query.section {
        conditions.push("section = ?");
        bindings.push(section.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("(name LIKE ? OR student_id LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM students {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting students");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count students");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM students {} ORDER BY class_name, section, name LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching students");

    let mut data_query = sqlx::query_as::<_, Student>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let students = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch students");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(StudentListResponse {
        data: students,
        page,
        per_page,
        total,
    }))
}

/// Get Student by ID
#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}",
    params(
        ("student_id", Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 404, description = "Student not found", body = Object, example = json!({
            "message": "Student not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Student"
)]
pub async fn get_student(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let student_id = path.into_inner();

    let student = sqlx::query_as::<_, Student>(
        r#"
        SELECT student_id, name, class_name, section, guardian_email, photo_path, created_at
        FROM students
        WHERE student_id = ?
        "#,
    )
    .bind(&student_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, student_id, "Failed to fetch student");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match student {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Student not found"
        }))),
    }
}

/// Update Student contact or photo
#[utoipa::path(
    put,
    path = "/api/v1/students/{student_id}",
    params(
        ("student_id", Path, description = "Student ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Student updated", body = Object, example = json!({
            "message": "Student updated successfully"
        })),
        (status = 400, description = "Field not updatable"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Student"
)]
pub async fn update_student(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let student_id = path.into_inner();

    let update = build_update_sql(
        "students",
        &body,
        UPDATABLE_COLUMNS,
        "student_id",
        &student_id,
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Student not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Student updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web::Data};
    use serde_json::json;

    use crate::config::Config;
    use crate::db;
    use crate::routes;
    use crate::service::marking::MarkingService;
    use crate::service::notify::GuardianLogNotifier;
    use crate::service::storage::SqlStorage;

    const PEER: &str = "127.0.0.1:9999";

    macro_rules! spawn_app {
        () => {{
            let pool = db::test_pool().await;
            let storage = SqlStorage::new(pool.clone());
            let marking = MarkingService::new(storage.clone(), GuardianLogNotifier);
            test::init_service(
                App::new()
                    .app_data(Data::new(pool.clone()))
                    .app_data(Data::new(storage))
                    .app_data(Data::new(marking))
                    .configure(|cfg| routes::configure(cfg, Config::test_default())),
            )
            .await
        }};
    }

    fn ayesha() -> serde_json::Value {
        json!({
            "student_id": "STU-1",
            "name": "Ayesha Rahman",
            "class_name": "10",
            "section": "A",
            "guardian_email": "guardian@example.com"
        })
    }

    #[actix_web::test]
    async fn register_then_fetch() {
        let app = spawn_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/students")
            .peer_addr(PEER.parse().unwrap())
            .set_json(ayesha())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get()
            .uri("/api/v1/students/STU-1")
            .peer_addr(PEER.parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "Ayesha Rahman");
        assert_eq!(body["section"], "A");
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let app = spawn_app!();

        for expected in [200, 409] {
            let req = test::TestRequest::post()
                .uri("/api/v1/students")
                .peer_addr(PEER.parse().unwrap())
                .set_json(ayesha())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }

    #[actix_web::test]
    async fn section_defaults_to_a() {
        let app = spawn_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/students")
            .peer_addr(PEER.parse().unwrap())
            .set_json(json!({
                "student_id": "STU-2",
                "name": "Badal Karim",
                "class_name": "9"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get()
            .uri("/api/v1/students/STU-2")
            .peer_addr(PEER.parse().unwrap())
            .to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["section"], "A");
    }

    #[actix_web::test]
    async fn contact_is_updatable_but_identity_is_not() {
        let app = spawn_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/students")
            .peer_addr(PEER.parse().unwrap())
            .set_json(ayesha())
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/v1/students/STU-1")
            .peer_addr(PEER.parse().unwrap())
            .set_json(json!({"guardian_email": "new@example.com"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::put()
            .uri("/api/v1/students/STU-1")
            .peer_addr(PEER.parse().unwrap())
            .set_json(json!({"name": "Someone Else"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn list_filters_by_class_and_search() {
        let app = spawn_app!();

        for (id, name, class_name) in [
            ("STU-1", "Ayesha Rahman", "10"),
            ("STU-2", "Badal Karim", "10"),
            ("STU-3", "Chitra Das", "9"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/students")
                .peer_addr(PEER.parse().unwrap())
                .set_json(json!({
                    "student_id": id,
                    "name": name,
                    "class_name": class_name
                }))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/students?class_name=10")
            .peer_addr(PEER.parse().unwrap())
            .to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["total"], 2);

        let req = test::TestRequest::get()
            .uri("/api/v1/students?search=Chitra")
            .peer_addr(PEER.parse().unwrap())
            .to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["student_id"], "STU-3");
    }
}
