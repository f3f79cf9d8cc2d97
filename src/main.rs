use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod config;
mod db;
mod docs;
mod model;
mod routes;
mod service;
mod utils;

use config::Config;
use db::{init_db, init_schema};

use crate::docs::ApiDoc;
use crate::service::geofence::{GeoPoint, Geofence};
use crate::service::marking::MarkingService;
use crate::service::notify::GuardianLogNotifier;
use crate::service::policy::AttendanceWindow;
use crate::service::storage::SqlStorage;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "School Attendance Management Service"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;
    init_schema(&pool)
        .await
        .expect("Failed to initialize database schema");

    let storage = SqlStorage::new(pool.clone());

    let mut marking = MarkingService::new(storage.clone(), GuardianLogNotifier);
    if config.enforce_attendance_window {
        marking = marking.with_window(AttendanceWindow {
            open_hour: config.attendance_open_hour,
            close_hour: config.attendance_close_hour,
        });
    }
    if let (Some(lat), Some(lon)) = (config.school_latitude, config.school_longitude) {
        info!(lat, lon, radius_km = config.geofence_radius_km, "Geofence enabled");
        marking = marking.with_geofence(Geofence {
            center: GeoPoint::new(lat, lon),
            radius_km: config.geofence_radius_km,
        });
    }
    let marking = Data::new(marking);

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(storage.clone()))
            .app_data(marking.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
