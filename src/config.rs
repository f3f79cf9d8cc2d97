use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // Attendance window policy (half-open hours)
    pub enforce_attendance_window: bool,
    pub attendance_open_hour: u32,
    pub attendance_close_hour: u32,

    // Geofence policy; disabled unless both coordinates are set
    pub school_latitude: Option<f64>,
    pub school_longitude: Option<f64>,
    pub geofence_radius_km: f64,

    // Rate limiting
    pub rate_mark_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_report_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://attendance.db".to_string()),

            enforce_attendance_window: env::var("ENFORCE_ATTENDANCE_WINDOW")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap(),
            attendance_open_hour: env::var("ATTENDANCE_OPEN_HOUR")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap(),
            attendance_close_hour: env::var("ATTENDANCE_CLOSE_HOUR")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap(),

            school_latitude: env::var("SCHOOL_LAT").ok().map(|v| v.parse().unwrap()),
            school_longitude: env::var("SCHOOL_LON").ok().map(|v| v.parse().unwrap()),
            geofence_radius_km: env::var("GEOFENCE_RADIUS_KM")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()
                .unwrap(),

            rate_mark_per_min: env::var("RATE_MARK_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_report_per_min: env::var("RATE_REPORT_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        }
    }

    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: "sqlite::memory:".to_string(),
            enforce_attendance_window: false,
            attendance_open_hour: 8,
            attendance_close_hour: 15,
            school_latitude: None,
            school_longitude: None,
            geofence_radius_km: 0.5,
            // high enough that tests never trip the limiter
            rate_mark_per_min: 10_000,
            rate_register_per_min: 10_000,
            rate_report_per_min: 10_000,
            api_prefix: "/api/v1".to_string(),
        }
    }
}
