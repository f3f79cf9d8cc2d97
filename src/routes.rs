use crate::{
    api::{attendance, class_group, report, student},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let mark_limiter = Arc::new(build_limiter(config.rate_mark_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let report_limiter = Arc::new(build_limiter(config.rate_report_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/students")
                    // /students
                    .service(
                        web::resource("")
                            .route(
                                web::post()
                                    .to(student::create_student)
                                    .wrap(register_limiter.clone()),
                            )
                            .route(web::get().to(student::list_students)),
                    )
                    // /students/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(student::get_student))
                            .route(web::put().to(student::update_student)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .wrap(report_limiter.clone())
                            .route(web::get().to(attendance::list_for_day)),
                    )
                    .service(
                        web::resource("/scan")
                            .wrap(mark_limiter.clone())
                            .route(web::post().to(attendance::scan)),
                    )
                    .service(
                        web::resource("/mark")
                            .wrap(mark_limiter.clone())
                            .route(web::post().to(attendance::mark)),
                    )
                    .service(
                        web::resource("/check-in")
                            .wrap(mark_limiter.clone())
                            .route(web::post().to(attendance::check_in)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .wrap(report_limiter.clone())
                    .service(web::resource("/daily").route(web::get().to(report::daily)))
                    .service(
                        web::resource("/students/{id}")
                            .route(web::get().to(report::student_history)),
                    )
                    .service(web::resource("/stats").route(web::get().to(report::stats))),
            )
            .service(
                web::scope("/classes").service(
                    web::resource("")
                        .route(
                            web::post()
                                .to(class_group::create_class)
                                .wrap(register_limiter.clone()),
                        )
                        .route(web::get().to(class_group::list_classes)),
                ),
            ),
    );
}
