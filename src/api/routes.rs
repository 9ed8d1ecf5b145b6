// src/api/routes.rs
use actix_web::web;
use crate::api::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .route("/balance", web::post().to(handlers::get_balance))
            .route("/balance/adjust", web::post().to(handlers::update_balance))
            .route("/refill", web::post().to(handlers::refill))
            .route("/account/details", web::post().to(handlers::get_account_details))
            .route("/stats", web::get().to(handlers::get_stats))
            .route("/stats/reset", web::post().to(handlers::reset_stats))
            .route("/admin/reload", web::post().to(handlers::reload))
    );
}
