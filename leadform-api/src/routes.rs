//! Route configuration shared by the server binary and the integration tests.

use crate::handlers::{
    admin_handlers, form_handlers, main_handlers, question_handlers, response_handlers,
    settings_handlers,
};
use crate::middleware::AdminAuthentication;
use actix_web::web;

/// Uploaded logos travel as base64 data URLs, so the JSON limit has to sit
/// comfortably above the decoded logo cap.
pub const MAX_JSON_BYTES: usize = 8 * 1024 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(MAX_JSON_BYTES));

    let api_scope = web::scope("/api")
        // Public endpoints
        .route("/health", web::get().to(main_handlers::health_check))
        .route("/form", web::get().to(form_handlers::get_form))
        .route("/form/evaluate", web::post().to(form_handlers::evaluate_answers))
        .route("/form/submit", web::post().to(form_handlers::submit_response))
        // Admin access, reachable before a session exists
        .route("/admin/status", web::get().to(admin_handlers::get_status))
        .route("/admin/password", web::post().to(admin_handlers::set_password))
        .route("/admin/login", web::post().to(admin_handlers::login))
        // Everything else under /admin needs a current session
        .service(
            web::scope("/admin")
                .wrap(AdminAuthentication)
                .route("/logout", web::post().to(admin_handlers::logout))
                .route("/stats", web::get().to(admin_handlers::get_stats))
                .service(
                    web::resource("/questions")
                        .route(web::get().to(question_handlers::list_questions))
                        .route(web::post().to(question_handlers::create_question)),
                )
                .service(
                    web::resource("/questions/{id}")
                        .route(web::put().to(question_handlers::update_question))
                        .route(web::delete().to(question_handlers::delete_question)),
                )
                .route("/responses", web::get().to(response_handlers::list_responses))
                .route(
                    "/responses/export.csv",
                    web::get().to(response_handlers::export_csv),
                )
                .route(
                    "/responses/export.json",
                    web::get().to(response_handlers::export_json),
                )
                .service(
                    web::resource("/settings/logo")
                        .route(web::get().to(settings_handlers::get_logo))
                        .route(web::put().to(settings_handlers::update_logo))
                        .route(web::delete().to(settings_handlers::delete_logo)),
                )
                .service(
                    web::resource("/settings/messaging")
                        .route(web::get().to(settings_handlers::get_messaging))
                        .route(web::put().to(settings_handlers::update_messaging)),
                )
                .service(
                    web::resource("/settings/colors")
                        .route(web::get().to(settings_handlers::get_colors))
                        .route(web::put().to(settings_handlers::update_colors))
                        .route(web::delete().to(settings_handlers::reset_colors)),
                ),
        );

    cfg.service(api_scope);
}
