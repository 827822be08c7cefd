pub mod health;
pub mod messages;
pub mod users;

use crate::errors::ApiError;
use actix_web::web;

/// Full route table, shared by the server binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|e, _| {
        ApiError::BadRequest(format!("Invalid request body: {e}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|e, _| {
        ApiError::BadRequest(format!("Invalid query string: {e}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|e, _| {
        ApiError::BadRequest(format!("Invalid identifier: {e}")).into()
    }))
    .route("/", web::get().to(health::root))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/api/v1")
            .service(web::scope("/users")
                .route("", web::post().to(users::create_user))
                .route("", web::get().to(users::list_users))
                .route("/{id}", web::get().to(users::get_user))
                .route("/{id}/sent_messages", web::get().to(users::sent_messages))
                .route("/{id}/inbox", web::get().to(users::inbox))
                .route("/{id}/inbox/unread", web::get().to(users::unread_inbox))
            )
            .service(web::scope("/messages")
                .route("", web::post().to(messages::send_message))
                .route("/recipients/{id}/read", web::patch().to(messages::mark_read))
                .route("/{id}", web::get().to(messages::get_message))
                .route("/{id}/recipients", web::get().to(messages::recipients))
            )
    );
}
