//! Route table for the `/api` scope.

use actix_web::web;

use super::courses::{comment_on_course, create_course, get_course, list_courses, rate_course};
use super::error::{json_error_handler, query_error_handler};
use super::users::{add_favorite, list_favorites, login, register, remove_favorite, validate};

/// Path prefix for every JSON endpoint.
pub const API_PREFIX: &str = "/api";

/// Register the API handlers and the extractor error handlers.
///
/// The caller supplies `web::Data<HttpState>`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use campus_backend::inbound::http::routes::configure_api;
///
/// let _app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope(API_PREFIX)
                .service(register)
                .service(login)
                .service(validate)
                .service(list_favorites)
                .service(add_favorite)
                .service(remove_favorite)
                .service(create_course)
                .service(list_courses)
                .service(get_course)
                .service(comment_on_course)
                .service(rate_course),
        );
}
