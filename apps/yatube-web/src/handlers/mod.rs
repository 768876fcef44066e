//! HTTP handlers and route configuration.

mod about;
mod accounts;
mod follows;
mod groups;
mod health;
mod posts;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use serde_json::json;
use uuid::Uuid;

use yatube_shared::ErrorResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::render::render_status;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Posts
        .route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create_submit)),
        )
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_submit)),
        )
        .service(
            web::resource("/posts/{post_id}/comment/")
                .route(web::get().to(posts::comment_without_form))
                .route(web::post().to(posts::add_comment)),
        )
        // Groups
        .route("/groups/", web::get().to(groups::group_list))
        .service(
            web::resource("/groups/create/")
                .route(web::get().to(groups::create_form))
                .route(web::post().to(groups::create_submit)),
        )
        // Follows
        .route("/follow/", web::get().to(follows::follow_index))
        .service(
            web::resource("/profile/{username}/follow/")
                .route(web::get().to(follows::profile_follow))
                .route(web::post().to(follows::profile_follow)),
        )
        .service(
            web::resource("/profile/{username}/unfollow/")
                .route(web::get().to(follows::profile_unfollow))
                .route(web::post().to(follows::profile_unfollow)),
        )
        // Accounts
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(accounts::signup_form))
                        .route(web::post().to(accounts::signup_submit)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(accounts::login_form))
                        .route(web::post().to(accounts::login_submit)),
                )
                .route("/logout/", web::get().to(accounts::logout))
                .service(
                    web::resource("/password_change/")
                        .route(web::get().to(accounts::password_change_form))
                        .route(web::post().to(accounts::password_change_submit)),
                )
                .route(
                    "/password_change/done/",
                    web::get().to(accounts::password_change_done),
                ),
        )
        // Static pages
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/tech/", web::get().to(about::tech)),
        );
}

/// Fallback for unmatched paths: the custom not-found page.
pub async fn not_found(req: HttpRequest, request_id: RequestId) -> HttpResponse {
    let path = req.path().to_string();
    tracing::debug!(path = %path, "No route matched");
    let error = ErrorResponse::not_found("The requested page does not exist.")
        .with_instance(path.clone());
    render_status(
        StatusCode::NOT_FOUND,
        "core/404.html",
        json!({ "path": path, "request_id": request_id.as_str(), "error": error }),
    )
}

/// Parse a post id path segment; anything malformed is simply not found.
fn post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("post {raw} not found")))
}
