//! Follow feed and follow/unfollow actions.

use actix_web::{HttpResponse, web};
use serde_json::json;

use yatube_shared::dto::PageQuery;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::render::{self, profile_path, redirect};
use crate::state::AppState;

/// GET /follow/ - posts by followed authors.
pub async fn follow_index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.follows.feed(identity.user_id, query.page()).await?;
    Ok(render::render("posts/follow.html", json!({ "page": page })))
}

/// /profile/{username}/follow/ - self-follows and repeats change nothing.
pub async fn profile_follow(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let outcome = state.follows.follow(identity.user_id, &username).await?;
    tracing::debug!(user_id = %identity.user_id, author = %username, ?outcome, "Follow requested");
    Ok(redirect(&profile_path(&username)))
}

/// /profile/{username}/unfollow/
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let removed = state.follows.unfollow(identity.user_id, &username).await?;
    tracing::debug!(user_id = %identity.user_id, author = %username, removed, "Unfollow requested");
    Ok(redirect(&profile_path(&username)))
}
