//! Static pages.

use actix_web::HttpResponse;
use serde_json::json;

use crate::render;

/// GET /about/author/
pub async fn author() -> HttpResponse {
    render::render("about/author.html", json!({}))
}

/// GET /about/tech/
pub async fn tech() -> HttpResponse {
    render::render("about/tech.html", json!({}))
}
