//! Page and redirect responses.
//!
//! Handlers hand back a [`RenderedPage`]: the template name plus the JSON
//! context a template engine would receive.

use actix_web::http::{StatusCode, header};
use actix_web::HttpResponse;
use serde_json::{Value, json};
use url::{Url, form_urlencoded};

use yatube_core::FieldErrors;
use yatube_shared::RenderedPage;

pub const LOGIN_URL: &str = "/auth/login/";

pub fn page(page: RenderedPage) -> HttpResponse {
    HttpResponse::Ok().json(page)
}

pub fn render(template: &str, context: Value) -> HttpResponse {
    page(RenderedPage::new(template, context))
}

pub fn render_status(status: StatusCode, template: &str, context: Value) -> HttpResponse {
    HttpResponse::build(status).json(RenderedPage::new(template, context))
}

/// A bound form as templates see it: submitted values plus field errors.
pub fn form_context(values: impl serde::Serialize, errors: &FieldErrors) -> Value {
    json!({ "values": values, "errors": errors })
}

/// 302 to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Login page URL that returns to `next` afterwards. `/` stays literal so
/// the target reads as a path; everything else reserved is escaped.
pub fn login_redirect_url(next: &str) -> String {
    let next = form_urlencoded::byte_serialize(next.as_bytes())
        .collect::<String>()
        .replace("%2F", "/");
    format!("{LOGIN_URL}?next={next}")
}

/// `/{segments}/` with every segment percent-encoded and a trailing slash.
pub fn site_path(segments: &[&str]) -> String {
    let fallback = || format!("/{}/", segments.join("/"));
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return fallback();
    };
    match url.path_segments_mut() {
        Ok(mut path) => {
            path.clear().extend(segments).push("");
        }
        Err(()) => return fallback(),
    }
    url.path().to_string()
}

pub fn profile_path(username: &str) -> String {
    site_path(&["profile", username])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/create/", "/auth/login/?next=/create/")]
    #[case("/profile/leo/follow/", "/auth/login/?next=/profile/leo/follow/")]
    #[case("/?page=2&x=y", "/auth/login/?next=/%3Fpage%3D2%26x%3Dy")]
    #[case("/profile/%2F/", "/auth/login/?next=/profile/%252F/")]
    fn login_redirect_keeps_slashes_in_next(#[case] next: &str, #[case] expected: &str) {
        assert_eq!(login_redirect_url(next), expected);
    }

    #[test]
    fn profile_paths_encode_usernames() {
        assert_eq!(profile_path("leo"), "/profile/leo/");
        assert_eq!(profile_path("лев"), "/profile/%D0%BB%D0%B5%D0%B2/");
    }
}
