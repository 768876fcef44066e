//! Session identity extractors and the session cookie.

use std::future::Future;
use std::pin::Pin;

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};

use yatube_core::DomainError;
use yatube_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::render::{login_redirect_url, redirect};
use crate::state::AppState;

type LocalBoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Name of the HTTP-only cookie carrying the session token.
pub const SESSION_COOKIE: &str = "yatube_session";

/// Authenticated user identity extractor.
///
/// Handlers taking an `Identity` are login-only: anonymous requests are
/// redirected to the login page with `next` set to the requested path.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

/// Rejected session; responds with the login redirect.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct AuthenticationError {
    source: AuthError,
    next: String,
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        tracing::debug!(reason = %self.source, next = %self.next, "Redirecting to login");
        redirect(&login_redirect_url(&self.next))
    }
}

/// Session token from the cookie, or from an `Authorization: Bearer` header.
fn session_token(req: &HttpRequest) -> Result<String, AuthError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Ok(cookie.value().to_string());
    }

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

/// Why a request carries no usable identity.
#[derive(Debug, thiserror::Error)]
enum SessionError {
    /// Anonymous, or a session that must be treated as anonymous.
    #[error(transparent)]
    Rejected(#[from] AuthError),

    #[error(transparent)]
    Lookup(#[from] DomainError),
}

/// Validate the session token and resolve it to a stored user. Tokens for
/// accounts that no longer exist are rejected like missing sessions.
async fn authenticate(req: &HttpRequest) -> Result<Identity, SessionError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(DomainError::Internal("application state missing".to_string()).into());
    };
    let token = session_token(req)?;
    let claims = state.tokens.validate_token(&token)?;
    let user = state
        .accounts
        .session_user(claims.user_id)
        .await?
        .ok_or(AuthError::UnknownUser(claims.user_id))?;
    Ok(Identity {
        user_id: user.id,
        username: user.username,
    })
}

/// Path and query the login page should send the user back to.
fn requested_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.path().to_string(), |pq| pq.as_str().to_string())
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match authenticate(&req).await {
                Ok(identity) => Ok(identity),
                Err(SessionError::Rejected(source)) => Err(AuthenticationError {
                    source,
                    next: requested_path(&req),
                }
                .into()),
                Err(SessionError::Lookup(e)) => Err(AppError::from(e).into()),
            }
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match authenticate(&req).await {
                Ok(identity) => Ok(OptionalIdentity(Some(identity))),
                Err(SessionError::Rejected(_)) => Ok(OptionalIdentity(None)),
                Err(SessionError::Lookup(e)) => Err(AppError::from(e).into()),
            }
        })
    }
}

/// Cookie holding a freshly issued session token.
pub fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_seconds))
        .finish()
}

/// Cookie that removes the session on the client.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}
