//! Signup, login/logout and password change.

use actix_web::{HttpResponse, web};
use serde_json::json;

use yatube_core::DomainError;
use yatube_core::FieldErrors;
use yatube_core::domain::User;
use yatube_core::forms::{LoginForm, PasswordChangeForm, SignupForm};
use yatube_shared::dto::NextQuery;

use crate::middleware::auth::{Identity, expired_session_cookie, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::render::{self, form_context};
use crate::state::AppState;

const SIGNUP_TEMPLATE: &str = "users/signup.html";
const LOGIN_TEMPLATE: &str = "users/login.html";
const PASSWORD_CHANGE_TEMPLATE: &str = "users/password_change_form.html";

/// Redirect to `location`, logging `user` in on the way.
fn login_redirect(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let cookie = session_cookie(token, state.tokens.expiration_seconds());

    Ok(HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, location))
        .cookie(cookie)
        .finish())
}

/// GET /auth/signup/
pub async fn signup_form() -> HttpResponse {
    render::render(
        SIGNUP_TEMPLATE,
        json!({ "form": form_context(SignupForm::default(), &FieldErrors::new()) }),
    )
}

/// POST /auth/signup/ - the new account is logged in straight away.
pub async fn signup_submit(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match state.accounts.signup(&form).await {
        Ok(user) => login_redirect(&state, &user, "/"),
        Err(DomainError::Validation(errors)) => Ok(render::render(
            SIGNUP_TEMPLATE,
            json!({ "form": form_context(&form, &errors) }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    render::render(
        LOGIN_TEMPLATE,
        json!({
            "form": form_context(LoginForm::default(), &FieldErrors::new()),
            "next": query.local_next(),
        }),
    )
}

/// POST /auth/login/ - redirects to a local `next`, or home.
pub async fn login_submit(
    state: web::Data<AppState>,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match state.accounts.authenticate(&form).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User logged in");
            login_redirect(&state, &user, query.local_next().unwrap_or("/"))
        }
        Err(DomainError::Validation(errors)) => Ok(render::render(
            LOGIN_TEMPLATE,
            json!({
                "form": form_context(&form, &errors),
                "next": query.local_next(),
            }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/logout/
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(expired_session_cookie())
        .json(yatube_shared::RenderedPage::new(
            "users/logged_out.html",
            json!({}),
        ))
}

/// GET /auth/password_change/
pub async fn password_change_form(_identity: Identity) -> HttpResponse {
    render::render(
        PASSWORD_CHANGE_TEMPLATE,
        json!({ "form": form_context(PasswordChangeForm::default(), &FieldErrors::new()) }),
    )
}

/// POST /auth/password_change/
pub async fn password_change_submit(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PasswordChangeForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match state.accounts.change_password(identity.user_id, &form).await {
        Ok(()) => Ok(render::redirect("/auth/password_change/done/")),
        Err(DomainError::Validation(errors)) => Ok(render::render(
            PASSWORD_CHANGE_TEMPLATE,
            json!({ "form": form_context(&form, &errors) }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/password_change/done/
pub async fn password_change_done(_identity: Identity) -> HttpResponse {
    render::render("users/password_change_done.html", json!({}))
}
