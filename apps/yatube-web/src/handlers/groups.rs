//! Group listing and creation.

use actix_web::{HttpResponse, web};
use serde_json::json;

use yatube_core::DomainError;
use yatube_core::FieldErrors;
use yatube_core::forms::GroupForm;
use yatube_shared::dto::PageQuery;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::render::{self, form_context, redirect, site_path};
use crate::state::AppState;

const CREATE_GROUP_TEMPLATE: &str = "posts/create_group.html";

/// GET /groups/ - every group ordered by title.
pub async fn group_list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.groups.list(query.page()).await?;
    Ok(render::render("posts/groups.html", json!({ "page": page })))
}

/// GET /groups/create/
pub async fn create_form(_identity: Identity) -> HttpResponse {
    render::render(
        CREATE_GROUP_TEMPLATE,
        json!({ "form": form_context(GroupForm::default(), &FieldErrors::new()) }),
    )
}

/// POST /groups/create/ - on success, to the new group's page.
pub async fn create_submit(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<GroupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match state.groups.create(&form).await {
        Ok(group) => {
            tracing::debug!(slug = %group.slug, user_id = %identity.user_id, "Group created via form");
            Ok(redirect(&site_path(&["group", &group.slug])))
        }
        Err(DomainError::Validation(errors)) => Ok(render::render(
            CREATE_GROUP_TEMPLATE,
            json!({ "form": form_context(&form, &errors) }),
        )),
        Err(e) => Err(e.into()),
    }
}
