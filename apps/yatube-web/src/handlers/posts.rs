//! Post listings, detail, create/edit and comments.

use actix_web::{HttpResponse, web};
use serde_json::json;

use yatube_core::DomainError;
use yatube_core::FieldErrors;
use yatube_core::domain::Group;
use yatube_core::forms::{CommentForm, PostForm};
use yatube_core::services::{EditAccess, EditOutcome};
use yatube_shared::RenderedPage;
use yatube_shared::dto::PageQuery;

use super::post_id;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::render::{self, form_context, profile_path, redirect, site_path};
use crate::state::AppState;

const CREATE_POST_TEMPLATE: &str = "posts/create_post.html";

/// GET / - newest posts, served from the home page cache when warm.
/// Out-of-range page numbers share the entry of the page they clamp to.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let number = state.posts.index_page_number(query.page()).await?;
    if let Some(cached) = state.page_cache.get(number).await {
        return Ok(render::page(cached));
    }

    let page = state.posts.index(Some(&number.to_string())).await?;
    let rendered = RenderedPage::new("posts/index.html", json!({ "page": page }));
    state.page_cache.store(page.number, &rendered).await;

    Ok(render::page(rendered))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (group, page) = state.posts.group_posts(&slug, query.page()).await?;
    Ok(render::render(
        "posts/group_list.html",
        json!({ "group": group, "page": page }),
    ))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let profile = state
        .posts
        .profile(&username, query.page(), viewer.user_id())
        .await?;
    let post_count = profile.page.total;
    Ok(render::render(
        "posts/profile.html",
        json!({
            "author": profile.author,
            "page": profile.page,
            "post_count": post_count,
            "following": profile.following,
        }),
    ))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;
    let detail = state.posts.detail(id).await?;
    let can_edit = viewer.user_id() == Some(detail.post.author.id);
    Ok(render::render(
        "posts/post_detail.html",
        json!({
            "post": detail.post,
            "comments": detail.comments,
            "author_post_count": detail.author_post_count,
            "form": form_context(CommentForm::default(), &FieldErrors::new()),
            "can_edit": can_edit,
        }),
    ))
}

fn post_form_page(form: &PostForm, errors: &FieldErrors, groups: &[Group], is_edit: bool) -> HttpResponse {
    render::render(
        CREATE_POST_TEMPLATE,
        json!({
            "form": form_context(form, errors),
            "groups": groups,
            "is_edit": is_edit,
        }),
    )
}

/// GET /create/
pub async fn create_form(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.posts.group_choices().await?;
    Ok(post_form_page(
        &PostForm::default(),
        &FieldErrors::new(),
        &groups,
        false,
    ))
}

/// POST /create/ - on success, back to the author's profile.
pub async fn create_submit(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match state.posts.create(identity.user_id, &form).await {
        Ok(_) => Ok(redirect(&profile_path(&identity.username))),
        Err(DomainError::Validation(errors)) => {
            let groups = state.posts.group_choices().await?;
            Ok(post_form_page(&form, &errors, &groups, false))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{post_id}/edit/ - non-authors are sent to the detail page.
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;
    match state.posts.edit_access(id, identity.user_id).await? {
        EditAccess::Allowed(post) => {
            let form = PostForm {
                text: post.text,
                group: post.group_id.map(|g| g.to_string()),
                image: post.image,
            };
            let groups = state.posts.group_choices().await?;
            Ok(post_form_page(&form, &FieldErrors::new(), &groups, true))
        }
        EditAccess::NotOwner(id) => Ok(redirect(&site_path(&["posts", &id.to_string()]))),
    }
}

/// POST /posts/{post_id}/edit/
pub async fn edit_submit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;
    let form = form.into_inner();
    let detail_path = site_path(&["posts", &id.to_string()]);
    match state.posts.edit(id, identity.user_id, &form).await {
        Ok(EditOutcome::Updated(_) | EditOutcome::NotOwner(_)) => Ok(redirect(&detail_path)),
        Err(DomainError::Validation(errors)) => {
            let groups = state.posts.group_choices().await?;
            Ok(post_form_page(&form, &errors, &groups, true))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /posts/{post_id}/comment/ - an invalid comment is dropped silently.
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;
    match state.posts.add_comment(id, identity.user_id, &form).await {
        Ok(_) => {}
        Err(DomainError::Validation(errors)) => {
            tracing::debug!(post_id = %id, %errors, "Discarded invalid comment");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(redirect(&site_path(&["posts", &id.to_string()])))
}

/// GET /posts/{post_id}/comment/ - nothing to submit, back to the post.
pub async fn comment_without_form(
    _identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;
    Ok(redirect(&site_path(&["posts", &id.to_string()])))
}
