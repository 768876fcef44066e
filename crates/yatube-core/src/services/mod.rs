//! Application services: authorization checks and CRUD over the ports.
//!
//! Handlers call these; nothing here knows about HTTP.

mod accounts;
mod follows;
mod groups;
mod posts;

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{AuthorRef, GroupRef, Post, PostEntry, PostScope, User};
use crate::error::DomainError;
use crate::pagination::{Page, Paginator};
use crate::ports::Repositories;

pub use accounts::AccountService;
pub use follows::{FollowOutcome, FollowService};
pub use groups::GroupService;
pub use posts::{EditAccess, EditOutcome, PostDetail, PostService, Profile};

/// Load one page of posts for `scope` and join authors and groups.
pub(crate) async fn post_page(
    repos: &Repositories,
    paginator: &Paginator,
    scope: PostScope,
    requested: Option<&str>,
) -> Result<Page<PostEntry>, DomainError> {
    let total = repos.posts.count(scope).await?;
    let window = paginator.window(requested, total);
    let posts = repos
        .posts
        .list(scope, window.offset(), window.limit())
        .await?;
    let entries = hydrate(repos, posts).await?;
    Ok(window.into_page(entries))
}

/// Join posts with their authors and groups using two batched lookups.
pub(crate) async fn hydrate(
    repos: &Repositories,
    posts: Vec<Post>,
) -> Result<Vec<PostEntry>, DomainError> {
    let mut author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let mut group_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.group_id).collect();
    group_ids.sort_unstable();
    group_ids.dedup();

    let authors: HashMap<Uuid, AuthorRef> = repos
        .users
        .find_by_ids(&author_ids)
        .await?
        .iter()
        .map(|u| (u.id, AuthorRef::from(u)))
        .collect();
    let groups: HashMap<Uuid, GroupRef> = if group_ids.is_empty() {
        HashMap::new()
    } else {
        repos
            .groups
            .find_by_ids(&group_ids)
            .await?
            .iter()
            .map(|g| (g.id, GroupRef::from(g)))
            .collect()
    };

    posts
        .into_iter()
        .map(|post| {
            let author = authors
                .get(&post.author_id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("user", post.author_id))?;
            let group = post.group_id.and_then(|id| groups.get(&id).cloned());
            Ok(PostEntry::new(post, author, group))
        })
        .collect()
}

pub(crate) async fn user_by_username(
    repos: &Repositories,
    username: &str,
) -> Result<User, DomainError> {
    repos
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found("user", username))
}
