use serde::Serialize;
use uuid::Uuid;

use crate::domain::{AuthorRef, Comment, CommentEntry, Group, Post, PostEntry, PostScope};
use crate::error::DomainError;
use crate::forms::{CommentForm, PostForm, non_blank};
use crate::pagination::{Page, Paginator};
use crate::ports::Repositories;

use super::{hydrate, post_page, user_by_username};

/// Profile page data.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub author: AuthorRef,
    pub page: Page<PostEntry>,
    /// Whether the viewer follows this author.
    pub following: bool,
}

/// Post detail page data.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostEntry,
    pub comments: Vec<CommentEntry>,
    pub author_post_count: u64,
}

/// Result of asking to edit a post.
#[derive(Debug)]
pub enum EditAccess {
    Allowed(Post),
    /// The requester is not the author; show the read-only page instead.
    NotOwner(Uuid),
}

#[derive(Debug)]
pub enum EditOutcome {
    Updated(Post),
    NotOwner(Uuid),
}

/// Listings, post creation/editing and comments.
#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
    paginator: Paginator,
}

impl PostService {
    pub fn new(repos: Repositories, paginator: Paginator) -> Self {
        Self { repos, paginator }
    }

    /// Home page: every post, newest first.
    pub async fn index(&self, page: Option<&str>) -> Result<Page<PostEntry>, DomainError> {
        post_page(&self.repos, &self.paginator, PostScope::All, page).await
    }

    /// Page number a raw home page request resolves to, clamped against
    /// the current post count.
    pub async fn index_page_number(&self, page: Option<&str>) -> Result<u64, DomainError> {
        let total = self.repos.posts.count(PostScope::All).await?;
        Ok(self.paginator.window(page, total).number)
    }

    pub async fn group_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Group, Page<PostEntry>), DomainError> {
        let group = self
            .repos
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;
        let posts = post_page(&self.repos, &self.paginator, PostScope::Group(group.id), page).await?;
        Ok((group, posts))
    }

    pub async fn profile(
        &self,
        username: &str,
        page: Option<&str>,
        viewer: Option<Uuid>,
    ) -> Result<Profile, DomainError> {
        let author = user_by_username(&self.repos, username).await?;
        let posts =
            post_page(&self.repos, &self.paginator, PostScope::Author(author.id), page).await?;
        let following = match viewer {
            Some(viewer) if viewer != author.id => self
                .repos
                .follows
                .find_pair(viewer, author.id)
                .await?
                .is_some(),
            _ => false,
        };
        Ok(Profile {
            author: AuthorRef::from(&author),
            page: posts,
            following,
        })
    }

    pub async fn detail(&self, post_id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.find(post_id).await?;
        let author_id = post.author_id;

        let comments = self.repos.comments.find_by_post(post_id).await?;
        let mut commenter_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
        commenter_ids.sort_unstable();
        commenter_ids.dedup();
        let commenters = self.repos.users.find_by_ids(&commenter_ids).await?;
        let comments = comments
            .into_iter()
            .filter_map(|comment| {
                let author = commenters.iter().find(|u| u.id == comment.author_id)?;
                Some(CommentEntry::new(comment, AuthorRef::from(author)))
            })
            .collect();

        let post = hydrate(&self.repos, vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        let author_post_count = self.repos.posts.count(PostScope::Author(author_id)).await?;

        Ok(PostDetail {
            post,
            comments,
            author_post_count,
        })
    }

    /// Every group, for the post form's choice list.
    pub async fn group_choices(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.repos.groups.list_all().await?)
    }

    pub async fn create(&self, author_id: Uuid, form: &PostForm) -> Result<Post, DomainError> {
        let group_id = self.check_form(form).await?;
        let post = Post::new(
            author_id,
            form.text.trim().to_string(),
            group_id,
            non_blank(form.image.as_deref()).map(str::to_string),
        );
        let saved = self.repos.posts.save(post).await?;
        tracing::debug!(post_id = %saved.id, author_id = %author_id, "Post created");
        Ok(saved)
    }

    /// Check whether `editor` may open the edit form for a post.
    pub async fn edit_access(&self, post_id: Uuid, editor: Uuid) -> Result<EditAccess, DomainError> {
        let post = self.find(post_id).await?;
        if post.is_authored_by(editor) {
            Ok(EditAccess::Allowed(post))
        } else {
            Ok(EditAccess::NotOwner(post.id))
        }
    }

    /// Apply an edit. Non-owners get [`EditOutcome::NotOwner`] and nothing changes.
    pub async fn edit(
        &self,
        post_id: Uuid,
        editor: Uuid,
        form: &PostForm,
    ) -> Result<EditOutcome, DomainError> {
        let mut post = match self.edit_access(post_id, editor).await? {
            EditAccess::Allowed(post) => post,
            EditAccess::NotOwner(id) => {
                tracing::debug!(post_id = %id, editor = %editor, "Edit refused for non-owner");
                return Ok(EditOutcome::NotOwner(id));
            }
        };
        let group_id = self.check_form(form).await?;
        post.revise(
            form.text.trim().to_string(),
            group_id,
            non_blank(form.image.as_deref()).map(str::to_string),
        );
        Ok(EditOutcome::Updated(self.repos.posts.save(post).await?))
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        form: &CommentForm,
    ) -> Result<Comment, DomainError> {
        let post = self.find(post_id).await?;
        form.validate().into_result()?;
        let comment = Comment::new(post.id, author_id, form.text.trim().to_string());
        Ok(self.repos.comments.save(comment).await?)
    }

    async fn find(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// Validate the form and resolve its group choice.
    async fn check_form(&self, form: &PostForm) -> Result<Option<Uuid>, DomainError> {
        let mut errors = form.validate();
        let group_id = match non_blank(form.group.as_deref()) {
            None => None,
            Some(raw) => {
                let found = match Uuid::parse_str(raw) {
                    Ok(id) => self.repos.groups.find_by_id(id).await?,
                    Err(_) => None,
                };
                if found.is_none() {
                    errors.add(
                        "group",
                        "Select a valid choice. That choice is not one of the available choices.",
                    );
                }
                found.map(|g| g.id)
            }
        };
        errors.into_result()?;
        Ok(group_id)
    }
}
