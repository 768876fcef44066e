use uuid::Uuid;

use crate::domain::{Follow, PostEntry, PostScope};
use crate::error::{DomainError, RepoError};
use crate::pagination::{Page, Paginator};
use crate::ports::Repositories;

use super::{post_page, user_by_username};

/// What a follow request did. Every variant redirects to the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    SelfFollow,
}

#[derive(Clone)]
pub struct FollowService {
    repos: Repositories,
    paginator: Paginator,
}

impl FollowService {
    pub fn new(repos: Repositories, paginator: Paginator) -> Self {
        Self { repos, paginator }
    }

    pub async fn follow(&self, user_id: Uuid, username: &str) -> Result<FollowOutcome, DomainError> {
        let author = user_by_username(&self.repos, username).await?;
        if author.id == user_id {
            return Ok(FollowOutcome::SelfFollow);
        }
        if self.repos.follows.find_pair(user_id, author.id).await?.is_some() {
            return Ok(FollowOutcome::AlreadyFollowing);
        }
        match self.repos.follows.save(Follow::new(user_id, author.id)).await {
            Ok(_) => {
                tracing::debug!(user_id = %user_id, author_id = %author.id, "Follow created");
                Ok(FollowOutcome::Created)
            }
            // Lost a race with a concurrent identical request.
            Err(RepoError::Constraint(_)) => Ok(FollowOutcome::AlreadyFollowing),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the follow edge if present; `true` when one was removed.
    pub async fn unfollow(&self, user_id: Uuid, username: &str) -> Result<bool, DomainError> {
        let author = user_by_username(&self.repos, username).await?;
        Ok(self.repos.follows.delete_pair(user_id, author.id).await?)
    }

    /// Posts by followed authors, newest first.
    pub async fn feed(&self, user_id: Uuid, page: Option<&str>) -> Result<Page<PostEntry>, DomainError> {
        post_page(&self.repos, &self.paginator, PostScope::FollowedBy(user_id), page).await
    }
}
