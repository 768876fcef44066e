//! In-memory repositories - used when no database is configured and in tests.
//!
//! All five repositories share one set of tables so that cross-table rules
//! (feed scoping, cascades, foreign keys) behave like the PostgreSQL schema.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Comment, Follow, Group, Post, PostScope, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
    Repositories, UserRepository,
};

/// A row plus its insertion sequence, used as the ordering tie-breaker.
struct Row<T> {
    seq: u64,
    value: T,
}

#[derive(Default)]
struct Tables {
    next_seq: u64,
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    posts: HashMap<Uuid, Row<Post>>,
    comments: HashMap<Uuid, Row<Comment>>,
    follows: HashMap<Uuid, Follow>,
}

impl Tables {
    /// Keep an existing row's sequence, or allocate the next one.
    fn seq_or_next(&mut self, existing: Option<u64>) -> u64 {
        existing.unwrap_or_else(|| {
            self.next_seq += 1;
            self.next_seq
        })
    }

    fn post_in_scope(&self, post: &Post, scope: PostScope) -> bool {
        match scope {
            PostScope::All => true,
            PostScope::Group(group_id) => post.group_id == Some(group_id),
            PostScope::Author(author_id) => post.author_id == author_id,
            PostScope::FollowedBy(user_id) => self
                .follows
                .values()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn remove_post(&mut self, post_id: Uuid) {
        self.posts.remove(&post_id);
        self.comments.retain(|_, c| c.value.post_id != post_id);
    }
}

type Shared = Arc<RwLock<Tables>>;

fn constraint(name: &str) -> RepoError {
    RepoError::Constraint(name.to_string())
}

/// Process-local store handing out repository handles over shared tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Shared,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(MemoryUserRepository(self.tables.clone())),
            groups: Arc::new(MemoryGroupRepository(self.tables.clone())),
            posts: Arc::new(MemoryPostRepository(self.tables.clone())),
            comments: Arc::new(MemoryCommentRepository(self.tables.clone())),
            follows: Arc::new(MemoryFollowRepository(self.tables.clone())),
        }
    }
}

pub struct MemoryUserRepository(Shared);
pub struct MemoryGroupRepository(Shared);
pub struct MemoryPostRepository(Shared);
pub struct MemoryCommentRepository(Shared);
pub struct MemoryFollowRepository(Shared);

#[async_trait]
impl BaseRepository<User, Uuid> for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.0.read().await.users.get(&id).cloned())
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.0.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != entity.id && u.username == entity.username)
        {
            return Err(constraint("users_username_key"));
        }
        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;
        let authored: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.value.author_id == id)
            .map(|p| p.value.id)
            .collect();
        for post_id in authored {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.value.author_id != id);
        tables
            .follows
            .retain(|_, f| f.user_id != id && f.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.0.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for MemoryGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        Ok(self.0.read().await.groups.get(&id).cloned())
    }

    async fn save(&self, entity: Group) -> Result<Group, RepoError> {
        let mut tables = self.0.write().await;
        if tables
            .groups
            .values()
            .any(|g| g.id != entity.id && g.slug == entity.slug)
        {
            return Err(constraint("groups_slug_key"));
        }
        tables.groups.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        tables.groups.remove(&id).ok_or(RepoError::NotFound)?;
        for row in tables.posts.values_mut() {
            if row.value.group_id == Some(id) {
                row.value.group_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for MemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError> {
        let tables = self.0.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.groups.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.0.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for MemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.0.read().await.posts.get(&id).map(|r| r.value.clone()))
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.0.write().await;
        if !tables.users.contains_key(&entity.author_id) {
            return Err(constraint("posts_author_id_fkey"));
        }
        if entity
            .group_id
            .is_some_and(|g| !tables.groups.contains_key(&g))
        {
            return Err(constraint("posts_group_id_fkey"));
        }
        let existing = tables.posts.get(&entity.id).map(|r| r.seq);
        let seq = tables.seq_or_next(existing);
        tables.posts.insert(
            entity.id,
            Row {
                seq,
                value: entity.clone(),
            },
        );
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        if !tables.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.remove_post(id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn count(&self, scope: PostScope) -> Result<u64, RepoError> {
        let tables = self.0.read().await;
        let count = tables
            .posts
            .values()
            .filter(|r| tables.post_in_scope(&r.value, scope))
            .count();
        Ok(count as u64)
    }

    async fn list(
        &self,
        scope: PostScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.0.read().await;
        let mut rows: Vec<&Row<Post>> = tables
            .posts
            .values()
            .filter(|r| tables.post_in_scope(&r.value, scope))
            .collect();
        rows.sort_by_key(|r| Reverse((r.value.created_at, r.seq)));
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|r| r.value.clone())
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for MemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self
            .0
            .read()
            .await
            .comments
            .get(&id)
            .map(|r| r.value.clone()))
    }

    async fn save(&self, entity: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.0.write().await;
        if !tables.posts.contains_key(&entity.post_id) {
            return Err(constraint("comments_post_id_fkey"));
        }
        if !tables.users.contains_key(&entity.author_id) {
            return Err(constraint("comments_author_id_fkey"));
        }
        let existing = tables.comments.get(&entity.id).map(|r| r.seq);
        let seq = tables.seq_or_next(existing);
        tables.comments.insert(
            entity.id,
            Row {
                seq,
                value: entity.clone(),
            },
        );
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.0.read().await;
        let mut rows: Vec<&Row<Comment>> = tables
            .comments
            .values()
            .filter(|r| r.value.post_id == post_id)
            .collect();
        rows.sort_by_key(|r| (r.value.created_at, r.seq));
        Ok(rows.into_iter().map(|r| r.value.clone()).collect())
    }
}

#[async_trait]
impl BaseRepository<Follow, Uuid> for MemoryFollowRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Follow>, RepoError> {
        Ok(self.0.read().await.follows.get(&id).cloned())
    }

    async fn save(&self, entity: Follow) -> Result<Follow, RepoError> {
        let mut tables = self.0.write().await;
        if tables.follows.values().any(|f| {
            f.id != entity.id && f.user_id == entity.user_id && f.author_id == entity.author_id
        }) {
            return Err(constraint("follows_user_author_key"));
        }
        if !tables.users.contains_key(&entity.user_id) || !tables.users.contains_key(&entity.author_id)
        {
            return Err(constraint("follows_user_id_fkey"));
        }
        tables.follows.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        tables
            .follows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl FollowRepository for MemoryFollowRepository {
    async fn find_pair(
        &self,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Follow>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .follows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
            .cloned())
    }

    async fn delete_pair(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.0.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|_, f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() < before)
    }
}
