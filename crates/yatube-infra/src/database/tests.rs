use chrono::Utc;
use sea_orm::sea_query::PostgresQueryBuilder;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, QueryTrait};
use uuid::Uuid;

use yatube_core::domain::{Post, PostScope};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, FollowRepository, UserRepository};

use super::entity::{post, user};
use super::postgres_base::map_db_err;
use super::postgres_repo::{
    PostgresFollowRepository, PostgresPostRepository, PostgresUserRepository, scoped_posts,
};

fn post_model(id: Uuid, author_id: Uuid) -> post::Model {
    post::Model {
        id,
        text: "Test post".to_owned(),
        created_at: Utc::now().into(),
        author_id,
        group_id: None,
        image: None,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
    assert_eq!(post.text, "Test post");
    assert!(post.group_id.is_none());
}

#[tokio::test]
async fn test_save_inserts_unknown_post() {
    let author_id = Uuid::new_v4();
    let post = Post::new(author_id, "Fresh".to_owned(), None, None);
    let mut stored = post_model(post.id, author_id);
    stored.text = "Fresh".to_owned();

    // Existence lookup finds nothing, then INSERT ... RETURNING yields the row.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .append_query_results([vec![stored]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let saved = repo.save(post.clone()).await.unwrap();

    assert_eq!(saved.id, post.id);
    assert_eq!(saved.text, "Fresh");
}

#[tokio::test]
async fn test_find_user_by_username() {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id,
            username: "leo".to_owned(),
            email: "leo@example.com".to_owned(),
            first_name: "Leo".to_owned(),
            last_name: "Tolstoy".to_owned(),
            password_hash: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user = repo.find_by_username("leo").await.unwrap().unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.full_name(), "Leo Tolstoy");
}

#[tokio::test]
async fn test_find_by_ids_skips_query_for_empty_input() {
    // No results are queued, so any query would fail.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresUserRepository::new(db);

    assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_pair_reports_removed_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);
    let (user, author) = (Uuid::new_v4(), Uuid::new_v4());

    assert!(repo.delete_pair(user, author).await.unwrap());
    assert!(!repo.delete_pair(user, author).await.unwrap());
}

#[test]
fn test_feed_scope_uses_follow_subquery() {
    let sql = scoped_posts(PostScope::FollowedBy(Uuid::new_v4()))
        .into_query()
        .to_string(PostgresQueryBuilder);

    assert!(sql.contains("\"follows\""));
    assert!(sql.contains("\"author_id\" IN (SELECT"));
}

#[test]
fn test_group_scope_filters_by_group() {
    let sql = scoped_posts(PostScope::Group(Uuid::new_v4()))
        .into_query()
        .to_string(PostgresQueryBuilder);

    assert!(sql.contains("\"group_id\" ="));
}

#[test]
fn test_map_db_err() {
    assert!(matches!(
        map_db_err(DbErr::RecordNotFound("post".into())),
        RepoError::NotFound
    ));
    assert!(matches!(
        map_db_err(DbErr::Custom("boom".into())),
        RepoError::Query(_)
    ));
}
