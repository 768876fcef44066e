//! Service behaviour over the in-memory repositories.

use std::sync::Arc;

use uuid::Uuid;

use yatube_core::domain::{Group, User};
use yatube_core::forms::{
    CommentForm, GroupForm, LoginForm, PasswordChangeForm, PostForm, SignupForm,
};
use yatube_core::ports::{PasswordService, Repositories};
use yatube_core::services::{
    AccountService, EditOutcome, FollowOutcome, FollowService, GroupService, PostService,
};
use yatube_core::{DomainError, Paginator};
use yatube_infra::{Argon2PasswordService, InMemoryStore};

struct Fixture {
    repos: Repositories,
    posts: PostService,
    groups: GroupService,
    follows: FollowService,
    accounts: AccountService,
}

fn fixture() -> Fixture {
    let repos = InMemoryStore::new().repositories();
    let paginator = Paginator::default();
    let passwords: Arc<dyn PasswordService> =
        Arc::new(Argon2PasswordService::with_params(8, 1, 1).unwrap());
    Fixture {
        posts: PostService::new(repos.clone(), paginator),
        groups: GroupService::new(repos.clone(), paginator),
        follows: FollowService::new(repos.clone(), paginator),
        accounts: AccountService::new(repos.clone(), passwords),
        repos,
    }
}

async fn user(fx: &Fixture, username: &str) -> User {
    fx.repos
        .users
        .save(User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "unused".to_string(),
        ))
        .await
        .unwrap()
}

async fn group(fx: &Fixture, slug: &str) -> Group {
    fx.repos
        .groups
        .save(Group::new(
            format!("Group {slug}"),
            slug.to_string(),
            "Test group".to_string(),
        ))
        .await
        .unwrap()
}

fn post_form(text: &str, group: Option<&Group>) -> PostForm {
    PostForm {
        text: text.to_string(),
        group: group.map(|g| g.id.to_string()),
        image: None,
    }
}

async fn seed_posts(fx: &Fixture, author: &User, group: &Group, count: usize) {
    for n in 0..count {
        fx.posts
            .create(author.id, &post_form(&format!("Post {n}"), Some(group)))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn create_post_with_group_shows_everywhere() {
    let fx = fixture();
    let author = user(&fx, "leo").await;
    let cats = group(&fx, "cats").await;

    let post = fx
        .posts
        .create(author.id, &post_form("Cats rule", Some(&cats)))
        .await
        .unwrap();

    let index = fx.posts.index(None).await.unwrap();
    assert_eq!(index.items[0].id, post.id);
    assert_eq!(index.items[0].group.as_ref().unwrap().slug, "cats");

    let (found, page) = fx.posts.group_posts("cats", None).await.unwrap();
    assert_eq!(found.id, cats.id);
    assert_eq!(page.total, 1);

    let profile = fx.posts.profile("leo", None, None).await.unwrap();
    assert_eq!(profile.page.items[0].text, "Cats rule");
}

#[tokio::test]
async fn post_lands_only_in_its_own_group() {
    let fx = fixture();
    let author = user(&fx, "leo").await;
    let cats = group(&fx, "cats").await;
    group(&fx, "dogs").await;

    fx.posts
        .create(author.id, &post_form("Meow", Some(&cats)))
        .await
        .unwrap();

    let (_, dogs) = fx.posts.group_posts("dogs", None).await.unwrap();
    assert!(dogs.is_empty());
}

#[tokio::test]
async fn unknown_group_choice_is_a_field_error() {
    let fx = fixture();
    let author = user(&fx, "leo").await;
    let form = PostForm {
        text: "Hello".into(),
        group: Some(Uuid::new_v4().to_string()),
        image: None,
    };

    let err = fx.posts.create(author.id, &form).await.unwrap_err();

    match err {
        DomainError::Validation(errors) => assert!(errors.contains("group")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fx.posts.index(None).await.unwrap().total, 0);
}

#[tokio::test]
async fn non_owner_edit_changes_nothing() {
    let fx = fixture();
    let author = user(&fx, "author").await;
    let intruder = user(&fx, "intruder").await;
    let post = fx
        .posts
        .create(author.id, &post_form("Original", None))
        .await
        .unwrap();

    let outcome = fx
        .posts
        .edit(post.id, intruder.id, &post_form("Hijacked", None))
        .await
        .unwrap();

    assert!(matches!(outcome, EditOutcome::NotOwner(id) if id == post.id));
    let detail = fx.posts.detail(post.id).await.unwrap();
    assert_eq!(detail.post.text, "Original");
}

#[tokio::test]
async fn owner_edit_keeps_image_when_none_is_submitted() {
    let fx = fixture();
    let author = user(&fx, "author").await;
    let post = fx
        .posts
        .create(
            author.id,
            &PostForm {
                text: "With picture".into(),
                group: None,
                image: Some("posts/cat.gif".into()),
            },
        )
        .await
        .unwrap();

    let outcome = fx
        .posts
        .edit(post.id, author.id, &post_form("Edited", None))
        .await
        .unwrap();

    let EditOutcome::Updated(updated) = outcome else {
        panic!("owner edit was refused");
    };
    assert_eq!(updated.text, "Edited");
    assert_eq!(updated.image.as_deref(), Some("posts/cat.gif"));
    assert_eq!(updated.created_at, post.created_at);
}

#[tokio::test]
async fn thirteen_posts_paginate_ten_and_three() {
    let fx = fixture();
    let author = user(&fx, "leo").await;
    let cats = group(&fx, "cats").await;
    seed_posts(&fx, &author, &cats, 13).await;

    let first = fx.posts.index(None).await.unwrap();
    let second = fx.posts.index(Some("2")).await.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(second.len(), 3);

    let (_, group_first) = fx.posts.group_posts("cats", Some("1")).await.unwrap();
    let (_, group_second) = fx.posts.group_posts("cats", Some("2")).await.unwrap();
    assert_eq!(group_first.len(), 10);
    assert_eq!(group_second.len(), 3);

    let profile = fx.posts.profile("leo", Some("2"), None).await.unwrap();
    assert_eq!(profile.page.len(), 3);
    assert_eq!(profile.page.total, 13);
}

#[tokio::test]
async fn home_page_numbers_clamp_to_existing_pages() {
    let fx = fixture();
    assert_eq!(fx.posts.index_page_number(Some("7")).await.unwrap(), 1);

    let author = user(&fx, "leo").await;
    let cats = group(&fx, "cats").await;
    seed_posts(&fx, &author, &cats, 13).await;

    assert_eq!(fx.posts.index_page_number(None).await.unwrap(), 1);
    assert_eq!(fx.posts.index_page_number(Some("2")).await.unwrap(), 2);
    assert_eq!(fx.posts.index_page_number(Some("500")).await.unwrap(), 2);
    assert_eq!(fx.posts.index_page_number(Some("abc")).await.unwrap(), 1);
}

#[tokio::test]
async fn session_user_exists_only_for_saved_accounts() {
    let fx = fixture();
    let leo = user(&fx, "leo").await;

    let found = fx.accounts.session_user(leo.id).await.unwrap();
    assert_eq!(found.map(|u| u.username), Some("leo".to_string()));
    assert!(fx.accounts.session_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn listings_are_newest_first() {
    let fx = fixture();
    let author = user(&fx, "leo").await;
    let older = fx
        .posts
        .create(author.id, &post_form("older", None))
        .await
        .unwrap();
    let newer = fx
        .posts
        .create(author.id, &post_form("newer", None))
        .await
        .unwrap();

    let index = fx.posts.index(None).await.unwrap();
    let ids: Vec<Uuid> = index.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn missing_group_and_profile_are_not_found() {
    let fx = fixture();

    assert!(matches!(
        fx.posts.group_posts("nope", None).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        fx.posts.profile("ghost", None, None).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        fx.posts.detail(Uuid::new_v4()).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn comments_show_on_detail_oldest_first() {
    let fx = fixture();
    let author = user(&fx, "author").await;
    let reader = user(&fx, "reader").await;
    let post = fx
        .posts
        .create(author.id, &post_form("Discuss", None))
        .await
        .unwrap();

    for text in ["first", "second"] {
        fx.posts
            .add_comment(post.id, reader.id, &CommentForm { text: text.into() })
            .await
            .unwrap();
    }

    let detail = fx.posts.detail(post.id).await.unwrap();
    let texts: Vec<&str> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(detail.comments[0].author.username, "reader");
    assert_eq!(detail.author_post_count, 1);
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let fx = fixture();
    let author = user(&fx, "author").await;
    let post = fx
        .posts
        .create(author.id, &post_form("Discuss", None))
        .await
        .unwrap();

    let result = fx
        .posts
        .add_comment(post.id, author.id, &CommentForm { text: "  ".into() })
        .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(fx.posts.detail(post.id).await.unwrap().comments.is_empty());
}

#[tokio::test]
async fn follow_is_unique_and_never_self() {
    let fx = fixture();
    let reader = user(&fx, "reader").await;
    user(&fx, "author").await;

    assert_eq!(
        fx.follows.follow(reader.id, "author").await.unwrap(),
        FollowOutcome::Created
    );
    assert_eq!(
        fx.follows.follow(reader.id, "author").await.unwrap(),
        FollowOutcome::AlreadyFollowing
    );
    assert_eq!(
        fx.follows.follow(reader.id, "reader").await.unwrap(),
        FollowOutcome::SelfFollow
    );

    let profile = fx
        .posts
        .profile("author", None, Some(reader.id))
        .await
        .unwrap();
    assert!(profile.following);
}

#[tokio::test]
async fn feed_tracks_follow_edges() {
    let fx = fixture();
    let reader = user(&fx, "reader").await;
    let bystander = user(&fx, "bystander").await;
    let author = user(&fx, "author").await;
    fx.posts
        .create(author.id, &post_form("Fresh post", None))
        .await
        .unwrap();

    fx.follows.follow(reader.id, "author").await.unwrap();

    let feed = fx.follows.feed(reader.id, None).await.unwrap();
    assert_eq!(feed.items[0].text, "Fresh post");
    assert!(fx.follows.feed(bystander.id, None).await.unwrap().is_empty());

    assert!(fx.follows.unfollow(reader.id, "author").await.unwrap());
    assert!(!fx.follows.unfollow(reader.id, "author").await.unwrap());
    assert!(fx.follows.feed(reader.id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn group_slugs_are_derived_and_unique() {
    let fx = fixture();
    let form = GroupForm {
        title: "Hello, World!".into(),
        slug: None,
        description: "Greetings".into(),
    };

    let first = fx.groups.create(&form).await.unwrap();
    let second = fx.groups.create(&form).await.unwrap();
    assert_eq!(first.slug, "hello-world");
    assert_eq!(second.slug, "hello-world-2");

    let explicit = GroupForm {
        slug: Some("hello-world".into()),
        ..form
    };
    match fx.groups.create(&explicit).await.unwrap_err() {
        DomainError::Validation(errors) => assert!(errors.contains("slug")),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(fx.groups.list(None).await.unwrap().total, 2);
}

#[tokio::test]
async fn signup_login_and_password_change() {
    let fx = fixture();
    let form = SignupForm {
        first_name: "Snake".into(),
        last_name: "Plissken".into(),
        username: "callMeSnake".into(),
        email: "test_email@mailbox.com".into(),
        password1: "Pass_Word_123".into(),
        password2: "Pass_Word_123".into(),
    };

    let user = fx.accounts.signup(&form).await.unwrap();
    assert_eq!(user.full_name(), "Snake Plissken");
    assert!(matches!(
        fx.accounts.signup(&form).await,
        Err(DomainError::Validation(errors)) if errors.contains("username")
    ));

    let login = LoginForm {
        username: "callMeSnake".into(),
        password: "Pass_Word_123".into(),
    };
    assert_eq!(fx.accounts.authenticate(&login).await.unwrap().id, user.id);

    let wrong_old = PasswordChangeForm {
        old_password: "not-my-password".into(),
        new_password1: "New_Pass_456".into(),
        new_password2: "New_Pass_456".into(),
    };
    assert!(fx.accounts.change_password(user.id, &wrong_old).await.is_err());

    let change = PasswordChangeForm {
        old_password: "Pass_Word_123".into(),
        ..wrong_old
    };
    fx.accounts.change_password(user.id, &change).await.unwrap();

    assert!(fx.accounts.authenticate(&login).await.is_err());
    let relogin = LoginForm {
        password: "New_Pass_456".into(),
        ..login
    };
    assert!(fx.accounts.authenticate(&relogin).await.is_ok());
}

#[tokio::test]
async fn unknown_user_login_is_a_form_error() {
    let fx = fixture();
    let login = LoginForm {
        username: "nobody".into(),
        password: "whatever1".into(),
    };

    match fx.accounts.authenticate(&login).await.unwrap_err() {
        DomainError::Validation(errors) => assert!(errors.contains("__all__")),
        other => panic!("unexpected error: {other:?}"),
    }
}
