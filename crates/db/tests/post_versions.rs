//! Integration tests for the version workflow in `PostVersionRepo`.
//!
//! - `publish` leaves exactly one published version and demotes the previous one
//! - `save_draft` overwrites an existing draft in place
//! - `save_draft` seeds a new draft from the published version
//! - the partial unique index rejects a second published row
//! - deleting a post removes every version

use assert_matches::assert_matches;
use quill_core::status::PublicationStatus;
use quill_db::models::post::CreatePost;
use quill_db::models::post_version::{DraftContent, VersionContent};
use quill_db::models::user::CreateUser;
use quill_db::repositories::{PostRepo, PostVersionRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, name: &str) -> i64 {
    let input = CreateUser {
        name: name.to_string(),
        email: format!("{name}@example.com"),
        password_hash: "not-a-real-hash".to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

async fn seed_post(pool: &PgPool, user_id: i64, title: &str) -> i64 {
    let input = CreatePost {
        user_id,
        title: title.to_string(),
        slug: None,
        content_markdown: format!("# {title}"),
        content_json: serde_json::json!({ "type": "doc" }),
    };
    PostRepo::create(pool, &input, &[]).await.unwrap()
}

async fn published_count(pool: &PgPool, post_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM post_versions WHERE post_id = $1 AND status = 'published'",
    )
    .bind(post_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a second draft directly so the post has two versions to choose from.
async fn extra_draft(pool: &PgPool, post_id: i64, author_id: i64, title: &str) -> i64 {
    let mut conn = pool.acquire().await.unwrap();
    let content = VersionContent {
        title: title.to_string(),
        content_markdown: String::new(),
        content_json: serde_json::json!({}),
    };
    PostVersionRepo::create_draft_in(&mut *conn, post_id, author_id, &content)
        .await
        .unwrap()
        .id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_post_starts_with_single_draft(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, user, "Hello").await;

    let versions = PostVersionRepo::list_for_post(&pool, post_id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].status, PublicationStatus::Draft);
    assert_eq!(versions[0].author_id, user);
    assert_eq!(versions[0].content_markdown, "# Hello");

    let post = PostRepo::find_by_id(&pool, post_id).await.unwrap().unwrap();
    assert_eq!(post.status, PublicationStatus::Draft);
    assert_eq!(post.version_id, Some(versions[0].id));
    assert_eq!(post.author_name, "author");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publish_demotes_previous_version(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, user, "Hello").await;
    let first = PostVersionRepo::list_for_post(&pool, post_id).await.unwrap()[0].id;
    let second = extra_draft(&pool, post_id, user, "Second").await;

    let published = PostVersionRepo::publish(&pool, first).await.unwrap().unwrap();
    assert_eq!(published.status, PublicationStatus::Published);

    let published = PostVersionRepo::publish(&pool, second).await.unwrap().unwrap();
    assert_eq!(published.id, second);

    let first_row = PostVersionRepo::find_by_id(&pool, first).await.unwrap().unwrap();
    assert_eq!(
        first_row.status,
        PublicationStatus::Draft,
        "previously published version must be demoted"
    );
    assert!(first_row.published_at.is_none());
    assert!(published.published_at.is_some());
    assert_eq!(published_count(&pool, post_id).await, 1);

    // Demotion is not an edit, so the published version stays the head.
    let post = PostRepo::find_by_id(&pool, post_id).await.unwrap().unwrap();
    assert_eq!(post.status, PublicationStatus::Published);
    assert_eq!(post.version_id, Some(second));
    assert_eq!(post.content_markdown.as_deref(), Some(""));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_republish_is_idempotent(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, user, "Hello").await;
    let version = PostVersionRepo::list_for_post(&pool, post_id).await.unwrap()[0].id;

    PostVersionRepo::publish(&pool, version).await.unwrap();
    PostVersionRepo::publish(&pool, version).await.unwrap();

    assert_eq!(published_count(&pool, post_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publish_unknown_version_returns_none(pool: PgPool) {
    let result = PostVersionRepo::publish(&pool, 999_999).await.unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unique_index_rejects_second_published(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, user, "Hello").await;
    let first = PostVersionRepo::list_for_post(&pool, post_id).await.unwrap()[0].id;
    let second = extra_draft(&pool, post_id, user, "Second").await;
    PostVersionRepo::publish(&pool, first).await.unwrap();

    let err = sqlx::query("UPDATE post_versions SET status = 'published' WHERE id = $1")
        .bind(second)
        .execute(&pool)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        sqlx::Error::Database(db) if db.constraint() == Some("uq_post_versions_one_published")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_draft_overwrites_existing_draft(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, user, "Hello").await;
    let original = PostVersionRepo::list_for_post(&pool, post_id).await.unwrap()[0].clone();

    let saved = PostVersionRepo::save_draft(
        &pool,
        post_id,
        user,
        DraftContent {
            content_markdown: Some("edited".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert!(!saved.created, "existing draft must be reused");
    assert_eq!(saved.version.id, original.id);
    assert_eq!(saved.version.content_markdown, "edited");
    assert_eq!(saved.version.title, original.title, "unset fields are kept");
    assert_eq!(
        PostVersionRepo::list_for_post(&pool, post_id).await.unwrap().len(),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_draft_seeds_from_published(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, user, "Hello").await;
    let version = PostVersionRepo::list_for_post(&pool, post_id).await.unwrap()[0].id;
    PostVersionRepo::publish(&pool, version).await.unwrap();

    let saved = PostVersionRepo::save_draft(
        &pool,
        post_id,
        user,
        DraftContent {
            title: Some("Hello v2".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert!(saved.created);
    assert_ne!(saved.version.id, version);
    assert_eq!(saved.version.status, PublicationStatus::Draft);
    assert_eq!(saved.version.title, "Hello v2");
    assert_eq!(
        saved.version.content_markdown, "# Hello",
        "content is copied from the published version"
    );

    // The post stays published, and its head content is now the new draft.
    let post = PostRepo::find_by_id(&pool, post_id).await.unwrap().unwrap();
    assert_eq!(post.status, PublicationStatus::Published);
    assert_eq!(post.version_id, Some(saved.version.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_draft_for_missing_post(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let saved = PostVersionRepo::save_draft(&pool, 424_242, user, DraftContent::default())
        .await
        .unwrap();
    assert!(saved.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_draft_content_skips_published(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, user, "Hello").await;
    let version = PostVersionRepo::list_for_post(&pool, post_id).await.unwrap()[0].id;
    PostVersionRepo::publish(&pool, version).await.unwrap();

    let content = VersionContent {
        title: "Nope".to_string(),
        content_markdown: "nope".to_string(),
        content_json: serde_json::json!({}),
    };
    let result = PostVersionRepo::update_draft_content(&pool, version, &content)
        .await
        .unwrap();
    assert!(result.is_none(), "published versions are not auto-saved");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_post_removes_versions(pool: PgPool) {
    let user = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, user, "Hello").await;
    extra_draft(&pool, post_id, user, "Second").await;

    assert!(PostRepo::delete(&pool, post_id).await.unwrap());
    assert!(!PostRepo::delete(&pool, post_id).await.unwrap());

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM post_versions WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}
