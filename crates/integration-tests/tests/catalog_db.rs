//! Repository and search behavior against a real `PostgreSQL`.
//!
//! Each test gets a fresh migrated database from `#[sqlx::test]`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::NaiveDate;
use sqlx::PgPool;

use kestrel_core::catalog::{BlogPostInput, CategoryInput, CertificationInput, ProductInput};
use kestrel_core::db::{
    BlogPostRepository, CategoryRepository, CertificationRepository, ProductRepository,
    RepositoryError, SearchKind, search,
};
use kestrel_core::{PostStatus, Slug};

fn slug(s: &str) -> Slug {
    Slug::parse(s).unwrap()
}

fn product(title: &str, slug_str: &str, description: &str) -> ProductInput {
    ProductInput {
        title: title.to_owned(),
        slug: slug(slug_str),
        description: description.to_owned(),
        specs: Vec::new(),
        applications: Vec::new(),
        image_id: None,
        category: slug("circuit-breakers"),
    }
}

fn post(title: &str, slug_str: &str, content: &str, status: PostStatus) -> BlogPostInput {
    BlogPostInput {
        slug: slug(slug_str),
        title: title.to_owned(),
        excerpt: String::new(),
        content: content.to_owned(),
        date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        author: "Kestrel Engineering".to_owned(),
        image_id: None,
        status,
    }
}

async fn seed(pool: &PgPool) {
    let products = ProductRepository::new(pool);
    products
        .create(&product(
            "Vacuum Circuit Breaker",
            "vacuum-circuit-breaker",
            "Withdrawable breaker for 12 kV switchgear with 50% less maintenance.",
        ))
        .await
        .unwrap();
    products
        .create(&product(
            "Ring Main Unit",
            "ring-main-unit",
            "Compact unit rated 500 A.",
        ))
        .await
        .unwrap();

    let posts = BlogPostRepository::new(pool);
    posts
        .create(&post(
            "Busbar sizing explained",
            "busbar-sizing",
            "How we size copper for switchgear panels.",
            PostStatus::Published,
        ))
        .await
        .unwrap();
    posts
        .create(&post(
            "Busbar retrofit guide",
            "busbar-retrofit",
            "Unreleased switchgear notes.",
            PostStatus::Draft,
        ))
        .await
        .unwrap();

    CategoryRepository::new(pool)
        .create(&CategoryInput {
            name: "Medium-voltage switchgear".to_owned(),
            slug: slug("mv-switchgear"),
            description: "Panels from 3.3 kV to 36 kV.".to_owned(),
            content: String::new(),
            keywords: vec!["metal-clad".to_owned()],
            level: 1,
            parent_category: None,
        })
        .await
        .unwrap();

    CertificationRepository::new(pool)
        .create(&CertificationInput {
            name: "IEC 62271-200".to_owned(),
            issuing_body: "KEMA Labs".to_owned(),
            description: "Type test for metal-enclosed switchgear.".to_owned(),
            image_id: None,
        })
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_search_is_case_insensitive(pool: PgPool) {
    seed(&pool).await;

    let hits = search(&pool, "vACUUM circuit", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, SearchKind::Product);
    assert_eq!(hits[0].title, "Vacuum Circuit Breaker");
    assert_eq!(hits[0].url, "/products/vacuum-circuit-breaker");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    seed(&pool).await;

    let hits = search(&pool, "50%", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Vacuum Circuit Breaker");

    let hits = search(&pool, "%", 10).await.unwrap();
    assert_eq!(hits.len(), 1);

    // "500 A" would match if `_` were a single-character wildcard.
    assert!(search(&pool, "5_0", 10).await.unwrap().is_empty());
    assert!(search(&pool, "_", 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_search_skips_draft_posts(pool: PgPool) {
    seed(&pool).await;

    let hits = search(&pool, "busbar", 10).await.unwrap();
    let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, ["Busbar sizing explained"]);

    assert!(search(&pool, "retrofit", 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_search_groups_hits_by_kind(pool: PgPool) {
    seed(&pool).await;

    let hits = search(&pool, "SWITCHGEAR", 10).await.unwrap();
    let kinds: Vec<SearchKind> = hits.iter().map(|h| h.kind).collect();
    assert_eq!(
        kinds,
        [
            SearchKind::Product,
            SearchKind::BlogPost,
            SearchKind::Category,
            SearchKind::Certification,
        ]
    );
    assert_eq!(hits[3].url, "/certifications");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_search_limits_each_kind(pool: PgPool) {
    seed(&pool).await;

    let hits = search(&pool, "switchgear", 1).await.unwrap();
    assert_eq!(hits.len(), 4);
    assert!(search(&pool, "   ", 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_product_slug_conflicts(pool: PgPool) {
    seed(&pool).await;

    let err = ProductRepository::new(&pool)
        .create(&product("Another breaker", "vacuum-circuit-breaker", ""))
        .await
        .unwrap_err();
    assert!(
        matches!(err, RepositoryError::Conflict(ref message) if message.contains("slug")),
        "{err:?}"
    );
    assert_eq!(ProductRepository::new(&pool).count().await.unwrap(), 2);
}
