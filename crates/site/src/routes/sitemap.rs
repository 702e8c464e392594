//! `sitemap.xml` for crawlers.

use std::fmt::Write as _;

use axum::{
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::instrument;

use kestrel_core::db::{BlogPostRepository, CategoryRepository, ProductRepository};

use crate::error::Result;
use crate::state::AppState;

/// Pages that always exist, relative to the base URL.
const STATIC_PATHS: &[&str] = &[
    "/",
    "/products",
    "/categories",
    "/blog",
    "/certifications",
    "/industries",
    "/calculators",
    "/contact",
    "/about",
    "/privacy",
    "/terms",
];

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub path: String,
    pub last_modified: Option<NaiveDate>,
}

impl SitemapEntry {
    fn new(path: impl Into<String>, last_modified: Option<NaiveDate>) -> Self {
        Self {
            path: path.into(),
            last_modified,
        }
    }
}

/// Render entries as a sitemap document. Paths are joined to `base_url`.
#[must_use]
pub fn render(base_url: &str, entries: &[SitemapEntry]) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape(&format!("{base}{}", entry.path)));
        if let Some(date) = entry.last_modified {
            let _ = writeln!(xml, "    <lastmod>{date}</lastmod>");
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// `GET /sitemap.xml`
#[instrument(skip(state))]
pub async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let products_repo = ProductRepository::new(pool);
    let categories_repo = CategoryRepository::new(pool);
    let posts_repo = BlogPostRepository::new(pool);
    let (products, categories, posts) = tokio::try_join!(
        products_repo.list(),
        categories_repo.list(),
        posts_repo.list_published(None),
    )?;

    let mut entries: Vec<SitemapEntry> = STATIC_PATHS
        .iter()
        .map(|path| SitemapEntry::new(*path, None))
        .collect();
    entries.extend(
        state
            .content()
            .industries()
            .iter()
            .map(|i| SitemapEntry::new(format!("/industries/{}", i.slug), None)),
    );
    entries.extend(products.iter().map(|p| {
        SitemapEntry::new(
            format!("/products/{}", p.slug),
            Some(p.updated_at.date_naive()),
        )
    }));
    entries.extend(categories.iter().map(|c| {
        SitemapEntry::new(
            format!("/categories/{}", c.slug),
            Some(c.updated_at.date_naive()),
        )
    }));
    entries.extend(
        posts
            .iter()
            .map(|p| {
                SitemapEntry::new(format!("/blog/{}", p.slug), Some(p.updated_at.date_naive()))
            }),
    );

    let body = render(&state.config().base_url, &entries);
    Ok((
        [
            (CONTENT_TYPE, "application/xml; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_base_url() {
        let xml = render(
            "https://kestrel-switchgear.com/",
            &[
                SitemapEntry::new("/", None),
                SitemapEntry::new(
                    "/products/rmu-12",
                    NaiveDate::from_ymd_opt(2026, 3, 1),
                ),
            ],
        );
        assert!(xml.contains("<loc>https://kestrel-switchgear.com/</loc>"));
        assert!(xml.contains("<loc>https://kestrel-switchgear.com/products/rmu-12</loc>"));
        assert!(xml.contains("<lastmod>2026-03-01</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a&b<c>"), "a&amp;b&lt;c&gt;");
    }
}
