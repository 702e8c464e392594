//! Keyword search across the public catalog.
//!
//! A record matches when any of its searched text fields contains the query
//! as a case-insensitive substring. Hits are grouped by kind in a fixed
//! order: products, published posts, categories, certifications.

use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;

/// Characters of context kept on each side of the match in a snippet.
const SNIPPET_CONTEXT: usize = 60;

/// What kind of record a [`SearchHit`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Product,
    BlogPost,
    Category,
    Certification,
}

impl SearchKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::BlogPost => "Article",
            Self::Category => "Category",
            Self::Certification => "Certification",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub kind: SearchKind,
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Build an `ILIKE` pattern matching `query` anywhere, with the wildcard
/// characters `%`, `_` and the escape `\` taken literally.
#[must_use]
pub fn like_pattern(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 2);
    out.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// A short excerpt of the first field containing `query`, or the start of
/// the first non-empty field when none of them does (e.g. a keyword match).
#[must_use]
pub fn snippet(fields: &[&str], query: &str) -> String {
    let needle = query.to_lowercase();
    for field in fields {
        if let Some(excerpt) = excerpt_around(field, &needle) {
            return excerpt;
        }
    }
    fields
        .iter()
        .find(|f| !f.trim().is_empty())
        .map(|f| truncate_chars(f.trim(), SNIPPET_CONTEXT * 2))
        .unwrap_or_default()
}

fn excerpt_around(text: &str, needle: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let lowered: Vec<String> = chars.iter().map(|c| c.to_lowercase().collect()).collect();
    let needle_chars: Vec<char> = needle.chars().collect();
    if needle_chars.is_empty() {
        return None;
    }

    // Match on lowercased characters so positions stay in char units.
    let haystack: Vec<char> = lowered.iter().flat_map(|s| s.chars()).collect();
    if haystack.len() != chars.len() {
        // Lowercasing changed the length; fall back to a prefix excerpt.
        return text
            .to_lowercase()
            .contains(needle)
            .then(|| truncate_chars(text.trim(), SNIPPET_CONTEXT * 2));
    }

    let start = haystack
        .windows(needle_chars.len())
        .position(|w| w == needle_chars.as_slice())?;
    let from = start.saturating_sub(SNIPPET_CONTEXT);
    let to = (start + needle_chars.len() + SNIPPET_CONTEXT).min(chars.len());

    let mut out = String::new();
    if from > 0 {
        out.push('…');
    }
    out.extend(chars.iter().skip(from).take(to - from));
    if to < chars.len() {
        out.push('…');
    }
    Some(out.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn truncate_chars(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push('…');
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(sqlx::FromRow)]
struct TextRow {
    title: String,
    slug: String,
    a: String,
    b: String,
}

/// Run the keyword search. At most `limit_per_kind` hits are returned for
/// each kind. A blank query returns nothing.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any of the queries fail.
pub async fn search(
    pool: &PgPool,
    query: &str,
    limit_per_kind: i64,
) -> Result<Vec<SearchHit>, RepositoryError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = like_pattern(query);

    let products: Vec<TextRow> = sqlx::query_as(
        "SELECT title, slug, description AS a, '' AS b FROM product \
         WHERE title ILIKE $1 OR description ILIKE $1 \
         ORDER BY title LIMIT $2",
    )
    .bind(&pattern)
    .bind(limit_per_kind)
    .fetch_all(pool)
    .await?;

    let posts: Vec<TextRow> = sqlx::query_as(
        "SELECT title, slug, excerpt AS a, content AS b FROM blog_post \
         WHERE status = 'published' \
           AND (title ILIKE $1 OR excerpt ILIKE $1 OR content ILIKE $1) \
         ORDER BY date DESC, id DESC LIMIT $2",
    )
    .bind(&pattern)
    .bind(limit_per_kind)
    .fetch_all(pool)
    .await?;

    let categories: Vec<TextRow> = sqlx::query_as(
        "SELECT name AS title, slug, description AS a, array_to_string(keywords, ', ') AS b \
         FROM category \
         WHERE name ILIKE $1 OR description ILIKE $1 \
            OR EXISTS (SELECT 1 FROM unnest(keywords) AS k WHERE k ILIKE $1) \
         ORDER BY level, name LIMIT $2",
    )
    .bind(&pattern)
    .bind(limit_per_kind)
    .fetch_all(pool)
    .await?;

    let certifications: Vec<TextRow> = sqlx::query_as(
        "SELECT name AS title, '' AS slug, issuing_body AS a, description AS b \
         FROM certification \
         WHERE name ILIKE $1 OR issuing_body ILIKE $1 OR description ILIKE $1 \
         ORDER BY name LIMIT $2",
    )
    .bind(&pattern)
    .bind(limit_per_kind)
    .fetch_all(pool)
    .await?;

    let mut hits = Vec::with_capacity(
        products.len() + posts.len() + categories.len() + certifications.len(),
    );
    hits.extend(products.into_iter().map(|r| SearchHit {
        kind: SearchKind::Product,
        url: format!("/products/{}", r.slug),
        snippet: snippet(&[&r.title, &r.a], query),
        title: r.title,
    }));
    hits.extend(posts.into_iter().map(|r| SearchHit {
        kind: SearchKind::BlogPost,
        url: format!("/blog/{}", r.slug),
        snippet: snippet(&[&r.a, &r.b, &r.title], query),
        title: r.title,
    }));
    hits.extend(categories.into_iter().map(|r| SearchHit {
        kind: SearchKind::Category,
        url: format!("/categories/{}", r.slug),
        snippet: snippet(&[&r.a, &r.b, &r.title], query),
        title: r.title,
    }));
    hits.extend(certifications.into_iter().map(|r| SearchHit {
        kind: SearchKind::Certification,
        url: "/certifications".to_owned(),
        snippet: snippet(&[&r.b, &r.a], query),
        title: r.title,
    }));

    tracing::debug!(query, hits = hits.len(), "search completed");
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("11kV"), "%11kV%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_snippet_centers_on_match() {
        let text = format!("{} vacuum interrupter {}", "x ".repeat(60), "y ".repeat(60));
        let s = snippet(&[&text], "VACUUM");
        assert!(s.starts_with('…'));
        assert!(s.ends_with('…'));
        assert!(s.contains("vacuum interrupter"));
    }

    #[test]
    fn test_snippet_uses_first_matching_field() {
        let s = snippet(&["Withdrawable breaker", "Rated for 12 kV"], "12 kv");
        assert_eq!(s, "Rated for 12 kV");
    }

    #[test]
    fn test_snippet_falls_back_to_first_field() {
        assert_eq!(snippet(&["", "Metal-clad switchgear"], "mv"), "Metal-clad switchgear");
        assert_eq!(snippet(&[], "mv"), "");
    }
}
