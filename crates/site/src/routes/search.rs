//! Keyword search page and JSON endpoint.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kestrel_core::db::{self, SearchHit};

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Hits returned per record kind.
const LIMIT_PER_KIND: i64 = 20;

/// Queries longer than this are rejected.
const MAX_QUERY_CHARS: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

impl SearchQuery {
    fn checked(&self) -> Result<&str> {
        let q = self.q.trim();
        if q.chars().count() > MAX_QUERY_CHARS {
            return Err(AppError::BadRequest(format!(
                "search query must be at most {MAX_QUERY_CHARS} characters"
            )));
        }
        Ok(q)
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

async fn run(state: &AppState, query: &str) -> Result<Vec<SearchHit>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    crate::error::add_breadcrumb("search", query);
    Ok(db::search(state.pool(), query, LIMIT_PER_KIND).await?)
}

/// `GET /search?q=`
#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let q = query.checked()?;
    let hits = run(&state, q).await?;
    Ok(SearchTemplate {
        query: q.to_owned(),
        hits,
    })
}

/// `GET /api/search?q=`
#[instrument(skip(state))]
pub async fn api(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let q = query.checked()?;
    let hits = run(&state, q).await?;
    Ok(Json(SearchResponse {
        query: q.to_owned(),
        hits,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_trimmed() {
        let query = SearchQuery {
            q: "  vacuum breaker ".to_string(),
        };
        assert_eq!(query.checked().unwrap(), "vacuum breaker");
    }

    #[test]
    fn test_overlong_query_rejected() {
        let query = SearchQuery {
            q: "x".repeat(MAX_QUERY_CHARS + 1),
        };
        assert!(matches!(query.checked(), Err(AppError::BadRequest(_))));
    }
}
