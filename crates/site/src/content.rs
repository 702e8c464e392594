//! Markdown content loaded from disk at startup.
//!
//! ```text
//! content/
//! ├── pages/        about.md, privacy.md, terms.md
//! └── industries/   one file per industry served
//! ```
//!
//! Each file carries YAML front matter. The file stem becomes the slug.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Front matter for static pages (about, privacy, terms).
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// Front matter for an industry page.
#[derive(Debug, Clone, Deserialize)]
pub struct IndustryMeta {
    pub title: String,
    /// One-sentence summary for cards and meta descriptions.
    pub summary: String,
    /// Sort position on the index page; lower first.
    #[serde(default)]
    pub order: i32,
    /// Category slugs whose products are relevant to this industry.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// A rendered markdown document.
#[derive(Debug, Clone)]
pub struct Document<M> {
    pub slug: String,
    pub meta: M,
    pub content_html: String,
}

pub type Page = Document<PageMeta>;
pub type Industry = Document<IndustryMeta>;

/// In-memory store of all markdown content.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
    industries: Arc<Vec<Industry>>,
}

impl ContentStore {
    /// Load all content below `content_dir`. Missing subdirectories are
    /// treated as empty; individual files that fail to parse are logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing directory cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let pages = load_dir::<PageMeta>(&content_dir.join("pages"))?
            .into_iter()
            .map(|page| (page.slug.clone(), page))
            .collect();

        let mut industries = load_dir::<IndustryMeta>(&content_dir.join("industries"))?;
        industries.sort_by(|a, b| {
            a.meta
                .order
                .cmp(&b.meta.order)
                .then_with(|| a.meta.title.cmp(&b.meta.title))
        });

        Ok(Self {
            pages: Arc::new(pages),
            industries: Arc::new(industries),
        })
    }

    #[must_use]
    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Industries in display order.
    #[must_use]
    pub fn industries(&self) -> &[Industry] {
        &self.industries
    }

    #[must_use]
    pub fn industry(&self, slug: &str) -> Option<&Industry> {
        self.industries.iter().find(|i| i.slug == slug)
    }
}

fn load_dir<M: DeserializeOwned>(dir: &Path) -> Result<Vec<Document<M>>, ContentError> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "content directory does not exist");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))?;
    let mut docs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        match load_document(&path) {
            Ok(doc) => {
                tracing::debug!(slug = %doc.slug, "loaded content");
                docs.push(doc);
            }
            Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to load content"),
        }
    }

    Ok(docs)
}

fn load_document<M: DeserializeOwned>(path: &Path) -> Result<Document<M>, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("invalid filename".to_string()))?
        .to_string();

    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<M> = matter
        .parse(&raw)
        .map_err(|e| ContentError::Parse(format!("failed to parse front matter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("missing front matter".to_string()))?;

    Ok(Document {
        slug,
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render GitHub-flavoured markdown to HTML. Raw HTML in the source is
/// escaped, since category and post bodies come from the CMS.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    markdown_to_html(content, &options)
}

/// Content loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_load_pages_and_sorted_industries() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            &tmp.path().join("pages"),
            "about.md",
            "---\ntitle: About us\n---\nWe build **switchgear**.\n",
        );
        write(
            &tmp.path().join("industries"),
            "mining.md",
            "---\ntitle: Mining\nsummary: Rugged gear\norder: 2\n---\nBody\n",
        );
        write(
            &tmp.path().join("industries"),
            "utilities.md",
            "---\ntitle: Utilities\nsummary: Grid gear\norder: 1\ncategories: [ring-main-units]\n---\nBody\n",
        );
        write(&tmp.path().join("industries"), "notes.txt", "ignored");

        let store = ContentStore::load(tmp.path()).unwrap();

        let about = store.page("about").unwrap();
        assert_eq!(about.meta.title, "About us");
        assert!(about.content_html.contains("<strong>switchgear</strong>"));

        let slugs: Vec<_> = store.industries().iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["utilities", "mining"]);
        assert_eq!(
            store.industry("utilities").unwrap().meta.categories,
            vec!["ring-main-units"]
        );
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ContentStore::load(&tmp.path().join("nope")).unwrap();
        assert!(store.industries().is_empty());
        assert!(store.page("about").is_none());
    }

    #[test]
    fn test_file_without_front_matter_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write(&tmp.path().join("pages"), "terms.md", "No front matter here.\n");
        let store = ContentStore::load(tmp.path()).unwrap();
        assert!(store.page("terms").is_none());
    }

    #[test]
    fn test_render_markdown_escapes_raw_html() {
        let html = render_markdown("| a |\n|---|\n| 1 |\n\n<script>alert(1)</script>");
        assert!(html.contains("<table>"));
        assert!(!html.contains("<script>"));
    }
}
