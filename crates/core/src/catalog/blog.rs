//! Blog posts ("news & insights").

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;
use crate::types::{BlogPostId, ImageId, PostStatus, Slug};

#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub slug: Slug,
    pub title: String,
    pub excerpt: String,
    /// Markdown body.
    pub content: String,
    /// Publication date shown on the site.
    pub date: NaiveDate,
    pub author: String,
    pub image_id: Option<ImageId>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Estimated reading time at 200 words per minute, at least one minute.
    #[must_use]
    pub fn reading_time_minutes(&self) -> usize {
        self.content.split_whitespace().count().div_ceil(200).max(1)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostDraft {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    /// `YYYY-MM-DD`; blank means today.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image_id: Option<i32>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPostInput {
    pub slug: Slug,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub date: NaiveDate,
    pub author: String,
    pub image_id: Option<ImageId>,
    pub status: PostStatus,
}

impl BlogPostDraft {
    /// Validate the draft, using `today` when no date was given.
    ///
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self, today: NaiveDate) -> Result<BlogPostInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = errors.required("title", &self.title, 200);
        let slug = errors.slug("slug", &self.slug, &title);
        let excerpt = errors.optional("excerpt", &self.excerpt, 500);
        let content = self.content.trim().to_owned();
        let author = errors.optional("author", &self.author, 120);

        let date = match self.date.trim() {
            "" => Some(today),
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push("date", "must be a date like 2024-05-31");
                    None
                }
            },
        };

        let status = match self.status.trim() {
            "" => PostStatus::Draft,
            raw => raw.parse().unwrap_or_else(|e: crate::types::ParseStatusError| {
                errors.push("status", e.to_string());
                PostStatus::Draft
            }),
        };

        if status == PostStatus::Published && content.is_empty() {
            errors.push("content", "is required before publishing");
        }

        let image_id = errors.image_id("image_id", self.image_id);

        match (slug, date) {
            (Some(slug), Some(date)) if errors.is_empty() => Ok(BlogPostInput {
                slug,
                title,
                excerpt,
                content,
                date,
                author,
                image_id,
                status,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&BlogPost> for BlogPostDraft {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.to_string(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            date: post.date.format("%Y-%m-%d").to_string(),
            author: post.author.clone(),
            image_id: post.image_id.map(|id| id.as_i32()),
            status: post.status.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_blank_date_and_status_default() {
        let draft = BlogPostDraft {
            title: "Arc-resistant switchgear explained".to_string(),
            ..BlogPostDraft::default()
        };
        let input = draft.validate(today()).unwrap();
        assert_eq!(input.date, today());
        assert_eq!(input.status, PostStatus::Draft);
        assert_eq!(input.slug.as_str(), "arc-resistant-switchgear-explained");
    }

    #[test]
    fn test_publishing_requires_content() {
        let draft = BlogPostDraft {
            title: "Empty".to_string(),
            status: "published".to_string(),
            ..BlogPostDraft::default()
        };
        let errors = draft.validate(today()).unwrap_err();
        assert_eq!(errors.get("content"), Some("is required before publishing"));
    }

    #[test]
    fn test_bad_date_and_status() {
        let draft = BlogPostDraft {
            title: "Dates".to_string(),
            date: "31/05/2024".to_string(),
            status: "scheduled".to_string(),
            ..BlogPostDraft::default()
        };
        let errors = draft.validate(today()).unwrap_err();
        assert!(errors.get("date").is_some());
        assert_eq!(errors.get("status"), Some("invalid post status: scheduled"));
    }
}
