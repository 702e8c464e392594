//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use kestrel_core::ImageId;
use kestrel_core::catalog::Image;

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::services::SalesNotifier;

/// Upper bound on cached image bytes (64 MiB).
const IMAGE_CACHE_BYTES: u64 = 64 * 1024 * 1024;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    content: ContentStore,
    images: Cache<ImageId, Arc<Image>>,
    notifier: Option<SalesNotifier>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: SiteConfig,
        pool: PgPool,
        content: ContentStore,
        notifier: Option<SalesNotifier>,
    ) -> Self {
        // Images are immutable once uploaded; weigh by byte size so a few
        // large photos cannot evict everything else.
        let images = Cache::builder()
            .max_capacity(IMAGE_CACHE_BYTES)
            .weigher(|_id: &ImageId, image: &Arc<Image>| {
                u32::try_from(image.data.len()).unwrap_or(u32::MAX)
            })
            .time_to_live(Duration::from_secs(3600))
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                content,
                images,
                notifier,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Markdown pages and industry write-ups loaded at startup.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    #[must_use]
    pub fn image_cache(&self) -> &Cache<ImageId, Arc<Image>> {
        &self.inner.images
    }

    /// Sales email notifier, present only when SMTP is configured.
    #[must_use]
    pub fn notifier(&self) -> Option<&SalesNotifier> {
        self.inner.notifier.as_ref()
    }
}
