//! Page request coordination.
//!
//! One query comes in; one of three things goes out: a page (from cache or
//! freshly generated), a no-match outcome, or an error. The coordinator owns
//! the ordering contract: resolve first, then derive the cache key from the
//! matched name (never from the raw query), then consult the store, and only
//! generate on a miss or an expired entry. A generation failure leaves the
//! store untouched.

use chrono::Utc;
use tracing::info;

use crate::config::CacheConfig;
use crate::errors::AppResult;
use crate::generator::GenerationService;
use crate::models::SchoolPage;
use crate::resolver::SchoolResolver;
use crate::store::{canonical_key, PageStore};

/// How the returned page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a fresh cache entry.
    Hit,
    /// No cache entry existed; the page was generated.
    Miss,
    /// A cache entry existed but had expired; the page was regenerated.
    Expired,
}

/// Outcome of a page request that did not error.
#[derive(Debug, Clone)]
pub enum PageResolution {
    Page {
        /// Official catalog name of the matched school.
        name: String,
        html: String,
        cache: CacheStatus,
    },
    /// The query resolved to no catalog school. An ordinary outcome, not an
    /// error.
    NotFound,
}

pub struct PageService {
    resolver: SchoolResolver,
    store: PageStore,
    generation: GenerationService,
    cache: CacheConfig,
}

impl PageService {
    pub fn new(
        resolver: SchoolResolver,
        store: PageStore,
        generation: GenerationService,
        cache: CacheConfig,
    ) -> Self {
        Self {
            resolver,
            store,
            generation,
            cache,
        }
    }

    /// Serve the page for a free-text query.
    pub async fn fetch_page(&self, query: &str) -> AppResult<PageResolution> {
        let Some(resolved) = self.resolver.resolve(query) else {
            info!("No match for query '{}'", query);
            return Ok(PageResolution::NotFound);
        };
        let school = resolved.school;
        info!(
            "Matched \"{}\" to \"{}\" (score {:.3})",
            query, school.name, resolved.score
        );

        let key = canonical_key(&school.name);

        let cache_status = match self.store.get(&key).await? {
            Some(page) if page.is_fresh(Utc::now()) => {
                info!("Cache hit for \"{}\"", school.name);
                return Ok(PageResolution::Page {
                    name: page.name,
                    html: page.html,
                    cache: CacheStatus::Hit,
                });
            }
            Some(_) => {
                info!("Cache entry for \"{}\" has expired, regenerating", school.name);
                CacheStatus::Expired
            }
            None => {
                info!("No cached entry for \"{}\", generating new page", school.name);
                CacheStatus::Miss
            }
        };

        let html = self.generation.generate(&school).await?;

        let created_at = Utc::now();
        let page = SchoolPage {
            name: school.name.clone(),
            html,
            created_at,
            expires_at: self.cache.expires_at(created_at),
        };
        self.store.put(&key, &page).await?;
        info!("Cached page for \"{}\"", school.name);

        Ok(PageResolution::Page {
            name: page.name,
            html: page.html,
            cache: cache_status,
        })
    }
}
