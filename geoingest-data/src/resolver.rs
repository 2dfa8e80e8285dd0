//! Lazily populates the projection cache from a definition source.

use std::fmt;

use geoingest_core::{CrsCode, ProjectionCache, ProjectionDefinition};
use proj4rs::proj::Proj;

use crate::definitions::DefinitionSource;

/// Ensures projection definitions are cached before points are transformed.
///
/// Concurrent calls for the same uncached code each fetch; they write the
/// same text so the last writer wins.
pub struct ProjectionResolver {
    cache: ProjectionCache,
    source: Box<dyn DefinitionSource>,
}

impl fmt::Debug for ProjectionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionResolver")
            .field("cache", &self.cache)
            .field("source", &"<dyn DefinitionSource>")
            .finish()
    }
}

impl ProjectionResolver {
    /// Resolve through `source` into the process-wide cache.
    pub fn new(source: impl DefinitionSource + 'static) -> Self {
        Self::with_cache(ProjectionCache::global().clone(), source)
    }

    /// Resolve through `source` into an explicit cache.
    pub fn with_cache(cache: ProjectionCache, source: impl DefinitionSource + 'static) -> Self {
        Self {
            cache,
            source: Box::new(source),
        }
    }

    /// The cache definitions are stored in.
    #[must_use]
    pub const fn cache(&self) -> &ProjectionCache {
        &self.cache
    }

    /// Make sure a definition for `code` is cached, fetching it if needed.
    ///
    /// Returns `true` when a usable definition is available. Fetch failures,
    /// empty responses and text that does not parse as a projection are
    /// logged and reported as `false`; nothing is cached for them.
    ///
    /// # Examples
    /// ```
    /// use geoingest_core::{CrsCode, ProjectionCache};
    /// use geoingest_data::ProjectionResolver;
    /// use geoingest_data::definitions::test_support::{StubDefinitionSource, WEB_MERCATOR, block_on_for_tests};
    ///
    /// let source = StubDefinitionSource::new().with_definition(CrsCode::epsg(3857), WEB_MERCATOR);
    /// let resolver = ProjectionResolver::with_cache(ProjectionCache::new(), source);
    /// assert!(block_on_for_tests(resolver.ensure_definition(&CrsCode::epsg(3857))));
    /// assert!(!block_on_for_tests(resolver.ensure_definition(&CrsCode::epsg(28356))));
    /// ```
    pub async fn ensure_definition(&self, code: &CrsCode) -> bool {
        if self.cache.contains(code) {
            return true;
        }
        let text = match self.source.fetch_definition(code).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("could not fetch projection definition for {code}: {err}");
                return false;
            }
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            log::warn!("projection definition for {code} is empty");
            return false;
        }
        if let Err(err) = Proj::from_proj_string(trimmed) {
            log::warn!("rejected projection definition for {code} ({trimmed}): {err:?}");
            return false;
        }
        self.cache
            .insert(code.clone(), ProjectionDefinition::new(trimmed));
        log::info!("added projection definition for {code} = {trimmed}");
        true
    }
}
