//! Memoised projection definitions keyed by CRS code.
//!
//! Definitions are expensive to obtain (usually a network round trip) and
//! there are only a few dozen codes in practice, so entries are never
//! evicted. The cache is a cheap handle around shared state: clones observe
//! the same entries.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use crate::CrsCode;

static GLOBAL: LazyLock<ProjectionCache> = LazyLock::new(ProjectionCache::new);

/// Opaque PROJ.4 text describing how to build a point transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionDefinition(Arc<str>);

impl ProjectionDefinition {
    /// Wrap definition text as received from a definition source.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// Borrow the definition text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the definition describes a longitude/latitude CRS.
    ///
    /// Transforms expect radians for such systems rather than degrees.
    #[must_use]
    pub fn is_lat_long(&self) -> bool {
        self.0.contains("+proj=longlat") || self.0.contains("+proj=latlong")
    }
}

impl From<&str> for ProjectionDefinition {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ProjectionDefinition {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared map from [`CrsCode`] to [`ProjectionDefinition`].
///
/// # Examples
/// ```
/// use geoingest_core::{CrsCode, ProjectionCache, ProjectionDefinition};
///
/// let cache = ProjectionCache::new();
/// let code = CrsCode::epsg(3857);
/// assert!(!cache.contains(&code));
///
/// cache.insert(code.clone(), ProjectionDefinition::from("+proj=merc +datum=WGS84"));
/// let handle = cache.clone();
/// assert!(handle.contains(&code));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProjectionCache {
    entries: Arc<RwLock<HashMap<CrsCode, ProjectionDefinition>>>,
}

impl ProjectionCache {
    /// Create an empty cache independent of the process-wide instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache, created empty on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Look up the definition stored for `code`.
    #[must_use]
    pub fn get(&self, code: &CrsCode) -> Option<ProjectionDefinition> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(code)
            .cloned()
    }

    /// Whether a definition is stored for `code`.
    #[must_use]
    pub fn contains(&self, code: &CrsCode) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(code)
    }

    /// Store `definition` for `code`, replacing any previous entry.
    ///
    /// Concurrent resolutions of the same code write identical text, so the
    /// last writer wins.
    pub fn insert(&self, code: CrsCode, definition: ProjectionDefinition) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code, definition);
    }

    /// Number of cached definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
