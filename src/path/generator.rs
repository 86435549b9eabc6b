//! Bounded cache of compiled path templates.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use crate::params::Params;

use super::{PathError, PathTemplate};

/// Default maximum number of cached templates.
pub const DEFAULT_CACHE_LIMIT: usize = 10_000;

static GLOBAL: LazyLock<PathGenerator> = LazyLock::new(PathGenerator::new);

/// Compiles path templates and remembers them by their literal source.
///
/// The cache is fill-once: it stores templates until `limit` entries exist,
/// after which new templates are compiled on every call and never stored.
/// Existing entries are never evicted.
#[derive(Debug)]
pub struct PathGenerator {
    cache: Mutex<HashMap<String, Arc<PathTemplate>>>,
    limit: usize,
}

impl PathGenerator {
    /// Creates a generator with [`DEFAULT_CACHE_LIMIT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_CACHE_LIMIT)
    }

    /// Creates a generator that caches at most `limit` templates.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            limit,
        }
    }

    /// Returns the compiled form of `template`, from cache when possible.
    pub fn compile(&self, template: &str) -> Arc<PathTemplate> {
        if let Some(hit) = self.cache().get(template) {
            return Arc::clone(hit);
        }

        // Compiled outside the lock; a concurrent miss on the same template
        // compiles twice and keeps whichever entry lands first.
        let compiled = Arc::new(PathTemplate::compile(template));

        let mut cache = self.cache();
        if cache.len() < self.limit {
            return Arc::clone(
                cache
                    .entry(template.to_owned())
                    .or_insert_with(|| Arc::clone(&compiled)),
            );
        }

        compiled
    }

    /// Generates a concrete path from `template` and `params`.
    ///
    /// If `template` is empty or `params` is `None`, the template is returned
    /// unchanged and no substitution is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if a placeholder is missing or has an unusable value.
    pub fn generate(&self, template: &str, params: Option<&Params>) -> Result<String, PathError> {
        match params {
            Some(params) if !template.is_empty() => self.compile(template).render(params),
            _ => Ok(template.to_owned()),
        }
    }

    /// Returns the number of cached templates.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache().len()
    }

    /// Returns the cache limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Arc<PathTemplate>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PathGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a path using the process-wide [`PathGenerator`].
///
/// # Errors
///
/// Returns [`PathError`] if a placeholder is missing or has an unusable value.
pub fn generate_path(template: &str, params: Option<&Params>) -> Result<String, PathError> {
    GLOBAL.generate(template, params)
}
