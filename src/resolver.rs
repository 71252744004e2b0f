//! Resolver stages
//!
//! - [`LocalizedResourceResolver`]: swaps the candidate roots for the first
//!   `<lang>/` subdirectory that exists and delegates to the rest of the chain
//! - [`PathResourceResolver`]: terminal stage, finds the requested file
//! - [`CachingResourceResolver`]: optional memoization in front of the others

use std::collections::HashMap;
use std::io;
use std::slice;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::chain::{ResolverChain, ResourceResolver};
use crate::error::{ResolveError, Result};
use crate::location::{validate_relative, ResourceLocation};
use crate::request::RequestView;
use crate::selector::{LanguageCode, LanguageSelector};

/// Language used when a request names none.
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en";

/// Rewrites the candidate locations to their language-specific subdirectory.
#[derive(Debug, Clone)]
pub struct LocalizedResourceResolver {
    selector: LanguageSelector,
    fallback: String,
}

impl Default for LocalizedResourceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_LANGUAGE)
    }
}

impl LocalizedResourceResolver {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            selector: LanguageSelector::default(),
            fallback: fallback.into(),
        }
    }

    pub fn with_selector(mut self, selector: LanguageSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn selector(&self) -> &LanguageSelector {
        &self.selector
    }
}

/// Resolve through the first location that has a subdirectory for the
/// request language, using `fallback` when the request names none.
///
/// Locations are tried in order and the first match wins; the chain then
/// sees only that one localized location and its answer is returned as-is.
pub fn resolve_localized<L: ResourceLocation>(
    selector: &LanguageSelector,
    request: &dyn RequestView,
    request_path: &str,
    locations: &[L],
    fallback: &str,
    chain: ResolverChain<'_, L>,
) -> Result<Option<L>> {
    let language = selector.select(request, fallback);

    // "/" would resolve to the unlocalized root itself.
    if language.is_empty() {
        debug!(path = request_path, "empty language code");
        return Err(ResolveError::unsupported_language(language.as_str()));
    }

    match find_localized_root(&language, locations)? {
        Some(localized) => {
            debug!(
                language = %language,
                root = %localized.description(),
                path = request_path,
                "delegating to localized root"
            );
            chain.resolve_resource(request, request_path, slice::from_ref(&localized))
        }
        None => {
            debug!(language = %language, candidates = locations.len(), "no localized root");
            Err(ResolveError::unsupported_language(language.as_str()))
        }
    }
}

/// Child path for a language. A language is a single path segment.
fn language_child_path(language: &LanguageCode) -> io::Result<String> {
    if language.as_str().contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("language {:?} contains a path separator", language.as_str()),
        ));
    }
    Ok(language.child_path())
}

/// First `<lang>/` child that exists, in location order.
fn find_localized_root<L: ResourceLocation>(
    language: &LanguageCode,
    locations: &[L],
) -> Result<Option<L>> {
    for location in locations {
        let localized = language_child_path(language)
            .and_then(|child| location.create_relative(&child))
            .map_err(|source| {
                warn!(root = %location.description(), error = %source, "failed to derive localized root");
                ResolveError::resource_access(location.description(), source)
            })?;

        if localized.exists() {
            return Ok(Some(localized));
        }
    }

    Ok(None)
}

impl<L: ResourceLocation> ResourceResolver<L> for LocalizedResourceResolver {
    fn resolve_resource(
        &self,
        request: &dyn RequestView,
        request_path: &str,
        locations: &[L],
        chain: ResolverChain<'_, L>,
    ) -> Result<Option<L>> {
        resolve_localized(&self.selector, request, request_path, locations, &self.fallback, chain)
    }

    fn resolve_url_path(
        &self,
        _resource_path: &str,
        _locations: &[L],
        _chain: ResolverChain<'_, L>,
    ) -> Result<Option<String>> {
        Err(ResolveError::UnsupportedOperation {
            operation: "resolve_url_path",
        })
    }
}

/// Terminal stage: looks `request_path` up under each location in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResourceResolver;

impl PathResourceResolver {
    fn lookup<L: ResourceLocation>(&self, request_path: &str, locations: &[L]) -> Result<Option<L>> {
        let relative = request_path.trim_start_matches('/');
        if !is_valid_path(request_path) || validate_relative(relative).is_err() {
            debug!(path = request_path, "rejected invalid path");
            return Ok(None);
        }

        for location in locations {
            let candidate = location
                .create_relative(relative)
                .map_err(|source| ResolveError::resource_access(location.description(), source))?;

            if candidate.is_readable() {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }
}

impl<L: ResourceLocation> ResourceResolver<L> for PathResourceResolver {
    fn resolve_resource(
        &self,
        _request: &dyn RequestView,
        request_path: &str,
        locations: &[L],
        _chain: ResolverChain<'_, L>,
    ) -> Result<Option<L>> {
        self.lookup(request_path, locations)
    }

    fn resolve_url_path(
        &self,
        resource_path: &str,
        locations: &[L],
        _chain: ResolverChain<'_, L>,
    ) -> Result<Option<String>> {
        Ok(self
            .lookup(resource_path, locations)?
            .map(|_| resource_path.to_string()))
    }
}

/// Paths that must never reach a location.
fn is_valid_path(path: &str) -> bool {
    !path.contains('\0')
        && !path.contains('\\')
        && !path.split('/').any(|segment| segment == "..")
}

/// Remembers successful resolutions of the stages behind it.
///
/// Entries are keyed by the request path plus the selected language, so two
/// requests asking for different languages never share an entry, and entries
/// are bounded by files times languages that actually resolve. Failures and
/// misses are not cached.
#[derive(Debug)]
pub struct CachingResourceResolver<L> {
    selector: LanguageSelector,
    fallback: String,
    resources: Mutex<HashMap<String, L>>,
    url_paths: Mutex<HashMap<String, String>>,
}

impl<L> Default for CachingResourceResolver<L> {
    fn default() -> Self {
        Self::new(LanguageSelector::default(), DEFAULT_FALLBACK_LANGUAGE)
    }
}

impl<L> CachingResourceResolver<L> {
    /// `selector` and `fallback` must match the localized stage behind this one.
    pub fn new(selector: LanguageSelector, fallback: impl Into<String>) -> Self {
        Self {
            selector,
            fallback: fallback.into(),
            resources: Mutex::new(HashMap::new()),
            url_paths: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.resources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cache_key(&self, request: &dyn RequestView, request_path: &str) -> String {
        let language = self.selector.select(request, &self.fallback);
        format!("resolvedResource:{request_path}|{language}")
    }
}

impl<L: ResourceLocation> ResourceResolver<L> for CachingResourceResolver<L> {
    fn resolve_resource(
        &self,
        request: &dyn RequestView,
        request_path: &str,
        locations: &[L],
        chain: ResolverChain<'_, L>,
    ) -> Result<Option<L>> {
        let key = self.cache_key(request, request_path);

        let cached = self
            .resources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned();
        if let Some(resource) = cached {
            debug!(key = %key, "resource cache hit");
            return Ok(Some(resource));
        }

        let resolved = chain.resolve_resource(request, request_path, locations)?;
        if let Some(resource) = &resolved {
            self.resources
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(key, resource.clone());
        }

        Ok(resolved)
    }

    fn resolve_url_path(
        &self,
        resource_path: &str,
        locations: &[L],
        chain: ResolverChain<'_, L>,
    ) -> Result<Option<String>> {
        let key = format!("resolvedUrlPath:{resource_path}");

        let cached = self
            .url_paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned();
        if cached.is_some() {
            return Ok(cached);
        }

        let resolved = chain.resolve_url_path(resource_path, locations)?;
        if let Some(url) = &resolved {
            self.url_paths
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(key, url.clone());
        }

        Ok(resolved)
    }
}
