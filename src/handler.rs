//! Resource handler registration
//!
//! A [`ResourceHandler`] binds a URL pattern to base locations and a resolver
//! chain. The chain is assembled as:
//! 1. [`CachingResourceResolver`] when caching is turned on
//! 2. the resolvers added in registration order
//! 3. [`PathResourceResolver`] as the terminal stage

use tracing::debug;

use crate::chain::{ResolverChain, ResourceResolver};
use crate::config::HandlerConfig;
use crate::error::Result;
use crate::location::ResourceLocation;
use crate::request::RequestView;
use crate::resolver::{
    CachingResourceResolver, LocalizedResourceResolver, PathResourceResolver,
    DEFAULT_FALLBACK_LANGUAGE,
};
use crate::selector::LanguageSelector;

pub struct ResourceHandler<L: ResourceLocation> {
    pattern: String,
    locations: Vec<L>,
    resolvers: Vec<Box<dyn ResourceResolver<L>>>,
    caching: bool,
}

/// Builder mirroring handler registration: pattern, locations, chain, resolvers.
pub struct ResourceHandlerBuilder<L: ResourceLocation> {
    pattern: String,
    locations: Vec<L>,
    resolvers: Vec<Box<dyn ResourceResolver<L>>>,
    caching: bool,
    cache_selector: LanguageSelector,
    cache_fallback: String,
}

impl<L: ResourceLocation + 'static> ResourceHandlerBuilder<L> {
    pub fn location(mut self, location: L) -> Self {
        self.locations.push(location);
        self
    }

    pub fn locations(mut self, locations: impl IntoIterator<Item = L>) -> Self {
        self.locations.extend(locations);
        self
    }

    /// Turn resolution caching on or off. Off unless asked for.
    pub fn resource_chain(mut self, cache: bool) -> Self {
        self.caching = cache;
        self
    }

    /// How the cache selects the language its keys are built from.
    pub fn cache_language(mut self, selector: LanguageSelector, fallback: impl Into<String>) -> Self {
        self.cache_selector = selector;
        self.cache_fallback = fallback.into();
        self
    }

    pub fn resolver(mut self, resolver: impl ResourceResolver<L> + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn build(self) -> ResourceHandler<L> {
        let mut resolvers: Vec<Box<dyn ResourceResolver<L>>> =
            Vec::with_capacity(self.resolvers.len() + 2);

        if self.caching {
            resolvers.push(Box::new(CachingResourceResolver::<L>::new(
                self.cache_selector,
                self.cache_fallback,
            )));
        }
        resolvers.extend(self.resolvers);
        resolvers.push(Box::new(PathResourceResolver));

        ResourceHandler {
            pattern: self.pattern,
            locations: self.locations,
            resolvers,
            caching: self.caching,
        }
    }
}

impl<L: ResourceLocation + 'static> ResourceHandler<L> {
    pub fn builder(pattern: impl Into<String>) -> ResourceHandlerBuilder<L> {
        ResourceHandlerBuilder {
            pattern: pattern.into(),
            locations: Vec::new(),
            resolvers: Vec::new(),
            caching: false,
            cache_selector: LanguageSelector::default(),
            cache_fallback: DEFAULT_FALLBACK_LANGUAGE.to_string(),
        }
    }

    /// The localized handler described by `config`, in front of `locations`.
    pub fn localized(config: &HandlerConfig, locations: Vec<L>) -> Self {
        let selector = LanguageSelector::new().with_parameter(config.language_parameter.clone());
        let localized =
            LocalizedResourceResolver::new(config.fallback_language.clone()).with_selector(selector.clone());

        // The cache must select languages exactly as the localized stage does.
        Self::builder(config.pattern.clone())
            .locations(locations)
            .resource_chain(config.cache)
            .cache_language(selector, config.fallback_language.clone())
            .resolver(localized)
            .build()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn locations(&self) -> &[L] {
        &self.locations
    }

    pub fn is_caching(&self) -> bool {
        self.caching
    }

    /// Number of stages in the assembled chain, terminal stage included.
    pub fn chain_len(&self) -> usize {
        self.resolvers.len()
    }

    /// Part of `path` below the pattern, or `None` if the pattern does not apply.
    pub fn path_within_pattern<'p>(&self, path: &'p str) -> Option<&'p str> {
        match self.pattern.strip_suffix("/**") {
            Some(prefix) if prefix.is_empty() => Some(path.trim_start_matches('/')),
            Some(prefix) => {
                let rest = path.strip_prefix(prefix)?;
                if rest.is_empty() {
                    Some(rest)
                } else {
                    rest.strip_prefix('/')
                }
            }
            None => (path == self.pattern).then(|| path.trim_start_matches('/')),
        }
    }

    /// Resolve `path` for `request`. Paths outside the pattern are not found.
    pub fn handle(&self, request: &dyn RequestView, path: &str) -> Result<Option<L>> {
        let Some(relative) = self.path_within_pattern(path) else {
            debug!(pattern = %self.pattern, path, "path outside handler pattern");
            return Ok(None);
        };

        ResolverChain::new(&self.resolvers).resolve_resource(request, relative, &self.locations)
    }

    /// Public URL path for an internal resource path.
    pub fn url_path(&self, resource_path: &str) -> Result<Option<String>> {
        ResolverChain::new(&self.resolvers).resolve_url_path(resource_path, &self.locations)
    }
}
