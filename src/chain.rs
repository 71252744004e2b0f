//! Resolver chains
//!
//! A chain is an ordered list of [`ResourceResolver`] stages. Each stage gets
//! the remainder of the chain and decides whether to answer itself or hand on
//! a (possibly rewritten) set of locations. Running off the end of the chain
//! means "not found".

use crate::error::Result;
use crate::location::ResourceLocation;
use crate::request::RequestView;

pub trait ResourceResolver<L: ResourceLocation>: Send + Sync {
    /// Resolve `request_path` against `locations`.
    ///
    /// `Ok(None)` means not found; errors are never turned into `None`.
    fn resolve_resource(
        &self,
        request: &dyn RequestView,
        request_path: &str,
        locations: &[L],
        chain: ResolverChain<'_, L>,
    ) -> Result<Option<L>>;

    /// Map an internal resource path back to its public URL path.
    fn resolve_url_path(
        &self,
        resource_path: &str,
        locations: &[L],
        chain: ResolverChain<'_, L>,
    ) -> Result<Option<String>>;
}

/// The stages that have not run yet.
pub struct ResolverChain<'a, L: ResourceLocation> {
    resolvers: &'a [Box<dyn ResourceResolver<L>>],
}

impl<L: ResourceLocation> Clone for ResolverChain<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: ResourceLocation> Copy for ResolverChain<'_, L> {}

impl<'a, L: ResourceLocation> ResolverChain<'a, L> {
    pub fn new(resolvers: &'a [Box<dyn ResourceResolver<L>>]) -> Self {
        Self { resolvers }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn resolve_resource(
        &self,
        request: &dyn RequestView,
        request_path: &str,
        locations: &[L],
    ) -> Result<Option<L>> {
        match self.resolvers.split_first() {
            Some((resolver, rest)) => resolver.resolve_resource(
                request,
                request_path,
                locations,
                ResolverChain::new(rest),
            ),
            None => Ok(None),
        }
    }

    pub fn resolve_url_path(&self, resource_path: &str, locations: &[L]) -> Result<Option<String>> {
        match self.resolvers.split_first() {
            Some((resolver, rest)) => {
                resolver.resolve_url_path(resource_path, locations, ResolverChain::new(rest))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::EmbeddedLocation;
    use crate::request::StaticRequest;

    /// Answers with the first location it is given.
    struct First;

    impl ResourceResolver<EmbeddedLocation> for First {
        fn resolve_resource(
            &self,
            _request: &dyn RequestView,
            _request_path: &str,
            locations: &[EmbeddedLocation],
            _chain: ResolverChain<'_, EmbeddedLocation>,
        ) -> Result<Option<EmbeddedLocation>> {
            Ok(locations.first().cloned())
        }

        fn resolve_url_path(
            &self,
            resource_path: &str,
            _locations: &[EmbeddedLocation],
            _chain: ResolverChain<'_, EmbeddedLocation>,
        ) -> Result<Option<String>> {
            Ok(Some(resource_path.to_string()))
        }
    }

    #[test]
    fn test_empty_chain_is_not_found() {
        let resolvers: Vec<Box<dyn ResourceResolver<EmbeddedLocation>>> = Vec::new();
        let chain = ResolverChain::new(&resolvers);
        let root = EmbeddedLocation::new([("a/b", "")], "a/");
        let request = StaticRequest::new();

        assert!(chain.is_empty());
        assert!(chain.resolve_resource(&request, "b", &[root.clone()]).unwrap().is_none());
        assert!(chain.resolve_url_path("b", &[root]).unwrap().is_none());
    }

    #[test]
    fn test_first_stage_answers() {
        let resolvers: Vec<Box<dyn ResourceResolver<EmbeddedLocation>>> = vec![Box::new(First)];
        let chain = ResolverChain::new(&resolvers);
        let root = EmbeddedLocation::new([("a/b", "")], "a/");
        let request = StaticRequest::new();

        let found = chain.resolve_resource(&request, "b", &[root.clone()]).unwrap();
        assert_eq!(found, Some(root));
        assert_eq!(chain.len(), 1);
    }
}
