//! localized-static - pick a language-specific root for static asset requests
//!
//! A request names a language either through a `lang` parameter or an
//! `Accept-Language` header. The [`resolver::LocalizedResourceResolver`] turns
//! that into a `<lang>/` subdirectory of the first candidate location that has
//! one, then hands the rest of the work to the next stage of a
//! [`chain::ResolverChain`].

rust_i18n::i18n!("locales", fallback = "en");

pub mod chain;
pub mod config;
pub mod error;
pub mod handler;
pub mod i18n;
pub mod location;
pub mod request;
pub mod resolver;
pub mod selector;

pub use chain::{ResolverChain, ResourceResolver};
pub use config::HandlerConfig;
pub use error::{ResolveError, Result};
pub use handler::ResourceHandler;
pub use location::{EmbeddedLocation, FileSystemLocation, ResourceLocation};
pub use request::{RequestView, StaticRequest};
pub use resolver::{
    resolve_localized, CachingResourceResolver, LocalizedResourceResolver, PathResourceResolver,
};
pub use selector::{LanguageCode, LanguageSelector};
