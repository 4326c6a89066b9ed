//! Plugin registration hook

use crate::catalogue::CatalogueResolver;
use crate::config::ApiGeneration;
use crate::direct::DirectResolver;
use crate::resolver::Resolver;
use crate::Context;
use std::sync::Arc;

/// Host serving Townlong Yak add-on home pages
pub const TOWNLONG_YAK_HOST: &str = "www.townlong-yak.com";

/// Plugin version matching an API generation
pub fn plugin_version(api: ApiGeneration) -> &'static str {
    match api {
        ApiGeneration::Direct => "1.0.0",
        ApiGeneration::Catalogue => "1.1.0",
    }
}

/// Resolvers this plugin contributes
///
/// Exactly one resolver is registered, chosen by `config.api` when the
/// context is built.
pub fn add_resolvers(ctx: Arc<Context>) -> Vec<Arc<dyn Resolver>> {
    let api = ctx.config.api;
    tracing::debug!(%api, version = plugin_version(api), "registering Townlong Yak resolver");

    match api {
        ApiGeneration::Direct => vec![Arc::new(DirectResolver::new(ctx))],
        ApiGeneration::Catalogue => vec![Arc::new(CatalogueResolver::new(ctx))],
    }
}
