//! townlong-yak - resolve Townlong Yak add-ons into downloadable packages
//!
//! Given an alias (`opie`) or a home-page URL
//! (`https://www.townlong-yak.com/addons/opie`), a resolver produces a
//! [`Pkg`] with the name, version and download URL of the add-on for the
//! configured game flavour (retail or classic).
//!
//! Two generations of the upstream API are supported:
//!
//! - [`DirectResolver`] asks the Townlong Yak install-bundle API about one
//!   alias per request.
//! - [`CatalogueResolver`] reads the WowUp.Hub author catalogue once, caches
//!   it for 15 minutes and answers every alias from it.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use townlong_yak::{add_resolvers, Config, Context, Defn, Resolvers};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = Arc::new(Context::new(Config::load()?)?);
//! let resolvers = Resolvers::new(add_resolvers(ctx));
//!
//! let pkg = resolvers.resolve_one(&Defn::new("townlong-yak", "opie")).await?;
//! println!("{} {}", pkg.name, pkg.version);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`models`] - Definitions, packages, strategies and game flavours
//! - [`resolver`] - The resolver interface and the collection driving it
//! - [`direct`] - Install-bundle resolver (plugin 1.0.0)
//! - [`catalogue`] - WowUp.Hub catalogue resolver (plugin 1.1.0)
//! - [`plugin`] - Registration hook
//! - [`context`] - Config, HTTP client, cache and locks shared by resolvers
//! - [`cache`] - Response caches
//! - [`locks`] - Named async locks
//! - [`config`] - User configuration
//! - [`error`] - Error types and result handling

pub mod cache;
pub mod catalogue;
pub mod config;
pub mod context;
pub mod direct;
pub mod error;
pub mod locks;
pub mod models;
pub mod plugin;
pub mod resolver;

pub use cache::{DiskCache, MemoryCache, ResponseCache};
pub use catalogue::CatalogueResolver;
pub use config::{ApiGeneration, Config};
pub use context::Context;
pub use direct::DirectResolver;
pub use error::{Error, Result};
pub use locks::LockRegistry;
pub use models::{Defn, GameFlavour, Pkg, PkgOptions, Strategy};
pub use plugin::{add_resolvers, plugin_version};
pub use resolver::{Resolver, Resolvers};
