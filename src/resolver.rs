//! Resolver interface and the collection the host drives
//!
//! Every upstream API generation implements [`Resolver`]. [`Resolvers`]
//! routes definitions to the resolver owning their source and runs many
//! resolutions concurrently.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use townlong_yak::{add_resolvers, Config, Context, Resolvers};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = Arc::new(Context::new(Config::load()?)?);
//! let resolvers = Resolvers::new(add_resolvers(ctx));
//!
//! let defn = resolvers.parse_value("https://www.townlong-yak.com/addons/rtk")?;
//! for result in resolvers.resolve(vec![defn]).await {
//!     let pkg = result?;
//!     println!("{} {} -> {}", pkg.name, pkg.version, pkg.download_url);
//! }
//! # Ok(())
//! # }
//! ```

use crate::models::{Defn, Pkg, Strategy};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;

#[async_trait]
pub trait Resolver: Send + Sync {
    /// Source identifier packages are filed under
    fn source(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    fn strategies(&self) -> &'static [Strategy];

    /// Extract an alias from a home-page URL this resolver recognises
    ///
    /// Returns `None` for anything else, never an error.
    fn get_alias_from_url(&self, value: &str) -> Option<String>;

    async fn resolve_one(&self, defn: &Defn) -> Result<Pkg>;

    fn supports(&self, strategy: Strategy) -> bool {
        self.strategies().contains(&strategy)
    }
}

/// Resolvers registered by plugins, in registration order
#[derive(Clone, Default)]
pub struct Resolvers {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl Resolvers {
    pub fn new(resolvers: Vec<Arc<dyn Resolver>>) -> Self {
        Self { resolvers }
    }

    pub fn get(&self, source: &str) -> Option<&Arc<dyn Resolver>> {
        self.resolvers.iter().find(|r| r.source() == source)
    }

    /// Turn user input into a definition
    ///
    /// `source:alias` picks a source explicitly. Otherwise every resolver
    /// gets a chance to parse the value as a URL; if none does, the value is
    /// taken as a literal alias for the first registered source.
    pub fn parse_value(&self, value: &str) -> Result<Defn> {
        if let Some((source, alias)) = value.split_once(':') {
            if let Some(resolver) = self.get(source) {
                return Ok(Defn::new(resolver.source(), alias));
            }
        }

        for resolver in &self.resolvers {
            if let Some(alias) = resolver.get_alias_from_url(value) {
                return Ok(Defn::new(resolver.source(), alias));
            }
        }

        let resolver = self
            .resolvers
            .first()
            .ok_or_else(|| Error::Other("No resolvers are registered".to_string()))?;
        Ok(Defn::new(resolver.source(), value))
    }

    /// Resolve a single definition with the resolver owning its source
    pub async fn resolve_one(&self, defn: &Defn) -> Result<Pkg> {
        let resolver = self
            .get(&defn.source)
            .ok_or_else(|| Error::UnknownSource(defn.source.clone()))?;
        resolver.resolve_one(defn).await
    }

    /// Resolve every definition concurrently
    ///
    /// Results come back in the order of `defns`.
    pub async fn resolve(&self, defns: Vec<Defn>) -> Vec<Result<Pkg>> {
        let mut results: Vec<Option<Result<Pkg>>> = defns.iter().map(|_| None).collect();
        let mut tasks = JoinSet::new();

        for (index, defn) in defns.into_iter().enumerate() {
            match self.get(&defn.source) {
                Some(resolver) => {
                    let resolver = Arc::clone(resolver);
                    tasks.spawn(async move { (index, resolver.resolve_one(&defn).await) });
                }
                None => results[index] = Some(Err(Error::UnknownSource(defn.source))),
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "resolution task failed"),
            }
        }

        results
            .into_iter()
            .map(|r| r.unwrap_or_else(|| Err(Error::Other("Resolution task failed".to_string()))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Echo;

    #[async_trait]
    impl Resolver for Echo {
        fn source(&self) -> &'static str {
            "echo"
        }

        fn name(&self) -> &'static str {
            "Echo"
        }

        fn strategies(&self) -> &'static [Strategy] {
            &[Strategy::Default]
        }

        fn get_alias_from_url(&self, value: &str) -> Option<String> {
            value.strip_prefix("echo://").map(str::to_string)
        }

        async fn resolve_one(&self, defn: &Defn) -> Result<Pkg> {
            if !self.supports(defn.strategy) {
                return Err(Error::StrategyUnsupported(defn.strategy));
            }
            Ok(Pkg {
                source: self.source().to_string(),
                id: defn.alias.clone(),
                slug: defn.alias.clone(),
                name: defn.alias.clone(),
                description: String::new(),
                url: String::new(),
                download_url: format!("echo://{}", defn.alias),
                date_published: Utc::now(),
                version: "1".to_string(),
                options: crate::models::PkgOptions {
                    strategy: defn.strategy,
                },
            })
        }
    }

    fn resolvers() -> Resolvers {
        Resolvers::new(vec![Arc::new(Echo)])
    }

    #[test]
    fn test_parse_value_prefers_url_then_literal() {
        let resolvers = resolvers();
        assert_eq!(
            resolvers.parse_value("echo://thing").unwrap(),
            Defn::new("echo", "thing")
        );
        assert_eq!(
            resolvers.parse_value("echo:thing").unwrap(),
            Defn::new("echo", "thing")
        );
        assert_eq!(
            resolvers.parse_value("plain").unwrap(),
            Defn::new("echo", "plain")
        );
    }

    #[test]
    fn test_parse_value_without_resolvers_fails() {
        assert!(Resolvers::default().parse_value("plain").is_err());
    }

    #[tokio::test]
    async fn test_resolve_keeps_input_order() {
        let resolvers = resolvers();
        let defns = vec![
            Defn::new("echo", "a"),
            Defn::new("nowhere", "b"),
            Defn::new("echo", "c").with_strategy(Strategy::Latest),
            Defn::new("echo", "d"),
        ];

        let results = resolvers.resolve(defns).await;
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().id, "a");
        assert!(matches!(results[1], Err(Error::UnknownSource(ref s)) if s == "nowhere"));
        assert!(matches!(
            results[2],
            Err(Error::StrategyUnsupported(Strategy::Latest))
        ));
        assert_eq!(results[3].as_ref().unwrap().id, "d");
    }
}
