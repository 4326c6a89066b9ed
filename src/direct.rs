//! Direct resolver for the Townlong Yak install-bundle API (plugin 1.0.0)
//!
//! Each resolution is one `GET <install_bundle_url>/<alias>`. The bundle
//! lists releases per channel; the first release on the configured game
//! flavour's channel wins.

use crate::models::{Defn, Pkg, PkgOptions, Strategy};
use crate::resolver::Resolver;
use crate::{Context, Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Release bundle returned by the install-bundle API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallBundle {
    pub name: String,
    pub summary: String,
    pub author: String,
    /// Persistent identifier; not used for versioning
    pub pi: String,
    /// Home page
    pub link: String,
    pub releases: Vec<BundleRelease>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleRelease {
    /// Channel flag: 0 retail, 1 classic
    pub ch: u8,
    /// Client (interface) versions the release supports
    #[serde(default)]
    pub cv: Vec<String>,
    /// Download URL
    pub dl: String,
}

impl InstallBundle {
    /// First release published on `channel`
    pub fn release_for_channel(&self, channel: u8) -> Option<&BundleRelease> {
        self.releases.iter().find(|r| r.ch == channel)
    }
}

pub struct DirectResolver {
    ctx: Arc<Context>,
}

impl DirectResolver {
    pub const SOURCE: &'static str = "townlong-yak";
    pub const NAME: &'static str = "Townlong Yak";

    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    async fn fetch_bundle(&self, alias: &str) -> Result<InstallBundle> {
        let url = format!(
            "{}/{}",
            self.ctx.config.endpoints.install_bundle_url.trim_end_matches('/'),
            urlencoding::encode(alias)
        );

        let response = self.ctx.get(&url).await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::PackageNonexistent(alias.to_string()));
        }

        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json().await?)
    }
}

/// Alias from `https://www.townlong-yak.com/addons/<alias>`
///
/// Exactly two path segments are accepted, so a trailing slash is rejected.
/// The alias is returned percent-decoded.
pub fn alias_from_url(value: &str) -> Option<String> {
    let url = url::Url::parse(value).ok()?;
    if url.host_str() != Some(crate::plugin::TOWNLONG_YAK_HOST) {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?.collect();
    match segments.as_slice() {
        ["addons", alias] if !alias.is_empty() => {
            urlencoding::decode(alias).ok().map(|s| s.into_owned())
        }
        _ => None,
    }
}

/// Version string for a release: the file name at the end of its URL
fn version_from_download_url(dl: &str) -> String {
    let path = match url::Url::parse(dl) {
        Ok(url) => url.path().to_string(),
        Err(_) => dl.to_string(),
    };
    path.rsplit('/').next().unwrap_or_default().to_string()
}

#[async_trait]
impl Resolver for DirectResolver {
    fn source(&self) -> &'static str {
        Self::SOURCE
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn strategies(&self) -> &'static [Strategy] {
        &[Strategy::Default]
    }

    fn get_alias_from_url(&self, value: &str) -> Option<String> {
        alias_from_url(value)
    }

    async fn resolve_one(&self, defn: &Defn) -> Result<Pkg> {
        if !self.supports(defn.strategy) {
            return Err(Error::StrategyUnsupported(defn.strategy));
        }

        let bundle = self.fetch_bundle(&defn.alias).await?;
        let flavour = self.ctx.config.game_flavour;

        let release = bundle
            .release_for_channel(flavour.channel())
            .ok_or_else(|| Error::FileUnavailable(defn.alias.clone()))?;

        tracing::debug!(alias = %defn.alias, %flavour, dl = %release.dl, "selected release");

        Ok(Pkg {
            source: Self::SOURCE.to_string(),
            id: defn.alias.clone(),
            slug: defn.alias.clone(),
            name: bundle.name.clone(),
            description: bundle.summary.clone(),
            url: bundle.link.clone(),
            download_url: release.dl.clone(),
            date_published: Utc::now(),
            version: version_from_download_url(&release.dl),
            options: PkgOptions {
                strategy: defn.strategy,
            },
        })
    }
}
