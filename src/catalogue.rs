//! Catalogue resolver going through WowUp.Hub (plugin 1.1.0)
//!
//! Every Townlong Yak add-on is listed in one author catalogue. Resolutions
//! share that payload: loading it is serialized by a named lock and the
//! response is cached for `cache.catalogue_ttl_minutes`, so any number of
//! concurrent resolutions against a cold cache cost a single request.

use crate::models::{Defn, Pkg, PkgOptions, Strategy};
use crate::resolver::Resolver;
use crate::{Context, Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the lock guarding catalogue loads
pub const CATALOGUE_LOCK: &str = "load Townlong Yak catalogue";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WowUpHubAddons {
    /// Entries that fail to decode are dropped rather than failing the
    /// whole catalogue
    #[serde(deserialize_with = "skip_undecodable_addons")]
    pub addons: Vec<WowUpHubAddon>,
}

/// A catalogue entry. Only `repository`, `repository_name` and `releases`
/// are required; informational fields tolerate `null` and absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WowUpHubAddon {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    /// Home page URL; its last segment is the alias
    pub repository: String,
    /// Display name
    pub repository_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    /// May contain HTML
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub homepage: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub owner_image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner_name: String,
    /// Always 0 for Townlong Yak
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_download_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub funding_links: Vec<String>,
    pub releases: Vec<WowUpHubRelease>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WowUpHubRelease {
    /// Changelog, may contain HTML
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_count: i64,
    pub download_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_id: String,
    /// TOC-style interface version, e.g. "90002"
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub prerelease: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_at: String,
    pub tag_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// "retail" or "classic"
    pub game_type: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn skip_undecodable_addons<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<WowUpHubAddon>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let repository = entry
                .get("repository")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>")
                .to_string();
            match serde_json::from_value(entry) {
                Ok(addon) => Some(addon),
                Err(e) => {
                    tracing::warn!(%repository, error = %e, "skipping undecodable catalogue entry");
                    None
                }
            }
        })
        .collect())
}

impl WowUpHubAddon {
    /// Alias the add-on is known by: the last path segment of its home page
    pub fn alias(&self) -> Option<String> {
        let url = url::Url::parse(&self.repository).ok()?;
        let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
        urlencoding::decode(segment).ok().map(|s| s.into_owned())
    }

    /// First stable release for `game_type`
    pub fn stable_release_for(&self, game_type: &str) -> Option<&WowUpHubRelease> {
        self.releases
            .iter()
            .find(|r| !r.prerelease && r.game_type == game_type)
    }
}

/// Index a catalogue by alias
///
/// Entries whose home page has no usable last segment are skipped. When two
/// entries share an alias the later one wins.
pub fn index_catalogue(catalogue: WowUpHubAddons) -> HashMap<String, WowUpHubAddon> {
    catalogue
        .addons
        .into_iter()
        .filter_map(|addon| match addon.alias() {
            Some(alias) => Some((alias, addon)),
            None => {
                tracing::warn!(repository = %addon.repository, "skipping catalogue entry without alias");
                None
            }
        })
        .collect()
}

/// Alias from `https://www.townlong-yak.com/addons/<alias>[/...]`
///
/// Two or more path segments are accepted.
pub fn alias_from_url(value: &str) -> Option<String> {
    let url = url::Url::parse(value).ok()?;
    if url.host_str() != Some(crate::plugin::TOWNLONG_YAK_HOST) {
        return None;
    }

    let mut segments = url.path_segments()?;
    match (segments.next(), segments.next()) {
        (Some("addons"), Some(alias)) if !alias.is_empty() => {
            urlencoding::decode(alias).ok().map(|s| s.into_owned())
        }
        _ => None,
    }
}

pub struct CatalogueResolver {
    ctx: Arc<Context>,
}

impl CatalogueResolver {
    pub const SOURCE: &'static str = "townlong-yak";
    pub const NAME: &'static str = "Townlong Yak (via WowUp.Hub)";

    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// Load the catalogue (cached) and index it by alias
    pub async fn synchronise(&self) -> Result<HashMap<String, WowUpHubAddon>> {
        let _guard = self.ctx.locks.lock(CATALOGUE_LOCK).await;

        let catalogue: WowUpHubAddons = self
            .ctx
            .cache_response(
                &self.ctx.config.endpoints.catalogue_url,
                self.ctx.config.cache.catalogue_ttl(),
                &format!("Synchronising {} catalogue", Self::NAME),
            )
            .await?;

        Ok(index_catalogue(catalogue))
    }
}

#[async_trait]
impl Resolver for CatalogueResolver {
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

        let mut addons = self.synchronise().await?;
        let addon = addons
            .remove(&defn.alias)
            .ok_or_else(|| Error::PackageNonexistent(defn.alias.clone()))?;

        let flavour = self.ctx.config.game_flavour;
        let release = addon
            .stable_release_for(flavour.game_type())
            .ok_or_else(|| Error::FileUnavailable(defn.alias.clone()))?;

        tracing::debug!(alias = %defn.alias, %flavour, tag = %release.tag_name, "selected release");

        Ok(Pkg {
            source: Self::SOURCE.to_string(),
            id: defn.alias.clone(),
            slug: defn.alias.clone(),
            name: addon.repository_name.clone(),
            description: addon.description.clone(),
            url: addon.repository.clone(),
            download_url: release.download_url.clone(),
            date_published: Utc::now(),
            version: release.tag_name.clone(),
            options: PkgOptions {
                strategy: defn.strategy,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn addon(repository: &str, releases: serde_json::Value) -> WowUpHubAddon {
        serde_json::from_value(json!({
            "id": 1,
            "repository": repository,
            "repository_name": "Name",
            "source": "townlong-yak",
            "description": "<p>desc</p>",
            "homepage": repository,
            "image_url": null,
            "owner_image_url": null,
            "owner_name": "foxlit",
            "total_download_count": 0,
            "funding_links": [],
            "releases": releases,
        }))
        .unwrap()
    }

    fn release(game_type: &str, prerelease: bool, tag: &str) -> serde_json::Value {
        json!({
            "body": "",
            "download_count": 0,
            "download_url": format!("https://x/{}.zip", tag),
            "external_id": "ext",
            "game_version": "90002",
            "id": 7,
            "name": tag,
            "prerelease": prerelease,
            "published_at": "2020-11-17T00:00:00Z",
            "tag_name": tag,
            "url": format!("https://x/{}.zip", tag),
            "game_type": game_type,
        })
    }

    #[test]
    fn test_addon_alias_is_last_repository_segment() {
        let a = addon("https://www.townlong-yak.com/addons/opie", json!([]));
        assert_eq!(a.alias(), Some("opie".to_string()));

        let trailing = addon("https://www.townlong-yak.com/addons/opie/", json!([]));
        assert_eq!(trailing.alias(), Some("opie".to_string()));

        let bare = addon("https://www.townlong-yak.com/", json!([]));
        assert_eq!(bare.alias(), None);
    }

    #[test]
    fn test_stable_release_skips_prereleases_and_other_flavours() {
        let a = addon(
            "https://www.townlong-yak.com/addons/opie",
            json!([
                release("retail", true, "r-beta"),
                release("classic", false, "c-1"),
                release("retail", false, "r-1"),
                release("retail", false, "r-0"),
            ]),
        );

        assert_eq!(a.stable_release_for("retail").unwrap().tag_name, "r-1");
        assert_eq!(a.stable_release_for("classic").unwrap().tag_name, "c-1");

        let only_beta = addon(
            "https://www.townlong-yak.com/addons/opie",
            json!([release("classic", true, "c-beta")]),
        );
        assert!(only_beta.stable_release_for("classic").is_none());
    }

    #[test]
    fn test_index_catalogue_keys_by_alias() {
        let catalogue = WowUpHubAddons {
            addons: vec![
                addon("https://www.townlong-yak.com/addons/opie", json!([])),
                addon("https://www.townlong-yak.com/addons/rtk", json!([])),
                addon("not a url", json!([])),
            ],
        };

        let index = index_catalogue(catalogue);
        assert_eq!(index.len(), 2);
        assert!(index.contains_key("opie"));
        assert!(index.contains_key("rtk"));
    }

    #[test]
    fn test_alias_from_url_accepts_deeper_paths() {
        assert_eq!(
            alias_from_url("https://www.townlong-yak.com/addons/opie"),
            Some("opie".to_string())
        );
        assert_eq!(
            alias_from_url("https://www.townlong-yak.com/addons/opie/release/3"),
            Some("opie".to_string())
        );
        assert_eq!(alias_from_url("https://www.townlong-yak.com/addons"), None);
        assert_eq!(alias_from_url("https://www.townlong-yak.com/addons/"), None);
        assert_eq!(alias_from_url("https://www.townlong-yak.com/opie"), None);
        assert_eq!(alias_from_url("https://hub.dev.wowup.io/addons/opie"), None);
        assert_eq!(alias_from_url("opie"), None);
    }

    #[test]
    fn test_null_fields_and_broken_entries_do_not_poison_catalogue() {
        let mut odd = json!({
            "id": null,
            "repository": "https://www.townlong-yak.com/addons/mp",
            "repository_name": "MasterPlan",
            "source": null,
            "description": null,
            "homepage": null,
            "owner_name": null,
            "funding_links": null,
            "releases": [release("retail", false, "0.120")],
        });
        odd["releases"][0]["body"] = serde_json::Value::Null;
        odd["releases"][0]["external_id"] = serde_json::Value::Null;

        let catalogue: WowUpHubAddons = serde_json::from_value(json!({
            "addons": [
                odd,
                {"repository": 5, "releases": "nope"},
                {
                    "repository": "https://www.townlong-yak.com/addons/rtk",
                    "repository_name": "RTK",
                    "description": "<p>rtk</p>",
                    "releases": [release("retail", false, "1.2")],
                },
            ]
        }))
        .unwrap();

        let index = index_catalogue(catalogue);
        assert_eq!(index.len(), 2);
        assert_eq!(
            index["rtk"].stable_release_for("retail").unwrap().tag_name,
            "1.2"
        );
        let mp = &index["mp"];
        assert_eq!(mp.owner_name, "");
        assert_eq!(mp.description, "");
        assert_eq!(mp.releases[0].body, "");
    }

    #[test]
    fn test_percent_encoded_aliases_are_decoded() {
        assert_eq!(
            alias_from_url("https://www.townlong-yak.com/addons/foo%20bar"),
            Some("foo bar".to_string())
        );
        let a = addon("https://www.townlong-yak.com/addons/foo%20bar", json!([]));
        assert_eq!(a.alias(), Some("foo bar".to_string()));
    }
}
