//! Package data model shared by every resolver
//!
//! A [`Defn`] names an add-on to resolve; a resolver answers with a [`Pkg`]
//! describing exactly one downloadable file for the selected
//! [`GameFlavour`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resolution policy requested for a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Latest stable file for the selected flavour
    Default,
    /// Latest file including pre-releases
    Latest,
    /// Latest file regardless of flavour
    AnyFlavour,
    /// A pinned version
    Version,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Default => "default",
            Strategy::Latest => "latest",
            Strategy::AnyFlavour => "any_flavour",
            Strategy::Version => "version",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "default" => Ok(Strategy::Default),
            "latest" => Ok(Strategy::Latest),
            "any_flavour" => Ok(Strategy::AnyFlavour),
            "version" => Ok(Strategy::Version),
            other => Err(format!("Unknown strategy: {}", other)),
        }
    }
}

/// Game build an add-on is installed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameFlavour {
    #[default]
    Retail,
    Classic,
}

impl GameFlavour {
    /// Release channel flag used by the install-bundle API (`ch`)
    pub fn channel(&self) -> u8 {
        match self {
            GameFlavour::Retail => 0,
            GameFlavour::Classic => 1,
        }
    }

    /// Release `game_type` string used by the WowUp.Hub catalogue
    pub fn game_type(&self) -> &'static str {
        match self {
            GameFlavour::Retail => "retail",
            GameFlavour::Classic => "classic",
        }
    }
}

impl fmt::Display for GameFlavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.game_type())
    }
}

impl FromStr for GameFlavour {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "retail" => Ok(GameFlavour::Retail),
            "classic" => Ok(GameFlavour::Classic),
            other => Err(format!(
                "Unknown game flavour: {} (expected 'retail' or 'classic')",
                other
            )),
        }
    }
}

/// A request to resolve one alias within one source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Defn {
    pub source: String,
    pub alias: String,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
}

fn default_strategy() -> Strategy {
    Strategy::Default
}

impl Defn {
    pub fn new(source: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alias: alias.into(),
            strategy: Strategy::Default,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl fmt::Display for Defn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.alias)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgOptions {
    pub strategy: Strategy,
}

/// A fully resolved, downloadable package
///
/// Built fresh on every successful resolution and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pkg {
    pub source: String,
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Add-on home page
    pub url: String,
    pub download_url: String,
    /// Time of resolution; upstream publish dates are not used
    pub date_published: DateTime<Utc>,
    pub version: String,
    pub options: PkgOptions,
}
