use crate::models::Strategy;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Strategy '{0}' is not valid for this source")]
    StrategyUnsupported(Strategy),

    #[error("Package does not exist: {0}")]
    PackageNonexistent(String),

    #[error("No file is available for '{0}' in the selected game flavour\n\n\
             Hint: The add-on exists but has no stable release for this flavour.\n\
             Check the game_flavour setting: tyak config show")]
    FileUnavailable(String),

    #[error("No resolver is registered for source '{0}'")]
    UnknownSource(String),

    #[error("Upstream error: HTTP {status} from {url}")]
    Upstream { status: u16, url: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this is one of the typed resolution failures surfaced to users
    /// (as opposed to a transport or parse fault).
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Error::StrategyUnsupported(_) | Error::PackageNonexistent(_) | Error::FileUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failures_are_classified() {
        assert!(Error::PackageNonexistent("foo".into()).is_resolution_failure());
        assert!(Error::FileUnavailable("foo".into()).is_resolution_failure());
        assert!(Error::StrategyUnsupported(Strategy::Latest).is_resolution_failure());
        assert!(!Error::Other("boom".into()).is_resolution_failure());

        let upstream = Error::Upstream {
            status: 500,
            url: "https://example.invalid".into(),
        };
        assert!(!upstream.is_resolution_failure());
    }

    #[test]
    fn test_strategy_unsupported_message_names_strategy() {
        let msg = Error::StrategyUnsupported(Strategy::AnyFlavour).to_string();
        assert!(msg.contains("any_flavour"));
    }
}
