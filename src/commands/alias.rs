use anyhow::Result;
use townlong_yak::{catalogue, direct, ApiGeneration, Config};

pub fn run(url: String, api: Option<ApiGeneration>) -> Result<()> {
    let api = match api {
        Some(api) => api,
        None => Config::load()?.api,
    };

    let alias = match api {
        ApiGeneration::Direct => direct::alias_from_url(&url),
        ApiGeneration::Catalogue => catalogue::alias_from_url(&url),
    };

    match alias {
        Some(alias) => {
            println!("{}", alias);
            Ok(())
        }
        None => anyhow::bail!("Not a Townlong Yak add-on URL: {}", url),
    }
}
