//! Response cache management
//!
//! - `cache clear` - Remove every cached response
//! - `cache path` - Show cache location

use anyhow::Result;
use townlong_yak::{Config, DiskCache, ResponseCache};

pub async fn run(action: &crate::CacheAction) -> Result<()> {
    use crate::CacheAction;

    let config = Config::load()?;
    let dir = config.cache_dir()?;

    match action {
        CacheAction::Clear => {
            DiskCache::new(&dir).clear().await?;
            println!("✓ Cleared response cache at {}", dir.display());
        }
        CacheAction::Path => println!("{}", dir.display()),
    }

    Ok(())
}
