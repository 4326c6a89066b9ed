use anyhow::Result;
use townlong_yak::{plugin_version, Config};

pub fn run(action: &crate::ConfigAction) -> Result<()> {
    use crate::ConfigAction;

    match action {
        ConfigAction::Show => show_config(),
        ConfigAction::Set { key, value } => set_config(key, value),
        ConfigAction::Path => {
            println!("{}", Config::default_path()?.display());
            Ok(())
        }
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    let config_path = Config::default_path()?;

    println!();
    println!("  📁 Config file: {}", config_path.display());
    println!();
    println!("┌─ Resolution ─────────────────────────────────────────────────┐");
    println!("  Game flavour:      {}", config.game_flavour);
    println!(
        "  API generation:    {} (plugin {})",
        config.api,
        plugin_version(config.api)
    );
    println!("└──────────────────────────────────────────────────────────────┘");
    println!();
    println!("┌─ Endpoints ──────────────────────────────────────────────────┐");
    println!("  Install bundle:    {}", config.endpoints.install_bundle_url);
    println!("  Catalogue:         {}", config.endpoints.catalogue_url);
    println!("└──────────────────────────────────────────────────────────────┘");
    println!();
    println!("┌─ Cache ──────────────────────────────────────────────────────┐");
    println!("  On disk:           {}", format_bool(config.cache.enabled));
    println!("  Directory:         {}", config.cache_dir()?.display());
    println!(
        "  Catalogue TTL:     {} minutes",
        config.cache.catalogue_ttl_minutes
    );
    println!("└──────────────────────────────────────────────────────────────┘");
    println!();
    println!("  User agent: {}", config.http.user_agent);
    println!();

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("✓ Set {} = {}", key, value);
    Ok(())
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "✓ yes"
    } else {
        "✗ no"
    }
}
