use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use townlong_yak::{
    add_resolvers, ApiGeneration, Config, Context, Defn, GameFlavour, Resolvers, Strategy,
};

pub async fn run(
    values: Vec<String>,
    strategy: Strategy,
    flavour: Option<GameFlavour>,
    api: Option<ApiGeneration>,
    json: bool,
) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(flavour) = flavour {
        config.game_flavour = flavour;
    }
    if let Some(api) = api {
        config.api = api;
    }
    let game_flavour = config.game_flavour;

    let ctx = Arc::new(Context::new(config)?);
    let resolvers = Resolvers::new(add_resolvers(ctx));

    let defns = values
        .iter()
        .map(|value| -> Result<Defn> {
            Ok(resolvers.parse_value(value)?.with_strategy(strategy))
        })
        .collect::<Result<Vec<Defn>>>()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.set_message(format!(
        "Resolving {} add-on{} for {}...",
        defns.len(),
        if defns.len() == 1 { "" } else { "s" },
        game_flavour
    ));
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let results = resolvers.resolve(defns.clone()).await;
    spinner.finish_and_clear();

    let mut packages = Vec::new();
    let mut failures = 0;
    for (defn, result) in defns.iter().zip(results) {
        match result {
            Ok(pkg) => packages.push(pkg),
            Err(e) => {
                failures += 1;
                eprintln!("  ✗ {}: {}", defn, e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
    } else {
        for pkg in &packages {
            println!("  ✓ {} {}", pkg.name, pkg.version);
            println!("      id:       {}:{}", pkg.source, pkg.id);
            println!("      page:     {}", pkg.url);
            println!("      download: {}", pkg.download_url);
        }
    }

    if failures > 0 {
        anyhow::bail!(
            "{} of {} add-on{} failed to resolve",
            failures,
            defns.len(),
            if defns.len() == 1 { "" } else { "s" }
        );
    }

    Ok(())
}
