use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::LevelFilter;

use prettyxml::{Cli, ConfigManager, PrettyPrinter, Registry, SystemEnvProvider};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn run(cli: &Cli) -> Result<()> {
    let registry = Arc::new(Registry::builtin().context("Failed to load bundled presets")?);

    if cli.list {
        print_catalogue(&registry);
        return Ok(());
    }

    if let Some(path) = &cli.save_properties {
        let properties = ConfigManager::load_properties(
            cli,
            &registry,
            &SystemEnvProvider,
        )
        .context("Failed to load properties")?;
        ConfigManager::save_properties(&properties, path)
            .with_context(|| format!("Failed to store properties in {}", path.display()))?;
        return Ok(());
    }

    let settings =
        ConfigManager::load_settings(cli, &registry).context("Invalid configuration")?;

    PrettyPrinter::new(registry)
        .execute(&settings)
        .context("Failed to prettyprint document")
}

fn print_catalogue(registry: &Registry) {
    let default = registry.default_preset().map(|(name, _)| name);
    println!("Presets:");
    for name in registry.preset_names() {
        let marker = if Some(name) == default { " (default)" } else { "" };
        println!("  {}{}", name, marker);
    }
    println!("Transforms:");
    for name in registry.transform_names() {
        println!("  {}", name);
    }
    println!("Stylesheet resources (require a stylesheet engine):");
    for name in registry.resource_names() {
        println!("  {}", name);
    }
    println!("Encodings:");
    for encoding in registry.encodings() {
        println!("  {}", encoding);
    }
}
