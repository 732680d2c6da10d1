mod cli;
mod paths;
mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cli::{Command, ConfigAction};
use paths::AppPaths;
use viewconfig::ViewConfig;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Config(config_cmd)) => handle_config_command(config_cmd.action),
        None => run::run(cli.run),
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Where => run_config_where(),
        ConfigAction::Check { file } => run_config_check(file),
        ConfigAction::Default => run_config_default(),
    }
}

fn run_config_where() -> Result<()> {
    let paths = AppPaths::discover()?;
    let file = paths.config_file();
    println!("Configuration:");
    println!("  dir:   {}", paths.config_dir().display());
    println!(
        "  file:  {} ({})",
        file.display(),
        if file.exists() { "present" } else { "missing" }
    );
    Ok(())
}

fn run_config_check(file: Option<PathBuf>) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => AppPaths::discover()?.config_file(),
    };
    println!("{}", run::check_config(&path)?);
    Ok(())
}

fn run_config_default() -> Result<()> {
    let rendered = ViewConfig::default()
        .to_toml_string()
        .context("failed to render default configuration")?;
    print!("{rendered}");
    Ok(())
}
