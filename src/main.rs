use anyhow::Result;
use clap::{CommandFactory, Parser};
use multisum::app::{RunOptions, summarize_file, summarize_text};
use multisum::cli::{Cli, Commands, ConfigAction, ModelsAction};
use multisum::config::Config;
use multisum::diagnostics::check_dependencies;
use multisum::extract::command::SystemCommandExecutor;
use multisum::models::catalog::{get_model, list_models};
use multisum::models::download::{download_model, format_model_info, is_model_installed};
use multisum::models::summary_catalog::{is_cached, list_summary_models};
use owo_colors::OwoColorize;
use std::io::{IsTerminal, Read};
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    multisum::logging::init(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let options = RunOptions {
        quiet: cli.quiet,
        no_download: cli.no_download,
    };

    match cli.command {
        Commands::File { path, file_type } => {
            let config = load_config(cli.config.as_deref())?;
            let summary = summarize_file(config, &path, file_type.as_deref(), options).await?;
            println!("{}", summary.text);
        }
        Commands::Text { text } => {
            let config = load_config(cli.config.as_deref())?;
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            let summary = summarize_text(config, &text, options).await?;
            println!("{}", summary.text);
        }
        Commands::Models { action } => {
            handle_models_command(action, cli.quiet).await?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Check => {
            let config = load_config(cli.config.as_deref())?;
            if !check_dependencies(&config, &SystemCommandExecutor::new()) {
                std::process::exit(1);
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "multisum",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config), which must exist
/// 2. Default config path (~/.config/multisum/config.toml)
/// 3. Built-in defaults
///
/// Environment variable overrides apply on top of all three.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config.with_env_overrides())
}

/// Read the text to summarize from a pipe.
fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("no text given; pass it as an argument or pipe it on stdin");
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}

/// Handle model management commands.
async fn handle_models_command(action: ModelsAction, quiet: bool) -> Result<()> {
    match action {
        ModelsAction::List => {
            println!("Whisper models:");
            for model in list_models() {
                println!("  {}", format_model_info(model));
            }
        }
        ModelsAction::Install { name } => {
            let Some(model) = get_model(&name) else {
                let available: Vec<&str> = list_models().iter().map(|m| m.name).collect();
                anyhow::bail!(
                    "unknown model '{name}'. Available: {}",
                    available.join(", ")
                );
            };

            if is_model_installed(model.name) {
                if !quiet {
                    println!("Model '{}' is already installed.", model.name);
                }
                return Ok(());
            }

            let path = download_model(model.name, !quiet).await?;
            if !quiet {
                println!("Installed '{}' to {}", model.name, path.display());
            }
        }
        ModelsAction::Summarizers => {
            println!("Summarization models:");
            for model in list_summary_models() {
                let status = if is_cached(model) {
                    "[cached]"
                } else {
                    "[downloads on first use]"
                };
                println!("  {:16} {:5} MB   {}", model.name, model.size_mb, status);
            }
        }
    }

    Ok(())
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Dump => {
            print!("{}", Config::dump_template());
        }
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_display_toml()?);
        }
        ConfigAction::Get { key } => {
            let config = load_config(custom_path)?;
            println!("{}", config.get_value_by_path(&key)?);
        }
    }

    Ok(())
}
