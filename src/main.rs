//! i18n-config
//!
//! Resolves a layered, locale-aware configuration directory tree and prints
//! the result.

use anyhow::{Context, Result};
use clap::Parser;
use i18n_config::cli::{Cli, Command, OutputFormat};
use i18n_config::{Config, ConfigBuilder, Locale};
use serde_json::Value;
use std::fs::OpenOptions;
use std::process::ExitCode;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)
                .with_context(|| format!("failed to open log file {filename}"))?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let builder = builder_from_cli(&cli)?;
    debug!(?builder, "Configured builder");

    match cli.command.clone().unwrap_or(Command::Show) {
        Command::Show => {
            let config = builder.build()?;
            println!("{}", render(config.as_value(), cli.format)?);
        }
        Command::Get { path } => {
            let config = builder.build()?;
            return print_value(&config, &path, cli.format);
        }
        Command::Sections => {
            let config = builder.build()?;
            for section in config.sections() {
                println!("{section}");
            }
        }
        Command::Sequences => {
            for (section, files) in builder.sequences()? {
                println!("{section}:");
                print!("{files}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Apply the global options to a fresh builder.
fn builder_from_cli(cli: &Cli) -> Result<ConfigBuilder> {
    let mut builder = ConfigBuilder::new();
    if let Some(root) = &cli.root {
        builder = builder.with_root_dir(root)?;
    }
    if let Some(profile) = &cli.profile {
        builder = builder.with_profile_dir(profile)?;
    }
    if let Some(file) = &cli.config_file {
        builder = builder.with_config_file(file)?;
    }
    if let Some(locale) = &cli.locale {
        builder = builder.with_locale(Locale::parse(locale)?);
    }
    if let Some(locale) = &cli.default_locale {
        builder = builder.with_default_locale(Locale::parse(locale)?);
    }
    Ok(builder)
}

fn print_value(config: &Config, path: &str, format: OutputFormat) -> Result<ExitCode> {
    match config.get(path) {
        Some(value) if !value.is_null() => {
            // Scalars print bare so the output can be used in shell scripts
            match value {
                Value::String(s) => println!("{s}"),
                Value::Number(_) | Value::Bool(_) => println!("{value}"),
                _ => println!("{}", render(value, format)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!("{path}: not found");
            Ok(ExitCode::from(1))
        }
    }
}

fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?.trim_end().to_string(),
    };
    Ok(rendered)
}
