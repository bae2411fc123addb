//! `squirrels` - CLI for squirrel-tracker
//!
//! This binary provides one-shot commands over the sighting store and an
//! interactive shell.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;

use squirrel_tracker::cli::{Cli, Command, ConfigCommand, FieldArgs, Shell};
use squirrel_tracker::config::DisplayFormat;
use squirrel_tracker::controller::Saved;
use squirrel_tracker::{init_logging, render, Config, FormSession, RecordController, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Config(config_cmd) => handle_config(&mut out, &config, config_cmd)?,
        Command::Shell => {
            let controller = connect(&config)?;
            let mut shell = Shell::new(
                controller,
                config.display.page_size,
                config.display.format,
            );
            shell
                .run(BufReader::new(tokio::io::stdin()), &mut out)
                .await?;
        }
        Command::List(cmd) => {
            let controller = load(&config).await?;
            let page = controller.page(cmd.page, config.display.page_size);
            let format = cmd.format.map_or(config.display.format, Into::into);
            render::page(&mut out, &page, format)?;
        }
        Command::Stats(cmd) => {
            let controller = load(&config).await?;
            if cmd.json {
                render::stats(&mut out, &controller.stats(), DisplayFormat::Json)?;
            } else {
                render::stats(&mut out, &controller.stats(), DisplayFormat::Plain)?;
                let storage = controller.store().stats()?;
                writeln!(
                    out,
                    "Database:        {} ({} bytes)",
                    controller.store().path().display(),
                    storage.db_size_bytes
                )?;
            }
        }
        Command::Add(fields) => {
            let controller = connect(&config)?;
            let mut form = FormSession::new();
            form.open_for_create();
            save(&mut out, &mut form, &fields, &controller).await?;
        }
        Command::Edit(cmd) => {
            let controller = load(&config).await?;
            let mut form = FormSession::new();
            form.open_for_edit(controller.get(cmd.id)?);
            save(&mut out, &mut form, &cmd.fields, &controller).await?;
        }
        Command::View(cmd) => {
            let controller = load(&config).await?;
            let record = controller.get(cmd.id)?;
            let format = if cmd.json {
                DisplayFormat::Json
            } else {
                DisplayFormat::Plain
            };
            render::detail(&mut out, &record, format)?;
        }
        Command::Favorite(cmd) => {
            let controller = load(&config).await?;
            let record = controller.get(cmd.id)?;
            let toggled = controller.toggle_favorite(&record).await?;
            writeln!(out, "{}", toggled.direction)?;
        }
    }
    Ok(())
}

/// Open the configured database.
fn connect(config: &Config) -> anyhow::Result<RecordController<Storage>> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("cannot use database {}", path.display()))?;
    info!("Using database {}", path.display());
    Ok(RecordController::new(storage))
}

/// Open the configured database and load the list.
async fn load(config: &Config) -> anyhow::Result<RecordController<Storage>> {
    let controller = connect(config)?;
    controller.refresh().await?;
    Ok(controller)
}

async fn save(
    out: &mut impl Write,
    form: &mut FormSession,
    fields: &FieldArgs,
    controller: &RecordController<Storage>,
) -> anyhow::Result<()> {
    fields.apply(form.values_mut()?);
    let saved = form.confirm_current(controller).await?;
    report_saved(out, &saved)
}

fn report_saved(out: &mut impl Write, saved: &Saved) -> anyhow::Result<()> {
    writeln!(out, "{}", saved.kind.message())?;
    if let Some(record) = &saved.record {
        writeln!(out, "  id: {}", record.id)?;
    }
    Ok(())
}

fn handle_config(
    out: &mut impl Write,
    config: &Config,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(config)?)?;
            } else {
                writeln!(out, "Current Configuration")?;
                writeln!(out, "=====================")?;
                writeln!(out)?;
                writeln!(out, "[Storage]")?;
                writeln!(
                    out,
                    "  Database path:  {}",
                    config.database_path().display()
                )?;
                writeln!(out)?;
                writeln!(out, "[Display]")?;
                writeln!(out, "  Page size:      {}", config.display.page_size)?;
                writeln!(out, "  Format:         {:?}", config.display.format)?;
            }
        }
        ConfigCommand::Path => {
            writeln!(out, "{}", Config::default_config_path().display())?;
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            writeln!(out, "Validating configuration: {}", path.display())?;
            match Config::load_from(Some(path)) {
                Ok(_) => writeln!(out, "Configuration is valid.")?,
                Err(e) => writeln!(out, "Configuration error: {e}")?,
            }
        }
    }
    Ok(())
}
