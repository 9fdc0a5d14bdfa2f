//! `handover` - CLI for the IT asset handover service
//!
//! Runs the web service and gives shell access to stored records.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::warn;

use handover::cli::{Cli, Command, ConfigCommand, ExportCommand, ServeCommand};
use handover::record::{Field, HandoverRecord};
use handover::web::{self, AppState};
use handover::{document, init_logging, notify, Config, Storage};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(&config, &serve_cmd),
        Command::List(list_cmd) => handle_list(&config, list_cmd.json),
        Command::Export(export_cmd) => handle_export(&config, &export_cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, cli.config, config_cmd),
    }
}

fn open_storage(config: &Config) -> Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening database {}", path.display()))
}

fn handle_serve(config: &Config, cmd: &ServeCommand) -> Result<()> {
    let addr = match cmd.bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };

    if config.uses_default_secret() {
        warn!("server.secret_key is still the default; set SECRET_KEY or HANDOVER_SERVER__SECRET_KEY");
    }

    let notifier = notify::from_config(&config.mail).context("configuring mail notifications")?;
    let state = AppState::new(config.database_path(), notifier);

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime
        .block_on(web::serve(state, addr))
        .with_context(|| format!("serving on {addr}"))
}

fn handle_list(config: &Config, json: bool) -> Result<()> {
    let records = open_storage(config)?.list_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No handover records.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<20}  {:<12}  {:<24}  {:<20}  {:<16}",
        "ID", "Created", "Date", "Employee", "Item", "Serial"
    );
    for record in &records {
        print_row(record);
    }
    Ok(())
}

fn print_row(record: &HandoverRecord) {
    let created = record
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    println!(
        "{:>5}  {:<20}  {:<12}  {:<24}  {:<20}  {:<16}",
        record.id,
        created,
        record.text(Field::Date),
        record.text(Field::EmployeeName),
        record.text(Field::ItemName),
        record.text(Field::Serial),
    );
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> Result<()> {
    let record = open_storage(config)?.require(cmd.id)?;
    let document = document::render(&record)?;

    let path = cmd.output_path();
    document
        .write_to(&path)
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Wrote {}", path.display());
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let path = config.database_path();
    let records = if path.exists() {
        Some(open_storage(config)?.count()?)
    } else {
        None
    };

    if json {
        let status = serde_json::json!({
            "database_path": path,
            "database_exists": records.is_some(),
            "records": records.unwrap_or(0),
            "bind": config.server.bind,
            "mail_active": config.mail.is_active(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("handover status");
        println!("---------------");
        println!("Database:      {}", path.display());
        match records {
            Some(count) => println!("Records:       {count}"),
            None => println!("Records:       0 (database not created yet)"),
        }
        println!("Bind address:  {}", config.server.bind);
        println!(
            "Mail:          {}",
            if config.mail.is_active() {
                "active"
            } else {
                "inactive"
            }
        );
    }
    Ok(())
}

fn handle_config(
    config: &Config,
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind:               {}", config.server.bind);
                println!(
                    "  Secret key:         {}",
                    if config.uses_default_secret() {
                        "default (change it)"
                    } else {
                        "set"
                    }
                );
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Mail]");
                println!("  Enabled:            {}", config.mail.enabled);
                println!("  Relay:              {}:{}", config.mail.server, config.mail.port);
                println!("  STARTTLS:           {}", config.mail.use_tls);
                println!("  Username:           {}", optional(&config.mail.username));
                println!(
                    "  Sender:             {}",
                    config.mail.sender().unwrap_or("-")
                );
                println!("  Recipients:         {}", config.mail.recipients.join(", "));
                println!("  Subject:            {}", config.mail.subject);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            if !path.exists() {
                bail!("configuration file {} does not exist", path.display());
            }
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
