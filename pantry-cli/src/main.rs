//! pantry - print and edit a pantry inventory table.
//!
//! Usage:
//!   pantry                               # demo pantry, print the table
//!   pantry --sort name --filter name=Eg  # sorted and filtered
//!   pantry toggle Eggs                   # flip the stock flag of a row
//!   pantry expire Milk 2025-02-01        # set (or `none` to clear) an expiration
//!   pantry add Turkey                    # add an ingredient
//!   pantry remove Milk                   # remove a row
//!   pantry ingredients                   # list the catalog for adding
//!   pantry ingredients chk --available   # fuzzy-search what can still be added
//!   pantry --url http://host/api --user <UUID> --pantry <UUID>

mod config;
mod demo;
mod error;
mod paths;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{error, info};
use pantry_lib::model::{PantryItem, UserId};
use pantry_lib::{HttpGateway, PantryGateway};
use pantry_table::render::render_table;
use pantry_table::{EditOutcome, FilterMode, PantrySession, RenderContext, SortDirection, SortState};
use simplelog::{Config, LevelFilter, WriteLogger};
use uuid::Uuid;

use crate::error::CliError;

/// Inventory table for a pantry.
#[derive(Parser)]
#[command(name = "pantry", about = "Pantry inventory table")]
struct Args {
    /// Backend base URL. Without it a seeded demo pantry is used.
    #[arg(long)]
    url: Option<String>,

    /// Session token sent to the backend.
    #[arg(long, requires = "url")]
    token: Option<String>,

    /// Acting user id (required with --url).
    #[arg(long, requires = "url")]
    user: Option<Uuid>,

    /// Pantry id (required with --url).
    #[arg(long, requires = "url")]
    pantry: Option<Uuid>,

    /// Column to sort by.
    #[arg(long, value_name = "COLUMN")]
    sort: Option<String>,

    /// Sort descending.
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Column filter, repeatable.
    #[arg(long, value_name = "COLUMN=TEXT")]
    filter: Vec<String>,

    /// Filter matching: case-sensitive, case-insensitive or fuzzy.
    #[arg(long, value_parser = parse_filter_mode)]
    filter_mode: Option<FilterMode>,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 400)]
    viewport: u64,

    /// Scroll offset in pixels.
    #[arg(long, default_value_t = 0)]
    scroll: u64,

    /// Config file (default: platform config dir).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the table.
    Show,
    /// Flip the stock flag of an ingredient's row.
    Toggle { name: String },
    /// Set an expiration date (YYYY-MM-DD), or `none` to clear it.
    Expire { name: String, date: String },
    /// Add an ingredient from the catalog.
    Add { name: String },
    /// Remove an ingredient's row.
    Remove { name: String },
    /// List the catalog grouped by category, or search it.
    Ingredients {
        /// Fuzzy query over ingredient names.
        query: Option<String>,
        /// Only ingredients not yet in the pantry.
        #[arg(long)]
        available: bool,
    },
}

fn parse_filter_mode(s: &str) -> Result<FilterMode, String> {
    match s {
        "case-sensitive" => Ok(FilterMode::CaseSensitive),
        "case-insensitive" => Ok(FilterMode::CaseInsensitive),
        "fuzzy" => Ok(FilterMode::Fuzzy),
        other => Err(format!("unknown filter mode '{}'", other)),
    }
}

fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("Warning: cannot create log directory {}: {}", dir.display(), e);
        return;
    }
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Warning: cannot initialize logging: {}", e);
            }
        }
        Err(e) => eprintln!("Warning: cannot write log file {}: {}", path.display(), e),
    }
}

fn find_row(session: &PantrySession, name: &str) -> Result<PantryItem, CliError> {
    session
        .table()
        .rows()
        .iter()
        .find(|row| row.ingredient.name.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| CliError::NotInPantry(name.to_string()))
}

fn report(outcome: EditOutcome<pantry_lib::model::FieldValue>) -> Result<(), CliError> {
    match outcome {
        EditOutcome::Committed(value) => {
            println!("Saved: {:?}", value);
            Ok(())
        }
        EditOutcome::RolledBack { error, .. } => Err(CliError::Reverted(error)),
        EditOutcome::Superseded | EditOutcome::Discarded => Ok(()),
    }
}

async fn run_command(session: &PantrySession, command: Command) -> Result<(), CliError> {
    match command {
        Command::Show => Ok(()),
        Command::Toggle { name } => {
            let row = find_row(session, &name)?;
            report(session.toggle_stock(row.id).await?)
        }
        Command::Expire { name, date } => {
            let row = find_row(session, &name)?;
            let date = if date.eq_ignore_ascii_case("none") {
                None
            } else {
                let parsed = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .map_err(|source| CliError::InvalidDate { input: date.clone(), source })?;
                Some(parsed)
            };
            report(session.set_expiration(row.id, date).await?)
        }
        Command::Add { name } => {
            let picker = session.picker().await?;
            let entry = picker
                .find(&name)
                .ok_or_else(|| CliError::NotInCatalog(name.clone()))?;
            let item = session.add(entry.ingredient.id, None, None).await?;
            println!("Added {}", item.ingredient.name);
            Ok(())
        }
        Command::Remove { name } => {
            let row = find_row(session, &name)?;
            session.remove(row.id).await?;
            println!("Removed {}", row.ingredient.name);
            Ok(())
        }
        Command::Ingredients { query: Some(query), available } => {
            let picker = session.picker().await?;
            for entry in picker.search(&query) {
                if available && entry.in_inventory {
                    continue;
                }
                println!("{} ({})", entry.ingredient.name, entry.ingredient.category);
            }
            Ok(())
        }
        Command::Ingredients { query: None, available: true } => {
            let picker = session.picker().await?;
            for ingredient in picker.available() {
                println!("{} ({})", ingredient.name, ingredient.category);
            }
            Ok(())
        }
        Command::Ingredients { query: None, available: false } => {
            let picker = session.picker().await?;
            for group in picker.groups() {
                println!("{}", group.category);
                for entry in &group.entries {
                    let mark = if entry.in_inventory { " (in pantry)" } else { "" };
                    println!("  {}{}", entry.ingredient.name, mark);
                }
            }
            Ok(())
        }
    }
}

async fn connect(
    args: &Args,
    today: NaiveDate,
    timeout: Duration,
) -> Result<(Arc<dyn PantryGateway>, UserId, Uuid), CliError> {
    let Some(url) = &args.url else {
        let (gateway, user, pantry_id) = demo::seed(today).await?;
        info!("Using demo pantry {}", pantry_id);
        return Ok((Arc::new(gateway), user, pantry_id));
    };

    let (Some(user), Some(pantry_id)) = (args.user, args.pantry) else {
        return Err(CliError::MissingIds);
    };
    let mut builder = HttpGateway::builder().url(url.clone()).timeout(timeout);
    if let Some(token) = &args.token {
        builder = builder.session_token(token.clone());
    }
    let gateway = builder.build()?;
    info!("Using backend {}", gateway.base_url());
    Ok((Arc::new(gateway), UserId::new(user), pantry_id))
}

async fn run(args: Args) -> Result<(), CliError> {
    let config_path = args.config.clone().or_else(paths::config_file);
    let mut config = match &config_path {
        Some(path) => config::load(path)?,
        None => Default::default(),
    };
    if let Some(mode) = args.filter_mode {
        config = config.filter_mode(mode);
    }

    let today = chrono::Local::now().date_naive();
    let (gateway, user, pantry_id) = connect(&args, today, config.request_timeout).await?;
    let session = PantrySession::mount(gateway, user, pantry_id, config).await?;

    if let Some(command) = args.command {
        run_command(&session, command).await?;
    }

    let table = session.table();
    if let Some(column) = &args.sort {
        let direction = if args.desc { SortDirection::Descending } else { SortDirection::Ascending };
        table.set_sort(SortState::by(column.clone(), direction));
    }
    for filter in &args.filter {
        let Some((column, value)) = filter.split_once('=') else {
            return Err(CliError::InvalidFilter(filter.clone()));
        };
        if !table.set_filter(column, value) {
            return Err(CliError::NotFilterable(column.to_string()));
        }
    }
    table.set_viewport_height(args.viewport);
    table.scroll_to(args.scroll);

    for line in render_table(table, &RenderContext::new(today)) {
        println!("{}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
