//! dbmeta - query per-entity metadata folders with a small SQL subset

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use dbmeta::database::Database;
use dbmeta::executor::Pipeline;
use dbmeta::loader::DEFAULT_METADATA_FILE;
use std::io::{self, BufRead};
use std::path::PathBuf;

/// dbmeta - SQL over a directory of JSON metadata files
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one sub-directory per entity
    #[arg(short = 'D', long, default_value = "raw_dat")]
    data_dir: PathBuf,

    /// Metadata file name inside each entity directory
    #[arg(short, long, default_value = DEFAULT_METADATA_FILE)]
    metadata_file: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// List the loaded tables and exit
    #[arg(long)]
    tables: bool,

    /// Queries to run; read one per line from stdin when none are given
    queries: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let database = Database::open(&args.data_dir, &args.metadata_file)?;

    if args.tables {
        for table in database.catalog().list_tables() {
            println!("{} ({} rows)", table.name(), table.len());
        }
        println!("{} tables", database.catalog().table_count());
        return Ok(());
    }

    if !args.queries.is_empty() {
        for query in &args.queries {
            run_query(&database, query, args.json)?;
        }
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read query from stdin")?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        // Keep going after a bad query when reading interactively
        if let Err(e) = run_query(&database, query, args.json) {
            eprintln!("Error: {:#}", e);
        }
    }

    Ok(())
}

fn run_query(database: &Database, query: &str, json: bool) -> Result<()> {
    let result = database.sql(query)?;
    print_result(&result, json)
}

fn print_result(result: &Pipeline, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result.all())?);
    } else {
        println!();
        print!("{}", result);
    }
    Ok(())
}
