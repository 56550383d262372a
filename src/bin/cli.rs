//! nlpland CLI - abstract recovery over a paper dataset
//!
//! Usage: nlpland-cli [OPTIONS] <COMMAND>
//!
//! Supports JSON output for scripting.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use nlpland_lib::db::{Database, PaperRecord, PaperStore};
use nlpland_lib::papers::anthology::{load_feed, merge_anthology_abstracts};
use nlpland_lib::papers::pdf_extractor::{PdfDirectory, StoredText, TextSource};
use nlpland_lib::papers::rule_based::{extract_abstracts_rulebased, RuleBasedOptions};
use nlpland_lib::papers::ExtractionStats;
use nlpland_lib::settings;
use nlpland_lib::text::{LexicalPipeline, MorphyLemmatizer, StopwordSet, Vocabulary};
use nlpland_lib::utils::safe_truncate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ============================================================================
// Main CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "nlpland-cli")]
#[command(version, about = "Abstract recovery for scholarly paper datasets", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Database path (default: settings / PATH_DATASET)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Detailed logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        cmd: DbCommands,
    },
    /// Import paper records (JSON array or JSON Lines)
    Import {
        /// File with paper records
        file: PathBuf,
    },
    /// Abstract extraction and merging
    Abstracts {
        #[command(subcommand)]
        cmd: AbstractCommands,
    },
    /// Paper operations
    Paper {
        #[command(subcommand)]
        cmd: PaperCommands,
    },
    /// Configuration settings
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Show dataset statistics
    Stats,
    /// Show database path
    Path,
}

#[derive(Subcommand)]
enum AbstractCommands {
    /// Extract abstracts from raw text with marker rules
    Extract {
        /// First publication year to include
        #[arg(long)]
        min_year: Option<i32>,
        /// Last publication year to include
        #[arg(long)]
        max_year: Option<i32>,
        /// Restrict to these venues (repeatable)
        #[arg(long = "venue")]
        venues: Vec<String>,
        /// Replace abstracts that already exist
        #[arg(long)]
        overwrite: bool,
        /// Read PDFs from this directory instead of stored raw text
        #[arg(long)]
        papers_dir: Option<PathBuf>,
        /// Use stored raw text even if a papers directory is configured
        #[arg(long, conflicts_with = "papers_dir")]
        stored_text: bool,
    },
    /// Merge abstracts from an anthology feed (always overwrites)
    Merge {
        /// Feed file: JSON array or JSON Lines of {"id", "abstract"}
        feed: PathBuf,
    },
}

#[derive(Subcommand)]
enum PaperCommands {
    /// Show a paper record
    Show {
        id: String,
    },
    /// Print normalized tokens of a paper's abstract
    Tokens {
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all settings
    List,
    /// Set a setting value
    Set {
        /// Setting key
        key: String,
        /// Setting value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "nlpland_lib=debug" } else { "nlpland_lib=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_cli(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<(), String> {
    settings::init(settings::default_data_dir());

    // Handle commands that need no database first
    match &cli.command {
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "nlpland-cli", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Config { cmd } => return handle_config(cmd, cli.json),
        _ => {}
    }

    let db_path = cli.db.as_ref().map(PathBuf::from).unwrap_or_else(settings::get_db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
    }
    tracing::debug!("Using database: {:?}", db_path);
    let mut db = Database::new(&db_path).map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Db { cmd } => handle_db(cmd, &db, cli.json),
        Commands::Import { file } => handle_import(&file, &db, cli.json),
        Commands::Abstracts { cmd } => handle_abstracts(cmd, &mut db, cli.json),
        Commands::Paper { cmd } => handle_paper(cmd, &db, cli.json),
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", out);
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

fn handle_db(cmd: DbCommands, db: &Database, json: bool) -> Result<(), String> {
    match cmd {
        DbCommands::Stats => {
            let total = db.count_papers().map_err(|e| e.to_string())?;
            let (none, rule, anthology) = db.count_by_source().map_err(|e| e.to_string())?;

            if json {
                #[derive(Serialize)]
                struct DbStatsJson {
                    path: String,
                    papers: usize,
                    without_abstract: usize,
                    rule: usize,
                    anthology: usize,
                }
                print_json(&DbStatsJson { path: db.get_path(), papers: total, without_abstract: none, rule, anthology })?;
            } else {
                println!("Database:    {}", db.get_path());
                println!("Papers:      {:>6}", total);
                println!("No abstract: {:>6}", none);
                println!("Rule:        {:>6}", rule);
                println!("Anthology:   {:>6}", anthology);
            }
        }
        DbCommands::Path => {
            if json {
                print_json(&serde_json::json!({ "path": db.get_path() }))?;
            } else {
                println!("{}", db.get_path());
            }
        }
    }
    Ok(())
}

fn handle_import(file: &Path, db: &Database, json: bool) -> Result<(), String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;

    let records: Vec<PaperRecord> = if content.trim_start().starts_with('[') {
        serde_json::from_str(&content).map_err(|e| format!("Invalid paper JSON: {}", e))?
    } else {
        let mut records = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PaperRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("[Import] Skipping line {}: {}", line_no + 1, e),
            }
        }
        records
    };

    let imported = db.upsert_papers(&records).map_err(|e| e.to_string())?;
    if json {
        print_json(&serde_json::json!({ "imported": imported }))?;
    } else {
        println!("Imported {} papers into {}", imported, db.get_path());
    }
    Ok(())
}

fn handle_abstracts(cmd: AbstractCommands, db: &mut Database, json: bool) -> Result<(), String> {
    match cmd {
        AbstractCommands::Extract { min_year, max_year, venues, overwrite, papers_dir, stored_text } => {
            let config = settings::get();
            let options = RuleBasedOptions {
                min_year: min_year.unwrap_or(config.min_year),
                max_year: max_year.unwrap_or(config.max_year),
                venues: if venues.is_empty() { None } else { Some(venues) },
                overwrite,
                checkpoint_interval: config.checkpoint_interval,
            };

            let mut store = db.load_store().map_err(|e| e.to_string())?;
            let papers_dir = if stored_text { None } else { papers_dir.or_else(settings::get_papers_dir) };
            let stats = match papers_dir {
                Some(dir) => {
                    println!("[Extract] Reading PDFs from {}", dir.display());
                    run_extraction(&mut store, &PdfDirectory::new(dir), &options, db)?
                }
                None => run_extraction(&mut store, &StoredText, &options, db)?,
            };

            if json {
                print_json(&stats)?;
            } else {
                stats.print_summary();
            }
        }
        AbstractCommands::Merge { feed } => {
            let entries = load_feed(&feed).map_err(|e| e.to_string())?;
            let mut store = db.load_store().map_err(|e| e.to_string())?;
            let result = merge_anthology_abstracts(&mut store, entries);
            db.save_abstracts(&mut store).map_err(|e| e.to_string())?;

            if json {
                print_json(&result)?;
            } else {
                result.print_summary();
            }
        }
    }
    Ok(())
}

fn run_extraction(
    store: &mut PaperStore,
    source: &impl TextSource,
    options: &RuleBasedOptions,
    db: &mut Database,
) -> Result<ExtractionStats, String> {
    extract_abstracts_rulebased(store, source, options, db).map_err(|e| e.to_string())
}

fn handle_paper(cmd: PaperCommands, db: &Database, json: bool) -> Result<(), String> {
    match cmd {
        PaperCommands::Show { id } => {
            let paper = db.get_paper(&id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("Paper not found: {}", id))?;

            if json {
                print_json(&paper)?;
            } else {
                println!("{} ({}, {})", paper.id, paper.venue, paper.year);
                println!("URL:      {}", paper.url);
                println!("Source:   {}", paper.abstract_source().as_str());
                if let Some(text) = paper.abstract_str() {
                    let preview = safe_truncate(text.trim(), 600);
                    println!("Abstract: {}{}", preview, if preview.len() < text.trim().len() { "..." } else { "" });
                }
            }
        }
        PaperCommands::Tokens { id } => {
            let paper = db.get_paper(&id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("Paper not found: {}", id))?;
            let text = paper.abstract_str()
                .ok_or_else(|| format!("Paper {} has no abstract", id))?;

            let pipeline = build_pipeline()?;
            let tokens = pipeline.preprocess(text);
            if json {
                print_json(&tokens)?;
            } else {
                println!("{}", tokens.join(" "));
            }
        }
    }
    Ok(())
}

/// Lexical resources, loaded once
fn build_pipeline() -> Result<LexicalPipeline, String> {
    let vocabulary = match settings::get_vocabulary_path() {
        Some(path) => Vocabulary::from_file(&path)?,
        None => {
            tracing::warn!("No vocabulary configured (PATH_VOCABULARY); dehyphenation keeps all hyphens");
            Vocabulary::empty()
        }
    };
    let vocabulary = Arc::new(vocabulary);
    let stopwords = StopwordSet::english().with_extra(settings::get().extra_stopwords);

    Ok(LexicalPipeline::new(
        vocabulary.clone(),
        Arc::new(stopwords),
        Box::new(MorphyLemmatizer::new(vocabulary)),
    ))
}

fn handle_config(cmd: &ConfigCommands, json: bool) -> Result<(), String> {
    match cmd {
        ConfigCommands::List => {
            let config = settings::get();
            if json {
                print_json(&config)?;
            } else {
                println!("papers_dir:          {}", config.papers_dir.as_deref().unwrap_or("-"));
                println!("db_path:             {}", settings::get_db_path().display());
                println!("vocabulary_path:     {}", config.vocabulary_path.as_deref().unwrap_or("-"));
                println!("extra_stopwords:     {}", config.extra_stopwords.join(", "));
                println!("checkpoint_interval: {}", config.checkpoint_interval);
                println!("min_year:            {}", config.min_year);
                println!("max_year:            {}", config.max_year);
            }
        }
        ConfigCommands::Set { key, value } => {
            let value = value.clone();
            match key.as_str() {
                "papers_dir" => settings::update(|s| s.papers_dir = Some(value))?,
                "db_path" => settings::update(|s| s.db_path = Some(value))?,
                "vocabulary_path" => settings::update(|s| s.vocabulary_path = Some(value))?,
                "extra_stopwords" => {
                    let words = value.split(',').map(|w| w.trim().to_string()).filter(|w| !w.is_empty()).collect();
                    settings::update(|s| s.extra_stopwords = words)?
                }
                "checkpoint_interval" => {
                    let n = parse_setting::<usize>(key, &value)?;
                    settings::update(|s| s.checkpoint_interval = n)?
                }
                "min_year" => {
                    let n = parse_setting::<i32>(key, &value)?;
                    settings::update(|s| s.min_year = n)?
                }
                "max_year" => {
                    let n = parse_setting::<i32>(key, &value)?;
                    settings::update(|s| s.max_year = n)?
                }
                other => return Err(format!("Unknown setting: {}", other)),
            }
            println!("{} updated", key);
        }
    }
    Ok(())
}

/// Parse a numeric setting at its target width, rejecting out-of-range values
fn parse_setting<T>(key: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| format!("Invalid value for {}: {} ({})", key, value, e))
}
