//! `kbase` command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto `kbase_core` use-cases.
//! - Print entries and reports as pretty JSON for scripting.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kbase_core::{
    init_logging, BatchItem, Entry, EntryListQuery, EntryPatch, KbConfig, KnowledgeBase,
    SortOrder, StyleAnalyzer, DEFAULT_DB_FILE,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kbase")]
#[command(version = kbase_core::core_version(), about = "Personal knowledge base manager")]
struct Cli {
    /// JSON file holding the knowledge base
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE)]
    db: PathBuf,

    /// Directory for export files (defaults to the database directory)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write rolling log files to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Store(StoreCommand),
    /// Analyze the writing style of .txt/.md files
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Save the JSON result to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Subcommands operating on the knowledge base file.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Create an entry and print its id
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Tag to attach; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Print one entry
    Show { id: String },
    /// Change the given fields of an entry
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Replacement tag set; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Delete an entry
    Delete { id: String },
    /// List entries
    List {
        /// created_at | updated_at | title; other values keep insertion order
        #[arg(long, default_value = "created_at")]
        sort_by: String,
        #[arg(long, default_value = "desc", value_parser = ["asc", "desc"])]
        order: String,
    },
    /// Case-insensitive keyword search in titles and content
    Search { keyword: String },
    /// Entries carrying any of the given tags; without tags, list all tags in use
    Tags { tags: Vec<String> },
    /// Export the whole knowledge base (markdown | json)
    Export {
        #[arg(long, default_value = "markdown")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let mut config = KbConfig::new(&cli.db);
    if let Some(dir) = &cli.export_dir {
        config = config.with_export_dir(dir);
    }

    match cli.command {
        Command::Analyze { files, output } => analyze(&files, output),
        Command::Store(command) => run_store_command(config, command),
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let Some(dir) = &cli.log_dir else {
        return Ok(());
    };
    let dir = std::path::absolute(dir)
        .with_context(|| format!("failed to resolve log directory `{}`", dir.display()))?;
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or_else(|| kbase_core::default_log_level());
    init_logging(level, &dir.to_string_lossy()).map_err(anyhow::Error::msg)?;
    info!("event=cli_start module=cli status=ok");
    Ok(())
}

fn run_store_command(config: KbConfig, command: StoreCommand) -> Result<()> {
    let db_display = config.db_path.display().to_string();
    let mut kb = KnowledgeBase::open(config)
        .with_context(|| format!("failed to open knowledge base `{db_display}`"))?;

    match command {
        StoreCommand::Add {
            title,
            content,
            tags,
        } => {
            let id = kb.create(title, content, &tags)?;
            println!("{id}");
        }
        StoreCommand::Show { id } => match kb.read(&id) {
            Some(entry) => print_entries(&[entry])?,
            None => bail!("entry not found: {id}"),
        },
        StoreCommand::Update {
            id,
            title,
            content,
            tags,
            clear_tags,
        } => {
            let tags = if clear_tags || !tags.is_empty() {
                Some(tags)
            } else {
                None
            };
            let patch = EntryPatch {
                title,
                content,
                tags,
            };
            if !kb.update(&id, patch)? {
                bail!("entry not found: {id}");
            }
            println!("updated {id}");
        }
        StoreCommand::Delete { id } => {
            if !kb.delete(&id)? {
                bail!("entry not found: {id}");
            }
            println!("deleted {id}");
        }
        StoreCommand::List { sort_by, order } => {
            let order = SortOrder::from_name(&order).unwrap_or_default();
            print_entries(&kb.list_all(&EntryListQuery::from_names(&sort_by, order)))?;
        }
        StoreCommand::Search { keyword } => print_entries(&kb.search(&keyword))?,
        StoreCommand::Tags { tags } if tags.is_empty() => {
            println!("{}", serde_json::to_string_pretty(&kb.list_tags())?);
        }
        StoreCommand::Tags { tags } => print_entries(&kb.filter_by_tags(&tags))?,
        StoreCommand::Export { format } => {
            let path = kb.export(&format)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn analyze(files: &[PathBuf], output: Option<PathBuf>) -> Result<()> {
    let analyzer = StyleAnalyzer::default();
    let rendered = if let [single] = files {
        let report = analyzer
            .analyze_file(single)
            .with_context(|| format!("failed to analyze `{}`", single.display()))?;
        save_if_requested(&analyzer, &report, output)?;
        serde_json::to_string_pretty(&report)?
    } else {
        let results = analyzer.batch_analyze(files);
        save_if_requested(&analyzer, &results, output)?;
        let failed = results
            .iter()
            .filter(|item| matches!(item, BatchItem::Failed { .. }))
            .count();
        if failed > 0 {
            eprintln!("{failed} of {} files failed", results.len());
        }
        serde_json::to_string_pretty(&results)?
    };
    println!("{rendered}");
    Ok(())
}

fn save_if_requested<T: serde::Serialize>(
    analyzer: &StyleAnalyzer,
    value: &T,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = output {
        let saved = analyzer.save_report(value, Some(&path))?;
        eprintln!("saved result to {}", saved.display());
    }
    Ok(())
}

fn print_entries(entries: &[&Entry]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(entries)?);
    Ok(())
}
