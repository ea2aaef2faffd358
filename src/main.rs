//! Stash Advisor
//!
//! Tells you which items to keep, sell or hold on to situationally, based on
//! your quest, project and hideout progress.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use stash_advisor::models::Decision;
use stash_advisor::{db, import, report, sample, weapons, DecisionEngine, PlayerProgress};

#[derive(Parser)]
#[command(name = "stash-advisor")]
#[command(about = "Keep / sell recommendations for your raider stash")]
struct Cli {
    /// Path to the SQLite database holding the imported dataset
    #[arg(short, long, default_value = "stash_data.db")]
    database: PathBuf,

    /// Path to the player progress file
    #[arg(short, long, default_value = "progress.json")]
    progress: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Import items, quests, projects and hideout modules from a data directory
    Import {
        /// Directory containing items/, quests/, projects/ and hideout/ JSON
        data_dir: PathBuf,

        /// JSON file mapping item ids to coin values
        #[arg(long)]
        prices: Option<PathBuf>,
    },

    /// Load sample data for testing (without a data export)
    LoadSample,

    /// Show the recommendation for one item
    Classify {
        /// Item ID (e.g., "metal_parts")
        id: String,
    },

    /// Classify every item in the catalog
    List {
        /// Only show one decision (keep, sell_or_recycle, situational)
        #[arg(short = 'D', long)]
        decision: Option<String>,
    },

    /// Count items per decision
    Summary,

    /// List the items crafted from an ingredient
    UsedIn {
        /// Ingredient item ID
        id: String,
    },

    /// Show tiered weapon families and their upgrade costs
    Weapons,

    /// Inspect or change player progress
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },
}

#[derive(Subcommand)]
enum ProgressAction {
    /// Print the current progress file
    Show,
    /// Mark a quest as completed
    CompleteQuest { id: String },
    /// Mark a quest as not completed
    ReopenQuest { id: String },
    /// Mark a project as completed
    CompleteProject { id: String },
    /// Mark a project as not completed
    ReopenProject { id: String },
    /// Set the current level of a hideout module
    SetLevel {
        module: String,
        #[arg(allow_negative_numbers = true)]
        level: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Init => {
            let counts = db::dataset_counts(&conn)?;
            println!("Database initialized at: {}", cli.database.display());
            println!(
                "  {} items, {} quests, {} projects, {} hideout modules",
                counts.items, counts.quests, counts.projects, counts.hideout_modules
            );
        }

        Commands::Import { data_dir, prices } => {
            let stats = import::import_to_database(&conn, &data_dir, prices.as_deref())?;
            println!("\n{}", stats);
        }

        Commands::LoadSample => {
            let dataset = sample::sample_dataset();
            db::clear_dataset(&conn)?;
            db::store_dataset(&conn, &dataset)?;
            println!("Loaded {} sample items", dataset.items.len());
        }

        Commands::Classify { id } => {
            let engine = load_engine(&conn)?;
            let progress = PlayerProgress::load(&cli.progress)?;
            match engine.item(&id) {
                Some(item) => {
                    let (rule, verdict) = engine.explain(item, &progress);
                    print!("{}", report::format_verdict(item, Some(rule), &verdict));
                }
                None => println!("Item '{}' not found", id),
            }
        }

        Commands::List { decision } => {
            let filter = match decision.as_deref() {
                Some(tag) => match Decision::parse(tag) {
                    Some(d) => Some(d),
                    None => bail!("Unknown decision '{}'", tag),
                },
                None => None,
            };

            let engine = load_engine(&conn)?;
            let progress = PlayerProgress::load(&cli.progress)?;
            let rows: Vec<_> = engine
                .classify_all(&progress)
                .into_iter()
                .filter(|(_, v)| filter.is_none_or(|d| v.decision == d))
                .collect();
            print!("{}", report::format_verdict_table(&rows));
        }

        Commands::Summary => {
            let engine = load_engine(&conn)?;
            let progress = PlayerProgress::load(&cli.progress)?;
            let rows = engine.classify_all(&progress);
            let counts = engine.count_by_decision(&progress);
            println!("{}", report::DecisionSummary::new(counts, &rows));
        }

        Commands::UsedIn { id } => {
            let engine = load_engine(&conn)?;
            match engine.item(&id) {
                Some(item) => {
                    let users = engine.items_using_ingredient(&id);
                    print!("{}", report::format_ingredient_usage(item, &users));
                }
                None => println!("Item '{}' not found", id),
            }
        }

        Commands::Weapons => {
            let engine = load_engine(&conn)?;
            let groups = weapons::group_variants(engine.catalog().iter());
            print!("{}", report::format_weapon_groups(&groups));
        }

        Commands::Progress { action } => run_progress(&cli.progress, action)?,
    }

    Ok(())
}

fn load_engine(conn: &Connection) -> Result<DecisionEngine> {
    let dataset = db::load_dataset(conn)?;
    if dataset.items.is_empty() {
        bail!("No items in database. Run 'import' or 'load-sample' first.");
    }
    Ok(DecisionEngine::new(dataset))
}

fn run_progress(path: &Path, action: ProgressAction) -> Result<()> {
    let mut progress = PlayerProgress::load(path)?;

    let changed = match action {
        ProgressAction::Show => {
            println!("{}", serde_json::to_string_pretty(&progress)?);
            return Ok(());
        }
        ProgressAction::CompleteQuest { id } => progress.complete_quest(&id),
        ProgressAction::ReopenQuest { id } => progress.reopen_quest(&id),
        ProgressAction::CompleteProject { id } => progress.complete_project(&id),
        ProgressAction::ReopenProject { id } => progress.reopen_project(&id),
        ProgressAction::SetLevel { module, level } => progress.set_hideout_level(&module, level),
    };

    if changed {
        progress.save(path)?;
        println!("Progress saved to {}", path.display());
    } else {
        println!("No change");
    }
    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}
