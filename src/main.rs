use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mediatree::cli::{
    run_copy, run_ls, run_move, run_remove, run_repair, run_scan, run_status, run_tree,
};
use mediatree::config::resolve_db_path;
use mediatree::logging::{init_logging, LOG_ENV};
use mediatree::store::MutationOutcome;

#[derive(Parser)]
#[command(name = "mediatree")]
#[command(about = "Browse and reorganize a media collection as a folder tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Library database (defaults to $MEDIATREE_DB, then the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a directory's photos, text files and folders to the library
    Scan {
        /// Directory to scan
        path: PathBuf,
    },
    /// Show library counts and the tree root
    Status,
    /// Print the folder hierarchy
    Tree {
        /// Folder to start from (absolute, or relative to the tree root)
        path: Option<String>,
    },
    /// List one folder's contents
    Ls {
        /// Folder to list (absolute, or relative to the tree root)
        path: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Move files and folders into another folder
    Mv {
        /// Files and folders to move
        #[arg(required = true)]
        items: Vec<PathBuf>,
        /// Destination folder (created if missing)
        #[arg(long)]
        to: PathBuf,
        /// Show what would move without touching anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Copy files and folders into another folder
    Cp {
        /// Files and folders to copy
        #[arg(required = true)]
        items: Vec<PathBuf>,
        /// Destination folder (created if missing)
        #[arg(long)]
        to: PathBuf,
        /// Show what would be copied without touching anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete files and folders
    Rm {
        /// Files and folders to delete
        #[arg(required = true)]
        items: Vec<PathBuf>,
        /// Only forget the library records, leave the disk alone
        #[arg(long)]
        keep_files: bool,
    },
    /// Repair folder parent relationships based on paths
    Repair,
}

fn main() -> Result<()> {
    // Initialize logging - guard must be held for logs to flush
    let _guard = init_logging().ok();
    let verbose = std::env::var(LOG_ENV).is_ok();
    let start = Instant::now();

    let cli = Cli::parse();

    let result = run_command(cli);

    if verbose {
        let elapsed = start.elapsed();
        eprintln!("Completed in {:.2?}", elapsed);
    }

    result
}

fn run_command(cli: Cli) -> Result<()> {
    let db_path = resolve_db_path(cli.db.as_deref())?;

    match cli.command {
        Commands::Scan { path } => {
            println!("Scanning: {}", path.display());
            let stats = run_scan(&db_path, &path)?;
            println!(
                "Scanned: {} folders, {} files ({} photos, {} text files)",
                stats.folders,
                stats.files(),
                stats.photos,
                stats.text_files
            );
        }
        Commands::Status => {
            let report = run_status(&db_path)?;
            println!("Database: {}", report.db_path.display());
            println!("  Root: {}", report.common_root);
            println!("  Folders: {} ({} in tree)", report.folders, report.tree_folders);
            println!("  Photos: {}", report.photos);
            println!("  Text files: {}", report.text_files);
            if let Some(log_file) = &report.log_file {
                println!("  Log: {}", log_file.display());
            }
        }
        Commands::Tree { path } => {
            print!("{}", run_tree(&db_path, path.as_deref())?);
        }
        Commands::Ls { path, json } => {
            let listing = run_ls(&db_path, path.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print!("{}", listing.render());
            }
        }
        Commands::Mv { items, to, dry_run } => {
            let report = run_move(&db_path, &items, &to, dry_run)?;
            if report.skipped > 0 {
                println!("Skipped {} already in {}", report.skipped, report.destination);
            }
            match report.outcome {
                None => {
                    for item in &report.planned {
                        println!("would move {} -> {}", item, report.destination);
                    }
                }
                Some(outcome) => {
                    println!("Moved {} items to {}", outcome.count, report.destination);
                    check_outcome(&outcome)?;
                }
            }
        }
        Commands::Cp { items, to, dry_run } => {
            let report = run_copy(&db_path, &items, &to, dry_run)?;
            match report.outcome {
                None => {
                    for item in &report.planned {
                        println!("would copy {} -> {}", item, report.destination);
                    }
                }
                Some(outcome) => {
                    println!("Copied {} items to {}", outcome.count, report.destination);
                    check_outcome(&outcome)?;
                }
            }
        }
        Commands::Rm { items, keep_files } => {
            let report = run_remove(&db_path, &items, keep_files)?;
            let verb = if keep_files { "Forgot" } else { "Deleted" };
            println!("{} {} items", verb, report.outcome.count);
            check_outcome(&report.outcome)?;
        }
        Commands::Repair => {
            let fixed = run_repair(&db_path)?;
            if fixed == 0 {
                println!("All folder parent relationships are correct.");
            } else {
                println!("Fixed {} folder parent relationships.", fixed);
            }
        }
    }

    Ok(())
}

/// Print per-item failures and turn any of them into a failing exit
fn check_outcome(outcome: &MutationOutcome) -> Result<()> {
    for error in &outcome.errors {
        eprintln!("  error: {}", error);
    }
    if outcome.is_partial() {
        bail!("{} items failed", outcome.errors.len());
    }
    Ok(())
}
