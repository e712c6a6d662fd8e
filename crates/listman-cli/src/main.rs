//! Offline administration CLI for contact list databases.
//!
//! Provides the `listman` binary, which opens the same SQLite database as
//! the HTTP server and runs maintenance through the same `ListManager`, so
//! naming, lock, and association rules are identical from both entry points.
//! Locks live in server memory only; the CLI starts with none held.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use listman_core::{FolderId, ListId};
use listman_server::concurrency::LockManager;
use listman_server::error::ApiError;
use listman_server::index::NoopIndexNotifier;
use listman_server::manager::ListManager;
use listman_storage::SqliteStore;

/// Contact list maintenance tools.
#[derive(Parser)]
#[command(name = "listman", about = "Contact list maintenance tools")]
struct Cli {
    /// Path to the list database file.
    #[arg(short, long, global = true, default_value = "listman.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the folder tree with its lists.
    Tree,

    /// Export a list's contacts as CSV.
    Export {
        /// List ID to export.
        list: String,

        /// Output file (default: "<list name> <date>.csv" in the current directory).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Collapse duplicate contact associations of a list.
    Dedupe {
        /// List ID to repair.
        list: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut manager = match open_manager(&cli.db) {
        Ok(m) => m,
        Err(code) => process::exit(code),
    };

    let exit_code = match cli.command {
        Commands::Tree => run_tree(&manager),
        Commands::Export { list, output } => run_export(&manager, &list, output),
        Commands::Dedupe { list } => run_dedupe(&mut manager, &list),
    };
    process::exit(exit_code);
}

/// Opens the database. Exit code 3 on failure.
fn open_manager(db_path: &str) -> Result<ListManager, i32> {
    let store = SqliteStore::new(db_path).map_err(|e| {
        eprintln!("Error: failed to open database '{}': {}", db_path, e);
        3
    })?;
    Ok(ListManager::new(
        Box::new(store),
        Arc::new(LockManager::with_default_ttl()),
        Arc::new(NoopIndexNotifier),
    ))
}

fn parse_list_id(raw: &str) -> Result<ListId, i32> {
    raw.parse().map_err(|_| {
        eprintln!("Error: invalid list id '{}'", raw);
        1
    })
}

/// Exit code for a manager error: 2 = not found, 1 = anything else.
fn report(err: ApiError) -> i32 {
    eprintln!("Error: {}", err);
    match err {
        ApiError::NotFound(_) => 2,
        _ => 1,
    }
}

/// Execute the tree subcommand.
fn run_tree(manager: &ListManager) -> i32 {
    let mut out = std::io::stdout().lock();
    match print_folder(manager, None, 0, &mut out) {
        Ok(()) => 0,
        Err(code) => code,
    }
}

fn print_folder(
    manager: &ListManager,
    folder: Option<FolderId>,
    depth: usize,
    out: &mut impl Write,
) -> Result<(), i32> {
    let contents = manager.folder_contents(folder).map_err(report)?;
    let indent = "  ".repeat(depth);
    for child in &contents.folders {
        writeln!(out, "{}{}/", indent, child.name).map_err(io_error)?;
        print_folder(manager, Some(child.id), depth + 1, out)?;
    }
    for list in &contents.lists {
        writeln!(out, "{}{}  [{:?}] {}", indent, list.name, list.kind, list.id)
            .map_err(io_error)?;
    }
    Ok(())
}

fn io_error(e: std::io::Error) -> i32 {
    eprintln!("I/O error: {}", e);
    3
}

/// Execute the export subcommand.
///
/// Prints `{"file": ..., "contacts": n}` as JSON on success.
fn run_export(manager: &ListManager, list: &str, output: Option<PathBuf>) -> i32 {
    let list_id = match parse_list_id(list) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let export = match manager.export_contacts(list_id) {
        Ok(e) => e,
        Err(e) => return report(e),
    };

    let path = output
        .unwrap_or_else(|| PathBuf::from(export.file_name(chrono::Local::now().date_naive())));
    let contacts = export.contacts.len();

    let written = File::create(&path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        for row in export.into_csv_rows() {
            writer.write_all(row.as_bytes())?;
        }
        writer.flush()
    });
    if let Err(e) = written {
        return io_error(e);
    }

    println!(
        "{}",
        serde_json::json!({ "file": path.display().to_string(), "contacts": contacts })
    );
    0
}

/// Execute the dedupe subcommand.
fn run_dedupe(manager: &mut ListManager, list: &str) -> i32 {
    let list_id = match parse_list_id(list) {
        Ok(id) => id,
        Err(code) => return code,
    };
    match manager.remove_duplicates(list_id) {
        Ok(removed) => {
            println!("{}", serde_json::json!({ "list_id": list_id, "removed": removed }));
            0
        }
        Err(e) => report(e),
    }
}
