//! ticklist CLI
//!
//! Command-line todo manager with offline-first sync.
//!
//! # Commands
//!
//! - `add` / `list` / `done` / `rm` - task management
//! - `lists` / `new-list` / `rename-list` / `archive-list` /
//!   `unarchive-list` / `delete-list` - list management
//! - `sync` - run one full sync cycle now
//! - `status` - connectivity, pending changes, last sync
//!
//! Sync is configured through `TICKLIST_SYNC_*` environment variables; see
//! `ticklist_sync::SyncSettings`. Local operations always succeed whether
//! or not the sync server is reachable.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use ticklist_model::DEFAULT_LIST_NAME;
use ticklist_store::{DataStore, LocalStore};
use ticklist_sync::{SyncClient, SyncSettings, SyncStore, UreqAgent};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the database path.
const ENV_DB_PATH: &str = "TICKLIST_DB_PATH";
/// Default database location.
const DEFAULT_DB_PATH: &str = "./ticklist.db";

/// Terminal todo manager with best-effort sync.
#[derive(Parser)]
#[command(name = "ticklist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(global = true, short, long)]
    db: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task text
        text: Vec<String>,

        /// Priority 1-4, 1 is highest
        #[arg(short, long)]
        priority: Option<u8>,

        /// Due date: days from now, M/D, M/D/YY or M/D/YYYY
        #[arg(long)]
        due: Option<String>,

        /// Target list id (defaults to the first list)
        #[arg(short, long)]
        list: Option<i64>,
    },

    /// Show tasks
    List,

    /// Mark a task done (or not done again)
    Done {
        /// Task id
        id: i64,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: i64,
    },

    /// Show lists
    Lists,

    /// Create a list
    NewList {
        /// List name
        name: String,
    },

    /// Rename a list
    RenameList {
        /// List id
        id: i64,
        /// New name
        name: String,
    },

    /// Archive a list, hiding it and its tasks
    ArchiveList {
        /// List id
        id: i64,
    },

    /// Restore an archived list
    UnarchiveList {
        /// List id
        id: i64,
    },

    /// Delete a list and soft-delete all its tasks
    DeleteList {
        /// List id
        id: i64,
    },

    /// Run one full sync cycle now
    Sync,

    /// Show sync status and pending changes
    Status,
}

/// The storage the session runs against: plain local, or sync-decorated
/// when sync is enabled.
enum Backend {
    Local(Arc<LocalStore>),
    Synced(SyncStore<UreqAgent>),
}

impl Backend {
    fn store(&self) -> &dyn DataStore {
        match self {
            Backend::Local(local) => local.as_ref(),
            Backend::Synced(synced) => synced,
        }
    }

    fn synced(&self) -> Option<&SyncStore<UreqAgent>> {
        match self {
            Backend::Local(_) => None,
            Backend::Synced(synced) => Some(synced),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db_path = cli
        .db
        .or_else(|| std::env::var(ENV_DB_PATH).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let local = Arc::new(LocalStore::open(&db_path)?);
    tracing::debug!(path = %db_path.display(), "database opened");

    // First run: make sure there is a list to put tasks into.
    if local.todo_lists()?.is_empty() {
        local.create_todo_list(DEFAULT_LIST_NAME)?;
    }

    let mut settings = SyncSettings::from_env();
    let backend = if settings.enabled {
        settings.ensure_device_id(&local)?;
        let client = SyncClient::new(&settings, UreqAgent::new(settings.timeout()));
        let store = SyncStore::new(Arc::clone(&local), client, settings);
        store.start_background_sync();
        Backend::Synced(store)
    } else {
        Backend::Local(local)
    };

    let result = run(&cli.command, &backend);

    if let Some(synced) = backend.synced() {
        synced.stop_background_sync();
    }

    result
}

fn run(command: &Commands, backend: &Backend) -> Result<(), Box<dyn std::error::Error>> {
    let store = backend.store();
    match command {
        Commands::Add {
            text,
            priority,
            due,
            list,
        } => commands::tasks::add(store, &text.join(" "), *priority, due.as_deref(), *list),
        Commands::List => commands::tasks::list(store),
        Commands::Done { id } => commands::tasks::toggle_done(store, *id),
        Commands::Rm { id } => commands::tasks::remove(store, *id),
        Commands::Lists => commands::lists::show(store),
        Commands::NewList { name } => commands::lists::create(store, name),
        Commands::RenameList { id, name } => commands::lists::rename(store, *id, name),
        Commands::ArchiveList { id } => commands::lists::archive(store, *id),
        Commands::UnarchiveList { id } => commands::lists::unarchive(store, *id),
        Commands::DeleteList { id } => commands::lists::delete(store, *id),
        Commands::Sync => commands::sync::run(backend.synced()),
        Commands::Status => commands::sync::status(store, backend.synced()),
    }
}
