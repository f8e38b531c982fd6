//! Sync commands.

use ticklist_model::unix_now;
use ticklist_store::DataStore;
use ticklist_sync::{SyncStore, UreqAgent};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Runs one full sync cycle.
pub fn run(synced: Option<&SyncStore<UreqAgent>>) -> CliResult {
    let Some(store) = synced else {
        println!("sync is disabled; set TICKLIST_SYNC_ENABLED=true to enable it");
        return Ok(());
    };
    store.full_sync()?;
    println!("sync complete");
    Ok(())
}

/// Prints sync status, pending change count, and last sync time.
pub fn status(store: &dyn DataStore, synced: Option<&SyncStore<UreqAgent>>) -> CliResult {
    match synced {
        Some(sync_store) => println!("sync: {}", sync_store.sync_status()),
        None => println!("sync: disabled"),
    }

    let pending = store.pending_changes()?;
    println!("pending changes: {}", pending.len());

    let last = store.last_sync_time()?;
    if last > 0 {
        println!("last sync: {}s ago", (unix_now() - last).max(0));
    } else {
        println!("last sync: never");
    }
    Ok(())
}
