//! List commands.

use ticklist_model::validate_list_name;
use ticklist_store::DataStore;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Prints all visible lists.
pub fn show(store: &dyn DataStore) -> CliResult {
    let tasks = store.items()?;
    for list in store.todo_lists()? {
        let open = tasks
            .iter()
            .filter(|t| t.list_id == list.id && !t.done)
            .count();
        println!("#{:<3} {}  ({open} open)", list.id, list.name);
    }
    Ok(())
}

/// Creates a list.
pub fn create(store: &dyn DataStore, name: &str) -> CliResult {
    let name = validate_list_name(name)?;
    let id = store.create_todo_list(&name)?;
    println!("created list {id}");
    Ok(())
}

/// Renames a list.
pub fn rename(store: &dyn DataStore, id: i64, name: &str) -> CliResult {
    let name = validate_list_name(name)?;
    store.update_todo_list_name(id, &name)?;
    println!("renamed list {id}");
    Ok(())
}

/// Archives a list.
pub fn archive(store: &dyn DataStore, id: i64) -> CliResult {
    store.archive_todo_list(id)?;
    println!("archived list {id}");
    Ok(())
}

/// Restores an archived list.
pub fn unarchive(store: &dyn DataStore, id: i64) -> CliResult {
    store.unarchive_todo_list(id)?;
    println!("unarchived list {id}");
    Ok(())
}

/// Deletes a list, soft-deleting all its tasks.
pub fn delete(store: &dyn DataStore, id: i64) -> CliResult {
    store.delete_todo_list(id)?;
    println!("deleted list {id} and its tasks");
    Ok(())
}
