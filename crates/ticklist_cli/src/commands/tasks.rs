//! Task commands.

use ticklist_model::{
    parse_due_date, unix_now, validate_task_text, Task, PRIORITY_HIGH, PRIORITY_LOW,
};
use ticklist_store::DataStore;

const SECONDS_PER_DAY: i64 = 24 * 3600;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Adds a task.
pub fn add(
    store: &dyn DataStore,
    text: &str,
    priority: Option<u8>,
    due: Option<&str>,
    list: Option<i64>,
) -> CliResult {
    let text = validate_task_text(text)?;

    let priority = match priority {
        Some(p) if p < PRIORITY_HIGH || p > PRIORITY_LOW => {
            return Err(format!("priority must be {PRIORITY_HIGH}-{PRIORITY_LOW}").into());
        }
        Some(p) => p,
        None => ticklist_model::DEFAULT_PRIORITY,
    };

    let lists = store.todo_lists()?;
    let list_id = match list {
        Some(id) => {
            if !lists.iter().any(|l| l.id == id) {
                return Err(format!("no list with id {id}").into());
            }
            id
        }
        None => lists
            .first()
            .map(|l| l.id)
            .ok_or("no lists exist; create one with new-list")?,
    };

    let mut due_date = 0;
    if let Some(input) = due {
        due_date = parse_due_date(input);
        if due_date == 0 {
            println!("note: unrecognized due date {input:?}, none set");
        }
    }

    let task = Task::new(text, list_id)
        .with_priority(priority)
        .with_due_date(due_date);
    let id = store.save_item(&task)?;
    println!("added task {id}");
    Ok(())
}

/// Prints all visible tasks grouped by list, incomplete first, then by
/// priority.
pub fn list(store: &dyn DataStore) -> CliResult {
    let lists = store.todo_lists()?;
    let mut tasks = store.items()?;
    tasks.sort_by_key(|t| (t.done, t.priority));

    for list in &lists {
        println!("{} (#{})", list.name, list.id);
        for task in tasks.iter().filter(|t| t.list_id == list.id) {
            let mark = if task.done { "x" } else { " " };
            let due = describe_due(task.due_date);
            println!("  [{mark}] {:>3}  p{}  {}{due}", task.id, task.priority, task.todo);
        }
    }
    Ok(())
}

/// Toggles a task's completion flag.
pub fn toggle_done(store: &dyn DataStore, id: i64) -> CliResult {
    let mut task = store.item_by_id(id)?;
    task.done = !task.done;
    task.date_completed = if task.done { unix_now() } else { 0 };
    store.update_item(&task)?;
    println!(
        "task {id} marked {}",
        if task.done { "done" } else { "not done" }
    );
    Ok(())
}

/// Soft-deletes a task.
pub fn remove(store: &dyn DataStore, id: i64) -> CliResult {
    // Resolve first so a bad id errors instead of silently no-opping.
    store.item_by_id(id)?;
    store.delete_item(id)?;
    println!("deleted task {id}");
    Ok(())
}

fn describe_due(due_date: i64) -> String {
    if due_date <= 0 {
        return String::new();
    }
    let days = (due_date - unix_now()) / SECONDS_PER_DAY;
    if days < 0 {
        format!("  (overdue {}d)", -days)
    } else {
        format!("  (due in {days}d)")
    }
}
