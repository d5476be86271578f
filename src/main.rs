use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use std::io::Read;
use std::path::PathBuf;
use taskwidget::config::Config;
use taskwidget::{Action, FileBackend, HostRequest, Intent, Outcome, Response, Store, build_view, dispatch};

#[derive(Parser)]
#[command(name = "taskwidget")]
#[command(about = "Task widget CLI - view and edit the selected task list from the shared store")]
#[command(version)]
struct Cli {
    /// Path to the store directory (default: user data dir)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the widget view as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the selected list
    Show,

    /// Add a task to the end of the selected list
    Add { text: Vec<String> },

    /// Toggle a task's completion
    Toggle { id: String },

    /// Delete a task
    Delete { id: String },

    /// Replace a task's text
    Edit { id: String, text: Vec<String> },

    /// Mark every task in the selected list completed
    CompleteAll,

    /// Mark every task in the selected list not completed
    ReopenAll,

    /// Select the list to show; no argument clears the selection
    Select { list_id: Option<String> },

    /// List the known task lists
    Lists,

    /// Dispatch a raw intent, e.g. '{"action":"com.taskapp.REFRESH"}' (reads stdin if omitted)
    Dispatch { intent: Option<String> },

    /// Show the selection and whether the store changed since the host last synced
    Status,
}

fn main() -> Result<()> {
    // Setup tracing; stdout is reserved for command output
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let store_path = config.resolve_store_path(cli.store_path.as_deref())?;

    // Open store
    let store = Store::open(&store_path)?;

    match cli.command {
        Commands::Show => show(&store, &config, cli.json)?,
        Commands::Add { text } => {
            let action = Action::Add { text: text.join(" ") };
            respond(&store, &config, cli.json, Some(&action))?;
        }
        Commands::Toggle { id } => respond(&store, &config, cli.json, Some(&Action::Toggle { task_id: id }))?,
        Commands::Delete { id } => respond(&store, &config, cli.json, Some(&Action::Delete { task_id: id }))?,
        Commands::Edit { id, text } => {
            let selection = store.directory().selection()?;
            match store.tasks(selection).edit_text(&id, &text.join(" "))? {
                Outcome::Applied(_) => show(&store, &config, cli.json)?,
                Outcome::NotFound => println!("No task {} in the selected list", id),
                Outcome::NoSelection => println!("No list selected"),
                Outcome::EmptyText => println!("Task text cannot be empty"),
            }
        }
        Commands::CompleteAll => set_all_completed(&store, &config, cli.json, true)?,
        Commands::ReopenAll => set_all_completed(&store, &config, cli.json, false)?,
        Commands::Select { list_id } => {
            store.directory().select(list_id.as_deref().unwrap_or_default())?;
            show(&store, &config, cli.json)?;
        }
        Commands::Lists => {
            let directory = store.directory();
            let current = directory.current_list_id()?;
            for list in directory.lists()? {
                let marker = if current.as_deref() == Some(list.id.as_str()) { "*" } else { " " };
                println!("{} {}  {}", marker, list.id, list.name);
            }
        }
        Commands::Dispatch { intent } => {
            let raw = match intent {
                Some(raw) => raw,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("Failed to read intent from stdin")?;
                    buf
                }
            };
            let intent: Intent = serde_json::from_str(&raw).context("Invalid intent JSON")?;
            respond(&store, &config, cli.json, Action::from_intent(&intent).as_ref())?;
        }
        Commands::Status => {
            let selection = store.directory().selection()?;
            println!("Store: {}", store_path.display());
            println!("Selected list: {}", selection);
            println!("Data changed: {}", store.data_changed()?);
        }
    }

    Ok(())
}

fn respond(store: &Store<FileBackend>, config: &Config, json: bool, action: Option<&Action>) -> Result<()> {
    match dispatch(store, action)? {
        Response::Rerender => show(store, config, json)?,
        Response::OpenHost(HostRequest::Open) => println!("Open the task app"),
        Response::OpenHost(HostRequest::ComposeTask) => println!("Open the task app to write the new task"),
        Response::OpenHost(HostRequest::SelectList) => println!("Open the task app to select a list first"),
        Response::Ignore => println!("Nothing to do"),
    }
    Ok(())
}

fn set_all_completed(store: &Store<FileBackend>, config: &Config, json: bool, completed: bool) -> Result<()> {
    let selection = store.directory().selection()?;
    match store.tasks(selection).set_all_completed(completed)? {
        Outcome::NoSelection => println!("No list selected"),
        _ => show(store, config, json)?,
    }
    Ok(())
}

fn show(store: &Store<FileBackend>, config: &Config, json: bool) -> Result<()> {
    let view = build_view(store, config.fallback_title())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.render_text());
    }
    Ok(())
}
