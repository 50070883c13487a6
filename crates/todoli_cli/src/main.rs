//! Command-line front end for the ToDoLi list engine.
//!
//! # Responsibility
//! - Map subcommands onto `TodoList` operations and print the results.
//! - Validate list names before they reach the core.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use todoli_core::{
    default_log_level, init_logging, validate_list_name, FileListStore, ListRepository,
    LoadOutcome, StoreLocation, TodoList,
};

#[derive(Parser)]
#[command(name = "todoli", version, about = "Personal todo lists, one file per list")]
struct Cli {
    /// Store directory (defaults to the per-user data directory).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all list names.
    Lists,
    /// Print the tasks of a list.
    Show { list: String },
    /// Create a list; a name is generated when omitted.
    New { list: Option<String> },
    /// Append a task.
    Add {
        list: String,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Replace the task at INDEX (0-based).
    Edit {
        list: String,
        index: usize,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Remove the task at INDEX (0-based).
    Remove { list: String, index: usize },
    /// Rename a list.
    Rename { list: String, new_name: String },
    /// Delete a list.
    Delete { list: String },
}

impl Command {
    fn label(&self) -> &'static str {
        match self {
            Self::Lists => "lists",
            Self::Show { .. } => "show",
            Self::New { .. } => "new",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Remove { .. } => "remove",
            Self::Rename { .. } => "rename",
            Self::Delete { .. } => "delete",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (lists_dir, log_dir) = match &cli.store {
        Some(root) => (root.clone(), root.join("logs")),
        None => {
            let location = StoreLocation::resolve()?;
            (location.lists_dir().to_path_buf(), location.log_dir())
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = std::path::absolute(&log_dir).unwrap_or(log_dir);
    if let Err(err) = init_logging(level, &log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let store = FileListStore::open(&lists_dir)
        .with_context(|| format!("cannot open store at {}", lists_dir.display()))?;

    let label = cli.command.label();
    info!("event=cli_command module=cli status=start command={label}");
    match run(cli.command, store) {
        Ok(()) => {
            info!("event=cli_command module=cli status=ok command={label}");
            Ok(())
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error command={label} error={err:#}");
            Err(err)
        }
    }
}

fn run(command: Command, store: FileListStore) -> Result<()> {
    match command {
        Command::Lists => {
            let mut names = store.list_names()?;
            names.sort();
            for name in names {
                println!("{name}");
            }
        }
        Command::Show { list } => {
            let list = open_existing(store, &list)?;
            for (index, task) in list.tasks().iter().enumerate() {
                println!("{index}\t{}\t{}", task.title(), task.description());
            }
        }
        Command::New { list } => {
            let list = match list {
                Some(name) => {
                    checked_name(&name)?;
                    TodoList::create(store, name)?
                }
                None => {
                    let mut list = TodoList::new_unnamed(store);
                    list.save()?;
                    list
                }
            };
            println!("{}", list.name());
        }
        Command::Add {
            list,
            title,
            description,
        } => {
            let mut list = open_existing(store, &list)?;
            list.add_task(title, description)?;
            list.save()?;
        }
        Command::Edit {
            list,
            index,
            title,
            description,
        } => {
            let mut list = open_existing(store, &list)?;
            list.edit_task(index, title, description)?;
            list.save()?;
        }
        Command::Remove { list, index } => {
            let mut list = open_existing(store, &list)?;
            if list.remove_task(index).is_none() {
                bail!("no task at index {index} in `{}`", list.name());
            }
            list.save()?;
        }
        Command::Rename { list, new_name } => {
            checked_name(&new_name)?;
            let mut list = open_existing(store, &list)?;
            list.rename(new_name)?;
        }
        Command::Delete { list: name } => {
            // Corrupt lists can still be deleted.
            let mut list = TodoList::open(store, name.as_str());
            if !list.exists(&name) {
                bail!("no list named `{name}`");
            }
            list.delete()?;
        }
    }
    Ok(())
}

fn checked_name(name: &str) -> Result<()> {
    validate_list_name(name).map_err(anyhow::Error::msg)
}

fn open_existing(store: FileListStore, name: &str) -> Result<TodoList> {
    let list = TodoList::open(store, name);
    match list.load_outcome() {
        LoadOutcome::Loaded { .. } => Ok(list),
        LoadOutcome::Missing | LoadOutcome::Fresh => bail!("no list named `{name}`"),
        LoadOutcome::Malformed { reason } | LoadOutcome::Unreadable { reason } => {
            bail!("list `{name}` could not be loaded: {reason}")
        }
    }
}
