use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use std::fs;
use std::path::PathBuf;
use todostore::config::{Backend, load_config};
use todostore::{App, FilterKind, HtmlSurface, Intent, KeyValueStorage, Outcome, TerminalSurface, render};

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "todostore - a single-user task list kept on local disk")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/todostore/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding task data (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Storage backend (overrides config)
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Mark a task done, or not done again
    Toggle { id: i64 },

    /// Delete a task
    Delete { id: i64 },

    /// Delete every completed task
    ClearCompleted,

    /// Show only all, active or completed tasks
    Filter { kind: String },

    /// Show tasks under the current filter
    List {
        /// Filter for this listing only: all, active or completed
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Write the current view as an HTML page
    Html {
        /// Filter for this page only: all, active or completed
        #[arg(short, long)]
        filter: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?.unwrap_or_default();
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let storage = config.open_storage()?;
    let mut app = App::open(storage, &config.storage_key).context("Failed to load tasks")?;

    let intent = match cli.command {
        Commands::Add { text } => Intent::Submit(text.join(" ")),
        Commands::Toggle { id } => Intent::Toggle(id),
        Commands::Delete { id } => Intent::Delete(id),
        Commands::ClearCompleted => Intent::ClearCompleted,
        Commands::Filter { kind } => Intent::SetFilter(FilterKind::parse_lenient(&kind)),
        Commands::List { filter } => {
            let mut surface = TerminalSurface::new();
            render(&app.view_as(resolve_filter(&app, filter.as_deref())), &mut surface);
            print!("{}", surface.into_string());
            return Ok(());
        }
        Commands::Html { filter, output } => {
            let mut surface = HtmlSurface::new();
            render(&app.view_as(resolve_filter(&app, filter.as_deref())), &mut surface);
            let page = surface.page("Todo");
            match output {
                Some(path) => {
                    fs::write(&path, page).with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", page),
            }
            return Ok(());
        }
    };

    match app.dispatch(intent).context("Failed to save tasks")? {
        Outcome::Created(task) => println!("Added task {}", task.id),
        Outcome::Deleted(id) => println!("Deleted task {}", id),
        Outcome::Toggled(id) => println!("Toggled task {}", id),
        Outcome::Cleared(count) => println!("Cleared {} completed task(s)", count),
        Outcome::Unchanged => println!("No such task"),
        Outcome::Declined | Outcome::FilterChanged(_) => {}
    }

    print_list(&app);
    Ok(())
}

/// A one-off `--filter` wins over the remembered filter
fn resolve_filter<S: KeyValueStorage>(app: &App<S>, requested: Option<&str>) -> FilterKind {
    requested.map(FilterKind::parse_lenient).unwrap_or_else(|| app.filter())
}

fn print_list<S: KeyValueStorage>(app: &App<S>) {
    let mut surface = TerminalSurface::new();
    app.render(&mut surface);
    print!("{}", surface.into_string());
}
