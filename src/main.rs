use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clipdo::{Config, JsonFileStore, Source, Task, TaskStore, group_by_date};

#[derive(Parser)]
#[command(name = "clipdo")]
#[command(about = "Keep copied snippets as todo items and render their markdown notes")]
struct Cli {
    /// Config file (missing file means built-in defaults)
    #[arg(long, global = true, default_value = "clipdo.toml")]
    config: PathBuf,

    /// Task store file, overrides `store.path` from the config
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a markdown file to HTML
    Render {
        /// Input Markdown file, `-` reads stdin
        input: PathBuf,

        /// Output HTML file (defaults to input name with .html extension, stdout for stdin)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render inline markup only, without block structure
        #[arg(long)]
        inline: bool,
    },
    /// Capture a new task at the top of the list
    Add {
        text: String,

        /// Title of the page the text came from
        #[arg(long, requires = "url")]
        title: Option<String>,

        /// URL of the page the text came from
        #[arg(long, requires = "title")]
        url: Option<String>,
    },
    /// List tasks grouped by capture date
    List {
        /// Only show tasks whose text or source title contains this
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Print one task's text rendered as HTML
    Show { id: u64 },
    /// Flip a task between done and not done
    Toggle { id: u64 },
    /// Replace a task's text
    Edit { id: u64, text: String },
    /// Remove a task
    Delete { id: u64 },
    /// Move a task to the position another task occupies
    Move { from: u64, to: u64 },
    /// Remove every task
    Clear,
    /// Write all tasks as a markdown checklist
    Export {
        /// Output file (defaults to `export.file_name` from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, level: &str) {
    // --verbose forces DEBUG, otherwise RUST_LOG wins over the configured level
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    init_tracing(cli.verbose, &config.log.level);

    let store = JsonFileStore::new(cli.store.unwrap_or_else(|| config.store.path.clone()));

    match cli.command {
        Command::Render {
            input,
            output,
            inline,
        } => render(&input, output.as_deref(), inline),
        Command::Add { text, title, url } => {
            let source = title.zip(url).map(|(title, url)| Source { title, url });
            let now = chrono::Local::now();
            let id = store.update(|tasks| tasks.capture(&text, source, now).map(|t| t.id))?;
            let id = id.context("nothing to capture: text is blank")?;
            println!("Captured task {id}");
            Ok(())
        }
        Command::List { search } => {
            let tasks = store.load()?;
            let found = tasks.search(&search);
            for group in group_by_date(&found, &config.tasks.unknown_date_label) {
                println!("{}", group.date);
                for task in group.tasks {
                    println!("  {}", summary_line(task));
                }
            }
            Ok(())
        }
        Command::Show { id } => {
            let tasks = store.load()?;
            let task = tasks
                .get(id)
                .with_context(|| format!("no task with id {id}"))?;
            println!("{}", task.render_body());
            Ok(())
        }
        Command::Toggle { id } => {
            let found = store.update(|tasks| tasks.toggle(id))?;
            ensure!(found, "no task with id {id}");
            Ok(())
        }
        Command::Edit { id, text } => {
            let changed = store.update(|tasks| tasks.update_text(id, &text))?;
            ensure!(changed, "task {id} not updated: unknown id, blank or unchanged text");
            Ok(())
        }
        Command::Delete { id } => {
            let found = store.update(|tasks| tasks.delete(id))?;
            ensure!(found, "no task with id {id}");
            Ok(())
        }
        Command::Move { from, to } => {
            let moved = store.update(|tasks| tasks.move_task(from, to))?;
            ensure!(moved, "cannot move task {from} to {to}");
            Ok(())
        }
        Command::Clear => {
            store.update(|tasks| tasks.clear())?;
            Ok(())
        }
        Command::Export { output } => {
            let tasks = store.load()?;
            let output = output.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            fs::write(&output, tasks.to_checklist(&config.tasks.local_source_label))
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Exported {} tasks to {}", tasks.len(), output.display());
            Ok(())
        }
    }
}

fn render(input: &Path, output: Option<&Path>, inline: bool) -> Result<()> {
    let from_stdin = input == Path::new("-");

    let markdown = if from_stdin {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?
    };

    let html = if inline {
        clipdo::render_inline(&markdown)
    } else {
        clipdo::render_markdown(&markdown)
    };

    // Determine output path
    let output = match output {
        Some(path) => path.to_path_buf(),
        None if from_stdin => {
            println!("{html}");
            return Ok(());
        }
        None => input.with_extension("html"),
    };

    fs::write(&output, html).with_context(|| format!("writing {}", output.display()))?;
    println!("Created {}", output.display());
    Ok(())
}

fn summary_line(task: &Task) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    let first_line = task.text.lines().next().unwrap_or("");
    let source = task.source_title.as_deref().unwrap_or("local");
    format!("[{mark}] {} {} {first_line} ({source})", task.id, task.time())
}
