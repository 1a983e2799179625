//! Writeup Notebook - command line front end
//!
//! Entry point for the binary. Handles CLI argument parsing, logging
//! initialization, and dispatch to the outline, preview and save commands.

use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use writeup_notebook::document::{DocumentStatus, Tags};
use writeup_notebook::markdown::{parse_outline, OutlineNode, PreviewRenderer};
use writeup_notebook::persistence::FileStore;
use writeup_notebook::{AuthoringSession, Config};

/// Application name for logging
const APP_NAME: &str = "writeup-notebook";

/// Parsed command line
#[derive(Debug, Default)]
enum Command {
    Outline(PathBuf),
    Preview(PathBuf),
    Save(SaveArgs),
    #[default]
    Help,
}

#[derive(Debug, Default)]
struct SaveArgs {
    file: PathBuf,
    title: String,
    store: Option<PathBuf>,
    id: Option<String>,
    publish: bool,
    tags: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    match parse_args()? {
        Command::Outline(file) => print_outline(&file).await,
        Command::Preview(file) => print_preview(&file).await,
        Command::Save(args) => save(args).await,
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

/// Initialize the logging system
fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,writeup_notebook=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Parse command line arguments
fn parse_args() -> anyhow::Result<Command> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let Some(first) = args.first() else {
        return Ok(Command::Help);
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help),
        "-v" | "--version" => {
            print_version();
            std::process::exit(0);
        }
        "outline" => Ok(Command::Outline(file_arg(&args, "outline")?)),
        "preview" => Ok(Command::Preview(file_arg(&args, "preview")?)),
        "save" => parse_save_args(&args[1..]).map(Command::Save),
        other => bail!("Unknown command: {}\nUse --help for usage information", other),
    }
}

fn file_arg(args: &[String], command: &str) -> anyhow::Result<PathBuf> {
    match args.get(1) {
        Some(path) if !path.starts_with('-') => Ok(PathBuf::from(path)),
        _ => bail!("{} requires a file argument", command),
    }
}

fn parse_save_args(args: &[String]) -> anyhow::Result<SaveArgs> {
    let mut save = SaveArgs::default();
    let mut file = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--title" | "--store" | "--tag" | "--id" => {
                let Some(value) = args.get(i + 1) else {
                    bail!("{} requires a value", args[i]);
                };
                match args[i].as_str() {
                    "--title" => save.title = value.clone(),
                    "--store" => save.store = Some(PathBuf::from(value)),
                    "--id" => save.id = Some(value.clone()),
                    _ => save.tags.push(value.clone()),
                }
                i += 1;
            }
            "--publish" => save.publish = true,
            arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
            path => file = Some(PathBuf::from(path)),
        }
        i += 1;
    }

    save.file = file.context("save requires a file argument")?;
    Ok(save)
}

async fn read_markdown(file: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Could not read {}", file.display()))
}

async fn print_outline(file: &Path) -> anyhow::Result<()> {
    let content = read_markdown(file).await?;
    let forest = parse_outline(&content);
    if forest.is_empty() {
        println!("(no headings)");
    }
    for root in &forest {
        print_node(root, 0);
    }
    Ok(())
}

fn print_node(node: &OutlineNode, depth: usize) {
    println!("{}{}  #{}", "  ".repeat(depth), node.heading.clean_text, node.id());
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

async fn print_preview(file: &Path) -> anyhow::Result<()> {
    let content = read_markdown(file).await?;
    print!("{}", PreviewRenderer::new().render_html(&content));
    Ok(())
}

async fn save(args: SaveArgs) -> anyhow::Result<()> {
    let content = read_markdown(&args.file).await?;

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }
    };

    let store = match args.store {
        Some(dir) => FileStore::new(dir),
        None => FileStore::in_data_dir()?,
    };
    let record_dir = store.dir().to_path_buf();

    let document_id = match args.id {
        Some(id) => id,
        None => args
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .context("Could not derive a document id from the file name")?,
    };

    let mut tags = Tags::new();
    for tag in &args.tags {
        if !tags.add(tag) {
            log::warn!("Skipping tag {:?}", tag);
        }
    }

    let status = if args.publish {
        DocumentStatus::Published
    } else {
        DocumentStatus::Draft
    };

    let mut session = AuthoringSession::new(store, document_id.clone(), config);
    session.load(&args.title, &content, tags);
    session.save(status).await?;
    session.teardown();

    println!("Saved {} to {}", document_id, record_dir.display());
    Ok(())
}

/// Print help message
fn print_help() {
    println!(
        r#"Writeup Notebook - markdown authoring and navigation engine

USAGE:
    writeup-notebook <COMMAND> [OPTIONS]

COMMANDS:
    outline FILE        Print the heading outline with anchor ids
    preview FILE        Print the HTML preview with heading anchors
    save FILE           Save FILE as a document record

SAVE OPTIONS:
    --title TITLE       Document title (required)
    --store DIR         Record directory (default: data directory)
    --id ID             Document id (default: file name without extension)
    --tag TAG           Add a tag, may be repeated (at most 5)
    --publish           Save as published instead of draft

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information

EDITOR SHORTCUTS:
    Ctrl+B              Bold
    Ctrl+I              Italic
    Ctrl+K              Link
    Tab                 Insert indent
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
