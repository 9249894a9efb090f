// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use confkeep::{
    config::Settings,
    history::{CommitMode, DiffLineKind, Git2Versioning, HistoryStore},
    path::{default_history_store_dir, default_settings_file, expand_home},
    session::EditorSession,
    syntax::{classify, find_matches, line_span, paint_ansi, Theme},
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use std::{
    fs,
    path::{Path, PathBuf},
    process::exit,
};
use tokio::runtime::Handle;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "confkeep [options] <confkeep-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to settings file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Path to history store directory.
    #[arg(long, global = true, value_name = "path")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        let settings = load_settings(self.config)?;
        match self.command {
            Command::Classify(opts) => run_classify(opts),
            Command::Highlight(opts) => run_highlight(opts, &settings).await,
            Command::Search(opts) => run_search(opts),
            Command::Commit(opts) => run_commit(opts, open_store(self.store, &settings)?),
            Command::Log(opts) => run_log(opts, open_store(self.store, &settings)?),
            Command::Show(opts) => run_show(opts, open_store(self.store, &settings)?),
            Command::Diff(opts) => run_diff(opts, open_store(self.store, &settings)?),
            Command::Restore(opts) => run_restore(opts, open_store(self.store, &settings)?),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Show content type of files by name.
    #[command(override_usage = "confkeep classify [options] <file>...")]
    Classify(ClassifyOptions),

    /// Print file with syntax highlighting.
    #[command(override_usage = "confkeep highlight [options] <file>")]
    Highlight(HighlightOptions),

    /// List literal matches of search term in file.
    #[command(override_usage = "confkeep search [options] <file> <term>")]
    Search(SearchOptions),

    /// Commit current content of file as new snapshot.
    #[command(override_usage = "confkeep commit [options] <file>")]
    Commit(CommitOptions),

    /// List snapshots of file, newest first.
    #[command(override_usage = "confkeep log [options] <file>")]
    Log(FileOptions),

    /// Print content of file at snapshot.
    #[command(override_usage = "confkeep show [options] <file> <id>")]
    Show(SnapshotOptions),

    /// Show changes snapshot introduced to file.
    #[command(override_usage = "confkeep diff [options] <file> <id>")]
    Diff(SnapshotOptions),

    /// Restore content of file from snapshot.
    #[command(override_usage = "confkeep restore [options] <file> <id>")]
    Restore(RestoreOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ClassifyOptions {
    /// Files to classify. Only the name is inspected.
    #[arg(required = true, value_name = "file")]
    pub files: Vec<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct HighlightOptions {
    /// File to highlight.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,

    /// Overlay matches of search term.
    #[arg(short, long, value_name = "term")]
    pub search: Option<String>,

    /// Use dark theme.
    #[arg(short, long)]
    pub dark: bool,

    /// Print styled ranges instead of painted text.
    #[arg(short, long)]
    pub ranges: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SearchOptions {
    /// File to search.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,

    /// Literal search term, matched case-insensitively.
    #[arg(required = true, value_name = "term")]
    pub term: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CommitOptions {
    /// File to snapshot.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,

    /// Snapshot message.
    #[arg(short, long, value_name = "message")]
    pub message: Option<String>,

    /// Commit even if content did not change.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct FileOptions {
    /// Tracked file.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SnapshotOptions {
    /// Tracked file.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,

    /// Snapshot identifier, full or abbreviated.
    #[arg(required = true, value_name = "id")]
    pub id: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RestoreOptions {
    /// Tracked file.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,

    /// Snapshot identifier, full or abbreviated.
    #[arg(required = true, value_name = "id")]
    pub id: String,

    /// Write restored content back to file instead of printing it.
    #[arg(short, long)]
    pub write: bool,
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let (path, explicit) = match path {
        Some(path) => (expand_home(path)?, true),
        None => (default_settings_file()?, false),
    };

    if !explicit && !path.exists() {
        return Ok(Settings::default());
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {:?}", path.display()))?;
    Ok(data.parse()?)
}

fn open_store(store: Option<PathBuf>, settings: &Settings) -> Result<HistoryStore> {
    let root = match store.or_else(|| settings.history.store_dir.clone()) {
        Some(root) => expand_home(root)?,
        None => default_history_store_dir()?,
    };
    let backend = Git2Versioning::new(
        settings.history.author_name.as_str(),
        settings.history.author_email.as_str(),
    );

    Ok(HistoryStore::with_backend(root, backend)?)
}

fn tracked_path(file: PathBuf) -> Result<PathBuf> {
    Ok(std::path::absolute(expand_home(file)?)?)
}

fn read_file(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("failed to read {:?}", file.display()))
}

fn run_classify(opts: ClassifyOptions) -> Result<()> {
    for file in opts.files {
        let content_type = classify(&file);
        println!(
            "{}: {content_type} ({:?})",
            file.display(),
            content_type.family()
        );
    }

    Ok(())
}

async fn run_highlight(opts: HighlightOptions, settings: &Settings) -> Result<()> {
    let text = read_file(&opts.file)?;
    let mut session = EditorSession::new(settings.highlight.clone(), Handle::current());
    session.open(&opts.file, text);
    if let Some(term) = opts.search {
        session.set_search(term);
    }
    session.settle().await;

    if opts.ranges {
        for range in session.styles().ranges() {
            println!("{}..{} {}", range.start, range.end(), range.class);
        }
    } else {
        let theme = if opts.dark {
            Theme::dark()
        } else {
            Theme::light()
        };
        print!(
            "{}",
            paint_ansi(session.buffer().text(), session.styles().ranges(), &theme)
        );
    }

    Ok(())
}

fn run_search(opts: SearchOptions) -> Result<()> {
    let text = read_file(&opts.file)?;
    let matches = find_matches(&text, &opts.term);
    for span in &matches {
        let line = text[..span.start].matches('\n').count() + 1;
        let column = span.start - line_span(&text, span.start..span.start).start + 1;
        let content = &text[line_span(&text, span.clone())];
        println!("{line}:{column}: {content}");
    }
    info!("{} matches of {:?}", matches.len(), opts.term);

    Ok(())
}

fn run_commit(opts: CommitOptions, store: HistoryStore) -> Result<()> {
    let content = read_file(&opts.file)?;
    let mode = if opts.force {
        CommitMode::Force
    } else {
        CommitMode::IfChanged
    };

    match store.commit(
        tracked_path(opts.file)?,
        content,
        opts.message.as_deref(),
        mode,
    )? {
        Some(snapshot) => println!("{} {}", snapshot.short_id(), snapshot.message),
        None => info!("content unchanged, no snapshot created"),
    }

    Ok(())
}

fn run_log(opts: FileOptions, store: HistoryStore) -> Result<()> {
    for snapshot in store.history(tracked_path(opts.file)?)? {
        println!(
            "{} {} {}",
            snapshot.short_id().yellow(),
            snapshot.timestamp.format("%Y-%m-%d %H:%M:%S"),
            snapshot.message
        );
    }

    Ok(())
}

fn run_show(opts: SnapshotOptions, store: HistoryStore) -> Result<()> {
    let content = store
        .content_at(tracked_path(opts.file)?, &opts.id)?
        .ok_or_else(|| anyhow!("no snapshot {:?}", opts.id))?;
    print!("{content}");

    Ok(())
}

fn run_diff(opts: SnapshotOptions, store: HistoryStore) -> Result<()> {
    let diff = store
        .diff(tracked_path(opts.file)?, &opts.id)?
        .ok_or_else(|| anyhow!("could not load diff of {:?}", opts.id))?;
    for line in &diff.lines {
        let text = line.to_string();
        match line.kind {
            DiffLineKind::Added => println!("{}", text.green()),
            DiffLineKind::Removed => println!("{}", text.red()),
            DiffLineKind::HunkHeader => println!("{}", text.cyan()),
            DiffLineKind::FileHeader => println!("{}", text.bold()),
            DiffLineKind::Context | DiffLineKind::Marker => println!("{text}"),
        }
    }

    Ok(())
}

fn run_restore(opts: RestoreOptions, store: HistoryStore) -> Result<()> {
    let content = store.restore(tracked_path(opts.file.clone())?, &opts.id)?;
    if opts.write {
        fs::write(&opts.file, &content)
            .with_context(|| format!("failed to write {:?}", opts.file.display()))?;
        info!("restored {:?} from {}", opts.file.display(), opts.id);
    } else {
        print!("{content}");
    }

    Ok(())
}
