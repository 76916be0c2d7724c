//! LiteMark - a local markdown notebook on the command line.
//!
//! # Usage
//!
//! ```bash
//! litemark list --search fin
//! litemark new --title "Budget" --tag "#finance"
//! litemark edit <ID> --content "rent, food" --snippet checkbox
//! litemark tags --expand "#finance"
//! litemark delete <ID> && litemark trash
//! ```

mod config;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};

use litemark_core::db::migrations::schema_version;
use litemark_core::db::{open_db_in_dir, DB_FILE_NAME};
use litemark_core::{
    core_version, default_log_level, filter_notes, init_logging, logging_status, normalize_tag,
    summarize, tag_index, trash_listing, EditingSession, LogLevel, MarkdownSnippet, Note,
    NoteService, NoteSummary, SessionConfig, SqliteKvStore, TagBrowser, TagEntry, TagKey,
    UpdateOutcome, TAG_MARKER,
};

type Service<'conn> = NoteService<SqliteKvStore<'conn>>;

/// A local markdown notebook
#[derive(Parser, Debug)]
#[command(name = "litemark", version, about, long_about = None)]
struct Cli {
    /// Directory holding the note database and logs
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Quiet period before edits are committed
    #[arg(long, global = true, value_name = "MS", default_value_t = 500)]
    debounce_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List active notes, newest first
    List {
        /// Case-insensitive filter over title, content and tags
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Print an active note
    Show { id: String },
    /// Create a note and print its id
    New {
        #[command(flatten)]
        fields: NoteFields,
    },
    /// Edit an active note
    Edit {
        id: String,
        #[command(flatten)]
        fields: NoteFields,
    },
    /// Move a note to the trash
    Delete { id: String },
    /// Move a note from the trash back to the list
    Restore { id: String },
    /// Permanently remove a note from the trash
    Purge { id: String },
    /// Permanently remove every note in the trash
    EmptyTrash,
    /// List deleted notes
    Trash,
    /// Show tags with note counts
    Tags {
        /// Also list the notes carrying this tag
        #[arg(long, value_name = "TAG")]
        expand: Option<String>,
    },
    /// Write a note to `<title>.md`
    Export {
        id: String,
        /// Target directory (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Show versions, paths and collection sizes
    Status,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::New { .. } => "new",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::Restore { .. } => "restore",
            Self::Purge { .. } => "purge",
            Self::EmptyTrash => "empty_trash",
            Self::Trash => "trash",
            Self::Tags { .. } => "tags",
            Self::Export { .. } => "export",
            Self::Status => "status",
        }
    }
}

#[derive(Args, Debug, Default)]
struct NoteFields {
    /// New title
    #[arg(long)]
    title: Option<String>,

    /// New content (replaces the whole body)
    #[arg(long)]
    content: Option<String>,

    /// Tag to add, e.g. `#work` (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Tag to remove (repeatable)
    #[arg(long = "remove-tag", value_name = "TAG")]
    remove_tags: Vec<String>,

    /// Markdown snippet appended to the content
    #[arg(long, value_enum)]
    snippet: Option<SnippetArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SnippetArg {
    H1,
    H2,
    H3,
    Bold,
    Italic,
    Strike,
    Table,
    Checkbox,
    Link,
    Code,
}

impl From<SnippetArg> for MarkdownSnippet {
    fn from(value: SnippetArg) -> Self {
        match value {
            SnippetArg::H1 => Self::Heading1,
            SnippetArg::H2 => Self::Heading2,
            SnippetArg::H3 => Self::Heading3,
            SnippetArg::Bold => Self::Bold,
            SnippetArg::Italic => Self::Italic,
            SnippetArg::Strike => Self::Strikethrough,
            SnippetArg::Table => Self::Table,
            SnippetArg::Checkbox => Self::Checkbox,
            SnippetArg::Link => Self::Link,
            SnippetArg::Code => Self::CodeBlock,
        }
    }
}

struct RunContext<'a> {
    data_dir: &'a Path,
    schema_version: u32,
    session: SessionConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = config::resolve_data_dir(cli.data_dir.clone())?;
    let level = cli.log_level.unwrap_or_else(default_log_level);
    let log_dir = config::log_dir(&data_dir);
    if let Err(err) = init_logging(level.as_str(), &log_dir.to_string_lossy()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db_in_dir(&data_dir)
        .with_context(|| format!("Failed to open database in {}", data_dir.display()))?;
    let schema_version = schema_version(&conn).context("Failed to read schema version")?;
    let store = SqliteKvStore::try_new(&conn).context("Database is not initialized")?;
    let mut service = NoteService::new(store);
    service
        .initialize()
        .context("Failed to seed first-run notes")?;

    let ctx = RunContext {
        data_dir: &data_dir,
        schema_version,
        session: SessionConfig::with_debounce_ms(cli.debounce_ms),
    };
    let command_name = cli.command.name();
    info!("event=cli_command module=cli status=start command={command_name}");
    let result = run(cli.command, &mut service, &ctx);
    match &result {
        Ok(()) => info!("event=cli_command module=cli status=ok command={command_name}"),
        Err(err) => error!("event=cli_command module=cli status=error command={command_name} error={err}"),
    }
    result
}

fn run(command: Command, service: &mut Service<'_>, ctx: &RunContext<'_>) -> Result<()> {
    match command {
        Command::List { search } => {
            let notes = filter_notes(&service.list_active(), search.as_deref().unwrap_or(""));
            print_rows(&summarize(&notes), "No notes.");
        }
        Command::Show { id } => {
            let id = resolve_id(&service.list_active(), &id)?;
            let Some(note) = service.get_active(&id) else {
                bail!("No active note with id `{id}`");
            };
            print_note(&note);
        }
        Command::New { fields } => {
            check_tags(&fields.tags)?;
            let note = service.create().context("Failed to create note")?;
            let mut session = EditingSession::new(ctx.session);
            session.open_new(&note);
            let wants_title = session.take_title_focus() && fields.title.is_none();
            let edited_at = Instant::now();
            apply_fields(&mut session, fields, edited_at)?;
            commit(&mut session, service, ctx, edited_at)?;
            println!("{}", note.id);
            if wants_title {
                eprintln!("hint: name it with `litemark edit {} --title <TITLE>`", note.id);
            }
        }
        Command::Edit { id, fields } => {
            let id = resolve_id(&service.list_active(), &id)?;
            let Some(note) = service.get_active(&id) else {
                bail!("No active note with id `{id}`");
            };
            let mut session = EditingSession::new(ctx.session);
            session.open(&note);
            let edited_at = Instant::now();
            apply_fields(&mut session, fields, edited_at)?;
            match commit(&mut session, service, ctx, edited_at)? {
                Some(UpdateOutcome::Updated(note)) => println!("Updated {}", note.id),
                Some(UpdateOutcome::NotFound) => bail!("Note `{id}` disappeared before saving"),
                Some(UpdateOutcome::Unchanged) | None => println!("No changes."),
            }
        }
        Command::Delete { id } => {
            let id = resolve_id(&service.list_active(), &id)?;
            if !service.soft_delete(&id)? {
                bail!("No active note with id `{id}`");
            }
            println!("Moved {id} to the trash.");
        }
        Command::Restore { id } => {
            let id = resolve_id(&service.list_deleted(), &id)?;
            if !service.restore(&id)? {
                bail!("No deleted note with id `{id}`");
            }
            println!("Restored {id}.");
        }
        Command::Purge { id } => {
            let id = resolve_id(&service.list_deleted(), &id)?;
            if !service.purge(&id)? {
                bail!("No deleted note with id `{id}`");
            }
            println!("Permanently deleted {id}.");
        }
        Command::EmptyTrash => {
            let purged = service.purge_all()?;
            println!("Permanently deleted {purged} note(s).");
        }
        Command::Trash => {
            let rows = trash_listing(&service.list_deleted());
            print_rows(&summarize(&rows), "Trash is empty.");
        }
        Command::Tags { expand } => print_tags(&service.list_active(), expand.as_deref()),
        Command::Export { id, out } => {
            let id = resolve_id(&service.list_active(), &id)?;
            let Some(note) = service.get_active(&id) else {
                bail!("No active note with id `{id}`");
            };
            let mut session = EditingSession::new(ctx.session);
            session.open(&note);
            let Some(document) = session.export() else {
                bail!("Nothing to export");
            };
            let dir = match out {
                Some(dir) => dir,
                None => std::env::current_dir().context("Failed to read current directory")?,
            };
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = document
                .write_into(&dir)
                .with_context(|| format!("Failed to write {}", document.file_name))?;
            println!("{}", path.display());
        }
        Command::Status => print_status(service, ctx),
    }
    Ok(())
}

/// Rejects `--tag` values up front so a bad flag never leaves a note behind.
fn check_tags(tags: &[String]) -> Result<()> {
    for tag in tags {
        normalize_tag(tag).with_context(|| {
            format!("`{tag}` is not a tag; tags start with `{TAG_MARKER}` and contain no spaces")
        })?;
    }
    Ok(())
}

fn apply_fields(session: &mut EditingSession, fields: NoteFields, now: Instant) -> Result<()> {
    if let Some(title) = fields.title {
        session.set_title(title, now);
    }
    if let Some(content) = fields.content {
        session.set_content(content, now);
    }
    for tag in &fields.tags {
        session.set_tag_input(tag.as_str());
        match session.handle_tag_key(TagKey::Enter, now) {
            TagEntry::Added(_) => {}
            TagEntry::Duplicate(existing) => eprintln!("{existing} is already on this note"),
            TagEntry::Ignored => bail!(
                "`{tag}` is not a tag; tags start with `{TAG_MARKER}` and contain no spaces"
            ),
        }
    }
    for tag in &fields.remove_tags {
        if !session.remove_tag(tag, now) {
            eprintln!("{tag} is not on this note");
        }
    }
    if let Some(snippet) = fields.snippet {
        let end = session.content().len();
        session.set_selection(end, end);
        session.insert_snippet(snippet.into(), now);
    }
    Ok(())
}

/// Lets the quiet period elapse and commits whatever is pending.
fn commit(
    session: &mut EditingSession,
    service: &mut Service<'_>,
    ctx: &RunContext<'_>,
    edited_at: Instant,
) -> Result<Option<UpdateOutcome>> {
    let outcome = session
        .tick(edited_at + ctx.session.debounce, service)
        .context("Failed to save note")?;
    Ok(outcome)
}

/// Accepts a full id or a unique id prefix.
fn resolve_id(notes: &[Note], needle: &str) -> Result<String> {
    let needle = needle.trim();
    if needle.is_empty() {
        bail!("Note id cannot be empty");
    }
    if let Some(note) = notes.iter().find(|note| note.id == needle) {
        return Ok(note.id.clone());
    }
    let matches = notes
        .iter()
        .filter(|note| note.id.starts_with(needle))
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => bail!("No note with id `{needle}`"),
        _ => bail!("Id `{needle}` is ambiguous ({} notes match)", matches.len()),
    }
}

fn print_rows(rows: &[NoteSummary], empty_message: &str) {
    if rows.is_empty() {
        println!("{empty_message}");
        return;
    }
    for row in rows {
        let modified = row.last_modified.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        let tags = if row.tags.is_empty() {
            String::new()
        } else {
            format!("  {}", row.tags.join(" "))
        };
        println!("{}  {modified}  {}{tags}", row.id, row.title);
        if let Some(text) = &row.preview.preview_text {
            println!("    {text}");
        }
    }
}

fn print_note(note: &Note) {
    println!("{}", note.title);
    println!("id: {}", note.id);
    println!(
        "modified: {}",
        note.last_modified.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    if !note.tags.is_empty() {
        println!("tags: {}", note.tags.join(" "));
    }
    println!();
    println!("{}", note.content);
}

fn print_tags(active: &[Note], expand: Option<&str>) {
    let index = tag_index(active);
    if index.is_empty() {
        println!("No tags.");
        return;
    }
    let mut browser = TagBrowser::new();
    if let Some(tag) = expand {
        browser.toggle(tag.trim());
    }
    for entry in &index {
        println!("{} ({})", entry.tag, entry.count);
        if browser.expanded() == Some(entry.tag.as_str()) {
            for note in browser.expanded_notes(active) {
                println!("    {}  {}", note.id, note.title);
            }
        }
    }
    if let Some(tag) = browser.expanded() {
        if !index.iter().any(|entry| entry.tag == tag) {
            println!("No notes tagged {tag}.");
        }
    }
}

fn print_status(service: &Service<'_>, ctx: &RunContext<'_>) {
    println!(
        "litemark {} (core {})",
        env!("CARGO_PKG_VERSION"),
        core_version()
    );
    println!("data dir: {}", ctx.data_dir.display());
    println!(
        "database: {} (schema v{})",
        ctx.data_dir.join(DB_FILE_NAME).display(),
        ctx.schema_version
    );
    match logging_status() {
        Some((level, dir)) => println!("logging: {level} -> {}", dir.display()),
        None => println!("logging: disabled"),
    }
    let active = service.list_active();
    println!("active notes: {}", active.len());
    println!("deleted notes: {}", service.list_deleted().len());
    println!("tags: {}", tag_index(&active).len());
    println!("debounce: {} ms", ctx.session.debounce.as_millis());
}

#[cfg(test)]
mod tests {
    use super::{apply_fields, resolve_id, run, Command, NoteFields, RunContext, SnippetArg};
    use chrono::{TimeZone, Utc};
    use litemark_core::db::open_db_in_memory;
    use litemark_core::{EditingSession, Note, NoteService, SessionConfig, SqliteKvStore};
    use std::path::Path;
    use std::time::Instant;

    fn note(id: &str) -> Note {
        Note::with_id(id, "t", "", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let notes = vec![note("abc123"), note("abd456")];
        assert_eq!(resolve_id(&notes, "abc").unwrap(), "abc123");
        assert_eq!(resolve_id(&notes, "abd456").unwrap(), "abd456");
    }

    #[test]
    fn resolve_id_prefers_exact_match_over_prefix() {
        let notes = vec![note("default-note"), note("default-note-2")];
        assert_eq!(resolve_id(&notes, "default-note").unwrap(), "default-note");
    }

    #[test]
    fn resolve_id_rejects_ambiguous_and_unknown() {
        let notes = vec![note("abc123"), note("abd456")];
        assert!(resolve_id(&notes, "ab").is_err());
        assert!(resolve_id(&notes, "zzz").is_err());
        assert!(resolve_id(&notes, "  ").is_err());
    }

    #[test]
    fn apply_fields_rejects_tag_without_marker() {
        let mut session = EditingSession::default();
        session.open(&note("n1"));
        let fields = NoteFields {
            tags: vec!["finance".to_string()],
            ..NoteFields::default()
        };
        assert!(apply_fields(&mut session, fields, Instant::now()).is_err());
    }

    #[test]
    fn apply_fields_appends_snippet_after_content() {
        let mut session = EditingSession::default();
        session.open(&note("n1"));
        let fields = NoteFields {
            content: Some("todo".to_string()),
            tags: vec!["#work".to_string()],
            snippet: Some(SnippetArg::Checkbox),
            ..NoteFields::default()
        };
        apply_fields(&mut session, fields, Instant::now()).unwrap();
        assert_eq!(session.content(), "todo- [ ] ");
        assert_eq!(session.tags(), ["#work".to_string()]);
    }

    #[test]
    fn new_with_invalid_tag_creates_nothing() {
        let conn = open_db_in_memory().unwrap();
        let mut service = NoteService::new(SqliteKvStore::try_new(&conn).unwrap());
        let ctx = RunContext {
            data_dir: Path::new("/unused"),
            schema_version: 1,
            session: SessionConfig::default(),
        };
        let command = Command::New {
            fields: NoteFields {
                title: Some("Budget".to_string()),
                tags: vec!["#money".to_string(), "finance".to_string()],
                ..NoteFields::default()
            },
        };

        let err = run(command, &mut service, &ctx).unwrap_err();

        assert!(err.to_string().contains("`finance` is not a tag"));
        assert!(service.list_active().is_empty());
        assert!(service.list_deleted().is_empty());
    }

    #[test]
    fn new_with_valid_fields_saves_them() {
        let conn = open_db_in_memory().unwrap();
        let mut service = NoteService::new(SqliteKvStore::try_new(&conn).unwrap());
        let ctx = RunContext {
            data_dir: Path::new("/unused"),
            schema_version: 1,
            session: SessionConfig::default(),
        };
        let command = Command::New {
            fields: NoteFields {
                title: Some("Budget".to_string()),
                tags: vec!["#money".to_string()],
                ..NoteFields::default()
            },
        };

        run(command, &mut service, &ctx).unwrap();

        let active = service.list_active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Budget");
        assert_eq!(active[0].tags, vec!["#money".to_string()]);
    }
}
