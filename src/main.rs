//! Jotmark - A terminal sticky-note editor with live Markdown shortcuts.
//!
//! # Usage
//!
//! ```bash
//! jotmark
//! jotmark --mode flat --preview
//! jotmark --list
//! jotmark --export backup.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use jotmark::app::App;
use jotmark::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use jotmark::editor::SurfaceKind;
use jotmark::perf;
use jotmark::persist::{DEFAULT_DEBOUNCE_MS, JsonFileStore, NoteStore};

/// A terminal sticky-note editor with live Markdown block shortcuts
#[derive(Parser, Debug)]
#[command(name = "jotmark", version, about, long_about = None)]
struct Cli {
    /// Editing surface: one input per block, or one flat buffer
    #[arg(long, value_enum)]
    mode: Option<SurfaceKind>,

    /// Notes file (defaults to the user data directory)
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Quiet period before an edit is saved, in milliseconds
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Start with the preview pane visible
    #[arg(long)]
    preview: bool,

    /// Open the note with this id
    #[arg(long, value_name = "ID")]
    note: Option<String>,

    /// Do not reload when the notes file changes on disk
    #[arg(long)]
    no_watch: bool,

    /// Print every note's id and title, then exit
    #[arg(long)]
    list: bool,

    /// Write all notes to PATH as an export file, then exit
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Replace all notes with those in an export file, then exit
    #[arg(long, value_name = "PATH")]
    import: Option<PathBuf>,

    /// Enable startup performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed debug events to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn list_notes(store: &JsonFileStore) -> Result<()> {
    let notes = store
        .load_all()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;
    for note in notes {
        println!(
            "{}\t{}\t{}",
            note.id,
            note.updated_at.format("%Y-%m-%d %H:%M"),
            note.title
        );
    }
    Ok(())
}

fn export_notes(store: &JsonFileStore, path: &Path) -> Result<()> {
    let json = store.export(Utc::now()).context("Failed to export notes")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Exported notes to {}", path.display());
    Ok(())
}

fn import_notes(store: &JsonFileStore, path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let count = store
        .import(&json)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    println!("Imported {count} notes into {}", store.path().display());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os(perf::DEBUG_LOG_ENV).map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize debug log {}: {}",
            debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let store_path = effective
        .store
        .clone()
        .unwrap_or_else(JsonFileStore::default_path);
    let store = JsonFileStore::new(&store_path);

    if cli.list {
        return list_notes(&store);
    }
    if let Some(path) = &cli.export {
        return export_notes(&store, path);
    }
    if let Some(path) = &cli.import {
        return import_notes(&store, path);
    }

    // Run the application
    let mut app = App::new(store_path)
        .with_surface(effective.mode.unwrap_or_default())
        .with_debounce_ms(effective.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
        .with_preview_visible(effective.preview)
        .with_initial_note(cli.note)
        .with_watch(!cli.no_watch);

    app.run().context("Application error")
}
