//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Relay captured content into a notebook web app and export its generated
/// artifacts.
///
/// Authentication uses your browser session: export cookies for the target
/// site in Netscape format and pass them with `--cookies`.
#[derive(Parser, Debug)]
#[command(name = "notebridge")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Netscape-format cookie file exported from the browser
    #[arg(long, global = true)]
    pub cookies: Option<PathBuf>,

    /// Override the application base URL (testing)
    #[arg(long, global = true, hide = true)]
    pub base_url: Option<String>,

    /// Per-call timeout in seconds (1-300)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=300), global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the browser session can reach the notebook app
    Auth,
    /// List, create, or rename notebooks
    Notebooks {
        #[command(subcommand)]
        command: NotebooksCommand,
    },
    /// Inspect or modify a notebook's sources
    Sources {
        #[command(subcommand)]
        command: SourcesCommand,
    },
    /// Capture content into a notebook through the upload queue
    Push(PushArgs),
    /// Export a notebook's generated content to a file
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
pub enum NotebooksCommand {
    /// List your notebooks (shared ones are excluded)
    List,
    /// Create a notebook
    Create {
        /// Name for the new notebook
        name: String,
    },
    /// Rename a notebook
    Rename {
        /// Notebook id
        id: String,
        /// New name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SourcesCommand {
    /// List a notebook's sources
    List {
        /// Notebook id
        notebook: String,
    },
    /// Delete sources by id
    Delete {
        /// Notebook id
        notebook: String,
        /// Source ids to delete
        ids: Vec<String>,
    },
    /// Print the full text of one source
    Text {
        /// Notebook id
        notebook: String,
        /// Source id
        id: String,
    },
    /// Dump the full text of every ready source to a directory
    Dump {
        /// Notebook id
        notebook: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct PushArgs {
    /// Notebook id to push into
    pub notebook: String,

    /// Title for the new source
    #[arg(long)]
    pub title: Option<String>,

    /// Capture a web page or YouTube URL
    #[arg(long, conflicts_with_all = ["text", "file"])]
    pub url: Option<String>,

    /// Capture literal text (reads stdin when the value is `-`)
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Capture a local file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Notebook id to export from
    pub notebook: String,

    /// Content category to export
    #[arg(long, value_enum)]
    pub category: ExportCategory,

    /// Output format
    #[arg(long, value_enum, default_value_t = ExportFormat::Markdown)]
    pub format: ExportFormat,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Bundle each item as its own file inside a ZIP
    #[arg(long)]
    pub individual: bool,
}

/// Exportable content categories.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportCategory {
    /// In-app notes
    Notes,
    /// Chat transcript
    Chat,
    /// Flashcard sets
    Flashcards,
    /// Quizzes
    Quiz,
    /// Data tables
    Tables,
    /// Generated reports
    Reports,
    /// Mindmaps
    Mindmaps,
    /// Slide decks (requires a live browser session)
    Slides,
}

/// Output formats.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Markdown text
    Markdown,
    /// Plain text
    Text,
    /// CSV with BOM (tables, flashcards)
    Csv,
    /// Anki tab-separated import (flashcards)
    Anki,
    /// Pretty-printed JSON
    Json,
    /// PDF document
    Pdf,
    /// Word document
    Docx,
    /// PowerPoint deck (slides)
    Pptx,
}
