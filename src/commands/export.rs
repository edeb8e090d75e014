//! `export` - renders recovered notebook content to files.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::info;

use notebridge_core::export::{
    self, chat_to_markdown, chat_to_text, export_filename, flashcards_to_anki, flashcards_to_csv,
    mindmap_to_outline, notes_to_markdown, quiz_to_markdown, report_to_markdown, slides_to_pptx,
    table_to_csv, text_to_docx, text_to_pdf, zip_bundle,
};
use notebridge_core::repository::{NotebookContent, Repository};

use crate::cli::{ExportArgs, ExportCategory, ExportFormat};

/// One rendered output file.
struct Rendered {
    filename: String,
    bytes: Vec<u8>,
}

/// Runs the export flow: fetch extended content, render, write.
pub async fn export(repository: &Repository, args: &ExportArgs) -> Result<()> {
    let detail = repository.notebook_detail(&args.notebook).await?;
    let title = if detail.title.is_empty() {
        args.notebook.clone()
    } else {
        detail.title.clone()
    };
    let content = repository.extended_content(&args.notebook).await;
    info!(
        notes = content.notes.len(),
        chat = content.chat.len(),
        artifacts = content.artifacts.len(),
        "content fetched for export"
    );

    let files = render(&title, &content, args)?;
    if files.is_empty() {
        if args.category == ExportCategory::Slides {
            bail!(
                "no slide images recovered; slide export needs a live browser session showing the notebook"
            );
        }
        bail!("nothing to export for this category");
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let count = files.len();
    let outputs = if args.individual && count > 1 {
        let entries: Vec<(String, Vec<u8>)> = files
            .into_iter()
            .map(|f| (f.filename, f.bytes))
            .collect();
        vec![Rendered {
            filename: export_filename(&title, category_slug(args.category), "zip", Utc::now()),
            bytes: zip_bundle(&entries)?,
        }]
    } else {
        files
    };

    for file in &outputs {
        let path = args.out.join(&file.filename);
        std::fs::write(&path, &file.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    if args.individual && count > 1 {
        println!("Bundled {count} file(s).");
    }
    Ok(())
}

fn category_slug(category: ExportCategory) -> &'static str {
    match category {
        ExportCategory::Notes => "notes",
        ExportCategory::Chat => "chat",
        ExportCategory::Flashcards => "flashcards",
        ExportCategory::Quiz => "quiz",
        ExportCategory::Tables => "tables",
        ExportCategory::Reports => "reports",
        ExportCategory::Mindmaps => "mindmaps",
        ExportCategory::Slides => "slides",
    }
}

/// Renders the requested category x format combination.
fn render(title: &str, content: &NotebookContent, args: &ExportArgs) -> Result<Vec<Rendered>> {
    let category_is_empty = match args.category {
        ExportCategory::Notes => content.notes.is_empty(),
        ExportCategory::Chat => content.chat.is_empty(),
        ExportCategory::Flashcards => content.flashcard_sets.is_empty(),
        ExportCategory::Quiz => content.quizzes.is_empty(),
        ExportCategory::Tables => content.tables.is_empty(),
        ExportCategory::Reports => content.reports.is_empty(),
        ExportCategory::Mindmaps => content.mindmaps.is_empty(),
        ExportCategory::Slides => content.slide_decks.is_empty(),
    };
    if category_is_empty {
        return Ok(Vec::new());
    }

    let now = Utc::now();
    let slug = category_slug(args.category);
    let single = |ext: &str, bytes: Vec<u8>| -> Vec<Rendered> {
        vec![Rendered {
            filename: export_filename(title, slug, ext, now),
            bytes,
        }]
    };

    let files = match (args.category, args.format) {
        // Notes
        (ExportCategory::Notes, ExportFormat::Markdown) => {
            single("md", notes_to_markdown(&content.notes).into_bytes())
        }
        (ExportCategory::Notes, ExportFormat::Text) => {
            single("txt", notes_to_markdown(&content.notes).into_bytes())
        }
        (ExportCategory::Notes, ExportFormat::Json) => {
            single("json", export::to_json(&content.notes)?.into_bytes())
        }
        (ExportCategory::Notes, ExportFormat::Pdf) => {
            single("pdf", text_to_pdf(title, &notes_to_markdown(&content.notes))?)
        }
        (ExportCategory::Notes, ExportFormat::Docx) => {
            single("docx", text_to_docx(title, &notes_to_markdown(&content.notes))?)
        }

        // Chat
        (ExportCategory::Chat, ExportFormat::Markdown) => {
            single("md", chat_to_markdown(&content.chat).into_bytes())
        }
        (ExportCategory::Chat, ExportFormat::Text) => {
            single("txt", chat_to_text(&content.chat).into_bytes())
        }
        (ExportCategory::Chat, ExportFormat::Json) => {
            single("json", export::to_json(&content.chat)?.into_bytes())
        }
        (ExportCategory::Chat, ExportFormat::Pdf) => {
            single("pdf", text_to_pdf(title, &chat_to_text(&content.chat))?)
        }
        (ExportCategory::Chat, ExportFormat::Docx) => {
            single("docx", text_to_docx(title, &chat_to_text(&content.chat))?)
        }

        // Flashcards
        (ExportCategory::Flashcards, ExportFormat::Anki) => content
            .flashcard_sets
            .iter()
            .map(|(set_title, cards)| Rendered {
                filename: export_filename(set_title, slug, "txt", now),
                bytes: flashcards_to_anki(cards).into_bytes(),
            })
            .collect(),
        (ExportCategory::Flashcards, ExportFormat::Csv) => content
            .flashcard_sets
            .iter()
            .map(|(set_title, cards)| Rendered {
                filename: export_filename(set_title, slug, "csv", now),
                bytes: flashcards_to_csv(cards).into_bytes(),
            })
            .collect(),
        (ExportCategory::Flashcards, ExportFormat::Json) => {
            single("json", export::to_json(&content.flashcard_sets)?.into_bytes())
        }

        // Quiz
        (ExportCategory::Quiz, ExportFormat::Markdown) => content
            .quizzes
            .iter()
            .map(|(quiz_title, questions)| Rendered {
                filename: export_filename(quiz_title, slug, "md", now),
                bytes: quiz_to_markdown(quiz_title, questions).into_bytes(),
            })
            .collect(),
        (ExportCategory::Quiz, ExportFormat::Json) => {
            single("json", export::to_json(&content.quizzes)?.into_bytes())
        }

        // Tables
        (ExportCategory::Tables, ExportFormat::Csv) => content
            .tables
            .iter()
            .map(|(table_title, table)| Rendered {
                filename: export_filename(table_title, slug, "csv", now),
                bytes: table_to_csv(table).into_bytes(),
            })
            .collect(),
        (ExportCategory::Tables, ExportFormat::Json) => {
            single("json", export::to_json(&content.tables)?.into_bytes())
        }

        // Reports
        (ExportCategory::Reports, ExportFormat::Markdown) => content
            .reports
            .iter()
            .map(|report| Rendered {
                filename: export_filename(&report.title, slug, "md", now),
                bytes: report_to_markdown(report).into_bytes(),
            })
            .collect(),
        (ExportCategory::Reports, ExportFormat::Text) => content
            .reports
            .iter()
            .map(|report| Rendered {
                filename: export_filename(&report.title, slug, "txt", now),
                bytes: report.content.clone().into_bytes(),
            })
            .collect(),
        (ExportCategory::Reports, ExportFormat::Json) => {
            single("json", export::to_json(&content.reports)?.into_bytes())
        }
        (ExportCategory::Reports, ExportFormat::Pdf) => content
            .reports
            .iter()
            .map(|report| {
                Ok(Rendered {
                    filename: export_filename(&report.title, slug, "pdf", now),
                    bytes: text_to_pdf(&report.title, &report.content)?,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        (ExportCategory::Reports, ExportFormat::Docx) => content
            .reports
            .iter()
            .map(|report| {
                Ok(Rendered {
                    filename: export_filename(&report.title, slug, "docx", now),
                    bytes: text_to_docx(&report.title, &report.content)?,
                })
            })
            .collect::<Result<Vec<_>>>()?,

        // Mindmaps
        (ExportCategory::Mindmaps, ExportFormat::Markdown | ExportFormat::Text) => content
            .mindmaps
            .iter()
            .map(|root| Rendered {
                filename: export_filename(&root.label, slug, "md", now),
                bytes: mindmap_to_outline(root).into_bytes(),
            })
            .collect(),
        (ExportCategory::Mindmaps, ExportFormat::Json) => {
            single("json", export::to_json(&content.mindmaps)?.into_bytes())
        }

        // Slides
        (ExportCategory::Slides, ExportFormat::Pptx) => {
            let mut files = Vec::new();
            for (deck_title, slides) in &content.slide_decks {
                let total = slides.len();
                let bytes = match slides_to_pptx(slides) {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        println!("Skipping \"{deck_title}\": {error}");
                        continue;
                    }
                };
                let embedded = slides
                    .iter()
                    .filter(|s| {
                        s.image_url
                            .as_deref()
                            .is_some_and(|u| u.starts_with("data:"))
                    })
                    .count();
                if embedded < total {
                    println!("Exported {embedded} of {total} slides for \"{deck_title}\".");
                }
                files.push(Rendered {
                    filename: export_filename(deck_title, slug, "pptx", now),
                    bytes,
                });
            }
            files
        }

        (category, format) => bail!(
            "format {format:?} is not supported for category {category:?}"
        ),
    };

    // Individual mode wants stable, distinct names even when two artifacts
    // share a title; the bundler adds numeric suffixes, but solo files
    // collide on disk, so disambiguate here.
    let mut files = files;
    if !args.individual {
        dedup_filenames(&mut files);
    }
    Ok(files)
}

/// Appends an index before the extension for colliding filenames.
fn dedup_filenames(files: &mut [Rendered]) {
    for i in 1..files.len() {
        let name = files[i].filename.clone();
        let collides = files[..i].iter().any(|f| f.filename == name);
        if collides {
            let replacement = match name.rsplit_once('.') {
                Some((stem, ext)) => format!("{stem}_{n}.{ext}", n = i + 1),
                None => format!("{name}_{n}", n = i + 1),
            };
            files[i].filename = replacement;
        }
    }
}
