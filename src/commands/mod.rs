//! Subcommand implementations for the CLI binary.

mod export;

pub use export::export;

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use notebridge_core::auth::load_cookie_file;
use notebridge_core::queue::{UploadItem, UploadKind, UploadPayload, UploadStatus};
use notebridge_core::repository::{Repository, SourceKind};
use notebridge_core::rpc::{RpcClient, RpcEndpoint};
use notebridge_core::{UploadQueue, export::sanitize_title};

use crate::cli::{Args, NotebooksCommand, PushArgs, SourcesCommand};

/// Builds the repository from global CLI flags.
pub fn build_repository(args: &Args) -> Result<Repository> {
    let jar = match &args.cookies {
        Some(path) => Some(
            load_cookie_file(path)
                .with_context(|| format!("loading cookies from {}", path.display()))?,
        ),
        None => None,
    };

    let endpoint = match &args.base_url {
        Some(base) => RpcEndpoint::new(base.clone()),
        None => RpcEndpoint::default(),
    };

    let client = RpcClient::with_timeout(endpoint, jar, Duration::from_secs(args.timeout))?;
    Ok(Repository::new(Arc::new(client)))
}

/// `auth` - verifies the browser session by issuing one real call.
pub async fn auth_check(repository: &Repository) -> Result<()> {
    match repository.list_notebooks().await {
        Ok(notebooks) => {
            println!(
                "Signed in. {} notebook(s) visible to this session.",
                notebooks.len()
            );
            Ok(())
        }
        Err(error) => bail!("not signed in: {error}"),
    }
}

/// `notebooks` subcommands.
pub async fn notebooks(repository: &Repository, command: &NotebooksCommand) -> Result<()> {
    match command {
        NotebooksCommand::List => {
            let notebooks = repository.list_notebooks().await?;
            if notebooks.is_empty() {
                println!("No notebooks.");
            }
            for notebook in notebooks {
                println!("{}  {}", notebook.id, notebook.name);
            }
        }
        NotebooksCommand::Create { name } => {
            let notebook = repository.create_notebook(name).await?;
            println!("Created {}  {}", notebook.id, notebook.name);
        }
        NotebooksCommand::Rename { id, name } => {
            repository.rename_notebook(id, name).await?;
            println!("Renamed {id} to \"{name}\"");
        }
    }
    Ok(())
}

/// `sources` subcommands.
pub async fn sources(repository: &Repository, command: &SourcesCommand) -> Result<()> {
    match command {
        SourcesCommand::List { notebook } => {
            let detail = repository.notebook_detail(notebook).await?;
            println!("{} ({} sources)", detail.title, detail.sources.len());
            for source in detail.sources {
                println!(
                    "{}  [{:?}/{:?}]  {}",
                    source.id, source.kind, source.status, source.title
                );
            }
        }
        SourcesCommand::Delete { notebook, ids } => {
            if ids.is_empty() {
                bail!("no source ids given");
            }
            let attempted = repository.delete_sources(notebook, ids).await?;
            println!("Requested deletion of {attempted} source(s).");
        }
        SourcesCommand::Text { notebook, id } => {
            match repository.source_text(notebook, id).await? {
                Some(text) => println!("{text}"),
                None => bail!("no text available for source {id} (still processing?)"),
            }
        }
        SourcesCommand::Dump { notebook, out } => {
            let detail = repository.notebook_detail(notebook).await?;
            let ready: Vec<String> = detail
                .sources
                .iter()
                .filter(|s| s.status.is_fetchable())
                .map(|s| s.id.clone())
                .collect();
            if ready.is_empty() {
                bail!("no ready sources to dump");
            }

            let bar = ProgressBar::new(ready.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{spinner} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message("loading source text");

            let texts = repository.load_many_source_texts(notebook, &ready, 3).await;
            bar.finish_and_clear();

            std::fs::create_dir_all(out)?;
            let mut written = 0;
            for source in &detail.sources {
                let Some(text) = texts.get(&source.id) else {
                    continue;
                };
                let path = out.join(format!("{}.txt", sanitize_title(&source.title)));
                std::fs::write(&path, text)?;
                written += 1;
            }
            println!("Wrote {written} of {} source(s) to {}", ready.len(), out.display());
        }
    }
    Ok(())
}

/// `push` - captures one item into the notebook through the queue.
pub async fn push(repository: &Repository, args: &PushArgs) -> Result<()> {
    let item = build_item(args)?;
    let queue = UploadQueue::new(repository.clone(), &args.notebook);
    let id = queue.enqueue(item).await;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("submitting");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let report = queue.process().await;
    spinner.finish_and_clear();
    info!(?report, "push finished");

    let items = queue.items().await;
    let Some(item) = items.iter().find(|it| it.id == id) else {
        bail!("queue item vanished");
    };
    match item.status {
        UploadStatus::Done => {
            match (item.chunk_index, item.total_chunks) {
                (_, Some(total)) if total > 1 => {
                    println!("Submitted \"{}\" in {total} parts.", item.title);
                }
                _ => println!("Submitted \"{}\".", item.title),
            }
            Ok(())
        }
        _ => bail!(
            "upload failed: {}",
            item.message.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Builds an upload item from push flags.
fn build_item(args: &PushArgs) -> Result<UploadItem> {
    if let Some(url) = &args.url {
        let kind = if SourceKind::infer_from_url(url) == SourceKind::Youtube {
            UploadKind::Youtube
        } else {
            UploadKind::Page
        };
        let title = args.title.clone().unwrap_or_else(|| url.clone());
        return Ok(UploadItem::new(
            kind,
            title,
            UploadPayload::Link { url: url.clone() },
        ));
    }

    if let Some(text) = &args.text {
        let text = if text == "-" {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        } else {
            text.clone()
        };
        let title = args
            .title
            .clone()
            .unwrap_or_else(|| "Captured note".to_string());
        return Ok(UploadItem::new(
            UploadKind::Note,
            title,
            UploadPayload::Text { text },
        ));
    }

    if let Some(path) = &args.file {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let mime = mime_for(&filename);
        let title = args.title.clone().unwrap_or_else(|| filename.clone());
        return Ok(UploadItem::new(
            UploadKind::File,
            title,
            UploadPayload::File {
                filename,
                mime: mime.to_string(),
                bytes,
            },
        ));
    }

    bail!("nothing to push: pass --url, --text, or --file")
}

/// MIME type from a filename extension.
fn mime_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "pdf" => "application/pdf",
        Some(ext) if ext == "txt" || ext == "md" => "text/plain",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "html" || ext == "htm" => "text/html",
        _ => "application/octet-stream",
    }
}
