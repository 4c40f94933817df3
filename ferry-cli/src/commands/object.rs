//! Object command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use clap::Subcommand;
use colored::*;
use ferry_client::{Download, UploadRequest};
use ferry_core::domain::storage::ObjectInfo;
use ferry_core::dto::object::DownloadRequest;
use ferry_core::events::{Event, Notification};

use crate::session::Session;

/// Object subcommands
#[derive(Subcommand)]
pub enum ObjectCommands {
    /// List the objects in a bucket
    List {
        /// Bucket name
        bucket: String,
        /// Only list keys starting with this prefix
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Print a temporary link to an object
    Preview {
        /// Bucket name
        bucket: String,
        /// Object key
        key: String,
    },
    /// Download objects; several keys are saved as one zip archive
    Download {
        /// Bucket name
        bucket: String,
        /// Object keys
        #[arg(required = true)]
        keys: Vec<String>,
        /// Target directory or file
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Upload a local file
    Upload {
        /// Bucket name
        bucket: String,
        /// Local file
        path: PathBuf,
        /// Object key, defaults to the file name
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove objects
    Remove {
        /// Bucket name
        bucket: String,
        /// Object keys
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

impl ObjectCommands {
    fn bucket(&self) -> &str {
        match self {
            ObjectCommands::List { bucket, .. }
            | ObjectCommands::Preview { bucket, .. }
            | ObjectCommands::Download { bucket, .. }
            | ObjectCommands::Upload { bucket, .. }
            | ObjectCommands::Remove { bucket, .. } => bucket,
        }
    }
}

/// Handle object commands
pub async fn handle_object_command(command: ObjectCommands, session: &mut Session) -> Result<()> {
    session.require_view(&format!("/buckets/{}", command.bucket()))?;
    let client = session.client()?;

    match command {
        ObjectCommands::List { bucket, prefix } => {
            let listing = client.list_objects(&bucket, &prefix).await;
            if listing.files.is_empty() && listing.error.is_none() {
                println!("{}", "No objects found.".yellow());
            }
            for object in &listing.files {
                print_object(object);
            }
            if let Some(err) = listing.error {
                session.publish(Event::ShowSnackbar(Notification::error(err.to_string())));
                bail!("Listing of {} is incomplete: {}", bucket, err);
            }
        }
        ObjectCommands::Preview { bucket, key } => {
            let url = session.check(client.preview_url(&bucket, &key).await)?;
            println!("{}", url);
        }
        ObjectCommands::Download {
            bucket,
            keys,
            output,
        } => {
            let download = session.check(client.download(&DownloadRequest::new(bucket, keys)).await)?;
            let target = target_path(&output, download.file_name());
            std::fs::write(&target, download.bytes())
                .with_context(|| format!("Failed to write {}", target.display()))?;

            let what = match &download {
                Download::File(_) => "file".to_string(),
                Download::Archive(archive) => format!("archive of {} files", archive.entries.len()),
            };
            println!("{}", format!("Saved {} to {}", what, target.display()).green());
        }
        ObjectCommands::Upload { bucket, path, key } => {
            let body = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let key = match key {
                Some(key) => key,
                None => default_key(&path)?,
            };

            let request = UploadRequest::new(&bucket, &key, Bytes::from(body))
                .with_content_type(content_type_for(&path).to_string());
            session.check(client.upload(&request).await)?;
            session.publish(Event::FileUploaded {
                bucket: bucket.clone(),
                key: key.clone(),
            });
            println!("{}", format!("Uploaded {} to {}/{}", path.display(), bucket, key).green());
        }
        ObjectCommands::Remove { bucket, keys } => {
            let report = session.check(client.remove_objects(&bucket, &keys).await)?;
            for key in report.removed() {
                println!("  {} {}", "✓".green(), key);
            }
            for failure in report.failed() {
                if let Err(err) = &failure.result {
                    println!("  {} {}: {}", "✗".red(), failure.key, err);
                }
            }
            if !report.is_complete() {
                let failed = report.failed().count();
                session.publish(Event::ShowSnackbar(Notification::error(format!(
                    "{} of {} objects could not be removed",
                    failed,
                    report.outcomes.len()
                ))));
                bail!("{} object(s) could not be removed", failed);
            }
            session.publish(Event::ResourceDeleted(format!(
                "{} object(s) removed",
                report.outcomes.len()
            )));
        }
    }

    Ok(())
}

/// Where to save a download: inside `output` when it is a directory
fn target_path(output: &Path, file_name: &str) -> PathBuf {
    if output.is_dir() {
        output.join(file_name)
    } else {
        output.to_path_buf()
    }
}

fn default_key(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive an object key from {}", path.display()))
}

/// MIME type sent with an upload, from the file extension
fn content_type_for(path: &Path) -> mime::Mime {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "log" => mime::TEXT_PLAIN,
        "csv" => mime::TEXT_CSV,
        "html" | "htm" => mime::TEXT_HTML,
        "css" => mime::TEXT_CSS,
        "js" => mime::TEXT_JAVASCRIPT,
        "json" => mime::APPLICATION_JSON,
        "pdf" => mime::APPLICATION_PDF,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

fn print_object(object: &ObjectInfo) {
    let modified = object
        .last_modified
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    println!(
        "  {:>10}  {}  {}",
        object.size,
        modified.dimmed(),
        object.name
    );
}
