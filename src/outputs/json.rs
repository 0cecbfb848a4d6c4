//! JSON snapshot of the latest article.
//!
//! The query side reads a single file:
//! ```text
//! output_dir/
//! └── latest_article.json
//! ```
//! It is written to a temporary sibling first and renamed into place, so a
//! reader never sees a half-written snapshot.

use crate::models::ArticleRecord;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

pub const SNAPSHOT_FILE: &str = "latest_article.json";

pub fn snapshot_path(output_dir: &str) -> PathBuf {
    Path::new(output_dir).join(SNAPSHOT_FILE)
}

/// Write `record` as `{output_dir}/latest_article.json`.
#[instrument(level = "info", skip_all, fields(%output_dir))]
pub async fn write_latest(record: &ArticleRecord, output_dir: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(record)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(%output_dir, error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = snapshot_path(output_dir);
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).await?;
    fs::rename(&tmp, &path).await?;
    info!(
        path = %path.display(),
        source_url = %record.source_url(),
        generated_at = %record.generated_at(),
        content_bytes = record.content_html().len(),
        "Wrote latest article snapshot"
    );

    Ok(())
}

/// Read the snapshot back. A missing or unreadable file is `None`.
#[instrument(level = "info")]
pub async fn read_latest(output_dir: &str) -> Option<ArticleRecord> {
    let path = snapshot_path(output_dir);
    let raw = fs::read_to_string(&path).await.ok()?;
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable snapshot");
            None
        }
    }
}
