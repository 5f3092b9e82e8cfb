//! Document I/O

use crate::types::*;
use lopdf::Document;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Load a template PDF
pub async fn load_template(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Save a finished deck.
///
/// Refuses to overwrite: fails with `DestinationExists` if `path` is
/// already present, and leaves it untouched.
pub async fn save_deck(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    if tokio::fs::try_exists(&path).await? {
        return Err(SlideFitError::DestinationExists(path));
    }

    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, SlideFitError>(writer)
    })
    .await??;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => SlideFitError::DestinationExists(path.clone()),
            _ => SlideFitError::Io(e),
        })?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    Ok(())
}
