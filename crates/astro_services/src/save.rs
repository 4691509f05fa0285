//! Save files
//!
//! A save is one [`DataNode`] written to disk as pretty-printed JSON.

use astro_core::{DataNode, DocumentError};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

pub fn write_save(path: impl AsRef<Path>, doc: &DataNode) -> Result<(), SaveError> {
    let path = path.as_ref();
    let text = doc.to_json()?;
    std::fs::write(path, text)?;
    tracing::info!(path = %path.display(), "game saved");
    Ok(())
}

pub fn read_save(path: impl AsRef<Path>) -> Result<DataNode, SaveError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let doc = DataNode::from_json(&text)?;
    tracing::info!(path = %path.display(), "game loaded");
    Ok(doc)
}
