//! Media command handlers.

use deckhand::{
    DeckhandConfig, DeckhandResult, DeleteMedia, SaveMedia, StorageError, StoredReference,
};
use std::path::Path;
use std::sync::Arc;

/// Stream a local file through the save use case and print its reference.
pub async fn save_file(
    config: &DeckhandConfig,
    path: &Path,
    name: Option<&str>,
) -> DeckhandResult<()> {
    let filename = match name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    };

    let storage = Arc::new(config.open_local_storage()?);
    let save = SaveMedia::new(storage);

    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| StorageError::io(format_args!("open {}", path.display()), &e))?;

    let reference = save.execute(&mut file, &filename).await?;
    println!("{}", reference);
    Ok(())
}

/// Delete a stored upload.
pub async fn delete_reference(config: &DeckhandConfig, reference: &str) -> DeckhandResult<()> {
    let storage = Arc::new(config.open_local_storage()?);
    let delete = DeleteMedia::new(storage);

    delete.execute(&StoredReference::new(reference)).await?;
    println!("deleted {}", reference);
    Ok(())
}
