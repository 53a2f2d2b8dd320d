//! Load documents from a folder

use super::document::Document;
use crate::error::{RagError, RagResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read every regular file in `folder` whose extension is `extension`
///
/// Documents come back in file-name order with `source` set to the path.
/// `extension` may be given with or without the leading dot.
pub async fn load_documents_from_folder(
    folder: impl AsRef<Path>,
    extension: &str,
) -> RagResult<Vec<Document>> {
    let folder = folder.as_ref();
    let extension = extension.trim_start_matches('.');

    let mut entries = tokio::fs::read_dir(folder)
        .await
        .map_err(|e| RagError::storage("read_dir", e))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| RagError::storage("read_dir", e))?
    {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);

        if is_file && path.extension().is_some_and(|ext| ext == extension) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RagError::storage("read_file", e))?;
        debug!(path = %path.display(), bytes = content.len(), "Loaded document");
        documents.push(Document::new(content).with_source(path.display().to_string()));
    }

    info!(folder = %folder.display(), count = documents.len(), "Loaded documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_matching_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "second").unwrap();
        std::fs::write(dir.path().join("a.md"), "first").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested.md")).unwrap();

        let docs = load_documents_from_folder(dir.path(), ".md").await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "first");
        assert!(docs[0].source().unwrap().ends_with("a.md"));
        assert_eq!(docs[1].content, "second");
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let err = load_documents_from_folder("/definitely/not/here", "md")
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Storage { .. }));
    }
}
