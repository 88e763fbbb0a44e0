use crate::error::{AppResult, DomainError, InfraError};
use crate::models::types::DefinitionId;
use bytes::Bytes;
use dashmap::DashMap;
use std::path::PathBuf;

/// Stores item images and hands back the path clients load them from.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(&self, definition_id: DefinitionId, content_type: Option<&str>, data: Bytes) -> AppResult<String>;
}

fn extension_for(content_type: Option<&str>) -> AppResult<&'static str> {
    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .unwrap_or_default();

    match mime.as_str() {
        "image/png" => Ok("png"),
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        _ => Err(DomainError::Validation {
            field: "image",
            message: format!("unsupported content type '{mime}'"),
        }),
    }
}

fn file_name(definition_id: DefinitionId, content_type: Option<&str>, data: &Bytes) -> AppResult<String> {
    if data.is_empty() {
        return Err(DomainError::InvalidValue("image"));
    }
    let ext = extension_for(content_type)?;
    Ok(format!("{definition_id}.{ext}"))
}

/// Writes images below a directory on the local filesystem.
pub struct LocalMediaStore {
    dir: PathBuf,
}

impl LocalMediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, definition_id: DefinitionId, content_type: Option<&str>, data: Bytes) -> AppResult<String> {
        let name = file_name(definition_id, content_type, &data)?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(InfraError::from)?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &data).await.map_err(InfraError::from)?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "stored item image");

        let public = self.dir.to_string_lossy().trim_start_matches("./").trim_matches('/').to_string();
        Ok(format!("/{public}/{name}"))
    }
}

/// Keeps images in memory. Used by tests and memory-backed runs.
#[derive(Default)]
pub struct MemoryMediaStore {
    blobs: DashMap<String, Bytes>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.blobs.get(path).map(|b| b.value().clone())
    }
}

#[async_trait::async_trait]
impl MediaStore for MemoryMediaStore {
    async fn store(&self, definition_id: DefinitionId, content_type: Option<&str>, data: Bytes) -> AppResult<String> {
        let name = file_name(definition_id, content_type, &data)?;
        let path = format!("/media/items/{name}");
        self.blobs.insert(path.clone(), data);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_keeps_blob() {
        let store = MemoryMediaStore::new();
        let id = DefinitionId::from_u128(42);
        let path = store
            .store(id, Some("image/png"), Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();

        assert_eq!(path, format!("/media/items/{id}.png"));
        assert_eq!(store.get(&path).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn rejects_unknown_content_and_empty_bodies() {
        let store = MemoryMediaStore::new();
        let id = DefinitionId::new();

        let err = store
            .store(id, Some("text/plain"), Bytes::from_static(b"hi"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation");

        let err = store.store(id, Some("image/png"), Bytes::new()).await.unwrap_err();
        assert_eq!(err.code(), "invalid_value");
    }
}
