//! Local storage for uploaded contract documents.
//!
//! Files live under `<root>/<user_id>/<uuid>-<sanitised name>`. The path
//! stored on the contract is relative to the root.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use dealping_core::types::DbId;
use regex::Regex;

static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

/// Longest sanitised file name kept in a stored path.
const MAX_FILE_NAME_LEN: usize = 100;

/// Root-relative file storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` for `user_id` and return the root-relative path.
    pub async fn save(
        &self,
        user_id: DbId,
        file_name: &str,
        bytes: &[u8],
    ) -> std::io::Result<String> {
        let dir = self.root.join(user_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let stored_name = format!("{}-{}", uuid::Uuid::new_v4(), sanitize_file_name(file_name));
        tokio::fs::write(dir.join(&stored_name), bytes).await?;

        Ok(format!("{user_id}/{stored_name}"))
    }

    /// Delete a stored file. Failures are logged, never returned.
    pub async fn remove(&self, relative_path: &str) {
        if relative_path.split('/').any(|part| part == "..") {
            tracing::warn!(path = relative_path, "Refusing to delete path outside storage");
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative_path)).await {
            tracing::warn!(path = relative_path, error = %e, "Failed to delete stored file");
        }
    }
}

/// Reduce an uploaded file name to a safe single path component.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned = UNSAFE_CHARS_RE.replace_all(base, "_");
    let trimmed = cleaned.trim_start_matches('.');
    let truncated: String = trimmed.chars().take(MAX_FILE_NAME_LEN).collect();
    if truncated.is_empty() {
        "document".to_string()
    } else {
        truncated
    }
}
