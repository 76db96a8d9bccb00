use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::RepositoryRecord,
};

/// File name of the candidate repository dataset
pub const REPOSITORY_FILE: &str = "data.json";

/// Usernames become file names, so only a conservative character set passes
pub fn validate_username(username: &str) -> AppResult<()> {
    let valid = !username.is_empty()
        && username.len() <= 100
        && username != "data"
        && !username.starts_with('.')
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("Invalid username: {:?}", username)))
    }
}

/// File-backed store of extracted repository data.
///
/// `data.json` holds the candidate repositories and `<username>.json` the
/// repositories each user owns, watches or stars. Both are JSON arrays of
/// repository records.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn user_path(&self, username: &str) -> AppResult<PathBuf> {
        validate_username(username)?;
        Ok(self.root.join(format!("{}.json", username)))
    }

    /// Loads one user's repositories; a missing file is `NotFound`
    pub async fn load_user(&self, username: &str) -> AppResult<Vec<RepositoryRecord>> {
        let path = self.user_path(username)?;
        let records = read_records(&path)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No data for user {}", username)))?;

        tracing::debug!(username = %username, repositories = records.len(), "Loaded user data");
        Ok(records)
    }

    /// Loads the candidate repository dataset
    pub async fn load_repositories(&self) -> AppResult<Vec<RepositoryRecord>> {
        let path = self.root.join(REPOSITORY_FILE);
        let records = read_records(&path).await?.ok_or_else(|| {
            AppError::NotFound(format!("Repository dataset {} not found", path.display()))
        })?;

        tracing::info!(path = %path.display(), repositories = records.len(), "Loaded repository dataset");
        Ok(records)
    }

    pub async fn save_user(&self, username: &str, records: &[RepositoryRecord]) -> AppResult<PathBuf> {
        let path = self.user_path(username)?;
        write_records(&self.root, &path, records).await?;

        tracing::debug!(path = %path.display(), repositories = records.len(), "Saved user data");
        Ok(path)
    }

    /// Replaces the candidate repository dataset
    pub async fn save_repositories(&self, records: &[RepositoryRecord]) -> AppResult<PathBuf> {
        let path = self.root.join(REPOSITORY_FILE);
        write_records(&self.root, &path, records).await?;

        tracing::info!(path = %path.display(), repositories = records.len(), "Saved repository dataset");
        Ok(path)
    }
}

async fn write_records(root: &Path, path: &Path, records: &[RepositoryRecord]) -> AppResult<()> {
    let json = serde_json::to_vec_pretty(records)
        .map_err(|e| AppError::Internal(format!("Serialization error: {}", e)))?;

    tokio::fs::create_dir_all(root).await?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Reads a record array, dropping entries the extractor marked invalid.
/// Returns `None` when the file does not exist.
async fn read_records(path: &Path) -> AppResult<Option<Vec<RepositoryRecord>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    parse_records(&bytes, path).map(Some)
}

fn parse_records(bytes: &[u8], path: &Path) -> AppResult<Vec<RepositoryRecord>> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| {
        AppError::InvalidInput(format!("{} is not valid JSON: {}", path.display(), e))
    })?;

    if !value.is_array() {
        return Err(AppError::InvalidInput(format!(
            "{} must contain an array of repository records",
            path.display()
        )));
    }

    let records: Vec<RepositoryRecord> = serde_json::from_value(value).map_err(|e| {
        AppError::InvalidInput(format!("Malformed repository record in {}: {}", path.display(), e))
    })?;

    let total = records.len();
    let records: Vec<RepositoryRecord> = records.into_iter().filter(|r| r.valid).collect();
    if records.len() < total {
        tracing::debug!(
            path = %path.display(),
            dropped = total - records.len(),
            "Dropped records marked invalid"
        );
    }

    Ok(records)
}
