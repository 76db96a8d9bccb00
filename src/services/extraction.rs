use crate::{
    db::{validate_username, JsonStore},
    error::{AppError, AppResult},
    models::{DatasetSummary, ExtractionSummary},
};

use super::github::RepositorySource;

/// Fetches a user's repositories from `source` and persists them as the
/// user's data file
pub async fn extract_user(
    source: &dyn RepositorySource,
    store: &JsonStore,
    username: &str,
) -> AppResult<ExtractionSummary> {
    validate_username(username)?;

    tracing::info!(username = %username, source = source.name(), "Extracting user repositories");

    let listing = source.user_repositories(username).await?;
    store.save_user(username, &listing.records).await?;

    tracing::info!(
        username = %username,
        repositories = listing.records.len(),
        skipped = listing.skipped.len(),
        "User data saved"
    );

    Ok(ExtractionSummary {
        username: username.to_string(),
        repositories: listing.records.len(),
        skipped: listing.skipped.len(),
    })
}

/// Builds the candidate dataset from up to `limit` search results and
/// replaces the stored one
pub async fn extract_repositories(
    source: &dyn RepositorySource,
    store: &JsonStore,
    limit: usize,
) -> AppResult<DatasetSummary> {
    if limit == 0 {
        return Err(AppError::InvalidInput("limit must be greater than 0".to_string()));
    }

    tracing::info!(limit, source = source.name(), "Extracting candidate repositories");

    let listing = source.candidate_repositories(limit).await?;
    store.save_repositories(&listing.records).await?;

    tracing::info!(
        repositories = listing.records.len(),
        skipped = listing.skipped.len(),
        "Repository dataset saved"
    );

    Ok(DatasetSummary {
        limit,
        repositories: listing.records.len(),
        skipped: listing.skipped.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryRecord;
    use crate::services::github::{MockRepositorySource, SourceListing};

    fn temp_store() -> (JsonStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("repo-recommender-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        (JsonStore::new(&dir), dir)
    }

    #[test]
    fn test_extract_saves_records() {
        let (store, dir) = temp_store();
        let mut source = MockRepositorySource::new();
        source.expect_name().return_const("mock");
        source
            .expect_user_repositories()
            .withf(|username| username == "alice")
            .times(1)
            .returning(|_| {
                Ok(SourceListing {
                    records: vec![RepositoryRecord::new("alice", "dotfiles").with_language("Shell", 10)],
                    skipped: vec!["alice/gpl-thing".to_string()],
                })
            });

        let summary = tokio_test::block_on(extract_user(&source, &store, "alice")).unwrap();
        assert_eq!(summary.repositories, 1);
        assert_eq!(summary.skipped, 1);

        let saved = tokio_test::block_on(store.load_user("alice")).unwrap();
        assert_eq!(saved[0].full_name(), "alice/dotfiles");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_source_errors_propagate() {
        let (store, dir) = temp_store();
        let mut source = MockRepositorySource::new();
        source.expect_name().return_const("mock");
        source
            .expect_user_repositories()
            .returning(|name| Err(AppError::NotFound(name.to_string())));

        let result = tokio_test::block_on(extract_user(&source, &store, "nobody"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(matches!(
            tokio_test::block_on(store.load_user("nobody")),
            Err(AppError::NotFound(_))
        ));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_invalid_username_never_reaches_source() {
        let (store, dir) = temp_store();
        let mut source = MockRepositorySource::new();
        source.expect_user_repositories().never();

        let result = tokio_test::block_on(extract_user(&source, &store, "../etc"));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_user_without_repositories_gets_empty_file() {
        let (store, dir) = temp_store();
        let mut source = MockRepositorySource::new();
        source.expect_name().return_const("mock");
        source
            .expect_user_repositories()
            .returning(|_| Ok(SourceListing::default()));

        let summary = tokio_test::block_on(extract_user(&source, &store, "newcomer")).unwrap();
        assert_eq!(summary.repositories, 0);
        assert!(tokio_test::block_on(store.load_user("newcomer")).unwrap().is_empty());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_extract_repositories_saves_dataset() {
        let (store, dir) = temp_store();
        let mut source = MockRepositorySource::new();
        source.expect_name().return_const("mock");
        source
            .expect_candidate_repositories()
            .withf(|limit| *limit == 3)
            .times(1)
            .returning(|_| {
                Ok(SourceListing {
                    records: vec![
                        RepositoryRecord::new("octo", "parser").with_topic("cli"),
                        RepositoryRecord::new("octo", "lexer"),
                    ],
                    skipped: vec!["octo/gpl-tool".to_string()],
                })
            });

        let summary = tokio_test::block_on(extract_repositories(&source, &store, 3)).unwrap();
        assert_eq!(
            summary,
            DatasetSummary {
                limit: 3,
                repositories: 2,
                skipped: 1,
            }
        );

        let dataset = tokio_test::block_on(store.load_repositories()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset[0].full_name(), "octo/parser");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_zero_limit_rejected() {
        let (store, dir) = temp_store();
        let mut source = MockRepositorySource::new();
        source.expect_candidate_repositories().never();

        let result = tokio_test::block_on(extract_repositories(&source, &store, 0));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(matches!(
            tokio_test::block_on(store.load_repositories()),
            Err(AppError::NotFound(_))
        ));

        std::fs::remove_dir_all(dir).ok();
    }
}
