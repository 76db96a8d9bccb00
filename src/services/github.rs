use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use reqwest::{header::HeaderMap, Client as HttpClient, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::{AppError, AppResult},
    models::{License, Readme, RepositoryRecord},
};

/// License keys a repository must carry to be recommended
pub const ACCEPTED_LICENSES: [&str; 3] = ["mit", "bsd-2-clause", "bsd-3-clause"];

/// Repository search matching the accepted licenses
pub const CANDIDATE_QUERY: &str = "license:bsd-3-clause+license:bsd-2-clause+license:mit";

/// Source of already-shaped repository records
///
/// Implementations gather the repositories a user owns, watches and stars,
/// and the open source candidates recommendations are drawn from.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositorySource: Send + Sync {
    async fn user_repositories(&self, username: &str) -> AppResult<SourceListing>;

    /// Processes up to `limit` repositories from the license search
    async fn candidate_repositories(&self, limit: usize) -> AppResult<SourceListing>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Records a source produced, plus the ones it rejected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceListing {
    pub records: Vec<RepositoryRecord>,
    pub skipped: Vec<String>,
}

/// Whether a detected license allows recommending the repository.
/// Repositories without a detected license are kept.
pub fn license_accepted(license: Option<&License>) -> bool {
    match license.and_then(|l| l.key.as_deref()) {
        Some(key) => ACCEPTED_LICENSES.contains(&key),
        None => true,
    }
}

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    owner: ApiOwner,
    #[serde(default)]
    fork: bool,
}

#[derive(Debug, Deserialize)]
struct ApiSearchPage {
    #[serde(default)]
    items: Vec<ApiRepository>,
}

#[derive(Debug, Deserialize)]
struct ApiLicenseResponse {
    #[serde(default)]
    license: Option<License>,
}

#[derive(Debug, Deserialize)]
struct ApiTopics {
    #[serde(default)]
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiContributor {
    login: String,
}

/// GitHub REST API client
#[derive(Clone)]
pub struct GithubSource {
    http_client: HttpClient,
    api_url: String,
    token: Option<String>,
}

impl GithubSource {
    pub fn new(api_url: &str, token: Option<String>) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("repo-recommender/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// GETs an absolute URL. A 404 means the resource is absent.
    async fn send(&self, url: &str) -> AppResult<Option<Response>> {
        let mut request = self
            .http_client
            .get(url)
            .header("Accept", "application/vnd.github.mercy-preview+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(url = %url, "Resource not found");
                Ok(None)
            }
            status if status.is_success() => Ok(Some(response)),
            status => {
                tracing::error!(url = %url, status = %status, "GitHub API request failed");
                Err(AppError::ExternalApi(format!(
                    "GitHub API returned {} for {}",
                    status, url
                )))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<Option<T>> {
        let url = format!("{}{}", self.api_url, path);
        match self.send(&url).await? {
            Some(response) => Ok(Some(response.json::<T>().await?)),
            None => Ok(None),
        }
    }

    async fn languages(&self, owner: &str, repo: &str) -> AppResult<BTreeMap<String, u64>> {
        Ok(self
            .get_json(&format!("/repos/{}/{}/languages", owner, repo))
            .await?
            .unwrap_or_default())
    }

    async fn topics(&self, owner: &str, repo: &str) -> AppResult<Vec<String>> {
        let topics: Option<ApiTopics> = self
            .get_json(&format!("/repos/{}/{}/topics", owner, repo))
            .await?;
        Ok(topics.map(|t| t.names).unwrap_or_default())
    }

    async fn license(&self, owner: &str, repo: &str) -> AppResult<Option<License>> {
        let response: Option<ApiLicenseResponse> = self
            .get_json(&format!("/repos/{}/{}/license", owner, repo))
            .await?;
        Ok(response.and_then(|r| r.license))
    }

    async fn readme(&self, owner: &str, repo: &str) -> AppResult<Option<Readme>> {
        self.get_json(&format!("/repos/{}/{}/readme", owner, repo))
            .await
    }

    async fn is_contributor(&self, user: &str, owner: &str, repo: &str) -> AppResult<bool> {
        let contributors: Option<Vec<ApiContributor>> = self
            .get_json(&format!("/repos/{}/{}/contributors", owner, repo))
            .await?;
        Ok(contributors
            .unwrap_or_default()
            .iter()
            .any(|c| c.login == user))
    }

    /// Builds the record of one listed repository, or `None` when its license
    /// is not accepted. Contributor status is only looked up for a user.
    async fn process_repository(
        &self,
        repository: &ApiRepository,
        user: Option<&str>,
    ) -> AppResult<Option<RepositoryRecord>> {
        let (owner, repo) = (repository.owner.login.as_str(), repository.name.as_str());

        let license = self.license(owner, repo).await?;
        if !license_accepted(license.as_ref()) {
            tracing::debug!(owner = %owner, repo = %repo, "Skipping repository with unaccepted license");
            return Ok(None);
        }

        let mut record = RepositoryRecord::new(owner, repo);
        record.fork = repository.fork;
        record.license = license;
        record.readme = self.readme(owner, repo).await?;
        record.topics = self.topics(owner, repo).await?;
        record.languages = self.languages(owner, repo).await?;
        record.contributor = match user {
            Some(user) => Some(self.is_contributor(user, owner, repo).await?),
            None => None,
        };
        record.fetched_at = Some(Utc::now());

        Ok(Some(record))
    }
}

/// Target of the `rel="next"` entry of a `Link` header
fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| p.trim().replace(' ', "") == "rel=\"next\"");
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

/// Drops repeated `owner/repo` entries, keeping the first occurrence
fn unique_repositories(listed: Vec<ApiRepository>) -> Vec<(String, ApiRepository)> {
    let mut seen = HashSet::new();
    listed
        .into_iter()
        .map(|r| (format!("{}/{}", r.owner.login, r.name), r))
        .filter(|(full_name, _)| seen.insert(full_name.clone()))
        .collect()
}

#[async_trait::async_trait]
impl RepositorySource for GithubSource {
    async fn user_repositories(&self, username: &str) -> AppResult<SourceListing> {
        let own: Vec<ApiRepository> = self
            .get_json(&format!("/users/{}/repos", username))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("GitHub user {} not found", username)))?;

        let mut listed = own;
        for relation in ["subscriptions", "starred"] {
            let page: Option<Vec<ApiRepository>> = self
                .get_json(&format!("/users/{}/{}", username, relation))
                .await?;
            listed.extend(page.unwrap_or_default());
        }

        let unique = unique_repositories(listed);
        let mut listing = SourceListing::default();

        for (idx, (full_name, repository)) in unique.iter().enumerate() {
            tracing::debug!(
                index = idx + 1,
                total = unique.len(),
                repository = %full_name,
                "Processing repository"
            );

            match self.process_repository(repository, Some(username)).await? {
                Some(record) => listing.records.push(record),
                None => listing.skipped.push(full_name.clone()),
            }
        }

        Ok(listing)
    }

    async fn candidate_repositories(&self, limit: usize) -> AppResult<SourceListing> {
        let mut listing = SourceListing::default();
        let mut processed = 0;
        let mut next = Some(format!(
            "{}/search/repositories?q={}",
            self.api_url, CANDIDATE_QUERY
        ));

        while let Some(url) = next.take() {
            if processed >= limit {
                break;
            }
            let Some(response) = self.send(&url).await? else {
                break;
            };
            next = next_link(response.headers());
            let page: ApiSearchPage = response.json().await?;

            for repository in page.items.iter().take(limit - processed) {
                processed += 1;
                let full_name = format!("{}/{}", repository.owner.login, repository.name);
                match self.process_repository(repository, None).await? {
                    Some(record) => listing.records.push(record),
                    None => listing.skipped.push(full_name),
                }
                if processed % 10 == 0 {
                    tracing::info!(processed, limit, "Candidate extraction progress");
                }
            }
        }

        Ok(listing)
    }

    fn name(&self) -> &'static str {
        "github"
    }
}
