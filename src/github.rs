use anyhow::{Context, Result};
use futures::stream::{self, Stream, TryStreamExt};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{CloneMethod, Config};
use crate::error::ListingError;

/// One repository owned by the listed account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub name: String,
    /// Locator handed to `git clone --mirror`
    pub clone_url: String,
    pub is_fork: bool,
}

/// Repository entry as returned by `GET /users/{account}/repos`
#[derive(Debug, Deserialize)]
struct RepoEntry {
    name: String,
    git_url: String,
    #[serde(default)]
    clone_url: Option<String>,
    #[serde(default)]
    ssh_url: Option<String>,
    #[serde(default)]
    fork: bool,
}

/// Unauthenticated client for the repository listing endpoint
pub struct GitHubClient {
    client: reqwest::Client,
    config: Config,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .user_agent(config.github.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch a single page of the account's repositories.
    ///
    /// A 404 means the account does not exist; every other non-success
    /// status is reported with its code.
    pub async fn fetch_page(
        &self,
        account: &str,
        page: u32,
    ) -> Result<Vec<RepositoryDescriptor>, ListingError> {
        debug!("Fetching repositories page {} for {}", page, account);

        let mut request = self
            .client
            .get(self.config.repos_endpoint(account))
            .query(&[("page", page)]);
        if let Some(per_page) = self.config.github.per_page {
            request = request.query(&[("per_page", per_page)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ListingError::AccountNotFound {
                account: account.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ListingError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let entries: Vec<RepoEntry> = serde_json::from_slice(&body)
            .map_err(|source| ListingError::Decode { page, source })?;

        Ok(entries.into_iter().map(|entry| self.describe(entry)).collect())
    }

    /// Lazily page through the account's repositories.
    ///
    /// Starts at page 1 on every call. The stream ends after the first
    /// empty page, or right after yielding the first error.
    pub fn pages<'a>(
        &'a self,
        account: &'a str,
    ) -> impl Stream<Item = Result<Vec<RepositoryDescriptor>, ListingError>> + 'a {
        stream::try_unfold(1u32, move |page| async move {
            let repositories = self.fetch_page(account, page).await?;
            if repositories.is_empty() {
                debug!("Page {} is empty, listing complete", page);
                return Ok::<_, ListingError>(None);
            }
            Ok(Some((repositories, page + 1)))
        })
    }

    /// List every repository of the account, in the order the API returns them
    pub async fn list_repositories(
        &self,
        account: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ListingError> {
        info!("Fetching repository list for {}", account);

        let repositories: Vec<RepositoryDescriptor> = self.pages(account).try_concat().await?;

        info!("Found {} repositories for {}", repositories.len(), account);
        Ok(repositories)
    }

    fn describe(&self, entry: RepoEntry) -> RepositoryDescriptor {
        let preferred = match self.config.github.clone_method {
            CloneMethod::Git => None,
            CloneMethod::Https => entry.clone_url,
            CloneMethod::Ssh => entry.ssh_url,
        };

        let clone_url = match preferred {
            Some(url) => url,
            None => {
                if self.config.github.clone_method != CloneMethod::Git {
                    warn!(
                        "No {:?} URL for {}, falling back to git_url",
                        self.config.github.clone_method, entry.name
                    );
                }
                entry.git_url
            }
        };

        RepositoryDescriptor {
            name: entry.name,
            clone_url,
            is_fork: entry.fork,
        }
    }
}
