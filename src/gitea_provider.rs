//! Repository listing against the Gitea REST API.
//!
//! Works with any Gitea-compatible forge (Gitea, Forgejo, Codeberg).

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;

use crate::config::{MirrorOptions, SourceConfig};
use crate::error::ListingError;
use crate::provider::RepositoryLister;
use crate::repository::RepositoryDescriptor;

const USER_AGENT: &str = "gitea-mirror";

/// Gitea does not expose a page count up front; stop here regardless.
const MAX_PAGES: u32 = 1000;

/// Longest error body kept in [`ListingError::Status`].
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone)]
pub struct GiteaProvider {
    client: Client,
    base_url: String,
    token: String,
    follow_pagination: bool,
    page_size: u32,
}

struct Page {
    repos: Vec<RepositoryDescriptor>,
    /// `X-Total-Count`, when the forge sends it.
    total: Option<usize>,
}

impl GiteaProvider {
    pub fn new(source: &SourceConfig, options: &MirrorOptions) -> Result<Self, ListingError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: source.base_url.trim_end_matches('/').to_string(),
            token: source.token.clone(),
            follow_pagination: options.follow_pagination,
            page_size: options.page_size,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_page(&self, url: &str, page: Option<u32>) -> Result<Page, ListingError> {
        let mut request = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/json");
        if let Some(page) = page {
            request = request.query(&[("page", page), ("limit", self.page_size)]);
        }

        let response = request.send().await?;
        let status = response.status();
        let total = response
            .headers()
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<usize>().ok());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ListingError::Status {
                status: status.as_u16(),
                message: body.trim().chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body = response.bytes().await?;
        let repos = serde_json::from_slice(&body)?;

        Ok(Page { repos, total })
    }

    async fn list_all_pages(&self, url: &str) -> Result<Vec<RepositoryDescriptor>, ListingError> {
        let mut all_repos = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1u32;

        loop {
            let Page { repos, total } = self.get_page(url, Some(page)).await?;
            let count = repos.len();
            let before = all_repos.len();
            for repo in repos {
                if seen.insert(repo.clone()) {
                    all_repos.push(repo);
                }
            }
            let added = all_repos.len() - before;

            tracing::debug!(page, count, added, total_so_far = all_repos.len(), "fetched page");

            if count == 0 {
                break;
            }
            // Forges that ignore `page` answer every request with the first page.
            if added == 0 {
                tracing::warn!(
                    page,
                    fetched = all_repos.len(),
                    "page contained no new repositories, stopping pagination"
                );
                break;
            }
            // A server-side cap on `limit` makes every page look short.
            let exhausted = match total {
                Some(total) => all_repos.len() >= total,
                None => count < self.page_size as usize,
            };
            if exhausted {
                break;
            }
            if page >= MAX_PAGES {
                tracing::warn!(
                    max_pages = MAX_PAGES,
                    fetched = all_repos.len(),
                    "reached maximum page limit, listing may be incomplete"
                );
                break;
            }

            page += 1;
        }

        Ok(all_repos)
    }
}

#[async_trait]
impl RepositoryLister for GiteaProvider {
    async fn list_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ListingError> {
        let url = self.listing_url(username);

        if self.follow_pagination {
            return self.list_all_pages(&url).await;
        }

        let Page { repos, total } = self.get_page(&url, None).await?;
        if let Some(total) = total {
            if total > repos.len() {
                tracing::warn!(
                    returned = repos.len(),
                    total,
                    "pagination disabled, only the first page of repositories is mirrored"
                );
            }
        }
        Ok(repos)
    }

    fn listing_url(&self, username: &str) -> String {
        format!(
            "{base_url}/api/v1/users/{username}/repos",
            base_url = self.base_url,
            username = username
        )
    }
}
