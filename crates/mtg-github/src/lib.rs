//! GitHub REST API integration for meeting agendas.
//!
//! Provides the issue-tracker side of the agenda workflow:
//! - Listing open issues and pull requests carrying the agenda label
//! - Searching the whole organization for labeled items
//! - Filing the agenda issue

use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, LINK};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mtg_core::AgendaItem;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Public GitHub API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const CLIENT_USER_AGENT: &str = concat!("mtg/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: &str = "100";

/// GitHub client errors.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The provided token was invalid.
    #[error("invalid token: {reason}")]
    InvalidToken { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// GitHub REST client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the API rooted at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(token: impl Into<String>, api_url: &str) -> Result<Self, GithubError> {
        let token = token.into();

        if token.is_empty() {
            return Err(GithubError::InvalidToken {
                reason: "token cannot be empty",
            });
        }
        if token.trim().is_empty() {
            return Err(GithubError::InvalidToken {
                reason: "token cannot be whitespace-only",
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(CLIENT_USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(GithubError::ClientBuild)?;

        Ok(Self {
            http,
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Open issues and pull requests in one repository carrying `label`.
    pub async fn list_labeled_issues(
        &self,
        owner: &str,
        repo: &str,
        label: &str,
    ) -> Result<Vec<AgendaItem>, GithubError> {
        let url = format!("{}/repos/{owner}/{repo}/issues", self.api_url);
        let first = self.http.get(url).query(&[
            ("state", "open"),
            ("labels", label),
            ("per_page", PER_PAGE),
        ]);
        self.paginate(first, |items: Vec<AgendaItem>| items).await
    }

    /// Open issues and pull requests across an owner's repositories carrying `label`.
    pub async fn search_open_labeled(
        &self,
        owner: &str,
        label: &str,
    ) -> Result<Vec<AgendaItem>, GithubError> {
        let url = format!("{}/search/issues", self.api_url);
        let query = format!("owner:{owner} is:open label:\"{label}\"");
        let first = self
            .http
            .get(url)
            .query(&[("q", query.as_str()), ("per_page", PER_PAGE)]);
        self.paginate(first, |page: SearchPage| page.items).await
    }

    /// Agenda items for a repository, or for the whole owner when `org_wide`.
    pub async fn fetch_agenda_items(
        &self,
        owner: &str,
        repo: &str,
        label: &str,
        org_wide: bool,
    ) -> Result<Vec<AgendaItem>, GithubError> {
        if org_wide {
            self.search_open_labeled(owner, label).await
        } else {
            self.list_labeled_issues(owner, repo, label).await
        }
    }

    /// Files a new issue.
    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<CreatedIssue, GithubError> {
        let url = format!("{}/repos/{owner}/{repo}/issues", self.api_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&NewIssue { title, body })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|err| GithubError::InvalidResponse(err.to_string()))
    }

    /// Follows `Link: rel="next"` until the last page.
    async fn paginate<P, F>(
        &self,
        first: reqwest::RequestBuilder,
        items_of: F,
    ) -> Result<Vec<AgendaItem>, GithubError>
    where
        P: DeserializeOwned,
        F: Fn(P) -> Vec<AgendaItem>,
    {
        let mut items = Vec::new();
        let mut request = Some(first);
        let mut page = 0_usize;

        while let Some(builder) = request.take() {
            page += 1;
            let response = builder.bearer_auth(&self.token).send().await?;
            let status = response.status();
            let next = next_page_url(response.headers());
            let body = response.text().await?;
            if !status.is_success() {
                return Err(api_error(status, &body));
            }

            let payload: P = serde_json::from_str(&body)
                .map_err(|err| GithubError::InvalidResponse(err.to_string()))?;
            let batch = items_of(payload);
            tracing::debug!(page, count = batch.len(), "fetched agenda page");
            items.extend(batch);

            request = next.map(|url| self.http.get(url));
        }

        Ok(items)
    }
}

/// An issue created by [`Client::create_issue`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}

#[derive(Debug, Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    items: Vec<AgendaItem>,
}

fn api_error(status: reqwest::StatusCode, body: &str) -> GithubError {
    #[derive(Deserialize)]
    struct ErrorPayload {
        message: String,
    }

    let message = serde_json::from_str::<ErrorPayload>(body)
        .map_or_else(|_| body.to_string(), |payload| payload.message);
    GithubError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Extracts the `rel="next"` target from a `Link` header.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        params
            .split(';')
            .any(|param| param.trim() == "rel=\"next\"")
            .then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
    })
}
