//! GitHub REST API access used to enrich notifications with commit details

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::block::Field;
use crate::context::EventContext;
use crate::error::{NotifyError, Result};
use crate::utils::{first_line, slack_link};

const USER_AGENT: &str = "slack-ci-notify";

/// Commit details needed for the notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub message: String,
    pub html_url: String,
    /// Platform account of the author; `None` when the commit email is not
    /// linked to any account.
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitAuthor {
    pub login: String,
    pub html_url: String,
}

/// Source of commit metadata
#[async_trait]
pub trait CommitSource: Send + Sync {
    async fn get_commit(&self, owner: &str, repo: &str, reference: &str) -> Result<CommitInfo>;
}

/// Subset of `GET /repos/{owner}/{repo}/commits/{ref}`
#[derive(Debug, Deserialize)]
struct CommitResponse {
    html_url: String,
    commit: GitCommit,
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    message: String,
}

/// GitHub REST API client authenticated with a token
pub struct GitHubClient {
    api_url: String,
    token: String,
    client: Client,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: Client::new(),
        }
    }

    /// `<api>/repos/<owner>/<repo>/commits/<ref>` with every segment
    /// percent-encoded, so refs like `fix#12` reach the API intact.
    fn commit_url(&self, owner: &str, repo: &str, reference: &str) -> Result<Url> {
        let invalid = || NotifyError::Config(format!("invalid GitHub API URL '{}'", self.api_url));
        let mut url = Url::parse(&self.api_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["repos", owner, repo, "commits", reference]);
        Ok(url)
    }
}

#[async_trait]
impl CommitSource for GitHubClient {
    async fn get_commit(&self, owner: &str, repo: &str, reference: &str) -> Result<CommitInfo> {
        let url = self.commit_url(owner, repo, reference)?;
        debug!("Fetching commit from {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("GitHub commit lookup failed: {} {}", status, message);
            return Err(NotifyError::GitHubApi {
                status: status.as_u16(),
                message,
            });
        }

        let commit: CommitResponse = response.json().await?;
        Ok(CommitInfo {
            message: commit.commit.message,
            html_url: commit.html_url,
            author: commit.author,
        })
    }
}

/// Fetch the commit relevant to this run and render it as `commit` and,
/// when the author is resolvable, `author` fields.
pub async fn commit_fields(source: &dyn CommitSource, ctx: &EventContext) -> Result<Vec<Field>> {
    let reference = ctx.commit_ref();
    let commit = source.get_commit(&ctx.owner, &ctx.repo, reference).await?;
    info!("Fetched commit {} for {}/{}", reference, ctx.owner, ctx.repo);

    let mut fields = vec![Field::new(
        "commit",
        slack_link(&commit.html_url, first_line(&commit.message)),
    )];
    match &commit.author {
        Some(author) => fields.push(Field::new(
            "author",
            slack_link(&author.html_url, &author.login),
        )),
        None => debug!("Commit {} has no linked author, omitting author field", reference),
    }
    Ok(fields)
}
