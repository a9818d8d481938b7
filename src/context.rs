//! Event context of the CI run that triggered the notification

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{NotifyError, Result};

const DEFAULT_SERVER_URL: &str = "https://github.com";
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Read-only snapshot of the triggering event.
/// Built once per invocation and passed explicitly to everything that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub sha: String,
    pub event_name: String,
    pub workflow: String,
    pub git_ref: String,
    pub actor: String,
    pub owner: String,
    pub repo: String,
    pub pr_number: Option<u64>,
    pub head_ref: Option<String>,
    pub server_url: String,
    pub api_url: String,
}

impl EventContext {
    /// Build the context from the GitHub Actions environment of this process
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the context from an arbitrary variable lookup.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require =
            |name: &str| get(name).ok_or_else(|| NotifyError::MissingContext(name.into()));

        let repository = require("GITHUB_REPOSITORY")?;
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty())
            .ok_or_else(|| {
                NotifyError::Config(format!(
                    "GITHUB_REPOSITORY must look like 'owner/repo', got '{}'",
                    repository
                ))
            })?;

        let pr_number =
            get("GITHUB_EVENT_PATH").and_then(|path| read_event_number(Path::new(&path)));

        let server_url =
            get("GITHUB_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let api_url = get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            sha: require("GITHUB_SHA")?,
            event_name: require("GITHUB_EVENT_NAME")?,
            workflow: require("GITHUB_WORKFLOW")?,
            git_ref: get("GITHUB_REF").unwrap_or_default(),
            actor: require("GITHUB_ACTOR")?,
            owner: owner.to_string(),
            repo: repo.to_string(),
            pr_number,
            head_ref: get("GITHUB_HEAD_REF"),
            server_url: server_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns true if the triggering event is a pull request
    pub fn is_pull_request(&self) -> bool {
        self.event_name == "pull_request"
    }

    /// Web URL of the repository, e.g. `https://github.com/owner/repo`
    pub fn repo_url(&self) -> String {
        format!("{}/{}/{}", self.server_url, self.owner, self.repo)
    }

    /// URL of the checks page for this run: the PR checks for pull requests,
    /// the commit checks otherwise.
    pub fn action_url(&self) -> String {
        match (self.is_pull_request(), self.pr_number) {
            (true, Some(number)) => format!("{}/pull/{}/checks", self.repo_url(), number),
            _ => format!("{}/commit/{}/checks", self.repo_url(), self.sha),
        }
    }

    /// URL of the pull request, if this run belongs to one
    pub fn pull_request_url(&self) -> Option<String> {
        if !self.is_pull_request() {
            return None;
        }
        self.pr_number
            .map(|number| format!("{}/pull/{}", self.repo_url(), number))
    }

    /// Ref to look up the commit by: the PR head branch for pull requests,
    /// the triggering commit SHA otherwise.
    pub fn commit_ref(&self) -> &str {
        if self.is_pull_request() {
            if let Some(head_ref) = &self.head_ref {
                return head_ref.strip_prefix("refs/heads/").unwrap_or(head_ref);
            }
        }
        &self.sha
    }
}

/// Extract the pull request (or issue) number from the event payload file.
fn read_event_number(path: &Path) -> Option<u64> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Could not read event payload {}: {}", path.display(), e);
            return None;
        }
    };
    let payload: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Could not parse event payload {}: {}", path.display(), e);
            return None;
        }
    };

    let number = payload
        .get("pull_request")
        .and_then(|pr| pr.get("number"))
        .or_else(|| payload.get("issue").and_then(|i| i.get("number")))
        .or_else(|| payload.get("number"))
        .and_then(|n| n.as_u64());
    debug!("Event payload number: {:?}", number);
    number
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    /// Context for a push to `main` in `octo/widgets`
    pub(crate) fn push_context() -> EventContext {
        EventContext {
            sha: "abc123".to_string(),
            event_name: "push".to_string(),
            workflow: "CI".to_string(),
            git_ref: "refs/heads/main".to_string(),
            actor: "octocat".to_string(),
            owner: "octo".to_string(),
            repo: "widgets".to_string(),
            pr_number: None,
            head_ref: None,
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Context for pull request #42 from `feature/login`
    pub(crate) fn pr_context() -> EventContext {
        EventContext {
            event_name: "pull_request".to_string(),
            git_ref: "refs/pull/42/merge".to_string(),
            pr_number: Some(42),
            head_ref: Some("feature/login".to_string()),
            ..push_context()
        }
    }

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("GITHUB_SHA", "abc123".to_string()),
            ("GITHUB_EVENT_NAME", "push".to_string()),
            ("GITHUB_WORKFLOW", "CI".to_string()),
            ("GITHUB_REF", "refs/heads/main".to_string()),
            ("GITHUB_ACTOR", "octocat".to_string()),
            ("GITHUB_REPOSITORY", "octo/widgets".to_string()),
            ("GITHUB_HEAD_REF", String::new()),
        ])
    }

    #[test]
    fn test_from_lookup_push_event() {
        let env = base_env();
        let ctx = EventContext::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(ctx, push_context());
        assert!(!ctx.is_pull_request());
    }

    #[test]
    fn test_from_lookup_missing_variable() {
        let mut env = base_env();
        env.remove("GITHUB_ACTOR");
        let err = EventContext::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, NotifyError::MissingContext(ref name) if name == "GITHUB_ACTOR"));
    }

    #[test]
    fn test_from_lookup_bad_repository() {
        let mut env = base_env();
        env.insert("GITHUB_REPOSITORY", "widgets".to_string());
        let err = EventContext::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, NotifyError::Config(_)));
    }

    #[test]
    fn test_from_lookup_reads_pr_number_from_event_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"action":"opened","pull_request":{{"number":42}}}}"#).unwrap();

        let mut env = base_env();
        env.insert("GITHUB_EVENT_NAME", "pull_request".to_string());
        env.insert("GITHUB_HEAD_REF", "feature/login".to_string());
        env.insert("GITHUB_EVENT_PATH", file.path().display().to_string());
        env.insert("GITHUB_SERVER_URL", "https://ghe.example.com/".to_string());

        let ctx = EventContext::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(ctx.pr_number, Some(42));
        assert_eq!(ctx.head_ref.as_deref(), Some("feature/login"));
        assert_eq!(ctx.server_url, "https://ghe.example.com");
    }

    #[test]
    fn test_unreadable_event_file_is_tolerated() {
        let mut env = base_env();
        env.insert("GITHUB_EVENT_PATH", "/nonexistent/event.json".to_string());
        let ctx = EventContext::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(ctx.pr_number, None);
    }

    #[test]
    fn test_urls_for_push_and_pull_request() {
        let push = push_context();
        assert_eq!(push.repo_url(), "https://github.com/octo/widgets");
        assert_eq!(
            push.action_url(),
            "https://github.com/octo/widgets/commit/abc123/checks"
        );
        assert_eq!(push.pull_request_url(), None);

        let pr = pr_context();
        assert_eq!(
            pr.action_url(),
            "https://github.com/octo/widgets/pull/42/checks"
        );
        assert_eq!(
            pr.pull_request_url().as_deref(),
            Some("https://github.com/octo/widgets/pull/42")
        );
    }

    #[test]
    fn test_commit_ref() {
        assert_eq!(push_context().commit_ref(), "abc123");
        assert_eq!(pr_context().commit_ref(), "feature/login");

        let prefixed = EventContext {
            head_ref: Some("refs/heads/feature/login".to_string()),
            ..pr_context()
        };
        assert_eq!(prefixed.commit_ref(), "feature/login");

        let no_head = EventContext {
            head_ref: None,
            ..pr_context()
        };
        assert_eq!(no_head.commit_ref(), "abc123");
    }
}
