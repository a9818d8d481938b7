//! Building blocks of the Slack message: labelled fields and summary lines

use serde::{Deserialize, Serialize};

use crate::context::EventContext;
use crate::utils::slack_link;

/// Slack composition text object (`{"type": "mrkdwn", "text": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: "mrkdwn".to_string(),
            text: text.into(),
        }
    }
}

/// A labelled unit of a section's `fields`, rendered as `*label*\ntext`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "TextObject")]
pub struct Field {
    pub label: String,
    pub text: String,
}

impl Field {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

impl From<Field> for TextObject {
    fn from(field: Field) -> Self {
        TextObject::mrkdwn(format!("*{}*\n{}", field.label, field.text))
    }
}

/// The four context fields, in order: repository, ref, event name, workflow.
pub fn context_fields(ctx: &EventContext) -> Vec<Field> {
    let repo_url = ctx.repo_url();
    let event = match ctx.pull_request_url() {
        Some(pr_url) => slack_link(&pr_url, &ctx.event_name),
        None => ctx.event_name.clone(),
    };

    vec![
        Field::new(
            "repository",
            slack_link(&repo_url, &format!("{}/{}", ctx.owner, ctx.repo)),
        ),
        Field::new("ref", ctx.git_ref.clone()),
        Field::new("event name", event),
        Field::new("workflow", slack_link(&ctx.action_url(), &ctx.workflow)),
    ]
}

/// One-line summary used in compact mode:
/// `[<repo>] <result> by <actor> on <ref>, check <workflow>`
pub fn compact_text(ctx: &EventContext, result_label: &str) -> String {
    format!(
        "[{}] {} by {} on {}, check {}",
        slack_link(&ctx.repo_url(), &format!("{}/{}", ctx.owner, ctx.repo)),
        result_label,
        ctx.actor,
        ctx.git_ref,
        slack_link(&ctx.action_url(), &ctx.workflow),
    )
}

/// Link to the release page of a freshly created tag
pub fn release_text(ctx: &EventContext, created_tag: &str) -> String {
    format!("{}/releases/tag/{}", ctx.repo_url(), created_tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{pr_context, push_context};

    #[test]
    fn test_field_serializes_as_mrkdwn() {
        let value = serde_json::to_value(Field::new("ref", "refs/heads/main")).unwrap();
        assert_eq!(value["type"], "mrkdwn");
        assert_eq!(value["text"], "*ref*\nrefs/heads/main");
    }

    #[test]
    fn test_context_fields_for_push() {
        let fields = context_fields(&push_context());
        let labels: Vec<_> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, ["repository", "ref", "event name", "workflow"]);

        assert_eq!(
            fields[0].text,
            "<https://github.com/octo/widgets|octo/widgets>"
        );
        assert_eq!(fields[1].text, "refs/heads/main");
        assert_eq!(fields[2].text, "push");
        assert_eq!(
            fields[3].text,
            "<https://github.com/octo/widgets/commit/abc123/checks|CI>"
        );
    }

    #[test]
    fn test_context_fields_for_pull_request() {
        let fields = context_fields(&pr_context());
        assert_eq!(fields.len(), 4);
        assert_eq!(
            fields[2].text,
            "<https://github.com/octo/widgets/pull/42|pull_request>"
        );
        assert_eq!(
            fields[3].text,
            "<https://github.com/octo/widgets/pull/42/checks|CI>"
        );
    }

    #[test]
    fn test_compact_text() {
        assert_eq!(
            compact_text(&push_context(), "Cancelled"),
            "[<https://github.com/octo/widgets|octo/widgets>] Cancelled by octocat on refs/heads/main, \
             check <https://github.com/octo/widgets/commit/abc123/checks|CI>"
        );
    }

    #[test]
    fn test_release_text() {
        assert_eq!(
            release_text(&push_context(), "v1.2.3"),
            "https://github.com/octo/widgets/releases/tag/v1.2.3"
        );
    }
}
