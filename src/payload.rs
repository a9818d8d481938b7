//! Assembly of the Slack message payload

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use tracing::{debug, info, warn};

use crate::block::{Field, TextObject, compact_text, context_fields, release_text};
use crate::context::EventContext;
use crate::error::Result;
use crate::github::{CommitSource, commit_fields};
use crate::job::JobStatus;

/// Caller-supplied options driving payload construction
#[derive(Debug, Clone)]
pub struct PayloadOptions {
    pub job_name: String,
    pub status: JobStatus,
    pub mention: String,
    pub mention_condition: String,
    pub commit_flag: bool,
    pub compact_mode: bool,
    pub release_mode: bool,
    pub created_tag: String,
    pub token: Option<String>,
}

impl PayloadOptions {
    pub fn new(job_name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_name: job_name.into(),
            status,
            mention: String::new(),
            mention_condition: String::new(),
            commit_flag: false,
            compact_mode: false,
            release_mode: false,
            created_tag: String::new(),
            token: None,
        }
    }

    /// Rendering mode; compact takes precedence over release, full is the default.
    pub fn render_mode(&self) -> RenderMode {
        if self.compact_mode {
            RenderMode::Compact
        } else if self.release_mode {
            RenderMode::Release
        } else {
            RenderMode::Full
        }
    }

    /// Returns true if the mention marker should be prepended.
    /// The condition is matched the way statuses are parsed: trimmed and
    /// ASCII case-insensitive.
    pub fn should_mention(&self) -> bool {
        let condition = self.mention_condition.trim();
        !self.mention.is_empty()
            && (condition.eq_ignore_ascii_case("always")
                || condition.eq_ignore_ascii_case(self.status.as_str()))
    }

    /// Token to use for commit enrichment, if enrichment is requested and possible
    fn enrichment_token(&self) -> Option<&str> {
        if !self.commit_flag {
            return None;
        }
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Layout of the section body. The release tag itself travels in
/// `PayloadOptions::created_tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Compact,
    Release,
    Full,
}

/// Body of the single section block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    Compact(String),
    Release(String),
    Full(Vec<Field>),
}

impl SectionBody {
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            SectionBody::Full(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SectionBody::Compact(text) | SectionBody::Release(text) => Some(text),
            SectionBody::Full(_) => None,
        }
    }
}

/// Serializes as a Slack `section` block with either `text` or `fields`.
impl Serialize for SectionBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut section = serializer.serialize_struct("Section", 2)?;
        section.serialize_field("type", "section")?;
        match self {
            SectionBody::Compact(text) | SectionBody::Release(text) => {
                section.serialize_field("text", &TextObject::mrkdwn(text.clone()))?
            }
            SectionBody::Full(fields) => section.serialize_field("fields", fields)?,
        }
        section.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub color: String,
    pub blocks: Vec<SectionBody>,
}

/// Message ready to be handed to the webhook sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    pub text: String,
    pub attachments: Vec<Attachment>,
    pub unfurl_links: bool,
}

impl Payload {
    /// The section body of the single attachment
    pub fn body(&self) -> Option<&SectionBody> {
        self.attachments.first().and_then(|a| a.blocks.first())
    }

    pub fn color(&self) -> Option<&str> {
        self.attachments.first().map(|a| a.color.as_str())
    }
}

/// Summary line: `<job> <result>`, optionally prefixed with `<!mention> `
pub fn summary_text(options: &PayloadOptions) -> String {
    let text = format!("{} {}", options.job_name, options.status.accessory().label);
    if options.should_mention() {
        format!("<!{}> {}", options.mention, text)
    } else {
        text
    }
}

/// Build the notification payload.
///
/// In full mode, commit fields are fetched through `source` only when the
/// commit flag is set and a non-empty token was given; otherwise enrichment
/// is skipped. Passing `None` for `source` also skips it, with a warning when
/// enrichment was requested. Errors from the commit source are returned as-is.
pub async fn build_payload(
    source: Option<&dyn CommitSource>,
    ctx: &EventContext,
    options: &PayloadOptions,
) -> Result<Payload> {
    let accessory = options.status.accessory();
    let text = summary_text(options);

    let body = match options.render_mode() {
        RenderMode::Compact => SectionBody::Compact(compact_text(ctx, accessory.label)),
        RenderMode::Release => SectionBody::Release(release_text(ctx, &options.created_tag)),
        RenderMode::Full => {
            let mut fields = context_fields(ctx);
            match (options.enrichment_token(), source) {
                (Some(_), Some(source)) => fields.extend(commit_fields(source, ctx).await?),
                (Some(_), None) => {
                    warn!("Commit fields requested with a token but no commit source, skipping")
                }
                (None, _) if options.commit_flag => {
                    debug!("Commit fields requested without a token, skipping")
                }
                (None, _) => {}
            }
            SectionBody::Full(fields)
        }
    };
    info!(
        "Built {:?} payload for '{}' ({})",
        options.render_mode(),
        options.job_name,
        options.status
    );

    Ok(Payload {
        text,
        attachments: vec![Attachment {
            color: accessory.color.to_string(),
            blocks: vec![body],
        }],
        unfurl_links: true,
    })
}
