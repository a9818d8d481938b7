pub mod block;
pub mod config;
pub mod context;
pub mod error;
pub mod github;
pub mod job;
pub mod logging;
pub mod payload;
pub mod utils;
pub mod webhook;

use tracing::info;

pub use context::EventContext;
pub use error::{NotifyError, Result};
pub use github::{CommitSource, GitHubClient};
pub use job::{Accessory, JobStatus};
pub use payload::{Payload, PayloadOptions, build_payload};
pub use webhook::{HttpTransport, WebhookDefaults, WebhookTransport};

/// Build the payload for this run and deliver it to the webhook.
/// Returns the payload that was sent.
pub async fn notify(
    commit_source: Option<&dyn CommitSource>,
    transport: &dyn WebhookTransport,
    url: &str,
    defaults: &WebhookDefaults,
    ctx: &EventContext,
    options: &PayloadOptions,
) -> Result<Payload> {
    info!(
        "Notifying '{}' status for {}/{}@{}",
        options.status, ctx.owner, ctx.repo, ctx.sha
    );
    let payload = build_payload(commit_source, ctx, options).await?;
    webhook::send(transport, url, defaults, &payload).await?;
    Ok(payload)
}
