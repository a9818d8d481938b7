use clap::Parser;
use slack_ci_notify::config::{NotifyConfig, WebhookConfig, load_config};
use slack_ci_notify::logging::{FileLogger, setup_logging};
use slack_ci_notify::{
    CommitSource, EventContext, GitHubClient, HttpTransport, JobStatus, PayloadOptions, Result,
    WebhookDefaults, build_payload, notify,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

/// Send a CI job status notification to a Slack incoming webhook
#[derive(Parser, Debug)]
#[command(name = "slack-ci-notify", version, about)]
struct Cli {
    /// Name of the job shown in the notification
    #[arg(long, env = "INPUT_JOB_NAME")]
    job_name: String,

    /// Job status: success, failure or cancelled
    #[arg(long, env = "INPUT_TYPE")]
    status: String,

    /// Mention target, e.g. `channel` or `here`
    #[arg(long, env = "INPUT_MENTION", default_value = "")]
    mention: String,

    /// When to mention: `always` or a status name
    #[arg(long, env = "INPUT_MENTION_IF", default_value = "")]
    mention_if: String,

    /// Add commit and author fields (requires --token)
    #[arg(long, env = "INPUT_COMMIT")]
    commit: bool,

    /// Render a single summary line instead of fields
    #[arg(long, env = "INPUT_COMPACT")]
    compact: bool,

    /// Render a link to the release page of --created-tag
    #[arg(long, env = "INPUT_RELEASE")]
    release: bool,

    /// Tag name used in release mode
    #[arg(long, env = "INPUT_CREATED_TAG", default_value = "")]
    created_tag: String,

    /// GitHub token used to fetch commit details
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Slack incoming webhook URL
    #[arg(long, env = "INPUT_URL", hide_env_values = true)]
    url: Option<String>,

    /// Webhook URL used when --url is not given
    #[arg(long, env = "SLACK_WEBHOOK", hide = true, hide_env_values = true)]
    slack_webhook: Option<String>,

    #[arg(long, env = "INPUT_CHANNEL")]
    channel: Option<String>,

    #[arg(long, env = "INPUT_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "INPUT_ICON_EMOJI")]
    icon_emoji: Option<String>,

    #[arg(long, env = "INPUT_ICON_URL")]
    icon_url: Option<String>,

    /// TOML file with [webhook] settings
    #[arg(long, env = "SLACK_CI_NOTIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Print the payload as JSON instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, env = "SLACK_CI_NOTIFY_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn payload_options(&self) -> Result<PayloadOptions> {
        let status: JobStatus = self.status.parse()?;
        Ok(PayloadOptions {
            job_name: self.job_name.clone(),
            status,
            mention: self.mention.clone(),
            mention_condition: self.mention_if.clone(),
            commit_flag: self.commit,
            compact_mode: self.compact,
            release_mode: self.release,
            created_tag: self.created_tag.clone(),
            token: self.token.clone(),
        })
    }

    fn webhook_overrides(&self) -> WebhookConfig {
        WebhookConfig {
            url: self
                .url
                .clone()
                .filter(|u| !u.is_empty())
                .or_else(|| self.slack_webhook.clone().filter(|u| !u.is_empty())),
            defaults: WebhookDefaults {
                channel: self.channel.clone(),
                username: self.username.clone(),
                icon_emoji: self.icon_emoji.clone(),
                icon_url: self.icon_url.clone(),
            },
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Validate the status before touching the network
    let options = cli.payload_options()?;

    let file_config = match &cli.config {
        Some(path) => load_config(path)?,
        None => NotifyConfig::default(),
    };
    let webhook = file_config.webhook.merge(cli.webhook_overrides());

    let ctx = EventContext::from_env()?;
    debug!("Event context: {:?}", ctx);

    let github = options
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|token| GitHubClient::new(ctx.api_url.clone(), token));
    let commit_source = github.as_ref().map(|c| c as &dyn CommitSource);

    if cli.dry_run {
        let payload = build_payload(commit_source, &ctx, &options).await?;
        let body = slack_ci_notify::webhook::merge_defaults(&webhook.defaults, &payload)?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        info!("Dry run, notification not sent");
        return Ok(());
    }

    let url = webhook.require_url()?;
    let transport = HttpTransport::new();
    notify(
        commit_source,
        &transport,
        url,
        &webhook.defaults,
        &ctx,
        &options,
    )
    .await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let file_logger = cli.log_dir.clone().map(FileLogger::new);
    let _guard = match setup_logging(file_logger.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
