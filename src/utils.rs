//! Slack mrkdwn helpers

/// Escape the three control characters Slack reserves in mrkdwn text.
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Format a Slack link: `<url|label>`
pub fn slack_link(url: &str, label: &str) -> String {
    format!("<{}|{}>", url, escape_mrkdwn(label))
}

/// Returns the first line of a (commit) message
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim_end()
}
