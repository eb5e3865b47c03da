//! Notification collaborators: Slack webhook and GitHub issue creation.
//!
//! Every notifier is fire-and-forget and at-most-once: a failure is logged
//! and reported as `false` to the caller, never retried, and never allowed to
//! abort the run that triggered it.

use crate::logger::Logger;
use serde_json::json;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("rulerun/", env!("CARGO_PKG_VERSION"));

/// A one-shot notification sink.
pub trait Notifier {
    fn notify(&self, subject: &str, body: &str) -> bool;
}

/// Posts `{"text": ...}` to a Slack incoming webhook.
pub struct SlackWebhook {
    webhook_url: String,
    logger: Logger,
}

impl SlackWebhook {
    pub fn new(webhook_url: String, logger: Logger) -> Self {
        SlackWebhook {
            webhook_url,
            logger,
        }
    }

    /// Build from `SLACK_WEBHOOK_URL`, if set.
    pub fn from_env(logger: Logger) -> Option<Self> {
        std::env::var("SLACK_WEBHOOK_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .map(|url| SlackWebhook::new(url, logger))
    }
}

impl Notifier for SlackWebhook {
    fn notify(&self, subject: &str, body: &str) -> bool {
        let client = match reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                self.logger.error(&format!("slack client setup failed: {e}"));
                return false;
            }
        };
        let payload = json!({ "text": format!("{subject}\n{body}") });
        match client.post(&self.webhook_url).json(&payload).send() {
            Ok(resp) if resp.status().is_success() => {
                self.logger.debug("slack notification sent");
                true
            }
            Ok(resp) => {
                self.logger.error(&format!(
                    "failed to send slack notification: status {}",
                    resp.status()
                ));
                false
            }
            Err(e) => {
                self.logger
                    .error(&format!("failed to send slack notification: {e}"));
                false
            }
        }
    }
}

/// Creates one issue per notification via the GitHub REST API.
pub struct GithubIssues {
    repo: String,
    token: String,
    logger: Logger,
}

impl GithubIssues {
    pub fn new(repo: String, token: String, logger: Logger) -> Self {
        GithubIssues {
            repo,
            token,
            logger,
        }
    }

    /// Build from `GITHUB_REPOSITORY` and `GITHUB_TOKEN`, if both are set.
    pub fn from_env(logger: Logger) -> Option<Self> {
        let repo = std::env::var("GITHUB_REPOSITORY").ok().filter(|s| !s.is_empty())?;
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty())?;
        Some(GithubIssues::new(repo, token, logger))
    }
}

impl Notifier for GithubIssues {
    fn notify(&self, subject: &str, body: &str) -> bool {
        let client = match reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                self.logger.error(&format!("github client setup failed: {e}"));
                return false;
            }
        };
        let url = format!("https://api.github.com/repos/{}/issues", self.repo);
        let payload = json!({ "title": subject, "body": body });
        let result = client
            .post(&url)
            .header("Authorization", format!("token {}", self.token))
            .json(&payload)
            .send();
        match result {
            Ok(resp) if resp.status().is_success() => {
                self.logger.debug(&format!("created issue in {}", self.repo));
                true
            }
            Ok(resp) => {
                self.logger.error(&format!(
                    "failed to create issue in {}: status {}",
                    self.repo,
                    resp.status()
                ));
                false
            }
            Err(e) => {
                self.logger
                    .error(&format!("failed to create issue in {}: {e}", self.repo));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slack_failure_returns_false_without_panic() {
        // Nothing listens on the discard port; the send fails fast.
        let slack = SlackWebhook::new(
            "http://127.0.0.1:9/services/hook".to_string(),
            Logger::new(false, false),
        );
        assert!(!slack.notify("subject", "body"));
    }

    #[test]
    fn test_github_failure_returns_false_without_panic() {
        let gh = GithubIssues::new(
            "owner/repo".to_string(),
            "not-a-token".to_string(),
            Logger::new(false, false),
        );
        // Either a transport error (offline) or a 401 (bogus token); both
        // must come back as false, never a panic.
        assert!(!gh.notify("subject", "body"));
    }
}
