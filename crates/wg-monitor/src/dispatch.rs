//! Notification delivery: the external command and HTTP POSTs with
//! per-URL retry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use common::registry::SortedBuckets;
use reqwest::header::{CONNECTION, CONTENT_LENGTH};
use reqwest::StatusCode;
use tokio::process::Command;

use crate::ctx::DispatchMode;

/// POSTs per URL before giving up.
pub const URL_ATTEMPTS: u32 = 10;
/// Pause between attempts (not after the last).
pub const RETRY_PAUSE: Duration = Duration::from_secs(5);
/// Hard per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends one rendered report through the configured channels.
pub struct Dispatcher {
    mode: DispatchMode,
    command: Option<PathBuf>,
    urls: Vec<String>,
    client: reqwest::Client,
    /// Pre-rendered subject line, prefixed onto the URL payload.
    subject: String,
    dry_run: bool,
    attempts: u32,
    pause: Duration,
}

impl Dispatcher {
    pub fn new(
        mode: DispatchMode,
        command: Option<PathBuf>,
        urls: Vec<String>,
        ca_bundle: Option<&Path>,
        subject: String,
        dry_run: bool,
    ) -> Result<Self> {
        Ok(Self {
            mode,
            command,
            urls,
            client: build_client(ca_bundle)?,
            subject,
            dry_run,
            attempts: URL_ATTEMPTS,
            pause: RETRY_PAUSE,
        })
    }

    /// Override the retry shape. Tests tighten this so a full retry run
    /// finishes in milliseconds.
    pub fn with_retry(mut self, attempts: u32, pause: Duration) -> Self {
        self.attempts = attempts;
        self.pause = pause;
        self
    }

    /// Deliver one report; `true` means every used channel succeeded.
    pub async fn send(&self, body: &str, cycle: u64, buckets: &SortedBuckets) -> bool {
        if self.dry_run {
            println!("{body}");
            return true;
        }
        match self.mode {
            DispatchMode::Command => self.run_command(body, cycle, buckets).await,
            DispatchMode::Urls => self.post_all(body).await,
            DispatchMode::Both => {
                // The command's verdict must not keep the URLs from firing.
                let command_ok = self.run_command(body, cycle, buckets).await;
                let urls_ok = self.post_all(body).await;
                command_ok && urls_ok
            }
        }
    }

    /// Positional contract: body, cycle index, then the four key sets
    /// (just lost, just returned, still lost, present), each space-joined.
    async fn run_command(&self, body: &str, cycle: u64, buckets: &SortedBuckets) -> bool {
        let Some(command) = &self.command else {
            return false;
        };
        let status = Command::new(command)
            .arg(body)
            .arg(cycle.to_string())
            .arg(buckets.just_lost.join(" "))
            .arg(buckets.just_returned.join(" "))
            .arg(buckets.still_lost.join(" "))
            .arg(buckets.present.join(" "))
            .status()
            .await;
        match status {
            Ok(s) if s.success() => true,
            Ok(s) => {
                eprintln!("[MON] notification command exited with {s}");
                false
            }
            Err(e) => {
                eprintln!("[MON] notification command failed to start: {e}");
                false
            }
        }
    }

    async fn post_all(&self, body: &str) -> bool {
        let payload = format!("Subject: {}\n{}", self.subject, body);
        let mut all_ok = true;
        for url in &self.urls {
            if !self.post_one(url, &payload).await {
                all_ok = false;
            }
        }
        all_ok
    }

    /// POST with up to `attempts` tries. A 404 means the endpoint is
    /// misconfigured; retrying cannot help, so it fails immediately.
    async fn post_one(&self, url: &str, payload: &str) -> bool {
        for attempt in 1..=self.attempts {
            match self
                .client
                .post(url)
                .header(CONTENT_LENGTH, payload.len())
                .header(CONNECTION, "close")
                .body(payload.to_string())
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => return true,
                Ok(resp) if resp.status() == StatusCode::NOT_FOUND => {
                    eprintln!("[MON] {url}: 404, giving up on this endpoint");
                    return false;
                }
                Ok(resp) => eprintln!(
                    "[MON] {url}: HTTP {} (attempt {attempt}/{})",
                    resp.status(),
                    self.attempts
                ),
                Err(e) => eprintln!("[MON] {url}: {e} (attempt {attempt}/{})", self.attempts),
            }
            if attempt < self.attempts {
                tokio::time::sleep(self.pause).await;
            }
        }
        false
    }
}

fn build_client(ca_bundle: Option<&Path>) -> Result<reqwest::Client> {
    // One connection per report: no keep-alive pool.
    let mut builder = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(0);
    if let Some(path) = ca_bundle {
        let pem = std::fs::read(path)
            .with_context(|| format!("read CA bundle {}", path.display()))?;
        let cert = reqwest::Certificate::from_pem(&pem).context("parse CA bundle")?;
        builder = builder.add_root_certificate(cert);
    }
    builder.build().context("build HTTP client")
}
