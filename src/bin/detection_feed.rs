//! Detection Feed
//!
//! Stand-in for the person-detection collaborator: reads one report per
//! stdin line and POSTs it to a running controller's `/api/detect`.
//!
//! Accepted lines:
//! - `true` / `false`
//! - a JSON report, e.g. `{"detected": true, "count": 2}`
//!
//! # Usage
//! ```bash
//! printf 'true\nfalse\n' | ./detection-feed --server http://localhost:3000
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crosswalk_signal::config::defaults;
use crosswalk_signal::logging::{self, LogFormat};
use crosswalk_signal::types::{DetectionReport, Phase};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "detection-feed")]
#[command(about = "Forward person-detection reports to a crosswalk signal controller")]
#[command(version)]
struct Args {
    /// Controller base URL
    #[arg(short, long, env = "CROSSWALK_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = defaults::FEED_HTTP_TIMEOUT_SECS)]
    timeout: u64,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

/// The part of the controller's reply the feed prints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectReply {
    current_light: Phase,
    time_left: u32,
}

// ============================================================================
// Line Parsing
// ============================================================================

/// Parse one input line. Blank lines yield `Ok(None)`.
fn parse_line(line: &str) -> Result<Option<DetectionReport>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.eq_ignore_ascii_case("true") {
        return Ok(Some(DetectionReport::new(true, 1)));
    }
    if line.eq_ignore_ascii_case("false") {
        return Ok(Some(DetectionReport::new(false, 0)));
    }
    let report = serde_json::from_str(line).with_context(|| format!("Unrecognised report '{line}'"))?;
    Ok(Some(report))
}

// ============================================================================
// Main
// ============================================================================

async fn send_report(
    http: &reqwest::Client,
    url: &str,
    report: &DetectionReport,
) -> Result<DetectReply> {
    let resp = http.post(url).json(report).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Controller returned {status}: {body}");
    }
    Ok(resp.json().await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_format);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .context("Failed to build HTTP client")?;
    let url = format!("{}/api/detect", args.server.trim_end_matches('/'));
    debug!(url = %url, "Forwarding detection reports");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let report = match parse_line(&line) {
            Ok(Some(report)) => report,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "Skipping input line");
                continue;
            }
        };

        match send_report(&http, &url, &report).await {
            Ok(reply) => println!(
                "detected={} count={} -> {} ({}s)",
                report.detected,
                report.count,
                reply.current_light.color(),
                reply.time_left
            ),
            Err(e) => warn!(error = %e, detected = report.detected, "Report not delivered"),
        }
    }

    Ok(())
}
