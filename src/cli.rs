//! Command-line surface
//!
//! Two input forms are accepted:
//!
//! ```text
//! gh-artifact-dl <owner/repo> <run_id> [output_dir]
//! gh-artifact-dl https://<host>/<owner>/<repo>/actions/runs/<run_id> [output_dir]
//! ```

use crate::config::{Config, api_url_for_host};
use crate::downloader::ArtifactDownloader;
use crate::error::{Error, Result, ToExitCode};
use crate::notify::select_notifier;
use crate::token::{TokenChain, TokenProvider};
use crate::types::{DownloadSummary, RunTarget};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

/// Host assumed for `owner/repo` input
pub const DEFAULT_WEB_HOST: &str = "github.com";

/// Download artifacts from a GitHub Actions workflow run
#[derive(Debug, Parser)]
#[command(name = "gh-artifact-dl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Download artifacts from a GitHub Actions workflow run", long_about = None)]
#[command(after_help = "\
Examples:
  gh-artifact-dl acme/app 19810307537
  gh-artifact-dl acme/app 19810307537 ./my-artifacts --no-flatten
  gh-artifact-dl https://github.com/acme/app/actions/runs/19810307537 ./my-artifacts")]
pub struct Cli {
    /// Either 'owner/repo' (run id follows) or a full workflow run URL
    pub input: String,

    /// Run id for 'owner/repo' input, output directory for URL input
    pub run_id_or_output: Option<String>,

    /// Output directory (only with 'owner/repo' input)
    pub output_dir: Option<String>,

    /// GitHub API token (default: GITHUB_TOKEN, GH_TOKEN, then `gh auth token`)
    #[arg(long)]
    pub token: Option<String>,

    /// Keep each artifact in its own subdirectory with its internal structure
    #[arg(long)]
    pub no_flatten: bool,

    /// Do not wait for an in-progress run to complete
    #[arg(long)]
    pub no_wait: bool,

    /// Seconds between status checks while waiting
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Maximum seconds to wait for the run to complete
    #[arg(long, default_value_t = 1800)]
    pub timeout: u64,

    /// REST API base URL (default: derived from the run URL host)
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Disable desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    pub json: bool,
}

/// What to download and where, resolved from the positional arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Repository and run
    pub target: RunTarget,
    /// Explicit output directory, if given
    pub output_dir: Option<PathBuf>,
    /// Web host of the run (`github.com` for `owner/repo` input)
    pub web_host: String,
}

impl Cli {
    /// Log level selected by `--verbose`
    pub fn log_level(&self) -> Level {
        if self.verbose { Level::DEBUG } else { Level::INFO }
    }

    /// Resolve the positional arguments
    pub fn invocation(&self) -> Result<Invocation> {
        parse_target(
            &self.input,
            self.run_id_or_output.as_deref(),
            self.output_dir.as_deref(),
        )
    }

    /// Build the runtime configuration for `invocation`
    pub fn to_config(&self, invocation: &Invocation) -> Config {
        let mut config = Config::default();
        config.api.url = self
            .api_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_url_for_host(&invocation.web_host));
        config.wait.enabled = !self.no_wait;
        config.wait.poll_interval = Duration::from_secs(self.poll_interval);
        config.wait.timeout = Duration::from_secs(self.timeout);
        config.output.dir = invocation.output_dir.clone();
        config.output.flatten = !self.no_flatten;
        config.notifications = !self.no_notify;
        config
    }

    /// Resolve arguments and credentials, then download the run
    ///
    /// Every failure is logged exactly once: setup errors here, run errors by
    /// [`ArtifactDownloader::run`].
    ///
    /// # Errors
    /// Invalid arguments, a missing token, or whatever the run fails with.
    pub async fn execute(&self) -> Result<DownloadSummary> {
        let (downloader, target) = self.prepare().await.inspect_err(|e| {
            error!(code = e.error_code(), error = %e, "cannot start download");
        })?;
        downloader.run(&target).await
    }

    async fn prepare(&self) -> Result<(ArtifactDownloader, RunTarget)> {
        let invocation = self.invocation()?;
        let config = self.to_config(&invocation);

        // gh keys credentials by bare hostname
        let host = invocation
            .web_host
            .split(':')
            .next()
            .unwrap_or(&invocation.web_host);
        let token = TokenChain::default_for(self.token.clone(), host)
            .token()
            .await?;

        let notifier = select_notifier(config.notifications);
        let downloader = ArtifactDownloader::new(config, &token, notifier)?;

        info!(
            repo = %invocation.target.repo,
            run_id = invocation.target.run_id,
            output_dir = %downloader.config().output_dir_for(invocation.target.run_id).display(),
            "downloading workflow run artifacts"
        );
        Ok((downloader, invocation.target))
    }
}

/// Interpret the positional arguments
///
/// `input` is either a run URL, in which case `second` is the output directory,
/// or `owner/repo`, in which case `second` is the run id and `third` the output
/// directory.
///
/// # Errors
/// [`Error::InvalidInput`] for a malformed URL, a missing or non-numeric run
/// id, or an extra positional argument after a URL.
pub fn parse_target(input: &str, second: Option<&str>, third: Option<&str>) -> Result<Invocation> {
    if input.starts_with("http://") || input.starts_with("https://") {
        if let Some(extra) = third {
            return Err(Error::InvalidInput(format!(
                "unexpected argument '{}' after run URL; usage: <run_url> [output_dir]",
                extra
            )));
        }
        let (target, web_host) = parse_run_url(input)?;
        return Ok(Invocation {
            target,
            output_dir: second.map(PathBuf::from),
            web_host,
        });
    }

    let Some(run_id) = second else {
        return Err(Error::InvalidInput(
            "run id is required with 'owner/repo' input; usage: <owner/repo> <run_id> [output_dir]"
                .to_string(),
        ));
    };

    Ok(Invocation {
        target: RunTarget::new(input, parse_run_id(run_id)?)?,
        output_dir: third.map(PathBuf::from),
        web_host: DEFAULT_WEB_HOST.to_string(),
    })
}

/// Parse `https://<host>/<owner>/<repo>/actions/runs/<run_id>[/...]`
///
/// Trailing segments such as `/attempts/2` or `/job/123` are ignored.
pub fn parse_run_url(input: &str) -> Result<(RunTarget, String)> {
    let invalid = || {
        Error::InvalidInput(format!(
            "invalid GitHub Actions run URL: {}; expected https://github.com/owner/repo/actions/runs/run_id",
            input
        ))
    };

    let url = url::Url::parse(input).map_err(|_| invalid())?;
    let host = url.host_str().ok_or_else(invalid)?;
    let segments: Vec<&str> = url
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [owner, repo, "actions", "runs", run_id, ..] => {
            let run_id = run_id.parse().map_err(|_| invalid())?;
            let target = RunTarget::new(format!("{}/{}", owner, repo), run_id)?;
            let host = match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            Ok((target, host))
        }
        _ => Err(invalid()),
    }
}

fn parse_run_id(s: &str) -> Result<u64> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("run id must be a number, got '{}'", s)))
}
