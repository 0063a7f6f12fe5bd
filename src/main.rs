//! `gh-artifact-dl` - download artifacts from a GitHub Actions workflow run
//!
//! ```text
//! gh-artifact-dl <owner/repo> <run_id> [output_dir]
//! gh-artifact-dl https://github.com/<owner>/<repo>/actions/runs/<run_id> [output_dir]
//! ```
//!
//! Exits 0 on success or interrupt, 1 on any failure.

use clap::Parser;
use gh_artifact_dl::cli::Cli;
use gh_artifact_dl::telemetry::init_tracing;
use gh_artifact_dl::{ToExitCode, wait_for_signal};
use std::process::ExitCode;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json, cli.log_level());

    tokio::select! {
        // failures are already logged by execute
        result = cli.execute() => match result {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1)),
        },
        // dropping execute stops any unpacking after its current entry
        () = wait_for_signal() => {
            info!("Download interrupted by user");
            ExitCode::SUCCESS
        }
    }
}
