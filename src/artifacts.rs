//! Artifact listing

use crate::client::GitHubClient;
use crate::error::Result;
use crate::types::{ArtifactDescriptor, RunTarget};
use tracing::{debug, info, warn};

/// List the downloadable artifacts of a run
///
/// Expired artifacts are dropped; order is preserved as returned by GitHub. An
/// empty result is not an error here, the caller decides whether it is fatal.
pub async fn list_artifacts(
    client: &GitHubClient,
    target: &RunTarget,
) -> Result<Vec<ArtifactDescriptor>> {
    let all = client.get_artifacts(target).await?;
    let total = all.len();

    let artifacts: Vec<_> = all
        .into_iter()
        .filter(|artifact| {
            if artifact.expired {
                debug!(artifact = %artifact.name, "skipping expired artifact");
            }
            !artifact.expired
        })
        .collect();

    for artifact in &artifacts {
        info!(
            artifact = %artifact.name,
            size_bytes = artifact.size_in_bytes,
            "found artifact"
        );
    }

    if artifacts.is_empty() {
        warn!(run_id = target.run_id, total, "no non-expired artifacts found in this run");
    }

    Ok(artifacts)
}
