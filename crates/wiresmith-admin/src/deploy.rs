//! Batch deployment with partial-failure tolerance.

use crate::auth::Auth;
use crate::client::AdminApi;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};
use wiresmith_core::Mapping;

/// A mapping the server refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployFailure {
    /// Position in the submitted batch.
    pub index: usize,
    pub mapping_id: String,
    pub message: String,
}

/// Outcome of one deploy batch. Both lists keep submission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeployReport {
    pub succeeded: Vec<Mapping>,
    pub failed: Vec<DeployFailure>,
}

impl DeployReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create every mapping on the server at `base_url`.
///
/// Each create is attempted independently, at most `concurrency` at a time.
/// Failures are collected per item; the batch itself never fails.
pub async fn deploy<A>(
    api: &A,
    base_url: &str,
    mappings: &[Mapping],
    auth: &Auth,
    concurrency: usize,
) -> DeployReport
where
    A: AdminApi + ?Sized,
{
    let creates: Vec<_> = mappings
        .iter()
        .map(|mapping| api.create(base_url, mapping, auth))
        .collect();
    let outcomes: Vec<_> = stream::iter(creates)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = DeployReport::default();
    for (index, (mapping, outcome)) in mappings.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(stored) => report.succeeded.push(stored),
            Err(e) => {
                warn!(index, mapping_id = %mapping.id, error = %e, "Failed to deploy mapping");
                report.failed.push(DeployFailure {
                    index,
                    mapping_id: mapping.id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        target_url = %base_url,
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "Deployed mappings"
    );
    report
}
