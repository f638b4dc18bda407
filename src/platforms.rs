use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

use crate::config::ApprovalConfig;
use crate::error::{Error, Result};
use crate::loader::load_records;
use crate::report;
use crate::scoring::{ApprovalPipeline, PlatformRun};

/// One `platform=path` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInput {
    pub platform: String,
    pub path: PathBuf,
}

impl PlatformInput {
    pub fn new(platform: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            platform: platform.into().to_lowercase(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformOutput {
    pub run: PlatformRun,
    pub items_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Runs every platform batch as its own task and writes its outputs.
///
/// Platforms share nothing: an unknown platform, an unreadable file or a
/// failed write is logged and only that platform is skipped. Errors with
/// `NoPlatformCompleted` when every platform failed.
pub async fn run_platforms(
    config: &ApprovalConfig,
    pipeline: Arc<ApprovalPipeline>,
    inputs: Vec<PlatformInput>,
    out_dir: &Path,
) -> Result<Vec<PlatformOutput>> {
    let mut handles = Vec::new();
    for input in inputs {
        let profile = match config.profile(&input.platform) {
            Ok(profile) => profile.clone(),
            Err(err) => {
                error!(platform = input.platform.as_str(), error = %err, "skipping platform");
                continue;
            }
        };
        let pipeline = Arc::clone(&pipeline);
        let platform = input.platform.clone();
        let handle = tokio::spawn(async move {
            let path = input.path;
            let records = tokio::task::spawn_blocking({
                let profile = profile.clone();
                move || load_records(&path, &profile)
            })
            .await
            .map_err(|err| Error::Task(err.to_string()))??;
            Ok::<PlatformRun, Error>(pipeline.score_batch(&profile, &records).await)
        });
        handles.push((platform, handle));
    }

    let mut outputs = Vec::new();
    for (platform, handle) in handles {
        let outcome = handle
            .await
            .map_err(|err| Error::Task(err.to_string()))
            .and_then(|run| run)
            .and_then(|run| {
                let (items_path, summary_path) = report::write_platform_run(out_dir, &run)?;
                Ok(PlatformOutput {
                    run,
                    items_path,
                    summary_path,
                })
            });
        match outcome {
            Ok(output) => outputs.push(output),
            Err(err) => error!(platform = platform.as_str(), error = %err, "platform batch aborted"),
        }
    }

    if outputs.is_empty() {
        return Err(Error::NoPlatformCompleted);
    }
    Ok(outputs)
}
