use std::path::PathBuf;

use anyhow::{Context, Result};
use faver_config::OutputSettings;
use faver_web::{FaviconFetcher, IconPayload};
use tokio::task::JoinSet;

/// What a run over all targets produced.
#[derive(Debug, Default)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    /// Every file written, grouped by target in completion order.
    pub saved: Vec<PathBuf>,
    /// Set when `fail_fast` cut the run short.
    pub aborted: bool,
}

impl Summary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && !self.aborted
    }
}

/// Fetch every target on its own task, sharing one fetcher, and save the
/// results as they come in.
///
/// A failed target is logged and counted; the others keep going unless
/// `fail_fast` is set, in which case every fetch still in flight is aborted.
/// Saving happens on the calling task, so an abort never interrupts a
/// target halfway through writing its files.
pub async fn harvest(
    fetcher: FaviconFetcher,
    targets: Vec<String>,
    output: &OutputSettings,
    fail_fast: bool,
) -> Summary {
    let mut tasks = JoinSet::new();
    for target in targets {
        let fetcher = fetcher.clone();
        tasks.spawn(async move {
            tracing::debug!(target_url = %target, "faver.target.start");
            let result = fetcher
                .fetch_favicons(&target)
                .await
                .with_context(|| format!("fetching favicons for {target}"));
            (target, result)
        });
    }

    let mut summary = Summary::default();
    while let Some(joined) = tasks.join_next().await {
        let (target, fetched) = match joined {
            Ok(done) => done,
            Err(err) if err.is_cancelled() => continue,
            Err(err) => {
                tracing::error!(error = %err, "faver.target.panicked");
                summary.failed += 1;
                continue;
            }
        };

        let result = match fetched {
            Ok(icons) => save_target(output, &target, &icons).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(paths) => {
                tracing::info!(target_url = %target, files = paths.len(), "faver.target.saved");
                summary.succeeded += 1;
                summary.saved.extend(paths);
            }
            Err(err) => {
                tracing::error!(target_url = %target, error = %format!("{err:#}"), "faver.target.failed");
                summary.failed += 1;
                if fail_fast && !summary.aborted {
                    tracing::warn!(remaining = tasks.len(), "faver.harvest.aborting");
                    tasks.abort_all();
                    summary.aborted = true;
                }
            }
        }
    }
    summary
}

async fn save_target(
    output: &OutputSettings,
    target: &str,
    icons: &[IconPayload],
) -> Result<Vec<PathBuf>> {
    crate::store::save_icons(&output.dir, &output.extension, target, icons).await
}
