use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Parser;
use cli::Cli;
use faver_common::observability::init_logging;
use faver_config::{FaverConfigLoader, HttpSettings};
use faver_http::{ClientOpts, HttpClient};
use faver_web::FaviconFetcher;
mod cli;
mod harvest;
mod intake;
mod store;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1) Load config (file < env < flags)
    let loader = FaverConfigLoader::new();
    let loader = match &cli.config {
        Some(path) => loader.with_file(path),
        None => loader.with_default_file(),
    };
    let mut cfg = loader.load()?;
    cli.apply(&mut cfg);

    let log_path = init_logging(cfg.logging.to_log_config("faver"))?;
    tracing::debug!(log_path = %log_path.display(), "faver.logging.ready");

    let targets = intake::read_targets(cli.targets.clone(), std::io::stdin().lock())?;
    if targets.is_empty() {
        bail!("no targets given on the command line or stdin");
    }

    let http = HttpClient::with_opts(client_opts(&cfg.http))?;
    let fetcher = FaviconFetcher::new(http);
    let summary = harvest::harvest(fetcher, targets, &cfg.output, cli.fail_fast).await;

    for path in &summary.saved {
        println!("{}", path.display());
    }
    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        files = summary.saved.len(),
        aborted = summary.aborted,
        "faver.done"
    );

    Ok(if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn client_opts(http: &HttpSettings) -> ClientOpts {
    let mut opts = ClientOpts {
        timeout: http.timeout(),
        connect_timeout: http.connect_timeout(),
        max_redirects: http.max_redirects,
        accept_invalid_certs: http.accept_invalid_certs,
        ..ClientOpts::default()
    };
    if let Some(agent) = &http.user_agent {
        opts.user_agent = agent.clone();
    }
    opts
}
