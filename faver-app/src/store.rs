use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use faver_http::Url;
use faver_web::IconPayload;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Host of `target` for file names; `host:port` becomes `host_port`.
pub fn host_label(target: &str) -> Result<String> {
    let url = Url::parse(target).with_context(|| format!("target {target:?} is not a URL"))?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("target {target:?} has no host"))?;
    Ok(match url.port() {
        Some(port) => format!("{host}_{port}"),
        None => host.to_string(),
    })
}

/// `<YYYYMMDDhhmmss>-<host>-<index>.<extension>`
pub fn icon_file_name(stamp: &DateTime<Local>, host: &str, index: usize, extension: &str) -> String {
    format!(
        "{}-{host}-{index}.{extension}",
        stamp.format(TIMESTAMP_FORMAT)
    )
}

/// Write each payload of `target` into `dir` and return the created paths.
///
/// Existing files are never replaced: a taken name gets a `-<n>` suffix
/// before the extension.
pub async fn save_icons(
    dir: &Path,
    extension: &str,
    target: &str,
    icons: &[IconPayload],
) -> Result<Vec<PathBuf>> {
    let host = host_label(target)?;
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let stamp = Local::now();
    let mut saved = Vec::with_capacity(icons.len());
    for (index, icon) in icons.iter().enumerate() {
        let name = icon_file_name(&stamp, &host, index, extension);
        let (path, mut file) = create_unique(dir, &name, extension).await?;
        file.write_all(icon)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("failed to flush {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = icon.len(), "faver.store.saved");
        saved.push(path);
    }
    Ok(saved)
}

async fn create_unique(dir: &Path, name: &str, extension: &str) -> Result<(PathBuf, File)> {
    let stem = name
        .strip_suffix(extension)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(name);
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = match attempt {
            0 => dir.join(name),
            n => dir.join(format!("{stem}-{n}.{extension}")),
        };
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "faver.store.name_taken");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to create {}", path.display()));
            }
        }
    }
    Err(anyhow!(
        "no free file name for {name} in {} after {MAX_NAME_ATTEMPTS} attempts",
        dir.display()
    ))
}
