// Dataset fetcher - keeps the local copy of the vaccination dataset fresh
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DatasetFetcher {
    url: String,
    path: PathBuf,
    max_age: Duration,
}

impl DatasetFetcher {
    pub fn new(url: String, path: PathBuf, max_age_hours: u64) -> Self {
        Self {
            url,
            path,
            max_age: Duration::hours(max_age_hours as i64),
        }
    }

    /// Downloads the dataset when the local file is missing, older than the
    /// configured age, or `force` is set. Returns whether a download happened.
    pub async fn refresh(&self, force: bool) -> Result<bool> {
        if !force && !self.is_stale().await? {
            tracing::info!("Dataset at {:?} is up to date", self.path);
            return Ok(false);
        }

        let size = self.download().await?;
        tracing::info!("Downloaded {} bytes to {:?}", size, self.path);
        Ok(true)
    }

    pub async fn is_stale(&self) -> Result<bool> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to stat {:?}", self.path));
            }
        };

        let modified: DateTime<Utc> = metadata
            .modified()
            .with_context(|| format!("No modification time for {:?}", self.path))?
            .into();

        Ok(is_older_than(modified, Utc::now(), self.max_age))
    }

    async fn download(&self) -> Result<usize> {
        tracing::debug!("Fetching {}", self.url);

        let client = reqwest::Client::new();
        let response = client
            .get(&self.url)
            .send()
            .await
            .context("Failed to send dataset request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Dataset download failed with status {}: {}", status, body);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read dataset response")?;

        // Write to a sibling file, then rename over the target.
        let partial = partial_path(&self.path);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        tokio::fs::write(&partial, &bytes)
            .await
            .with_context(|| format!("Failed to write {:?}", partial))?;
        tokio::fs::rename(&partial, &self.path)
            .await
            .with_context(|| format!("Failed to move dataset into {:?}", self.path))?;

        Ok(bytes.len())
    }
}

pub fn is_older_than(modified: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    now.signed_duration_since(modified) > max_age
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
