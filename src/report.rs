use crate::error::RecommendError;
use crate::render::OutputFormat;
use log::info;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Writes rendered reports as `<dir>/<slug>-<unix-seconds>.<ext>`
#[derive(Debug, Clone)]
pub struct ReportSink {
    directory: PathBuf,
}

impl ReportSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub async fn save(
        &self,
        location: &str,
        format: OutputFormat,
        content: &str,
    ) -> Result<PathBuf, RecommendError> {
        fs::create_dir_all(&self.directory).await?;

        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let path = self.directory.join(format!(
            "{}-{}.{}",
            slugify(location),
            seconds,
            format.extension()
        ));

        fs::write(&path, content).await?;
        info!("Saved report to {}", path.display());
        Ok(path)
    }
}

/// Lowercase alphanumerics joined by single dashes; "report" when nothing is left.
fn slugify(text: &str) -> String {
    let slug = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "report".to_string()
    } else {
        slug
    }
}
