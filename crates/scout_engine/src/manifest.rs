use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use scout_logging::scout_info;
use serde_json::json;
use tempfile::NamedTempFile;

use crate::{DownloadRequest, DownloadSubmitter, SubmissionError};

pub const MANIFEST_FILENAME: &str = "candidates.json";

/// Dry-run submitter: records every request in a JSON manifest instead of
/// queueing it. The file is rewritten atomically after each request.
pub struct ManifestSubmitter {
    dir: PathBuf,
    clock: Arc<dyn Fn() -> String + Send + Sync>,
    requests: Mutex<Vec<DownloadRequest>>,
}

impl ManifestSubmitter {
    pub fn new(dir: PathBuf, clock: Arc<dyn Fn() -> String + Send + Sync>) -> Self {
        Self {
            dir,
            clock,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILENAME)
    }

    pub fn recorded(&self) -> Vec<DownloadRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn render(&self, requests: &[DownloadRequest]) -> Result<String, SubmissionError> {
        let manifest = json!({
            "generated_utc": (self.clock)(),
            "count": requests.len(),
            "requests": requests,
        });
        Ok(serde_json::to_string_pretty(&manifest)?)
    }
}

#[async_trait::async_trait]
impl DownloadSubmitter for ManifestSubmitter {
    async fn submit(&self, request: &DownloadRequest) -> Result<(), SubmissionError> {
        let content = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|_| std::io::Error::other("manifest state poisoned"))?;
            requests.push(request.clone());
            self.render(&requests)?
        };
        write_atomically(&self.dir, MANIFEST_FILENAME, &content)?;
        scout_info!("Recorded {} for {} (dry run)", request.release_title, request.show_name);
        Ok(())
    }
}

fn write_atomically(dir: &Path, filename: &str, content: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    // Windows refuses to rename over an existing file.
    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(target)
}
