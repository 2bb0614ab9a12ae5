use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use gitea_mirror::vcs::VersionControlClient;
use gitea_mirror::CloneError;

/// Stands in for `git`: records every clone, fails the configured URLs and
/// creates the destination directory for the rest.
#[derive(Default)]
pub struct RecordingVcs {
    clones: Mutex<Vec<(String, PathBuf)>>,
    updates: Mutex<Vec<PathBuf>>,
    failing_urls: HashSet<String>,
}

impl RecordingVcs {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            failing_urls: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn clones(&self) -> Vec<(String, PathBuf)> {
        self.clones.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<PathBuf> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionControlClient for RecordingVcs {
    async fn clone_repository(&self, url: &str, destination: &Path) -> Result<(), CloneError> {
        self.clones
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));

        if self.failing_urls.contains(url) {
            return Err(CloneError::Exit {
                code: Some(128),
                stderr: "fatal: could not read Username".to_string(),
            });
        }
        std::fs::create_dir_all(destination).map_err(|e| CloneError::Unexpected(e.to_string()))
    }

    async fn update(&self, destination: &Path) -> Result<(), CloneError> {
        self.updates.lock().unwrap().push(destination.to_path_buf());
        Ok(())
    }
}
