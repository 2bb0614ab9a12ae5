use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CloneError;
use crate::vcs::VersionControlClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Clone { url: String, destination: PathBuf },
    Update { destination: PathBuf },
}

/// Records calls instead of running git. Successful clones create the
/// destination directory so reruns see it.
#[derive(Default)]
pub struct FakeVcs {
    pub calls: Mutex<Vec<VcsCall>>,
    failing_urls: HashSet<String>,
    delay: Option<Duration>,
}

impl FakeVcs {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            failing_urls: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionControlClient for FakeVcs {
    async fn clone_repository(&self, url: &str, destination: &Path) -> Result<(), CloneError> {
        self.calls.lock().unwrap().push(VcsCall::Clone {
            url: url.to_string(),
            destination: destination.to_path_buf(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_urls.contains(url) {
            return Err(CloneError::Exit {
                code: Some(128),
                stderr: format!("fatal: repository '{}' not found", url),
            });
        }
        std::fs::create_dir_all(destination).map_err(|e| CloneError::Unexpected(e.to_string()))
    }

    async fn update(&self, destination: &Path) -> Result<(), CloneError> {
        self.calls.lock().unwrap().push(VcsCall::Update {
            destination: destination.to_path_buf(),
        });
        Ok(())
    }
}
