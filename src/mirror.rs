//! The enumerate→clone pipeline.

use std::io;
use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;

use crate::config::MirrorConfig;
use crate::error::MirrorError;
use crate::event::{MirrorEvent, ReportSink, TracingSink};
use crate::executor::CloneExecutor;
use crate::gitea_provider::GiteaProvider;
use crate::outcome::{BatchOutcome, BatchSummary};
use crate::provider::RepositoryLister;
use crate::vcs::{GitCli, VersionControlClient};

/// Mirrors every repository of one forge account into a local directory.
///
/// All collaborators are injected; nothing is looked up globally.
pub struct Mirror {
    config: MirrorConfig,
    lister: Arc<dyn RepositoryLister>,
    executor: CloneExecutor,
    sink: Arc<dyn ReportSink>,
}

impl Mirror {
    pub fn new(
        config: MirrorConfig,
        lister: Arc<dyn RepositoryLister>,
        vcs: Arc<dyn VersionControlClient>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let executor = CloneExecutor::new(
            vcs,
            sink.clone(),
            config.source.target_directory.clone(),
            config.options.on_existing,
            config.options.clone_timeout,
        );

        Self {
            config,
            lister,
            executor,
            sink,
        }
    }

    /// Gitea over HTTP, `git` on the PATH, events logged through `tracing`.
    pub fn with_defaults(config: MirrorConfig) -> Result<Self, MirrorError> {
        let lister = GiteaProvider::new(&config.source, &config.options)?;

        Ok(Self::new(
            config,
            Arc::new(lister),
            Arc::new(GitCli::new()),
            Arc::new(TracingSink),
        ))
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Run one fetch: ensure the target directory, list, then clone.
    ///
    /// Directory and listing failures end the run with `Err`; per-repository
    /// failures are only recorded in the returned summary.
    pub async fn run(&self) -> BatchOutcome {
        let outcome = self.run_batch().await;

        match &outcome {
            Ok(summary) => self.sink.report(&MirrorEvent::Finished(summary.clone())),
            Err(err) => self.sink.report(&MirrorEvent::Aborted {
                reason: err.to_string(),
            }),
        }

        outcome
    }

    async fn run_batch(&self) -> BatchOutcome {
        let source = &self.config.source;
        let options = &self.config.options;

        self.sink.report(&MirrorEvent::Started {
            username: source.username.clone(),
            base_url: source.base_url.clone(),
            target_directory: source.target_directory.clone(),
        });

        if ensure_directory(&source.target_directory).await? {
            self.sink.report(&MirrorEvent::DirectoryCreated {
                path: source.target_directory.clone(),
            });
        }

        self.sink.report(&MirrorEvent::FetchingRepositories {
            url: self.lister.listing_url(&source.username),
        });
        let repos = self.lister.list_repositories(&source.username).await?;

        if repos.is_empty() {
            self.sink.report(&MirrorEvent::NoRepositories {
                username: source.username.clone(),
            });
            return Ok(BatchSummary::default());
        }

        self.sink
            .report(&MirrorEvent::RepositoriesListed { count: repos.len() });

        let deadline = options.batch_deadline.map(|limit| Instant::now() + limit);
        let executor = &self.executor;
        let sink = &self.sink;

        let results = stream::iter(repos.iter())
            .map(|repo| async move {
                let result = executor.clone_before(repo, deadline).await;
                sink.report(&MirrorEvent::RepositoryFinished(result.clone()));
                result
            })
            .buffered(options.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(BatchSummary::new(results))
    }
}

/// Create `path` if absent. Returns whether it was created.
///
/// Safe to race: a concurrent creator is not an error.
async fn ensure_directory(path: &Path) -> Result<bool, MirrorError> {
    let directory_error = |source| MirrorError::Directory {
        path: path.to_path_buf(),
        source,
    };

    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => {
            return Err(directory_error(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists and is not a directory",
            )))
        }
        Err(_) => {}
    }

    tokio::fs::create_dir_all(path)
        .await
        .map_err(directory_error)?;
    Ok(true)
}
