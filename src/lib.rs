//! Mirror every repository a Gitea user owns into a local directory.
//!
//! [`mirror::Mirror`] lists the account's repositories through a
//! [`provider::RepositoryLister`] and hands each one to an
//! [`executor::CloneExecutor`]. Per-repository failures are collected in the
//! [`outcome::BatchSummary`]; only configuration, directory and listing
//! errors abort the run.

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod executor;
pub mod gitea_provider;
pub mod mirror;
pub mod outcome;
pub mod provider;
pub mod repository;
pub mod vcs;


pub use config::{ExistingPolicy, MirrorConfig, MirrorOptions, SourceConfig};
pub use error::{CloneError, ListingError, MirrorError};
pub use mirror::Mirror;
pub use outcome::{BatchOutcome, BatchSummary, RepositoryOutcome, RepositoryResult, SkipReason};
pub use repository::RepositoryDescriptor;
