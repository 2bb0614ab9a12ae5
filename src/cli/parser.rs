use std::time::Duration;

use super::{reader, FetchArgs};
use crate::config::{ConfigurationError, MirrorConfig, MirrorOptions, SourceConfig};

/// Merge the config file with command-line flags. Flags win.
pub fn parse_config(
    file: reader::Config,
    args: &FetchArgs,
) -> Result<MirrorConfig, ConfigurationError> {
    let base_url = args.base_url.clone().or(file.base_url);
    let username = args.username.clone().or(file.username);
    let token = args.token.clone().or(file.token);
    let target_directory = args.target_directory.clone().or(file.target_directory);

    let source = SourceConfig::new(
        &base_url.ok_or(ConfigurationError::Missing("base_url"))?,
        &username.ok_or(ConfigurationError::Missing("username"))?,
        &token.ok_or(ConfigurationError::Missing("token"))?,
        target_directory.ok_or(ConfigurationError::Missing("target_directory"))?,
    )?;

    let defaults = MirrorOptions::default();
    let secs = Duration::from_secs;

    let options = MirrorOptions {
        follow_pagination: !args.no_pagination
            && file.follow_pagination.unwrap_or(defaults.follow_pagination),
        page_size: args.page_size.or(file.page_size).unwrap_or(defaults.page_size),
        on_existing: args
            .on_existing
            .or(file.on_existing)
            .unwrap_or(defaults.on_existing),
        concurrency: args
            .concurrency
            .or(file.concurrency)
            .unwrap_or(defaults.concurrency),
        clone_timeout: args.clone_timeout.or(file.clone_timeout_secs).map(secs),
        batch_deadline: args.batch_deadline.or(file.batch_deadline_secs).map(secs),
        request_timeout: args
            .request_timeout
            .or(file.request_timeout_secs)
            .map(secs)
            .unwrap_or(defaults.request_timeout),
    };

    MirrorConfig::new(source, options)
}
