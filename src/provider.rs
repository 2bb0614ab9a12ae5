use async_trait::async_trait;

use crate::error::ListingError;
use crate::repository::RepositoryDescriptor;

/// A forge that can enumerate the repositories owned by an account.
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    /// All repositories owned by `username`, in the order the forge returns
    /// them. Fails as a whole: no partial listing is ever returned.
    async fn list_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ListingError>;

    /// The URL requests are sent to, for reporting.
    fn listing_url(&self, username: &str) -> String;
}
