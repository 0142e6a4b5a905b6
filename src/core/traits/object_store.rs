use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::remote_object::ObjectListing;

/// Largest listing requested from the store in a single call.
pub const MAX_LIST_KEYS: i32 = 1000;

/// Port for the remote bucket.
///
/// Endpoint, region and credentials are the adapter's business; the
/// sync service only ever names a bucket and a key.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Fail unless the bucket exists and the credentials can reach it.
    async fn check_access(&self, bucket: &str) -> Result<()>;

    /// List up to `max_keys` objects. No pagination.
    async fn list(&self, bucket: &str, max_keys: i32) -> Result<ObjectListing>;

    /// Fetch the full body of an object.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Store the contents of the local file at `path` under `key`,
    /// replacing any existing object. The file is streamed, not buffered.
    async fn put(&self, bucket: &str, key: &str, path: &Path) -> Result<()>;
}
