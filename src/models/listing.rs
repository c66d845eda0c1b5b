//! Entries produced by listing a folder in the object store.

use chrono::{DateTime, Utc};

/// One object under the scanned prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectListing {
    /// When the object was last written. Becomes the `fingerprint-created`
    /// metadata on the renamed copy.
    pub last_modified: DateTime<Utc>,

    /// Full object key, including the folder prefix.
    pub key: String,
}

/// A single page of a ListObjectsV2-style response.
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectListing>,

    /// Token for the next page, `None` once the listing is exhausted.
    pub next_continuation_token: Option<String>,
}
