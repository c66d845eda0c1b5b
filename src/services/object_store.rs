//! The object store operations the migration needs, and a lazy listing built
//! on top of them.

use crate::{
    errors::StoreError,
    models::listing::{ListPage, ObjectListing},
};
use futures::{Stream, TryStreamExt, stream};
use std::{collections::HashMap, future::Future};

/// Minimal S3-like surface: paged listing, server-side copy, delete.
pub trait ObjectStore {
    /// Fetch one page of keys under `prefix` that sort after `start_after`,
    /// resuming from `continuation_token` when given.
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: &str,
        continuation_token: Option<String>,
    ) -> impl Future<Output = Result<ListPage, StoreError>> + Send;

    /// Server-side copy. `metadata` replaces whatever user metadata the
    /// source carried.
    fn copy_with_metadata(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
        metadata: HashMap<String, String>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Every object under `folder`, as a lazy stream.
///
/// A new page is requested only once the previous one has been drained, so
/// the consumer's work on one page finishes before the next request goes
/// out. The listing starts after `folder` itself, which keeps a folder
/// marker object out of the results. It cannot be resumed; call again to
/// start over.
pub fn list_objects<'a, S: ObjectStore>(
    store: &'a S,
    bucket: &'a str,
    folder: &'a str,
) -> impl Stream<Item = Result<ObjectListing, StoreError>> + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let token = match cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
            Cursor::Done => return Ok(None),
        };

        let page = store.list_page(bucket, folder, folder, token).await?;
        let next = match page.next_continuation_token {
            Some(token) => Cursor::Next(token),
            None => Cursor::Done,
        };
        let entries = stream::iter(
            page.objects
                .into_iter()
                .map(Ok::<ObjectListing, StoreError>),
        );

        Ok::<_, StoreError>(Some((entries, next)))
    })
    .try_flatten()
}
