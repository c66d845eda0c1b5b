//! `ObjectStore` backed by Amazon S3 through `aws-sdk-s3`.

use super::object_store::ObjectStore;
use crate::{
    errors::StoreError,
    models::listing::{ListPage, ObjectListing},
};
use aws_config::{BehaviorVersion, meta::region::RegionProviderChain};
use aws_sdk_s3::{
    Client,
    error::{DisplayErrorContext, SdkError},
    types::MetadataDirective,
};
use chrono::DateTime;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Region used when the environment does not name one.
const FALLBACK_REGION: &str = "ap-southeast-2";

/// `x-amz-copy-source` must be URL-encoded but keeps its `/` separators.
const COPY_SOURCE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Build a client from the standard AWS environment chain (credentials,
    /// region, endpoint overrides).
    pub async fn from_env() -> Self {
        let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;
        debug!("S3 client configured for region {:?}", config.region());
        Self::new(Client::new(&config))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ObjectStore for S3Store {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .start_after(start_after)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|ref err| map_sdk_error(err, bucket, prefix))?;

        let mut objects = Vec::with_capacity(response.contents().len());
        for object in response.contents() {
            let Some(key) = object.key() else {
                continue;
            };
            let last_modified = object
                .last_modified()
                .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()));
            match last_modified {
                Some(last_modified) => objects.push(ObjectListing {
                    last_modified,
                    key: key.to_string(),
                }),
                None => warn!("skipping `{}`: listing has no usable LastModified", key),
            }
        }

        Ok(ListPage {
            objects,
            next_continuation_token: response.next_continuation_token().map(ToString::to_string),
        })
    }

    async fn copy_with_metadata(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), StoreError> {
        let copy_source = format!(
            "{}/{}",
            bucket,
            utf8_percent_encode(source_key, COPY_SOURCE_SET)
        );

        self.client
            .copy_object()
            .bucket(bucket)
            .copy_source(copy_source)
            .key(destination_key)
            .set_metadata(Some(metadata))
            .metadata_directive(MetadataDirective::Replace)
            .send()
            .await
            .map_err(|ref err| map_sdk_error(err, bucket, source_key))?;

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|ref err| map_sdk_error(err, bucket, key))?;

        Ok(())
    }
}

/// Maps an SDK failure onto `StoreError` using the HTTP status where there
/// is one.
fn map_sdk_error<E>(err: &SdkError<E>, bucket: &str, key: &str) -> StoreError
where
    E: std::error::Error + 'static,
{
    match err {
        SdkError::ServiceError(service_err) => match service_err.raw().status().as_u16() {
            403 => {
                return StoreError::AccessDenied {
                    bucket: bucket.to_string(),
                };
            }
            404 => {
                return StoreError::NotFound {
                    key: key.to_string(),
                };
            }
            _ => {}
        },
        SdkError::DispatchFailure(dispatch_err) => {
            if dispatch_err.is_io() || dispatch_err.is_timeout() {
                return StoreError::Connection(DisplayErrorContext(err).to_string());
            }
        }
        SdkError::TimeoutError(_) => {
            return StoreError::Connection(DisplayErrorContext(err).to_string());
        }
        _ => {}
    }
    StoreError::S3(DisplayErrorContext(err).to_string())
}
