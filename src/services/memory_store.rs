//! In-memory `ObjectStore` that mimics ListObjectsV2 paging and records every
//! request, for tests.

use super::object_store::ObjectStore;
use crate::{
    errors::StoreError,
    models::listing::{ListPage, ObjectListing},
};
use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Mutex,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    List {
        bucket: String,
        prefix: String,
        start_after: String,
        continuation_token: Option<String>,
    },
    Copy {
        bucket: String,
        source: String,
        destination: String,
        metadata: HashMap<String, String>,
    },
    Delete {
        bucket: String,
        key: String,
    },
}

#[derive(Clone, Debug)]
pub struct StoredObject {
    pub last_modified: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
}

#[derive(Default)]
struct State {
    objects: BTreeMap<String, StoredObject>,
    calls: Vec<Call>,
    failing_copies: HashSet<String>,
    failing_deletes: HashSet<String>,
    fail_listing: bool,
}

pub struct MemoryStore {
    page_size: usize,
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            state: Mutex::new(State::default()),
        }
    }

    /// Add an object last modified at `last_modified` (RFC 3339).
    pub fn insert(&self, key: &str, last_modified: &str) {
        let last_modified = DateTime::parse_from_rfc3339(last_modified)
            .expect("valid RFC 3339 timestamp")
            .with_timezone(&Utc);
        let mut metadata = HashMap::new();
        metadata.insert("original".to_string(), "yes".to_string());
        self.state().objects.insert(
            key.to_string(),
            StoredObject {
                last_modified,
                metadata,
            },
        );
    }

    pub fn fail_copy_of(&self, source: &str) {
        self.state().failing_copies.insert(source.to_string());
    }

    pub fn fail_delete_of(&self, key: &str) {
        self.state().failing_deletes.insert(key.to_string());
    }

    pub fn fail_listing(&self) {
        self.state().fail_listing = true;
    }

    pub fn keys(&self) -> Vec<String> {
        self.state().objects.keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.state().objects.get(key).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.count(|call| matches!(call, Call::List { .. }))
    }

    pub fn copy_calls(&self) -> usize {
        self.count(|call| matches!(call, Call::Copy { .. }))
    }

    pub fn delete_calls(&self) -> usize {
        self.count(|call| matches!(call, Call::Delete { .. }))
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|call| predicate(*call)).count()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("memory store lock poisoned")
    }
}

impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let mut state = self.state();
        state.calls.push(Call::List {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
            start_after: start_after.to_string(),
            continuation_token: continuation_token.clone(),
        });
        if state.fail_listing {
            return Err(StoreError::AccessDenied {
                bucket: bucket.to_string(),
            });
        }

        let after = continuation_token.unwrap_or_else(|| start_after.to_string());
        let mut remaining = state
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix) && key.as_str() > after.as_str());

        let objects: Vec<ObjectListing> = remaining
            .by_ref()
            .take(self.page_size)
            .map(|(key, object)| ObjectListing {
                last_modified: object.last_modified,
                key: key.clone(),
            })
            .collect();
        let next_continuation_token = match (remaining.next(), objects.last()) {
            (Some(_), Some(last)) => Some(last.key.clone()),
            _ => None,
        };

        Ok(ListPage {
            objects,
            next_continuation_token,
        })
    }

    async fn copy_with_metadata(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Copy {
            bucket: bucket.to_string(),
            source: source_key.to_string(),
            destination: destination_key.to_string(),
            metadata: metadata.clone(),
        });
        if state.failing_copies.contains(source_key) {
            return Err(StoreError::S3("copy rejected".into()));
        }

        if !state.objects.contains_key(source_key) {
            return Err(StoreError::NotFound {
                key: source_key.to_string(),
            });
        }
        let copied = StoredObject {
            last_modified: Utc::now(),
            metadata,
        };
        state.objects.insert(destination_key.to_string(), copied);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        if state.failing_deletes.contains(key) {
            return Err(StoreError::Connection("connection reset".into()));
        }

        state.objects.remove(key);
        Ok(())
    }
}
