//! Shared helpers for tests: an in-memory bucket store and test-server
//! constructors wired with the in-memory repositories.

use crate::cloud::{BucketStore, CloudError};
use crate::config::Config;
use crate::store::{InMemoryStore, ProjectStore};
use crate::{AppState, build_router};
use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory [`BucketStore`] for exercising cloud import/export paths.
#[derive(Default)]
pub struct MemoryBucketStore {
    objects: Mutex<HashMap<(String, String), Bytes>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, body: Bytes) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body);
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(&(bucket.to_string(), key.to_string())).cloned()
    }
}

#[async_trait]
impl BucketStore for MemoryBucketStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, CloudError> {
        self.get(bucket, key).ok_or_else(|| CloudError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), CloudError> {
        self.insert(bucket, key, body);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), CloudError> {
        self.objects.lock().unwrap().remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

fn build_test_app(config: Config, cloud: Option<Arc<MemoryBucketStore>>) -> (TestServer, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let store_seam: Arc<dyn ProjectStore> = store.clone();
    let cloud_seam: Option<Arc<dyn BucketStore>> = cloud.map(|c| c as Arc<dyn BucketStore>);

    let state = AppState::builder().config(config).store(store_seam).maybe_cloud(cloud_seam).build();
    let server = TestServer::new(build_router(state)).expect("Failed to create test server");
    (server, store)
}

/// Test app with cloud storage wired to an in-memory bucket store.
pub fn create_test_app() -> (TestServer, Arc<InMemoryStore>, Arc<MemoryBucketStore>) {
    create_test_app_with_config(Config::default())
}

/// Same as [`create_test_app`] but with a custom configuration.
pub fn create_test_app_with_config(config: Config) -> (TestServer, Arc<InMemoryStore>, Arc<MemoryBucketStore>) {
    let cloud = Arc::new(MemoryBucketStore::new());
    let (server, store) = build_test_app(config, Some(cloud.clone()));
    (server, store, cloud)
}

/// Test app with no cloud storage configured at all.
pub fn create_test_app_without_cloud() -> (TestServer, Arc<InMemoryStore>) {
    build_test_app(Config::default(), None)
}
