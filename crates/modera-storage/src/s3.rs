use crate::keys::validate_key;
use crate::traits::{ObjectStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use modera_core::{content_type_for, AwsSettings, RemoteObjectRef, StorageSettings};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, Attributes, ObjectStore as _, PutOptions, PutPayload, Result as ObjectResult,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// S3 object store
///
/// One `AmazonS3` client is built lazily per bucket and reused for the
/// lifetime of the store.
pub struct S3ObjectStore {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    credentials: Option<(String, String)>,
    stores: Mutex<HashMap<String, AmazonS3>>,
}

impl S3ObjectStore {
    /// Create a new S3ObjectStore
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `credentials` - Optional static (access key id, secret access key); when
    ///   absent, credentials come from the environment
    pub fn new(
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<(String, String)>,
    ) -> Self {
        Self {
            region,
            endpoint_url,
            credentials,
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(aws: &AwsSettings, storage: &StorageSettings) -> Self {
        Self::new(
            aws.region.clone(),
            storage.endpoint.clone(),
            aws.static_credentials()
                .map(|(key, secret)| (key.to_string(), secret.to_string())),
        )
    }

    fn store_for(&self, bucket: &str) -> StorageResult<AmazonS3> {
        let mut stores = self.stores.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(store) = stores.get(bucket) {
            return Ok(store.clone());
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket.to_string());

        if let Some((key, secret)) = &self.credentials {
            builder = builder
                .with_access_key_id(key.clone())
                .with_secret_access_key(secret.clone());
        }

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        stores.insert(bucket.to_string(), store.clone());
        Ok(store)
    }
}

/// Put options carrying the content type guessed from the file name
fn put_options(local_path: &Path) -> (&'static str, PutOptions) {
    let content_type = content_type_for(local_path).unwrap_or("application/octet-stream");
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.into());
    let options = PutOptions {
        attributes,
        ..Default::default()
    };
    (content_type, options)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> StorageResult<RemoteObjectRef> {
        validate_key(key)?;
        let store = self.store_for(bucket)?;

        let data = tokio::fs::read(local_path).await?;
        let size = data.len() as u64;
        let location = ObjectPath::from(key.to_string());
        let (content_type, options) = put_options(local_path);

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            content_type = content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(RemoteObjectRef::new(bucket, key))
    }
}
