use std::str::FromStr;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use rusoto_core::credential::StaticProvider;
use rusoto_core::{ByteStream, HttpClient, Region};
use rusoto_s3::{DeleteObjectOutput, DeleteObjectRequest, PutObjectRequest, S3Client, S3};

use crate::storage::{DeleteAck, ObjectStore};

pub struct BlobStorageBackend {
    bucket: String,
    region: String,
    endpoint: Option<String>,
    client: S3Client,
}

impl BlobStorageBackend {
    pub fn new(
        bucket: String,
        region: String,
        endpoint: Option<String>,
        access_key: Option<&str>,
        secret_key: Option<&str>,
    ) -> Result<Self> {
        let rusoto_region = match endpoint.as_ref() {
            Some(endpoint) => Region::Custom {
                name: region.clone(),
                endpoint: endpoint.clone(),
            },
            None => Region::from_str(&region)
                .map_err(|e| anyhow!("Invalid S3 region {:?}: {}", region, e))?,
        };

        let client = match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let creds = StaticProvider::new_minimal(access_key.to_string(), secret_key.to_string());
                S3Client::new_with(HttpClient::new()?, creds, rusoto_region)
            },
            _ => S3Client::new(rusoto_region),
        };

        Ok(Self {
            bucket,
            region,
            endpoint,
            client,
        })
    }

    /// The public URL prefix of a bucket.
    ///
    /// Custom endpoints use path style addressing, AWS itself the
    /// virtual hosted style.
    pub fn public_url_for(bucket: &str, region: &str, endpoint: Option<&str>) -> String {
        match endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
        }
    }
}

#[async_trait]
impl ObjectStore for BlobStorageBackend {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        debug!("Storing object in bucket {} @ {}", &self.bucket, key);

        let request = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            body: Some(body_from(data)),
            content_type: Some(content_type.to_string()),
            ..Default::default()
        };

        self.client.put_object(request).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<DeleteAck> {
        debug!("Purging object in bucket {} @ {}", &self.bucket, key);

        let request = DeleteObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            ..Default::default()
        };

        let output = self.client.delete_object(request).await?;
        Ok(ack_from(&output))
    }

    fn public_base_url(&self) -> String {
        Self::public_url_for(&self.bucket, &self.region, self.endpoint.as_deref())
    }
}

/// Streams the buffer as is, the body shares the variant's allocation.
pub(crate) fn body_from(data: Bytes) -> ByteStream {
    let size = data.len();
    ByteStream::new_with_size(futures::stream::once(async move { Ok::<_, std::io::Error>(data) }), size)
}

/// Only an explicit delete marker counts as removed.
pub(crate) fn ack_from(output: &DeleteObjectOutput) -> DeleteAck {
    DeleteAck {
        removed: output.delete_marker.unwrap_or(false),
    }
}
