use async_trait::async_trait;
use bytes::Bytes;

/// The store's answer to a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAck {
    /// Whether the store reports the object as removed.
    pub removed: bool,
}

#[async_trait]
pub trait ObjectStore: Sync + Send + 'static {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> anyhow::Result<()>;

    async fn delete(&self, key: &str) -> anyhow::Result<DeleteAck>;

    /// The conventional public URL prefix of objects in this store.
    fn public_base_url(&self) -> String;
}
