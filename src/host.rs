use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    Other,
}

/// Transient handle to a remote channel; the platform owns the real thing.
#[derive(Debug, Clone)]
pub struct ChannelRef {
    pub id: u64,
    pub name: String,
    pub kind: ChannelKind,
}

#[derive(Debug, Clone, Copy)]
pub struct MessageRef {
    pub id: u64,
    pub pinned: bool,
    pub sent_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("missing permissions")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("API error: {0}")]
    Api(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// The engine's view of the remote platform. One implementation talks to
/// Discord over HTTP; tests run against an in-memory fake.
#[async_trait]
pub trait ChannelHost: Send + Sync {
    /// Look up a channel by ID. `Ok(None)` when the ID does not resolve
    /// within the configured workspace.
    async fn channel(&self, id: u64) -> HostResult<Option<ChannelRef>>;

    async fn rename(&self, id: u64, name: &str) -> HostResult<()>;

    /// One page of history, newest first, strictly older than `before` when set.
    async fn messages_before(
        &self,
        id: u64,
        before: Option<u64>,
        limit: u8,
    ) -> HostResult<Vec<MessageRef>>;

    /// Delete up to one page of recent messages in a single call. The
    /// platform bounds both batch size and message age.
    async fn bulk_delete(&self, id: u64, message_ids: &[u64]) -> HostResult<()>;

    async fn delete_message(&self, id: u64, message_id: u64) -> HostResult<()>;
}

#[async_trait]
impl<T: ChannelHost + ?Sized> ChannelHost for &T {
    async fn channel(&self, id: u64) -> HostResult<Option<ChannelRef>> {
        (**self).channel(id).await
    }

    async fn rename(&self, id: u64, name: &str) -> HostResult<()> {
        (**self).rename(id, name).await
    }

    async fn messages_before(
        &self,
        id: u64,
        before: Option<u64>,
        limit: u8,
    ) -> HostResult<Vec<MessageRef>> {
        (**self).messages_before(id, before, limit).await
    }

    async fn bulk_delete(&self, id: u64, message_ids: &[u64]) -> HostResult<()> {
        (**self).bulk_delete(id, message_ids).await
    }

    async fn delete_message(&self, id: u64, message_id: u64) -> HostResult<()> {
        (**self).delete_message(id, message_id).await
    }
}
