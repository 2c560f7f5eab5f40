use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::builder::{EditChannel, GetMessages};
use serenity::http::{Http, HttpError};
use serenity::model::prelude::{Channel, ChannelId, ChannelType, GuildId, MessageId};

use crate::host::{ChannelHost, ChannelKind, ChannelRef, HostError, HostResult, MessageRef};

/// HTTP-only Discord client bound to a single guild. No gateway connection
/// is opened; every operation is a plain REST call.
pub struct DiscordHost {
    http: Http,
    guild_id: GuildId,
}

impl DiscordHost {
    pub fn new(token: &str, guild_id: u64) -> Self {
        Self {
            http: Http::new(token),
            guild_id: GuildId::new(guild_id),
        }
    }
}

fn kind_of(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Voice => ChannelKind::Voice,
        ChannelType::Category => ChannelKind::Category,
        _ => ChannelKind::Other,
    }
}

fn classify(err: serenity::Error) -> HostError {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) => {
            match resp.status_code.as_u16() {
                403 => HostError::Forbidden,
                404 => HostError::NotFound,
                429 => HostError::RateLimited { retry_after_secs: 1 },
                _ => HostError::Api(resp.error.message),
            }
        }
        other => HostError::Api(other.to_string()),
    }
}

/// Message creation time recovered from the snowflake.
fn sent_at(id: MessageId) -> DateTime<Utc> {
    DateTime::from_timestamp(id.created_at().unix_timestamp(), 0).unwrap_or_default()
}

#[async_trait]
impl ChannelHost for DiscordHost {
    async fn channel(&self, id: u64) -> HostResult<Option<ChannelRef>> {
        let channel = match self.http.get_channel(ChannelId::new(id)).await {
            Ok(channel) => channel,
            Err(err) => {
                return match classify(err) {
                    HostError::NotFound | HostError::Forbidden => Ok(None),
                    other => Err(other),
                };
            }
        };

        match channel {
            Channel::Guild(channel) if channel.guild_id == self.guild_id => Ok(Some(ChannelRef {
                id,
                name: channel.name.clone(),
                kind: kind_of(channel.kind),
            })),
            _ => Ok(None),
        }
    }

    async fn rename(&self, id: u64, name: &str) -> HostResult<()> {
        ChannelId::new(id)
            .edit(&self.http, EditChannel::new().name(name))
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn messages_before(
        &self,
        id: u64,
        before: Option<u64>,
        limit: u8,
    ) -> HostResult<Vec<MessageRef>> {
        let mut request = GetMessages::new().limit(limit);
        if let Some(before) = before {
            request = request.before(MessageId::new(before));
        }

        let page = ChannelId::new(id)
            .messages(&self.http, request)
            .await
            .map_err(classify)?;

        Ok(page
            .into_iter()
            .map(|message| MessageRef {
                id: message.id.get(),
                pinned: message.pinned,
                sent_at: sent_at(message.id),
            })
            .collect())
    }

    async fn bulk_delete(&self, id: u64, message_ids: &[u64]) -> HostResult<()> {
        let ids: Vec<MessageId> = message_ids.iter().copied().map(MessageId::new).collect();
        ChannelId::new(id)
            .delete_messages(&self.http, ids)
            .await
            .map_err(classify)
    }

    async fn delete_message(&self, id: u64, message_id: u64) -> HostResult<()> {
        ChannelId::new(id)
            .delete_message(&self.http, MessageId::new(message_id))
            .await
            .map_err(classify)
    }
}
